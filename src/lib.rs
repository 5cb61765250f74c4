//! `composite-index` library crate.
//!
//! Builds a weighted composite index from commodity price series selected by
//! category. The binary (`cpi`) is a thin wrapper around this library so that:
//!
//! - the engine is testable without spawning processes
//! - repositories are swappable (local CSV, FRED, in-memory)
//! - presentation stays out of the aggregation code

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
