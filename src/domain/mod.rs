//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - user selections (`Selection`, `SelectionSet`) and resolution policy
//! - catalog keys and series identifiers (`CategoryPair`, `SeriesId`)
//! - dated series (`Observation`, `TimeSeries`) and the computation output (`CompositeResult`)

pub mod types;

pub use types::*;
