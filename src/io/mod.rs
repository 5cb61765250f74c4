//! Input/output helpers.
//!
//! - catalog and observation CSV ingest (`ingest`)
//! - master table CSV export (`export`)
//! - composite result JSON read/write (`result`)

pub mod export;
pub mod ingest;
pub mod result;

pub use export::*;
pub use ingest::*;
pub use result::*;
