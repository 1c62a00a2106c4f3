//! Quality-measure input model
//!
//! This crate provides:
//! - Typed input records (members, claims, pharmacy fills, lab results)
//! - Code normalization and lenient date parsing
//! - Column-typed tables with required-column checks
//! - A dataset partitioned per member, with data-quality diagnostics

pub mod code;
pub mod dataset;
pub mod date;
pub mod record;
pub mod table;

pub use code::normalize_code;
pub use dataset::{Dataset, MemberRecords};
pub use date::{age_at, parse_date};
pub use record::*;
pub use table::Table;
