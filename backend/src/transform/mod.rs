//! Transformation module.
//!
//! This module turns uploads into grouped cards:
//! - Grouper: Rows to groups keyed by designation
//! - Pipeline: Body decoding, parsing and grouping in one call

pub mod grouper;
pub mod pipeline;

pub use grouper::{
    flatten, group_by_designation, group_by_field, GroupedRecords, DESIGNATION_FIELD,
    FALLBACK_GROUP,
};
pub use pipeline::*;
