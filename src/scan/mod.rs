//! Traversal engine and entry filtering
//!
//! - `walker` - depth-bounded recursive walk calling a [`Visitor`] per entry
//! - `filter` - type mask and pattern predicate deciding what is emitted

mod filter;
mod walker;

pub use filter::EntryFilter;
pub use walker::{ScanSummary, Visit, Visitor, Walker, scan};
