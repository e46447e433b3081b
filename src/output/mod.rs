//! Entry formatting and output
//!
//! - `template` - `%N%` field interpolation
//! - `writer` - separator-aware emission to the output stream

mod template;
mod writer;

pub use template::{Field, Template, TemplateError};
pub use writer::EntryWriter;
