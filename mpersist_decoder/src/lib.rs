//! Decoder for persist snapshot streams.
//!
//! A [`Parser`] validates the header, then decodes tagged values one at a time into an
//! [`ObjectGraph`](mpersist_types::graph::ObjectGraph), filing each under its start offset so
//! that back-references can find it.

mod containers;
mod cursor;
mod dispatch;
mod error;
mod ints;
mod parser;
mod records;
mod ref_table;
mod resolver;

pub use cursor::*;
pub use error::*;
pub use ints::*;
pub use parser::*;
pub use ref_table::*;
pub use resolver::*;
