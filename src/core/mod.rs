// src/core/mod.rs

pub mod dom;
pub mod html;
pub mod parse;
pub mod sanitize;

pub use dom::{Document, DomView, NodeId};
pub use parse::{Month, ParseCountError, parse_count, parse_label};
