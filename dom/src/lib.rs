//! A small arena-based DOM, standing in for "the live HTML document" that
//! `html-highlighter`'s engine operates against.
//!
//! This crate implements nothing more than the capability set the engine
//! actually needs - walk children in document order, read/write tag name,
//! attributes, class list and text, split and wrap text nodes - so the
//! engine crate can be tested against synthetic trees as easily as against
//! markup parsed from a real document.

mod cursor;
mod document;
mod error;
mod node;
mod parse;

pub use cursor::DocumentOrder;
pub use document::Document;
pub use error::{Error, Result};
pub use node::{ElementData, Node, NodeData, NodeId};
pub use parse::parse;
