//! A robust and cozy engine for highlighting text queries inside live HTML
//! documents: literal substrings, regular expressions, and caller-supplied
//! XPath/offset ranges, each borne by an independent *query set* that can be
//! enabled, disabled or removed without disturbing the others.
//!
//! The crate is organized bottom-up, mirroring the three coordinate systems
//! every operation round-trips between (DOM tree, flat text, XPath):
//!
//! - [`text_content`] builds the flat, text-only projection of a container
//!   subtree ([`TextContent`]) that every offset computation is relative to.
//! - [`position`] and [`range`] describe points and spans over that
//!   projection ([`PositionDescriptor`], [`Range`]), and convert to/from the
//!   [`xpath`] dialect.
//! - [`finder`] turns a query ([`Subject`]) into a lazy sequence of
//!   [`Range`]s.
//! - [`highlight`] wraps (or unwraps) the DOM text a `Range` spans.
//! - [`cursor`] positions a single selection over the enabled highlights.
//! - [`registry`] is the public surface: [`HtmlHighlighter`] owns the query
//!   sets, the sorted highlight-marker list, and the transaction queue that
//!   batches `add`/`append`/`remove`/`enable`/`disable`/`clear` until
//!   [`HtmlHighlighter::apply`] drains it against a live document.

pub mod css;
mod cursor;
mod error;
mod finder;
mod highlight;
mod options;
mod position;
mod range;
mod registry;
mod text_content;
mod xpath;

#[cfg(test)]
mod tests;

pub use crate::error::{Error, Result};
pub use crate::finder::Subject;
pub use crate::highlight::HighlightStyle;
pub use crate::options::Options;
pub use crate::position::PositionDescriptor;
pub use crate::range::{Range, XPathRange};
pub use crate::registry::{HostSelection, HtmlHighlighter, QuerySetId, Stats};
pub use crate::text_content::{TextContent, TextMarker};
pub use crate::xpath::XPathDescriptor;

pub use html_highlighter_dom as dom;
