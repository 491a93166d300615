//! The CSS/attribute contract a highlight wrapper element carries.
//! Centralized here so `highlight.rs` and `registry.rs` agree on names
//! without string literals scattered across both.

/// Applied to every wrapper element this crate creates.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Applied alongside [`HIGHLIGHT_CLASS`] when the owning query set is
/// disabled.
pub const DISABLED_CLASS: &str = "highlight-disabled";

/// Carries the highlight's numeric id, shared by every wrapper belonging to
/// the same highlight (a range spanning several elements produces several
/// wrappers). [`crate::registry`] uses this to find all of a highlight's
/// wrappers again for `remove`/`clear`.
pub const ID_ATTR: &str = "data-highlight-id";

/// Carries the owning query set's name, so per-query-set bookkeeping (e.g.
/// [`crate::registry::HtmlHighlighter::clear`]) can find its own wrappers
/// without walking the id table.
pub const QUERY_ATTR: &str = "data-highlight-query";

/// The per-query-set class name `options.use_query_as_class` adds, letting
/// stylesheets target `.highlight-<name>` instead of (or in addition to)
/// `.highlight`.
pub fn query_class(name: &str) -> String {
    format!("highlight-{name}")
}

/// The rotating group class every highlight belonging to a query set shares,
/// keyed by that set's `id_highlight`. Always emitted, unlike [`query_class`]
/// which is gated by `options.use_query_as_class`: this is the mechanism
/// stylesheets use to cycle through a bounded palette of highlight colors
/// regardless of how many query sets exist.
pub fn highlight_id_class(id_highlight: u32) -> String {
    format!("highlight-id_{id_highlight}")
}
