/// Engine-wide configuration, set once at construction.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Options {
    /// Upper bound on `id_highlight`, the small integer each query set is
    /// assigned at `add` time to select its `highlight-id_<n>` CSS variant
    /// class. This is a CSS-palette size, *not* a cap on the number of
    /// highlights - per-query-set caps are `reserve`, passed to `add`/`append`
    /// themselves.
    pub max_highlight: u32,
    /// Add each query set's name as a CSS class on its wrappers, via
    /// [`crate::css::query_class`].
    pub use_query_as_class: bool,
    /// Call `Document::normalize` on a wrapper's parent after unwrapping it.
    pub normalise: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_highlight: 16,
            use_query_as_class: true,
            normalise: false,
        }
    }
}
