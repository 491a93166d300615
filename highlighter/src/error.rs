/// Error kinds raised by the engine.
///
/// Transactional operations (everything queued by [`crate::HtmlHighlighter::add`]
/// et al. and drained by [`crate::HtmlHighlighter::apply`]) catch and log
/// their own `Result`, per spec: one action's failure must not prevent later
/// queued actions from running. Direct operations (`last_id_of`,
/// `selected_range`) propagate the `Result`/`Option` to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("query set {0:?} does not exist")]
    UnknownQuerySet(String),

    #[error("reserve of {reserve} exceeded for query set {name:?}: dropped {dropped} hit(s)")]
    ReserveExceeded {
        name: String,
        reserve: usize,
        dropped: usize,
    },

    #[error("failed to construct finder: {0}")]
    FinderConstruction(String),

    #[error("failed to wrap range: {0}")]
    WrapFailed(#[from] html_highlighter_dom::Error),

    #[error("xpath {0:?} did not resolve to a node")]
    UnresolvedXPath(String),

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
