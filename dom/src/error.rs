use crate::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node {0:?} is not attached to the document")]
    Detached(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("node {0:?} is not an element")]
    NotElement(NodeId),
    #[error("offset {offset} out of bounds for text node of length {len}")]
    OffsetOutOfBounds { offset: u32, len: u32 },
    #[error("wrap() requires at least one node")]
    EmptyWrap,
    #[error("nodes passed to wrap() are not a contiguous run of siblings")]
    NotContiguous,
}

pub type Result<T> = std::result::Result<T, Error>;
