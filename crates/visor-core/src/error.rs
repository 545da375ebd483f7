use visor_protocol::handle::{Handle, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("null {0:?} handle")]
    NullHandle(ResourceKind),

    #[error("stale handle: {0}")]
    StaleHandle(Handle),

    #[error("handle not found: {0}")]
    UnknownHandle(Handle),

    #[error("handle {handle} used where a {expected:?} was expected")]
    WrongKind {
        handle: Handle,
        expected: ResourceKind,
    },

    #[error("pixel storage size mismatch: expected {expected} bytes, got {actual}")]
    PixelSizeMismatch { expected: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
