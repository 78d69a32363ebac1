//! Typed errors for the map layer.

use thiserror::Error;

/// Errors raised by a mapping library while attaching a surface.
///
/// The controller never propagates these; they end up in
/// [`MapStatus::Unavailable`](crate::map::MapStatus::Unavailable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Library code or assets could not be loaded
    #[error("map library failed to load: {0}")]
    LibraryLoad(String),

    /// The container to render into does not exist
    #[error("map container not found: {0}")]
    ContainerNotFound(String),
}

/// Result type alias for map operations.
pub type MapResult<T> = std::result::Result<T, MapError>;
