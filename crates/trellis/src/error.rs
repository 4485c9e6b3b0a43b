//! Error types for widget tree operations.

use thiserror::Error;
use trellis_render::RenderError;

/// Errors that can occur during structural widget operations.
///
/// A failed operation leaves the widget tree unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// The widget id is invalid or the widget has been destroyed.
    #[error("invalid or destroyed widget id")]
    InvalidWidget,

    /// Attempted to make a widget its own parent or ancestor.
    #[error("cannot set a widget as its own parent or ancestor")]
    CircularParentage,

    /// The root widget cannot be given a parent.
    #[error("the root widget cannot be reparented")]
    RootReparent,

    /// The root widget lives as long as its surface.
    #[error("the root widget cannot be destroyed")]
    RootDestroy,

    /// A child index is past the end of the child list.
    #[error("child index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// Creating the canvas failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for widget operations.
pub type WidgetResult<T> = Result<T, WidgetError>;
