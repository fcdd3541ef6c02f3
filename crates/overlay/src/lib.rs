//! Overlay module for RegionSnap
//!
//! Provides the adjustable selection rectangle: geometry, resize handles,
//! the pointer state machine and the semi-transparent overlay window.

pub mod controller;
pub mod handles;
pub mod placement;
pub mod selection;

#[cfg(windows)]
pub mod render;
#[cfg(windows)]
pub mod window;

pub use controller::{InteractionState, PointerEvent, SelectionController};
pub use handles::{handle_hit_boxes, hit_test, HandleBox, HandleId, HANDLE_SIZE};
pub use placement::{centered_default, initial_selection, saved_geometry, SavedGeometry};
pub use selection::{Edge, SelectionModel, SelectionRect};

#[cfg(windows)]
pub use window::OverlayWindow;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Windows API error: {0}")]
    Windows(String),

    #[error("Overlay window could not be created")]
    CreateFailed,
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// How a selection session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// User confirmed; the final rectangle is in the controller
    Confirmed,
    /// User cancelled
    Cancelled,
}
