//! Screen capture module for RegionSnap
//!
//! Provides monitor topology, virtual desktop coordinate mapping and
//! region capture with optional pointer marker.

pub mod frame;
pub mod monitor;
pub mod options;
pub mod pointer;
pub mod service;

#[cfg(windows)]
pub mod screen;

pub use frame::CapturedImage;
pub use monitor::{compute_virtual_desktop, locate, VirtualDesktop};
pub use options::{CaptureOptions, CAPTURE_DELAY_SECONDS};
pub use service::{CaptureService, ScreenSource};

#[cfg(windows)]
pub use screen::GdiScreen;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Windows API error: {0}")]
    Windows(String),

    #[error("No monitors attached")]
    NoMonitors,

    #[error("Capture region {0:?} lies outside the virtual desktop")]
    EmptyRegion(Rect),

    #[error("Screen grab failed: {0}")]
    Grab(String),

    #[error("Pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from two corners, `(x1, y1)` inclusive and `(x2, y2)` exclusive
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).unsigned_abs(),
            height: (y2 - y1).unsigned_abs(),
        }
    }

    /// Exclusive right edge, saturating at `i32::MAX`
    pub fn right(&self) -> i32 {
        edge(self.x, self.width)
    }

    /// Exclusive bottom edge, saturating at `i32::MAX`
    pub fn bottom(&self) -> i32 {
        edge(self.y, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Half-open: the right and bottom edges are outside
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check that `other` lies entirely inside this rectangle
    ///
    /// Edges are compared in `i64` so oversized records cannot wrap inside.
    pub fn encloses(&self, other: &Rect) -> bool {
        let far = |start: i32, len: u32| start as i64 + len as i64;
        other.x >= self.x
            && other.y >= self.y
            && far(other.x, other.width) <= far(self.x, self.width)
            && far(other.y, other.height) <= far(self.y, self.height)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x &&
        self.y < other.bottom() && self.bottom() > other.y
    }

    /// Overlapping part of two rectangles, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Some(Rect::from_corners(x1, y1, x2, y2))
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }
}

fn edge(start: i32, len: u32) -> i32 {
    (start as i64 + len as i64).min(i32::MAX as i64) as i32
}
