//! Resize handle layout and hit-testing
//!
//! Hit boxes are closed squares: a point on any of the four box edges is
//! inside. Where boxes overlap, [`HandleId::PRIORITY`] decides.

use crate::selection::{Edge, SelectionRect};
use capture::Rect;

/// Side length of a handle's hit box
pub const HANDLE_SIZE: i32 = 10;

/// One of the eight resize handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleId {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopMid,
    BottomMid,
    LeftMid,
    RightMid,
}

impl HandleId {
    /// Hit-test order: corners before edge midpoints
    pub const PRIORITY: [HandleId; 8] = [
        HandleId::TopLeft,
        HandleId::TopRight,
        HandleId::BottomLeft,
        HandleId::BottomRight,
        HandleId::TopMid,
        HandleId::BottomMid,
        HandleId::LeftMid,
        HandleId::RightMid,
    ];

    /// Edges this handle drives while resizing
    pub fn edges(self) -> &'static [Edge] {
        match self {
            HandleId::TopLeft => &[Edge::Left, Edge::Top],
            HandleId::TopRight => &[Edge::Right, Edge::Top],
            HandleId::BottomLeft => &[Edge::Left, Edge::Bottom],
            HandleId::BottomRight => &[Edge::Right, Edge::Bottom],
            HandleId::TopMid => &[Edge::Top],
            HandleId::BottomMid => &[Edge::Bottom],
            HandleId::LeftMid => &[Edge::Left],
            HandleId::RightMid => &[Edge::Right],
        }
    }

    pub fn is_corner(self) -> bool {
        self.edges().len() == 2
    }

    /// Anchor point of the handle on `rect`
    pub fn center(self, rect: &SelectionRect) -> (i32, i32) {
        let mid_x = rect.x1 + rect.width() / 2;
        let mid_y = rect.y1 + rect.height() / 2;
        match self {
            HandleId::TopLeft => (rect.x1, rect.y1),
            HandleId::TopRight => (rect.x2, rect.y1),
            HandleId::BottomLeft => (rect.x1, rect.y2),
            HandleId::BottomRight => (rect.x2, rect.y2),
            HandleId::TopMid => (mid_x, rect.y1),
            HandleId::BottomMid => (mid_x, rect.y2),
            HandleId::LeftMid => (rect.x1, mid_y),
            HandleId::RightMid => (rect.x2, mid_y),
        }
    }

    /// Hit box of the handle on `rect`
    pub fn hit_box(self, rect: &SelectionRect) -> HandleBox {
        let (cx, cy) = self.center(rect);
        let half = HANDLE_SIZE / 2;
        HandleBox {
            left: cx - half,
            top: cy - half,
            right: cx + half,
            bottom: cy + half,
        }
    }
}

/// Closed square around a handle anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl HandleBox {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Pixel rectangle covering the box, for drawing
    pub fn to_rect(&self) -> Rect {
        Rect::from_corners(self.left, self.top, self.right + 1, self.bottom + 1)
    }
}

/// All eight hit boxes, in priority order
pub fn handle_hit_boxes(rect: &SelectionRect) -> [(HandleId, HandleBox); 8] {
    HandleId::PRIORITY.map(|id| (id, id.hit_box(rect)))
}

/// First handle whose box contains `point`
pub fn hit_test(point: (i32, i32), rect: &SelectionRect) -> Option<HandleId> {
    let (x, y) = point;
    HandleId::PRIORITY
        .into_iter()
        .find(|id| id.hit_box(rect).contains(x, y))
}
