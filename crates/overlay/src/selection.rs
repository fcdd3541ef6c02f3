//! Selection rectangle and its geometry invariants

use capture::Rect;

/// Rectangle edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

/// Selection in virtual-desktop coordinates, always `x1 < x2` and `y1 < y2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl SelectionRect {
    /// Normalize arbitrary corners into a valid rectangle
    ///
    /// Inverted edges are swapped; a degenerate axis grows to 1 pixel.
    pub fn normalized(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x1, x2) = order(x1, x2);
        let (y1, y2) = order(y1, y2);
        Self { x1, y1, x2, y2 }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::normalized(rect.x, rect.y, rect.right(), rect.bottom())
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_corners(self.x1, self.y1, self.x2, self.y2)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn top_left(&self) -> (i32, i32) {
        (self.x1, self.y1)
    }

    /// Point inside the rectangle body, edges included
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }
}

fn order(a: i32, b: i32) -> (i32, i32) {
    match a.cmp(&b) {
        std::cmp::Ordering::Less => (a, b),
        std::cmp::Ordering::Greater => (b, a),
        std::cmp::Ordering::Equal => (a, a + 1),
    }
}

/// Owner of the current selection; every mutation keeps it valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionModel {
    rect: SelectionRect,
}

impl SelectionModel {
    pub fn new(rect: SelectionRect) -> Self {
        let mut model = Self { rect };
        model.set(rect);
        model
    }

    pub fn rect(&self) -> SelectionRect {
        self.rect
    }

    /// Replace the rectangle, normalizing its corners
    pub fn set(&mut self, rect: SelectionRect) {
        self.rect = SelectionRect::normalized(rect.x1, rect.y1, rect.x2, rect.y2);
    }

    pub fn width(&self) -> i32 {
        self.rect.width()
    }

    pub fn height(&self) -> i32 {
        self.rect.height()
    }

    /// Move without changing size
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.rect.x1 += dx;
        self.rect.x2 += dx;
        self.rect.y1 += dy;
        self.rect.y2 += dy;
    }

    /// Move one edge to `value`, pinned one pixel short of the opposite edge
    pub fn resize_edge(&mut self, edge: Edge, value: i32) {
        let r = &mut self.rect;
        match edge {
            Edge::Left => r.x1 = value.min(r.x2 - 1),
            Edge::Right => r.x2 = value.max(r.x1 + 1),
            Edge::Top => r.y1 = value.min(r.y2 - 1),
            Edge::Bottom => r.y2 = value.max(r.y1 + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SelectionModel {
        SelectionModel::new(SelectionRect { x1: 100, y1: 100, x2: 500, y2: 400 })
    }

    #[test]
    fn set_swaps_inverted_corners() {
        let mut m = model();
        m.set(SelectionRect { x1: 500, y1: 400, x2: 100, y2: 100 });
        assert_eq!(m.rect(), SelectionRect { x1: 100, y1: 100, x2: 500, y2: 400 });
    }

    #[test]
    fn set_grows_degenerate_axis() {
        let mut m = model();
        m.set(SelectionRect { x1: 50, y1: 60, x2: 50, y2: 60 });
        assert!(m.rect().is_valid());
        assert_eq!((m.width(), m.height()), (1, 1));
    }

    #[test]
    fn translate_preserves_size() {
        let mut m = model();
        let (w, h) = (m.width(), m.height());
        for (dx, dy) in [(10, -20), (-300, 700), (0, 0), (-5000, -5000)] {
            m.translate(dx, dy);
            assert_eq!((m.width(), m.height()), (w, h));
        }
        assert_eq!(m.rect().top_left(), (100 + 10 - 300 - 5000, 100 - 20 + 700 - 5000));
    }

    #[test]
    fn resize_edge_moves_one_edge() {
        let mut m = model();
        m.resize_edge(Edge::Right, 700);
        m.resize_edge(Edge::Top, 50);
        assert_eq!(m.rect(), SelectionRect { x1: 100, y1: 50, x2: 700, y2: 400 });
    }

    #[test]
    fn resize_edge_pins_at_one_pixel() {
        let mut m = model();
        m.resize_edge(Edge::Left, 10_000);
        assert_eq!((m.rect().x1, m.rect().x2), (499, 500));

        m.resize_edge(Edge::Bottom, -10_000);
        assert_eq!((m.rect().y1, m.rect().y2), (100, 101));

        m.resize_edge(Edge::Right, i32::MIN / 2);
        m.resize_edge(Edge::Top, i32::MAX / 2);
        assert!(m.rect().is_valid());
        assert_eq!((m.width(), m.height()), (1, 1));
    }

    #[test]
    fn every_mutation_keeps_rect_valid() {
        let mut m = model();
        let edges = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];
        for (i, value) in (-600..1200).step_by(37).enumerate() {
            m.resize_edge(edges[i % 4], value);
            assert!(m.rect().is_valid(), "invalid after {:?}", m.rect());
            assert!(m.width() >= 1 && m.height() >= 1);

            m.set(SelectionRect { x1: value, y1: 3, x2: -value, y2: value / 2 });
            assert!(m.rect().is_valid(), "invalid after set {:?}", m.rect());
        }
    }

    #[test]
    fn rect_conversion_round_trips() {
        let r = Rect::new(320, 200, 640, 400);
        let sel = SelectionRect::from_rect(&r);
        assert_eq!(sel, SelectionRect { x1: 320, y1: 200, x2: 960, y2: 600 });
        assert_eq!(sel.to_rect(), r);
    }
}
