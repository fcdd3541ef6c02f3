//! Pointer-driven selection state machine

use crate::handles::{hit_test, HandleId};
use crate::selection::{Edge, SelectionModel, SelectionRect};

/// Pointer event in virtual-desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Release { x: i32, y: i32 },
}

/// Current gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    /// Moving the whole rectangle; offset of the pointer from the top-left
    Dragging { grab_offset: (i32, i32) },
    Resizing { handle: HandleId },
}

/// Applies pointer gestures to a [`SelectionModel`]
#[derive(Debug, Clone, Copy)]
pub struct SelectionController {
    model: SelectionModel,
    state: InteractionState,
}

impl SelectionController {
    pub fn new(rect: SelectionRect) -> Self {
        Self {
            model: SelectionModel::new(rect),
            state: InteractionState::Idle,
        }
    }

    pub fn selection(&self) -> SelectionRect {
        self.model.rect()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != InteractionState::Idle
    }

    /// Feed one event; returns true if the rectangle changed
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Press { x, y } => {
                self.press(x, y);
                false
            }
            PointerEvent::Move { x, y } => self.pointer_moved(x, y),
            PointerEvent::Release { .. } => {
                if self.is_active() {
                    log::debug!("Gesture {:?} ended", self.state);
                }
                self.state = InteractionState::Idle;
                false
            }
        }
    }

    /// Abandon any gesture in progress
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    fn press(&mut self, x: i32, y: i32) {
        let rect = self.model.rect();
        self.state = if let Some(handle) = hit_test((x, y), &rect) {
            InteractionState::Resizing { handle }
        } else if rect.contains(x, y) {
            let (left, top) = rect.top_left();
            InteractionState::Dragging { grab_offset: (x - left, y - top) }
        } else {
            InteractionState::Idle
        };
        log::debug!("Press at ({}, {}) -> {:?}", x, y, self.state);
    }

    fn pointer_moved(&mut self, x: i32, y: i32) -> bool {
        let before = self.model.rect();
        match self.state {
            InteractionState::Idle => return false,
            InteractionState::Dragging { grab_offset: (gx, gy) } => {
                let (left, top) = before.top_left();
                self.model.translate(x - gx - left, y - gy - top);
            }
            InteractionState::Resizing { handle } => {
                for &edge in handle.edges() {
                    let value = match edge {
                        Edge::Left | Edge::Right => x,
                        Edge::Top | Edge::Bottom => y,
                    };
                    self.model.resize_edge(edge, value);
                }
            }
        }
        self.model.rect() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SelectionController {
        SelectionController::new(SelectionRect { x1: 100, y1: 100, x2: 500, y2: 400 })
    }

    #[test]
    fn bottom_right_resize_scenario() {
        let mut c = controller();
        c.handle(PointerEvent::Press { x: 500, y: 400 });
        assert_eq!(c.state(), InteractionState::Resizing { handle: HandleId::BottomRight });

        assert!(c.handle(PointerEvent::Move { x: 700, y: 500 }));
        c.handle(PointerEvent::Release { x: 700, y: 500 });

        assert_eq!(c.selection(), SelectionRect { x1: 100, y1: 100, x2: 700, y2: 500 });
        assert_eq!(c.state(), InteractionState::Idle);
    }

    #[test]
    fn edge_handle_drives_one_axis() {
        let mut c = controller();
        c.handle(PointerEvent::Press { x: 300, y: 100 });
        assert_eq!(c.state(), InteractionState::Resizing { handle: HandleId::TopMid });
        c.handle(PointerEvent::Move { x: 999, y: 40 });
        assert_eq!(c.selection(), SelectionRect { x1: 100, y1: 40, x2: 500, y2: 400 });
    }

    #[test]
    fn dragging_keeps_grab_offset_and_size() {
        let mut c = controller();
        c.handle(PointerEvent::Press { x: 150, y: 120 });
        assert_eq!(c.state(), InteractionState::Dragging { grab_offset: (50, 20) });

        for (x, y) in [(160, 130), (-40, 900), (1000, 5)] {
            c.handle(PointerEvent::Move { x, y });
            let r = c.selection();
            assert_eq!((r.width(), r.height()), (400, 300));
            assert_eq!(r.top_left(), (x - 50, y - 20));
        }
    }

    #[test]
    fn press_outside_is_a_no_op() {
        let mut c = controller();
        c.handle(PointerEvent::Press { x: 900, y: 900 });
        assert_eq!(c.state(), InteractionState::Idle);
        assert!(!c.handle(PointerEvent::Move { x: 10, y: 10 }));
        assert_eq!(c.selection(), controller().selection());
    }

    #[test]
    fn crossing_the_opposite_edge_pins_instead_of_inverting() {
        let mut c = controller();
        c.handle(PointerEvent::Press { x: 100, y: 100 });
        c.handle(PointerEvent::Move { x: 800, y: 900 });
        let r = c.selection();
        assert_eq!(r, SelectionRect { x1: 499, y1: 399, x2: 500, y2: 400 });
        assert!(r.is_valid());
    }

    #[test]
    fn moves_without_press_change_nothing() {
        let mut c = controller();
        assert!(!c.handle(PointerEvent::Move { x: 300, y: 300 }));
        c.handle(PointerEvent::Release { x: 300, y: 300 });
        assert_eq!(c.selection(), controller().selection());
    }

    #[test]
    fn reset_abandons_gesture_mid_drag() {
        let mut c = controller();
        c.handle(PointerEvent::Press { x: 200, y: 200 });
        c.handle(PointerEvent::Move { x: 250, y: 260 });
        c.reset();
        assert_eq!(c.state(), InteractionState::Idle);
        let moved = c.selection();
        c.handle(PointerEvent::Move { x: 0, y: 0 });
        assert_eq!(c.selection(), moved);
    }
}
