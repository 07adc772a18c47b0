use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use super::queue::{InputEvent, InputQueue};

/// Shared last-known pointer position.
///
/// Clones share one cell: input code writes it, the particle system reads it
/// during the behavior step. `None` until the pointer is first seen, and again
/// after it leaves the surface.
#[derive(Debug, Clone, Default)]
pub struct Pointer(Rc<Cell<Option<Vec2>>>);

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Vec2> {
        self.0.get()
    }

    pub fn set(&self, position: Vec2) {
        self.0.set(Some(position));
    }

    pub fn clear(&self) {
        self.0.set(None);
    }

    /// Update from a single event.
    pub fn apply(&self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { x, y }
            | InputEvent::PointerUp { x, y }
            | InputEvent::PointerMove { x, y } => self.set(Vec2::new(x, y)),
            InputEvent::PointerLeave => self.clear(),
        }
    }

    /// Drain `queue`, applying events in arrival order.
    pub fn apply_all(&self, queue: &mut InputQueue) {
        for event in queue.drain() {
            self.apply(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_position() {
        let a = Pointer::new();
        let b = a.clone();
        assert_eq!(b.get(), None);
        a.set(Vec2::new(3.0, 4.0));
        assert_eq!(b.get(), Some(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn last_event_wins_and_leave_clears() {
        let pointer = Pointer::new();
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerMove { x: 1.0, y: 1.0 });
        q.push(InputEvent::PointerDown { x: 5.0, y: 6.0 });
        pointer.apply_all(&mut q);
        assert!(q.is_empty());
        assert_eq!(pointer.get(), Some(Vec2::new(5.0, 6.0)));

        pointer.apply(&InputEvent::PointerLeave);
        assert_eq!(pointer.get(), None);
    }
}
