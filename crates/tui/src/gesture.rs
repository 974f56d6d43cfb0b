//! Pointer gestures with scoped lifetimes.
//!
//! A gesture starts on mouse-down, receives every pointer move and ends
//! exactly once. [`GestureTracker`] owns the active gesture, so whichever
//! way the interaction stops (release, Escape, leaving the view, quitting)
//! the transient drag state is released with it.

use ratatui::layout::Position;

/// An in-progress pointer interaction.
pub trait Gesture {
    /// What the gesture hands back when it ends.
    type Outcome;

    /// The pointer moved to `pointer` (terminal cell coordinates).
    fn moved(&mut self, pointer: Position);

    /// Consume the gesture.
    fn finish(self) -> Self::Outcome;
}

/// Holds at most one active gesture.
#[derive(Debug)]
pub struct GestureTracker<G> {
    active: Option<G>,
}

impl<G> Default for GestureTracker<G> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<G: Gesture> GestureTracker<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `gesture`. A gesture that was still active is finished first
    /// and its outcome returned.
    pub fn begin(&mut self, gesture: G) -> Option<G::Outcome> {
        let previous = self.end();
        self.active = Some(gesture);
        previous
    }

    /// Forward a pointer move. Returns `false` when no gesture is active.
    pub fn update(&mut self, pointer: Position) -> bool {
        match self.active.as_mut() {
            Some(gesture) => {
                gesture.moved(pointer);
                true
            }
            None => false,
        }
    }

    /// Finish the active gesture. Returns its outcome exactly once.
    pub fn end(&mut self) -> Option<G::Outcome> {
        self.active.take().map(Gesture::finish)
    }

    /// Drop the active gesture without producing an outcome.
    pub fn cancel(&mut self) -> Option<G> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&G> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
