//! Ink capture session.
//!
//! One `InkCapture` belongs to one drawing surface and owns everything that
//! changes while the user draws: the committed strokes and the stroke in
//! progress. The recognizer never sees this object, only the immutable
//! [`Pattern`] returned by [`InkCapture::snapshot`].

use log::{trace, warn};

use super::entities::*;

/// Raw surface events, as a pointer or touch device reports them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureEvent {
    Down(Point),
    Move(Point),
    Up,
    // Pointer left the surface
    Leave,
}

/// Records ink as the pen reports it. Every sample is stored once, in
/// arrival order; moves are not stored as `[previous, current]` segments,
/// so interior points carry no extra weight in the moments.
#[derive(Debug, Default)]
pub struct InkCapture {
    pattern: Pattern,
    // Stroke being drawn, if the pen is down
    current: Option<Stroke>,
}

impl InkCapture {
    pub fn new() -> InkCapture {
        InkCapture::default()
    }

    /// Pen down. A stroke still in progress is dropped, not committed.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.current.is_some() {
            warn!("Stroke started while another was in progress; discarding the unfinished stroke");
        }
        self.current = Some(Stroke::new(vec![point]));
    }

    /// Pen moved. Returns false (and ignores the point) if no stroke is in
    /// progress.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match self.current.as_mut() {
            Some(stroke) => {
                stroke.points.push(point);
                true
            }
            None => false,
        }
    }

    /// Pen up: commits the stroke in progress. Returns whether a stroke was
    /// committed; calling it again for the same contact is a no-op.
    pub fn end_stroke(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) => {
                trace!("Committed stroke {} with {} points", self.pattern.len() + 1, stroke.len());
                self.pattern.strokes.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Drops the stroke in progress without committing it.
    pub fn abort_stroke(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Feeds one raw surface event. Leaving the surface with the pen down
    /// commits the stroke, and the `Up` that follows does nothing. Returns
    /// whether a stroke was committed.
    pub fn handle(&mut self, event: CaptureEvent) -> bool {
        match event {
            CaptureEvent::Down(point) => {
                self.begin_stroke(point);
                false
            }
            CaptureEvent::Move(point) => {
                self.extend_stroke(point);
                false
            }
            CaptureEvent::Up | CaptureEvent::Leave => self.end_stroke(),
        }
    }

    /// Clears all ink, including a stroke in progress.
    pub fn erase(&mut self) {
        self.pattern.strokes.clear();
        self.current = None;
    }

    /// Removes and returns the last committed stroke.
    pub fn undo_last(&mut self) -> Option<Stroke> {
        self.pattern.strokes.pop()
    }

    /// Copy of the committed ink, safe to hand to a recognizer on another thread.
    pub fn snapshot(&self) -> Pattern {
        self.pattern.clone()
    }

    pub fn stroke_count(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }
}
