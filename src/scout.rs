// Pointer-drag capture for the scouting input screen.
//
// Samples are recorded relative to the field element's bounding box, in
// (y, x) order, only while the pointer is held down.

use serde::{Deserialize, Serialize};

use crate::geometry::to_path_descriptor;
use crate::model::Point;

/// Top-left corner of the drawing surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PathCapture {
    origin: BoundingRect,
    drawing: bool,
    path: Vec<Point>,
}

impl PathCapture {
    pub fn new(origin: BoundingRect) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    pub fn pointer_down(&mut self) {
        self.drawing = true;
    }

    /// Record a move in client coordinates. Ignored unless drawing.
    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) {
        if self.drawing {
            self.path
                .push(Point::new(client_y - self.origin.y, client_x - self.origin.x));
        }
    }

    pub fn pointer_up(&mut self) {
        self.drawing = false;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn into_path(self) -> Vec<Point> {
        self.path
    }

    /// Preview path data; `None` until a sample has been recorded.
    pub fn preview(&self) -> Option<String> {
        to_path_descriptor(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_ignored_until_pointer_down() {
        let mut capture = PathCapture::new(BoundingRect { x: 100.0, y: 50.0 });
        capture.pointer_move(150.0, 80.0);
        assert!(capture.path().is_empty());
        assert_eq!(capture.preview(), None);
    }

    #[test]
    fn test_drag_records_relative_samples() {
        let mut capture = PathCapture::new(BoundingRect { x: 100.0, y: 50.0 });
        capture.pointer_down();
        capture.pointer_move(150.0, 80.0);
        capture.pointer_move(160.0, 95.0);
        capture.pointer_up();
        capture.pointer_move(400.0, 400.0);

        assert!(!capture.is_drawing());
        assert_eq!(
            capture.path(),
            &[Point::new(30.0, 50.0), Point::new(45.0, 60.0)]
        );
        assert_eq!(capture.preview().as_deref(), Some("M50,30L60,45"));
    }

    #[test]
    fn test_second_stroke_appends() {
        let mut capture = PathCapture::default();
        capture.pointer_down();
        capture.pointer_move(1.0, 2.0);
        capture.pointer_up();
        capture.pointer_down();
        capture.pointer_move(3.0, 4.0);
        assert_eq!(capture.into_path().len(), 2);
    }
}
