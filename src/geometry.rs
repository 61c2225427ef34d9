// Path geometry: capture-space samples -> field-space SVG path data.
//
// Field space is the 648x360 top-down view used by the field diagram. The
// capture screen records rows on a 300-high canvas centred on the midline.

use crate::model::{AllianceColor, Point};

pub const FIELD_WIDTH: f64 = 648.0;
pub const FIELD_HEIGHT: f64 = 360.0;
pub const CAPTURE_HEIGHT: f64 = 300.0;

/// Row scale from capture space to field space.
pub const CAPTURE_SCALE: f64 = FIELD_HEIGHT / CAPTURE_HEIGHT;

/// Map one capture-space sample into field space.
pub fn normalize(point: Point) -> Point {
    Point {
        y: point.y * FIELD_HEIGHT / CAPTURE_HEIGHT,
        x: point.x + FIELD_WIDTH / 2.0,
    }
}

/// Inverse of [`normalize`].
pub fn denormalize(point: Point) -> Point {
    Point {
        y: point.y * CAPTURE_HEIGHT / FIELD_HEIGHT,
        x: point.x - FIELD_WIDTH / 2.0,
    }
}

/// Mirror field-space points onto the shared canvas.
///
/// Unflipped paths are reflected across the field's width; flipped paths are
/// reflected across its height instead. Each reflection is its own inverse.
pub fn mirror_for_alliance(points: &[Point], is_flipped: bool) -> Vec<Point> {
    points
        .iter()
        .map(|p| {
            if is_flipped {
                Point::new(FIELD_HEIGHT - p.y, p.x)
            } else {
                Point::new(p.y, FIELD_WIDTH - p.x)
            }
        })
        .collect()
}

/// Which reflection an alliance's captured paths need. Blue paths are
/// mirrored across the width, red paths across the height.
pub fn is_flipped_for(alliance: AllianceColor) -> bool {
    alliance == AllianceColor::Red
}

/// Absolute moveto/lineto path data, `None` when there is nothing to draw.
pub fn to_path_descriptor(points: &[Point]) -> Option<String> {
    let (first, rest) = points.split_first()?;
    let lines: String = rest.iter().map(|p| format!("L{},{}", p.x, p.y)).collect();
    Some(format!("M{},{}{lines}", first.x, first.y))
}

/// Full overlay pipeline for one scouted autonomous path.
pub fn overlay_path(raw: &[Point], alliance: AllianceColor) -> Option<String> {
    let field: Vec<Point> = raw.iter().copied().map(normalize).collect();
    to_path_descriptor(&mirror_for_alliance(&field, is_flipped_for(alliance)))
}
