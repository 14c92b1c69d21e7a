//! Collision oracle for positioned bodies
//!
//! Everything collides as an axis-aligned rectangle. The bird can opt into a
//! tighter elliptical mask that is tested only after the rectangles overlap.

use serde::{Deserialize, Serialize};

use super::entity::Body;

/// Hit shape inscribed in a body's rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Hitbox {
    #[default]
    Rect,
    /// Ellipse touching the midpoints of the rectangle's edges
    Ellipse,
}

/// Strict rectangle overlap. Bodies that only share an edge do not overlap.
#[inline]
pub fn overlaps(a: &Body, b: &Body) -> bool {
    let a_max = a.max();
    let b_max = b.max();
    a.pos.x < b_max.x && b.pos.x < a_max.x && a.pos.y < b_max.y && b.pos.y < a_max.y
}

/// Overlap test with per-body shape refinement.
///
/// The rectangle test runs first. An ellipse side then has to reach into the
/// other body's rectangle; when both sides are ellipses each must reach the
/// other, which keeps the test symmetric.
pub fn hitboxes_overlap(a: &Body, shape_a: Hitbox, b: &Body, shape_b: Hitbox) -> bool {
    if !overlaps(a, b) {
        return false;
    }
    match (shape_a, shape_b) {
        (Hitbox::Rect, Hitbox::Rect) => true,
        (Hitbox::Ellipse, Hitbox::Rect) => ellipse_reaches_rect(a, b),
        (Hitbox::Rect, Hitbox::Ellipse) => ellipse_reaches_rect(b, a),
        (Hitbox::Ellipse, Hitbox::Ellipse) => {
            ellipse_reaches_rect(a, b) && ellipse_reaches_rect(b, a)
        }
    }
}

/// Does the ellipse inscribed in `ellipse` touch the rectangle `rect`?
///
/// Scaling space by the ellipse radii turns the ellipse into a unit circle and
/// keeps the rectangle axis-aligned, so a circle-vs-box test is exact.
fn ellipse_reaches_rect(ellipse: &Body, rect: &Body) -> bool {
    let radii = ellipse.size * 0.5;
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return false;
    }
    let center = ellipse.center();
    let closest = center.clamp(rect.pos, rect.max());
    let d = (closest - center) / radii;
    d.length_squared() < 1.0
}
