// Ingestion limits for pattern text and host-supplied numbers

use crate::error::{Error, Result};

// Pattern caps
pub const MAX_PATTERN_TOKENS: usize = 100_000;
// Rows times width, empty cells included. Not below MAX_PATTERN_TOKENS so a
// single row always fits.
pub const MAX_GRID_CELLS: usize = 1_000_000;
// All-pairs forces beyond this leave the physics layout unrelaxed
pub const MAX_PHYSICS_NODES: usize = 2_000;

// Numeric bounds
pub const SPACING_MAX: f32 = 1_000.0;
pub const CANVAS_MAX: f32 = 100_000.0;
pub const COORD_MIN: f32 = -10_000_000.0;
pub const COORD_MAX: f32 = 10_000_000.0;

// Slack when deciding whether a round spans a full circle (degrees)
pub const EPS_FULL_CIRCLE: f32 = 1e-3;

#[inline]
pub fn in_coord_bounds(x: f32) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn is_full_circle(total_angle: f32) -> bool { (total_angle.abs() - 360.0).abs() <= EPS_FULL_CIRCLE }

pub fn check_range(param: &'static str, v: f32, min: f32, max: f32) -> Result<f32> {
    if !v.is_finite() {
        return Err(Error::NonFinite { param });
    }
    if v < min || v > max {
        return Err(Error::OutOfRange { param, min, max, got: v });
    }
    Ok(v)
}
