//! Sparse grid scan for flat, weakly textured image regions.
//!
//! Grid points are spaced `grid_stride` apart, but the Sobel gradient at each
//! point is taken from its immediate 8-neighborhood, so edge sensitivity does
//! not scale with the grid. Texture variance uses a wider `±texture_radius`
//! window around the same point.

use super::gray::GrayFrame;
use super::SurfacePoint;
use crate::detector::VisionConfig;

/// Sobel gradient magnitude at `(x, y)` from the adjacent pixels.
///
/// Requires `1 <= x < width - 1` and `1 <= y < height - 1`.
#[inline]
pub(crate) fn sobel_at(gray: &GrayFrame, x: u32, y: u32) -> f32 {
    let p = |dx: i32, dy: i32| gray.at((x as i32 + dx) as u32, (y as i32 + dy) as u32);
    let tl = p(-1, -1);
    let tc = p(0, -1);
    let tr = p(1, -1);
    let ml = p(-1, 0);
    let mr = p(1, 0);
    let bl = p(-1, 1);
    let bc = p(0, 1);
    let br = p(1, 1);

    let gx = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
    let gy = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);
    (gx * gx + gy * gy).sqrt()
}

/// Mean absolute luminance difference between `(x, y)` and the samples of
/// the `±radius` window taken every `step` pixels (center included).
///
/// Requires the window to lie inside the frame.
pub(crate) fn texture_variance_at(gray: &GrayFrame, x: u32, y: u32, radius: u32, step: u32) -> f32 {
    let center = gray.at(x, y);
    let r = radius as i32;
    let step = step.max(1) as usize;
    let mut sum = 0.0f32;
    let mut count = 0u32;
    for dy in (-r..=r).step_by(step) {
        for dx in (-r..=r).step_by(step) {
            let v = gray.at((x as i32 + dx) as u32, (y as i32 + dy) as u32);
            sum += (v - center).abs();
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    sum / count as f32
}

/// Scan the grid and return every accepted surface point in row-major order.
pub fn scan_frame(gray: &GrayFrame, config: &VisionConfig) -> Vec<SurfacePoint> {
    let (w, h) = (gray.width(), gray.height());
    // The texture window and the Sobel neighborhood must both stay inside.
    let margin = config.border.max(config.texture_radius).max(1);
    if w <= 2 * margin || h <= 2 * margin {
        return Vec::new();
    }
    let stride = config.grid_stride.max(1) as usize;

    let mut points = Vec::new();
    let mut n_candidates = 0usize;
    for y in (margin..h - margin).step_by(stride) {
        for x in (margin..w - margin).step_by(stride) {
            let magnitude = sobel_at(gray, x, y);
            if magnitude >= config.max_gradient {
                continue;
            }
            n_candidates += 1;

            let texture =
                texture_variance_at(gray, x, y, config.texture_radius, config.texture_step);
            if texture >= config.max_texture_variance {
                continue;
            }

            points.push(SurfacePoint {
                normalized_x: x as f32 / w as f32,
                normalized_y: y as f32 / h as f32,
                confidence: ((config.confidence_range - texture) / config.confidence_range)
                    .clamp(0.0, 1.0),
                depth_estimate: (1.0 - magnitude / 255.0).clamp(0.0, 1.0),
            });
        }
    }

    tracing::debug!(
        "grid scan {}x{}: {} low-gradient candidates, {} accepted",
        w,
        h,
        n_candidates,
        points.len()
    );
    points
}

/// Mean confidence of `points`, 0 when empty.
pub fn aggregate_confidence(points: &[SurfacePoint]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.confidence).sum::<f32>() / points.len() as f32
}
