use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::VisionDetection;

const BOUNDARY_COLOR: Rgba<u8> = Rgba([255, 200, 0, 255]);

/// Draw surface points and boundary clusters on top of `frame`.
///
/// Point markers shade from red (low confidence) to green (high confidence).
pub fn render_overlay(
    frame: &RgbaImage,
    detection: &VisionDetection,
    cluster_min_members: usize,
) -> RgbaImage {
    let mut out = frame.clone();
    let (w, h) = out.dimensions();
    if w == 0 || h == 0 {
        return out;
    }
    let (wf, hf) = (w as f32, h as f32);

    for cluster in detection.boundary_clusters(cluster_min_members) {
        let x0 = (cluster.bounds_min[0] * wf).floor() as i32;
        let y0 = (cluster.bounds_min[1] * hf).floor() as i32;
        let x1 = (cluster.bounds_max[0] * wf).ceil() as i32;
        let y1 = (cluster.bounds_max[1] * hf).ceil() as i32;
        let rect = Rect::at(x0, y0).of_size((x1 - x0).max(1) as u32, (y1 - y0).max(1) as u32);
        draw_hollow_rect_mut(&mut out, rect, BOUNDARY_COLOR);
    }

    for p in &detection.points {
        let c = p.confidence.clamp(0.0, 1.0);
        let color = Rgba([((1.0 - c) * 255.0) as u8, (c * 255.0) as u8, 0, 255]);
        let center = ((p.normalized_x * wf) as i32, (p.normalized_y * hf) as i32);
        draw_filled_circle_mut(&mut out, center, 2, color);
    }
    out
}
