//! Vision-heuristic surface detection on camera frames.
//!
//! Each detection pass converts the frame to luminance, scans a sparse grid
//! for points with low Sobel gradient and low local texture, and groups the
//! accepted points into loose clusters. Detection runs on every n-th frame;
//! in between, the most recent result is reported unchanged. Results are
//! recomputed from scratch on each pass with no temporal smoothing.

mod cluster;
mod gray;
mod overlay;
mod scan;

pub use cluster::{cluster_points, SurfaceCluster};
pub use gray::GrayFrame;
pub use overlay::render_overlay;
pub use scan::{aggregate_confidence, scan_frame};

use image::RgbaImage;

use crate::detector::VisionConfig;

/// A grid point that looks like part of a flat, untextured surface.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfacePoint {
    /// Horizontal position in [0, 1] of frame width.
    pub normalized_x: f32,
    /// Vertical position in [0, 1] of frame height.
    pub normalized_y: f32,
    /// Flatness confidence in [0, 1], from texture variance.
    pub confidence: f32,
    /// Heuristic depth in [0, 1], from gradient magnitude. Not metric.
    pub depth_estimate: f32,
}

impl SurfacePoint {
    #[inline]
    pub(crate) fn distance_sq_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.normalized_x - x;
        let dy = self.normalized_y - y;
        dx * dx + dy * dy
    }
}

/// Result of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisionDetection {
    /// Index of the frame the pass ran on.
    pub frame_index: u64,
    /// Frame dimensions [width, height].
    pub image_size: [u32; 2],
    pub points: Vec<SurfacePoint>,
    pub clusters: Vec<SurfaceCluster>,
    /// Mean point confidence, 0 without points.
    pub confidence: f32,
}

impl VisionDetection {
    /// Run one full detection pass on `frame`.
    pub fn detect(frame: &RgbaImage, config: &VisionConfig, frame_index: u64) -> Self {
        let gray = GrayFrame::from_rgba(frame);
        let points = scan_frame(&gray, config);
        let clusters = cluster_points(&points, config.cluster_radius);
        let confidence = aggregate_confidence(&points);
        tracing::debug!(
            "frame {}: {} points, {} clusters, confidence={:.3}",
            frame_index,
            points.len(),
            clusters.len(),
            confidence
        );
        Self {
            frame_index,
            image_size: [gray.width(), gray.height()],
            points,
            clusters,
            confidence,
        }
    }

    /// Clusters large enough to draw as surface boundaries.
    pub fn boundary_clusters(&self, min_members: usize) -> impl Iterator<Item = &SurfaceCluster> {
        self.clusters
            .iter()
            .filter(move |c| c.is_boundary(min_members))
    }
}

/// Frame-driven vision detector.
#[derive(Debug, Clone)]
pub struct VisionDetector {
    config: VisionConfig,
    frames_seen: u64,
    passes: u64,
    latest: VisionDetection,
}

impl VisionDetector {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            frames_seen: 0,
            passes: 0,
            latest: VisionDetection::default(),
        }
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Feed one frame; detection runs on frames 0, n, 2n, ...
    ///
    /// Returns the most recent detection, which may come from an earlier frame.
    pub fn ingest_frame(&mut self, frame: &RgbaImage) -> &VisionDetection {
        let index = self.frames_seen;
        self.frames_seen += 1;
        if index % u64::from(self.config.detect_every_n_frames.max(1)) == 0 {
            self.latest = VisionDetection::detect(frame, &self.config, index);
            self.passes += 1;
        }
        &self.latest
    }

    pub fn latest(&self) -> &VisionDetection {
        &self.latest
    }

    /// Number of frames fed so far.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Number of detection passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn confidence(&self) -> f32 {
        self.latest.confidence
    }

    /// Aggregate confidence is above the placement threshold.
    pub fn surface_detected(&self) -> bool {
        self.latest.confidence > self.config.enable_threshold
    }

    /// Closest confident surface point within tap range of `(x, y)`.
    pub fn tap_target(&self, x: f32, y: f32) -> Option<&SurfacePoint> {
        let r2 = self.config.tap_radius * self.config.tap_radius;
        self.latest
            .points
            .iter()
            .filter(|p| p.confidence > self.config.tap_min_confidence)
            .map(|p| (p, p.distance_sq_to(x, y)))
            .filter(|&(_, d2)| d2 < r2)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}
