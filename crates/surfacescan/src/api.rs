//! High-level detection API.
//!
//! [`SurfaceDetector`] is the primary entry point. It wraps one of the three
//! detector variants, chosen at construction, behind a single
//! `ingest(input) -> output` contract so the placement gate and the host glue
//! stay variant-agnostic.

use image::RgbaImage;

use crate::detector::{DetectConfig, DetectorKind};
use crate::motion::{MotionDetector, MotionSample, MotionState, OrientationSample};
use crate::native::{DetectedPlane, NativeDetector, XrFrameData};
use crate::vision::{SurfacePoint, VisionDetector};

/// One unit of host input.
///
/// Inputs that mean nothing to the active variant (a video frame for the
/// motion detector, a motion sample for the native detector) are ignored.
#[derive(Debug, Clone, Copy)]
pub enum DetectorInput<'a> {
    /// Device-motion event.
    Motion(MotionSample),
    /// Device-orientation event.
    Orientation(OrientationSample),
    /// Periodic poll from the host timer.
    Tick { now_ms: u64 },
    /// Rasterized camera frame.
    VideoFrame(&'a RgbaImage),
    /// Native AR frame with plane and hit-test results.
    XrFrame(&'a XrFrameData),
}

/// Surface candidates produced by the active variant.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum Candidates {
    /// The motion variant has no spatial candidates.
    #[default]
    None,
    Points(Vec<SurfacePoint>),
    Planes(Vec<DetectedPlane>),
}

/// Detector state after an ingest.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectorOutput {
    pub kind: DetectorKind,
    /// Confidence in [0, 1].
    pub confidence: f32,
    /// The variant's placement condition currently holds.
    pub surface_detected: bool,
    pub candidates: Candidates,
}

/// Surface detector with a variant chosen at construction time.
///
/// # Examples
///
/// ```
/// use surfacescan::{DetectConfig, DetectorInput, DetectorKind, SurfaceDetector};
/// use image::RgbaImage;
///
/// let config = DetectConfig::for_kind(DetectorKind::VisionHeuristic);
/// let mut detector = SurfaceDetector::new(&config);
/// let frame = RgbaImage::from_pixel(320, 240, image::Rgba([128, 128, 128, 255]));
/// let out = detector.ingest(DetectorInput::VideoFrame(&frame));
/// assert!(out.surface_detected);
/// ```
#[derive(Debug, Clone)]
pub enum SurfaceDetector {
    MotionHeuristic(MotionDetector),
    VisionHeuristic(VisionDetector),
    NativePlatform(NativeDetector),
}

impl SurfaceDetector {
    /// Build the variant named by `config.kind`.
    pub fn new(config: &DetectConfig) -> Self {
        match config.kind {
            DetectorKind::MotionHeuristic => {
                Self::MotionHeuristic(MotionDetector::new(config.motion.clone()))
            }
            DetectorKind::VisionHeuristic => {
                Self::VisionHeuristic(VisionDetector::new(config.vision.clone()))
            }
            DetectorKind::NativePlatform => {
                Self::NativePlatform(NativeDetector::new(config.native.clone()))
            }
        }
    }

    pub fn kind(&self) -> DetectorKind {
        match self {
            Self::MotionHeuristic(_) => DetectorKind::MotionHeuristic,
            Self::VisionHeuristic(_) => DetectorKind::VisionHeuristic,
            Self::NativePlatform(_) => DetectorKind::NativePlatform,
        }
    }

    /// Feed one input and report the resulting state.
    pub fn ingest(&mut self, input: DetectorInput<'_>) -> DetectorOutput {
        match (&mut *self, input) {
            (Self::MotionHeuristic(det), DetectorInput::Motion(sample)) => {
                det.ingest_motion(&sample);
            }
            (Self::MotionHeuristic(det), DetectorInput::Orientation(sample)) => {
                det.ingest_orientation(&sample);
            }
            (Self::MotionHeuristic(det), DetectorInput::Tick { now_ms }) => {
                det.poll(now_ms);
            }
            (Self::VisionHeuristic(det), DetectorInput::VideoFrame(frame)) => {
                det.ingest_frame(frame);
            }
            (Self::NativePlatform(det), DetectorInput::XrFrame(frame)) => {
                det.ingest_frame(frame);
            }
            (det, other) => {
                tracing::trace!("{:?} ignores {}", det.kind(), input_name(&other));
            }
        }
        self.output()
    }

    /// Current state without feeding new input.
    pub fn output(&self) -> DetectorOutput {
        DetectorOutput {
            kind: self.kind(),
            confidence: self.confidence(),
            surface_detected: self.surface_detected(),
            candidates: self.candidates(),
        }
    }

    /// Confidence in [0, 1].
    pub fn confidence(&self) -> f32 {
        match self {
            Self::MotionHeuristic(det) => det.confidence(),
            Self::VisionHeuristic(det) => det.confidence(),
            Self::NativePlatform(det) => det.confidence(),
        }
    }

    /// Whether the variant's placement condition currently holds.
    pub fn surface_detected(&self) -> bool {
        match self {
            Self::MotionHeuristic(det) => det.state() == MotionState::Detected,
            Self::VisionHeuristic(det) => det.surface_detected(),
            Self::NativePlatform(det) => det.reticle().is_visible(),
        }
    }

    pub fn candidates(&self) -> Candidates {
        match self {
            Self::MotionHeuristic(_) => Candidates::None,
            Self::VisionHeuristic(det) => Candidates::Points(det.latest().points.clone()),
            Self::NativePlatform(det) => {
                Candidates::Planes(det.tracker().planes().cloned().collect())
            }
        }
    }

    /// Stop trusting sensor input; only the motion variant has sensors to lose.
    pub fn disable(&mut self) {
        if let Self::MotionHeuristic(det) = self {
            det.disable();
        }
    }

    /// Drop all derived state (history, detections, planes).
    pub fn reset(&mut self) {
        match self {
            Self::MotionHeuristic(det) => det.reset(),
            Self::VisionHeuristic(det) => det.reset(),
            Self::NativePlatform(det) => det.reset(),
        }
    }
}

fn input_name(input: &DetectorInput<'_>) -> &'static str {
    match input {
        DetectorInput::Motion(_) => "motion sample",
        DetectorInput::Orientation(_) => "orientation sample",
        DetectorInput::Tick { .. } => "tick",
        DetectorInput::VideoFrame(_) => "video frame",
        DetectorInput::XrFrame(_) => "xr frame",
    }
}
