//! surfacescan — surface detection and placement gating for camera-based AR overlays.
//!
//! A host application (browser shell, native viewer, offline replay tool)
//! feeds per-frame input into a [`SurfaceDetector`] and asks the
//! [`PlacementGate`] whether a tap may place a virtual menu item. Three
//! interchangeable detector variants exist:
//!
//! 1. **Motion heuristic** – accelerometer variance and gravity alignment
//!    accumulate a surface-quality score with a Calibrating/Detected state.
//! 2. **Vision heuristic** – a sparse Sobel + texture-variance grid scan on
//!    camera frames yields surface points and loose clusters.
//! 3. **Native platform** – bookkeeping over plane-detection and hit-test
//!    results delivered by the host AR runtime.
//!
//! # Public API
//! - [`SurfaceDetector`] with [`DetectorInput`] / [`DetectorOutput`]
//! - [`DetectConfig`] and per-variant configs for tuning
//! - [`PlacementGate`] and [`PlacedItems`] for tap handling
//! - [`ArSession`] with the [`Platform`] trait for resource lifecycle
//! - [`MenuCatalog`] for the items that can be placed
//!
//! Rendering and UI are out of scope; [`render_overlay`] exists only to dump
//! detection results for inspection.

mod api;
mod detector;
mod error;
mod menu;
mod motion;
mod native;
mod placement;
mod platform;
mod session;
#[cfg(test)]
mod test_utils;
mod vision;

pub use api::{Candidates, DetectorInput, DetectorOutput, SurfaceDetector};
pub use detector::{
    DetectConfig, DetectorKind, MotionConfig, NativeConfig, PlacementConfig, VisionConfig,
};
pub use error::SessionError;
pub use menu::{MenuCatalog, MenuItem, ModelKind};
pub use motion::{
    Acceleration, MagnitudeHistory, MotionDetector, MotionReport, MotionSample, MotionState,
    OrientationSample, SampleOutcome,
};
pub use native::{
    DetectedPlane, HitTestResult, NativeDetector, NativePlaneObservation, PlaneBounds, PlaneId,
    PlaneTracker, Pose, Reticle, XrFrameData,
};
pub use placement::{
    GateDecision, PlacedItem, PlacedItems, PlacementGate, PlacementPose, RejectReason, TapEvent,
};
pub use platform::{
    CameraRequest, Capabilities, Capability, FacingMode, FrameCallbackId, ListenerId, Permission,
    PermissionStatus, Platform, SensorKind, TrackId, XrFeature, XrSessionId, XrSessionRequest,
};
pub use session::{ArSession, SessionState};
pub use vision::{
    aggregate_confidence, cluster_points, render_overlay, scan_frame, GrayFrame, SurfaceCluster,
    SurfacePoint, VisionDetection, VisionDetector,
};
