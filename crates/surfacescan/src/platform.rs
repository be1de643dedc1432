//! Host platform seam: camera capture, motion sensors and native AR sessions.
//!
//! The detector never talks to device APIs directly. An [`ArSession`](crate::ArSession)
//! acquires everything through a [`Platform`] implementation and hands out
//! opaque handles, so every acquired resource can be released on every exit
//! path.

use serde::{Deserialize, Serialize};

/// A device capability a detector variant depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Back-facing video capture.
    Camera,
    /// Device-motion and device-orientation event streams.
    MotionSensors,
    /// Native immersive AR sessions with hit testing.
    ImmersiveAr,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Camera => "camera",
            Self::MotionSensors => "motion sensing",
            Self::ImmersiveAr => "immersive AR",
        };
        f.write_str(name)
    }
}

/// A consent prompt the host may have to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Camera,
    Motion,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Camera => f.write_str("camera"),
            Self::Motion => f.write_str("motion sensor"),
        }
    }
}

/// Result of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Sensor event stream a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    DeviceMotion,
    DeviceOrientation,
}

/// What the host can do, queried once when a session opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub camera: bool,
    pub motion_sensors: bool,
    pub immersive_ar: bool,
    /// Motion events require an explicit consent call before subscription.
    pub motion_permission_required: bool,
}

impl Capabilities {
    /// Returns `true` when `capability` is present.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Camera => self.camera,
            Capability::MotionSensors => self.motion_sensors,
            Capability::ImmersiveAr => self.immersive_ar,
        }
    }
}

/// Handle to a live media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

/// Handle to a registered sensor listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Handle to a native AR session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct XrSessionId(pub u64);

/// Handle to a scheduled per-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameCallbackId(pub u64);

/// Which camera to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Back-facing (world) camera.
    #[default]
    Environment,
    /// Front-facing camera.
    User,
}

/// Video constraints for camera acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRequest {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub max_frame_rate: f32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
            max_width: 1920,
            max_height: 1080,
            max_frame_rate: 30.0,
        }
    }
}

/// Optional or required native AR session feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum XrFeature {
    HitTest,
    PlaneDetection,
    Anchors,
}

impl XrFeature {
    /// Feature descriptor string understood by the host runtime.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HitTest => "hit-test",
            Self::PlaneDetection => "plane-detection",
            Self::Anchors => "anchors",
        }
    }
}

/// Feature set requested when starting a native AR session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XrSessionRequest {
    pub required: Vec<XrFeature>,
    pub optional: Vec<XrFeature>,
}

impl XrSessionRequest {
    /// Hit testing is mandatory for placement; planes and anchors are a bonus.
    pub fn for_placement() -> Self {
        Self {
            required: vec![XrFeature::HitTest],
            optional: vec![XrFeature::PlaneDetection, XrFeature::Anchors],
        }
    }
}

/// Device services needed by an AR session.
///
/// Implementations wrap the real host (browser bindings, mobile SDK) or a
/// recorded/fake environment. Every `add_*`/`open_*`/`request_*` call that
/// returns a handle must be undone by the matching release call; the session
/// guarantees that pairing.
pub trait Platform {
    /// Report what the host supports.
    fn capabilities(&self) -> Capabilities;
    /// Ask the user for consent.
    fn request_permission(&mut self, permission: Permission) -> PermissionStatus;
    /// Start video capture and return the tracks that must be stopped later.
    fn open_camera(&mut self, request: &CameraRequest) -> Result<Vec<TrackId>, crate::SessionError>;
    /// Stop a media track.
    fn stop_track(&mut self, track: TrackId);
    /// Subscribe to a sensor event stream.
    fn add_listener(&mut self, kind: SensorKind) -> ListenerId;
    /// Unsubscribe a sensor listener.
    fn remove_listener(&mut self, listener: ListenerId);
    /// Start a native AR session.
    fn request_xr_session(
        &mut self,
        request: &XrSessionRequest,
    ) -> Result<XrSessionId, crate::SessionError>;
    /// End a native AR session.
    fn end_xr_session(&mut self, session: XrSessionId);
    /// Schedule the per-frame callback.
    fn request_frame_callback(&mut self) -> FrameCallbackId;
    /// Stop scheduling the per-frame callback.
    fn cancel_frame_callback(&mut self, callback: FrameCallbackId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_request_requires_hit_test_only() {
        let req = XrSessionRequest::for_placement();
        assert_eq!(req.required, vec![XrFeature::HitTest]);
        assert!(req.optional.contains(&XrFeature::PlaneDetection));
        assert_eq!(XrFeature::PlaneDetection.as_str(), "plane-detection");
    }

    #[test]
    fn default_camera_request_targets_back_camera_720p() {
        let req = CameraRequest::default();
        assert_eq!(req.facing, FacingMode::Environment);
        assert_eq!((req.ideal_width, req.ideal_height), (1280, 720));
        assert!(req.max_frame_rate <= 30.0);
    }
}
