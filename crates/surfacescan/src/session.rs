//! AR session lifecycle.
//!
//! An [`ArSession`] owns the detector, the placed items and every platform
//! resource acquired on open (camera tracks, sensor listeners, the native AR
//! session, the frame callback). All of them are released on close, on a
//! failed open, and on drop.

use serde::{Deserialize, Serialize};

use crate::api::{DetectorInput, DetectorOutput, SurfaceDetector};
use crate::detector::{DetectConfig, DetectorKind};
use crate::error::SessionError;
use crate::menu::MenuItem;
use crate::placement::{PlacedItem, PlacedItems, PlacementGate, TapEvent};
use crate::platform::{
    CameraRequest, Capability, FrameCallbackId, ListenerId, Permission, PermissionStatus,
    Platform, SensorKind, TrackId, XrSessionId, XrSessionRequest,
};

/// Lifecycle state of an [`ArSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, nothing acquired yet.
    #[default]
    Idle,
    /// Resources held, frames and taps are processed.
    Active,
    /// Closed or failed to open; may be opened again.
    Ended,
}

/// One AR session over a host [`Platform`].
#[derive(Debug)]
pub struct ArSession<P: Platform> {
    platform: P,
    detector: SurfaceDetector,
    gate: PlacementGate,
    placed: PlacedItems,
    state: SessionState,
    camera_request: CameraRequest,
    tracks: Vec<TrackId>,
    listeners: Vec<ListenerId>,
    xr_session: Option<XrSessionId>,
    frame_callback: Option<FrameCallbackId>,
    notices: Vec<String>,
}

impl<P: Platform> ArSession<P> {
    pub fn new(platform: P, config: &DetectConfig) -> Self {
        Self {
            platform,
            detector: SurfaceDetector::new(config),
            gate: PlacementGate::new(config.placement.clone()),
            placed: PlacedItems::new(),
            state: SessionState::Idle,
            camera_request: CameraRequest::default(),
            tracks: Vec::new(),
            listeners: Vec::new(),
            xr_session: None,
            frame_callback: None,
            notices: Vec::new(),
        }
    }

    /// Override the camera constraints used on the next open.
    pub fn with_camera_request(mut self, request: CameraRequest) -> Self {
        self.camera_request = request;
        self
    }

    /// Acquire everything the detector variant needs and start processing.
    ///
    /// On error nothing stays acquired and the session is `Ended`. A denied
    /// motion permission is not an error: the motion detector is disabled
    /// and a notice is recorded instead.
    pub fn open(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Active {
            return Err(SessionError::InvalidState {
                operation: "open",
                state: self.state,
            });
        }
        self.detector.reset();
        self.notices.clear();

        match self.acquire() {
            Ok(()) => {
                self.state = SessionState::Active;
                tracing::info!(
                    "session open: {:?}, {} tracks, {} listeners, xr={}",
                    self.detector.kind(),
                    self.tracks.len(),
                    self.listeners.len(),
                    self.xr_session.is_some()
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!("session open failed: {}", err);
                self.release();
                self.state = SessionState::Ended;
                Err(err)
            }
        }
    }

    fn acquire(&mut self) -> Result<(), SessionError> {
        let caps = self.platform.capabilities();
        let kind = self.detector.kind();

        if kind == DetectorKind::NativePlatform {
            if !caps.supports(Capability::ImmersiveAr) {
                return Err(SessionError::CapabilityUnavailable(Capability::ImmersiveAr));
            }
            let id = self
                .platform
                .request_xr_session(&XrSessionRequest::for_placement())?;
            self.xr_session = Some(id);
        } else {
            if !caps.supports(Capability::Camera) {
                return Err(SessionError::CapabilityUnavailable(Capability::Camera));
            }
            if self.platform.request_permission(Permission::Camera) == PermissionStatus::Denied {
                return Err(SessionError::PermissionDenied(Permission::Camera));
            }
            let tracks = self.platform.open_camera(&self.camera_request)?;
            self.tracks.extend(tracks);
        }

        if kind == DetectorKind::MotionHeuristic {
            self.subscribe_motion(
                caps.supports(Capability::MotionSensors),
                caps.motion_permission_required,
            );
        }

        self.frame_callback = Some(self.platform.request_frame_callback());
        Ok(())
    }

    fn subscribe_motion(&mut self, available: bool, permission_required: bool) {
        if !available {
            self.degrade(SessionError::CapabilityUnavailable(Capability::MotionSensors));
            return;
        }
        if permission_required
            && self.platform.request_permission(Permission::Motion) == PermissionStatus::Denied
        {
            self.degrade(SessionError::PermissionDenied(Permission::Motion));
            return;
        }
        for kind in [SensorKind::DeviceMotion, SensorKind::DeviceOrientation] {
            let id = self.platform.add_listener(kind);
            self.listeners.push(id);
        }
    }

    /// Keep the session usable without motion input.
    fn degrade(&mut self, reason: SessionError) {
        tracing::warn!("{}; surface detection from motion is off", reason);
        self.notices.push(reason.to_string());
        self.detector.disable();
    }

    /// Forward one input to the detector while the session is active.
    pub fn on_frame(&mut self, input: DetectorInput<'_>) -> Option<DetectorOutput> {
        if self.state != SessionState::Active {
            return None;
        }
        Some(self.detector.ingest(input))
    }

    /// Place `item` at `tap` if the gate allows it.
    pub fn tap(&mut self, tap: &TapEvent, item: &MenuItem) -> Option<&PlacedItem> {
        if self.state != SessionState::Active {
            return None;
        }
        self.placed.try_place(&self.gate, &self.detector, tap, item)
    }

    pub fn clear_all(&mut self) {
        self.placed.clear_all();
    }

    /// Release every resource and end the session. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.release();
        self.detector.reset();
        self.placed.clear_all();
        if self.state != SessionState::Ended {
            tracing::info!("session closed");
        }
        self.state = SessionState::Ended;
    }

    fn release(&mut self) {
        if let Some(cb) = self.frame_callback.take() {
            self.platform.cancel_frame_callback(cb);
        }
        for track in self.tracks.drain(..) {
            self.platform.stop_track(track);
        }
        for listener in self.listeners.drain(..) {
            self.platform.remove_listener(listener);
        }
        if let Some(id) = self.xr_session.take() {
            self.platform.end_xr_session(id);
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn detector(&self) -> &SurfaceDetector {
        &self.detector
    }

    pub fn placed_items(&self) -> &PlacedItems {
        &self.placed
    }

    /// Non-fatal problems from the last open, as user-facing messages.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl<P: Platform> Drop for ArSession<P> {
    fn drop(&mut self) {
        self.release();
    }
}
