//! Shared test utilities: synthetic camera frames and a fake host platform.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use crate::platform::{
    CameraRequest, Capabilities, FrameCallbackId, ListenerId, Permission, PermissionStatus,
    Platform, SensorKind, TrackId, XrSessionId, XrSessionRequest,
};
use crate::{Capability, SessionError};

/// Solid-color frame.
pub(crate) fn uniform_frame(w: u32, h: u32, rgb: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Black/white checkerboard with square cells of `cell` pixels.
pub(crate) fn checkerboard_frame(w: u32, h: u32, cell: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let v = if (x / cell + y / cell) % 2 == 0 { 0 } else { 255 };
        Rgba([v, v, v, 255])
    })
}

/// Vertical stripes `width` pixels wide alternating between `lo` and `hi`,
/// shifted left by `phase` pixels.
pub(crate) fn stripe_frame(w: u32, h: u32, width: u32, phase: u32, lo: u8, hi: u8) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, _| {
        let v = if ((x + phase) / width) % 2 == 0 { lo } else { hi };
        Rgba([v, v, v, 255])
    })
}

/// Left half flat mid-gray, right half checkerboard.
pub(crate) fn half_textured_frame(w: u32, h: u32, cell: u32) -> RgbaImage {
    let board = checkerboard_frame(w, h, cell);
    RgbaImage::from_fn(w, h, |x, y| {
        if x < w / 2 {
            Rgba([128, 128, 128, 255])
        } else {
            *board.get_pixel(x, y)
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Resource {
    Track,
    Listener,
    XrSession,
    FrameCallback,
}

#[derive(Debug, Default)]
struct LedgerState {
    live: BTreeSet<(Resource, u64)>,
    acquired: usize,
    next_handle: u64,
}

/// Shared record of acquired and released platform handles.
///
/// Cloned out of a [`FakePlatform`] so tests can inspect it after the
/// platform has been moved into (and dropped with) a session.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceLedger(Rc<RefCell<LedgerState>>);

impl ResourceLedger {
    fn acquire(&self, kind: Resource) -> u64 {
        let mut state = self.0.borrow_mut();
        let handle = state.next_handle;
        state.next_handle += 1;
        state.acquired += 1;
        state.live.insert((kind, handle));
        handle
    }

    fn release(&self, kind: Resource, handle: u64) {
        let removed = self.0.borrow_mut().live.remove(&(kind, handle));
        assert!(removed, "{:?} {} released twice or never acquired", kind, handle);
    }

    pub(crate) fn live(&self) -> usize {
        self.0.borrow().live.len()
    }

    pub(crate) fn live_of(&self, kind: Resource) -> usize {
        self.0.borrow().live.iter().filter(|(k, _)| *k == kind).count()
    }

    pub(crate) fn total_acquired(&self) -> usize {
        self.0.borrow().acquired
    }
}

/// Scriptable in-memory [`Platform`].
#[derive(Debug)]
pub(crate) struct FakePlatform {
    pub capabilities: Capabilities,
    pub camera_permission: PermissionStatus,
    pub motion_permission: PermissionStatus,
    /// `open_camera` fails after consent was granted.
    pub camera_fails: bool,
    ledger: ResourceLedger,
    requests: Vec<Permission>,
}

impl FakePlatform {
    /// Every capability present, every prompt granted.
    pub(crate) fn full() -> Self {
        Self {
            capabilities: Capabilities {
                camera: true,
                motion_sensors: true,
                immersive_ar: true,
                motion_permission_required: false,
            },
            camera_permission: PermissionStatus::Granted,
            motion_permission: PermissionStatus::Granted,
            camera_fails: false,
            ledger: ResourceLedger::default(),
            requests: Vec::new(),
        }
    }

    pub(crate) fn ledger(&self) -> ResourceLedger {
        self.ledger.clone()
    }

    pub(crate) fn requested(&self, permission: Permission) -> bool {
        self.requests.contains(&permission)
    }

    pub(crate) fn live_tracks(&self) -> usize {
        self.ledger.live_of(Resource::Track)
    }

    pub(crate) fn live_listeners(&self) -> usize {
        self.ledger.live_of(Resource::Listener)
    }

    pub(crate) fn live_xr_sessions(&self) -> usize {
        self.ledger.live_of(Resource::XrSession)
    }

    pub(crate) fn live_callbacks(&self) -> usize {
        self.ledger.live_of(Resource::FrameCallback)
    }

    pub(crate) fn total_acquired(&self) -> usize {
        self.ledger.total_acquired()
    }
}

impl Platform for FakePlatform {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn request_permission(&mut self, permission: Permission) -> PermissionStatus {
        self.requests.push(permission);
        match permission {
            Permission::Camera => self.camera_permission,
            Permission::Motion => self.motion_permission,
        }
    }

    fn open_camera(&mut self, _request: &CameraRequest) -> Result<Vec<TrackId>, SessionError> {
        if self.camera_fails {
            return Err(SessionError::CapabilityUnavailable(Capability::Camera));
        }
        Ok(vec![TrackId(self.ledger.acquire(Resource::Track))])
    }

    fn stop_track(&mut self, track: TrackId) {
        self.ledger.release(Resource::Track, track.0);
    }

    fn add_listener(&mut self, _kind: SensorKind) -> ListenerId {
        ListenerId(self.ledger.acquire(Resource::Listener))
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.ledger.release(Resource::Listener, listener.0);
    }

    fn request_xr_session(
        &mut self,
        request: &XrSessionRequest,
    ) -> Result<XrSessionId, SessionError> {
        if !self.capabilities.immersive_ar || request.required.is_empty() {
            return Err(SessionError::CapabilityUnavailable(Capability::ImmersiveAr));
        }
        Ok(XrSessionId(self.ledger.acquire(Resource::XrSession)))
    }

    fn end_xr_session(&mut self, session: XrSessionId) {
        self.ledger.release(Resource::XrSession, session.0);
    }

    fn request_frame_callback(&mut self) -> FrameCallbackId {
        FrameCallbackId(self.ledger.acquire(Resource::FrameCallback))
    }

    fn cancel_frame_callback(&mut self, callback: FrameCallbackId) {
        self.ledger.release(Resource::FrameCallback, callback.0);
    }
}
