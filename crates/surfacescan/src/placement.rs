//! Placement gate and the in-memory list of placed items.
//!
//! A tap is honored only while the active detector's gating signal is above
//! its threshold. Rejected taps have no effect and raise no error.

use nalgebra::{Quaternion, UnitQuaternion};

use crate::api::SurfaceDetector;
use crate::detector::PlacementConfig;
use crate::menu::MenuItem;
use crate::motion::MotionState;

/// A tap in normalized screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TapEvent {
    pub normalized_x: f32,
    pub normalized_y: f32,
    pub timestamp_ms: u64,
}

impl TapEvent {
    pub fn new(normalized_x: f32, normalized_y: f32, timestamp_ms: u64) -> Self {
        Self {
            normalized_x,
            normalized_y,
            timestamp_ms,
        }
    }

    fn in_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.normalized_x) && (0.0..=1.0).contains(&self.normalized_y)
    }
}

/// Where a new item goes. Rotation is a quaternion stored `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementPose {
    pub position: [f64; 3],
    pub rotation: [f64; 4],
}

impl PlacementPose {
    pub fn new(position: [f64; 3], rotation: UnitQuaternion<f64>) -> Self {
        let q = rotation.into_inner();
        Self {
            position,
            rotation: [q.i, q.j, q.k, q.w],
        }
    }

    /// Upright pose at `position`.
    pub fn upright(position: [f64; 3]) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    pub fn unit_rotation(&self) -> UnitQuaternion<f64> {
        let [x, y, z, w] = self.rotation;
        UnitQuaternion::new_normalize(Quaternion::new(w, x, y, z))
    }
}

/// Why a tap was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Tap outside the [0, 1] screen square.
    TapOutOfBounds,
    /// Motion detector has not reached the detected state.
    SurfaceNotDetected,
    /// Vision aggregate confidence at or below the enable threshold.
    LowConfidence,
    /// No confident surface point near the tap.
    NoSurfaceNearTap,
    /// No hit-test result this frame.
    ReticleHidden,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    Accept(PlacementPose),
    Reject(RejectReason),
}

/// Threshold check turning detector state plus a tap into a placement.
#[derive(Debug, Clone, Default)]
pub struct PlacementGate {
    config: PlacementConfig,
}

impl PlacementGate {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Decide whether `tap` may place an item, and where.
    pub fn evaluate(&self, detector: &SurfaceDetector, tap: &TapEvent) -> GateDecision {
        if !tap.in_bounds() {
            return GateDecision::Reject(RejectReason::TapOutOfBounds);
        }
        match detector {
            SurfaceDetector::MotionHeuristic(det) => {
                if det.state() != MotionState::Detected {
                    return GateDecision::Reject(RejectReason::SurfaceNotDetected);
                }
                GateDecision::Accept(PlacementPose::upright(self.screen_to_scene(tap)))
            }
            SurfaceDetector::VisionHeuristic(det) => {
                if !det.surface_detected() {
                    return GateDecision::Reject(RejectReason::LowConfidence);
                }
                if det.tap_target(tap.normalized_x, tap.normalized_y).is_none() {
                    return GateDecision::Reject(RejectReason::NoSurfaceNearTap);
                }
                GateDecision::Accept(PlacementPose::upright(self.screen_to_scene(tap)))
            }
            SurfaceDetector::NativePlatform(det) => match det.placement_pose() {
                Some(pose) => GateDecision::Accept(pose),
                None => GateDecision::Reject(RejectReason::ReticleHidden),
            },
        }
    }

    /// Map a normalized tap onto the placement plane, centered on the screen.
    fn screen_to_scene(&self, tap: &TapEvent) -> [f64; 3] {
        let span = self.config.scene_span;
        [
            (f64::from(tap.normalized_x) - 0.5) * span,
            self.config.floor_height,
            (f64::from(tap.normalized_y) - 0.5) * span,
        ]
    }
}

/// A virtual menu item placed in the scene.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacedItem {
    pub id: u64,
    /// Menu item identifier.
    pub menu_item: String,
    pub position: [f64; 3],
    /// Quaternion `[x, y, z, w]`.
    pub rotation: [f64; 4],
    pub scale: f64,
    pub timestamp_ms: u64,
}

/// Session-owned list of placed items.
#[derive(Debug, Clone, Default)]
pub struct PlacedItems {
    items: Vec<PlacedItem>,
    next_id: u64,
}

impl PlacedItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append exactly one item when the gate accepts `tap`; otherwise do nothing.
    pub fn try_place(
        &mut self,
        gate: &PlacementGate,
        detector: &SurfaceDetector,
        tap: &TapEvent,
        item: &MenuItem,
    ) -> Option<&PlacedItem> {
        match gate.evaluate(detector, tap) {
            GateDecision::Accept(pose) => self.push(pose, item, tap.timestamp_ms),
            GateDecision::Reject(reason) => {
                tracing::trace!(
                    "tap at ({:.2}, {:.2}) ignored: {:?}",
                    tap.normalized_x,
                    tap.normalized_y,
                    reason
                );
                None
            }
        }
    }

    fn push(
        &mut self,
        pose: PlacementPose,
        item: &MenuItem,
        timestamp_ms: u64,
    ) -> Option<&PlacedItem> {
        let placed = PlacedItem {
            id: self.next_id,
            menu_item: item.id.clone(),
            position: pose.position,
            rotation: pose.rotation,
            scale: item.scale,
            timestamp_ms,
        };
        self.next_id += 1;
        tracing::info!(
            "placed '{}' #{} at [{:.2}, {:.2}, {:.2}]",
            placed.menu_item,
            placed.id,
            placed.position[0],
            placed.position[1],
            placed.position[2]
        );
        self.items.push(placed);
        self.items.last()
    }

    /// Remove every placed item. Ids keep increasing afterwards.
    pub fn clear_all(&mut self) {
        if !self.items.is_empty() {
            tracing::info!("cleared {} placed items", self.items.len());
        }
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[PlacedItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DetectorInput;
    use crate::detector::{DetectConfig, DetectorKind};
    use crate::menu::MenuCatalog;
    use crate::motion::MotionSample;
    use crate::native::{HitTestResult, XrFrameData};
    use crate::test_utils::{checkerboard_frame, uniform_frame};
    use approx::assert_abs_diff_eq;

    fn burger() -> MenuItem {
        MenuCatalog::default()
            .items()
            .first()
            .cloned()
            .expect("default menu has items")
    }

    fn detector(kind: DetectorKind) -> SurfaceDetector {
        SurfaceDetector::new(&DetectConfig::for_kind(kind))
    }

    #[test]
    fn tap_without_signal_creates_nothing() {
        let gate = PlacementGate::default();
        let item = burger();
        for kind in [
            DetectorKind::MotionHeuristic,
            DetectorKind::VisionHeuristic,
            DetectorKind::NativePlatform,
        ] {
            let det = detector(kind);
            let mut placed = PlacedItems::new();
            let before = placed.len();
            assert!(placed
                .try_place(&gate, &det, &TapEvent::new(0.5, 0.5, 0), &item)
                .is_none());
            assert_eq!(placed.len(), before);
        }
    }

    #[test]
    fn vision_tap_after_threshold_places_one_item() {
        let gate = PlacementGate::default();
        let item = burger();
        let mut det = detector(DetectorKind::VisionHeuristic);
        det.ingest(DetectorInput::VideoFrame(&uniform_frame(320, 240, [180, 170, 160])));
        assert!(det.confidence() > 0.4);

        let mut placed = PlacedItems::new();
        let tap = TapEvent::new(0.75, 0.25, 42);
        let item_ref = placed
            .try_place(&gate, &det, &tap, &item)
            .expect("tap accepted")
            .clone();
        assert_eq!(placed.len(), 1);
        assert_abs_diff_eq!(item_ref.position[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(item_ref.position[2], -0.5, epsilon = 1e-6);
        assert_eq!(item_ref.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(item_ref.menu_item, item.id);
        assert_eq!(item_ref.scale, item.scale);
        assert_eq!(item_ref.timestamp_ms, 42);
    }

    #[test]
    fn vision_rejects_low_confidence_and_far_taps() {
        let gate = PlacementGate::default();
        let mut det = detector(DetectorKind::VisionHeuristic);
        det.ingest(DetectorInput::VideoFrame(&checkerboard_frame(320, 240, 16)));
        assert_eq!(
            gate.evaluate(&det, &TapEvent::new(0.5, 0.5, 0)),
            GateDecision::Reject(RejectReason::LowConfidence)
        );

        let mut det = detector(DetectorKind::VisionHeuristic);
        det.ingest(DetectorInput::VideoFrame(&uniform_frame(320, 240, [1, 2, 3])));
        // Grid points stop at 288/320 = 0.9; a tap at the far corner is out of range.
        assert_eq!(
            gate.evaluate(&det, &TapEvent::new(1.0, 1.0, 0)),
            GateDecision::Reject(RejectReason::NoSurfaceNearTap)
        );
        assert_eq!(
            gate.evaluate(&det, &TapEvent::new(1.5, 0.5, 0)),
            GateDecision::Reject(RejectReason::TapOutOfBounds)
        );
    }

    #[test]
    fn motion_tap_requires_detected_state() {
        let gate = PlacementGate::default();
        let item = burger();
        let mut det = detector(DetectorKind::MotionHeuristic);
        let mut placed = PlacedItems::new();

        let mut t = 0;
        for _ in 0..17 {
            det.ingest(DetectorInput::Motion(MotionSample::new([0.0, 0.0, 9.81], t)));
            t += 100;
        }
        // Quality is high but no poll has promoted the state yet.
        assert!(placed
            .try_place(&gate, &det, &TapEvent::new(0.5, 0.5, t), &item)
            .is_none());

        det.ingest(DetectorInput::Tick { now_ms: t });
        let p = placed
            .try_place(&gate, &det, &TapEvent::new(0.5, 0.5, t), &item)
            .expect("accepted");
        assert_eq!(p.position, [0.0, 0.0, 0.0]);
        assert_eq!(placed.len(), 1);
    }

    #[test]
    fn native_tap_uses_reticle_position() {
        let gate = PlacementGate::default();
        let item = burger();
        let mut det = detector(DetectorKind::NativePlatform);
        let frame = XrFrameData {
            timestamp_ms: 10,
            planes: Vec::new(),
            hits: vec![HitTestResult::at([0.3, -0.8, -1.2])],
        };
        det.ingest(DetectorInput::XrFrame(&frame));
        let mut placed = PlacedItems::new();
        let p = placed
            .try_place(&gate, &det, &TapEvent::new(0.1, 0.9, 11), &item)
            .expect("accepted");
        assert_eq!(p.position, [0.3, -0.8, -1.2]);
    }

    #[test]
    fn accepted_tap_returns_the_appended_item() {
        let gate = PlacementGate::default();
        let item = burger();
        let mut det = detector(DetectorKind::NativePlatform);
        det.ingest(DetectorInput::XrFrame(&XrFrameData {
            timestamp_ms: 0,
            planes: Vec::new(),
            hits: vec![HitTestResult::at([1.0, 0.0, -1.0])],
        }));
        let mut placed = PlacedItems::new();
        placed.try_place(&gate, &det, &TapEvent::new(0.5, 0.5, 1), &item);
        let returned = placed
            .try_place(&gate, &det, &TapEvent::new(0.5, 0.5, 2), &item)
            .cloned()
            .expect("accepted");
        assert_eq!(returned.id, 1);
        assert_eq!(returned.timestamp_ms, 2);
        assert_eq!(placed.as_slice().last(), Some(&returned));
        assert_eq!(placed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn clear_all_empties_list_and_ids_keep_growing() {
        let gate = PlacementGate::default();
        let item = burger();
        let mut det = detector(DetectorKind::NativePlatform);
        det.ingest(DetectorInput::XrFrame(&XrFrameData {
            timestamp_ms: 0,
            planes: Vec::new(),
            hits: vec![HitTestResult::at([0.0; 3])],
        }));
        let mut placed = PlacedItems::new();
        for _ in 0..3 {
            placed.try_place(&gate, &det, &TapEvent::new(0.5, 0.5, 0), &item);
        }
        assert_eq!(placed.len(), 3);
        placed.clear_all();
        assert!(placed.is_empty());
        let p = placed
            .try_place(&gate, &det, &TapEvent::new(0.5, 0.5, 0), &item)
            .expect("accepted");
        assert_eq!(p.id, 3);
    }
}
