//! Native-platform surface detection.
//!
//! The host AR runtime does the real plane detection and hit testing. This
//! module only keeps books: it tracks reported planes by native identity,
//! ages them out, and positions a reticle at the first hit of each frame.

mod planes;
mod reticle;

pub use planes::{DetectedPlane, PlaneBounds, PlaneTracker};
pub use reticle::Reticle;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::detector::NativeConfig;
use crate::placement::PlacementPose;

/// Tracker-assigned plane identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct PlaneId(pub u64);

/// Rigid pose in scene space. Orientation is a quaternion stored `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    pub position: [f64; 3],
    #[serde(default = "identity_xyzw")]
    pub orientation: [f64; 4],
}

fn identity_xyzw() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl Pose {
    pub fn from_position(position: [f64; 3]) -> Self {
        Self {
            position,
            orientation: identity_xyzw(),
        }
    }

    /// Orientation as a unit quaternion; degenerate input maps to identity.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let [x, y, z, w] = self.orientation;
        let q = Quaternion::new(w, x, y, z);
        if !q.norm().is_finite() || q.norm() < 1e-12 {
            return UnitQuaternion::identity();
        }
        UnitQuaternion::new_normalize(q)
    }

    /// Local +Y axis in scene space (the normal of a plane pose).
    pub fn up(&self) -> [f64; 3] {
        let n = self.rotation() * Vector3::y();
        [n.x, n.y, n.z]
    }
}

/// One plane from the host's plane-detection result set.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NativePlaneObservation {
    /// Host identity, stable across frames.
    pub native_id: u64,
    /// Plane pose; local +Y is the plane normal.
    pub pose: Pose,
    /// Boundary polygon in plane-local coordinates.
    #[serde(default)]
    pub polygon: Vec<[f64; 3]>,
}

/// One hit-test result for the viewer ray.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HitTestResult {
    pub pose: Pose,
}

impl HitTestResult {
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            pose: Pose::from_position(position),
        }
    }
}

/// Everything the host hands over for one native AR frame.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct XrFrameData {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub planes: Vec<NativePlaneObservation>,
    #[serde(default)]
    pub hits: Vec<HitTestResult>,
}

/// Plane tracker plus reticle.
#[derive(Debug, Clone)]
pub struct NativeDetector {
    config: NativeConfig,
    tracker: PlaneTracker,
    reticle: Reticle,
}

impl NativeDetector {
    pub fn new(config: NativeConfig) -> Self {
        Self {
            tracker: PlaneTracker::new(config.clone()),
            reticle: Reticle::default(),
            config,
        }
    }

    pub fn config(&self) -> &NativeConfig {
        &self.config
    }

    /// Apply one frame: refresh planes, expire stale ones, move the reticle.
    pub fn ingest_frame(&mut self, frame: &XrFrameData) {
        for obs in &frame.planes {
            self.tracker.observe(obs, frame.timestamp_ms);
        }
        self.tracker.expire(frame.timestamp_ms);
        self.reticle.update(&frame.hits);
    }

    pub fn tracker(&self) -> &PlaneTracker {
        &self.tracker
    }

    pub fn reticle(&self) -> &Reticle {
        &self.reticle
    }

    /// 1 while the reticle is visible, 0 otherwise.
    pub fn confidence(&self) -> f32 {
        if self.reticle.is_visible() {
            1.0
        } else {
            0.0
        }
    }

    /// Pose for a new item at the reticle, aligned to a nearby plane if any.
    pub fn placement_pose(&self) -> Option<PlacementPose> {
        let pose = self.reticle.pose()?;
        let rotation = match self
            .tracker
            .nearest_within(&pose.position, self.config.align_radius)
        {
            Some(plane) => align_up_to(&plane.normal),
            None => pose.rotation(),
        };
        Some(PlacementPose::new(pose.position, rotation))
    }

    /// Forget all planes and hide the reticle.
    pub fn reset(&mut self) {
        self.tracker.clear();
        self.reticle.hide();
    }
}

/// Rotation taking local +Y onto `normal`.
fn align_up_to(normal: &[f64; 3]) -> UnitQuaternion<f64> {
    let target = Vector3::from(*normal);
    if target.norm() < 1e-12 {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::rotation_between(&Vector3::y(), &target).unwrap_or_else(|| {
        // Antiparallel: flip about X.
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
    })
}
