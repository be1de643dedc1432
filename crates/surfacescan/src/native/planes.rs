use std::collections::BTreeMap;

use nalgebra::Vector3;

use super::{NativePlaneObservation, PlaneId};
use crate::detector::NativeConfig;

/// Extent of a plane polygon in plane-local x/z.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaneBounds {
    pub width: f64,
    pub height: f64,
}

impl PlaneBounds {
    /// Axis-aligned extent of `polygon` (plane-local points, y ignored).
    pub fn from_polygon(polygon: &[[f64; 3]]) -> Self {
        let Some(first) = polygon.first() else {
            return Self::default();
        };
        let (mut min_x, mut max_x) = (first[0], first[0]);
        let (mut min_z, mut max_z) = (first[2], first[2]);
        for p in &polygon[1..] {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_z = min_z.min(p[2]);
            max_z = max_z.max(p[2]);
        }
        Self {
            width: max_x - min_x,
            height: max_z - min_z,
        }
    }
}

/// A tracked plane reported by the host.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectedPlane {
    pub id: PlaneId,
    /// Identity assigned by the host runtime.
    pub native_id: u64,
    pub center: [f64; 3],
    /// Unit normal in scene space.
    pub normal: [f64; 3],
    pub bounds: PlaneBounds,
    pub confidence: f64,
    pub last_updated_ms: u64,
}

impl DetectedPlane {
    /// Euclidean distance from the plane center to `point`.
    pub fn center_distance(&self, point: &[f64; 3]) -> f64 {
        (Vector3::from(self.center) - Vector3::from(*point)).norm()
    }
}

/// Bookkeeping over host plane reports, keyed by native identity.
#[derive(Debug, Clone)]
pub struct PlaneTracker {
    config: NativeConfig,
    planes: BTreeMap<u64, DetectedPlane>,
    next_id: u64,
}

impl PlaneTracker {
    pub fn new(config: NativeConfig) -> Self {
        Self {
            config,
            planes: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Record one observation: create unseen planes, refresh known ones.
    pub fn observe(&mut self, obs: &NativePlaneObservation, now_ms: u64) -> &DetectedPlane {
        let center = obs.pose.position;
        let normal = obs.pose.up();
        let bounds = PlaneBounds::from_polygon(&obs.polygon);
        let cfg = &self.config;

        let next_id = &mut self.next_id;
        let plane = self
            .planes
            .entry(obs.native_id)
            .and_modify(|p| {
                p.center = center;
                p.normal = normal;
                p.bounds = bounds;
                p.confidence = (p.confidence + cfg.confidence_step).min(cfg.max_confidence);
                p.last_updated_ms = now_ms;
            })
            .or_insert_with(|| {
                let id = PlaneId(*next_id);
                *next_id += 1;
                tracing::debug!("new plane {:?} (native {})", id, obs.native_id);
                DetectedPlane {
                    id,
                    native_id: obs.native_id,
                    center,
                    normal,
                    bounds,
                    confidence: cfg.initial_confidence.min(cfg.max_confidence),
                    last_updated_ms: now_ms,
                }
            });
        plane
    }

    /// Drop stale or low-confidence planes. Returns the number dropped.
    pub fn expire(&mut self, now_ms: u64) -> usize {
        let before = self.planes.len();
        let max_age = self.config.max_age_ms;
        let min_conf = self.config.min_confidence;
        self.planes.retain(|native_id, p| {
            let keep =
                now_ms.saturating_sub(p.last_updated_ms) <= max_age && p.confidence >= min_conf;
            if !keep {
                tracing::debug!("plane {:?} (native {}) expired", p.id, native_id);
            }
            keep
        });
        before - self.planes.len()
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn get(&self, native_id: u64) -> Option<&DetectedPlane> {
        self.planes.get(&native_id)
    }

    /// Active planes ordered by native identity.
    pub fn planes(&self) -> impl Iterator<Item = &DetectedPlane> {
        self.planes.values()
    }

    /// Plane whose center is closest to `point` and within `radius`.
    pub fn nearest_within(&self, point: &[f64; 3], radius: f64) -> Option<&DetectedPlane> {
        self.planes
            .values()
            .map(|p| (p, p.center_distance(point)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    pub fn clear(&mut self) {
        self.planes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::Pose;
    use approx::assert_abs_diff_eq;

    fn floor_obs(native_id: u64, x: f64) -> NativePlaneObservation {
        NativePlaneObservation {
            native_id,
            pose: Pose::from_position([x, 0.0, -1.0]),
            polygon: vec![
                [-0.5, 0.0, -0.25],
                [0.5, 0.0, -0.25],
                [0.5, 0.0, 0.25],
                [-0.5, 0.0, 0.25],
            ],
        }
    }

    #[test]
    fn new_plane_starts_at_full_confidence() {
        let mut tracker = PlaneTracker::new(NativeConfig::default());
        let plane = tracker.observe(&floor_obs(7, 0.0), 100).clone();
        assert_eq!(plane.id, PlaneId(0));
        assert_eq!(plane.confidence, 1.0);
        assert_eq!(plane.normal, [0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(plane.bounds.width, 1.0);
        assert_abs_diff_eq!(plane.bounds.height, 0.5);
    }

    #[test]
    fn reobservation_updates_pose_and_caps_confidence() {
        let cfg = NativeConfig {
            initial_confidence: 0.5,
            ..NativeConfig::default()
        };
        let mut tracker = PlaneTracker::new(cfg);
        let mut prev = tracker.observe(&floor_obs(1, 0.0), 0).confidence;
        for t in 1..20u64 {
            let plane = tracker.observe(&floor_obs(1, t as f64), t * 100);
            assert!(plane.confidence >= prev);
            assert!(plane.confidence <= 1.0);
            prev = plane.confidence;
        }
        assert_eq!(prev, 1.0);
        let plane = tracker.get(1).expect("tracked");
        assert_eq!(plane.id, PlaneId(0));
        assert_eq!(plane.center, [19.0, 0.0, -1.0]);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn unseen_planes_expire_after_max_age() {
        let mut tracker = PlaneTracker::new(NativeConfig::default());
        tracker.observe(&floor_obs(1, 0.0), 0);
        tracker.observe(&floor_obs(2, 3.0), 4_000);
        assert_eq!(tracker.expire(5_000), 0);
        assert_eq!(tracker.expire(5_001), 1);
        assert!(tracker.get(1).is_none());
        assert!(tracker.get(2).is_some());
        assert_eq!(tracker.expire(9_001), 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn low_confidence_planes_are_dropped() {
        let cfg = NativeConfig {
            initial_confidence: 0.2,
            ..NativeConfig::default()
        };
        let mut tracker = PlaneTracker::new(cfg);
        tracker.observe(&floor_obs(1, 0.0), 0);
        assert_eq!(tracker.expire(0), 1);
    }

    #[test]
    fn nearest_within_respects_radius() {
        let mut tracker = PlaneTracker::new(NativeConfig::default());
        tracker.observe(&floor_obs(1, 0.0), 0);
        tracker.observe(&floor_obs(2, 0.4), 0);
        let hit = tracker.nearest_within(&[0.3, 0.0, -1.0], 0.5).expect("plane in range");
        assert_eq!(hit.native_id, 2);
        assert!(tracker.nearest_within(&[5.0, 0.0, -1.0], 0.5).is_none());
    }
}
