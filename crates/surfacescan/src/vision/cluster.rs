use super::SurfacePoint;

/// Loose group of nearby surface points from one detection pass.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceCluster {
    /// Indices into the detection's point list.
    pub members: Vec<usize>,
    /// Mean normalized position of the members.
    pub centroid: [f32; 2],
    /// Normalized bounding box minimum.
    pub bounds_min: [f32; 2],
    /// Normalized bounding box maximum.
    pub bounds_max: [f32; 2],
    /// Mean member confidence.
    pub mean_confidence: f32,
}

impl SurfaceCluster {
    /// Clusters with more than `min_members` points are drawn as boundaries.
    pub fn is_boundary(&self, min_members: usize) -> bool {
        self.members.len() > min_members
    }

    fn from_members(points: &[SurfacePoint], members: Vec<usize>) -> Self {
        let mut min = [f32::INFINITY; 2];
        let mut max = [f32::NEG_INFINITY; 2];
        let mut sum = [0.0f32; 2];
        let mut conf = 0.0f32;
        for &i in &members {
            let p = &points[i];
            let xy = [p.normalized_x, p.normalized_y];
            for k in 0..2 {
                min[k] = min[k].min(xy[k]);
                max[k] = max[k].max(xy[k]);
                sum[k] += xy[k];
            }
            conf += p.confidence;
        }
        let n = members.len().max(1) as f32;
        Self {
            centroid: [sum[0] / n, sum[1] / n],
            bounds_min: min,
            bounds_max: max,
            mean_confidence: conf / n,
            members,
        }
    }
}

/// Greedy single-seed clustering.
///
/// Each unassigned point seeds a cluster and absorbs every other unassigned
/// point within `radius` of the seed. No merging between clusters and no
/// memory of previous passes.
pub fn cluster_points(points: &[SurfacePoint], radius: f32) -> Vec<SurfaceCluster> {
    let r2 = radius * radius;
    let mut assigned = vec![false; points.len()];
    let mut clusters = Vec::new();

    for i in 0..points.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut members = vec![i];
        for j in (i + 1)..points.len() {
            if assigned[j] {
                continue;
            }
            if points[i].distance_sq_to(points[j].normalized_x, points[j].normalized_y) < r2 {
                assigned[j] = true;
                members.push(j);
            }
        }
        clusters.push(SurfaceCluster::from_members(points, members));
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pt(x: f32, y: f32, confidence: f32) -> SurfacePoint {
        SurfacePoint {
            normalized_x: x,
            normalized_y: y,
            confidence,
            depth_estimate: 1.0,
        }
    }

    #[test]
    fn separated_groups_form_separate_clusters() {
        let points = vec![
            pt(0.10, 0.10, 1.0),
            pt(0.12, 0.11, 0.8),
            pt(0.80, 0.80, 0.6),
            pt(0.14, 0.09, 0.6),
            pt(0.11, 0.13, 1.0),
        ];
        let clusters = cluster_points(&points, 0.1);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 1, 3, 4]);
        assert_eq!(clusters[1].members, vec![2]);
        assert!(clusters[0].is_boundary(3));
        assert!(!clusters[1].is_boundary(3));
        assert_abs_diff_eq!(clusters[0].mean_confidence, 0.85, epsilon = 1e-6);
        assert_abs_diff_eq!(clusters[0].bounds_min[0], 0.10);
        assert_abs_diff_eq!(clusters[0].bounds_max[0], 0.14);
    }

    #[test]
    fn membership_is_measured_from_the_seed() {
        // 0.08 apart in a chain: the third point is 0.16 from the seed.
        let points = vec![pt(0.0, 0.5, 1.0), pt(0.08, 0.5, 1.0), pt(0.16, 0.5, 1.0)];
        let clusters = cluster_points(&points, 0.1);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 1]);
        assert_eq!(clusters[1].members, vec![2]);
    }

    #[test]
    fn empty_input_has_no_clusters() {
        assert!(cluster_points(&[], 0.1).is_empty());
    }
}
