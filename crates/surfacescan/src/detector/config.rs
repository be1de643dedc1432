use std::path::Path;

/// Which detector variant a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Accelerometer/orientation heuristics.
    #[default]
    MotionHeuristic,
    /// Sparse Sobel + texture-variance scan of camera frames.
    VisionHeuristic,
    /// Host plane detection and hit testing.
    NativePlatform,
}

/// Motion-heuristic tuning.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Number of acceleration magnitudes kept for the variance estimate.
    pub history_len: usize,
    /// Stability = 100 - variance * scale.
    pub stability_variance_scale: f64,
    /// Minimum spacing between accepted motion samples (ms).
    pub min_sample_interval_ms: u64,
    /// Stability score a sample needs before it can qualify.
    pub stability_threshold: f64,
    /// Minimum |z| acceleration (m/s²) for the camera to face a surface.
    pub min_gravity_z: f64,
    /// Maximum |x| and |y| acceleration (m/s²) tolerated as tilt.
    pub max_lateral_accel: f64,
    /// Quality added per qualifying sample.
    pub quality_gain: f64,
    /// Quality removed per disqualifying sample.
    pub quality_decay: f64,
    /// Quality added per well-aligned orientation sample.
    pub orientation_bonus: f64,
    /// Device pitch (beta, degrees) expected when aiming at a table.
    pub orientation_beta_target_deg: f64,
    /// Allowed deviation of beta from target and of |gamma| from zero (degrees).
    pub orientation_tolerance_deg: f64,
    /// Minimum spacing between state evaluations (ms).
    pub poll_interval_ms: u64,
    /// Quality above which the surface counts as detected.
    pub detected_quality: f64,
    /// Quality below which a detected surface counts as lost.
    pub lost_quality: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            history_len: 10,
            stability_variance_scale: 10.0,
            min_sample_interval_ms: 100,
            stability_threshold: 70.0,
            min_gravity_z: 8.0,
            max_lateral_accel: 3.0,
            quality_gain: 5.0,
            quality_decay: 2.0,
            orientation_bonus: 2.0,
            orientation_beta_target_deg: 90.0,
            orientation_tolerance_deg: 30.0,
            poll_interval_ms: 500,
            detected_quality: 80.0,
            lost_quality: 30.0,
        }
    }
}

/// Vision-heuristic tuning.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Grid spacing (pixels) on both axes.
    pub grid_stride: u32,
    /// Border (pixels) skipped on every side.
    pub border: u32,
    /// Sobel magnitude below which a grid point may be flat.
    pub max_gradient: f32,
    /// Half-size (pixels) of the texture sampling window.
    pub texture_radius: u32,
    /// Step (pixels) inside the texture sampling window.
    pub texture_step: u32,
    /// Texture variance below which a candidate is accepted.
    pub max_texture_variance: f32,
    /// confidence = (range - texture_variance) / range.
    pub confidence_range: f32,
    /// Run detection on every n-th frame.
    pub detect_every_n_frames: u32,
    /// Normalized distance joining points into one cluster.
    pub cluster_radius: f32,
    /// A cluster is drawn as a boundary when it has more members than this.
    pub cluster_min_members: usize,
    /// Aggregate confidence above which placement is enabled.
    pub enable_threshold: f32,
    /// Normalized distance between a tap and a surface point.
    pub tap_radius: f32,
    /// Confidence a surface point needs to anchor a tap.
    pub tap_min_confidence: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            grid_stride: 16,
            border: 16,
            max_gradient: 30.0,
            texture_radius: 8,
            texture_step: 4,
            max_texture_variance: 20.0,
            confidence_range: 40.0,
            detect_every_n_frames: 3,
            cluster_radius: 0.1,
            cluster_min_members: 3,
            enable_threshold: 0.4,
            tap_radius: 0.1,
            tap_min_confidence: 0.5,
        }
    }
}

/// Native-platform plane bookkeeping.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    /// Confidence of a newly reported plane.
    pub initial_confidence: f64,
    /// Confidence added per re-observation.
    pub confidence_step: f64,
    /// Confidence cap.
    pub max_confidence: f64,
    /// Planes not updated for longer than this are dropped (ms).
    pub max_age_ms: u64,
    /// Planes below this confidence are dropped.
    pub min_confidence: f64,
    /// Plane centers within this distance (scene units) of the reticle
    /// orient the placed item.
    pub align_radius: f64,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            initial_confidence: 1.0,
            confidence_step: 0.1,
            max_confidence: 1.0,
            max_age_ms: 5000,
            min_confidence: 0.3,
            align_radius: 0.5,
        }
    }
}

/// Placement geometry for screen-derived variants.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Scene extent (units) covered by the full normalized screen width/height.
    pub scene_span: f64,
    /// Height of the placement plane in scene units.
    pub floor_height: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            scene_span: 2.0,
            floor_height: 0.0,
        }
    }
}

/// Top-level detection configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Detector variant selected at construction time.
    pub kind: DetectorKind,
    pub motion: MotionConfig,
    pub vision: VisionConfig,
    pub native: NativeConfig,
    pub placement: PlacementConfig,
}

impl DetectConfig {
    /// Default configuration for a given detector variant.
    pub fn for_kind(kind: DetectorKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON for dumps and `config-info`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject settings that would make a detector loop forever or never fire.
    pub fn validate(&self) -> Result<(), String> {
        let m = &self.motion;
        if m.history_len == 0 {
            return Err("motion.history_len must be >= 1".to_string());
        }
        if m.lost_quality >= m.detected_quality {
            return Err(format!(
                "motion.lost_quality ({}) must be < motion.detected_quality ({})",
                m.lost_quality, m.detected_quality
            ));
        }

        let v = &self.vision;
        if v.grid_stride == 0 {
            return Err("vision.grid_stride must be >= 1".to_string());
        }
        if v.texture_step == 0 {
            return Err("vision.texture_step must be >= 1".to_string());
        }
        if v.detect_every_n_frames == 0 {
            return Err("vision.detect_every_n_frames must be >= 1".to_string());
        }
        if !v.confidence_range.is_finite() || v.confidence_range <= 0.0 {
            return Err("vision.confidence_range must be finite and > 0".to_string());
        }

        let n = &self.native;
        if n.min_confidence > n.max_confidence {
            return Err("native.min_confidence must be <= native.max_confidence".to_string());
        }

        if !self.placement.scene_span.is_finite() || self.placement.scene_span <= 0.0 {
            return Err("placement.scene_span must be finite and > 0".to_string());
        }
        Ok(())
    }
}
