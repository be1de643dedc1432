//! Motion-heuristic surface detection.
//!
//! Device acceleration is reduced to a magnitude history whose variance gives
//! a stability score. Throttled samples that are stable, gravity-aligned on
//! the z axis and free of lateral tilt raise a surface-quality accumulator;
//! everything else lowers it. Orientation events add an independent bonus.
//! A slower poll turns the accumulator into a Calibrating/Detected state.

mod history;

pub use history::MagnitudeHistory;

use crate::detector::MotionConfig;

/// Device acceleration in m/s². Platforms may omit axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Acceleration {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

impl Acceleration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// All three axes, or `None` if any is missing.
    pub fn axes(&self) -> Option<[f64; 3]> {
        Some([self.x?, self.y?, self.z?])
    }
}

/// One device-motion event.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionSample {
    pub acceleration: Acceleration,
    pub timestamp_ms: u64,
}

impl MotionSample {
    pub fn new(acceleration: [f64; 3], timestamp_ms: u64) -> Self {
        Self {
            acceleration: Acceleration::new(acceleration[0], acceleration[1], acceleration[2]),
            timestamp_ms,
        }
    }
}

/// One device-orientation event (Euler angles in degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrientationSample {
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    pub timestamp_ms: u64,
}

impl OrientationSample {
    pub fn new(alpha: f64, beta: f64, gamma: f64, timestamp_ms: u64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
            timestamp_ms,
        }
    }
}

/// Discrete detection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    #[default]
    Calibrating,
    Detected,
}

/// What happened to an ingested sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Sample was used; `qualifying` tells whether it raised quality.
    Accepted { qualifying: bool },
    /// Arrived too soon after the previous accepted sample.
    Throttled,
    /// Missing axes or angles.
    Skipped,
    /// Detector is disabled (sensor permission denied).
    Disabled,
}

/// Snapshot of the detector for logs and JSON dumps.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionReport {
    pub state: MotionState,
    pub enabled: bool,
    pub surface_quality: f64,
    pub stability: f64,
    pub samples_accepted: u64,
    pub samples_throttled: u64,
    pub samples_skipped: u64,
}

/// Motion-heuristic detector state.
#[derive(Debug, Clone)]
pub struct MotionDetector {
    config: MotionConfig,
    history: MagnitudeHistory,
    stability: f64,
    quality: f64,
    state: MotionState,
    enabled: bool,
    last_accepted_ms: Option<u64>,
    last_poll_ms: Option<u64>,
    samples_accepted: u64,
    samples_throttled: u64,
    samples_skipped: u64,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        let history = MagnitudeHistory::new(config.history_len);
        Self {
            config,
            history,
            stability: 0.0,
            quality: 0.0,
            state: MotionState::Calibrating,
            enabled: true,
            last_accepted_ms: None,
            last_poll_ms: None,
            samples_accepted: 0,
            samples_throttled: 0,
            samples_skipped: 0,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Surface quality in [0, 100].
    pub fn surface_quality(&self) -> f64 {
        self.quality
    }

    /// Stability score in [0, 100] of the current magnitude history.
    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Confidence in [0, 1] for the shared detector contract.
    pub fn confidence(&self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        (self.quality / 100.0) as f32
    }

    /// Feed one device-motion event.
    pub fn ingest_motion(&mut self, sample: &MotionSample) -> SampleOutcome {
        if !self.enabled {
            return SampleOutcome::Disabled;
        }
        let Some([x, y, z]) = sample.acceleration.axes() else {
            self.samples_skipped += 1;
            return SampleOutcome::Skipped;
        };
        if let Some(last) = self.last_accepted_ms {
            if sample.timestamp_ms.saturating_sub(last) < self.config.min_sample_interval_ms {
                self.samples_throttled += 1;
                tracing::trace!("motion sample at {}ms throttled", sample.timestamp_ms);
                return SampleOutcome::Throttled;
            }
        }
        self.last_accepted_ms = Some(sample.timestamp_ms);
        self.samples_accepted += 1;

        let magnitude = (x * x + y * y + z * z).sqrt();
        self.history.push(magnitude);
        self.stability = self
            .history
            .stability_score(self.config.stability_variance_scale);

        let cfg = &self.config;
        let qualifying = self.stability > cfg.stability_threshold
            && z.abs() > cfg.min_gravity_z
            && x.abs() < cfg.max_lateral_accel
            && y.abs() < cfg.max_lateral_accel;
        let delta = if qualifying {
            cfg.quality_gain
        } else {
            -cfg.quality_decay
        };
        self.adjust_quality(delta);
        SampleOutcome::Accepted { qualifying }
    }

    /// Feed one device-orientation event. Orientation is not throttled.
    pub fn ingest_orientation(&mut self, sample: &OrientationSample) -> SampleOutcome {
        if !self.enabled {
            return SampleOutcome::Disabled;
        }
        let (Some(beta), Some(gamma)) = (sample.beta, sample.gamma) else {
            self.samples_skipped += 1;
            return SampleOutcome::Skipped;
        };
        let cfg = &self.config;
        let aligned = (beta - cfg.orientation_beta_target_deg).abs() < cfg.orientation_tolerance_deg
            && gamma.abs() < cfg.orientation_tolerance_deg
            && self.stability > cfg.stability_threshold;
        if aligned {
            let bonus = cfg.orientation_bonus;
            self.adjust_quality(bonus);
        }
        SampleOutcome::Accepted { qualifying: aligned }
    }

    /// Re-evaluate the detection state, at most once per poll interval.
    pub fn poll(&mut self, now_ms: u64) -> MotionState {
        if !self.enabled {
            return self.state;
        }
        if let Some(last) = self.last_poll_ms {
            if now_ms.saturating_sub(last) < self.config.poll_interval_ms {
                return self.state;
            }
        }
        self.last_poll_ms = Some(now_ms);

        let cfg = &self.config;
        match self.state {
            MotionState::Calibrating
                if self.quality > cfg.detected_quality
                    && self.stability > cfg.stability_threshold =>
            {
                self.state = MotionState::Detected;
                tracing::info!(
                    "surface detected (quality={:.0}, stability={:.0})",
                    self.quality,
                    self.stability
                );
            }
            MotionState::Detected if self.quality < cfg.lost_quality => {
                self.state = MotionState::Calibrating;
                tracing::info!("surface lost (quality={:.0}); recalibrating", self.quality);
            }
            _ => {}
        }
        self.state
    }

    /// Permanently report zero confidence until [`reset`](Self::reset).
    pub fn disable(&mut self) {
        if self.enabled {
            tracing::warn!("motion detector disabled; no sensor access");
        }
        self.enabled = false;
        self.quality = 0.0;
        self.stability = 0.0;
        self.state = MotionState::Calibrating;
        self.history.clear();
    }

    /// Return to the initial, enabled state.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    pub fn report(&self) -> MotionReport {
        MotionReport {
            state: self.state,
            enabled: self.enabled,
            surface_quality: self.quality,
            stability: self.stability,
            samples_accepted: self.samples_accepted,
            samples_throttled: self.samples_throttled,
            samples_skipped: self.samples_skipped,
        }
    }

    fn adjust_quality(&mut self, delta: f64) {
        self.quality = (self.quality + delta).clamp(0.0, 100.0);
    }
}
