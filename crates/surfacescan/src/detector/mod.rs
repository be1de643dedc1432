//! Detector configuration shared by all variants.

mod config;

pub use config::{
    DetectConfig, DetectorKind, MotionConfig, NativeConfig, PlacementConfig, VisionConfig,
};
