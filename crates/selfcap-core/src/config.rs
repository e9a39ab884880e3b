//! Validator configuration.
//!
//! One `ValidatorConfig` is constructed when a session starts and never
//! mutated afterwards; every threshold is read-only for the session's
//! lifetime. Defaults are the most permissive values in current use; a
//! deployment tightens them through a TOML profile or `SELFCAP_*`
//! environment overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::classifier::CheckKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session configuration: every knob of the validation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Minimum detector confidence forwarded to the landmark detector.
    pub min_detection_confidence: f32,
    /// Minimum average frame brightness (BT.709 luma, 0–255).
    pub min_illumination_threshold: f32,
    /// Lower bound on face-bbox-width / frame-width. At or above is in range.
    pub min_face_size_factor: f32,
    /// Upper bound on face-bbox-width / frame-width. At or below is in range.
    pub max_face_size_factor: f32,
    /// Continuous stillness required before capture fires, in milliseconds.
    pub stabilization_time_ms: u64,
    /// Maximum per-frame center movement, in pixels, still counted as stable.
    /// Size deltas get twice this tolerance.
    pub stability_movement_threshold_px: f32,
    /// Maximum roll/yaw/pitch deviation in degrees.
    pub max_head_tilt_degrees: f32,
    /// Maximum normalized distance from any hand landmark to the face bbox
    /// center before the face counts as obstructed.
    pub max_hand_face_distance: f32,

    /// Oval guide horizontal radius as a fraction of frame width.
    pub oval_radius_x_factor: f32,
    /// Oval guide vertical radius as a fraction of frame height.
    pub oval_radius_y_factor: f32,
    /// Ellipse-equation bound for point containment. 1.0 is the exact oval;
    /// larger is more lenient.
    pub oval_containment_threshold: f32,
    /// Extra margin granted to bbox corners (fraction of the oval radii).
    /// The bbox center gets no margin.
    pub oval_corner_margin: f32,

    /// Plausible range for (nose − eye line) / (chin − eye line) vertical
    /// proportion. Outside this range the head is pitched or the landmarks
    /// are unreliable; either way the frame is rejected.
    pub pitch_proportion_range: (f32, f32),
    /// Lip center must sit below the nose tip by at least this fraction of
    /// face height.
    pub min_mouth_nose_gap_factor: f32,
    /// Forehead-to-chin spread must be at least this fraction of face height.
    pub min_vertical_spread_factor: f32,

    /// Minimum eyelid gap (fraction of face height) for eyes-open.
    pub min_eye_openness_factor: f32,
    /// Maximum lip gap (fraction of face height) for mouth-closed.
    pub max_mouth_openness_factor: f32,
    /// Minimum vertical gap between each mouth corner and the nose tip
    /// (fraction of face height); smiling lifts the corners above it.
    pub min_corner_nose_gap_factor: f32,

    /// Mean eye-region luminance below this suggests dark glasses (0–255).
    pub dark_glasses_luminance_threshold: f32,

    /// The check pipeline, in evaluation order. Deployments opt individual
    /// checks in or out and reorder them here; the face-count gate and the
    /// stability step are not part of this list and always run.
    pub checks: Vec<CheckKind>,

    /// Locale key for message catalog lookups.
    pub locale: String,
    /// Include raw landmarks in overlay draw data. Diagnostics only; has no
    /// effect on classification.
    pub debug_mode: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.5,
            min_illumination_threshold: 70.0,
            min_face_size_factor: 0.18,
            max_face_size_factor: 0.70,
            stabilization_time_ms: 1000,
            stability_movement_threshold_px: 5.0,
            max_head_tilt_degrees: 10.0,
            max_hand_face_distance: 0.15,
            oval_radius_x_factor: 0.36,
            oval_radius_y_factor: 0.44,
            oval_containment_threshold: 1.0,
            oval_corner_margin: 0.08,
            pitch_proportion_range: (0.25, 0.70),
            min_mouth_nose_gap_factor: 0.10,
            min_vertical_spread_factor: 0.40,
            min_eye_openness_factor: 0.022,
            max_mouth_openness_factor: 0.06,
            min_corner_nose_gap_factor: 0.06,
            dark_glasses_luminance_threshold: 45.0,
            checks: CheckKind::default_pipeline(),
            locale: "en".to_string(),
            debug_mode: false,
        }
    }
}

impl ValidatorConfig {
    /// Defaults overridden by `SELFCAP_*` environment variables. Unparseable
    /// values fall back to the default silently, matching how deployment
    /// overrides behave elsewhere in the stack.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            min_detection_confidence: env_f32(
                "SELFCAP_MIN_DETECTION_CONFIDENCE",
                d.min_detection_confidence,
            ),
            min_illumination_threshold: env_f32(
                "SELFCAP_MIN_ILLUMINATION",
                d.min_illumination_threshold,
            ),
            min_face_size_factor: env_f32("SELFCAP_MIN_FACE_SIZE", d.min_face_size_factor),
            max_face_size_factor: env_f32("SELFCAP_MAX_FACE_SIZE", d.max_face_size_factor),
            stabilization_time_ms: env_u64("SELFCAP_STABILIZATION_MS", d.stabilization_time_ms),
            stability_movement_threshold_px: env_f32(
                "SELFCAP_MOVEMENT_THRESHOLD_PX",
                d.stability_movement_threshold_px,
            ),
            max_head_tilt_degrees: env_f32("SELFCAP_MAX_HEAD_TILT", d.max_head_tilt_degrees),
            max_hand_face_distance: env_f32("SELFCAP_MAX_HAND_DISTANCE", d.max_hand_face_distance),
            dark_glasses_luminance_threshold: env_f32(
                "SELFCAP_DARK_GLASSES_LUMINANCE",
                d.dark_glasses_luminance_threshold,
            ),
            locale: std::env::var("SELFCAP_LOCALE").unwrap_or_else(|_| d.locale.clone()),
            debug_mode: std::env::var("SELFCAP_DEBUG")
                .map(|v| v != "0")
                .unwrap_or(d.debug_mode),
            ..d
        }
    }

    /// Parse a TOML profile. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML profile from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject configurations no session could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(ConfigError::Invalid(
                "min_detection_confidence must be within 0.0..=1.0".to_string(),
            ));
        }
        if !(0.0..=255.0).contains(&self.min_illumination_threshold) {
            return Err(ConfigError::Invalid(
                "min_illumination_threshold must be within 0.0..=255.0".to_string(),
            ));
        }
        if self.min_face_size_factor <= 0.0
            || self.max_face_size_factor > 1.0
            || self.min_face_size_factor >= self.max_face_size_factor
        {
            return Err(ConfigError::Invalid(
                "face size factors must satisfy 0 < min < max <= 1".to_string(),
            ));
        }
        if self.stabilization_time_ms == 0 {
            return Err(ConfigError::Invalid(
                "stabilization_time_ms must be greater than 0".to_string(),
            ));
        }
        if self.stability_movement_threshold_px <= 0.0 {
            return Err(ConfigError::Invalid(
                "stability_movement_threshold_px must be positive".to_string(),
            ));
        }
        if self.max_head_tilt_degrees <= 0.0 || self.max_head_tilt_degrees >= 90.0 {
            return Err(ConfigError::Invalid(
                "max_head_tilt_degrees must be within (0, 90)".to_string(),
            ));
        }
        if self.oval_radius_x_factor <= 0.0 || self.oval_radius_x_factor > 0.5 {
            return Err(ConfigError::Invalid(
                "oval_radius_x_factor must be within (0, 0.5]".to_string(),
            ));
        }
        if self.oval_radius_y_factor <= 0.0 || self.oval_radius_y_factor > 0.5 {
            return Err(ConfigError::Invalid(
                "oval_radius_y_factor must be within (0, 0.5]".to_string(),
            ));
        }
        if self.oval_containment_threshold <= 0.0 {
            return Err(ConfigError::Invalid(
                "oval_containment_threshold must be positive".to_string(),
            ));
        }
        let (lo, hi) = self.pitch_proportion_range;
        if !(0.0 < lo && lo < hi && hi < 1.0) {
            return Err(ConfigError::Invalid(
                "pitch_proportion_range must satisfy 0 < lo < hi < 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
