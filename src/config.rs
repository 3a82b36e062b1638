//! Simulation configuration
//!
//! Every tunable lives in `SimulationConfig`. The `PARAMETERS` table gives
//! each one a range and step for the control panel, and says whether a
//! change regenerates the particle set or simply applies on the next tick.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::{FilterParams, StabilizerParams};

/// Errors from building or updating a configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{name}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("parameter '{0}' must be a finite number")]
    NotFinite(&'static str),
    #[error("invalid color '{0}' (expected #rrggbb)")]
    InvalidColor(String),
}

/// RGB color, components in 0-1
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading '#' optional)
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ConfigError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ConfigError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.r, self.g, self.b)
    }

    /// Linear blend towards `other` (t = 0 → self, t = 1 → other)
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

/// How per-tick displacement relates to elapsed time
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TimeStep {
    /// One impulse / relaxation step per tick; speed follows frame rate
    #[default]
    PerTick,
    /// Scale each tick by `elapsed · reference_hz`
    Normalized { reference_hz: f32 },
}

/// All recognized simulation options
///
/// Deserializes from partial JSON; missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    // Particle set (regenerates)
    pub particle_count: usize,
    pub field_radius: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: Color,
    pub outside_color: Color,
    pub seed: u64,

    // Rendering
    pub particle_size: f32,

    // Force field
    pub influence_distance: f32,
    pub max_force: f32,
    pub force_multiplier: f32,
    pub return_strength: f32,
    pub time_step: TimeStep,

    // Stabilization
    pub confidence_threshold: f32,
    pub max_hold_frames: u32,
    pub filter_frequency: f32,
    pub filter_min_cutoff: f32,
    pub filter_beta: f32,
    pub filter_deriv_cutoff: f32,

    // Detection
    pub detection_interval_ms: f64,
    pub discard_stale_detections: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            field_radius: 3.0,
            randomness: 0.2,
            randomness_power: 3.0,
            inside_color: Color::new(1.0, 96.0 / 255.0, 48.0 / 255.0),
            outside_color: Color::new(27.0 / 255.0, 57.0 / 255.0, 132.0 / 255.0),
            seed: 1,
            particle_size: 0.02,
            influence_distance: 1.0,
            max_force: 0.5,
            force_multiplier: 0.1,
            return_strength: 0.05,
            time_step: TimeStep::PerTick,
            confidence_threshold: 0.5,
            max_hold_frames: 5,
            filter_frequency: 30.0,
            filter_min_cutoff: 1.0,
            filter_beta: 0.1,
            filter_deriv_cutoff: 1.0,
            detection_interval_ms: 100.0,
            discard_stale_detections: true,
        }
    }
}

/// Value type of a parameter, for the control panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Number,
    Integer,
    Toggle,
    Color,
}

/// What a committed change requires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigChange {
    /// Particle geometry or colors changed: rebuild the set
    Regenerate,
    /// Takes effect on the next tick
    Immediate,
}

/// Bounds and step for one named parameter
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub kind: ParamKind,
    pub effect: ConfigChange,
}

const fn spec(name: &'static str, min: f64, max: f64, step: f64, kind: ParamKind, effect: ConfigChange) -> ParamSpec {
    ParamSpec { name, min, max, step, kind, effect }
}

use ConfigChange::{Immediate, Regenerate};
use ParamKind::{Integer, Number, Toggle};

/// Every parameter the control panel may change
pub const PARAMETERS: &[ParamSpec] = &[
    spec("particle_count", 1000.0, 100_000.0, 100.0, Integer, Regenerate),
    spec("field_radius", 1.0, 20.0, 0.1, Number, Regenerate),
    spec("randomness", 0.0, 1.0, 0.001, Number, Regenerate),
    spec("randomness_power", 1.0, 10.0, 0.001, Number, Regenerate),
    spec("inside_color", 0.0, 0.0, 0.0, ParamKind::Color, Regenerate),
    spec("outside_color", 0.0, 0.0, 0.0, ParamKind::Color, Regenerate),
    spec("seed", 0.0, 4_294_967_295.0, 1.0, Integer, Regenerate),
    spec("particle_size", 0.001, 0.1, 0.001, Number, Immediate),
    spec("influence_distance", 0.1, 5.0, 0.01, Number, Immediate),
    spec("max_force", 0.0, 2.0, 0.01, Number, Immediate),
    spec("force_multiplier", 0.0, 1.0, 0.001, Number, Immediate),
    spec("return_strength", 0.0, 1.0, 0.001, Number, Immediate),
    spec("normalize_hz", 0.0, 240.0, 1.0, Number, Immediate),
    spec("confidence_threshold", 0.0, 1.0, 0.01, Number, Immediate),
    spec("max_hold_frames", 0.0, 60.0, 1.0, Integer, Immediate),
    spec("filter_frequency", 1.0, 240.0, 1.0, Number, Immediate),
    spec("filter_min_cutoff", 0.001, 10.0, 0.001, Number, Immediate),
    spec("filter_beta", 0.0, 10.0, 0.001, Number, Immediate),
    spec("filter_deriv_cutoff", 0.001, 10.0, 0.001, Number, Immediate),
    spec("detection_interval_ms", 0.0, 1000.0, 1.0, Number, Immediate),
    spec("discard_stale_detections", 0.0, 1.0, 1.0, Toggle, Immediate),
];

/// Look up a parameter by name
pub fn find_param(name: &str) -> Option<&'static ParamSpec> {
    PARAMETERS.iter().find(|p| p.name == name)
}

impl SimulationConfig {
    /// Check every numeric field against its range
    pub fn validate(&self) -> Result<(), ConfigError> {
        for p in PARAMETERS.iter().filter(|p| p.kind != ParamKind::Color) {
            if let Some(value) = self.get(p.name) {
                check_range(p, value)?;
            }
        }
        Ok(())
    }

    /// Current value of a numeric parameter
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "particle_count" => self.particle_count as f64,
            "field_radius" => self.field_radius as f64,
            "randomness" => self.randomness as f64,
            "randomness_power" => self.randomness_power as f64,
            "seed" => self.seed as f64,
            "particle_size" => self.particle_size as f64,
            "influence_distance" => self.influence_distance as f64,
            "max_force" => self.max_force as f64,
            "force_multiplier" => self.force_multiplier as f64,
            "return_strength" => self.return_strength as f64,
            "normalize_hz" => match self.time_step {
                TimeStep::PerTick => 0.0,
                TimeStep::Normalized { reference_hz } => reference_hz as f64,
            },
            "confidence_threshold" => self.confidence_threshold as f64,
            "max_hold_frames" => self.max_hold_frames as f64,
            "filter_frequency" => self.filter_frequency as f64,
            "filter_min_cutoff" => self.filter_min_cutoff as f64,
            "filter_beta" => self.filter_beta as f64,
            "filter_deriv_cutoff" => self.filter_deriv_cutoff as f64,
            "detection_interval_ms" => self.detection_interval_ms,
            "discard_stale_detections" => {
                if self.discard_stale_detections {
                    1.0
                } else {
                    0.0
                }
            }
            _ => return None,
        };
        Some(value)
    }

    /// Validate and apply one numeric change
    ///
    /// The config is left untouched when the value is rejected.
    pub fn set(&mut self, name: &str, value: f64) -> Result<ConfigChange, ConfigError> {
        let p = find_param(name)
            .filter(|p| p.kind != ParamKind::Color)
            .ok_or_else(|| ConfigError::UnknownParameter(name.to_string()))?;
        let value = match p.kind {
            Integer | Toggle => value.round(),
            _ => value,
        };
        check_range(p, value)?;

        match p.name {
            "particle_count" => self.particle_count = value as usize,
            "field_radius" => self.field_radius = value as f32,
            "randomness" => self.randomness = value as f32,
            "randomness_power" => self.randomness_power = value as f32,
            "seed" => self.seed = value as u64,
            "particle_size" => self.particle_size = value as f32,
            "influence_distance" => self.influence_distance = value as f32,
            "max_force" => self.max_force = value as f32,
            "force_multiplier" => self.force_multiplier = value as f32,
            "return_strength" => self.return_strength = value as f32,
            "normalize_hz" => {
                self.time_step = if value > 0.0 {
                    TimeStep::Normalized { reference_hz: value as f32 }
                } else {
                    TimeStep::PerTick
                }
            }
            "confidence_threshold" => self.confidence_threshold = value as f32,
            "max_hold_frames" => self.max_hold_frames = value as u32,
            "filter_frequency" => self.filter_frequency = value as f32,
            "filter_min_cutoff" => self.filter_min_cutoff = value as f32,
            "filter_beta" => self.filter_beta = value as f32,
            "filter_deriv_cutoff" => self.filter_deriv_cutoff = value as f32,
            "detection_interval_ms" => self.detection_interval_ms = value,
            "discard_stale_detections" => self.discard_stale_detections = value != 0.0,
            _ => return Err(ConfigError::UnknownParameter(name.to_string())),
        }
        Ok(p.effect)
    }

    /// Apply a color change given as `#rrggbb`
    pub fn set_color(&mut self, name: &str, hex: &str) -> Result<ConfigChange, ConfigError> {
        let color = Color::from_hex(hex)?;
        match name {
            "inside_color" => self.inside_color = color,
            "outside_color" => self.outside_color = color,
            _ => return Err(ConfigError::UnknownParameter(name.to_string())),
        }
        Ok(ConfigChange::Regenerate)
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            frequency: self.filter_frequency,
            min_cutoff: self.filter_min_cutoff,
            beta: self.filter_beta,
            deriv_cutoff: self.filter_deriv_cutoff,
        }
    }

    pub fn stabilizer_params(&self) -> StabilizerParams {
        StabilizerParams {
            confidence_threshold: self.confidence_threshold,
            max_hold_frames: self.max_hold_frames,
            filter: self.filter_params(),
        }
    }
}

fn check_range(p: &ParamSpec, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite(p.name));
    }
    if value < p.min || value > p.max {
        return Err(ConfigError::OutOfRange {
            name: p.name,
            value,
            min: p.min,
            max: p.max,
        });
    }
    Ok(())
}

/// Parameter table as JSON, for building the control panel
pub fn parameters_json() -> String {
    serde_json::to_string(PARAMETERS).unwrap_or_else(|e| {
        log::warn!("Failed to serialize parameter table: {}", e);
        "[]".to_string()
    })
}
