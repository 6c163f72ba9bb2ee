//! # Design Validation
//!
//! Rule engine that checks finished burner and chamber designs against
//! engineering limits and produces advice. Validation never fails: it reports
//! a pass/fail flag per [`Criterion`] plus a list of [`Recommendation`] codes.
//! Text for the codes comes from [`crate::messages`].
//!
//! ## Example
//!
//! ```rust
//! use burner_core::burner::{BurnerInput, BurnerSizer};
//! use burner_core::catalog::FuelCatalog;
//! use burner_core::validation::{Criterion, ValidationEngine};
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let input = BurnerInput {
//!     target_velocity: Some(5.0),
//!     ..BurnerInput::new("methane", 100_000.0, 3000.0)
//! };
//! let design = BurnerSizer::new(&catalog).design(&input).unwrap();
//!
//! let report = ValidationEngine::default().validate_burner(&design);
//! assert!(report.passed(Criterion::VelocityInRange));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::burner::{BurnerDesign, BurnerLimits};
use crate::chamber::{ChamberDesign, ChamberLimits};

/// Burner port diameter bounds (m)
const BURNER_DIAMETER_RANGE: (f64, f64) = (0.001, 1.0);

/// Burner port length bounds (m)
const BURNER_LENGTH_RANGE: (f64, f64) = (0.01, 5.0);

/// Flame longer than this many port lengths gets a geometry warning
const LONG_FLAME_RATIO: f64 = 10.0;

/// Named pass/fail criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    VelocityInRange,
    HeatDensityAcceptable,
    ReasonableDimensions,
    PressureDropReasonable,
    ResidenceTimeAdequate,
    VolumeHeatRateAcceptable,
    DimensionsReasonable,
    EfficiencyAcceptable,
    WallTemperatureSafe,
}

impl Criterion {
    pub const BURNER: [Criterion; 4] = [
        Criterion::VelocityInRange,
        Criterion::HeatDensityAcceptable,
        Criterion::ReasonableDimensions,
        Criterion::PressureDropReasonable,
    ];

    pub const CHAMBER: [Criterion; 5] = [
        Criterion::ResidenceTimeAdequate,
        Criterion::VolumeHeatRateAcceptable,
        Criterion::DimensionsReasonable,
        Criterion::EfficiencyAcceptable,
        Criterion::WallTemperatureSafe,
    ];

    /// Stable snake_case key
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::VelocityInRange => "velocity_in_range",
            Criterion::HeatDensityAcceptable => "heat_density_acceptable",
            Criterion::ReasonableDimensions => "reasonable_dimensions",
            Criterion::PressureDropReasonable => "pressure_drop_reasonable",
            Criterion::ResidenceTimeAdequate => "residence_time_adequate",
            Criterion::VolumeHeatRateAcceptable => "volume_heat_rate_acceptable",
            Criterion::DimensionsReasonable => "dimensions_reasonable",
            Criterion::EfficiencyAcceptable => "efficiency_acceptable",
            Criterion::WallTemperatureSafe => "wall_temperature_safe",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Pass/fail flag per criterion, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    checks: BTreeMap<Criterion, bool>,
}

impl ValidationReport {
    pub fn insert(&mut self, criterion: Criterion, passed: bool) {
        self.checks.insert(criterion, passed);
    }

    /// Result for one criterion, if it was evaluated.
    pub fn get(&self, criterion: Criterion) -> Option<bool> {
        self.checks.get(&criterion).copied()
    }

    /// True only if the criterion was evaluated and passed.
    pub fn passed(&self, criterion: Criterion) -> bool {
        self.get(criterion).unwrap_or(false)
    }

    pub fn all_passed(&self) -> bool {
        self.checks.values().all(|&ok| ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = Criterion> + '_ {
        self.checks.iter().filter(|&(_, &ok)| !ok).map(|(&c, _)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, bool)> + '_ {
        self.checks.iter().map(|(&c, &ok)| (c, ok))
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Merge another report into this one.
    pub fn extend(&mut self, other: ValidationReport) {
        self.checks.extend(other.checks);
    }
}

/// Design advice. Values carried are the ones that triggered the advice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Recommendation {
    VelocityTooLow { velocity: f64, min: f64 },
    VelocityTooHigh { velocity: f64, max: f64 },
    HeatDensityTooHigh { density: f64, max: f64 },
    AuxiliaryCooling { density: f64 },
    LongFlame { flame_length: f64, burner_length: f64 },
    ResidenceTimeTooShort { residence_time: f64, min: f64 },
    ResidenceTimeTooLong { residence_time: f64, max: f64 },
    VolumeHeatRateTooHigh { rate: f64, max: f64 },
    LowEfficiency { efficiency: f64, min: f64 },
    BelowTargetEfficiency { efficiency: f64 },
    HighWallTemperature { wall_temperature: f64 },
    ElongatedChamber { aspect_ratio: f64 },
}

impl Recommendation {
    /// Stable snake_case code
    pub fn code(&self) -> &'static str {
        match self {
            Recommendation::VelocityTooLow { .. } => "velocity_too_low",
            Recommendation::VelocityTooHigh { .. } => "velocity_too_high",
            Recommendation::HeatDensityTooHigh { .. } => "heat_density_too_high",
            Recommendation::AuxiliaryCooling { .. } => "auxiliary_cooling",
            Recommendation::LongFlame { .. } => "long_flame",
            Recommendation::ResidenceTimeTooShort { .. } => "residence_time_too_short",
            Recommendation::ResidenceTimeTooLong { .. } => "residence_time_too_long",
            Recommendation::VolumeHeatRateTooHigh { .. } => "volume_heat_rate_too_high",
            Recommendation::LowEfficiency { .. } => "low_efficiency",
            Recommendation::BelowTargetEfficiency { .. } => "below_target_efficiency",
            Recommendation::HighWallTemperature { .. } => "high_wall_temperature",
            Recommendation::ElongatedChamber { .. } => "elongated_chamber",
        }
    }
}

/// Checks designs against a set of burner and chamber limits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValidationEngine {
    pub burner: BurnerLimits,
    pub chamber: ChamberLimits,
}

impl ValidationEngine {
    pub fn new(burner: BurnerLimits, chamber: ChamberLimits) -> Self {
        ValidationEngine { burner, chamber }
    }

    pub fn with_burner_limits(mut self, limits: BurnerLimits) -> Self {
        self.burner = limits;
        self
    }

    pub fn with_chamber_limits(mut self, limits: ChamberLimits) -> Self {
        self.chamber = limits;
        self
    }

    pub fn validate_burner(&self, design: &BurnerDesign) -> ValidationReport {
        let l = &self.burner;
        let mut report = ValidationReport::default();
        report.insert(
            Criterion::VelocityInRange,
            (l.min_velocity..=l.max_velocity).contains(&design.velocity),
        );
        report.insert(
            Criterion::HeatDensityAcceptable,
            design.heat_release_density <= l.max_heat_release_density,
        );
        report.insert(
            Criterion::ReasonableDimensions,
            (BURNER_DIAMETER_RANGE.0..=BURNER_DIAMETER_RANGE.1).contains(&design.diameter)
                && (BURNER_LENGTH_RANGE.0..=BURNER_LENGTH_RANGE.1).contains(&design.length),
        );
        report.insert(
            Criterion::PressureDropReasonable,
            design.pressure_drop <= l.max_pressure_drop_fraction * design.supply_pressure,
        );
        report
    }

    pub fn burner_recommendations(&self, design: &BurnerDesign) -> Vec<Recommendation> {
        let l = &self.burner;
        let mut out = Vec::new();

        if design.velocity < l.min_velocity {
            out.push(Recommendation::VelocityTooLow {
                velocity: design.velocity,
                min: l.min_velocity,
            });
        } else if design.velocity > l.max_velocity {
            out.push(Recommendation::VelocityTooHigh {
                velocity: design.velocity,
                max: l.max_velocity,
            });
        }

        if design.heat_release_density > l.max_heat_release_density {
            out.push(Recommendation::HeatDensityTooHigh {
                density: design.heat_release_density,
                max: l.max_heat_release_density,
            });
        }
        if design.heat_release_density > l.cooling_advice_density {
            out.push(Recommendation::AuxiliaryCooling {
                density: design.heat_release_density,
            });
        }
        if design.flame_length > design.length * LONG_FLAME_RATIO {
            out.push(Recommendation::LongFlame {
                flame_length: design.flame_length,
                burner_length: design.length,
            });
        }
        out
    }

    pub fn validate_chamber(&self, design: &ChamberDesign) -> ValidationReport {
        let l = &self.chamber;
        let mut report = ValidationReport::default();
        report.insert(
            Criterion::ResidenceTimeAdequate,
            (l.min_residence_time..=l.max_residence_time).contains(&design.residence_time),
        );
        report.insert(
            Criterion::VolumeHeatRateAcceptable,
            design.volume_heat_release_rate <= l.max_volume_heat_rate,
        );
        report.insert(
            Criterion::DimensionsReasonable,
            (l.min_diameter..=l.max_diameter).contains(&design.diameter),
        );
        report.insert(
            Criterion::EfficiencyAcceptable,
            design.thermal_efficiency >= l.min_efficiency,
        );
        report.insert(
            Criterion::WallTemperatureSafe,
            design.wall_temperature <= l.max_wall_temperature,
        );
        report
    }

    pub fn chamber_recommendations(&self, design: &ChamberDesign) -> Vec<Recommendation> {
        let l = &self.chamber;
        let mut out = Vec::new();

        if design.residence_time < l.min_residence_time {
            out.push(Recommendation::ResidenceTimeTooShort {
                residence_time: design.residence_time,
                min: l.min_residence_time,
            });
        } else if design.residence_time > l.max_residence_time {
            out.push(Recommendation::ResidenceTimeTooLong {
                residence_time: design.residence_time,
                max: l.max_residence_time,
            });
        }

        if design.volume_heat_release_rate > l.max_volume_heat_rate {
            out.push(Recommendation::VolumeHeatRateTooHigh {
                rate: design.volume_heat_release_rate,
                max: l.max_volume_heat_rate,
            });
        }
        if design.thermal_efficiency < l.min_efficiency {
            out.push(Recommendation::LowEfficiency {
                efficiency: design.thermal_efficiency,
                min: l.min_efficiency,
            });
        }
        if !design.meets_target_efficiency {
            out.push(Recommendation::BelowTargetEfficiency {
                efficiency: design.thermal_efficiency,
            });
        }
        if design.wall_temperature > l.wall_temperature_warning {
            out.push(Recommendation::HighWallTemperature {
                wall_temperature: design.wall_temperature,
            });
        }
        if design.aspect_ratio() > l.max_reasonable_aspect_ratio {
            out.push(Recommendation::ElongatedChamber {
                aspect_ratio: design.aspect_ratio(),
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burner_design() -> BurnerDesign {
        BurnerDesign {
            diameter: 0.05,
            area: 0.00196,
            velocity: 20.0,
            pressure_drop: 150.0,
            required_supply_pressure: 180.0,
            heat_release_density: 2.0e6,
            length: 0.15,
            flame_length: 1.0,
            supply_pressure: 3000.0,
            fuel_flow_rate: 0.002,
            gas_density: 0.8,
        }
    }

    fn chamber_design() -> ChamberDesign {
        ChamberDesign {
            volume: 0.2,
            diameter: 0.44,
            length: 1.32,
            area: 0.152,
            residence_time: 0.75,
            heat_transfer_coefficient: 7.0,
            wall_temperature: 1200.0,
            heat_loss_rate: 5000.0,
            thermal_efficiency: 0.95,
            volume_heat_release_rate: 5.0e5,
            flame_temperature: 2300.0,
            flue_gas_volume_flow: 0.27,
            resized: false,
            meets_target_efficiency: true,
        }
    }

    #[test]
    fn test_good_burner_passes_everything() {
        let engine = ValidationEngine::default();
        let report = engine.validate_burner(&burner_design());
        assert_eq!(report.len(), Criterion::BURNER.len());
        assert!(report.all_passed());
        assert!(engine.burner_recommendations(&burner_design()).is_empty());
    }

    #[test]
    fn test_burner_failures_and_advice() {
        let design = BurnerDesign {
            velocity: 3.0,
            heat_release_density: 6.0e6,
            pressure_drop: 2900.0,
            flame_length: 2.0,
            ..burner_design()
        };
        let engine = ValidationEngine::default();
        let report = engine.validate_burner(&design);
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(
            failed,
            vec![
                Criterion::VelocityInRange,
                Criterion::HeatDensityAcceptable,
                Criterion::PressureDropReasonable
            ]
        );

        let codes: Vec<_> = engine
            .burner_recommendations(&design)
            .iter()
            .map(Recommendation::code)
            .collect();
        assert_eq!(
            codes,
            vec!["velocity_too_low", "heat_density_too_high", "auxiliary_cooling", "long_flame"]
        );
    }

    #[test]
    fn test_burner_dimension_bounds() {
        let engine = ValidationEngine::default();
        let tiny = BurnerDesign {
            diameter: 0.0005,
            ..burner_design()
        };
        assert!(!engine.validate_burner(&tiny).passed(Criterion::ReasonableDimensions));
        let long = BurnerDesign {
            length: 6.0,
            ..burner_design()
        };
        assert!(!engine.validate_burner(&long).passed(Criterion::ReasonableDimensions));
    }

    #[test]
    fn test_chamber_checks() {
        let engine = ValidationEngine::default();
        assert!(engine.validate_chamber(&chamber_design()).all_passed());
        assert!(engine.chamber_recommendations(&chamber_design()).is_empty());

        let hot = ChamberDesign {
            wall_temperature: 1900.0,
            thermal_efficiency: 0.6,
            meets_target_efficiency: false,
            residence_time: 0.05,
            length: 3.0,
            ..chamber_design()
        };
        let report = engine.validate_chamber(&hot);
        assert!(!report.passed(Criterion::WallTemperatureSafe));
        assert!(!report.passed(Criterion::EfficiencyAcceptable));
        assert!(!report.passed(Criterion::ResidenceTimeAdequate));
        assert!(report.passed(Criterion::DimensionsReasonable));

        let codes: Vec<_> = engine
            .chamber_recommendations(&hot)
            .iter()
            .map(Recommendation::code)
            .collect();
        assert_eq!(
            codes,
            vec![
                "residence_time_too_short",
                "low_efficiency",
                "below_target_efficiency",
                "high_wall_temperature",
                "elongated_chamber"
            ]
        );
    }

    #[test]
    fn test_report_serializes_as_map() {
        let report = ValidationEngine::default().validate_chamber(&chamber_design());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"wall_temperature_safe\":true"));
        let roundtrip: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, roundtrip);
    }

    #[test]
    fn test_recommendation_serialization() {
        let rec = Recommendation::HighWallTemperature { wall_temperature: 1700.0 };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"code\":\"high_wall_temperature\""));
        let roundtrip: Recommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, roundtrip);
    }

    #[test]
    fn test_criterion_keys_match_serde() {
        for c in Criterion::BURNER.iter().chain(Criterion::CHAMBER.iter()) {
            let json = serde_json::to_string(c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.key()));
        }
    }
}
