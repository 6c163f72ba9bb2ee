//! # Localized Messages
//!
//! Human-readable text for error kinds, recommendation codes and validation
//! criteria. The design modules only produce codes; presentation layers pick a
//! [`Locale`] and render through its [`MessageTable`].
//!
//! ```rust
//! use burner_core::messages::Locale;
//! use burner_core::validation::Recommendation;
//!
//! let advice = Recommendation::VelocityTooLow { velocity: 3.0, min: 5.0 };
//! let text = Locale::Czech.table().recommendation(&advice);
//! assert!(text.starts_with("Rychlost plynu je příliš nízká"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DesignError;
use crate::validation::{Criterion, Recommendation};

/// Renders codes as text in one language.
pub trait MessageTable: Send + Sync {
    fn error(&self, error: &DesignError) -> String;
    fn recommendation(&self, recommendation: &Recommendation) -> String;
    fn criterion(&self, criterion: Criterion) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    English,
    Czech,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Czech];

    pub fn table(&self) -> &'static dyn MessageTable {
        match self {
            Locale::English => &English,
            Locale::Czech => &Czech,
        }
    }

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Czech => "cs",
        }
    }

    /// Accepts "en", "english", "cs", "cz", "czech" in any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Locale::English),
            "cs" | "cz" | "czech" | "cestina" | "čeština" => Some(Locale::Czech),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub struct English;

impl MessageTable for English {
    fn error(&self, error: &DesignError) -> String {
        error.to_string()
    }

    fn recommendation(&self, recommendation: &Recommendation) -> String {
        match *recommendation {
            Recommendation::VelocityTooLow { velocity, min } => format!(
                "Gas velocity is too low ({:.1} < {:.1} m/s) - raise the pressure or reduce the diameter",
                velocity, min
            ),
            Recommendation::VelocityTooHigh { velocity, max } => format!(
                "Gas velocity is too high ({:.1} > {:.1} m/s) - lower the pressure or enlarge the diameter",
                velocity, max
            ),
            Recommendation::HeatDensityTooHigh { density, max } => format!(
                "Heat release density is too high ({:.2} > {:.2} MW/m2) - enlarge the burner area",
                density / 1e6,
                max / 1e6
            ),
            Recommendation::AuxiliaryCooling { density } => format!(
                "Auxiliary cooling is recommended at {:.2} MW/m2 heat release density",
                density / 1e6
            ),
            Recommendation::LongFlame {
                flame_length,
                burner_length,
            } => format!(
                "Long flame ({:.2} m vs {:.2} m burner) - review the combustion chamber geometry",
                flame_length, burner_length
            ),
            Recommendation::ResidenceTimeTooShort { residence_time, min } => format!(
                "Residence time is too short ({:.2} < {:.2} s) - enlarge the chamber volume",
                residence_time, min
            ),
            Recommendation::ResidenceTimeTooLong { residence_time, max } => format!(
                "Residence time is too long ({:.2} > {:.2} s) - reduce the chamber volume",
                residence_time, max
            ),
            Recommendation::VolumeHeatRateTooHigh { rate, max } => format!(
                "Volumetric heat release is too high ({:.2} > {:.2} MW/m3) - enlarge the chamber",
                rate / 1e6,
                max / 1e6
            ),
            Recommendation::LowEfficiency { efficiency, min } => format!(
                "Low thermal efficiency ({:.1} % < {:.1} %) - add insulation or optimize the geometry",
                efficiency * 100.0,
                min * 100.0
            ),
            Recommendation::BelowTargetEfficiency { efficiency } => format!(
                "Thermal efficiency {:.1} % is below the requested target",
                efficiency * 100.0
            ),
            Recommendation::HighWallTemperature { wall_temperature } => format!(
                "High wall temperature ({:.0} K) - increase cooling or insulation",
                wall_temperature
            ),
            Recommendation::ElongatedChamber { aspect_ratio } => format!(
                "Very long chamber (L/D = {:.1}) - consider a different aspect ratio",
                aspect_ratio
            ),
        }
    }

    fn criterion(&self, criterion: Criterion) -> &'static str {
        match criterion {
            Criterion::VelocityInRange => "Gas velocity in range",
            Criterion::HeatDensityAcceptable => "Heat release density acceptable",
            Criterion::ReasonableDimensions => "Burner dimensions reasonable",
            Criterion::PressureDropReasonable => "Pressure drop reasonable",
            Criterion::ResidenceTimeAdequate => "Residence time adequate",
            Criterion::VolumeHeatRateAcceptable => "Volumetric heat release acceptable",
            Criterion::DimensionsReasonable => "Chamber dimensions reasonable",
            Criterion::EfficiencyAcceptable => "Thermal efficiency acceptable",
            Criterion::WallTemperatureSafe => "Wall temperature safe",
        }
    }
}

pub struct Czech;

impl MessageTable for Czech {
    fn error(&self, error: &DesignError) -> String {
        match error {
            DesignError::InvalidInput { field, value, reason } => {
                format!("Neplatná hodnota '{}': {} - {}", field, value, reason)
            }
            DesignError::InvalidFlowRate { value } => {
                format!("Hmotnostní průtok musí být kladný: {} kg/s", value)
            }
            DesignError::InvalidExcessAir { value } => {
                format!("Součinitel přebytku vzduchu musí být alespoň 1,0: {}", value)
            }
            DesignError::InvalidPower { value } => format!("Výkon musí být kladný: {} W", value),
            DesignError::InvalidPressure { value } => format!("Tlak musí být kladný: {} Pa", value),
            DesignError::InvalidDensity { value } => {
                format!("Hustota plynu musí být kladná: {} kg/m3", value)
            }
            DesignError::EmptySegmentList => "Seznam úseků potrubí je prázdný".to_string(),
            DesignError::ResidenceTimeOutOfRange { value, min, max } => {
                if value < min {
                    format!("Doba zdržení je příliš krátká. Minimum: {} s", min)
                } else {
                    format!("Doba zdržení je příliš dlouhá. Maximum: {} s", max)
                }
            }
            DesignError::UnknownFuel { fuel_id } => format!("Neznámé palivo: {}", fuel_id),
            DesignError::InsufficientSupplyPressure { required, available } => format!(
                "Nedostatečný tlak plynu: potřeba {:.1} Pa, k dispozici {:.1} Pa",
                required, available
            ),
            DesignError::ExcessiveHeatDensity { value, max } => format!(
                "Hustota tepelného toku {:.0} W/m2 překračuje maximum {:.0} W/m2",
                value, max
            ),
            DesignError::NoFeasibleDiameter {
                max_pressure_loss,
                max_velocity,
            } => format!(
                "Nelze najít vhodný průměr potrubí (max. ztráta {} Pa, max. rychlost {} m/s)",
                max_pressure_loss, max_velocity
            ),
            DesignError::InvalidGeometry { field, value } => {
                format!("Neplatný rozměr: {} = {}", field, value)
            }
            DesignError::TemperatureOrderingViolation {
                flame_temperature,
                wall_temperature,
            } => format!(
                "Teplota plamene {} K musí být vyšší než teplota stěny {} K",
                flame_temperature, wall_temperature
            ),
            DesignError::NonConvergence {
                solver,
                iterations,
                residual,
            } => format!(
                "{} nekonvergoval po {} iteracích (poslední změna {:e})",
                solver, iterations, residual
            ),
            DesignError::Catalog { reason } => format!("Chyba katalogu paliv: {}", reason),
            DesignError::FileError {
                operation,
                path,
                reason,
            } => format!("Chyba souboru: {} '{}' - {}", operation, path, reason),
            DesignError::SerializationError { reason } => format!("Chyba formátu dat: {}", reason),
            DesignError::VersionMismatch {
                file_version,
                expected_version,
            } => format!(
                "Nekompatibilní verze souboru {}, očekávána {}",
                file_version, expected_version
            ),
        }
    }

    fn recommendation(&self, recommendation: &Recommendation) -> String {
        match recommendation {
            Recommendation::VelocityTooLow { .. } => {
                "Rychlost plynu je příliš nízká - zvyšte tlak nebo zmenšete průměr"
            }
            Recommendation::VelocityTooHigh { .. } => {
                "Rychlost plynu je příliš vysoká - snižte tlak nebo zvětšete průměr"
            }
            Recommendation::HeatDensityTooHigh { .. } => {
                "Hustota tepelného toku je příliš vysoká - zvětšete plochu hořáku"
            }
            Recommendation::AuxiliaryCooling { .. } => {
                "Doporučuje se přídavné chlazení při vysoké hustotě tepelného toku"
            }
            Recommendation::LongFlame { .. } => "Dlouhý plamen - zvažte úpravu geometrie spalovací komory",
            Recommendation::ResidenceTimeTooShort { .. } => {
                "Doba zdržení je příliš krátká - zvětšete objem komory"
            }
            Recommendation::ResidenceTimeTooLong { .. } => {
                "Doba zdržení je příliš dlouhá - zmenšete objem komory"
            }
            Recommendation::VolumeHeatRateTooHigh { .. } => {
                "Objemová hustota tepelného toku je příliš vysoká - zvětšete komoru"
            }
            Recommendation::LowEfficiency { .. } => {
                "Nízká tepelná účinnost - zvyšte izolaci nebo optimalizujte geometrii"
            }
            Recommendation::BelowTargetEfficiency { .. } => {
                "Tepelná účinnost nedosahuje požadované hodnoty"
            }
            Recommendation::HighWallTemperature { .. } => "Vysoká teplota stěny - zvyšte chlazení nebo izolaci",
            Recommendation::ElongatedChamber { .. } => "Velmi dlouhá komora - zvažte jiný poměr L/D",
        }
        .to_string()
    }

    fn criterion(&self, criterion: Criterion) -> &'static str {
        match criterion {
            Criterion::VelocityInRange => "Rychlost plynu v rozsahu",
            Criterion::HeatDensityAcceptable => "Hustota tepelného toku přijatelná",
            Criterion::ReasonableDimensions => "Rozměry hořáku přiměřené",
            Criterion::PressureDropReasonable => "Tlaková ztráta přiměřená",
            Criterion::ResidenceTimeAdequate => "Doba zdržení dostatečná",
            Criterion::VolumeHeatRateAcceptable => "Objemová hustota tepelného toku přijatelná",
            Criterion::DimensionsReasonable => "Rozměry komory přiměřené",
            Criterion::EfficiencyAcceptable => "Tepelná účinnost přijatelná",
            Criterion::WallTemperatureSafe => "Teplota stěny bezpečná",
        }
    }
}
