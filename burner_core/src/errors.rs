//! # Error Types
//!
//! Structured error types for burner_core. Every failure of a design stage is
//! one variant of [`DesignError`], carrying the offending values so callers can
//! react programmatically. Each variant also belongs to an [`ErrorCategory`].
//!
//! The `Display` text is plain English. Localized, user-facing wording lives in
//! [`crate::messages`] and never changes the identity of an error.
//!
//! ## Example
//!
//! ```rust
//! use burner_core::errors::{CalcResult, DesignError, ErrorCategory};
//!
//! fn check_power(power_w: f64) -> CalcResult<()> {
//!     if power_w <= 0.0 {
//!         return Err(DesignError::InvalidPower { value: power_w });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_power(-1.0).unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::InputValidation);
//! assert_eq!(err.error_code(), "INVALID_POWER");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for burner_core operations
pub type CalcResult<T> = Result<T, DesignError>;

/// Structured error type for design operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DesignError {
    /// A generic input value is invalid
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Mass flow rate is zero, negative or not finite
    #[error("Invalid flow rate: {value} kg/s (must be positive)")]
    InvalidFlowRate { value: f64 },

    /// Excess air ratio below stoichiometric
    #[error("Invalid excess air ratio: {value} (must be at least 1.0)")]
    InvalidExcessAir { value: f64 },

    /// Thermal power is zero, negative or not finite
    #[error("Invalid power: {value} W (must be positive)")]
    InvalidPower { value: f64 },

    /// Supply pressure is zero, negative or not finite
    #[error("Invalid supply pressure: {value} Pa (must be positive)")]
    InvalidPressure { value: f64 },

    /// Gas density is zero, negative or not finite
    #[error("Invalid gas density: {value} kg/m3 (must be positive)")]
    InvalidDensity { value: f64 },

    /// Piping layout without any segment
    #[error("Pipe segment list is empty")]
    EmptySegmentList,

    /// Requested residence time outside the allowed window
    #[error("Residence time {value} s outside allowed range [{min}, {max}] s")]
    ResidenceTimeOutOfRange { value: f64, min: f64, max: f64 },

    /// Fuel id not present in the catalog
    #[error("Unknown fuel: {fuel_id}")]
    UnknownFuel { fuel_id: String },

    /// Burner needs more supply pressure than is available
    #[error("Insufficient supply pressure: {required:.1} Pa required, {available:.1} Pa available")]
    InsufficientSupplyPressure { required: f64, available: f64 },

    /// Burner port heat release density above the allowed maximum
    #[error("Heat release density {value:.0} W/m2 exceeds maximum {max:.0} W/m2")]
    ExcessiveHeatDensity { value: f64, max: f64 },

    /// No standard pipe diameter satisfies the loss and velocity limits
    #[error("No feasible pipe diameter for max pressure loss {max_pressure_loss} Pa and max velocity {max_velocity} m/s")]
    NoFeasibleDiameter {
        max_pressure_loss: f64,
        max_velocity: f64,
    },

    /// A geometric dimension is not physically meaningful
    #[error("Invalid geometry: {field} = {value}")]
    InvalidGeometry { field: String, value: f64 },

    /// Flame must be hotter than the wall it radiates to
    #[error("Flame temperature {flame_temperature} K must exceed wall temperature {wall_temperature} K")]
    TemperatureOrderingViolation {
        flame_temperature: f64,
        wall_temperature: f64,
    },

    /// An iterative solver did not converge
    #[error("{solver} did not converge after {iterations} iterations (last change {residual:e})")]
    NonConvergence {
        solver: String,
        iterations: usize,
        residual: f64,
    },

    /// Fuel catalog is malformed
    #[error("Catalog error: {reason}")]
    Catalog { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

/// Coarse grouping of errors for callers that only need the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InputValidation,
    UnknownFuel,
    Infeasibility,
    Geometry,
    NumericalNonConvergence,
    Data,
}

impl DesignError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        DesignError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownFuel error
    pub fn unknown_fuel(fuel_id: impl Into<String>) -> Self {
        DesignError::UnknownFuel {
            fuel_id: fuel_id.into(),
        }
    }

    /// Create an InvalidGeometry error
    pub fn invalid_geometry(field: impl Into<String>, value: f64) -> Self {
        DesignError::InvalidGeometry {
            field: field.into(),
            value,
        }
    }

    /// Create a Catalog error
    pub fn catalog(reason: impl Into<String>) -> Self {
        DesignError::Catalog {
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        DesignError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Which family of failure this is
    pub fn category(&self) -> ErrorCategory {
        match self {
            DesignError::InvalidInput { .. }
            | DesignError::InvalidFlowRate { .. }
            | DesignError::InvalidExcessAir { .. }
            | DesignError::InvalidPower { .. }
            | DesignError::InvalidPressure { .. }
            | DesignError::InvalidDensity { .. }
            | DesignError::EmptySegmentList
            | DesignError::ResidenceTimeOutOfRange { .. } => ErrorCategory::InputValidation,
            DesignError::UnknownFuel { .. } => ErrorCategory::UnknownFuel,
            DesignError::InsufficientSupplyPressure { .. }
            | DesignError::ExcessiveHeatDensity { .. }
            | DesignError::NoFeasibleDiameter { .. } => ErrorCategory::Infeasibility,
            DesignError::InvalidGeometry { .. } | DesignError::TemperatureOrderingViolation { .. } => {
                ErrorCategory::Geometry
            }
            DesignError::NonConvergence { .. } => ErrorCategory::NumericalNonConvergence,
            DesignError::Catalog { .. }
            | DesignError::FileError { .. }
            | DesignError::SerializationError { .. }
            | DesignError::VersionMismatch { .. } => ErrorCategory::Data,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DesignError::InvalidInput { .. } => "INVALID_INPUT",
            DesignError::InvalidFlowRate { .. } => "INVALID_FLOW_RATE",
            DesignError::InvalidExcessAir { .. } => "INVALID_EXCESS_AIR",
            DesignError::InvalidPower { .. } => "INVALID_POWER",
            DesignError::InvalidPressure { .. } => "INVALID_PRESSURE",
            DesignError::InvalidDensity { .. } => "INVALID_DENSITY",
            DesignError::EmptySegmentList => "EMPTY_SEGMENT_LIST",
            DesignError::ResidenceTimeOutOfRange { .. } => "RESIDENCE_TIME_OUT_OF_RANGE",
            DesignError::UnknownFuel { .. } => "UNKNOWN_FUEL",
            DesignError::InsufficientSupplyPressure { .. } => "INSUFFICIENT_SUPPLY_PRESSURE",
            DesignError::ExcessiveHeatDensity { .. } => "EXCESSIVE_HEAT_DENSITY",
            DesignError::NoFeasibleDiameter { .. } => "NO_FEASIBLE_DIAMETER",
            DesignError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            DesignError::TemperatureOrderingViolation { .. } => "TEMPERATURE_ORDERING_VIOLATION",
            DesignError::NonConvergence { .. } => "NON_CONVERGENCE",
            DesignError::Catalog { .. } => "CATALOG_ERROR",
            DesignError::FileError { .. } => "FILE_ERROR",
            DesignError::SerializationError { .. } => "SERIALIZATION_ERROR",
            DesignError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

/// Reject non-finite or non-positive values with the error built by `err`.
pub(crate) fn require_positive(value: f64, err: impl FnOnce(f64) -> DesignError) -> CalcResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(err(value))
    }
}
