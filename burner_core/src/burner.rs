//! # Burner Sizing
//!
//! Sizes a single round burner port for a target thermal power and an available
//! gas supply pressure.
//!
//! ## Method
//!
//! 1. Fuel flow from power: `ṁ = P / LHV`
//! 2. Supply gas density from the ideal-gas law at the supply pressure and
//!    20 °C
//! 3. Exit velocity: caller target, or a family base velocity scaled by
//!    `min(2, (P / 100 kW)^0.3)`; always clamped to `[MIN_V, MAX_V]`
//! 4. Port area `A = V̇ / v`, diameter `D = √(4A/π)`
//! 5. Pressure drop `ΔP = K·ρ·v²/2`, required supply `ΔP · SF`
//! 6. Heat release density `P / A`
//! 7. Port length `3·D`, flame length `C·√Re·D` clamped to `[5D, 50D]`
//!
//! ## Example
//!
//! ```rust
//! use burner_core::burner::{BurnerInput, BurnerSizer};
//! use burner_core::catalog::FuelCatalog;
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let sizer = BurnerSizer::new(&catalog);
//!
//! let input = BurnerInput {
//!     target_velocity: Some(5.0),
//!     ..BurnerInput::new("methane", 100_000.0, 3000.0)
//! };
//! let design = sizer.design(&input).unwrap();
//!
//! assert!(design.required_supply_pressure <= 3000.0);
//! assert!(design.heat_release_density <= 5.0e6);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{FuelCatalog, FuelFamily, FuelProperties};
use crate::combustion::CombustionModel;
use crate::errors::{require_positive, CalcResult, DesignError};
use crate::validation::{Recommendation, ValidationEngine, ValidationReport};

/// Configurable burner design limits and empirical constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnerLimits {
    /// Minimum port exit velocity (m/s)
    pub min_velocity: f64,

    /// Maximum port exit velocity (m/s)
    pub max_velocity: f64,

    /// Maximum heat release per port area (W/m²)
    pub max_heat_release_density: f64,

    /// Port loss coefficient K
    pub discharge_loss_coefficient: f64,

    /// Multiplier from port pressure drop to required supply pressure
    pub safety_factor: f64,

    /// Port length to diameter ratio
    pub length_to_diameter: f64,

    /// Gas temperature at the port (K)
    pub supply_temperature: f64,

    /// Fuel dynamic viscosity for the flame length correlation (Pa·s)
    pub fuel_viscosity: f64,

    /// Power at which the base velocity applies unscaled (W)
    pub reference_power: f64,

    /// Upper bound on the power scaling of the base velocity
    pub max_power_factor: f64,

    /// Heat release density above which extra cooling is advised (W/m²)
    pub cooling_advice_density: f64,

    /// Fraction of the supply pressure the port may consume
    pub max_pressure_drop_fraction: f64,
}

impl Default for BurnerLimits {
    fn default() -> Self {
        BurnerLimits {
            min_velocity: 5.0,
            max_velocity: 100.0,
            max_heat_release_density: 5.0e6,
            discharge_loss_coefficient: 0.8,
            safety_factor: 1.2,
            length_to_diameter: 3.0,
            supply_temperature: 293.15,
            fuel_viscosity: 1.5e-5,
            reference_power: 100_000.0,
            max_power_factor: 2.0,
            cooling_advice_density: 3.0e6,
            max_pressure_drop_fraction: 0.8,
        }
    }
}

impl FuelFamily {
    /// Base port velocity at the reference power (m/s)
    pub fn base_burner_velocity(&self) -> f64 {
        match self {
            FuelFamily::Propane => 15.0,
            FuelFamily::Methane | FuelFamily::Generic => 20.0,
        }
    }

    /// Coefficient of the jet flame length correlation
    pub fn flame_length_coefficient(&self) -> f64 {
        match self {
            FuelFamily::Methane => 0.2,
            FuelFamily::Propane | FuelFamily::Generic => 0.25,
        }
    }
}

/// Input parameters for burner sizing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "fuel_id": "natural_gas",
///   "required_power": 100000.0,
///   "supply_pressure": 3000.0,
///   "target_velocity": null,
///   "excess_air_ratio": 1.2
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnerInput {
    /// Catalog fuel id
    pub fuel_id: String,

    /// Required thermal power (W)
    pub required_power: f64,

    /// Available gas supply pressure (Pa)
    pub supply_pressure: f64,

    /// Desired port velocity (m/s); derived from power when absent
    #[serde(default)]
    pub target_velocity: Option<f64>,

    /// Excess air ratio λ
    #[serde(default = "default_excess_air")]
    pub excess_air_ratio: f64,
}

pub(crate) fn default_excess_air() -> f64 {
    1.2
}

impl BurnerInput {
    /// Input with a derived velocity and λ = 1.2.
    pub fn new(fuel_id: impl Into<String>, required_power: f64, supply_pressure: f64) -> Self {
        BurnerInput {
            fuel_id: fuel_id.into(),
            required_power,
            supply_pressure,
            target_velocity: None,
            excess_air_ratio: default_excess_air(),
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive(self.required_power, |value| DesignError::InvalidPower { value })?;
        require_positive(self.supply_pressure, |value| DesignError::InvalidPressure { value })?;
        if let Some(v) = self.target_velocity {
            if !v.is_finite() {
                return Err(DesignError::invalid_input(
                    "target_velocity",
                    v.to_string(),
                    "Target velocity must be finite",
                ));
            }
        }
        Ok(())
    }
}

/// Burner port geometry and hydraulics.
///
/// ## JSON Example
///
/// ```json
/// {
///   "diameter": 0.1606,
///   "area": 0.02026,
///   "velocity": 5.0,
///   "pressure_drop": 0.197,
///   "required_supply_pressure": 0.237,
///   "heat_release_density": 4936000.0,
///   "length": 0.482,
///   "flame_length": 6.29,
///   "supply_pressure": 3000.0,
///   "fuel_flow_rate": 0.002,
///   "gas_density": 0.01974
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnerDesign {
    /// Port diameter (m)
    pub diameter: f64,

    /// Port area (m²)
    pub area: f64,

    /// Exit velocity (m/s)
    pub velocity: f64,

    /// Port pressure drop (Pa)
    pub pressure_drop: f64,

    /// Pressure drop including safety factor (Pa)
    pub required_supply_pressure: f64,

    /// Heat release per port area (W/m²)
    pub heat_release_density: f64,

    /// Port length (m)
    pub length: f64,

    /// Estimated visible flame length (m)
    pub flame_length: f64,

    /// Supply pressure the design was made for (Pa)
    pub supply_pressure: f64,

    /// Fuel mass flow (kg/s)
    pub fuel_flow_rate: f64,

    /// Gas density at the port (kg/m³)
    pub gas_density: f64,
}

impl BurnerDesign {
    /// Gas volume flow through the port (m³/s)
    pub fn volumetric_flow(&self) -> f64 {
        self.fuel_flow_rate / self.gas_density
    }

    /// Supply pressure left over after the required pressure (Pa)
    pub fn pressure_margin(&self) -> f64 {
        self.supply_pressure - self.required_supply_pressure
    }
}

/// Burner sizing against a fuel catalog.
#[derive(Debug, Clone, Copy)]
pub struct BurnerSizer<'a> {
    catalog: &'a FuelCatalog,
    limits: BurnerLimits,
}

impl<'a> BurnerSizer<'a> {
    pub fn new(catalog: &'a FuelCatalog) -> Self {
        BurnerSizer {
            catalog,
            limits: BurnerLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: BurnerLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &BurnerLimits {
        &self.limits
    }

    /// Size a burner port.
    ///
    /// # Errors
    ///
    /// * `InvalidPower` / `InvalidPressure` - non-positive inputs
    /// * `UnknownFuel` - fuel id not in the catalog
    /// * `InvalidExcessAir` - λ < 1
    /// * `InsufficientSupplyPressure` - required supply pressure above the available one
    /// * `ExcessiveHeatDensity` - heat release density above the limit
    pub fn design(&self, input: &BurnerInput) -> CalcResult<BurnerDesign> {
        input.validate()?;
        let fuel = self.catalog.fuel(&input.fuel_id)?;
        let constants = self.catalog.constants();
        let limits = &self.limits;

        let fuel_flow_rate = input.required_power / fuel.lower_heating_value_mass;
        CombustionModel::new(self.catalog).calculate(&input.fuel_id, fuel_flow_rate, input.excess_air_ratio)?;

        let gas_density = input.supply_pressure * (fuel.molecular_weight / 1000.0)
            / (constants.universal_gas_constant * limits.supply_temperature);

        let requested = input
            .target_velocity
            .unwrap_or_else(|| self.derived_velocity(fuel.family, input.required_power));
        let velocity = requested.clamp(limits.min_velocity, limits.max_velocity);
        if velocity != requested {
            debug!("Port velocity {:.2} m/s clamped to {:.2} m/s", requested, velocity);
        }

        let volumetric_flow = fuel_flow_rate / gas_density;
        let area = volumetric_flow / velocity;
        let diameter = (4.0 * area / PI).sqrt();

        let pressure_drop = limits.discharge_loss_coefficient * gas_density * velocity.powi(2) / 2.0;
        let required_supply_pressure = pressure_drop * limits.safety_factor;
        if required_supply_pressure > input.supply_pressure {
            warn!(
                "Burner needs {:.1} Pa but only {:.1} Pa is available",
                required_supply_pressure, input.supply_pressure
            );
            return Err(DesignError::InsufficientSupplyPressure {
                required: required_supply_pressure,
                available: input.supply_pressure,
            });
        }

        let heat_release_density = input.required_power / area;
        if heat_release_density > limits.max_heat_release_density {
            return Err(DesignError::ExcessiveHeatDensity {
                value: heat_release_density,
                max: limits.max_heat_release_density,
            });
        }

        let length = limits.length_to_diameter * diameter;
        let flame_length = self.flame_length(fuel, velocity, diameter);

        debug!(
            "Burner {}: D {:.4} m, v {:.2} m/s, dP {:.2} Pa, q {:.0} W/m2",
            input.fuel_id, diameter, velocity, pressure_drop, heat_release_density
        );

        Ok(BurnerDesign {
            diameter,
            area,
            velocity,
            pressure_drop,
            required_supply_pressure,
            heat_release_density,
            length,
            flame_length,
            supply_pressure: input.supply_pressure,
            fuel_flow_rate,
            gas_density,
        })
    }

    /// Velocity used when the caller gives no target (m/s), before clamping.
    pub fn derived_velocity(&self, family: FuelFamily, required_power: f64) -> f64 {
        let scale = (required_power / self.limits.reference_power)
            .powf(0.3)
            .min(self.limits.max_power_factor);
        family.base_burner_velocity() * scale
    }

    /// Free-jet flame length estimate (m), bounded to 5..50 port diameters.
    pub fn flame_length(&self, fuel: &FuelProperties, velocity: f64, diameter: f64) -> f64 {
        let reynolds = fuel.density * velocity * diameter / self.limits.fuel_viscosity;
        let length = fuel.family.flame_length_coefficient() * reynolds.sqrt() * diameter;
        length.clamp(5.0 * diameter, 50.0 * diameter)
    }

    pub fn validate(&self, design: &BurnerDesign) -> ValidationReport {
        ValidationEngine::default()
            .with_burner_limits(self.limits)
            .validate_burner(design)
    }

    pub fn recommendations(&self, design: &BurnerDesign) -> Vec<Recommendation> {
        ValidationEngine::default()
            .with_burner_limits(self.limits)
            .burner_recommendations(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn catalog() -> FuelCatalog {
        FuelCatalog::builtin().unwrap()
    }

    fn methane_input(supply_pressure: f64, target_velocity: Option<f64>) -> BurnerInput {
        BurnerInput {
            target_velocity,
            ..BurnerInput::new("methane", 100_000.0, supply_pressure)
        }
    }

    #[test]
    fn test_methane_design_at_low_velocity() {
        let catalog = catalog();
        let design = BurnerSizer::new(&catalog)
            .design(&methane_input(3000.0, Some(5.0)))
            .unwrap();

        // rho = 3000 * 0.01604 / (8.314 * 293.15)
        let rho = 3000.0 * 0.01604 / (8.314 * 293.15);
        assert_relative_eq!(design.gas_density, rho, max_relative = 1e-12);
        assert_relative_eq!(design.fuel_flow_rate, 0.002, max_relative = 1e-12);
        assert_eq!(design.velocity, 5.0);
        assert_relative_eq!(design.area, 0.002 / rho / 5.0, max_relative = 1e-12);
        assert_relative_eq!(design.diameter, (4.0 * design.area / PI).sqrt(), max_relative = 1e-12);
        assert_relative_eq!(design.pressure_drop, 0.8 * rho * 25.0 / 2.0, max_relative = 1e-12);
        assert_relative_eq!(design.required_supply_pressure, design.pressure_drop * 1.2);
        assert_relative_eq!(design.length, 3.0 * design.diameter);
        assert!(design.heat_release_density <= 5.0e6);
        assert!(design.required_supply_pressure <= 3000.0);
    }

    #[test]
    fn test_derived_velocity_exceeds_heat_density_cap() {
        // 20 m/s at 30 mbar puts almost 20 MW/m² through the port.
        let catalog = catalog();
        let err = BurnerSizer::new(&catalog)
            .design(&methane_input(3000.0, None))
            .unwrap_err();
        match err {
            DesignError::ExcessiveHeatDensity { value, max } => {
                assert!(value > max);
                assert_eq!(max, 5.0e6);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_velocity_is_clamped_to_maximum() {
        let catalog = catalog();
        let design = BurnerSizer::new(&catalog)
            .design(&methane_input(100.0, Some(120.0)))
            .unwrap();
        assert_eq!(design.velocity, 100.0);
    }

    #[test]
    fn test_velocity_is_clamped_to_minimum() {
        let catalog = catalog();
        let design = BurnerSizer::new(&catalog)
            .design(&methane_input(3000.0, Some(1.0)))
            .unwrap();
        assert_eq!(design.velocity, 5.0);
    }

    #[test]
    fn test_non_positive_velocity_is_clamped() {
        let catalog = catalog();
        let sizer = BurnerSizer::new(&catalog);
        for v in [0.0, -3.0] {
            let design = sizer.design(&methane_input(3000.0, Some(v))).unwrap();
            assert_eq!(design.velocity, 5.0);
        }
        for v in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                sizer.design(&methane_input(3000.0, Some(v))),
                Err(DesignError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_derived_velocity_scaling() {
        let catalog = catalog();
        let sizer = BurnerSizer::new(&catalog);
        assert_relative_eq!(sizer.derived_velocity(FuelFamily::Methane, 100_000.0), 20.0);
        assert_relative_eq!(sizer.derived_velocity(FuelFamily::Propane, 100_000.0), 15.0);
        // (10 MW / 100 kW)^0.3 > 2, so the factor is capped
        assert_relative_eq!(sizer.derived_velocity(FuelFamily::Methane, 10.0e6), 40.0);
    }

    #[test]
    fn test_insufficient_supply_pressure() {
        let catalog = catalog();
        let limits = BurnerLimits {
            safety_factor: 1.0e5,
            ..BurnerLimits::default()
        };
        let err = BurnerSizer::new(&catalog)
            .with_limits(limits)
            .design(&methane_input(3000.0, Some(5.0)))
            .unwrap_err();
        match err {
            DesignError::InsufficientSupplyPressure { required, available } => {
                assert!(required > available);
                assert_eq!(available, 3000.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let catalog = catalog();
        let sizer = BurnerSizer::new(&catalog);
        assert!(matches!(
            sizer.design(&BurnerInput::new("methane", 0.0, 3000.0)),
            Err(DesignError::InvalidPower { .. })
        ));
        assert!(matches!(
            sizer.design(&BurnerInput::new("methane", 100_000.0, -5.0)),
            Err(DesignError::InvalidPressure { .. })
        ));
        assert!(matches!(
            sizer.design(&BurnerInput::new("hydrogen", 100_000.0, 3000.0)),
            Err(DesignError::UnknownFuel { .. })
        ));
        let lean = BurnerInput {
            excess_air_ratio: 0.9,
            ..methane_input(3000.0, Some(5.0))
        };
        assert!(matches!(sizer.design(&lean), Err(DesignError::InvalidExcessAir { .. })));
    }

    #[test]
    fn test_flame_length_bounds() {
        let catalog = catalog();
        let sizer = BurnerSizer::new(&catalog);
        let design = sizer.design(&methane_input(3000.0, Some(5.0))).unwrap();
        assert!(design.flame_length >= 5.0 * design.diameter - 1e-12);
        assert!(design.flame_length <= 50.0 * design.diameter + 1e-12);

        let methane = catalog.fuel("methane").unwrap();
        // Tiny port: Re is small so the lower clamp wins
        let d = 1.0e-4;
        assert_relative_eq!(sizer.flame_length(methane, 5.0, d), 5.0 * d);
    }

    #[test]
    fn test_propane_at_low_pressure() {
        let catalog = catalog();
        let input = BurnerInput {
            target_velocity: Some(5.0),
            ..BurnerInput::new("propane", 50_000.0, 1000.0)
        };
        let design = BurnerSizer::new(&catalog).design(&input).unwrap();
        assert!(design.heat_release_density <= 5.0e6);
        assert!(design.pressure_margin() > 0.0);
        assert_relative_eq!(design.volumetric_flow(), design.area * design.velocity, max_relative = 1e-12);
    }

    #[test]
    fn test_input_json_defaults() {
        let json = r#"{"fuel_id":"methane","required_power":100000.0,"supply_pressure":3000.0}"#;
        let input: BurnerInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.target_velocity, None);
        assert_eq!(input.excess_air_ratio, 1.2);
    }
}
