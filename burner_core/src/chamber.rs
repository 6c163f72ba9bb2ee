//! # Combustion Chamber Sizing
//!
//! Sizes a cylindrical, insulated combustion chamber for a target thermal
//! power and flue gas residence time, then estimates wall temperature, heat
//! loss and thermal efficiency.
//!
//! ## Method
//!
//! 1. Combustion at the design excess air (λ = 1.2) gives the flue gas mass
//!    flow and adiabatic flame temperature.
//! 2. Flue gas volume flow at flame temperature: `V̇ = ṁ·R·T / (p₀·M_air)`
//! 3. Volume `V = V̇ · τ · SF`; diameter from `V` at a fixed L/D, clamped.
//! 4. If the volumetric heat release `P / V` exceeds the limit, the volume is
//!    enlarged once to `P / q'''_max` and the geometry re-derived. The actual
//!    residence time is then `V / V̇`.
//! 5. Inner film coefficient from Dittus–Boelter (`Nu = 0.023·Re^0.8·Pr^0.4`)
//!    or the laminar value `Nu = 3.66`.
//! 6. Wall temperature from a series network: inner film, insulation, outer
//!    film.
//! 7. Heat loss through insulation and outer film; `η = 1 − Q_loss / P`.
//!
//! ## Example
//!
//! ```rust
//! use burner_core::catalog::FuelCatalog;
//! use burner_core::chamber::{ChamberInput, ChamberSizer};
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let design = ChamberSizer::new(&catalog)
//!     .design(&ChamberInput::new("methane", 100_000.0))
//!     .unwrap();
//!
//! assert!(design.volume > 0.0);
//! assert!(design.thermal_efficiency > 0.0 && design.thermal_efficiency < 1.0);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::FuelCatalog;
use crate::combustion::CombustionModel;
use crate::errors::{require_positive, CalcResult, DesignError};
use crate::validation::{Recommendation, ValidationEngine, ValidationReport};

/// Configurable chamber design limits and empirical constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChamberLimits {
    /// Shortest acceptable residence time (s)
    pub min_residence_time: f64,

    /// Longest acceptable residence time (s)
    pub max_residence_time: f64,

    /// Maximum volumetric heat release (W/m³)
    pub max_volume_heat_rate: f64,

    /// Diameter clamp (m)
    pub min_diameter: f64,
    pub max_diameter: f64,

    /// Chamber length to diameter ratio
    pub length_to_diameter: f64,

    /// Volume multiplier
    pub safety_factor: f64,

    /// Excess air ratio the chamber is designed for
    pub design_excess_air: f64,

    /// Insulation thermal conductivity (W/(m·K))
    pub insulation_conductivity: f64,

    /// Outer surface film coefficient (W/(m²·K))
    pub external_heat_transfer_coefficient: f64,

    /// Flue gas density used for the inner film Reynolds number (kg/m³)
    pub flue_gas_density: f64,

    /// Flue gas dynamic viscosity (Pa·s)
    pub flue_gas_viscosity: f64,

    /// Flue gas Prandtl number
    pub prandtl_number: f64,

    /// Lowest acceptable thermal efficiency (fraction)
    pub min_efficiency: f64,

    /// Highest safe inner wall temperature (K)
    pub max_wall_temperature: f64,

    /// Wall temperature above which more cooling is advised (K)
    pub wall_temperature_warning: f64,

    /// Length to diameter ratio above which the chamber is considered too slender
    pub max_reasonable_aspect_ratio: f64,

    /// Re-check the residence time after a corrective resize
    pub revalidate_resized_residence_time: bool,
}

impl Default for ChamberLimits {
    fn default() -> Self {
        ChamberLimits {
            min_residence_time: 0.1,
            max_residence_time: 10.0,
            max_volume_heat_rate: 3.0e6,
            min_diameter: 0.1,
            max_diameter: 3.0,
            length_to_diameter: 3.0,
            safety_factor: 1.5,
            design_excess_air: 1.2,
            insulation_conductivity: 0.2,
            external_heat_transfer_coefficient: 10.0,
            flue_gas_density: 1.0,
            flue_gas_viscosity: 2.0e-5,
            prandtl_number: 0.7,
            min_efficiency: 0.70,
            max_wall_temperature: 1800.0,
            wall_temperature_warning: 1600.0,
            max_reasonable_aspect_ratio: 5.0,
            revalidate_resized_residence_time: false,
        }
    }
}

/// Input parameters for chamber sizing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "fuel_id": "natural_gas",
///   "required_power": 100000.0,
///   "target_residence_time": 0.5,
///   "insulation_thickness": 0.1,
///   "ambient_temperature": 293.15,
///   "target_efficiency": 0.85
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamberInput {
    pub fuel_id: String,

    /// Thermal power (W)
    pub required_power: f64,

    /// Flue gas residence time to design for (s)
    #[serde(default = "default_residence_time")]
    pub target_residence_time: f64,

    /// Insulation thickness (m)
    #[serde(default = "default_insulation_thickness")]
    pub insulation_thickness: f64,

    /// Surroundings temperature (K)
    #[serde(default = "default_ambient_temperature")]
    pub ambient_temperature: f64,

    /// Thermal efficiency the design should reach (fraction)
    #[serde(default = "default_target_efficiency")]
    pub target_efficiency: f64,
}

pub(crate) fn default_residence_time() -> f64 {
    0.5
}

pub(crate) fn default_insulation_thickness() -> f64 {
    0.1
}

pub(crate) fn default_ambient_temperature() -> f64 {
    293.15
}

pub(crate) fn default_target_efficiency() -> f64 {
    0.85
}

impl ChamberInput {
    pub fn new(fuel_id: impl Into<String>, required_power: f64) -> Self {
        ChamberInput {
            fuel_id: fuel_id.into(),
            required_power,
            target_residence_time: default_residence_time(),
            insulation_thickness: default_insulation_thickness(),
            ambient_temperature: default_ambient_temperature(),
            target_efficiency: default_target_efficiency(),
        }
    }

    /// Validate input parameters against the sizing limits.
    pub fn validate(&self, limits: &ChamberLimits) -> CalcResult<()> {
        require_positive(self.required_power, |value| DesignError::InvalidPower { value })?;

        let t = self.target_residence_time;
        if !(t.is_finite() && t >= limits.min_residence_time && t <= limits.max_residence_time) {
            return Err(DesignError::ResidenceTimeOutOfRange {
                value: t,
                min: limits.min_residence_time,
                max: limits.max_residence_time,
            });
        }
        if !(self.insulation_thickness.is_finite() && self.insulation_thickness > 0.0) {
            return Err(DesignError::invalid_input(
                "insulation_thickness",
                self.insulation_thickness.to_string(),
                "Insulation thickness must be positive",
            ));
        }
        if !(self.ambient_temperature.is_finite() && self.ambient_temperature > 0.0) {
            return Err(DesignError::invalid_input(
                "ambient_temperature",
                self.ambient_temperature.to_string(),
                "Ambient temperature must be positive (K)",
            ));
        }
        if !(self.target_efficiency > 0.0 && self.target_efficiency <= 1.0) {
            return Err(DesignError::invalid_input(
                "target_efficiency",
                self.target_efficiency.to_string(),
                "Target efficiency must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Chamber geometry and thermal performance.
///
/// ## JSON Example
///
/// ```json
/// {
///   "volume": 0.2156,
///   "diameter": 0.4506,
///   "length": 1.352,
///   "area": 0.1595,
///   "residence_time": 0.75,
///   "heat_transfer_coefficient": 7.26,
///   "wall_temperature": 1958.0,
///   "heat_loss_rate": 6200.0,
///   "thermal_efficiency": 0.938,
///   "volume_heat_release_rate": 463800.0,
///   "flame_temperature": 2341.15,
///   "flue_gas_volume_flow": 0.2875,
///   "resized": false,
///   "meets_target_efficiency": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamberDesign {
    /// Internal volume (m³)
    pub volume: f64,

    /// Internal diameter (m)
    pub diameter: f64,

    /// Internal length (m)
    pub length: f64,

    /// Cross-section area (m²)
    pub area: f64,

    /// Actual flue gas residence time (s)
    pub residence_time: f64,

    /// Inner film coefficient (W/(m²·K))
    pub heat_transfer_coefficient: f64,

    /// Inner wall temperature (K)
    pub wall_temperature: f64,

    /// Heat lost through the shell (W)
    pub heat_loss_rate: f64,

    /// 1 − loss/power (fraction)
    pub thermal_efficiency: f64,

    /// Heat release per chamber volume (W/m³)
    pub volume_heat_release_rate: f64,

    /// Adiabatic flame temperature at the design excess air (K)
    pub flame_temperature: f64,

    /// Flue gas volume flow at flame temperature (m³/s)
    pub flue_gas_volume_flow: f64,

    /// Whether the corrective volume resize was applied
    pub resized: bool,

    pub meets_target_efficiency: bool,
}

impl ChamberDesign {
    /// Same value as `wall_temperature`.
    pub fn chamber_wall_temperature(&self) -> f64 {
        self.wall_temperature
    }

    /// Inner surface including both end caps (m²)
    pub fn surface_area(&self) -> f64 {
        PI * self.diameter * self.length + 2.0 * self.area
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.length / self.diameter
    }
}

/// One point of an axial gas temperature profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePoint {
    /// Distance from the burner end (m)
    pub position: f64,
    /// Gas temperature (K)
    pub temperature: f64,
}

/// Chamber sizing against a fuel catalog.
#[derive(Debug, Clone, Copy)]
pub struct ChamberSizer<'a> {
    catalog: &'a FuelCatalog,
    limits: ChamberLimits,
}

impl<'a> ChamberSizer<'a> {
    pub fn new(catalog: &'a FuelCatalog) -> Self {
        ChamberSizer {
            catalog,
            limits: ChamberLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ChamberLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ChamberLimits {
        &self.limits
    }

    /// Size a chamber.
    ///
    /// # Errors
    ///
    /// * `InvalidPower` - power ≤ 0
    /// * `ResidenceTimeOutOfRange` - target residence time outside the limits,
    ///   or the resized residence time when re-validation is enabled
    /// * `UnknownFuel` - fuel id not in the catalog
    /// * `InvalidInput` - insulation, ambient temperature or target efficiency
    pub fn design(&self, input: &ChamberInput) -> CalcResult<ChamberDesign> {
        let limits = &self.limits;
        input.validate(limits)?;
        let fuel = self.catalog.fuel(&input.fuel_id)?;
        let constants = self.catalog.constants();

        let fuel_flow_rate = input.required_power / fuel.lower_heating_value_mass;
        let combustion =
            CombustionModel::new(self.catalog).calculate(&input.fuel_id, fuel_flow_rate, limits.design_excess_air)?;
        let flame_temperature = combustion.adiabatic_flame_temperature;

        let flue_gas_volume_flow = combustion.flue_gas_flow_rate
            * constants.universal_gas_constant
            * flame_temperature
            / (constants.standard_pressure * constants.air_molecular_weight / 1000.0);

        let mut volume = flue_gas_volume_flow * input.target_residence_time * limits.safety_factor;
        let (mut diameter, mut length, mut area) = self.dimensions(volume);
        let mut volume_heat_release_rate = input.required_power / volume;

        let mut resized = false;
        if volume_heat_release_rate > limits.max_volume_heat_rate {
            warn!(
                "Volumetric heat release {:.0} W/m3 above {:.0} W/m3, enlarging chamber",
                volume_heat_release_rate, limits.max_volume_heat_rate
            );
            volume = input.required_power / limits.max_volume_heat_rate;
            (diameter, length, area) = self.dimensions(volume);
            volume_heat_release_rate = input.required_power / volume;
            resized = true;
        }

        let residence_time = volume / flue_gas_volume_flow;
        if resized
            && limits.revalidate_resized_residence_time
            && !(limits.min_residence_time..=limits.max_residence_time).contains(&residence_time)
        {
            return Err(DesignError::ResidenceTimeOutOfRange {
                value: residence_time,
                min: limits.min_residence_time,
                max: limits.max_residence_time,
            });
        }

        let heat_transfer_coefficient =
            self.heat_transfer_coefficient(combustion.flue_gas_flow_rate, diameter, flame_temperature);
        let wall_temperature = self.wall_temperature(
            flame_temperature,
            heat_transfer_coefficient,
            input.insulation_thickness,
            input.ambient_temperature,
        );

        let surface = PI * diameter * length + 2.0 * area;
        let shell_u = 1.0
            / (input.insulation_thickness / limits.insulation_conductivity
                + 1.0 / limits.external_heat_transfer_coefficient);
        let heat_loss_rate = shell_u * surface * (wall_temperature - input.ambient_temperature);
        let thermal_efficiency = 1.0 - heat_loss_rate / input.required_power;

        debug!(
            "Chamber {}: V {:.4} m3, D {:.3} m, L {:.3} m, T_wall {:.0} K, eta {:.3}",
            input.fuel_id, volume, diameter, length, wall_temperature, thermal_efficiency
        );

        Ok(ChamberDesign {
            volume,
            diameter,
            length,
            area,
            residence_time,
            heat_transfer_coefficient,
            wall_temperature,
            heat_loss_rate,
            thermal_efficiency,
            volume_heat_release_rate,
            flame_temperature,
            flue_gas_volume_flow,
            resized,
            meets_target_efficiency: thermal_efficiency >= input.target_efficiency,
        })
    }

    /// Diameter, length and cross-section for a volume at the design L/D.
    fn dimensions(&self, volume: f64) -> (f64, f64, f64) {
        let ld = self.limits.length_to_diameter;
        let diameter = (4.0 * volume / (PI * ld))
            .cbrt()
            .clamp(self.limits.min_diameter, self.limits.max_diameter);
        let length = ld * diameter;
        let area = PI * diameter.powi(2) / 4.0;
        (diameter, length, area)
    }

    /// Inner film coefficient (W/(m²·K)).
    pub fn heat_transfer_coefficient(&self, flue_gas_flow_rate: f64, diameter: f64, gas_temperature: f64) -> f64 {
        let limits = &self.limits;
        let velocity = flue_gas_flow_rate / (limits.flue_gas_density * PI * diameter.powi(2) / 4.0);
        let reynolds = limits.flue_gas_density * velocity * diameter / limits.flue_gas_viscosity;

        let nusselt = if reynolds > 2300.0 {
            0.023 * reynolds.powf(0.8) * limits.prandtl_number.powf(0.4)
        } else {
            3.66
        };

        // Linear fit of flue gas conductivity above 0 °C
        let conductivity = 0.05 + (gas_temperature - 273.15) * 5.0e-5;
        nusselt * conductivity / diameter
    }

    /// Inner wall temperature from gas → wall → insulation → ambient (K).
    pub fn wall_temperature(
        &self,
        gas_temperature: f64,
        heat_transfer_coefficient: f64,
        insulation_thickness: f64,
        ambient_temperature: f64,
    ) -> f64 {
        let limits = &self.limits;
        let r_inner = 1.0 / heat_transfer_coefficient;
        let r_insulation = insulation_thickness / limits.insulation_conductivity;
        let r_outer = 1.0 / limits.external_heat_transfer_coefficient;

        let heat_flux = (gas_temperature - ambient_temperature) / (r_inner + r_insulation + r_outer);
        gas_temperature - heat_flux * r_inner
    }

    /// Axial gas temperature profile relaxing from `inlet_temperature` toward
    /// the wall temperature; `segments + 1` evenly spaced points.
    pub fn temperature_profile(
        &self,
        design: &ChamberDesign,
        inlet_temperature: f64,
        segments: usize,
    ) -> CalcResult<Vec<TemperaturePoint>> {
        if segments == 0 {
            return Err(DesignError::invalid_input("segments", "0", "Profile needs at least one segment"));
        }
        if !(design.length.is_finite() && design.length > 0.0) {
            return Err(DesignError::invalid_geometry("length", design.length));
        }

        let decay = 2.0 / design.length;
        let profile = (0..=segments)
            .map(|i| {
                let position = design.length * i as f64 / segments as f64;
                let weight = (-decay * position).exp();
                TemperaturePoint {
                    position,
                    temperature: inlet_temperature * weight + design.wall_temperature * (1.0 - weight),
                }
            })
            .collect();
        Ok(profile)
    }

    pub fn validate(&self, design: &ChamberDesign) -> ValidationReport {
        ValidationEngine::default()
            .with_chamber_limits(self.limits)
            .validate_chamber(design)
    }

    pub fn recommendations(&self, design: &ChamberDesign) -> Vec<Recommendation> {
        ValidationEngine::default()
            .with_chamber_limits(self.limits)
            .chamber_recommendations(design)
    }
}
