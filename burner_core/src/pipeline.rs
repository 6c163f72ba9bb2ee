//! # Design Pipeline
//!
//! Runs the full burner design chain for one set of inputs:
//!
//! 1. combustion at the case's excess air ratio
//! 2. burner port sizing
//! 3. combustion chamber sizing at the chamber design excess air (λ = 1.2)
//! 4. flame radiation between the case flame and the chamber wall
//! 5. gas supply piping losses, when a layout is given. The line density is
//!    taken at absolute line pressure (atmosphere plus supply gauge pressure).
//! 6. validation and recommendations
//!
//! The first failing stage aborts the run and its error is returned as is.
//!
//! ## Example
//!
//! ```rust
//! use burner_core::catalog::FuelCatalog;
//! use burner_core::pipeline::{DesignPipeline, PipelineInput};
//! use burner_core::project::DesignSettings;
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let settings = DesignSettings::default();
//! let input = PipelineInput {
//!     target_velocity: Some(5.0),
//!     ..PipelineInput::new("methane", 100_000.0, 3000.0)
//! };
//!
//! let report = DesignPipeline::new(&catalog, &settings).run(&input).unwrap();
//! assert!(report.radiation.flame_to_wall > 0.0);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::burner::{default_excess_air, BurnerDesign, BurnerInput, BurnerSizer};
use crate::catalog::FuelCatalog;
use crate::chamber::{
    default_ambient_temperature, default_insulation_thickness, default_residence_time, default_target_efficiency,
    ChamberDesign, ChamberInput, ChamberSizer,
};
use crate::combustion::{CombustionModel, CombustionResult};
use crate::errors::{require_positive, CalcResult, DesignError};
use crate::flow_network::{
    Fitting, FlowNetworkSolver, PipeSegment, PressureLossResult, SystemLossInput, DEFAULT_GAS_VISCOSITY,
};
use crate::project::DesignSettings;
use crate::radiation::{FlameRadiationInput, RadiationModel, RadiationResult};
use crate::validation::{Recommendation, ValidationEngine, ValidationReport};

/// Gas supply line feeding the burner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipingLayout {
    pub segments: Vec<PipeSegment>,
    #[serde(default)]
    pub fittings: Vec<Fitting>,
    /// Pa·s
    #[serde(default = "default_viscosity")]
    pub viscosity: f64,
    /// Gas density in the line (kg/m³); computed from the supply pressure when absent
    #[serde(default)]
    pub gas_density: Option<f64>,
}

fn default_viscosity() -> f64 {
    DEFAULT_GAS_VISCOSITY
}

/// Inputs for one pipeline run.
///
/// ## JSON Example
///
/// ```json
/// {
///   "fuel_id": "methane",
///   "required_power": 100000.0,
///   "supply_pressure": 3000.0,
///   "excess_air_ratio": 1.2,
///   "target_velocity": 5.0,
///   "residence_time": 0.5,
///   "insulation_thickness": 0.1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInput {
    pub fuel_id: String,

    /// W
    pub required_power: f64,

    /// Pa
    pub supply_pressure: f64,

    #[serde(default = "default_excess_air")]
    pub excess_air_ratio: f64,

    /// Burner port velocity (m/s); derived from power when absent
    #[serde(default)]
    pub target_velocity: Option<f64>,

    /// Target chamber residence time (s)
    #[serde(default = "default_residence_time")]
    pub residence_time: f64,

    /// m
    #[serde(default = "default_insulation_thickness")]
    pub insulation_thickness: f64,

    /// K
    #[serde(default = "default_ambient_temperature")]
    pub ambient_temperature: f64,

    /// Fraction in (0, 1]
    #[serde(default = "default_target_efficiency")]
    pub target_efficiency: f64,

    /// kg/m³
    #[serde(default)]
    pub soot_concentration: f64,

    #[serde(default)]
    pub piping: Option<PipingLayout>,
}

impl PipelineInput {
    pub fn new(fuel_id: impl Into<String>, required_power: f64, supply_pressure: f64) -> Self {
        PipelineInput {
            fuel_id: fuel_id.into(),
            required_power,
            supply_pressure,
            excess_air_ratio: default_excess_air(),
            target_velocity: None,
            residence_time: default_residence_time(),
            insulation_thickness: default_insulation_thickness(),
            ambient_temperature: default_ambient_temperature(),
            target_efficiency: default_target_efficiency(),
            soot_concentration: 0.0,
            piping: None,
        }
    }

    fn burner_input(&self) -> BurnerInput {
        BurnerInput {
            fuel_id: self.fuel_id.clone(),
            required_power: self.required_power,
            supply_pressure: self.supply_pressure,
            target_velocity: self.target_velocity,
            excess_air_ratio: self.excess_air_ratio,
        }
    }

    fn chamber_input(&self) -> ChamberInput {
        ChamberInput {
            fuel_id: self.fuel_id.clone(),
            required_power: self.required_power,
            target_residence_time: self.residence_time,
            insulation_thickness: self.insulation_thickness,
            ambient_temperature: self.ambient_temperature,
            target_efficiency: self.target_efficiency,
        }
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub fuel_id: String,
    pub combustion: CombustionResult,
    pub burner: BurnerDesign,
    pub chamber: ChamberDesign,
    pub radiation: RadiationResult,
    pub piping: Option<PressureLossResult>,
    pub burner_validation: ValidationReport,
    pub chamber_validation: ValidationReport,
    pub recommendations: Vec<Recommendation>,
}

impl PipelineReport {
    pub fn all_passed(&self) -> bool {
        self.burner_validation.all_passed() && self.chamber_validation.all_passed()
    }

    /// Burner and chamber checks in one report.
    pub fn validation(&self) -> ValidationReport {
        let mut report = self.burner_validation.clone();
        report.extend(self.chamber_validation.clone());
        report
    }
}

/// Runs the design chain against one catalog and settings set.
#[derive(Debug, Clone, Copy)]
pub struct DesignPipeline<'a> {
    catalog: &'a FuelCatalog,
    settings: &'a DesignSettings,
}

impl<'a> DesignPipeline<'a> {
    pub fn new(catalog: &'a FuelCatalog, settings: &'a DesignSettings) -> Self {
        DesignPipeline { catalog, settings }
    }

    /// Fuel density in the supply line at atmospheric plus supply pressure
    /// and the burner supply temperature (kg/m³).
    pub fn line_density(&self, fuel_id: &str, supply_pressure: f64) -> CalcResult<f64> {
        let fuel = self.catalog.fuel(fuel_id)?;
        let constants = self.catalog.constants();
        let absolute_pressure = constants.standard_pressure + supply_pressure;
        Ok(absolute_pressure * (fuel.molecular_weight / 1000.0)
            / (constants.universal_gas_constant * self.settings.burner.supply_temperature))
    }

    /// Run every stage for one input.
    ///
    /// # Errors
    ///
    /// The first stage error, unchanged. See the individual components.
    /// A case leaner than the chamber design λ can end with
    /// `TemperatureOrderingViolation` when its flame is cooler than the wall.
    pub fn run(&self, input: &PipelineInput) -> CalcResult<PipelineReport> {
        let fuel = self.catalog.fuel(&input.fuel_id)?;
        require_positive(input.required_power, |value| DesignError::InvalidPower { value })?;

        let fuel_flow_rate = input.required_power / fuel.lower_heating_value_mass;
        let combustion =
            CombustionModel::new(self.catalog).calculate(&input.fuel_id, fuel_flow_rate, input.excess_air_ratio)?;

        let burner = BurnerSizer::new(self.catalog)
            .with_limits(self.settings.burner)
            .design(&input.burner_input())?;

        let chamber = ChamberSizer::new(self.catalog)
            .with_limits(self.settings.chamber)
            .design(&input.chamber_input())?;

        let radiation = RadiationModel::new(self.catalog)
            .with_settings(self.settings.radiation.clone())
            .calculate_flame_radiation(&FlameRadiationInput {
                flame_temperature: combustion.adiabatic_flame_temperature,
                wall_temperature: chamber.wall_temperature,
                chamber_diameter: chamber.diameter,
                chamber_length: chamber.length,
                fuel_id: input.fuel_id.clone(),
                excess_air_ratio: input.excess_air_ratio,
                soot_concentration: input.soot_concentration,
            })?;

        let piping = match &input.piping {
            Some(layout) => {
                let gas_density = match layout.gas_density {
                    Some(density) => density,
                    None => self.line_density(&input.fuel_id, input.supply_pressure)?,
                };
                debug!("Supply line density {:.4} kg/m3", gas_density);
                let loss_input = SystemLossInput {
                    segments: layout.segments.clone(),
                    fittings: layout.fittings.clone(),
                    viscosity: layout.viscosity,
                    ..SystemLossInput::new(burner.fuel_flow_rate, gas_density)
                }
                .with_burner(&burner);
                Some(FlowNetworkSolver::with_settings(self.settings.flow).calculate_system_losses(&loss_input)?)
            }
            None => None,
        };

        let engine = ValidationEngine::new(self.settings.burner, self.settings.chamber);
        let burner_validation = engine.validate_burner(&burner);
        let chamber_validation = engine.validate_chamber(&chamber);
        let mut recommendations = engine.burner_recommendations(&burner);
        recommendations.extend(engine.chamber_recommendations(&chamber));
        if !chamber.meets_target_efficiency {
            debug!(
                "Chamber efficiency {:.3} below target {:.3}",
                chamber.thermal_efficiency, input.target_efficiency
            );
        }

        info!(
            "Design {} at {:.1} kW: burner D {:.1} mm, chamber {:.3} m3, {} recommendation(s)",
            input.fuel_id,
            input.required_power / 1000.0,
            burner.diameter * 1000.0,
            chamber.volume,
            recommendations.len()
        );

        Ok(PipelineReport {
            fuel_id: input.fuel_id.clone(),
            combustion,
            burner,
            chamber,
            radiation,
            piping,
            burner_validation,
            chamber_validation,
            recommendations,
        })
    }

    /// Run independent inputs in parallel; results keep the input order.
    pub fn run_batch(&self, inputs: &[PipelineInput]) -> Vec<CalcResult<PipelineReport>> {
        info!("Running {} design case(s)", inputs.len());
        inputs.par_iter().map(|input| self.run(input)).collect()
    }
}
