//! # Radiative Heat Transfer
//!
//! Gray-gas radiation from a luminous or non-luminous flame to the chamber
//! wall, and from the outer shell to the surroundings.
//!
//! ## Model
//!
//! - Mean beam length `L_mb = 3.6 · V / A` of the whole enclosure
//! - Gas emissivity per species `ε = 1 − exp(−k·p·L_mb)` with
//!   `k_CO₂ = 0.2`, `k_H₂O = 0.1` and an overlap correction
//!   `ε_g = ε_CO₂ + ε_H₂O − 0.15·ε_CO₂·ε_H₂O`
//! - Soot `ε_s = 1 − exp(−1200·c·L_mb)`, combined as `1 − (1−ε_g)(1−ε_s)`
//! - Temperature correction `(T/1000)^0.2`, capped at 0.95
//! - Cylinder view factor from 0.7 (short) to 0.9 (long)
//! - Flame treated as a surface of area `V^(2/3)`
//!
//! ## Example
//!
//! ```rust
//! use burner_core::catalog::FuelCatalog;
//! use burner_core::radiation::{FlameRadiationInput, RadiationModel};
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let model = RadiationModel::new(&catalog);
//! let result = model
//!     .calculate_flame_radiation(&FlameRadiationInput {
//!         flame_temperature: 2300.0,
//!         wall_temperature: 1200.0,
//!         chamber_diameter: 0.5,
//!         chamber_length: 1.5,
//!         fuel_id: "natural_gas".to_string(),
//!         excess_air_ratio: 1.2,
//!         soot_concentration: 0.0,
//!     })
//!     .unwrap();
//!
//! assert!(result.flame_to_wall > 0.0);
//! assert!(result.flame_emissivity > 0.0 && result.flame_emissivity < 1.0);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{FuelCatalog, FuelFamily};
use crate::errors::{CalcResult, DesignError};

/// Configurable radiation model constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiationSettings {
    /// Catalog material of the inner chamber wall
    pub wall_material: String,

    /// Surroundings temperature (K)
    pub ambient_temperature: f64,

    /// Shell thickness added to the chamber diameter for the outer surface (m)
    pub outer_wall_thickness: f64,

    pub beam_length_coefficient: f64,

    /// Absorption coefficients (1/(m·atm))
    pub co2_absorption: f64,
    pub h2o_absorption: f64,

    /// Soot absorption coefficient (m²/kg)
    pub soot_absorption: f64,

    /// CO₂/H₂O band overlap correction
    pub band_overlap: f64,

    pub max_flame_emissivity: f64,
}

impl Default for RadiationSettings {
    fn default() -> Self {
        RadiationSettings {
            wall_material: "refractory_brick".to_string(),
            ambient_temperature: 293.15,
            outer_wall_thickness: 0.1,
            beam_length_coefficient: 3.6,
            co2_absorption: 0.2,
            h2o_absorption: 0.1,
            soot_absorption: 1200.0,
            band_overlap: 0.15,
            max_flame_emissivity: 0.95,
        }
    }
}

impl FuelFamily {
    /// Stoichiometric (CO₂, H₂O) mole fractions of the flue gas
    pub fn flue_gas_fractions(&self) -> (f64, f64) {
        match self {
            FuelFamily::Propane => (0.14, 0.16),
            FuelFamily::Methane | FuelFamily::Generic => (0.12, 0.18),
        }
    }
}

/// Flame and enclosure description.
///
/// ## JSON Example
///
/// ```json
/// {
///   "flame_temperature": 2341.15,
///   "wall_temperature": 1958.0,
///   "chamber_diameter": 0.45,
///   "chamber_length": 1.35,
///   "fuel_id": "methane",
///   "excess_air_ratio": 1.2,
///   "soot_concentration": 0.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameRadiationInput {
    /// K
    pub flame_temperature: f64,
    /// K
    pub wall_temperature: f64,
    /// m
    pub chamber_diameter: f64,
    /// m
    pub chamber_length: f64,
    pub fuel_id: String,
    pub excess_air_ratio: f64,
    /// kg/m³
    #[serde(default)]
    pub soot_concentration: f64,
}

impl FlameRadiationInput {
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.chamber_diameter.is_finite() && self.chamber_diameter > 0.0) {
            return Err(DesignError::invalid_geometry("chamber_diameter", self.chamber_diameter));
        }
        if !(self.chamber_length.is_finite() && self.chamber_length > 0.0) {
            return Err(DesignError::invalid_geometry("chamber_length", self.chamber_length));
        }
        if !(self.flame_temperature > self.wall_temperature) {
            return Err(DesignError::TemperatureOrderingViolation {
                flame_temperature: self.flame_temperature,
                wall_temperature: self.wall_temperature,
            });
        }
        if !(self.wall_temperature > 0.0) {
            return Err(DesignError::invalid_input(
                "wall_temperature",
                self.wall_temperature.to_string(),
                "Temperature must be positive (K)",
            ));
        }
        if !(self.excess_air_ratio.is_finite() && self.excess_air_ratio >= 1.0) {
            return Err(DesignError::InvalidExcessAir {
                value: self.excess_air_ratio,
            });
        }
        if !(self.soot_concentration.is_finite() && self.soot_concentration >= 0.0) {
            return Err(DesignError::invalid_input(
                "soot_concentration",
                self.soot_concentration.to_string(),
                "Soot concentration cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Radiation heat transfer results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiationResult {
    /// W
    pub total_heat_transfer: f64,
    /// W
    pub flame_to_wall: f64,
    /// W
    pub wall_to_ambient: f64,
    pub flame_emissivity: f64,
    /// Equal to the emissivity for a gray flame
    pub flame_absorptivity: f64,
    pub wall_emissivity: f64,
    pub view_factor: f64,
    /// Flame-to-wall transfer relative to black-body exchange over the wall (%)
    pub radiation_efficiency: f64,
    /// m
    pub mean_beam_length: f64,
}

/// Gray surface taking part in an enclosure exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// m²
    pub area: f64,
    /// K
    pub temperature: f64,
    pub emissivity: f64,
}

/// Net exchange from surface `from` to surface `to` (W, positive when `from` is hotter).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceExchange {
    pub from: usize,
    pub to: usize,
    pub heat_transfer: f64,
}

/// Radiation calculations with catalog constants and materials.
#[derive(Debug, Clone)]
pub struct RadiationModel<'a> {
    catalog: &'a FuelCatalog,
    settings: RadiationSettings,
}

impl<'a> RadiationModel<'a> {
    pub fn new(catalog: &'a FuelCatalog) -> Self {
        RadiationModel {
            catalog,
            settings: RadiationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RadiationSettings) -> Self {
        self.settings = settings;
        self
    }

    fn sigma(&self) -> f64 {
        self.catalog.constants().stefan_boltzmann_constant
    }

    /// Emissivity of a catalog material, 0.8 when unknown.
    pub fn material_emissivity(&self, name: &str) -> f64 {
        self.catalog.material_emissivity(name)
    }

    /// Flame to wall and wall to ambient radiation for a cylindrical chamber.
    ///
    /// # Errors
    ///
    /// * `InvalidGeometry` - diameter or length ≤ 0
    /// * `TemperatureOrderingViolation` - flame not hotter than the wall
    /// * `UnknownFuel`, `InvalidExcessAir`, `InvalidInput` (negative soot)
    pub fn calculate_flame_radiation(&self, input: &FlameRadiationInput) -> CalcResult<RadiationResult> {
        input.validate()?;
        let fuel = self.catalog.fuel(&input.fuel_id)?;
        let s = &self.settings;
        let sigma = self.sigma();

        let d = input.chamber_diameter;
        let l = input.chamber_length;
        let mean_beam_length = self.mean_beam_length(d, l);

        let flame_emissivity = self.flame_emissivity(
            fuel.family,
            input.excess_air_ratio,
            mean_beam_length,
            input.flame_temperature,
            input.soot_concentration,
        );
        let wall_emissivity = self.material_emissivity(&s.wall_material);
        let view_factor = cylinder_view_factor(d, l);

        let flame_volume = PI * (d / 2.0).powi(2) * l;
        let wall_area = PI * d * l;
        let t_f4 = input.flame_temperature.powi(4);
        let t_w4 = input.wall_temperature.powi(4);

        let flame_area = flame_volume.powf(2.0 / 3.0);
        let effective_emissivity =
            1.0 / (1.0 / flame_emissivity + wall_area / (flame_area * wall_emissivity) - 1.0);
        let flame_to_wall = (sigma * flame_area * view_factor * effective_emissivity * (t_f4 - t_w4)).max(0.0);

        let outer_diameter = d + 2.0 * s.outer_wall_thickness;
        let outer_area = PI * outer_diameter * l + 2.0 * PI * (outer_diameter / 2.0).powi(2);
        let wall_to_ambient =
            (sigma * outer_area * wall_emissivity * (t_w4 - s.ambient_temperature.powi(4))).max(0.0);

        let black_body = sigma * wall_area * (t_f4 - t_w4);
        let radiation_efficiency = flame_to_wall / black_body * 100.0;

        debug!(
            "Radiation: eps_f {:.4}, eps_w {:.2}, F {:.3}, Q {:.1} W",
            flame_emissivity, wall_emissivity, view_factor, flame_to_wall
        );

        Ok(RadiationResult {
            total_heat_transfer: flame_to_wall,
            flame_to_wall,
            wall_to_ambient,
            flame_emissivity,
            flame_absorptivity: flame_emissivity,
            wall_emissivity,
            view_factor,
            radiation_efficiency,
            mean_beam_length,
        })
    }

    /// Mean beam length of a closed cylinder (m).
    pub fn mean_beam_length(&self, diameter: f64, length: f64) -> f64 {
        let volume = PI * (diameter / 2.0).powi(2) * length;
        let surface = PI * diameter * length + 2.0 * PI * (diameter / 2.0).powi(2);
        self.settings.beam_length_coefficient * volume / surface
    }

    /// Total flame emissivity including soot and temperature correction.
    pub fn flame_emissivity(
        &self,
        family: FuelFamily,
        excess_air_ratio: f64,
        beam_length: f64,
        temperature: f64,
        soot_concentration: f64,
    ) -> f64 {
        let s = &self.settings;
        let (co2, h2o) = family.flue_gas_fractions();
        // Partial pressures in atm at 1 atm total
        let p_co2 = co2 / excess_air_ratio;
        let p_h2o = h2o / excess_air_ratio;

        let eps_co2 = 1.0 - (-s.co2_absorption * p_co2 * beam_length).exp();
        let eps_h2o = 1.0 - (-s.h2o_absorption * p_h2o * beam_length).exp();
        let mut emissivity = eps_co2 + eps_h2o - s.band_overlap * eps_co2 * eps_h2o;

        if soot_concentration > 0.0 {
            let eps_soot = 1.0 - (-s.soot_absorption * soot_concentration * beam_length).exp();
            emissivity = 1.0 - (1.0 - emissivity) * (1.0 - eps_soot);
        }

        let correction = (temperature / 1000.0).powf(0.2);
        (emissivity * correction).min(s.max_flame_emissivity)
    }

    /// Pairwise two-surface gray exchange between every pair `i < j` with a
    /// positive view factor.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - matrix not square or not matching the surface count,
    ///   or a surface with non-positive area or emissivity outside (0, 1]
    pub fn exchange_network(&self, surfaces: &[Surface], view_factors: &[Vec<f64>]) -> CalcResult<Vec<SurfaceExchange>> {
        let n = surfaces.len();
        if view_factors.len() != n || view_factors.iter().any(|row| row.len() != n) {
            return Err(DesignError::invalid_input(
                "view_factors",
                format!("{} rows for {} surfaces", view_factors.len(), n),
                "View factor matrix must be square and match the surface count",
            ));
        }
        for (i, surface) in surfaces.iter().enumerate() {
            if !(surface.area > 0.0) {
                return Err(DesignError::invalid_geometry(format!("surfaces[{}].area", i), surface.area));
            }
            if !(surface.emissivity > 0.0 && surface.emissivity <= 1.0) {
                return Err(DesignError::invalid_input(
                    format!("surfaces[{}].emissivity", i),
                    surface.emissivity.to_string(),
                    "Emissivity must be in (0, 1]",
                ));
            }
        }

        let sigma = self.sigma();
        let mut exchanges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let f_ij = view_factors[i][j];
                if f_ij <= 0.0 {
                    continue;
                }
                let (a, b) = (&surfaces[i], &surfaces[j]);
                let effective = 1.0 / (1.0 / a.emissivity + (a.area / b.area) * (1.0 / b.emissivity - 1.0));
                exchanges.push(SurfaceExchange {
                    from: i,
                    to: j,
                    heat_transfer: sigma
                        * a.area
                        * f_ij
                        * effective
                        * (a.temperature.powi(4) - b.temperature.powi(4)),
                });
            }
        }
        Ok(exchanges)
    }
}

/// Flame-to-wall view factor for a cylinder, by aspect ratio L/D.
pub fn cylinder_view_factor(diameter: f64, length: f64) -> f64 {
    let aspect_ratio = length / diameter;
    if aspect_ratio < 0.5 {
        0.7
    } else if aspect_ratio > 5.0 {
        0.9
    } else {
        0.7 + 0.2 * (aspect_ratio - 0.5) / 4.5
    }
}
