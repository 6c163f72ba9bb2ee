//! # Fuel Catalog
//!
//! Read-only table of fuel properties, physical constants and surface
//! emissivities. A catalog is built once at startup and then passed by
//! reference into every design component, so all stages see the same data.
//!
//! The built-in catalog is embedded from `data/fuels.json`. A replacement can
//! be parsed from any JSON string with the same layout, or loaded from disk
//! with [`crate::file_io::load_catalog`].
//!
//! ## JSON Layout
//!
//! ```json
//! {
//!   "fuels": {
//!     "methane": {
//!       "name": "Methane",
//!       "family": "methane",
//!       "properties": {
//!         "lower_heating_value_mass": 50000000.0,
//!         "air_fuel_ratio_mass": 17.23,
//!         "molecular_weight": 16.04,
//!         "density": 0.717
//!       }
//!     }
//!   },
//!   "constants": {
//!     "universal_gas_constant": 8.314,
//!     "standard_pressure": 101325.0,
//!     "standard_temperature": 273.15,
//!     "stefan_boltzmann_constant": 5.67e-8,
//!     "air_molecular_weight": 28.97
//!   },
//!   "material_properties": {
//!     "refractory_brick": { "emissivity": 0.75 }
//!   }
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use burner_core::catalog::{FuelCatalog, FuelFamily};
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let methane = catalog.fuel("methane").unwrap();
//! assert_eq!(methane.family, FuelFamily::Methane);
//! assert!(catalog.fuel("hydrogen").is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcResult, DesignError};

/// Embedded default catalog
const BUILTIN_CATALOG: &str = include_str!("../data/fuels.json");

/// Emissivity used when a material is not listed in the catalog
pub const DEFAULT_EMISSIVITY: f64 = 0.8;

/// Fuel family, which selects the empirical coefficients used by the
/// combustion, burner and radiation correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelFamily {
    /// Methane and natural gas
    Methane,
    /// Propane and LPG
    Propane,
    /// Anything else; falls back to generic coefficients
    Generic,
}

impl FuelFamily {
    pub const ALL: [FuelFamily; 3] = [FuelFamily::Methane, FuelFamily::Propane, FuelFamily::Generic];

    /// Infer the family from a catalog id when the entry does not name one.
    pub fn from_fuel_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "natural_gas" | "methane" | "cng" => FuelFamily::Methane,
            "propane" | "lpg" => FuelFamily::Propane,
            _ => FuelFamily::Generic,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FuelFamily::Methane => "Methane / natural gas",
            FuelFamily::Propane => "Propane",
            FuelFamily::Generic => "Generic gas",
        }
    }
}

impl fmt::Display for FuelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Properties of one fuel, in SI units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelProperties {
    /// Catalog key, e.g. "natural_gas"
    pub id: String,

    /// Human-readable name
    pub name: String,

    pub family: FuelFamily,

    /// Lower heating value (J/kg)
    pub lower_heating_value_mass: f64,

    /// Stoichiometric air-to-fuel mass ratio
    pub air_fuel_ratio_mass: f64,

    /// Molecular weight (g/mol)
    pub molecular_weight: f64,

    /// Density at standard conditions (kg/m³)
    pub density: f64,
}

/// Physical constants shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// J/(mol·K)
    pub universal_gas_constant: f64,
    /// Pa
    pub standard_pressure: f64,
    /// K
    pub standard_temperature: f64,
    /// W/(m²·K⁴)
    pub stefan_boltzmann_constant: f64,
    /// g/mol
    pub air_molecular_weight: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            universal_gas_constant: 8.314,
            standard_pressure: 101_325.0,
            standard_temperature: 273.15,
            stefan_boltzmann_constant: 5.67e-8,
            air_molecular_weight: 28.97,
        }
    }
}

/// Radiative properties of a surface material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub emissivity: f64,

    /// Informational validity range in °C
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_range: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    fuels: BTreeMap<String, FuelEntry>,
    constants: PhysicalConstants,
    #[serde(default)]
    material_properties: BTreeMap<String, MaterialProperties>,
}

#[derive(Debug, Deserialize)]
struct FuelEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    family: Option<FuelFamily>,
    properties: FuelPropertyValues,
}

#[derive(Debug, Deserialize)]
struct FuelPropertyValues {
    lower_heating_value_mass: f64,
    air_fuel_ratio_mass: f64,
    molecular_weight: f64,
    density: f64,
}

/// Immutable fuel, constant and material lookup table.
#[derive(Debug, Clone)]
pub struct FuelCatalog {
    fuels: BTreeMap<String, FuelProperties>,
    constants: PhysicalConstants,
    materials: BTreeMap<String, MaterialProperties>,
}

impl FuelCatalog {
    /// Parse the catalog embedded in the crate.
    pub fn builtin() -> CalcResult<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog from JSON text and check that every value is usable.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| DesignError::SerializationError {
            reason: format!("Invalid fuel catalog: {}", e),
        })?;

        if file.fuels.is_empty() {
            return Err(DesignError::catalog("catalog defines no fuels"));
        }

        let mut fuels = BTreeMap::new();
        for (id, entry) in file.fuels {
            let p = entry.properties;
            for (field, value) in [
                ("lower_heating_value_mass", p.lower_heating_value_mass),
                ("air_fuel_ratio_mass", p.air_fuel_ratio_mass),
                ("molecular_weight", p.molecular_weight),
                ("density", p.density),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(DesignError::catalog(format!(
                        "fuel '{}' has non-positive {} ({})",
                        id, field, value
                    )));
                }
            }
            let props = FuelProperties {
                name: entry.name.unwrap_or_else(|| id.clone()),
                family: entry.family.unwrap_or_else(|| FuelFamily::from_fuel_id(&id)),
                lower_heating_value_mass: p.lower_heating_value_mass,
                air_fuel_ratio_mass: p.air_fuel_ratio_mass,
                molecular_weight: p.molecular_weight,
                density: p.density,
                id: id.clone(),
            };
            fuels.insert(id, props);
        }

        let c = &file.constants;
        for (field, value) in [
            ("universal_gas_constant", c.universal_gas_constant),
            ("standard_pressure", c.standard_pressure),
            ("standard_temperature", c.standard_temperature),
            ("stefan_boltzmann_constant", c.stefan_boltzmann_constant),
            ("air_molecular_weight", c.air_molecular_weight),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DesignError::catalog(format!("constant {} must be positive ({})", field, value)));
            }
        }

        for (name, material) in &file.material_properties {
            if !(material.emissivity > 0.0 && material.emissivity <= 1.0) {
                return Err(DesignError::catalog(format!(
                    "material '{}' emissivity {} outside (0, 1]",
                    name, material.emissivity
                )));
            }
        }

        debug!("Loaded fuel catalog with {} fuels", fuels.len());

        Ok(FuelCatalog {
            fuels,
            constants: file.constants,
            materials: file.material_properties,
        })
    }

    /// Look up a fuel by id.
    pub fn fuel(&self, id: &str) -> CalcResult<&FuelProperties> {
        self.fuels.get(id).ok_or_else(|| DesignError::unknown_fuel(id))
    }

    /// All fuel ids, sorted.
    pub fn fuel_ids(&self) -> impl Iterator<Item = &str> {
        self.fuels.keys().map(String::as_str)
    }

    pub fn fuels(&self) -> impl Iterator<Item = &FuelProperties> {
        self.fuels.values()
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Emissivity of a named surface material, or [`DEFAULT_EMISSIVITY`].
    pub fn material_emissivity(&self, name: &str) -> f64 {
        self.materials
            .get(name)
            .map(|m| m.emissivity)
            .unwrap_or(DEFAULT_EMISSIVITY)
    }

    pub fn material(&self, name: &str) -> Option<&MaterialProperties> {
        self.materials.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_catalog_fuels() {
        let catalog = FuelCatalog::builtin().unwrap();
        let ids: Vec<_> = catalog.fuel_ids().collect();
        assert_eq!(ids, vec!["methane", "natural_gas", "propane"]);

        let methane = catalog.fuel("methane").unwrap();
        assert_relative_eq!(methane.lower_heating_value_mass, 50.0e6);
        assert_relative_eq!(methane.air_fuel_ratio_mass, 17.23);
        assert_relative_eq!(methane.molecular_weight, 16.04);
        assert_relative_eq!(methane.density, 0.717);

        assert_eq!(catalog.fuel("propane").unwrap().family, FuelFamily::Propane);
        assert_eq!(catalog.fuel("natural_gas").unwrap().family, FuelFamily::Methane);
    }

    #[test]
    fn test_builtin_constants() {
        let catalog = FuelCatalog::builtin().unwrap();
        assert_eq!(*catalog.constants(), PhysicalConstants::default());
    }

    #[test]
    fn test_unknown_fuel() {
        let catalog = FuelCatalog::builtin().unwrap();
        let err = catalog.fuel("unicorn_gas").unwrap_err();
        assert_eq!(err, DesignError::unknown_fuel("unicorn_gas"));
    }

    #[test]
    fn test_material_emissivity_fallback() {
        let catalog = FuelCatalog::builtin().unwrap();
        assert_relative_eq!(catalog.material_emissivity("refractory_brick"), 0.75);
        assert_relative_eq!(catalog.material_emissivity("steel_oxidized"), 0.79);
        assert_relative_eq!(catalog.material_emissivity("unobtainium"), DEFAULT_EMISSIVITY);
    }

    #[test]
    fn test_family_inferred_from_id() {
        let json = r#"{
            "fuels": {
                "propane": {
                    "properties": {
                        "lower_heating_value_mass": 46.35e6,
                        "air_fuel_ratio_mass": 15.5,
                        "molecular_weight": 44.1,
                        "density": 2.01
                    }
                },
                "biogas": {
                    "properties": {
                        "lower_heating_value_mass": 20.0e6,
                        "air_fuel_ratio_mass": 6.0,
                        "molecular_weight": 27.0,
                        "density": 1.2
                    }
                }
            },
            "constants": {
                "universal_gas_constant": 8.314,
                "standard_pressure": 101325.0,
                "standard_temperature": 273.15,
                "stefan_boltzmann_constant": 5.67e-8,
                "air_molecular_weight": 28.97
            }
        }"#;
        let catalog = FuelCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.fuel("propane").unwrap().family, FuelFamily::Propane);
        assert_eq!(catalog.fuel("biogas").unwrap().family, FuelFamily::Generic);
        assert_eq!(catalog.fuel("biogas").unwrap().name, "biogas");
    }

    #[test]
    fn test_rejects_non_positive_property() {
        let json = r#"{
            "fuels": {
                "bad": {
                    "properties": {
                        "lower_heating_value_mass": 0.0,
                        "air_fuel_ratio_mass": 15.5,
                        "molecular_weight": 44.1,
                        "density": 2.01
                    }
                }
            },
            "constants": {
                "universal_gas_constant": 8.314,
                "standard_pressure": 101325.0,
                "standard_temperature": 273.15,
                "stefan_boltzmann_constant": 5.67e-8,
                "air_molecular_weight": 28.97
            }
        }"#;
        let err = FuelCatalog::from_json_str(json).unwrap_err();
        assert_eq!(err.error_code(), "CATALOG_ERROR");
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = FuelCatalog::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_family_serialization() {
        let json = serde_json::to_string(&FuelFamily::Propane).unwrap();
        assert_eq!(json, "\"propane\"");
    }
}
