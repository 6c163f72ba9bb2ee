//! # Combustion Stoichiometry
//!
//! Mass balance, heat release, adiabatic flame temperature and flue gas
//! composition for a gaseous fuel burning with a given excess air ratio λ.
//!
//! ## Correlations
//!
//! - Air: `ṁ_air = ṁ_fuel · AFR · λ`
//! - Flue gas: `ṁ_flue = ṁ_fuel + ṁ_air`
//! - Heat release: `Q = ṁ_fuel · LHV`
//! - Flame temperature: `T_ad = T_base · (1 − 0.3·(λ − 1)) + T₀`, with
//!   `T_base = 2200 K` and `T₀` the catalog standard temperature
//! - Dry CO₂: `CO₂ = CO₂_stoich / λ` (12 % methane family, 14 % propane)
//! - O₂: `O₂ = 21 · (λ − 1) / λ`
//!
//! ## Example
//!
//! ```rust
//! use burner_core::catalog::FuelCatalog;
//! use burner_core::combustion::CombustionModel;
//!
//! let catalog = FuelCatalog::builtin().unwrap();
//! let model = CombustionModel::new(&catalog);
//! let result = model.calculate("natural_gas", 0.01, 1.2).unwrap();
//!
//! assert!(result.adiabatic_flame_temperature > 1500.0);
//! assert!(result.o2_percent > 0.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{FuelCatalog, FuelFamily};
use crate::errors::{require_positive, CalcResult, DesignError};

/// Base adiabatic flame temperature rise (K) at stoichiometric conditions
pub const BASE_FLAME_TEMPERATURE: f64 = 2200.0;

/// Fractional flame temperature drop per unit of excess air
const EXCESS_AIR_COOLING: f64 = 0.3;

/// Oxygen content of air (%)
const AIR_O2_PERCENT: f64 = 21.0;

impl FuelFamily {
    /// Dry CO₂ content of stoichiometric flue gas (%)
    pub fn stoichiometric_co2_percent(&self) -> f64 {
        match self {
            FuelFamily::Propane => 14.0,
            FuelFamily::Methane | FuelFamily::Generic => 12.0,
        }
    }
}

/// Results of a combustion calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "fuel_flow_rate": 0.002,
///   "air_flow_rate": 0.041352,
///   "flue_gas_flow_rate": 0.043352,
///   "excess_air_ratio": 1.2,
///   "adiabatic_flame_temperature": 2341.15,
///   "heat_release_rate": 100000.0,
///   "co2_percent": 10.0,
///   "o2_percent": 3.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombustionResult {
    /// Fuel mass flow (kg/s)
    pub fuel_flow_rate: f64,

    /// Combustion air mass flow (kg/s)
    pub air_flow_rate: f64,

    /// Flue gas mass flow (kg/s), exactly fuel + air
    pub flue_gas_flow_rate: f64,

    /// Excess air ratio λ
    pub excess_air_ratio: f64,

    /// Adiabatic flame temperature (K)
    pub adiabatic_flame_temperature: f64,

    /// Heat release rate (W)
    pub heat_release_rate: f64,

    /// Dry CO₂ content of the flue gas (%)
    pub co2_percent: f64,

    /// O₂ content of the flue gas (%)
    pub o2_percent: f64,
}

/// Combustion stoichiometry for fuels in a [`FuelCatalog`].
#[derive(Debug, Clone, Copy)]
pub struct CombustionModel<'a> {
    catalog: &'a FuelCatalog,
}

impl<'a> CombustionModel<'a> {
    pub fn new(catalog: &'a FuelCatalog) -> Self {
        CombustionModel { catalog }
    }

    pub fn catalog(&self) -> &'a FuelCatalog {
        self.catalog
    }

    /// Stoichiometric air mass flow (kg/s) for a fuel mass flow.
    pub fn stoichiometric_air(&self, fuel_id: &str, fuel_flow_rate: f64) -> CalcResult<f64> {
        let fuel = self.catalog.fuel(fuel_id)?;
        require_positive(fuel_flow_rate, |value| DesignError::InvalidFlowRate { value })?;
        Ok(fuel_flow_rate * fuel.air_fuel_ratio_mass)
    }

    /// Full combustion calculation.
    ///
    /// # Errors
    ///
    /// * `UnknownFuel` - fuel id not in the catalog
    /// * `InvalidFlowRate` - flow ≤ 0
    /// * `InvalidExcessAir` - λ < 1
    pub fn calculate(&self, fuel_id: &str, fuel_flow_rate: f64, excess_air_ratio: f64) -> CalcResult<CombustionResult> {
        let fuel = self.catalog.fuel(fuel_id)?;
        require_positive(fuel_flow_rate, |value| DesignError::InvalidFlowRate { value })?;
        if !(excess_air_ratio.is_finite() && excess_air_ratio >= 1.0) {
            return Err(DesignError::InvalidExcessAir {
                value: excess_air_ratio,
            });
        }

        let stoichiometric_air = fuel_flow_rate * fuel.air_fuel_ratio_mass;
        let air_flow_rate = stoichiometric_air * excess_air_ratio;
        let flue_gas_flow_rate = fuel_flow_rate + air_flow_rate;
        let heat_release_rate = fuel_flow_rate * fuel.lower_heating_value_mass;

        let cooling = 1.0 - (excess_air_ratio - 1.0) * EXCESS_AIR_COOLING;
        let adiabatic_flame_temperature =
            BASE_FLAME_TEMPERATURE * cooling + self.catalog.constants().standard_temperature;

        let co2_percent = fuel.family.stoichiometric_co2_percent() / excess_air_ratio;
        let o2_percent = (excess_air_ratio - 1.0) * AIR_O2_PERCENT / excess_air_ratio;

        debug!(
            "Combustion {}: fuel {:.5} kg/s, air {:.5} kg/s, T_ad {:.1} K",
            fuel_id, fuel_flow_rate, air_flow_rate, adiabatic_flame_temperature
        );

        Ok(CombustionResult {
            fuel_flow_rate,
            air_flow_rate,
            flue_gas_flow_rate,
            excess_air_ratio,
            adiabatic_flame_temperature,
            heat_release_rate,
            co2_percent,
            o2_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    fn catalog() -> FuelCatalog {
        FuelCatalog::builtin().unwrap()
    }

    #[test]
    fn test_natural_gas_stoichiometric_air() {
        let catalog = catalog();
        let model = CombustionModel::new(&catalog);
        let air = model.stoichiometric_air("natural_gas", 0.01).unwrap();
        assert_abs_diff_eq!(air / 0.01, 16.5, epsilon = 1.0);
    }

    #[test]
    fn test_methane_reference_values() {
        let catalog = catalog();
        let model = CombustionModel::new(&catalog);
        let r = model.calculate("methane", 0.002, 1.2).unwrap();

        assert_relative_eq!(r.air_flow_rate, 0.002 * 17.23 * 1.2, max_relative = 1e-12);
        assert_relative_eq!(r.heat_release_rate, 100_000.0, max_relative = 1e-12);
        // 2200 * (1 - 0.06) + 273.15
        assert_relative_eq!(r.adiabatic_flame_temperature, 2341.15, max_relative = 1e-12);
        assert_relative_eq!(r.co2_percent, 10.0, max_relative = 1e-12);
        assert_relative_eq!(r.o2_percent, 3.5, max_relative = 1e-12);
    }

    #[test]
    fn test_stoichiometric_has_no_oxygen() {
        let catalog = catalog();
        let r = CombustionModel::new(&catalog).calculate("propane", 0.01, 1.0).unwrap();
        assert_eq!(r.o2_percent, 0.0);
        assert_relative_eq!(r.co2_percent, 14.0);
    }

    #[test]
    fn test_rejects_substoichiometric_air() {
        let catalog = catalog();
        let err = CombustionModel::new(&catalog).calculate("methane", 0.01, 0.8).unwrap_err();
        assert_eq!(err, DesignError::InvalidExcessAir { value: 0.8 });
    }

    #[test]
    fn test_rejects_non_positive_flow() {
        let catalog = catalog();
        let model = CombustionModel::new(&catalog);
        assert!(matches!(
            model.calculate("methane", 0.0, 1.2),
            Err(DesignError::InvalidFlowRate { .. })
        ));
        assert!(matches!(
            model.calculate("methane", -1.0, 1.2),
            Err(DesignError::InvalidFlowRate { .. })
        ));
    }

    #[test]
    fn test_unknown_fuel_checked_first() {
        let catalog = catalog();
        let err = CombustionModel::new(&catalog).calculate("kerosene", -1.0, 0.5).unwrap_err();
        assert_eq!(err, DesignError::unknown_fuel("kerosene"));
    }

    #[test]
    fn test_result_serialization() {
        let catalog = catalog();
        let r = CombustionModel::new(&catalog).calculate("methane", 0.002, 1.2).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        let roundtrip: CombustionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(r, roundtrip);
    }

    proptest! {
        #[test]
        fn prop_mass_balance_is_exact(flow in 1e-5f64..10.0, lambda in 1.0f64..3.0) {
            let catalog = catalog();
            let r = CombustionModel::new(&catalog).calculate("natural_gas", flow, lambda).unwrap();
            prop_assert_eq!(r.flue_gas_flow_rate, r.fuel_flow_rate + r.air_flow_rate);
        }

        #[test]
        fn prop_flame_cools_with_excess_air(lambda in 1.0f64..2.5, step in 0.01f64..0.5) {
            let catalog = catalog();
            let model = CombustionModel::new(&catalog);
            let lean = model.calculate("methane", 0.01, lambda + step).unwrap();
            let rich = model.calculate("methane", 0.01, lambda).unwrap();
            prop_assert!(lean.adiabatic_flame_temperature < rich.adiabatic_flame_temperature);
            prop_assert!(lean.o2_percent > rich.o2_percent);
            prop_assert!(lean.co2_percent < rich.co2_percent);
        }

        #[test]
        fn prop_air_flow_non_decreasing_in_excess_air(
            flow in 1e-5f64..10.0,
            lambda in 1.0f64..3.0,
            step in 0.0f64..1.0,
        ) {
            let catalog = catalog();
            let model = CombustionModel::new(&catalog);
            let rich = model.calculate("propane", flow, lambda).unwrap();
            let lean = model.calculate("propane", flow, lambda + step).unwrap();
            prop_assert!(lean.air_flow_rate >= rich.air_flow_rate);
            prop_assert!(lean.flue_gas_flow_rate >= rich.flue_gas_flow_rate);
            prop_assert!(rich.air_flow_rate >= model.stoichiometric_air("propane", flow).unwrap());
        }
    }
}
