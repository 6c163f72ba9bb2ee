//! # Unit Types
//!
//! Newtype wrappers for the units people type and read. The design engine
//! itself works in plain SI `f64` (K, W, Pa, m); these types only exist at the
//! edges, where a user enters kilowatts or millibar and expects millimetres
//! back.
//!
//! All wrappers serialize as bare numbers.
//!
//! ## Example
//!
//! ```rust
//! use burner_core::units::{Celsius, Kelvin, Kilowatts, Watts};
//!
//! let power: Watts = Kilowatts(100.0).into();
//! assert_eq!(power.0, 100_000.0);
//!
//! let wall: Celsius = Kelvin(1273.15).into();
//! assert!((wall.0 - 1000.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// 0 °C in kelvin
const ZERO_CELSIUS: f64 = 273.15;

// ============================================================================
// Temperature
// ============================================================================

/// Absolute temperature in kelvin
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kelvin(pub f64);

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(pub f64);

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Self {
        Kelvin(c.0 + ZERO_CELSIUS)
    }
}

impl From<Kelvin> for Celsius {
    fn from(k: Kelvin) -> Self {
        Celsius(k.0 - ZERO_CELSIUS)
    }
}

// ============================================================================
// Power
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilowatts(pub f64);

impl From<Kilowatts> for Watts {
    fn from(kw: Kilowatts) -> Self {
        Watts(kw.0 * 1000.0)
    }
}

impl From<Watts> for Kilowatts {
    fn from(w: Watts) -> Self {
        Kilowatts(w.0 / 1000.0)
    }
}

// ============================================================================
// Pressure
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pascals(pub f64);

/// Gas supply pressures are usually quoted in mbar (1 mbar = 100 Pa)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millibar(pub f64);

impl From<Millibar> for Pascals {
    fn from(mbar: Millibar) -> Self {
        Pascals(mbar.0 * 100.0)
    }
}

impl From<Pascals> for Millibar {
    fn from(pa: Pascals) -> Self {
        Millibar(pa.0 / 100.0)
    }
}

// ============================================================================
// Length
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            pub fn value(self) -> f64 {
                self.0
            }

            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Watts);
impl_arithmetic!(Kilowatts);
impl_arithmetic!(Pascals);
impl_arithmetic!(Millibar);
impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);

// Temperature differences are the same in both scales; only Kelvin adds.
impl Sub for Kelvin {
    type Output = f64;
    fn sub(self, rhs: Self) -> f64 {
        self.0 - rhs.0
    }
}

impl Kelvin {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Celsius {
    pub fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_temperature_conversion() {
        let k: Kelvin = Celsius(20.0).into();
        assert_abs_diff_eq!(k.0, 293.15, epsilon = 1e-12);
        let c: Celsius = Kelvin(1873.15).into();
        assert_abs_diff_eq!(c.0, 1600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(Kelvin(1900.0) - Kelvin(1800.0), 100.0);
    }

    #[test]
    fn test_power_and_pressure() {
        let w: Watts = Kilowatts(2.5).into();
        assert_eq!(w.0, 2500.0);
        let pa: Pascals = Millibar(30.0).into();
        assert_eq!(pa.0, 3000.0);
        let mbar: Millibar = Pascals(20.0).into();
        assert_eq!(mbar.0, 0.2);
    }

    #[test]
    fn test_length() {
        let mm: Millimeters = Meters(0.4506).into();
        assert_abs_diff_eq!(mm.0, 450.6, epsilon = 1e-9);
        let m: Meters = Millimeters(25.0).into();
        assert_eq!(m.0, 0.025);
    }

    #[test]
    fn test_arithmetic() {
        let a = Kilowatts(10.0);
        let b = Kilowatts(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let p = Millibar(20.5);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "20.5");
        let roundtrip: Millibar = serde_json::from_str(&json).unwrap();
        assert_eq!(p, roundtrip);
    }
}
