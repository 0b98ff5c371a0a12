use std::{cmp::Ordering, ops::RangeInclusive};

use serde::{Deserialize, Serialize};

use crate::parse_json::{ParseJson, use_serde};

/// Anything that accepts a window of masses.
///
/// Comparing gives [`Ordering::Equal`] if the mass falls within the window,
/// [`Ordering::Greater`] if the mass is above the window, and [`Ordering::Less`] if the mass is
/// below the window.
pub trait MassWindow {
    /// Compare the given mass to this window
    fn compare_mass(&self, mass: f64) -> Ordering;
}

impl MassWindow for RangeInclusive<f64> {
    fn compare_mass(&self, mass: f64) -> Ordering {
        if mass > *self.end() {
            Ordering::Greater
        } else if mass < *self.start() {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

impl<T: MassWindow + ?Sized> MassWindow for &T {
    fn compare_mass(&self, mass: f64) -> Ordering {
        (**self).compare_mass(mass)
    }
}

/// A mass tolerance, a relative part in ppm and an absolute part in Dalton that are added.
/// A mass matches an m/z if `|mass - mz| <= absolute + ppm * 1e-6 * mz`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Tolerance {
    /// The relative tolerance in parts per million
    pub ppm: f64,
    /// The absolute tolerance in Dalton
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(5.0, 0.001)
    }
}

impl Tolerance {
    /// Create a new tolerance from a ppm and absolute part
    pub const fn new(ppm: f64, absolute: f64) -> Self {
        Self { ppm, absolute }
    }

    /// Create a purely relative tolerance
    pub const fn new_ppm(ppm: f64) -> Self {
        Self::new(ppm, 0.0)
    }

    /// Create a purely absolute tolerance
    pub const fn new_absolute(absolute: f64) -> Self {
        Self::new(0.0, absolute)
    }

    /// The maximal allowed deviation from the given m/z
    pub fn deviation(self, mz: f64) -> f64 {
        self.ppm.mul_add(1e-6 * mz, self.absolute)
    }

    /// The lowest and highest mass that are still accepted around the given m/z
    pub fn bounds(self, mz: f64) -> RangeInclusive<f64> {
        let deviation = self.deviation(mz);
        (mz - deviation)..=(mz + deviation)
    }

    /// Check if this tolerance does not contain negative or non finite values
    pub fn is_valid(self) -> bool {
        self.ppm.is_finite() && self.absolute.is_finite() && self.ppm >= 0.0 && self.absolute >= 0.0
    }
}

impl ParseJson for Tolerance {
    fn from_json_value(
        value: serde_json::Value,
    ) -> Result<Self, context_error::BoxedError<'static, context_error::BasicKind>> {
        use_serde(value)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use std::cmp::Ordering;

    use crate::{
        parse_json::ParseJson,
        spectrum::{MassWindow, Tolerance},
    };

    #[test]
    fn range_window() {
        let window = 99.99..=100.01;
        assert_eq!(window.compare_mass(100.0), Ordering::Equal);
        assert_eq!(window.compare_mass(99.99), Ordering::Equal);
        assert_eq!(window.compare_mass(100.02), Ordering::Greater);
        assert_eq!(window.compare_mass(99.0), Ordering::Less);
    }

    #[test]
    fn deviation() {
        let tolerance = Tolerance::new(10.0, 0.01);
        assert!((tolerance.deviation(1000.0) - 0.02).abs() < 1e-12);
        assert!((Tolerance::new_ppm(10.0).deviation(500.0) - 0.005).abs() < 1e-12);
        assert!((Tolerance::new_absolute(0.1).deviation(500.0) - 0.1).abs() < 1e-12);
        let bounds = tolerance.bounds(1000.0);
        assert!((bounds.start() - 999.98).abs() < 1e-9);
        assert!((bounds.end() - 1000.02).abs() < 1e-9);
        assert!(Tolerance::default().is_valid());
        assert!(!Tolerance::new(-1.0, 0.0).is_valid());
    }

    #[test]
    fn json() {
        let tolerance = Tolerance::from_json(r#"{"ppm": 10.0, "absolute": 0.002}"#).unwrap();
        assert_eq!(tolerance, Tolerance::new(10.0, 0.002));
        assert_eq!(
            Tolerance::from_json(r#"{"ppm": 2.0}"#).unwrap(),
            Tolerance::new(2.0, 0.001)
        );
        assert!(Tolerance::from_json(r#"{"ppm": "ten"}"#).is_err());
    }
}
