use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::spectrum::{MassWindow, Tolerance};

/// A single peak in a tandem mass spectrum, with the tolerance used to match masses against it.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct TandemMassPeak {
    /// The mass over charge of the peak
    pub mz: f64,
    /// The intensity of the peak
    pub intensity: f64,
    /// The accepted deviation around the m/z
    pub tolerance: Tolerance,
}

impl TandemMassPeak {
    /// Create a new peak
    pub const fn new(mz: f64, intensity: f64, tolerance: Tolerance) -> Self {
        Self {
            mz,
            intensity,
            tolerance,
        }
    }
}

impl MassWindow for TandemMassPeak {
    fn compare_mass(&self, mass: f64) -> Ordering {
        let deviation = self.tolerance.deviation(self.mz);
        if (mass - self.mz).abs() <= deviation {
            Ordering::Equal
        } else if mass > self.mz {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
}
