use std::{fmt::Display, str::FromStr};

use context_error::*;
use serde::{Deserialize, Serialize};

/// The monoisotopic mass of hydrogen (¹H), used for hydrogen shifts
pub const HYDROGEN_MASS: f64 = 1.00782503223;

/// The elements that can occur in a precursor molecule
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Element {
    /// Hydrogen
    H,
    /// Boron
    B,
    /// Carbon
    C,
    /// Nitrogen
    N,
    /// Oxygen
    O,
    /// Fluorine
    F,
    /// Sodium
    Na,
    /// Silicon
    Si,
    /// Phosphorus
    P,
    /// Sulfur
    S,
    /// Chlorine
    Cl,
    /// Potassium
    K,
    /// Arsenic
    As,
    /// Selenium
    Se,
    /// Bromine
    Br,
    /// Iodine
    I,
}

impl Element {
    /// All supported elements
    pub const ALL: &'static [Self] = &[
        Self::H,
        Self::B,
        Self::C,
        Self::N,
        Self::O,
        Self::F,
        Self::Na,
        Self::Si,
        Self::P,
        Self::S,
        Self::Cl,
        Self::K,
        Self::As,
        Self::Se,
        Self::Br,
        Self::I,
    ];

    /// The mass of the most abundant isotope of this element
    pub const fn monoisotopic_mass(self) -> f64 {
        match self {
            Self::H => HYDROGEN_MASS,
            Self::B => 11.00930536,
            Self::C => 12.0,
            Self::N => 14.00307400443,
            Self::O => 15.99491461957,
            Self::F => 18.99840316273,
            Self::Na => 22.9897692820,
            Self::Si => 27.97692653465,
            Self::P => 30.97376199842,
            Self::S => 31.9720711744,
            Self::Cl => 34.968852682,
            Self::K => 38.963706679,
            Self::As => 74.9215965,
            Self::Se => 79.9165218,
            Self::Br => 78.9183376,
            Self::I => 126.904473,
        }
    }

    /// The element symbol
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Na => "Na",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::K => "K",
            Self::As => "As",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::I => "I",
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = BoxedError<'static, BasicKind>;

    /// Parse an element symbol, the capitalisation has to be exact (`Cl` not `CL`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|e| e.symbol() == s)
            .copied()
            .ok_or_else(|| {
                BoxedError::new(
                    BasicKind::Error,
                    "Unknown element",
                    "This element is not known, only elements commonly found in small molecules are supported",
                    Context::show(s.to_string()),
                )
            })
    }
}
