#![doc = include_str!("../README.md")]

/// Contains everything related to matching fragments to peaks.
pub mod annotation;
pub mod bitset;
/// Contains all things related to the underlying chemistry.
#[macro_use]
pub mod chemistry;
/// Contains the fragment definition and all fragment level operations.
pub mod fragment;
/// Contains logic to parse the configuration with good error messages.
pub mod parse_json;
/// Contains the precursor molecule model that all fragments are built on.
pub mod precursor;
/// Contains peaks and the tolerance windows used to match against them.
pub mod spectrum;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::annotation::{
        FragmentAnnotation, FragmentPeakMatch, IonizationTable, IonizationType, MatchOutcome,
        MatchedFragment, MatchingParameters, PeakMatchList, PeakMatcher,
    };
    pub use crate::bitset::BitSet;
    pub use crate::chemistry::{Element, HYDROGEN_MASS, MolecularFormula};
    pub use crate::fragment::Fragment;
    pub use crate::molecular_formula;
    pub use crate::parse_json::ParseJson;
    pub use crate::precursor::{ChemicalStructure, MolecularStructure, PrecursorGraph, Substructure};
    pub use crate::spectrum::{MassWindow, PeakList, TandemMassPeak, Tolerance};
}
