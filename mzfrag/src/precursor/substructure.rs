use serde::{Deserialize, Serialize};

use crate::chemistry::{Element, MolecularFormula};

/// A standalone selection of a precursor, for handing fragments back to a chemistry toolkit for
/// rendering or export. Built with [`PrecursorGraph::substructure`](crate::precursor::PrecursorGraph::substructure).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Substructure {
    pub(super) atoms: Vec<SubstructureAtom>,
    pub(super) bonds: Vec<SubstructureBond>,
}

/// An atom in a [`Substructure`]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SubstructureAtom {
    /// The index of this atom in the precursor
    pub index: usize,
    /// The element
    pub element: Element,
    /// The number of hydrogens on this atom
    pub hydrogens: u32,
    /// If this atom is marked aromatic
    pub aromatic: bool,
}

/// A bond in a [`Substructure`]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SubstructureBond {
    /// The index of this bond in the precursor
    pub index: usize,
    /// The two atoms, as indices into [`Substructure::atoms`]
    pub atoms: (usize, usize),
    /// If this bond is marked aromatic
    pub aromatic: bool,
}

impl Substructure {
    /// The atoms, in the order they were first encountered
    pub fn atoms(&self) -> &[SubstructureAtom] {
        &self.atoms
    }

    /// The bonds
    pub fn bonds(&self) -> &[SubstructureBond] {
        &self.bonds
    }

    /// Check if this substructure has no atoms
    pub const fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The molecular formula of all atoms and their hydrogens
    pub fn molecular_formula(&self) -> MolecularFormula {
        let mut formula = MolecularFormula::default();
        for atom in &self.atoms {
            formula.add((atom.element, 1));
            formula.add((Element::H, i32::try_from(atom.hydrogens).unwrap_or(i32::MAX)));
        }
        formula
    }
}
