use serde::{Deserialize, Serialize};

/// The view on a parsed chemical structure that is needed to build a [`PrecursorGraph`](crate::precursor::PrecursorGraph).
///
/// Atoms and bonds are addressed by dense indices starting at zero. Hydrogen atoms may be present
/// as explicit atoms, as implicit hydrogen counts on their heavy atom, or a mix of both.
pub trait ChemicalStructure {
    /// The total number of atoms, including any explicit hydrogens
    fn atom_count(&self) -> usize;
    /// The element symbol of the given atom, e.g. `C` or `Cl`
    fn atom_symbol(&self, atom: usize) -> &str;
    /// The number of implicit hydrogens on the given atom
    fn implicit_hydrogens(&self, atom: usize) -> u8;
    /// If the given atom is part of an aromatic system
    fn is_aromatic_atom(&self, atom: usize) -> bool;
    /// The total number of bonds, including any bonds to explicit hydrogens
    fn bond_count(&self) -> usize;
    /// The two atoms connected by the given bond
    fn bond_atoms(&self, bond: usize) -> (usize, usize);
    /// If the given bond is aromatic
    fn is_aromatic_bond(&self, bond: usize) -> bool;
}

/// A plain chemical structure, built atom by atom.
/// ```
/// # use mzfrag::prelude::*;
/// // Methanol with one explicit hydrogen
/// let mut structure = MolecularStructure::default();
/// let c = structure.add_atom("C", 3);
/// let o = structure.add_atom("O", 0);
/// let h = structure.add_atom("H", 0);
/// structure.add_bond(c, o, false);
/// structure.add_bond(o, h, false);
/// assert_eq!(structure.atom_count(), 3);
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct MolecularStructure {
    atoms: Vec<StructureAtom>,
    bonds: Vec<StructureBond>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
struct StructureAtom {
    symbol: String,
    implicit_hydrogens: u8,
    aromatic: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
struct StructureBond {
    atoms: (usize, usize),
    aromatic: bool,
}

impl MolecularStructure {
    /// Add an atom with the given element symbol and number of implicit hydrogens, returns the index of the new atom.
    pub fn add_atom(&mut self, symbol: impl Into<String>, implicit_hydrogens: u8) -> usize {
        self.atoms.push(StructureAtom {
            symbol: symbol.into(),
            implicit_hydrogens,
            aromatic: false,
        });
        self.atoms.len() - 1
    }

    /// Add an atom that is part of an aromatic system, returns the index of the new atom.
    pub fn add_aromatic_atom(&mut self, symbol: impl Into<String>, implicit_hydrogens: u8) -> usize {
        self.atoms.push(StructureAtom {
            symbol: symbol.into(),
            implicit_hydrogens,
            aromatic: true,
        });
        self.atoms.len() - 1
    }

    /// Add a bond between the two atoms, returns the index of the new bond. The atoms are not
    /// checked here, invalid bonds are reported when building the precursor graph.
    pub fn add_bond(&mut self, a: usize, b: usize, aromatic: bool) -> usize {
        self.bonds.push(StructureBond {
            atoms: (a, b),
            aromatic,
        });
        self.bonds.len() - 1
    }
}

impl ChemicalStructure for MolecularStructure {
    fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    fn atom_symbol(&self, atom: usize) -> &str {
        &self.atoms[atom].symbol
    }

    fn implicit_hydrogens(&self, atom: usize) -> u8 {
        self.atoms[atom].implicit_hydrogens
    }

    fn is_aromatic_atom(&self, atom: usize) -> bool {
        self.atoms[atom].aromatic
    }

    fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    fn bond_atoms(&self, bond: usize) -> (usize, usize) {
        self.bonds[bond].atoms
    }

    fn is_aromatic_bond(&self, bond: usize) -> bool {
        self.bonds[bond].aromatic
    }
}
