//! Fragments of a precursor, stored as bit sets over its atoms and bonds.

use std::{cell::Cell, cmp::Ordering, fmt::Display};

use crate::{
    bitset::BitSet,
    chemistry::{Element, MolecularFormula},
    precursor::{PrecursorGraph, Substructure},
};

/// A fragment of a precursor, described by which of its atoms and bonds survived.
///
/// Three bit sets are kept, all sized to the precursor: the atoms, the bonds between two kept
/// atoms, and the broken bonds with exactly one kept atom. The precursor itself is shared by
/// reference between all fragments derived from it.
///
/// Two fragments are equal if they contain the same atoms, the bonds are derived data.
#[derive(Clone, Debug)]
pub struct Fragment<'a> {
    precursor: &'a PrecursorGraph,
    atoms: BitSet,
    bonds: BitSet,
    broken_bonds: BitSet,
    hydrogens: Cell<Option<u32>>,
    tree_depth: u8,
    has_matched: bool,
}

impl<'a> Fragment<'a> {
    /// The fragment containing the full precursor: all atoms, all bonds, nothing broken.
    pub fn precursor(precursor: &'a PrecursorGraph) -> Self {
        Self {
            precursor,
            atoms: BitSet::filled(precursor.non_hydrogen_atom_count()),
            bonds: BitSet::filled(precursor.non_hydrogen_bond_count()),
            broken_bonds: BitSet::new(precursor.non_hydrogen_bond_count()),
            hydrogens: Cell::new(None),
            tree_depth: 0,
            has_matched: false,
        }
    }

    /// Create a fragment from a selection of atoms. A bond between two selected atoms is kept, a
    /// bond with only one selected atom is broken.
    /// # Panics
    /// If the atom set does not have the size of the precursor.
    pub fn from_atoms(precursor: &'a PrecursorGraph, atoms: BitSet) -> Self {
        assert_eq!(
            atoms.size(),
            precursor.non_hydrogen_atom_count(),
            "Atom set does not fit the precursor"
        );
        let mut bonds = BitSet::new(precursor.non_hydrogen_bond_count());
        let mut broken_bonds = BitSet::new(precursor.non_hydrogen_bond_count());
        for atom in atoms.ones() {
            for (neighbor, bond) in precursor.bonds_of(atom) {
                if atoms.get(neighbor) {
                    bonds.set(bond);
                } else {
                    broken_bonds.set(bond);
                }
            }
        }
        Self {
            precursor,
            atoms,
            bonds,
            broken_bonds,
            hydrogens: Cell::new(None),
            tree_depth: 0,
            has_matched: false,
        }
    }

    /// Create a fragment from already derived atom, bond, and broken bond sets. The sets are
    /// taken as is, the caller is responsible for them being consistent.
    /// # Panics
    /// If any of the sets does not have the size of the precursor.
    pub fn from_parts(
        precursor: &'a PrecursorGraph,
        atoms: BitSet,
        bonds: BitSet,
        broken_bonds: BitSet,
    ) -> Self {
        assert_eq!(
            atoms.size(),
            precursor.non_hydrogen_atom_count(),
            "Atom set does not fit the precursor"
        );
        assert_eq!(
            bonds.size(),
            precursor.non_hydrogen_bond_count(),
            "Bond set does not fit the precursor"
        );
        assert_eq!(
            broken_bonds.size(),
            precursor.non_hydrogen_bond_count(),
            "Broken bond set does not fit the precursor"
        );
        Self {
            precursor,
            atoms,
            bonds,
            broken_bonds,
            hydrogens: Cell::new(None),
            tree_depth: 0,
            has_matched: false,
        }
    }

    /// The precursor this fragment is part of
    pub const fn precursor_graph(&self) -> &'a PrecursorGraph {
        self.precursor
    }

    /// The atoms
    pub const fn atoms(&self) -> &BitSet {
        &self.atoms
    }

    /// The bonds between two atoms of this fragment
    pub const fn bonds(&self) -> &BitSet {
        &self.bonds
    }

    /// The bonds that were broken to create this fragment
    pub const fn broken_bonds(&self) -> &BitSet {
        &self.broken_bonds
    }

    /// The total number of hydrogens on the atoms of this fragment. The value is computed on
    /// first use and then kept, it is not updated when atoms are changed with
    /// [`Self::set_atom`], use [`Self::recalculate_hydrogen_count`] for that.
    pub fn hydrogen_count(&self) -> u32 {
        if let Some(count) = self.hydrogens.get() {
            count
        } else {
            self.recalculate_hydrogen_count()
        }
    }

    /// Count the hydrogens again from the current atoms and store the result.
    pub fn recalculate_hydrogen_count(&self) -> u32 {
        let count = self
            .atoms
            .ones()
            .map(|atom| self.precursor.hydrogen_count(atom))
            .sum();
        self.hydrogens.set(Some(count));
        count
    }

    /// Overwrite the stored hydrogen count.
    pub fn set_hydrogen_count(&mut self, count: u32) {
        self.hydrogens.set(Some(count));
    }

    /// The monoisotopic mass of all atoms with their hydrogens, calculated from the current atoms.
    pub fn monoisotopic_mass(&self) -> f64 {
        self.atoms.ones().map(|atom| self.precursor.mass(atom)).sum()
    }

    /// The molecular formula of all atoms with their hydrogens
    pub fn molecular_formula(&self) -> MolecularFormula {
        let mut formula = MolecularFormula::default();
        for atom in self.atoms.ones() {
            formula.add((self.precursor.element(atom), 1));
            formula.add((
                Element::H,
                i32::try_from(self.precursor.hydrogen_count(atom)).unwrap_or(i32::MAX),
            ));
        }
        formula
    }

    /// Check if all atoms of this fragment are connected via bonds of this fragment. A single
    /// atom is always connected, an empty fragment never.
    pub fn is_connected(&self) -> bool {
        self.precursor.is_connected(&self.atoms)
    }

    /// Check if all atoms of this fragment are also part of the other fragment.
    pub fn is_sub_structure_of(&self, other: &Self) -> bool {
        self.atoms.is_subset_of(&other.atoms)
    }

    /// Check if this fragment is a sub structure of the other fragment with fewer atoms.
    pub fn is_proper_sub_structure_of(&self, other: &Self) -> bool {
        self.is_sub_structure_of(other) && self.atoms.cardinality() < other.atoms.cardinality()
    }

    /// The fragment made up of all atoms of this fragment that are not in the other fragment.
    /// Returns `None` if nothing remains or if the remaining atoms are not connected.
    /// # Panics
    /// If the fragments are built on precursors of different sizes.
    pub fn difference_fragment(&self, other: &Self) -> Option<Self> {
        let atoms = self.atoms.difference(&other.atoms);
        if atoms.is_clear() {
            log::debug!("Difference of {self} and {other} is empty");
            return None;
        }
        let difference = Self::from_atoms(self.precursor, atoms);
        if difference.is_connected() {
            Some(difference)
        } else {
            log::debug!("Difference of {self} and {other} is not connected");
            None
        }
    }

    /// The rest of the precursor after removing this fragment, `None` if that is not connected.
    pub fn complement(&self) -> Option<Self> {
        Self::precursor(self.precursor).difference_fragment(self)
    }

    /// Order fragments by their monoisotopic mass
    pub fn compare_mass(&self, other: &Self) -> Ordering {
        self.monoisotopic_mass()
            .total_cmp(&other.monoisotopic_mass())
    }

    /// The indices of the broken bonds in ascending order
    pub fn broken_bond_indices(&self) -> Vec<usize> {
        self.broken_bonds.set_indices()
    }

    /// The bonds that are broken in the other fragment but not in this one, in ascending order.
    /// # Panics
    /// If the fragments are built on precursors of different sizes.
    pub fn unique_broken_bonds(&self, other: &Self) -> Vec<usize> {
        other.broken_bonds.difference(&self.broken_bonds).set_indices()
    }

    /// Check if the given atom is part of this fragment
    /// # Panics
    /// If the atom is out of range.
    pub fn atom(&self, atom: usize) -> bool {
        self.atoms.get(atom)
    }

    /// Add or remove a single atom. The bonds are not updated and the hydrogen count has to be
    /// recalculated afterwards.
    /// # Panics
    /// If the atom is out of range.
    pub fn set_atom(&mut self, atom: usize, value: bool) {
        self.atoms.set_value(atom, value);
    }

    /// The number of atoms in this fragment
    pub fn non_hydrogen_atom_count(&self) -> usize {
        self.atoms.cardinality()
    }

    /// The number of bonds in this fragment
    pub fn non_hydrogen_bond_count(&self) -> usize {
        self.bonds.cardinality()
    }

    /// The depth in the fragmentation tree, also the maximal number of hydrogen shifts while matching
    pub const fn tree_depth(&self) -> u8 {
        self.tree_depth
    }

    /// Set the depth in the fragmentation tree
    pub const fn set_tree_depth(&mut self, depth: u8) {
        self.tree_depth = depth;
    }

    /// Check if this fragment has been matched to any peak
    pub const fn has_matched(&self) -> bool {
        self.has_matched
    }

    pub(crate) const fn set_matched(&mut self) {
        self.has_matched = true;
    }

    /// Remove all atoms, bonds, and broken bonds.
    pub fn nullify(&mut self) {
        self.atoms.nullify();
        self.bonds.nullify();
        self.broken_bonds.nullify();
        self.hydrogens.set(None);
    }

    /// Materialise this fragment as a standalone structure
    pub fn substructure(&self) -> Substructure {
        self.precursor
            .substructure(&self.atoms, &self.bonds, false)
    }

    /// Materialise this fragment as a standalone structure, keeping the aromaticity of the precursor
    pub fn aromatic_substructure(&self) -> Substructure {
        self.precursor.substructure(&self.atoms, &self.bonds, true)
    }
}

impl PartialEq for Fragment<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.atoms == other.atoms
    }
}

impl Eq for Fragment<'_> {}

impl Display for Fragment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "atoms {} bonds {} broken {}",
            self.atoms, self.bonds, self.broken_bonds
        )
    }
}
