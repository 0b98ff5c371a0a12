use std::collections::HashMap;

use context_error::*;
use petgraph::{
    graph::{EdgeIndex, NodeIndex, UnGraph},
    visit::{Bfs, EdgeRef, NodeFiltered},
};

use crate::{
    bitset::BitSet,
    chemistry::{Element, HYDROGEN_MASS, MolecularFormula},
    precursor::{ChemicalStructure, Substructure, SubstructureAtom, SubstructureBond},
};

/// The heavy atom graph of a precursor molecule, the shared backbone of all its fragments.
///
/// Hydrogen atoms are not part of the graph, they are counted on the heavy atom they are bonded
/// to. Atoms and bonds are numbered densely from zero, these numbers are the bit indices used by
/// every [`Fragment`](crate::fragment::Fragment) of this precursor, they are the node and edge
/// indices of the underlying graph. The graph is immutable once built.
#[derive(Clone, Debug)]
pub struct PrecursorGraph {
    graph: UnGraph<PrecursorAtom, PrecursorBond>,
}

#[derive(Clone, Copy, Debug)]
struct PrecursorAtom {
    element: Element,
    hydrogens: u32,
    mass: f64,
    aromatic: bool,
}

#[derive(Clone, Copy, Debug)]
struct PrecursorBond {
    aromatic: bool,
}

impl PrecursorGraph {
    /// Build the graph for the given structure. Explicit hydrogen atoms are folded into the
    /// hydrogen count of the heavy atom they are bonded to, the heavy atoms keep their relative
    /// order but are renumbered without the hydrogens.
    /// # Errors
    /// If an atom has an unknown element, if a bond refers to an atom that does not exist, if a
    /// bond connects an atom to itself, if two atoms are bonded twice, or if the structure
    /// contains no heavy atoms at all.
    pub fn from_structure(
        structure: &impl ChemicalStructure,
    ) -> Result<Self, BoxedError<'static, BasicKind>> {
        let mut graph = UnGraph::default();
        let mut heavy_index = Vec::with_capacity(structure.atom_count());
        for index in 0..structure.atom_count() {
            let symbol = structure.atom_symbol(index);
            let element: Element = symbol.parse().map_err(|_| {
                BoxedError::new(
                    BasicKind::Error,
                    "Unknown element",
                    format!("Atom {index} has an element symbol that is not known"),
                    Context::show(symbol.to_string()),
                )
            })?;
            if element == Element::H {
                heavy_index.push(None);
            } else {
                heavy_index.push(Some(graph.add_node(PrecursorAtom {
                    element,
                    hydrogens: u32::from(structure.implicit_hydrogens(index)),
                    mass: 0.0,
                    aromatic: structure.is_aromatic_atom(index),
                })));
            }
        }

        if graph.node_count() == 0 {
            return Err(BoxedError::new(
                BasicKind::Error,
                "Invalid structure",
                "A precursor needs at least one atom that is not hydrogen",
                Context::none(),
            ));
        }

        let mut attached_hydrogens = vec![false; structure.atom_count()];
        for index in 0..structure.bond_count() {
            let (a, b) = structure.bond_atoms(index);
            if a >= heavy_index.len() || b >= heavy_index.len() {
                return Err(BoxedError::new(
                    BasicKind::Error,
                    "Invalid bond",
                    format!(
                        "Bond {index} connects atoms {a} and {b} but the structure only has {} atoms",
                        heavy_index.len()
                    ),
                    Context::none(),
                ));
            }
            if a == b {
                return Err(BoxedError::new(
                    BasicKind::Error,
                    "Invalid bond",
                    format!("Bond {index} connects atom {a} to itself"),
                    Context::none(),
                ));
            }
            match (heavy_index[a], heavy_index[b]) {
                (Some(a), Some(b)) => {
                    if graph.find_edge(a, b).is_some() {
                        return Err(BoxedError::new(
                            BasicKind::Error,
                            "Invalid bond",
                            format!("Bond {index} connects two atoms that are already bonded"),
                            Context::none(),
                        ));
                    }
                    graph.add_edge(
                        a,
                        b,
                        PrecursorBond {
                            aromatic: structure.is_aromatic_bond(index),
                        },
                    );
                }
                (Some(heavy), None) => {
                    graph[heavy].hydrogens += 1;
                    attached_hydrogens[b] = true;
                }
                (None, Some(heavy)) => {
                    graph[heavy].hydrogens += 1;
                    attached_hydrogens[a] = true;
                }
                (None, None) => (),
            }
        }

        for (index, heavy) in heavy_index.iter().enumerate() {
            if heavy.is_none() && !attached_hydrogens[index] {
                log::warn!("Hydrogen atom {index} is not bonded to a heavy atom, it is ignored");
            }
        }

        for atom in graph.node_weights_mut() {
            atom.mass =
                atom.element.monoisotopic_mass() + f64::from(atom.hydrogens) * HYDROGEN_MASS;
        }

        log::debug!(
            "Built precursor graph with {} heavy atoms and {} bonds",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self { graph })
    }

    fn atom(&self, atom: usize) -> &PrecursorAtom {
        &self.graph[NodeIndex::new(atom)]
    }

    /// The number of heavy atoms, the size of every atom set on this precursor
    pub fn non_hydrogen_atom_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The number of bonds between heavy atoms, the size of every bond set on this precursor
    pub fn non_hydrogen_bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The atoms bonded to the given atom, in no particular order
    /// # Panics
    /// If the atom is out of range.
    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.bonds_of(atom).map(|(neighbor, _)| neighbor)
    }

    /// All bonds of the given atom as pairs of the neighbouring atom and the bond index
    /// # Panics
    /// If the atom is out of range.
    pub fn bonds_of(&self, atom: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        assert!(
            atom < self.graph.node_count(),
            "Atom {atom} out of range for a precursor with {} atoms",
            self.graph.node_count()
        );
        self.graph.edges(NodeIndex::new(atom)).map(move |edge| {
            let neighbor = if edge.source().index() == atom {
                edge.target()
            } else {
                edge.source()
            };
            (neighbor.index(), edge.id().index())
        })
    }

    /// The index of the bond between the two atoms, `None` if they are not bonded
    pub fn bond_index(&self, a: usize, b: usize) -> Option<usize> {
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .map(EdgeIndex::index)
    }

    /// The two atoms connected by the given bond, the lower index first
    /// # Panics
    /// If the bond is out of range.
    pub fn bond_atoms(&self, bond: usize) -> (usize, usize) {
        let edge = &self.graph.raw_edges()[bond];
        let (a, b) = (edge.source().index(), edge.target().index());
        (a.min(b), a.max(b))
    }

    /// The number of hydrogens on the given atom
    pub fn hydrogen_count(&self, atom: usize) -> u32 {
        self.atom(atom).hydrogens
    }

    /// The mass of the given atom including its hydrogens
    pub fn mass(&self, atom: usize) -> f64 {
        self.atom(atom).mass
    }

    /// The element of the given atom
    pub fn element(&self, atom: usize) -> Element {
        self.atom(atom).element
    }

    /// If the given bond is aromatic
    pub fn is_aromatic_bond(&self, bond: usize) -> bool {
        self.graph[EdgeIndex::new(bond)].aromatic
    }

    /// If the given atom is aromatic
    pub fn is_aromatic_atom(&self, atom: usize) -> bool {
        self.atom(atom).aromatic
    }

    /// Check if the given atoms form a single connected part of this precursor, only bonds
    /// between two of the given atoms are followed.
    /// # Panics
    /// If the atom set does not have the size of this precursor.
    pub fn is_connected(&self, atoms: &BitSet) -> bool {
        assert_eq!(
            atoms.size(),
            self.graph.node_count(),
            "Atom set does not fit the precursor"
        );
        let Some(start) = atoms.first_set() else {
            return false;
        };
        let selected =
            NodeFiltered::from_fn(&self.graph, |node: NodeIndex| atoms.get(node.index()));
        let mut bfs = Bfs::new(&selected, NodeIndex::new(start));
        let mut reached = 0;
        while bfs.next(&selected).is_some() {
            reached += 1;
        }
        reached == atoms.cardinality()
    }

    /// The monoisotopic mass of the full precursor
    pub fn monoisotopic_mass(&self) -> f64 {
        self.graph.node_weights().map(|a| a.mass).sum()
    }

    /// The molecular formula of the full precursor
    pub fn molecular_formula(&self) -> MolecularFormula {
        let mut formula = MolecularFormula::default();
        for atom in self.graph.node_weights() {
            formula.add((atom.element, 1));
            formula.add((Element::H, i32::try_from(atom.hydrogens).unwrap_or(i32::MAX)));
        }
        formula
    }

    /// Materialise the given selection of atoms and bonds as a standalone structure. With a
    /// single atom only that atom is returned, otherwise the structure is built up from the set
    /// bonds and contains the atoms they connect. When `aromatic` is set the aromaticity of the
    /// precursor is carried over to the bonds and their atoms.
    /// # Panics
    /// If the sizes of the sets do not match this precursor.
    pub fn substructure(&self, atoms: &BitSet, bonds: &BitSet, aromatic: bool) -> Substructure {
        assert_eq!(
            atoms.size(),
            self.non_hydrogen_atom_count(),
            "Atom set does not fit the precursor"
        );
        assert_eq!(
            bonds.size(),
            self.non_hydrogen_bond_count(),
            "Bond set does not fit the precursor"
        );
        let mut result = Substructure::default();
        if atoms.cardinality() == 1 {
            if let Some(atom) = atoms.first_set() {
                let is_aromatic = aromatic && self.is_aromatic_atom(atom);
                result.atoms.push(self.substructure_atom(atom, is_aromatic));
            }
            return result;
        }

        let mut local = HashMap::new();
        for bond in bonds.ones() {
            let is_aromatic = aromatic && self.is_aromatic_bond(bond);
            let (a, b) = self.bond_atoms(bond);
            let mut local_index = |atom: usize, result: &mut Substructure| {
                let index = *local.entry(atom).or_insert_with(|| {
                    result.atoms.push(self.substructure_atom(atom, false));
                    result.atoms.len() - 1
                });
                if is_aromatic {
                    result.atoms[index].aromatic = true;
                }
                index
            };
            let a = local_index(a, &mut result);
            let b = local_index(b, &mut result);
            result.bonds.push(SubstructureBond {
                index: bond,
                atoms: (a, b),
                aromatic: is_aromatic,
            });
        }
        result
    }

    fn substructure_atom(&self, atom: usize, aromatic: bool) -> SubstructureAtom {
        SubstructureAtom {
            index: atom,
            element: self.element(atom),
            hydrogens: self.hydrogen_count(atom),
            aromatic,
        }
    }
}
