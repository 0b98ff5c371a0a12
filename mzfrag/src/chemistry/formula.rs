use std::{
    fmt::Display,
    ops::{Add, AddAssign},
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    chemistry::Element,
    parse_json::{ParseJson, use_serde},
};

/// A molecular formula, a selection of elements with their counts.
///
/// The elements are kept sorted, with no duplicates and no zero counts, so two formulas with the
/// same composition always compare equal.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MolecularFormula {
    elements: ThinVec<(Element, i32)>,
}

/// Easily define molecular formulas using the following syntax: `<element> <num>`
/// ```
/// # use mzfrag::*;
/// let formula = molecular_formula!(C 3 H 8 O 1);
/// assert_eq!(formula.hill_notation(), "C3H8O");
/// ```
#[macro_export]
macro_rules! molecular_formula {
    ($($element:ident $count:literal)*) => {
        $crate::chemistry::MolecularFormula::new(&[$(($crate::chemistry::Element::$element, $count)),*])
    };
}

impl MolecularFormula {
    /// Create a new molecular formula, duplicate elements are merged and zero counts removed.
    pub fn new(elements: &[(Element, i32)]) -> Self {
        let mut result = Self::default();
        for (element, count) in elements {
            result.add((*element, *count));
        }
        result
    }

    /// Add the given number of the element to this formula.
    pub fn add(&mut self, (element, count): (Element, i32)) {
        if count == 0 {
            return;
        }
        match self.elements.binary_search_by(|(e, _)| e.cmp(&element)) {
            Ok(index) => {
                self.elements[index].1 += count;
                if self.elements[index].1 == 0 {
                    self.elements.remove(index);
                }
            }
            Err(index) => self.elements.insert(index, (element, count)),
        }
    }

    /// The elements with their counts, sorted by element.
    pub fn elements(&self) -> &[(Element, i32)] {
        &self.elements
    }

    /// The number of times the given element occurs in this formula.
    pub fn count(&self, element: Element) -> i32 {
        self.elements
            .iter()
            .find(|(e, _)| *e == element)
            .map_or(0, |(_, n)| *n)
    }

    /// Check if this formula has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The monoisotopic mass of this formula
    pub fn monoisotopic_mass(&self) -> f64 {
        self.elements
            .iter()
            .map(|(e, n)| e.monoisotopic_mass() * f64::from(*n))
            .sum()
    }

    /// Create a [Hill notation](https://en.wikipedia.org/wiki/Chemical_formula#Hill_system) from
    /// this formula. Carbon goes first followed by hydrogen and then all other elements
    /// alphabetically, if there is no carbon all elements are sorted alphabetically. Counts of
    /// one are left out.
    pub fn hill_notation(&self) -> String {
        let has_carbon = self.count(Element::C) != 0;
        self.elements
            .iter()
            .sorted_by_key(|(e, _)| match (has_carbon, e) {
                (true, Element::C) => (0, ""),
                (true, Element::H) => (1, ""),
                _ => (2, e.symbol()),
            })
            .map(|(e, n)| {
                if *n == 1 {
                    e.to_string()
                } else {
                    format!("{e}{n}")
                }
            })
            .join("")
    }
}

impl Display for MolecularFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hill_notation())
    }
}

impl AddAssign<&Self> for MolecularFormula {
    fn add_assign(&mut self, rhs: &Self) {
        for element in &rhs.elements {
            self.add(*element);
        }
    }
}

impl Add<&MolecularFormula> for &MolecularFormula {
    type Output = MolecularFormula;
    fn add(self, rhs: &MolecularFormula) -> Self::Output {
        let mut result = self.clone();
        result += rhs;
        result
    }
}

impl std::iter::Sum for MolecularFormula {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, f| {
            acc += &f;
            acc
        })
    }
}

impl ParseJson for MolecularFormula {
    fn from_json_value(
        value: serde_json::Value,
    ) -> Result<Self, context_error::BoxedError<'static, context_error::BasicKind>> {
        use_serde(value)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use crate::chemistry::{Element, MolecularFormula};

    #[test]
    fn merge_and_drop_zero() {
        let formula = MolecularFormula::new(&[
            (Element::H, 2),
            (Element::C, 1),
            (Element::H, 3),
            (Element::O, 0),
        ]);
        assert_eq!(formula, molecular_formula!(C 1 H 5));
        assert_eq!(formula.count(Element::O), 0);
        let mut formula = formula;
        formula.add((Element::H, -5));
        assert_eq!(formula.elements(), &[(Element::C, 1)]);
    }

    #[test]
    fn hill() {
        assert_eq!(molecular_formula!(O 1 H 8 C 3).hill_notation(), "C3H8O");
        assert_eq!(molecular_formula!(C 1 H 3 O 1).hill_notation(), "CH3O");
        assert_eq!(molecular_formula!(O 1 H 2).hill_notation(), "H2O");
        assert_eq!(molecular_formula!(Na 1 Cl 1).hill_notation(), "ClNa");
        assert_eq!(molecular_formula!(C 2 Br 1 H 5).to_string(), "C2H5Br");
        assert_eq!(MolecularFormula::default().hill_notation(), "");
    }

    #[test]
    fn mass() {
        let propanol = molecular_formula!(C 3 H 8 O 1);
        assert!((propanol.monoisotopic_mass() - 60.05751487741).abs() < 1e-9);
        let sum = &molecular_formula!(C 1 H 3) + &molecular_formula!(C 2 H 5 O 1);
        assert_eq!(sum, propanol);
        let total: MolecularFormula = [molecular_formula!(H 2), molecular_formula!(O 1)]
            .into_iter()
            .sum();
        assert_eq!(total, molecular_formula!(H 2 O 1));
    }
}
