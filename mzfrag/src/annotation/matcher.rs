use std::cmp::Ordering;

use context_error::*;
use thin_vec::ThinVec;

use crate::{
    annotation::{FragmentAnnotation, MatchingParameters, PeakMatchList},
    chemistry::HYDROGEN_MASS,
    fragment::Fragment,
    spectrum::{MassWindow, PeakList},
};

/// The result of matching a fragment to a peak
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
    /// The fragment explains the peak in all these ways
    Matched(ThinVec<FragmentAnnotation>),
    /// Every mass tried was above the peak, no hydrogen shift can reach it
    Unreachable,
    /// The fragment does not explain the peak
    NoMatch,
}

impl MatchOutcome {
    /// Check if this is a match
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// One round of mass comparisons, with the mass correction of a single ionisation type.
#[derive(Clone, Copy, Debug)]
struct MatchPass {
    mass_correction: f64,
    ionization_index: usize,
    /// Hydrogens claimed by the ionisation that are not available for shifts
    adduct_hydrogens: i64,
}

/// Matches fragments to peaks.
///
/// Each fragment mass is tried twice, first with the configured ionisation type and then with
/// the neutral type at index 0 for the same polarity. For each of these the mass is also tried
/// with hydrogens added and removed, up to the tree depth of the fragment (limited by
/// [`MatchingParameters::maximum_tree_depth`]). Once a shifted mass overshoots the peak in the
/// direction of the shift larger shifts in that direction are not tried.
#[derive(Clone, Debug)]
pub struct PeakMatcher {
    parameters: MatchingParameters,
    passes: [MatchPass; 2],
}

impl PeakMatcher {
    /// Create a matcher for the given settings.
    /// # Errors
    /// If the settings are invalid, see [`MatchingParameters::validate`].
    pub fn new(parameters: MatchingParameters) -> Result<Self, BoxedError<'static, BasicKind>> {
        parameters.validate()?;
        let missing = || {
            BoxedError::new(
                BasicKind::Error,
                "Invalid ionisation table",
                "The selected or the neutral ionisation type does not exist",
                Context::none(),
            )
        };
        let selected = parameters.ionization_type().ok_or_else(missing)?;
        let neutral = parameters
            .ionization_types
            .get(0, parameters.positive)
            .ok_or_else(missing)?;
        let passes = [
            MatchPass {
                mass_correction: selected.mass_correction,
                ionization_index: parameters.ionization_index,
                adduct_hydrogens: i64::from(selected.uses_precursor_hydrogen),
            },
            MatchPass {
                mass_correction: neutral.mass_correction,
                ionization_index: 0,
                adduct_hydrogens: 0,
            },
        ];
        Ok(Self { parameters, passes })
    }

    /// The settings of this matcher
    pub const fn parameters(&self) -> &MatchingParameters {
        &self.parameters
    }

    /// Check if the fragment explains the peak. This does not change the fragment or record
    /// anything, see [`Self::match_fragment`] for that.
    pub fn annotate(&self, fragment: &Fragment<'_>, peak: &impl MassWindow) -> MatchOutcome {
        let hydrogens = i64::from(fragment.hydrogen_count());
        let depth = i16::from(fragment.tree_depth().min(self.parameters.maximum_tree_depth));
        let mass = fragment.monoisotopic_mass();
        let mut annotations = ThinVec::new();
        let mut comparisons = 0_usize;
        let mut too_high = 0_usize;

        for pass in &self.passes {
            let base = mass + pass.mass_correction;
            // Whether adding (index 0) or removing (index 1) hydrogens is still worth trying
            let mut search = [true, true];
            comparisons += 1;
            match peak.compare_mass(base) {
                Ordering::Equal => {
                    if pass.adduct_hydrogens <= hydrogens {
                        annotations.push(FragmentAnnotation {
                            hydrogen_shift: 0,
                            mass: base,
                            ionization_index: pass.ionization_index,
                        });
                    }
                }
                Ordering::Greater => {
                    search[0] = false;
                    too_high += 1;
                }
                Ordering::Less => search[1] = false,
            }

            for shift in 1..=depth {
                for (direction, sign) in [1_i16, -1].into_iter().enumerate() {
                    let signed_shift = sign * shift;
                    if !search[direction]
                        || hydrogens - (i64::from(signed_shift) - pass.adduct_hydrogens) < 0
                    {
                        continue;
                    }
                    let corrected = f64::from(signed_shift).mul_add(HYDROGEN_MASS, base);
                    comparisons += 1;
                    match peak.compare_mass(corrected) {
                        Ordering::Equal => annotations.push(FragmentAnnotation {
                            hydrogen_shift: signed_shift,
                            mass: corrected,
                            ionization_index: pass.ionization_index,
                        }),
                        Ordering::Greater => {
                            too_high += 1;
                            if sign > 0 {
                                search[direction] = false;
                            }
                        }
                        Ordering::Less => {
                            if sign < 0 {
                                search[direction] = false;
                            }
                        }
                    }
                }
            }
        }

        log::trace!(
            "Fragment {fragment} mass {mass}: {} matches, {too_high}/{comparisons} comparisons too high",
            annotations.len()
        );

        if annotations.is_empty() {
            if too_high == comparisons {
                MatchOutcome::Unreachable
            } else {
                MatchOutcome::NoMatch
            }
        } else {
            MatchOutcome::Matched(annotations)
        }
    }

    /// Match the fragment to the peak with the given index. On a match the fragment is marked
    /// as matched and the annotations are added to the record for this peak.
    /// # Errors
    /// If the peak index does not exist, or if the existing record for this peak was made in
    /// the other polarity. Nothing is compared in that case.
    pub fn match_fragment<'a>(
        &self,
        fragment: &mut Fragment<'a>,
        peak_index: usize,
        peaks: &PeakList,
        matches: &mut PeakMatchList<'a>,
    ) -> Result<MatchOutcome, BoxedError<'static, BasicKind>> {
        let peak = peaks.get(peak_index).ok_or_else(|| {
            BoxedError::new(
                BasicKind::Error,
                "Malformed peak match",
                format!(
                    "Peak {peak_index} does not exist, there are only {} peaks",
                    peaks.len()
                ),
                Context::none(),
            )
        })?;
        matches.check(peak_index, self.parameters.positive)?;
        let outcome = self.annotate(fragment, peak);
        if let MatchOutcome::Matched(annotations) = &outcome {
            fragment.set_matched();
            matches.record(peak_index, self.parameters.positive, fragment, annotations);
        }
        Ok(outcome)
    }

    /// Match the fragment to every peak of the list, gives the outcome for each peak in order.
    /// # Errors
    /// If any existing record was made in the other polarity. All records are checked before
    /// the first peak is compared, so on an error nothing is recorded.
    pub fn match_spectrum<'a>(
        &self,
        fragment: &mut Fragment<'a>,
        peaks: &PeakList,
        matches: &mut PeakMatchList<'a>,
    ) -> Result<Vec<MatchOutcome>, BoxedError<'static, BasicKind>> {
        for index in 0..peaks.len() {
            matches.check(index, self.parameters.positive)?;
        }
        (0..peaks.len())
            .map(|index| self.match_fragment(fragment, index, peaks, matches))
            .collect()
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use crate::{
        annotation::{MatchOutcome, MatchingParameters, PeakMatchList, PeakMatcher},
        bitset::BitSet,
        chemistry::HYDROGEN_MASS,
        fragment::Fragment,
        precursor::{MolecularStructure, PrecursorGraph},
        spectrum::{PeakList, TandemMassPeak, Tolerance},
    };

    fn propanol() -> PrecursorGraph {
        let mut structure = MolecularStructure::default();
        let c1 = structure.add_atom("C", 3);
        let c2 = structure.add_atom("C", 2);
        let c3 = structure.add_atom("C", 2);
        let o = structure.add_atom("O", 1);
        structure.add_bond(c1, c2, false);
        structure.add_bond(c2, c3, false);
        structure.add_bond(c3, o, false);
        PrecursorGraph::from_structure(&structure).unwrap()
    }

    fn neutral() -> PeakMatcher {
        PeakMatcher::new(MatchingParameters::default().ionization(0, true)).unwrap()
    }

    #[test]
    fn unshifted() {
        let graph = propanol();
        let fragment = Fragment::precursor(&graph);
        let mass = fragment.monoisotopic_mass();
        let MatchOutcome::Matched(annotations) =
            neutral().annotate(&fragment, &((mass - 0.01)..=(mass + 0.01)))
        else {
            panic!("Expected a match");
        };
        // Both passes use the neutral type
        assert_eq!(annotations.len(), 2);
        assert!(annotations.iter().all(|a| a.hydrogen_shift == 0));
        assert!((annotations[0].mass - mass).abs() < 1e-12);
    }

    #[test]
    fn protonated() {
        let graph = propanol();
        let fragment = Fragment::precursor(&graph);
        let matcher = PeakMatcher::new(MatchingParameters::default()).unwrap();
        let mz = fragment.monoisotopic_mass() + 1.007276;
        let MatchOutcome::Matched(annotations) =
            matcher.annotate(&fragment, &TandemMassPeak::new(mz, 1.0, Tolerance::default()))
        else {
            panic!("Expected a match");
        };
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].ionization_index, 1);
        assert_eq!(annotations[0].hydrogen_shift, 0);
    }

    #[test]
    fn hydrogen_shift() {
        let graph = propanol();
        let mut fragment = Fragment::precursor(&graph);
        let target = 2.0f64.mul_add(HYDROGEN_MASS, fragment.monoisotopic_mass());
        let window = (target - 0.001)..=(target + 0.001);
        assert_eq!(neutral().annotate(&fragment, &window), MatchOutcome::NoMatch);
        fragment.set_tree_depth(2);
        let MatchOutcome::Matched(annotations) = neutral().annotate(&fragment, &window) else {
            panic!("Expected a match");
        };
        assert_eq!(
            annotations.iter().map(|a| a.hydrogen_shift).collect::<Vec<_>>(),
            vec![2, 2]
        );
        let limited = PeakMatcher::new(
            MatchingParameters::default()
                .ionization(0, true)
                .maximum_tree_depth(1),
        )
        .unwrap();
        assert_eq!(limited.annotate(&fragment, &window), MatchOutcome::NoMatch);
    }

    #[test]
    fn unreachable() {
        let graph = propanol();
        let mut fragment = Fragment::precursor(&graph);
        fragment.set_tree_depth(2);
        assert_eq!(neutral().annotate(&fragment, &(10.0..=11.0)), MatchOutcome::Unreachable);
        assert_eq!(neutral().annotate(&fragment, &(100.0..=101.0)), MatchOutcome::NoMatch);
    }

    #[test]
    fn records() {
        let graph = propanol();
        let matcher = neutral();
        let peaks = MatchingParameters::default().peak_list([
            (Fragment::precursor(&graph).monoisotopic_mass(), 10.0),
            (500.0, 1.0),
        ]);
        let mut matches = PeakMatchList::new();
        let mut full = Fragment::precursor(&graph);
        let mut copy = Fragment::precursor(&graph);
        assert!(matcher.match_fragment(&mut full, 0, &peaks, &mut matches).unwrap().is_match());
        assert!(full.has_matched());
        assert!(matcher.match_fragment(&mut copy, 0, &peaks, &mut matches).unwrap().is_match());
        assert_eq!(matches.len(), 1);
        let record = matches.get(0).unwrap();
        assert_eq!(record.fragments().len(), 4);
        assert!(record.is_positive());
        assert_eq!(record.peak_index(), 0);
        assert_eq!(record.best_match().unwrap().annotation.hydrogen_shift, 0);

        let mut part = Fragment::from_atoms(&graph, BitSet::from_indices(4, [0]));
        let outcomes = matcher.match_spectrum(&mut part, &peaks, &mut matches).unwrap();
        assert_eq!(outcomes, vec![MatchOutcome::NoMatch, MatchOutcome::NoMatch]);
        assert!(!part.has_matched());
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn malformed_records() {
        let graph = propanol();
        let peaks = PeakList::new(vec![TandemMassPeak::new(
            Fragment::precursor(&graph).monoisotopic_mass(),
            1.0,
            Tolerance::default(),
        )]);
        let mut matches = PeakMatchList::new();
        let mut fragment = Fragment::precursor(&graph);
        neutral()
            .match_fragment(&mut fragment, 0, &peaks, &mut matches)
            .unwrap();
        let negative =
            PeakMatcher::new(MatchingParameters::default().ionization(0, false)).unwrap();
        assert!(negative.match_fragment(&mut fragment, 0, &peaks, &mut matches).is_err());
        assert!(neutral().match_fragment(&mut fragment, 1, &peaks, &mut matches).is_err());
        assert_eq!(matches.get(0).unwrap().fragments().len(), 2);
    }

    #[test]
    fn spectrum_polarity_checked_before_matching() {
        let graph = propanol();
        let mut methyl = Fragment::from_atoms(&graph, BitSet::from_indices(4, [0]));
        let mut full = Fragment::precursor(&graph);
        let peaks = MatchingParameters::default().peak_list([
            (methyl.monoisotopic_mass(), 5.0),
            (full.monoisotopic_mass(), 10.0),
        ]);
        let mut matches = PeakMatchList::new();
        assert!(neutral().match_fragment(&mut full, 1, &peaks, &mut matches).unwrap().is_match());

        let negative =
            PeakMatcher::new(MatchingParameters::default().ionization(0, false)).unwrap();
        assert!(negative.annotate(&methyl, peaks.get(0).unwrap()).is_match());
        assert!(negative.match_spectrum(&mut methyl, &peaks, &mut matches).is_err());
        assert!(!methyl.has_matched());
        assert_eq!(matches.len(), 1);
        assert!(matches.get(0).is_none());
    }
}
