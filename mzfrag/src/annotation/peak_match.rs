use std::collections::BTreeMap;

use context_error::*;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::fragment::Fragment;

/// How a fragment explains a peak
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct FragmentAnnotation {
    /// The number of hydrogens added (positive) or removed (negative)
    pub hydrogen_shift: i16,
    /// The mass after ionisation and hydrogen shift
    pub mass: f64,
    /// The ionisation type used
    pub ionization_index: usize,
}

/// A fragment with the way it explains a peak
#[derive(Clone, Debug)]
pub struct MatchedFragment<'a> {
    /// The fragment
    pub fragment: Fragment<'a>,
    /// The way it matched
    pub annotation: FragmentAnnotation,
}

/// All fragments that explain a single peak
#[derive(Clone, Debug)]
pub struct FragmentPeakMatch<'a> {
    peak_index: usize,
    positive: bool,
    fragments: ThinVec<MatchedFragment<'a>>,
}

impl<'a> FragmentPeakMatch<'a> {
    /// The index of the peak in its peak list
    pub const fn peak_index(&self) -> usize {
        self.peak_index
    }

    /// The polarity these matches were made in
    pub const fn is_positive(&self) -> bool {
        self.positive
    }

    /// All matched fragments, in the order they were matched
    pub fn fragments(&self) -> &[MatchedFragment<'a>] {
        &self.fragments
    }

    /// The match with the smallest hydrogen shift, the first one in case of a tie
    pub fn best_match(&self) -> Option<&MatchedFragment<'a>> {
        self.fragments
            .iter()
            .min_by_key(|m| m.annotation.hydrogen_shift.unsigned_abs())
    }
}

/// The matches for a whole spectrum, at most one [`FragmentPeakMatch`] per peak.
///
/// Records are only ever added to, a record is created on the first match for a peak and all
/// later matches for that peak are appended to it.
#[derive(Clone, Debug, Default)]
pub struct PeakMatchList<'a> {
    records: BTreeMap<usize, FragmentPeakMatch<'a>>,
}

impl<'a> PeakMatchList<'a> {
    /// Create an empty list
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// The record for the given peak, if any fragment matched it
    pub fn get(&self, peak_index: usize) -> Option<&FragmentPeakMatch<'a>> {
        self.records.get(&peak_index)
    }

    /// All records, in ascending peak index order
    pub fn iter(&self) -> impl Iterator<Item = &FragmentPeakMatch<'a>> {
        self.records.values()
    }

    /// The number of peaks with at least one match
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no peak has been matched
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that a match for this peak in this polarity can be added.
    pub(crate) fn check(
        &self,
        peak_index: usize,
        positive: bool,
    ) -> Result<(), BoxedError<'static, BasicKind>> {
        match self.records.get(&peak_index) {
            Some(record) if record.positive != positive => Err(BoxedError::new(
                BasicKind::Error,
                "Malformed peak match",
                format!(
                    "Peak {peak_index} was matched in {} mode but is now matched in {} mode",
                    polarity(record.positive),
                    polarity(positive)
                ),
                Context::none(),
            )),
            _ => Ok(()),
        }
    }

    /// Add the annotations of this fragment to the record of the peak, creating it if needed.
    pub(crate) fn record(
        &mut self,
        peak_index: usize,
        positive: bool,
        fragment: &Fragment<'a>,
        annotations: &[FragmentAnnotation],
    ) {
        let record = self
            .records
            .entry(peak_index)
            .or_insert_with(|| FragmentPeakMatch {
                peak_index,
                positive,
                fragments: ThinVec::new(),
            });
        record
            .fragments
            .extend(annotations.iter().map(|annotation| MatchedFragment {
                fragment: fragment.clone(),
                annotation: *annotation,
            }));
    }
}

const fn polarity(positive: bool) -> &'static str {
    if positive { "positive" } else { "negative" }
}

impl<'b, 'a> IntoIterator for &'b PeakMatchList<'a> {
    type Item = &'b FragmentPeakMatch<'a>;
    type IntoIter = std::collections::btree_map::Values<'b, usize, FragmentPeakMatch<'a>>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
