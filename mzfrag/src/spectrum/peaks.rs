use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::spectrum::TandemMassPeak;

/// A list of peaks, always sorted by m/z. A peak is identified by its index in this list.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PeakList {
    peaks: Vec<TandemMassPeak>,
}

impl PeakList {
    /// Create a new peak list, the peaks are sorted by m/z
    pub fn new(mut peaks: Vec<TandemMassPeak>) -> Self {
        peaks.sort_by_key(|p| OrderedFloat(p.mz));
        Self { peaks }
    }

    /// Get the peak at the given index
    pub fn get(&self, index: usize) -> Option<&TandemMassPeak> {
        self.peaks.get(index)
    }

    /// The number of peaks
    pub const fn len(&self) -> usize {
        self.peaks.len()
    }

    /// Check if there are no peaks
    pub const fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Iterate over all peaks in ascending m/z order
    pub fn iter(&self) -> std::slice::Iter<'_, TandemMassPeak> {
        self.peaks.iter()
    }
}

impl FromIterator<TandemMassPeak> for PeakList {
    fn from_iter<T: IntoIterator<Item = TandemMassPeak>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PeakList {
    type Item = &'a TandemMassPeak;
    type IntoIter = std::slice::Iter<'a, TandemMassPeak>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use crate::spectrum::{PeakList, TandemMassPeak, Tolerance};

    #[test]
    fn sorted() {
        let tolerance = Tolerance::default();
        let peaks: PeakList = [300.0, 100.0, 200.0]
            .into_iter()
            .map(|mz| TandemMassPeak::new(mz, 1.0, tolerance))
            .collect();
        assert_eq!(peaks.len(), 3);
        assert_eq!(
            peaks.iter().map(|p| p.mz).collect::<Vec<_>>(),
            vec![100.0, 200.0, 300.0]
        );
        assert!(peaks.get(3).is_none());
        assert!(PeakList::default().is_empty());
    }
}
