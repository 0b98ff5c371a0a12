use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{
    annotation::{IonizationTable, IonizationType},
    parse_json::{ParseJson, use_serde},
    spectrum::{PeakList, TandemMassPeak, Tolerance},
};

/// The settings used to match fragments to peaks.
///
/// All fields have defaults so a partial JSON configuration is enough:
/// ```
/// # use mzfrag::prelude::*;
/// let parameters = MatchingParameters::from_json(r#"{"ionization_index": 3}"#).unwrap();
/// assert_eq!(parameters.ionization_type().unwrap().name, "[M+Na]+");
/// assert_eq!(parameters.maximum_tree_depth, 2);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MatchingParameters {
    /// The index of the precursor ionisation type in the table for the chosen polarity
    pub ionization_index: usize,
    /// The polarity, `true` for positive mode
    pub positive: bool,
    /// The maximal number of hydrogen shifts considered, the depth of a fragment limits this further
    pub maximum_tree_depth: u8,
    /// The tolerance used for peaks created from these settings
    pub tolerance: Tolerance,
    /// All known ionisation types
    pub ionization_types: IonizationTable,
}

impl Default for MatchingParameters {
    fn default() -> Self {
        Self {
            ionization_index: 1,
            positive: true,
            maximum_tree_depth: 2,
            tolerance: Tolerance::default(),
            ionization_types: IonizationTable::default(),
        }
    }
}

impl MatchingParameters {
    /// Set the precursor ionisation type and polarity
    #[must_use]
    pub fn ionization(self, ionization_index: usize, positive: bool) -> Self {
        Self {
            ionization_index,
            positive,
            ..self
        }
    }

    /// Set the maximal number of hydrogen shifts
    #[must_use]
    pub fn maximum_tree_depth(self, maximum_tree_depth: u8) -> Self {
        Self {
            maximum_tree_depth,
            ..self
        }
    }

    /// Set the tolerance
    #[must_use]
    pub fn tolerance(self, tolerance: Tolerance) -> Self {
        Self { tolerance, ..self }
    }

    /// Set the ionisation table
    #[must_use]
    pub fn ionization_types(self, ionization_types: IonizationTable) -> Self {
        Self {
            ionization_types,
            ..self
        }
    }

    /// The selected ionisation type, `None` if the index does not exist for the polarity.
    pub fn ionization_type(&self) -> Option<&IonizationType> {
        self.ionization_types.get(self.ionization_index, self.positive)
    }

    /// Build a peak list with the tolerance of these settings from pairs of m/z and intensity.
    pub fn peak_list(&self, peaks: impl IntoIterator<Item = (f64, f64)>) -> PeakList {
        peaks
            .into_iter()
            .map(|(mz, intensity)| TandemMassPeak::new(mz, intensity, self.tolerance))
            .collect()
    }

    /// Check that these settings are usable.
    /// # Errors
    /// If the ionisation table is invalid, if the ionisation index does not exist for the
    /// polarity, or if the tolerance is negative or not finite.
    pub fn validate(&self) -> Result<(), BoxedError<'static, BasicKind>> {
        self.ionization_types.validate()?;
        let types = self.ionization_types.types(self.positive);
        if self.ionization_index >= types.len() {
            return Err(BoxedError::new(
                BasicKind::Error,
                "Invalid ionisation index",
                format!(
                    "There are {} {} ionisation types but index {} was selected",
                    types.len(),
                    if self.positive { "positive" } else { "negative" },
                    self.ionization_index
                ),
                Context::none(),
            ));
        }
        if !self.tolerance.is_valid() {
            return Err(BoxedError::new(
                BasicKind::Error,
                "Invalid tolerance",
                "The tolerance has to be finite and cannot be negative",
                Context::show(format!("{:?}", self.tolerance)),
            ));
        }
        Ok(())
    }
}

impl ParseJson for MatchingParameters {
    fn from_json_value(value: serde_json::Value) -> Result<Self, BoxedError<'static, BasicKind>> {
        let parameters: Self = use_serde(value)?;
        parameters.validate()?;
        Ok(parameters)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use crate::{annotation::MatchingParameters, parse_json::ParseJson, spectrum::Tolerance};

    #[test]
    fn builder() {
        let parameters = MatchingParameters::default()
            .ionization(1, false)
            .maximum_tree_depth(3)
            .tolerance(Tolerance::new_ppm(10.0));
        assert_eq!(parameters.ionization_type().unwrap().name, "[M-H]-");
        assert_eq!(parameters.maximum_tree_depth, 3);
        assert!(parameters.validate().is_ok());
        let invalid = parameters.ionization(5, false);
        assert!(invalid.ionization_type().is_none());
        assert!(invalid.validate().is_err());
        assert!(
            MatchingParameters::default()
                .tolerance(Tolerance::new(f64::NAN, 0.0))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn peak_list() {
        let peaks = MatchingParameters::default()
            .tolerance(Tolerance::new_absolute(0.01))
            .peak_list([(200.0, 5.0), (100.0, 10.0)]);
        assert_eq!(peaks.len(), 2);
        let first = peaks.get(0).unwrap();
        assert_eq!(first.tolerance, Tolerance::new_absolute(0.01));
        assert!((first.mz - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json() {
        let parameters = MatchingParameters::from_json(
            r#"{"ionization_index": 2, "positive": false, "tolerance": {"ppm": 20.0}}"#,
        )
        .unwrap();
        assert_eq!(parameters.ionization_type().unwrap().name, "[M+Cl]-");
        assert_eq!(parameters.tolerance, Tolerance::new(20.0, 0.001));
        assert_eq!(
            MatchingParameters::from_json("{}").unwrap(),
            MatchingParameters::default()
        );
        assert!(
            MatchingParameters::from_json(r#"{"ionization_index": 5, "positive": false}"#)
                .is_err()
        );
        assert!(MatchingParameters::from_json(r#"{"positive": "yes"}"#).is_err());
        assert!(MatchingParameters::from_json("{").is_err());
    }
}
