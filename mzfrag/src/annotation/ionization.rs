use context_error::*;
use serde::{Deserialize, Serialize};

use crate::parse_json::{ParseJson, use_serde};

/// A way a neutral fragment can be ionised, with the mass it adds to the fragment.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IonizationType {
    /// The name, e.g. `[M+H]+`
    pub name: String,
    /// The mass added to the neutral mass, negative if mass is removed
    pub mass_correction: f64,
    /// If the charge is carried by a hydrogen taken from or added to the precursor, this
    /// hydrogen is then not available for hydrogen shifts.
    #[serde(default)]
    pub uses_precursor_hydrogen: bool,
}

impl IonizationType {
    /// Create a new ionisation type
    pub fn new(
        name: impl Into<String>,
        mass_correction: f64,
        uses_precursor_hydrogen: bool,
    ) -> Self {
        Self {
            name: name.into(),
            mass_correction,
            uses_precursor_hydrogen,
        }
    }
}

/// All known ionisation types, per polarity. The type at index 0 for each polarity is the
/// neutral type that is always tried as fallback when matching.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IonizationTable {
    /// The types for positive mode
    pub positive: Vec<IonizationType>,
    /// The types for negative mode
    pub negative: Vec<IonizationType>,
}

impl Default for IonizationTable {
    fn default() -> Self {
        Self {
            positive: vec![
                IonizationType::new("[M]+", 0.0, false),
                IonizationType::new("[M+H]+", 1.007276, true),
                IonizationType::new("[M+NH4]+", 18.033823, false),
                IonizationType::new("[M+Na]+", 22.989218, false),
                IonizationType::new("[M+K]+", 38.963158, false),
                IonizationType::new("[M+CH3OH+H]+", 33.033489, false),
                IonizationType::new("[M+ACN+H]+", 42.033823, false),
                IonizationType::new("[M+ACN+Na]+", 64.015765, false),
                IonizationType::new("[M+2ACN+H]+", 83.060370, false),
            ],
            negative: vec![
                IonizationType::new("[M]-", 0.0, false),
                IonizationType::new("[M-H]-", -1.007276, true),
                IonizationType::new("[M+Cl]-", 34.969402, false),
                IonizationType::new("[M+HCOO]-", 44.998201, false),
                IonizationType::new("[M+CH3COO]-", 59.013851, false),
            ],
        }
    }
}

impl IonizationTable {
    /// All types of the given polarity
    pub fn types(&self, positive: bool) -> &[IonizationType] {
        if positive {
            &self.positive
        } else {
            &self.negative
        }
    }

    /// Get the type with the given index for the given polarity
    pub fn get(&self, index: usize, positive: bool) -> Option<&IonizationType> {
        self.types(positive).get(index)
    }

    /// Find the index of the type with the given name, in either polarity
    pub fn find(&self, name: &str) -> Option<(usize, bool)> {
        self.positive
            .iter()
            .position(|t| t.name == name)
            .map(|index| (index, true))
            .or_else(|| {
                self.negative
                    .iter()
                    .position(|t| t.name == name)
                    .map(|index| (index, false))
            })
    }

    /// Check that both polarities have at least the neutral type and that all corrections are finite.
    /// # Errors
    /// If any of these conditions is not met.
    pub fn validate(&self) -> Result<(), BoxedError<'static, BasicKind>> {
        for (positive, types) in [(true, &self.positive), (false, &self.negative)] {
            if types.is_empty() {
                return Err(BoxedError::new(
                    BasicKind::Error,
                    "Invalid ionisation table",
                    format!(
                        "The {} ionisation types cannot be empty, at least the neutral type is needed",
                        if positive { "positive" } else { "negative" }
                    ),
                    Context::none(),
                ));
            }
            if let Some(invalid) = types.iter().find(|t| !t.mass_correction.is_finite()) {
                return Err(BoxedError::new(
                    BasicKind::Error,
                    "Invalid ionisation table",
                    "The mass correction of an ionisation type has to be a finite number",
                    Context::show(invalid.name.clone()),
                ));
            }
        }
        Ok(())
    }
}

impl ParseJson for IonizationTable {
    fn from_json_value(value: serde_json::Value) -> Result<Self, BoxedError<'static, BasicKind>> {
        let table: Self = use_serde(value)?;
        table.validate()?;
        Ok(table)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use crate::{annotation::IonizationTable, parse_json::ParseJson};

    #[test]
    fn default_table() {
        let table = IonizationTable::default();
        assert_eq!(table.types(true).len(), 9);
        assert_eq!(table.types(false).len(), 5);
        assert_eq!(table.find("[M+Na]+"), Some((3, true)));
        assert_eq!(table.find("[M-H]-"), Some((1, false)));
        assert_eq!(table.find("[M+Li]+"), None);
        let protonated = table.get(1, true).unwrap();
        assert!(protonated.uses_precursor_hydrogen);
        assert!((protonated.mass_correction - 1.007276).abs() < 1e-9);
        assert!(table.get(9, true).is_none());
        assert!(table.validate().is_ok());
    }

    #[test]
    fn json() {
        let table = IonizationTable::from_json(
            r#"{"positive": [{"name": "[M]+", "mass_correction": 0.0}], "negative": [{"name": "[M]-", "mass_correction": 0.0}]}"#,
        )
        .unwrap();
        assert_eq!(table.positive.len(), 1);
        assert!(!table.positive[0].uses_precursor_hydrogen);
        assert!(
            IonizationTable::from_json(
                r#"{"positive": [], "negative": [{"name": "[M]-", "mass_correction": 0.0}]}"#
            )
            .is_err()
        );
    }
}
