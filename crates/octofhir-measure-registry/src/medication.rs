//! Medication class lexicons

use octofhir_measure_diagnostics::{MQ0106, MeasureError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A medication class matched against free-text drug names
///
/// The lexicon is a list of name fragments (`"lisinopril"`, `"sartan"`),
/// matched case-insensitively anywhere in the medication name. Fragments are
/// compiled once into a single alternation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MedicationClassDef", into = "MedicationClassDef")]
pub struct MedicationClass {
    id: String,
    fragments: Vec<String>,
    pattern: Regex,
}

impl MedicationClass {
    pub fn new<I, S>(id: impl Into<String>, fragments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = id.into();
        let fragments: Vec<String> = fragments
            .into_iter()
            .map(|f| f.as_ref().trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .collect();

        if fragments.is_empty() {
            return Err(MeasureError::configuration(
                MQ0106,
                format!("medication class '{}' has an empty lexicon", id),
            ));
        }

        let alternation = fragments.iter().map(|f| regex::escape(f)).collect::<Vec<_>>().join("|");
        let pattern = Regex::new(&format!("(?i)(?:{})", alternation)).map_err(|e| {
            MeasureError::configuration(
                MQ0106,
                format!("medication class '{}' cannot be compiled: {}", id, e),
            )
        })?;

        Ok(Self {
            id,
            fragments,
            pattern,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Does the free-text medication name belong to this class
    pub fn matches(&self, medication_name: &str) -> bool {
        self.pattern.is_match(medication_name)
    }
}

impl PartialEq for MedicationClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.fragments == other.fragments
    }
}

#[derive(Serialize, Deserialize)]
struct MedicationClassDef {
    id: String,
    lexicon: Vec<String>,
}

impl TryFrom<MedicationClassDef> for MedicationClass {
    type Error = MeasureError;

    fn try_from(def: MedicationClassDef) -> Result<Self> {
        MedicationClass::new(def.id, def.lexicon)
    }
}

impl From<MedicationClass> for MedicationClassDef {
    fn from(class: MedicationClass) -> Self {
        MedicationClassDef {
            id: class.id,
            lexicon: class.fragments,
        }
    }
}
