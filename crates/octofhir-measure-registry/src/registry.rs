//! Versioned code set registry
//!
//! The registry is loaded once at startup and shared read-only by every
//! evaluator. Cloning is cheap; specs are handed out as `Arc`s so the lock is
//! only held while a spec is looked up.

use crate::spec::MeasureSpec;
use indexmap::IndexMap;
use log::{debug, info};
use octofhir_measure_diagnostics::{
    MQ0100, MQ0107, MQ0108, MQ0401, MQ0402, MeasureError, Result,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Built-in MY2025 measure catalogue
const BUILTIN_CATALOGUE: &str = include_str!("../data/hedis_my2025.json");

/// Serialized registry contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub version: String,
    pub measures: Vec<MeasureSpec>,
}

#[derive(Debug)]
struct RegistryState {
    version: String,
    measures: IndexMap<String, Arc<MeasureSpec>>,
}

/// Measure specifications keyed by measure id
#[derive(Debug, Clone)]
pub struct CodeSetRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl CodeSetRegistry {
    /// Create an empty registry
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState {
                version: version.into(),
                measures: IndexMap::new(),
            })),
        }
    }

    /// Build from a catalogue, validating every spec
    pub fn from_catalogue(catalogue: Catalogue) -> Result<Self> {
        let registry = Self::new(catalogue.version);
        let mut errors = Vec::new();
        for spec in catalogue.measures {
            if let Err(e) = registry.register(spec) {
                errors.push(e);
            }
        }

        match errors.len() {
            0 => {
                info!(
                    "Loaded measure catalogue {} ({} measures)",
                    registry.version(),
                    registry.len()
                );
                Ok(registry)
            }
            1 => Err(errors.remove(0)),
            _ => Err(MeasureError::Multiple(errors)),
        }
    }

    /// Load a catalogue from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let catalogue: Catalogue = serde_json::from_str(json).map_err(|e| {
            MeasureError::configuration(MQ0107, format!("invalid measure catalogue: {}", e))
        })?;
        Self::from_catalogue(catalogue)
    }

    /// Load a catalogue from a JSON file at runtime
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MeasureError::system(MQ0401, format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
            .map_err(|e| e.with_context(format!("while loading {}", path.display())))
    }

    /// Load a catalogue based on the file extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            Some(ext) => Err(MeasureError::system(
                MQ0402,
                format!("Unsupported file extension: .{}. Expected .json", ext),
            )),
            None => Err(MeasureError::system(
                MQ0402,
                "No file extension found. Expected .json",
            )),
        }
    }

    /// The built-in MY2025 catalogue (BCS, COL, EED, KED, PDC-RASA, PDC-STA, PDC-DR, SUPD)
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOGUE)
    }

    /// Validate and add a spec
    pub fn register(&self, spec: MeasureSpec) -> Result<()> {
        spec.validate()?;

        let mut state = self.state.write();
        if state.measures.contains_key(&spec.id) {
            return Err(MeasureError::configuration_for(
                MQ0108,
                spec.id.clone(),
                format!("measure '{}' is already registered", spec.id),
            ));
        }
        debug!("Registered measure {} ({})", spec.id, spec.name);
        state.measures.insert(spec.id.clone(), Arc::new(spec));
        Ok(())
    }

    /// Look up a measure; unknown ids are a configuration error
    pub fn get(&self, measure_id: &str) -> Result<Arc<MeasureSpec>> {
        let state = self.state.read();
        state
            .measures
            .get(measure_id)
            .or_else(|| {
                state
                    .measures
                    .iter()
                    .find(|(id, _)| id.eq_ignore_ascii_case(measure_id))
                    .map(|(_, spec)| spec)
            })
            .cloned()
            .ok_or_else(|| {
                MeasureError::configuration(MQ0100, format!("unknown measure '{}'", measure_id))
                    .with_context(format!(
                        "available measures: {}",
                        state.measures.keys().cloned().collect::<Vec<_>>().join(", ")
                    ))
            })
    }

    pub fn contains(&self, measure_id: &str) -> bool {
        self.get(measure_id).is_ok()
    }

    /// Measure ids in catalogue order
    pub fn ids(&self) -> Vec<String> {
        self.state.read().measures.keys().cloned().collect()
    }

    /// All specs in catalogue order
    pub fn measures(&self) -> Vec<Arc<MeasureSpec>> {
        self.state.read().measures.values().cloned().collect()
    }

    pub fn version(&self) -> String {
        self.state.read().version.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().measures.is_empty()
    }

    /// Snapshot the registry as a serializable catalogue
    pub fn to_catalogue(&self) -> Catalogue {
        let state = self.state.read();
        Catalogue {
            version: state.version.clone(),
            measures: state.measures.values().map(|s| (**s).clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::CombinationRule;
    use std::io::Write;

    const CATALOGUE: &str = r#"{
        "version": "TEST-1",
        "measures": [{
            "id": "BCS",
            "name": "Breast Cancer Screening",
            "age_min": 50,
            "age_max": 74,
            "genders": ["F"],
            "modalities": [{"id": "mammography", "label": "Mammography",
                            "source": "procedure", "codes": ["77067"], "lookback_years": 1}],
            "rule": {"type": "any_of"}
        }]
    }"#;

    #[test]
    fn test_registry_from_json() {
        let registry = CodeSetRegistry::from_json(CATALOGUE).unwrap();

        assert_eq!(registry.version(), "TEST-1");
        assert_eq!(registry.ids(), vec!["BCS".to_string()]);
        let spec = registry.get("BCS").unwrap();
        assert_eq!(spec.rule, CombinationRule::AnyOf);
        assert!(registry.get("bcs").is_ok());
    }

    #[test]
    fn test_unknown_measure() {
        let registry = CodeSetRegistry::from_json(CATALOGUE).unwrap();
        let err = registry.get("XYZ").unwrap_err();
        assert_eq!(err.code(), MQ0100);
        assert!(!registry.contains("XYZ"));
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = CodeSetRegistry::from_json(CATALOGUE).unwrap();
        let spec = (*registry.get("BCS").unwrap()).clone();
        assert_eq!(registry.register(spec).unwrap_err().code(), MQ0108);
    }

    #[test]
    fn test_invalid_json() {
        let err = CodeSetRegistry::from_json("{not json").unwrap_err();
        assert_eq!(err.code(), MQ0107);
    }

    #[test]
    fn test_registry_from_json_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        temp_file.write_all(CATALOGUE.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let registry = CodeSetRegistry::from_file(temp_file.path()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_file_unsupported_extension() {
        let temp_file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        let err = CodeSetRegistry::from_file(temp_file.path()).unwrap_err();
        assert_eq!(err.code(), MQ0402);
    }

    #[test]
    fn test_catalogue_roundtrip_keeps_semantics() {
        let registry = CodeSetRegistry::builtin().unwrap();
        let json = serde_json::to_string(&registry.to_catalogue()).unwrap();
        let reloaded = CodeSetRegistry::from_json(&json).unwrap();
        assert_eq!(reloaded.to_catalogue(), registry.to_catalogue());
    }
}
