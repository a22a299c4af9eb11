// Profile persistence
// Profiles are stored as a JSON array

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use super::collection::ProfileCollection;
use super::types::Profile;
use crate::error::LoadError;

impl ProfileCollection {
    /// Load profiles from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let collection = Self::load_from_json(&content)?;
        info!(
            profiles = collection.len(),
            path = %path.as_ref().display(),
            "Loaded profiles"
        );
        Ok(collection)
    }

    /// Load profiles from a JSON string
    pub fn load_from_json(json: &str) -> Result<Self, LoadError> {
        let profiles: Vec<Profile> = serde_json::from_str(json)?;
        validate(&profiles)?;
        Ok(Self::from_profiles(profiles))
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Write every profile to `path`, replacing the file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LoadError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        info!(profiles = self.len(), path = %path.as_ref().display(), "Saved profiles");
        Ok(())
    }
}

fn validate(profiles: &[Profile]) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    for profile in profiles {
        if profile.tablet.is_empty() {
            return Err(LoadError::Validation("profile without a tablet name".into()));
        }
        if !seen.insert(profile.tablet.as_str()) {
            return Err(LoadError::Validation(format!(
                "duplicate profile for '{}'",
                profile.tablet
            )));
        }
        if profile.output_mode.path.is_empty() {
            return Err(LoadError::Validation(format!(
                "{}: output mode path is empty",
                profile.tablet
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::paths;
    use crate::device::{huion_new_1060_plus, InputDevice};
    use crate::plugin::{CapabilityRegistry, PluginSettings};

    const PROFILES_JSON: &str = r#"[
        {
            "tablet": "Huion New 1060 Plus",
            "outputMode": {
                "path": "TabletDriver.Output.RelativeMode",
                "settings": [ { "property": "Sensitivity", "value": 1.5 } ]
            },
            "filters": [
                { "path": "TabletDriver.Filters.Smoothing", "enable": false }
            ],
            "bindings": { "tipActivationThreshold": 3.0 }
        }
    ]"#;

    #[test]
    fn test_load_json() {
        let collection = ProfileCollection::load_from_json(PROFILES_JSON).unwrap();
        let device = InputDevice::new(huion_new_1060_plus());
        let profile = collection.get(&device).unwrap();

        assert_eq!(profile.output_mode.path, paths::RELATIVE_MODE);
        assert_eq!(profile.output_mode.get("Sensitivity"), Some(&serde_json::json!(1.5)));
        assert!(!profile.filters[0].enable);
        assert_eq!(profile.bindings.tip_activation_threshold, 3.0);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let json = r#"[ { "tablet": "T", "outputMode": { "path": "X" } } ]"#;
        let collection = ProfileCollection::load_from_json(json).unwrap();
        let profile = &collection.snapshot()[0];
        assert!(profile.filters.is_empty());
        assert_eq!(profile.bindings.tip_activation_threshold, 1.0);
    }

    #[test]
    fn test_duplicate_rejected() {
        let json = r#"[
            { "tablet": "T", "outputMode": { "path": "X" } },
            { "tablet": "T", "outputMode": { "path": "Y" } }
        ]"#;
        match ProfileCollection::load_from_json(json) {
            Err(LoadError::Validation(msg)) => assert!(msg.contains("duplicate")),
            other => panic!("Expected validation error, got {:?}", other.map(|c| c.snapshot())),
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        let device = InputDevice::new(huion_new_1060_plus());

        let collection = ProfileCollection::new();
        let registry = CapabilityRegistry::with_builtins();
        let mut profile = collection.get_or_create_defaults(&device, &registry);
        profile.filters.push(PluginSettings::new(paths::SMOOTHING).with("Weight", 0.25));
        collection.set(&device, Some(profile.clone()));
        collection.save_to_file(&path).unwrap();

        let loaded = ProfileCollection::load_from_file(&path).unwrap();
        assert_eq!(loaded.get(&device), Some(profile));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProfileCollection::load_from_file(dir.path().join("missing.json")),
            Err(LoadError::Io(_))
        ));
    }
}
