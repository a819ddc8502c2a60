//! Configuration management
//!
//! Compatible with the desktop app settings.json format:
//! ```json
//! {
//!   "datastore": { "kind": "http", "baseUrl": "...", "apiKey": "..." },
//!   "importProfiles": { "profiles": { ... } }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::FieldMapping;

/// Raw settings.json structure (matching the desktop app format)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    datastore: DatastoreConfig,
    #[serde(default)]
    import_profiles: ImportProfilesContainer,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportProfilesContainer {
    #[serde(default)]
    profiles: HashMap<String, ImportProfile>,
}

/// Which record sink to talk to, and how
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatastoreConfig {
    #[serde(default)]
    pub kind: DatastoreKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            kind: DatastoreKind::Http,
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8090".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreKind {
    #[default]
    Http,
    Memory,
}

/// Saved column mappings for re-running an import without the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProfile {
    /// Registry the profile was saved for, as its collection name
    pub entity: String,
    #[serde(default)]
    pub mappings: Vec<FieldMapping>,
}

/// Tallybook configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub datastore: DatastoreConfig,
    pub import_profiles: HashMap<String, ImportProfile>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the tallybook directory
    ///
    /// The API key can come from:
    /// 1. Settings file
    /// 2. Environment variable TALLYBOOK_API_KEY (for CI/testing)
    pub fn load(tallybook_dir: &Path) -> Result<Self> {
        let settings_path = tallybook_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let mut datastore = raw.datastore.clone();
        if let Ok(key) = std::env::var("TALLYBOOK_API_KEY") {
            if !key.is_empty() {
                datastore.api_key = Some(key);
            }
        }

        Ok(Self {
            datastore,
            import_profiles: raw.import_profiles.profiles.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the tallybook directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, tallybook_dir: &Path) -> Result<()> {
        let settings_path = tallybook_dir.join("settings.json");

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        // Update only the fields we manage
        settings.datastore = self.datastore.clone();
        settings.import_profiles.profiles = self.import_profiles.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn profile(&self, name: &str) -> Option<&ImportProfile> {
        self.import_profiles.get(name)
    }

    pub fn set_profile(&mut self, name: impl Into<String>, profile: ImportProfile) {
        self.import_profiles.insert(name.into(), profile);
    }

    pub fn remove_profile(&mut self, name: &str) -> bool {
        self.import_profiles.remove(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_settings_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.datastore.kind, DatastoreKind::Http);
        assert_eq!(config.datastore.base_url, "http://localhost:8090");
        assert!(config.import_profiles.is_empty());
    }

    #[test]
    fn test_load_tolerates_corrupt_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.datastore.kind, DatastoreKind::Http);
    }

    #[test]
    fn test_save_preserves_unmanaged_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"theme": "dark", "datastore": {"kind": "memory"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.datastore.kind, DatastoreKind::Memory);

        config.set_profile(
            "bank-customers",
            ImportProfile {
                entity: "customers".to_string(),
                mappings: vec![FieldMapping {
                    source: "Customer Name".to_string(),
                    target: "name".to_string(),
                }],
            },
        );
        config.save(dir.path()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("settings.json")).unwrap())
                .unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(
            raw["importProfiles"]["profiles"]["bank-customers"]["entity"],
            "customers"
        );
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.set_profile(
            "vendors-q1",
            ImportProfile {
                entity: "vendors".to_string(),
                mappings: vec![],
            },
        );
        config.save(dir.path()).unwrap();

        let mut reloaded = Config::load(dir.path()).unwrap();
        assert!(reloaded.profile("vendors-q1").is_some());
        assert!(reloaded.remove_profile("vendors-q1"));
        assert!(!reloaded.remove_profile("vendors-q1"));
    }
}
