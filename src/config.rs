//! Deployment configuration
//!
//! Loaded from `ratio-forge.yaml`. The file picks one total-assets policy for
//! the whole deployment; CLI flags and environment variables override
//! individual values after loading.

use crate::api::server::ApiConfig;
use crate::error::{RatioError, RatioResult};
use crate::types::{AnalysisOptions, HeaderMode, TotalAssetsPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Looked up in the working directory when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "ratio-forge.yaml";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: ProfileSettings,
    pub narrative: NarrativeSettings,
    pub server: ApiConfig,
}

/// Calculator behaviour for this deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub total_assets_policy: TotalAssetsPolicy,
    pub header: HeaderMode,
}

impl ProfileSettings {
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            policy: self.total_assets_policy,
            header: self.header,
        }
    }
}

/// Settings passed to the narrative client; the calculator never sees these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeSettings {
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl Default for NarrativeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl NarrativeSettings {
    /// True when a non-blank API key is present
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Settings {
    /// Load from an explicit path, else `ratio-forge.yaml` if present, else defaults
    pub fn load(path: Option<&Path>) -> RatioResult<Self> {
        let settings = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    debug!("no config file, using defaults");
                    Self::default()
                }
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> RatioResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RatioError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loading config");
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> RatioResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn validate(&self) -> RatioResult<()> {
        if self.narrative.model.trim().is_empty() {
            return Err(RatioError::Config("narrative.model must not be empty".to_string()));
        }
        if self.narrative.endpoint.trim().is_empty() {
            return Err(RatioError::Config(
                "narrative.endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.profile.total_assets_policy, TotalAssetsPolicy::Lenient);
        assert_eq!(settings.profile.header, HeaderMode::Auto);
        assert_eq!(settings.narrative.model, DEFAULT_MODEL);
        assert!(!settings.narrative.is_configured());
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml("profile:\n  total_assets_policy: strict\n").unwrap();
        assert_eq!(settings.profile.total_assets_policy, TotalAssetsPolicy::Strict);
        assert_eq!(settings.profile.header, HeaderMode::Auto);
        assert_eq!(settings.narrative.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
profile:
  total_assets_policy: lenient
  header: present
narrative:
  model: custom-model
  endpoint: http://localhost:9999
  api_key: secret
server:
  host: 0.0.0.0
  port: 3000
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.profile.header, HeaderMode::Present);
        assert_eq!(settings.narrative.model, "custom-model");
        assert!(settings.narrative.is_configured());
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let err = Settings::from_yaml("profile:\n  total_assets_policy: maybe\n").unwrap_err();
        assert!(matches!(err, RatioError::Yaml(_)));
    }

    #[test]
    fn test_validate_rejects_blank_model() {
        let mut settings = Settings::default();
        settings.narrative.model = " ".to_string();
        assert!(matches!(settings.validate(), Err(RatioError::Config(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile:\n  total_assets_policy: strict").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.profile.options().policy, TotalAssetsPolicy::Strict);
    }

    #[test]
    fn test_load_missing_path_fails() {
        let err = Settings::load(Some(Path::new("/nonexistent/ratio-forge.yaml"))).unwrap_err();
        assert!(matches!(err, RatioError::Config(_)));
    }

    #[test]
    fn test_blank_api_key_not_configured() {
        let settings = NarrativeSettings {
            api_key: Some("   ".to_string()),
            ..NarrativeSettings::default()
        };
        assert!(!settings.is_configured());
    }
}
