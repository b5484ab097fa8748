//! Configuration for the file-scoped operations.
//!
//! The only tunable is where [`write_value`](crate::ops::write_value) stages
//! its temporary copy. By default it is the current working directory.
//!
//! Applications can also keep the settings in a YAML file:
//!
//! ```yaml
//! temp_dir: /var/tmp
//! ```
//!
//! # Examples
//!
//! ```
//! use inifile::config::FileOpsConfig;
//! use std::path::Path;
//!
//! let config = FileOpsConfig::builder()
//!     .temp_dir("/var/tmp")
//!     .build();
//!
//! assert_eq!(
//!     config.temp_path(Path::new("/etc/app/settings.ini")),
//!     Path::new("/var/tmp/settings.ini.tmp")
//! );
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Suffix appended to the source file name for the staging copy.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Settings shared by every call made through a [`FileOps`](crate::ops::FileOps).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOpsConfig {
    /// Directory for temporary files; `None` means the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl FileOpsConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> FileOpsConfigBuilder {
        FileOpsConfigBuilder::default()
    }

    /// Parse a configuration from YAML text.
    ///
    /// Missing fields take their defaults, so an empty mapping yields
    /// [`FileOpsConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the YAML is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use inifile::FileOpsConfig;
    ///
    /// let config = FileOpsConfig::from_yaml("temp_dir: scratch\n").unwrap();
    /// assert_eq!(config, FileOpsConfig::builder().temp_dir("scratch").build());
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileHandling`] if the file cannot be read and
    /// [`Error::Configuration`] if its contents are invalid.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::file_handling(path, e))?;
        let config = Self::from_yaml(&contents)?;
        log::debug!("Loaded file operation settings from {}", path.display());
        Ok(config)
    }

    /// The preferred staging path used while rewriting `source`.
    ///
    /// The name is derived from the source's base name so concurrent
    /// rewrites of different files do not collide. The store picks another
    /// name starting with this one when the path is already taken, see
    /// [`FileStore::create_temp`](crate::store::FileStore::create_temp).
    #[must_use]
    pub fn temp_path(&self, source: &Path) -> PathBuf {
        let mut name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "inifile".into());
        name.push(TEMP_SUFFIX);

        match &self.temp_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// Builder for [`FileOpsConfig`].
#[derive(Debug, Clone, Default)]
pub struct FileOpsConfigBuilder {
    temp_dir: Option<PathBuf>,
}

impl FileOpsConfigBuilder {
    /// Stage temporary files in `dir` instead of the working directory.
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> FileOpsConfig {
        FileOpsConfig {
            temp_dir: self.temp_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_working_directory() {
        let config = FileOpsConfig::default();
        assert_eq!(
            config.temp_path(Path::new("/etc/app/settings.ini")),
            PathBuf::from("settings.ini.tmp")
        );
    }

    #[test]
    fn test_builder_sets_temp_dir() {
        let config = FileOpsConfig::builder().temp_dir("/scratch").build();
        assert_eq!(config.temp_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(
            config.temp_path(Path::new("relative/app.ini")),
            PathBuf::from("/scratch/app.ini.tmp")
        );
    }

    #[test]
    fn test_temp_name_never_equals_source() {
        let config = FileOpsConfig::default();
        let source = Path::new("app.ini");
        assert_ne!(config.temp_path(source), source);
    }

    #[test]
    fn test_from_yaml() {
        let config = FileOpsConfig::from_yaml("temp_dir: /scratch\n").unwrap();
        assert_eq!(config.temp_dir, Some(PathBuf::from("/scratch")));

        assert_eq!(FileOpsConfig::from_yaml("").unwrap(), FileOpsConfig::default());
        assert_eq!(FileOpsConfig::from_yaml("{}").unwrap(), FileOpsConfig::default());
    }

    #[test]
    fn test_from_yaml_rejects_invalid_text() {
        let err = FileOpsConfig::from_yaml("invalid: yaml: syntax:").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_load_yaml_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("inifile.yaml");
        fs::write(&path, "temp_dir: staging\n").unwrap();

        let config = FileOpsConfig::load_yaml(&path).unwrap();
        assert_eq!(config.temp_dir, Some(PathBuf::from("staging")));
    }

    #[test]
    fn test_load_yaml_missing_file() {
        let err = FileOpsConfig::load_yaml("/nonexistent/inifile.yaml").unwrap_err();
        assert!(err.is_file_handling());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = FileOpsConfig::builder().temp_dir("/scratch").build();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"temp_dir":"/scratch"}"#);

        let parsed: FileOpsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, FileOpsConfig::default());
    }
}
