use crate::model::Credentials;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "cldexport";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const DEFAULT_API_URL: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const CONFIG_DIR_ENV: &str = "CLDEXPORT_CONFIG_DIR";

const REDACTED: &str = "********";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause}")]
    FailedToLoadData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write configuration data to file, because of: {cause}")]
    FailedToWriteData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Persistent settings stored in the user's configuration directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cloud_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

impl Configuration {
    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        match config_dir() {
            Some(configuration_directory) => {
                let mut default_config_file_path = configuration_directory;
                default_config_file_path.push(DEFAULT_APPLICATION_ID);
                default_config_file_path.push(DEFAULT_CONFIGURATION_FILE_NAME);

                Ok(default_config_file_path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    /// Load the default configuration file. A missing file yields an empty
    /// configuration so first-time users can run `config set`.
    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading configuration from {}...", default_file_path.display());

        if !default_file_path.exists() {
            debug!("Configuration file not found, using defaults");
            return Ok(Configuration::default());
        }

        Configuration::load_from_file(&default_file_path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        let content = fs::read_to_string(path)
            .map_err(|cause| ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            })?;

        serde_yaml::from_str(&content).map_err(|cause| ConfigurationError::FailedToLoadData {
            cause: Box::new(cause),
        })
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        // make sure the parent directory exists before creating the file
        match path.parent() {
            Some(directory) if !directory.as_os_str().is_empty() => {
                fs::create_dir_all(directory)
                    .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
            }
            Some(_) => (),
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        let file = File::create(path)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
        self.write(file)?;
        debug!("Configuration saved to {}", path.display());

        Ok(())
    }

    pub fn save_to_default(&self) -> Result<(), ConfigurationError> {
        self.save(&Self::get_default_configuration_file_path()?)
    }

    pub fn cloud_name(&self) -> Option<&str> {
        self.cloud_name.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn api_secret(&self) -> Option<&str> {
        self.api_secret.as_deref()
    }

    pub fn set_credentials(&mut self, credentials: &Credentials) {
        self.cloud_name = Some(credentials.cloud_name().to_string());
        self.api_key = Some(credentials.api_key().to_string());
        self.api_secret = Some(credentials.api_secret().to_string());
    }

    /// Admin API root without the cloud name segment.
    pub fn api_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => DEFAULT_API_URL.to_string(),
        }
    }

    pub fn set_api_url(&mut self, url: Option<Url>) {
        self.api_url = url;
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn set_timeout_secs(&mut self, timeout_secs: Option<u64>) {
        self.timeout_secs = timeout_secs;
    }

    /// Copy safe to print: the API secret is masked.
    pub fn redacted(&self) -> Configuration {
        let mut copy = self.clone();
        if copy.api_secret.is_some() {
            copy.api_secret = Some(REDACTED.to_string());
        }
        copy
    }

    pub fn to_yaml(&self) -> Result<String, ConfigurationError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn credentials() -> Credentials {
        Credentials::new("demo", "123456789", "s3cr3t").unwrap()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_CONFIGURATION_FILE_NAME);

        let mut configuration = Configuration::default();
        configuration.set_credentials(&credentials());
        configuration.set_timeout_secs(Some(15));
        configuration.save(&path).unwrap();

        let loaded = Configuration::load_from_file(&path).unwrap();
        assert_eq!(loaded, configuration);
        assert_eq!(loaded.cloud_name(), Some("demo"));
        assert_eq!(loaded.api_secret(), Some("s3cr3t"));
        assert_eq!(loaded.timeout_secs(), 15);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let configuration: Configuration =
            serde_yaml::from_str("cloud_name: demo\napi_key: '123'\n").unwrap();
        assert_eq!(configuration.api_key(), Some("123"));
        assert!(configuration.api_secret().is_none());
        assert_eq!(configuration.api_url(), DEFAULT_API_URL);
        assert_eq!(configuration.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_api_url_override_drops_trailing_slash() {
        let mut configuration = Configuration::default();
        configuration.set_api_url(Some(Url::parse("http://127.0.0.1:8080/").unwrap()));
        assert_eq!(configuration.api_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_redacted_masks_secret() {
        let mut configuration = Configuration::default();
        configuration.set_credentials(&credentials());

        let yaml = configuration.redacted().to_yaml().unwrap();
        assert!(yaml.contains("cloud_name: demo"));
        assert!(!yaml.contains("s3cr3t"));
        assert!(yaml.contains(REDACTED));
    }

    #[test]
    fn test_load_from_file_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIGURATION_FILE_NAME);
        fs::write(&path, "cloud_name: [unterminated").unwrap();

        let result = Configuration::load_from_file(&path);
        assert!(matches!(
            result,
            Err(ConfigurationError::FailedToLoadData { .. })
        ));
    }
}
