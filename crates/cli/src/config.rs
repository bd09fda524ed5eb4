//! Remote snapshot settings for `tokendiff report`.
//!
//! Settings are layered: command-line flag, then `TOKENDIFF_*` environment
//! variable, then the optional TOML config file, then the built-in default.
//!
//! # Example
//!
//! ```toml
//! [remote]
//! base_url = "https://raw.githubusercontent.com/adobe/spectrum-tokens"
//! package_path = "packages/tokens"
//! tag_prefix = "@adobe/spectrum-tokens@"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Raw content host used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/adobe/spectrum-tokens";

/// Directory inside the repository that holds `manifest.json`.
pub const DEFAULT_PACKAGE_PATH: &str = "packages/tokens";

/// Prepended to `--*-version` values to form the release tag.
pub const DEFAULT_TAG_PREFIX: &str = "@adobe/spectrum-tokens@";

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tokendiff.toml";

pub const ENV_REMOTE_URL: &str = "TOKENDIFF_REMOTE_URL";
pub const ENV_PACKAGE_PATH: &str = "TOKENDIFF_PACKAGE_PATH";
pub const ENV_TAG_PREFIX: &str = "TOKENDIFF_TAG_PREFIX";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Contents of a `tokendiff.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub remote: RemoteSection,
}

/// `[remote]` table. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSection {
    pub base_url: Option<String>,
    pub package_path: Option<String>,
    pub tag_prefix: Option<String>,
}

/// Values given on the command line. `None` defers to the lower layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteFlags<'a> {
    pub base_url: Option<&'a str>,
    pub package_path: Option<&'a str>,
    pub tag_prefix: Option<&'a str>,
}

/// Fully resolved remote settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub package_path: String,
    pub tag_prefix: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            package_path: DEFAULT_PACKAGE_PATH.to_string(),
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }
}

impl RemoteConfig {
    /// Release tag for a published version.
    pub fn tag_for(&self, version: &str) -> String {
        format!("{}{}", self.tag_prefix, version)
    }

    /// Merge the layers. `env` looks up an environment variable by name.
    pub fn resolve(
        flags: RemoteFlags<'_>,
        env: impl Fn(&str) -> Option<String>,
        file: &ConfigFile,
    ) -> Self {
        let pick = |flag: Option<&str>, var: &str, from_file: &Option<String>, default: &str| {
            flag.map(str::to_string)
                .or_else(|| env(var).filter(|v| !v.is_empty()))
                .or_else(|| from_file.clone())
                .unwrap_or_else(|| default.to_string())
        };

        let base_url = pick(
            flags.base_url,
            ENV_REMOTE_URL,
            &file.remote.base_url,
            DEFAULT_BASE_URL,
        );
        let package_path = pick(
            flags.package_path,
            ENV_PACKAGE_PATH,
            &file.remote.package_path,
            DEFAULT_PACKAGE_PATH,
        );
        let tag_prefix = pick(
            flags.tag_prefix,
            ENV_TAG_PREFIX,
            &file.remote.tag_prefix,
            DEFAULT_TAG_PREFIX,
        );

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            package_path: package_path.trim_matches('/').to_string(),
            tag_prefix,
        }
    }
}

/// Read and parse a config file.
pub fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config file for this run.
///
/// An explicit path must exist. Without one, `tokendiff.toml` in `dir` is
/// used if present, and an empty config otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = explicit {
        return read_config_file(path);
    }
    let implicit = dir.join(DEFAULT_CONFIG_FILE);
    if implicit.is_file() {
        tracing::debug!(path = %implicit.display(), "using config file");
        return read_config_file(&implicit);
    }
    Ok(ConfigFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn file_with(base_url: &str) -> ConfigFile {
        ConfigFile {
            remote: RemoteSection {
                base_url: Some(base_url.to_string()),
                package_path: Some("tokens".to_string()),
                tag_prefix: None,
            },
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = RemoteConfig::resolve(RemoteFlags::default(), env_of(&[]), &ConfigFile::default());
        assert_eq!(config, RemoteConfig::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let config = RemoteConfig::resolve(
            RemoteFlags::default(),
            env_of(&[]),
            &file_with("https://mirror.example.com/"),
        );
        assert_eq!(config.base_url, "https://mirror.example.com");
        assert_eq!(config.package_path, "tokens");
        assert_eq!(config.tag_prefix, DEFAULT_TAG_PREFIX);
    }

    #[test]
    fn env_overrides_file_and_flag_overrides_env() {
        let env = env_of(&[
            (ENV_REMOTE_URL, "https://env.example.com"),
            (ENV_TAG_PREFIX, "v"),
        ]);
        let config = RemoteConfig::resolve(
            RemoteFlags::default(),
            &env,
            &file_with("https://file.example.com"),
        );
        assert_eq!(config.base_url, "https://env.example.com");
        assert_eq!(config.tag_prefix, "v");

        let flags = RemoteFlags {
            base_url: Some("https://flag.example.com"),
            ..RemoteFlags::default()
        };
        let config = RemoteConfig::resolve(flags, &env, &file_with("https://file.example.com"));
        assert_eq!(config.base_url, "https://flag.example.com");
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let config = RemoteConfig::resolve(
            RemoteFlags::default(),
            env_of(&[(ENV_PACKAGE_PATH, "")]),
            &ConfigFile::default(),
        );
        assert_eq!(config.package_path, DEFAULT_PACKAGE_PATH);
    }

    #[test]
    fn parses_remote_table() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            [remote]
            base_url = "https://example.com/tokens"
            tag_prefix = "release-"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.remote.base_url.as_deref(), Some("https://example.com/tokens"));
        assert_eq!(parsed.remote.package_path, None);
        assert_eq!(parsed.remote.tag_prefix.as_deref(), Some("release-"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: Result<ConfigFile, _> = toml::from_str("[remote]\nbase = \"x\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_implicit_file_yields_empty_config() {
        let dir = std::env::temp_dir().join("tokendiff-config-test-does-not-exist");
        assert_eq!(load_config(None, &dir).unwrap(), ConfigFile::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/tokendiff.toml")), Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("could not read config"));
    }
}
