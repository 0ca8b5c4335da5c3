use crate::error::Error;
use crate::{muted_error, weak_error};
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;

/// Tracer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Number of leading frames that belong to the redirect machinery itself.
    pub skip_frames: usize,
    /// Deployment root, stripped from the start of every file path.
    pub root_prefix: String,
    /// Paths longer than this (in characters) are shortened.
    pub max_path_len: usize,
    /// Number of trailing characters kept from a shortened path.
    pub path_tail_len: usize,
    /// Requests under this path are back-office requests and never intercepted.
    pub admin_prefix: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            skip_frames: 4,
            root_prefix: "/var/www".to_string(),
            max_path_len: 80,
            path_tail_len: 77,
            admin_prefix: "/admin".to_string(),
        }
    }
}

impl TraceConfig {
    const DEFAULT_PATH: &'static str = ".config/redirect-trace/config.toml";

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(data: &str) -> Result<Self, Error> {
        let config: TraceConfig = toml::de::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file.
    ///
    /// # Arguments
    ///
    /// * `path`: explicit config path, any read or parse error is returned.
    ///   If `None`, the user config at `$HOME/.config/redirect-trace/config.toml` is used
    ///   when it exists and is valid, otherwise the default configuration is returned.
    pub fn from_file(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            None => {
                let Some(data) = home::home_dir()
                    .map(|home| home.join(Self::DEFAULT_PATH))
                    .and_then(|path| muted_error!(read_to_string(path)))
                else {
                    return Ok(Self::default());
                };
                Ok(weak_error!(Self::from_toml(&data), "user config ignored:").unwrap_or_default())
            }
            Some(path) => {
                let data = read_to_string(path)
                    .map_err(|source| Error::ConfigRead {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Self::from_toml(&data)
            }
        }
    }

    /// Check that a shortened path never exceeds the length threshold.
    pub fn validate(&self) -> Result<(), Error> {
        if self.path_tail_len + 3 > self.max_path_len {
            return Err(Error::InvalidConfig(format!(
                "path_tail_len ({}) plus the \"...\" stub must not exceed max_path_len ({})",
                self.path_tail_len, self.max_path_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = TraceConfig::from_toml(
            r#"
            root_prefix = "/srv/app"
            admin_prefix = "/wp-admin"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_prefix, "/srv/app");
        assert_eq!(config.admin_prefix, "/wp-admin");
        assert_eq!(config.skip_frames, 4);
        assert_eq!(config.max_path_len, 80);
        assert_eq!(config.path_tail_len, 77);
    }

    #[test]
    fn test_invalid_config() {
        struct TestCase {
            input: &'static str,
            valid: bool,
        }

        let cases = [
            TestCase {
                input: "",
                valid: true,
            },
            TestCase {
                input: "max_path_len = 40\npath_tail_len = 37",
                valid: true,
            },
            TestCase {
                input: "max_path_len = 40\npath_tail_len = 38",
                valid: false,
            },
            TestCase {
                input: "skip_frames = \"four\"",
                valid: false,
            },
        ];

        for tc in cases {
            assert_eq!(TraceConfig::from_toml(tc.input).is_ok(), tc.valid, "{}", tc.input);
        }
    }

    #[test]
    fn test_explicit_file() {
        let path = std::env::temp_dir().join(format!("redirect-trace-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "skip_frames = 2").unwrap();
        drop(file);

        let config = TraceConfig::from_file(Some(path.as_path())).unwrap();
        assert_eq!(config.skip_frames, 2);
        std::fs::remove_file(&path).unwrap();

        let err = TraceConfig::from_file(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
