//! Client configuration read from `config.toml`.

use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use taskdeck_client::HttpBackend;
use taskdeck_core::{HexColor, PaletteEntry, TagPalette};
use url::Url;

const CONFIG_DIR: &str = "taskdeck";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding an explicit configuration path.
pub const ENV_CONFIG_PATH: &str = "TASKDECK_CONFIG";

/// Client configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClientConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    palette: Vec<PaletteRow>,
}

impl ClientConfig {
    /// Load configuration from `explicit`, `$TASKDECK_CONFIG`, or the user config directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut fetch = |key: &'static str| env::var(key).ok();
        match resolve_config_path_with(explicit, &mut fetch) {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file. A missing file yields defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Parse and validate configuration text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the configured endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.backend.endpoint = Some(endpoint.into());
        self
    }

    /// Tag palette: configured entries, or the built-in table when none are given.
    pub fn palette(&self) -> TagPalette {
        if self.palette.is_empty() {
            return TagPalette::builtin();
        }
        TagPalette::from_entries(
            self.palette
                .iter()
                .map(|row| PaletteEntry::new(row.value, row.name.clone()))
                .collect(),
        )
    }

    /// Build the HTTP backend described by the `[backend]` block.
    pub fn build_backend(&self) -> Result<HttpBackend> {
        let endpoint = self
            .backend
            .endpoint
            .as_deref()
            .context("no backend endpoint configured; pass --endpoint or set [backend].endpoint")?;
        let backend = HttpBackend::new(endpoint, self.backend.timeout())
            .with_context(|| format!("failed to create backend for {endpoint}"))?;
        Ok(match &self.backend.token {
            Some(token) => backend.with_bearer_token(token),
            None => backend,
        })
    }

    fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.ensure_unique_palette()
    }

    fn ensure_unique_palette(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for row in &self.palette {
            if row.name.trim().is_empty() {
                bail!("palette entry {} has an empty name", row.value);
            }
            if !seen.insert(row.value) {
                bail!("duplicate palette color detected: {}", row.value);
            }
        }
        Ok(())
    }
}

/// `[backend]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Endpoint URL receiving every action.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token sent with each request.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl BackendConfig {
    /// Request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("backend.timeout_secs must be greater than zero");
        }
        if let Some(endpoint) = &self.endpoint {
            let url = Url::parse(endpoint.trim())
                .with_context(|| format!("backend.endpoint '{endpoint}' is not a valid URL"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("backend.endpoint must use http or https, got '{}'", url.scheme());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PaletteRow {
    value: HexColor,
    name: String,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Default location: `<config_dir>/taskdeck/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

fn resolve_config_path_with(
    explicit: Option<&Path>,
    fetch: &mut impl FnMut(&'static str) -> Option<String>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    fetch(ENV_CONFIG_PATH)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(default_config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = ClientConfig::from_path(dir.path().join("absent.toml"))?;
        assert!(config.backend.endpoint.is_none());
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));
        assert_eq!(config.palette().entries().len(), TagPalette::builtin().entries().len());
        Ok(())
    }

    #[test]
    fn loads_backend_and_palette_from_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r##"
[backend]
endpoint = "https://tasks.example.com/api.php"
timeout_secs = 5
token = "secret"

[[palette]]
value = "#F44336"
name = "Red"

[[palette]]
value = "#2196F3"
name = "Blue"
"##,
        )?;

        let config = ClientConfig::from_path(&path)?;
        assert_eq!(config.backend.timeout(), Duration::from_secs(5));
        assert_eq!(config.backend.token.as_deref(), Some("secret"));
        let palette = config.palette();
        assert_eq!(palette.entries().len(), 2);
        assert_eq!(palette.name_of(HexColor::from_rgb(0x0021_96F3)), Some("Blue"));

        let backend = config.build_backend()?;
        assert_eq!(backend.endpoint().host_str(), Some("tasks.example.com"));
        Ok(())
    }

    #[test]
    fn rejects_invalid_values() {
        let cases = [
            "[backend]\ntimeout_secs = 0\n",
            "[backend]\nendpoint = \"ftp://example.com\"\n",
            "[backend]\nendpoint = \"not a url\"\n",
            "[[palette]]\nvalue = \"red\"\nname = \"Red\"\n",
            concat!(
                "[[palette]]\nvalue = \"#F44336\"\nname = \"Red\"\n",
                "[[palette]]\nvalue = \"#f44336\"\nname = \"Also red\"\n",
            ),
            "[[palette]]\nvalue = \"#F44336\"\nname = \" \"\n",
        ];
        for case in cases {
            assert!(ClientConfig::from_toml(case).is_err(), "accepted: {case}");
        }
    }

    #[test]
    fn backend_requires_endpoint() -> Result<()> {
        let config = ClientConfig::default();
        assert!(config.build_backend().is_err());

        let config = config.with_endpoint("http://localhost:8080/api.php");
        assert_eq!(config.build_backend()?.endpoint().port(), Some(8080));
        Ok(())
    }

    #[test]
    fn explicit_path_beats_environment() {
        let mut fetch = |key: &'static str| match key {
            ENV_CONFIG_PATH => Some("/from/env.toml".to_owned()),
            _ => None,
        };
        let explicit = Path::new("/explicit.toml");
        assert_eq!(
            resolve_config_path_with(Some(explicit), &mut fetch),
            Some(PathBuf::from("/explicit.toml"))
        );
        assert_eq!(
            resolve_config_path_with(None, &mut fetch),
            Some(PathBuf::from("/from/env.toml"))
        );

        let mut blank = |_: &'static str| Some("  ".to_owned());
        assert_eq!(resolve_config_path_with(None, &mut blank), default_config_path());
    }
}
