use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "ringback";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_RESULTS_PATH: &str = "result.csv";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
pub const DEFAULT_API_KEY_ENV: &str = "SERPER_API_KEY";
pub const DEFAULT_QUERY_SUFFIX: &str = "phone number";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_PAGE_URL: &str = "https://www.zabasearch.com/phone/{number}";
pub const DEFAULT_NAME_XPATH: &str =
    "//*[@id=\"result-top-content\"]/div[1]/table[1]/tbody/tr/td[2]/table[1]/tbody/tr[2]/td/h3";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";
pub const DEFAULT_PAGE_LOAD_WAIT_MS: u64 = 3_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const NUMBER_PLACEHOLDER: &str = "{number}";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub results_path: PathBuf,
    pub search: SearchConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub query_suffix: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub webdriver_url: String,
    pub page_url: String,
    pub name_xpath: String,
    pub page_load_wait_ms: u64,
    pub user_agent: String,
    pub headless: bool,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            search: SearchConfig {
                endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
                api_key: None,
                api_key_env: DEFAULT_API_KEY_ENV.to_string(),
                query_suffix: DEFAULT_QUERY_SUFFIX.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            lookup: LookupConfig {
                webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
                page_url: DEFAULT_PAGE_URL.to_string(),
                name_xpath: DEFAULT_NAME_XPATH.to_string(),
                page_load_wait_ms: DEFAULT_PAGE_LOAD_WAIT_MS,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                headless: true,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
        }
    }
}

impl SearchConfig {
    /// Inline key first, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref() {
            return Ok(key.to_string());
        }
        match env::var(&self.api_key_env) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::MissingApiKey(self.api_key_env.clone())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid {field} value: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("search api key missing: set search.api_key or the {0} environment variable")]
    MissingApiKey(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    results_path: Option<PathBuf>,
    search: Option<SearchFile>,
    lookup: Option<LookupFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchFile {
    endpoint: Option<String>,
    api_key: Option<String>,
    api_key_env: Option<String>,
    query_suffix: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LookupFile {
    webdriver_url: Option<String>,
    page_url: Option<String>,
    name_xpath: Option<String>,
    page_load_wait_ms: Option<u64>,
    user_agent: Option<String>,
    headless: Option<bool>,
    timeout_secs: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(results_path) = parsed.results_path {
        if results_path.as_os_str().is_empty() {
            return Err(invalid("results_path", "must not be empty"));
        }
        config.results_path = results_path;
    }

    if let Some(search) = parsed.search {
        if let Some(endpoint) = search.endpoint {
            config.search.endpoint = non_empty("search.endpoint", endpoint)?;
        }
        if let Some(api_key) = search.api_key {
            config.search.api_key = Some(non_empty("search.api_key", api_key)?);
        }
        if let Some(api_key_env) = search.api_key_env {
            config.search.api_key_env = non_empty("search.api_key_env", api_key_env)?;
        }
        if let Some(suffix) = search.query_suffix {
            config.search.query_suffix = suffix.trim().to_string();
        }
        if let Some(timeout) = search.timeout_secs {
            config.search.timeout_secs = positive("search.timeout_secs", timeout)?;
        }
    }

    if let Some(lookup) = parsed.lookup {
        if let Some(url) = lookup.webdriver_url {
            config.lookup.webdriver_url = non_empty("lookup.webdriver_url", url)?;
        }
        if let Some(page_url) = lookup.page_url {
            let page_url = non_empty("lookup.page_url", page_url)?;
            if !page_url.contains(NUMBER_PLACEHOLDER) {
                return Err(invalid(
                    "lookup.page_url",
                    format!("must contain {NUMBER_PLACEHOLDER}"),
                ));
            }
            config.lookup.page_url = page_url;
        }
        if let Some(xpath) = lookup.name_xpath {
            config.lookup.name_xpath = non_empty("lookup.name_xpath", xpath)?;
        }
        if let Some(wait) = lookup.page_load_wait_ms {
            config.lookup.page_load_wait_ms = wait;
        }
        if let Some(user_agent) = lookup.user_agent {
            config.lookup.user_agent = non_empty("lookup.user_agent", user_agent)?;
        }
        if let Some(headless) = lookup.headless {
            config.lookup.headless = headless;
        }
        if let Some(timeout) = lookup.timeout_secs {
            config.lookup.timeout_secs = positive("lookup.timeout_secs", timeout)?;
        }
    }

    Ok(config)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn positive(field: &'static str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(value)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
