use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4310;
const DEFAULT_PROVIDER_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_PROVIDER_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── ProviderConfig ───────────────────────────────────────────────────────────

/// AI provider configuration (`[provider]` in config.toml).
///
/// The API key is deliberately allowed to be empty: the server still starts
/// and every chat request surfaces the provider's auth error through the
/// normal error envelope instead of failing at boot.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider API key (`GEMINI_API_KEY` env var overrides).
    pub api_key: String,
    /// Model ID used for every chat completion. Default: gemini-2.5-flash.
    pub model: String,
    /// API base URL. Overridden in tests to point at a local stub.
    pub base_url: String,
    /// Request timeout in seconds. Default: 30.
    pub timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_PROVIDER_MODEL.to_string(),
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            timeout: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

// ─── AdminConfig ──────────────────────────────────────────────────────────────

/// Shared admin credential (`[admin]` in config.toml).
///
/// Both fields must be set for the admin routes to be reachable — the gate
/// fails closed when either is missing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin username (`ADMIN_USER` env var overrides).
    pub username: Option<String>,
    /// Admin password (`ADMIN_PASSWORD` env var overrides).
    pub password: Option<String>,
}

// ─── ObservabilityConfig ──────────────────────────────────────────────────────

/// Observability configuration (`[observability]` in config.toml).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds). Default: 100.
    /// Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 4310).
    port: Option<u16>,
    /// Bind address (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,conciergd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Database connection URL (default: sqlite file inside the data dir).
    database_url: Option<String>,
    /// Public base URL used when rendering absolute guest links (e.g. QR targets).
    public_base_url: Option<String>,
    /// AI provider configuration (`[provider]`).
    provider: Option<ProviderConfig>,
    /// Admin credential (`[admin]`).
    admin: Option<AdminConfig>,
    /// Observability configuration (`[observability]`).
    observability: Option<ObservabilityConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── ConciergeConfig ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConciergeConfig {
    pub port: u16,
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub log: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    /// Database connection URL (`CONCIERGD_DATABASE_URL` env var).
    pub database_url: String,
    /// Public base URL for absolute guest links. None = relative links only.
    pub public_base_url: Option<String>,
    /// AI provider settings (key, model, base URL, timeout).
    pub provider: ProviderConfig,
    /// Shared admin username (`ADMIN_USER` env var).
    pub admin_user: Option<String>,
    /// Shared admin password (`ADMIN_PASSWORD` env var).
    pub admin_pass: Option<String>,
    /// Observability: slow query threshold.
    pub observability: ObservabilityConfig,
}

impl ConciergeConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("CONCIERGD_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("CONCIERGD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let database_url = std::env::var("CONCIERGD_DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.database_url)
            .unwrap_or_else(|| {
                format!("sqlite://{}?mode=rwc", data_dir.join("conciergd.db").display())
            });

        let public_base_url = std::env::var("CONCIERGD_PUBLIC_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.public_base_url)
            .map(|u| u.trim_end_matches('/').to_string());

        let mut provider = toml.provider.unwrap_or_default();
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                provider.api_key = key;
            }
        }

        let admin = toml.admin.unwrap_or_default();
        let admin_user = std::env::var("ADMIN_USER")
            .ok()
            .filter(|s| !s.is_empty())
            .or(admin.username);
        let admin_pass = std::env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty())
            .or(admin.password);

        let observability = toml.observability.unwrap_or_default();

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            database_url,
            public_base_url,
            provider,
            admin_user,
            admin_pass,
            observability,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/conciergd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("conciergd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/conciergd or ~/.local/share/conciergd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("conciergd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("conciergd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\conciergd
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("conciergd");
        }
    }
    // Fallback
    PathBuf::from(".conciergd")
}
