//! Configuration settings for stockwatch.

use crate::state::{Region, ThemeMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of environment variables overriding configuration values.
pub const ENV_PREFIX: &str = "STOCKWATCH";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Market data API configuration.
    pub api: ApiConfig,
    /// Poller intervals.
    pub refresh: RefreshConfig,
    /// Offline detection.
    pub connectivity: ConnectivityConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
    /// Theme configuration.
    pub theme: ThemeConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file, then apply `STOCKWATCH__SECTION__KEY`
    /// environment overrides. A missing file yields the defaults.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_path);

        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn default_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Market data API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Whether the remote backend is used at all. When false every
    /// request is served from generated data.
    pub enabled: bool,
    /// Backend base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Timeout of the availability probe in milliseconds.
    pub probe_timeout_ms: u64,
    /// Serve generated data when the backend fails.
    pub fallback_to_mock: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 15,
            probe_timeout_ms: 1000,
            fallback_to_mock: true,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Poller intervals in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Start with automatic refresh enabled.
    pub enabled: bool,
    /// Trending list interval.
    pub trending_ms: u64,
    /// Stock details interval.
    pub details_ms: u64,
    /// Price chart interval.
    pub chart_ms: u64,
    /// Delay between the last keystroke and the search request.
    pub search_debounce_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trending_ms: 1000,
            details_ms: 1000,
            chart_ms: 1000,
            search_debounce_ms: 300,
        }
    }
}

impl RefreshConfig {
    pub fn trending_interval(&self) -> Duration {
        Duration::from_millis(self.trending_ms)
    }

    pub fn details_interval(&self) -> Duration {
        Duration::from_millis(self.details_ms)
    }

    pub fn chart_interval(&self) -> Duration {
        Duration::from_millis(self.chart_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Offline detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Probe the network. When false the app always reports online.
    pub enabled: bool,
    /// `host:port` opened by the reachability probe.
    pub probe_addr: String,
    /// Time between probes in milliseconds.
    pub probe_interval_ms: u64,
    /// Probe connect timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// How long "back online" is reported after recovery, in milliseconds.
    pub recovery_window_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_addr: "1.1.1.1:53".to_string(),
            probe_interval_ms: 5000,
            probe_timeout_ms: 1000,
            recovery_window_ms: 5000,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Enable Unicode symbols.
    pub unicode_symbols: bool,
    /// Number of quotes in the trending list.
    pub trending_count: usize,
    /// Regions preselected in search, by id ("USA", "EGY", ...).
    pub search_regions: Vec<String>,
    /// Show status bar.
    pub show_status_bar: bool,
    /// Show help bar.
    pub show_help_bar: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            mouse_support: false,
            unicode_symbols: true,
            trending_count: 10,
            search_regions: vec!["USA".to_string()],
            show_status_bar: true,
            show_help_bar: true,
        }
    }
}

impl UiConfig {
    /// Configured search regions; unknown ids are skipped.
    pub fn regions(&self) -> Vec<Region> {
        self.search_regions
            .iter()
            .filter_map(|id| Region::parse(id))
            .collect()
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Navigate up.
    pub up: String,
    /// Navigate down.
    pub down: String,
    /// Previous time range.
    pub left: String,
    /// Next time range.
    pub right: String,
    /// Select/confirm.
    pub select: String,
    /// Cancel/back.
    pub back: String,
    /// Refresh data.
    pub refresh: String,
    /// Switch to trending view.
    pub trending: String,
    /// Switch to search view.
    pub search_view: String,
    /// Switch to detail view.
    pub detail: String,
    /// Start typing a search.
    pub search: String,
    /// Toggle dark/light theme.
    pub theme: String,
    /// Pause or resume automatic refresh.
    pub auto_refresh: String,
    /// Dismiss the latest toast.
    pub dismiss: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            left: "h".to_string(),
            right: "l".to_string(),
            select: "Enter".to_string(),
            back: "Esc".to_string(),
            refresh: "r".to_string(),
            trending: "1".to_string(),
            search_view: "2".to_string(),
            detail: "3".to_string(),
            search: "/".to_string(),
            theme: "t".to_string(),
            auto_refresh: "a".to_string(),
            dismiss: "x".to_string(),
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Initial color scheme.
    pub mode: ThemeMode,
    /// Colors of the dark scheme.
    pub dark: PaletteConfig,
    /// Colors of the light scheme.
    pub light: PaletteConfig,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Dark,
            dark: PaletteConfig::dark(),
            light: PaletteConfig::light(),
        }
    }
}

impl ThemeConfig {
    /// Colors for a scheme.
    pub fn palette(&self, mode: ThemeMode) -> &PaletteConfig {
        match mode {
            ThemeMode::Dark => &self.dark,
            ThemeMode::Light => &self.light,
        }
    }
}

/// Colors of one scheme, as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Primary color (hex).
    pub primary: String,
    /// Secondary color (hex).
    pub secondary: String,
    /// Accent color (hex).
    pub accent: String,
    /// Success/price-up color (hex).
    pub success: String,
    /// Warning color (hex).
    pub warning: String,
    /// Error/price-down color (hex).
    pub error: String,
    /// Background color (hex).
    pub background: String,
    /// Foreground/text color (hex).
    pub foreground: String,
    /// Border color (hex).
    pub border: String,
    /// Selection/highlight color (hex).
    pub selection: String,
    /// Muted text color (hex).
    pub muted: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self::dark()
    }
}

impl PaletteConfig {
    /// Default dark colors.
    pub fn dark() -> Self {
        Self {
            primary: "#5c6bc0".to_string(),
            secondary: "#7986cb".to_string(),
            accent: "#ff7043".to_string(),
            success: "#66bb6a".to_string(),
            warning: "#ffa726".to_string(),
            error: "#ef5350".to_string(),
            background: "#1e1e2e".to_string(),
            foreground: "#cdd6f4".to_string(),
            border: "#45475a".to_string(),
            selection: "#585b70".to_string(),
            muted: "#7f849c".to_string(),
        }
    }

    /// Default light colors.
    pub fn light() -> Self {
        Self {
            primary: "#3949ab".to_string(),
            secondary: "#5c6bc0".to_string(),
            accent: "#e64a19".to_string(),
            success: "#2e7d32".to_string(),
            warning: "#ef6c00".to_string(),
            error: "#c62828".to_string(),
            background: "#f5f5f5".to_string(),
            foreground: "#212121".to_string(),
            border: "#bdbdbd".to_string(),
            selection: "#e0e0e0".to_string(),
            muted: "#757575".to_string(),
        }
    }
}
