use crate::draw::model::{Color, EraserMode, ToolState, WidthRange};
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Environment variable that overrides [`Settings::api_url`].
pub const API_URL_ENV: &str = "SKETCH_SOLVER_API_URL";

const SOLVE_ROUTE: &str = "calculate";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the solve service. `/calculate` is appended.
    #[serde(default)]
    pub api_url: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional log file in addition to stderr.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_color")]
    pub default_color: Color,
    #[serde(default = "default_stroke_width")]
    pub default_stroke_width: u32,
    #[serde(default)]
    pub stroke_width_range: WidthRange,
    #[serde(default = "default_swatches")]
    pub swatches: Vec<Color>,
    #[serde(default = "default_background_color")]
    pub background_color: Color,
    #[serde(default)]
    pub eraser_mode: EraserMode,
    #[serde(default = "default_result_display_delay_ms")]
    pub result_display_delay_ms: u64,
    /// Extra delay per result within one response. `0` shows a batch at once.
    #[serde(default)]
    pub result_display_stagger_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_color() -> Color {
    Color::WHITE
}

fn default_stroke_width() -> u32 {
    3
}

fn default_background_color() -> Color {
    Color::BLACK
}

fn default_result_display_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_swatches() -> Vec<Color> {
    vec![
        Color::rgba(255, 255, 255, 255),
        Color::rgba(238, 59, 59, 255),
        Color::rgba(255, 171, 0, 255),
        Color::rgba(255, 230, 64, 255),
        Color::rgba(61, 220, 132, 255),
        Color::rgba(0, 168, 255, 255),
        Color::rgba(180, 102, 255, 255),
        Color::rgba(255, 105, 180, 255),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            debug_logging: false,
            log_file: None,
            default_color: default_color(),
            default_stroke_width: default_stroke_width(),
            stroke_width_range: WidthRange::default(),
            swatches: default_swatches(),
            background_color: default_background_color(),
            eraser_mode: EraserMode::default(),
            result_display_delay_ms: default_result_display_delay_ms(),
            result_display_stagger_ms: 0,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Missing or empty files yield the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("parse settings file {path}"))
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write settings file {path}"))?;
        Ok(())
    }

    /// Applies [`API_URL_ENV`] when it is set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::debug!(api_url = url, "api url taken from environment");
                self.api_url = Some(url.to_owned());
            }
        }
    }

    /// Full URL of the solve route.
    pub fn solve_endpoint(&self) -> anyhow::Result<Url> {
        let raw = self
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("no solve service configured; set {API_URL_ENV} or `api_url`"))?;
        let mut base = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("api url must use http or https, got '{}'", base.scheme());
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(SOLVE_ROUTE)?)
    }

    pub fn tool_state(&self) -> ToolState {
        ToolState::new(
            self.default_color,
            self.default_stroke_width,
            self.stroke_width_range,
            self.swatches.clone(),
        )
    }

    pub fn result_display_delay(&self) -> Duration {
        Duration::from_millis(self.result_display_delay_ms)
    }

    pub fn result_display_stagger(&self) -> Duration {
        Duration::from_millis(self.result_display_stagger_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
