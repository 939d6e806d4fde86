/// Configuration system for docprep
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, PrepError};
use crate::splitter::{LengthUnit, build_header_markers, default_header_pairs, default_separators};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Markdown splitter configuration
    #[serde(default)]
    pub splitter: SplitterConfig,

    /// Boilerplate cleanup configuration
    #[serde(default)]
    pub clean: CleanConfig,

    /// LLM cleanup pass configuration
    #[serde(default)]
    pub refine: RefineConfig,
}

/// Markdown splitter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// `[marker, name]` pairs, e.g. `["##", "h2"]`
    #[serde(default = "default_header_pairs")]
    pub headers_to_split_on: Vec<(String, String)>,

    /// Omit header lines from chunk content
    #[serde(default)]
    pub strip_headers: bool,

    /// Maximum non-code chunk length; unset disables size refinement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,

    /// Unit the chunk size is measured in
    #[serde(default)]
    pub length_unit: LengthUnit,

    /// Boundary separators, most significant first
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,

    /// Treat separators as regular expressions instead of literals
    #[serde(default)]
    pub is_separator_regex: bool,
}

/// Boilerplate cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
    /// A document starting with this marker loses its first line
    #[serde(default = "default_cover_image_marker")]
    pub cover_image_marker: String,

    /// Lines containing any of these are dropped
    #[serde(default = "default_drop_line_markers")]
    pub drop_line_markers: Vec<String>,

    /// Literal promotional phrases removed wherever they occur
    #[serde(default = "default_promo_phrases")]
    pub promo_phrases: Vec<String>,

    /// Regular expressions whose matches are removed
    #[serde(default = "default_strip_patterns")]
    pub strip_patterns: Vec<String>,

    /// Characters deleted from the text
    #[serde(default = "default_stray_chars")]
    pub stray_chars: String,

    /// Line prefixes (followed by a full-width colon) naming authors
    #[serde(default = "default_author_keys")]
    pub author_keys: Vec<String>,

    /// Separator between several names on one author line
    #[serde(default = "default_author_separator")]
    pub author_separator: String,

    /// Keywords identifying trailing source/byline lines
    #[serde(default = "default_byline_keys")]
    pub byline_keys: Vec<String>,

    /// Cleaned documents shorter than this many characters are skipped
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

/// LLM cleanup pass configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Replaces the built-in system prompt when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

// Default value functions
fn default_cover_image_marker() -> String {
    "![cover_image]".to_string()
}

fn default_drop_line_markers() -> Vec<String> {
    vec!["阅读原文".to_string()]
}

fn default_promo_phrases() -> Vec<String> {
    [
        "拿起手机，搜索微信公众号“长宁房管”，住房相关政策，重点信息一手掌握，赶紧动动手指关注我们吧！",
        "拿起手机，搜索微信公众号“长宁房管”，住房保障重要政策，重点信息一手掌握，赶紧动动手指关注我们吧！",
        "房友们，点上方蓝色**“长宁房管”**关注我们，点文末**“在看”、“赞”**提高阅读优先权，及时了解住房相关政策，掌握一手重点信息。快来关注我们吧！",
        "[长宁房管](javascript:void(0);)",
        "[阅读原文](javascript:;)",
        "**扫描二维码 下载查看**",
        "修改于",
        "点击照片查看更多",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_strip_patterns() -> Vec<String> {
    vec![
        r"!\[cover_image\]\(https?://[^)]+\)".to_string(),
        r"撰稿人:\s*\S+".to_string(),
    ]
}

fn default_stray_chars() -> String {
    "*〓▼".to_string()
}

fn default_author_keys() -> Vec<String> {
    vec![
        "撰稿人".to_string(),
        "投稿人".to_string(),
        "信息来源".to_string(),
    ]
}

fn default_author_separator() -> String {
    "、".to_string()
}

fn default_byline_keys() -> Vec<String> {
    [
        "资料来源", "信息来源", "来源", "撰稿人", "撰稿", "作者", "编辑", "摄影", "校对", "投稿人",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_min_content_chars() -> usize {
    100
}

fn default_base_url() -> String {
    "https://open.bigmodel.cn/api/paas/v4".to_string()
}

fn default_model() -> String {
    "glm-4".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_api_key_env() -> String {
    "ZHIPUAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    180
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            headers_to_split_on: default_header_pairs(),
            strip_headers: false,
            chunk_size: None,
            length_unit: LengthUnit::default(),
            separators: default_separators(),
            is_separator_regex: false,
        }
    }
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            cover_image_marker: default_cover_image_marker(),
            drop_line_markers: default_drop_line_markers(),
            promo_phrases: default_promo_phrases(),
            strip_patterns: default_strip_patterns(),
            stray_chars: default_stray_chars(),
            author_keys: default_author_keys(),
            author_separator: default_author_separator(),
            byline_keys: default_byline_keys(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            system_prompt: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, PrepError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, PrepError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), PrepError> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), PrepError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();
        self.save(&config_path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), PrepError> {
        // Chunk size
        if self.splitter.chunk_size == Some(0) {
            return Err(invalid("splitter.chunk_size", "must be greater than 0"));
        }

        // Header markers
        if self.splitter.headers_to_split_on.is_empty() {
            return Err(invalid(
                "splitter.headers_to_split_on",
                "at least one header marker is required",
            ));
        }
        build_header_markers(&self.splitter.headers_to_split_on)
            .map_err(|e| invalid("splitter.headers_to_split_on", &e.to_string()))?;

        // Separators
        if self.splitter.separators.iter().any(String::is_empty) {
            return Err(invalid("splitter.separators", "separators must not be empty"));
        }
        if self.splitter.is_separator_regex {
            for separator in &self.splitter.separators {
                Regex::new(separator).map_err(|e| {
                    invalid("splitter.separators", &format!("'{separator}': {e}"))
                })?;
            }
        }

        // Cleanup patterns
        for pattern in &self.clean.strip_patterns {
            Regex::new(pattern).map_err(|e| {
                invalid("clean.strip_patterns", &format!("'{pattern}': {e}"))
            })?;
        }
        if self.clean.author_separator.is_empty() {
            return Err(invalid("clean.author_separator", "must not be empty"));
        }

        // LLM settings
        if !(0.0..=2.0).contains(&self.refine.temperature) {
            return Err(invalid(
                "refine.temperature",
                &format!(
                    "must be between 0.0 and 2.0, got {}",
                    self.refine.temperature
                ),
            ));
        }
        if self.refine.timeout_secs == 0 {
            return Err(invalid("refine.timeout_secs", "must be greater than 0"));
        }
        if self.refine.base_url.trim().is_empty() {
            return Err(invalid("refine.base_url", "must not be empty"));
        }
        if self.refine.model.trim().is_empty() {
            return Err(invalid("refine.model", "must not be empty"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        // Chunk size
        if let Ok(chunk_size) = std::env::var("DOCPREP_CHUNK_SIZE")
            && let Ok(size) = chunk_size.parse()
        {
            self.splitter.chunk_size = Some(size);
        }

        // Header stripping
        if let Ok(strip) = std::env::var("DOCPREP_STRIP_HEADERS")
            && let Ok(strip) = strip.parse()
        {
            self.splitter.strip_headers = strip;
        }

        // Length unit
        if let Ok(unit) = std::env::var("DOCPREP_LENGTH_UNIT")
            && let Ok(unit) = unit.parse()
        {
            self.splitter.length_unit = unit;
        }

        // LLM endpoint
        if let Ok(url) = std::env::var("DOCPREP_LLM_BASE_URL") {
            self.refine.base_url = url;
        }

        // LLM model
        if let Ok(model) = std::env::var("DOCPREP_LLM_MODEL") {
            self.refine.model = model;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, PrepError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn invalid(key: &str, reason: &str) -> PrepError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
