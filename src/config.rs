use std::path::PathBuf;

use crate::error::ConfigError;

pub const TESSERACT_VAR: &str = "OCR_CORE_TESSERACT";
pub const LANG_VAR: &str = "OCR_CORE_LANG";
pub const PSM_VAR: &str = "OCR_CORE_PSM";
pub const TESSDATA_VAR: &str = "OCR_CORE_TESSDATA";
pub const LOG_VAR: &str = "OCR_CORE_LOG";
pub const LOG_FORMAT_VAR: &str = "OCR_CORE_LOG_FORMAT";

const DEFAULT_TESSERACT: &str = "tesseract";
const DEFAULT_LANG: &str = "eng";
const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for the Tesseract binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub command: String,
    pub languages: Vec<String>,
    pub psm: Option<u8>,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            command: DEFAULT_TESSERACT.to_string(),
            languages: vec![DEFAULT_LANG.to_string()],
            psm: None,
            tessdata_dir: None,
        }
    }
}

impl EngineConfig {
    /// Builds the config from any key lookup; unset and blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = EngineConfig {
            command: Self::command_from_lookup(&lookup),
            ..EngineConfig::default()
        };

        if let Some(lang) = get(LANG_VAR) {
            let languages: Vec<String> = lang
                .split('+')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            if languages.is_empty() {
                return Err(ConfigError::Empty { var: LANG_VAR });
            }
            cfg.languages = languages;
        }

        if let Some(psm) = get(PSM_VAR) {
            let parsed = psm
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|n| *n <= 13)
                .ok_or_else(|| ConfigError::InvalidPsm {
                    var: PSM_VAR,
                    value: psm.clone(),
                })?;
            cfg.psm = Some(parsed);
        }

        cfg.tessdata_dir = get(TESSDATA_VAR).map(|d| PathBuf::from(d.trim()));

        Ok(cfg)
    }

    /// The engine executable alone. Never fails, so the executable can be
    /// checked before the other settings are validated.
    pub fn command_from_lookup<F>(lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(TESSERACT_VAR)
            .map(|cmd| cmd.trim().to_string())
            .filter(|cmd| !cmd.is_empty())
            .unwrap_or_else(|| DEFAULT_TESSERACT.to_string())
    }

    /// Language list in Tesseract's `-l` syntax.
    pub fn lang_arg(&self) -> String {
        self.languages.join("+")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = LogConfig::default();

        if let Some(filter) = get(LOG_VAR).or_else(|| get("RUST_LOG")) {
            cfg.filter = filter;
        }

        if let Some(format) = get(LOG_FORMAT_VAR) {
            let normalized = format.trim().to_ascii_lowercase();
            cfg.format = match normalized.as_str() {
                "compact" => LogFormat::Compact,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidLogFormat {
                        var: LOG_FORMAT_VAR,
                        value: format,
                    })
                }
            };
        }

        Ok(cfg)
    }
}
