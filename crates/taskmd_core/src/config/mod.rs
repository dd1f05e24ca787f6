use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::UtcOffset;
use time::macros::format_description;

const THEME_ENV_VAR: &str = "TASKMD_THEME";
const UTC_OFFSET_ENV_VAR: &str = "TASKMD_UTC_OFFSET";
const RESET: &str = "\x1b[0m";

/// A tag mapped to an empty style is still recognized, so its markers are
/// stripped instead of leaking into plain output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    styles: BTreeMap<&'static str, &'static str>,
    reset: &'static str,
}

impl Palette {
    pub fn style(&self, tag: &str) -> Option<&'static str> {
        self.styles.get(tag).copied()
    }

    pub fn reset(&self) -> &'static str {
        self.reset
    }

    pub fn is_plain(&self) -> bool {
        self.styles.values().all(|style| style.is_empty())
    }

    fn plain() -> Self {
        Self::with_styles(&[
            ("accent", ""),
            ("muted", ""),
            ("bold", ""),
            ("ok", ""),
            ("warn", ""),
            ("error", ""),
        ])
    }

    fn with_styles(styles: &[(&'static str, &'static str)]) -> Self {
        let reset = if styles.iter().all(|(_, style)| style.is_empty()) {
            ""
        } else {
            RESET
        };
        Self {
            styles: styles.iter().copied().collect(),
            reset,
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.map(canonical_theme_name).as_deref() {
        Some("noir") => Palette::with_styles(&[
            ("accent", "\x1b[38;5;208m"),
            ("muted", "\x1b[38;5;250m"),
            ("bold", "\x1b[1m"),
            ("ok", "\x1b[38;5;114m"),
            ("warn", "\x1b[38;5;221m"),
            ("error", "\x1b[38;5;203m"),
        ]),
        Some("solarized") => Palette::with_styles(&[
            ("accent", "\x1b[38;5;108m"),
            ("muted", "\x1b[38;5;250m"),
            ("bold", "\x1b[1m"),
            ("ok", "\x1b[38;5;64m"),
            ("warn", "\x1b[38;5;136m"),
            ("error", "\x1b[38;5;160m"),
        ]),
        _ => Palette::plain(),
    }
}

pub fn canonical_theme_name(raw: &str) -> String {
    let words: Vec<String> = raw
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();

    match words.join("_").as_str() {
        "" | "vanilla" | "light" => "default".to_string(),
        "dark" | "dark_mode" | "darkmode" => "noir".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub utc_offset: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub utc_offset: Option<String>,
}

impl Config {
    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let config: Config = serde_json::from_str(content)
            .map_err(|err| AppError::invalid_data(format!("invalid config JSON: {err}")))?;
        if let Some(raw) = config.utc_offset.as_deref() {
            parse_utc_offset(raw)?;
        }
        Ok(normalize_config_theme(config))
    }

    pub fn from_env() -> Self {
        let theme = std::env::var(THEME_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let utc_offset = std::env::var(UTC_OFFSET_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty());
        normalize_config_theme(Config { theme, utc_offset })
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }

    pub fn offset(&self) -> UtcOffset {
        if let Some(raw) = self.utc_offset.as_deref() {
            match parse_utc_offset(raw) {
                Ok(offset) => return offset,
                Err(err) => log::warn!("ignoring utc_offset: {}", err.message()),
            }
        }
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
    }
}

pub fn parse_utc_offset(raw: &str) -> Result<UtcOffset, AppError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        trimmed,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|_| AppError::invalid_data(format!("utc_offset must look like +HH:MM, got '{raw}'")))
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.map(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = Some(canonical_theme_name(theme));
    }

    if let Some(offset) = overrides.utc_offset.as_ref() {
        merged.utc_offset = Some(offset.trim().to_string());
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, canonical_theme_name, merge_overrides, palette_for_theme,
        parse_utc_offset,
    };
    use time::UtcOffset;

    #[test]
    fn from_json_str_reads_valid_config() {
        let content = serde_json::json!({
            "theme": "Dark Mode",
            "utc_offset": "+02:00"
        });

        let loaded = Config::from_json_str(&content.to_string()).unwrap();

        assert_eq!(loaded.theme.as_deref(), Some("noir"));
        assert_eq!(
            loaded.offset(),
            UtcOffset::from_hms(2, 0, 0).unwrap()
        );
    }

    #[test]
    fn from_json_str_rejects_invalid_json() {
        let err = Config::from_json_str("{ invalid json ").unwrap_err();
        assert_eq!(err.code(), "invalid_data");
        assert!(err.message().contains("invalid config JSON"));
    }

    #[test]
    fn from_json_str_rejects_malformed_offset() {
        let err = Config::from_json_str(r#"{ "utc_offset": "two hours" }"#).unwrap_err();
        assert!(err.message().contains("+HH:MM"));
    }

    #[test]
    fn missing_fields_default_to_none() {
        let loaded = Config::from_json_str("{}").unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn parse_utc_offset_accepts_signed_and_utc_forms() {
        assert_eq!(parse_utc_offset("z").unwrap(), UtcOffset::UTC);
        assert_eq!(
            parse_utc_offset("-05:30").unwrap(),
            UtcOffset::from_hms(-5, -30, 0).unwrap()
        );
        assert!(parse_utc_offset("0530").is_err());
    }

    #[test]
    fn merge_overrides_updates_theme_and_offset() {
        let base = Config {
            theme: Some("default".into()),
            utc_offset: Some("+01:00".into()),
        };

        let overrides = ConfigOverrides {
            theme: Some("Solarized".into()),
            utc_offset: Some(" -03:00 ".into()),
        };

        let merged = merge_overrides(&base, &overrides);
        assert_eq!(merged.theme.as_deref(), Some("solarized"));
        assert_eq!(merged.utc_offset.as_deref(), Some("-03:00"));

        assert_eq!(base.theme.as_deref(), Some("default"));
        assert_eq!(base.utc_offset.as_deref(), Some("+01:00"));
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            theme: Some("noir".into()),
            utc_offset: None,
        };

        let merged = merge_overrides(&base, &ConfigOverrides::default());

        assert_eq!(merged, base);
    }

    #[test]
    fn canonical_theme_name_maps_variants() {
        assert_eq!(canonical_theme_name("Vanilla"), "default");
        assert_eq!(canonical_theme_name("Noir"), "noir");
        assert_eq!(canonical_theme_name("dark-mode"), "noir");
        assert_eq!(canonical_theme_name(" Dark  Mode "), "noir");
        assert_eq!(canonical_theme_name("  "), "default");
        assert_eq!(canonical_theme_name("Solarized!"), "solarized");
    }

    #[test]
    fn palette_for_theme_returns_palette() {
        let plain = palette_for_theme(Some("vanilla"));
        assert!(plain.is_plain());
        assert_eq!(plain.style("accent"), Some(""));
        assert_eq!(plain.reset(), "");

        let noir = palette_for_theme(Some("noir"));
        assert_eq!(noir.style("accent"), Some("\x1b[38;5;208m"));
        assert_eq!(noir.reset(), "\x1b[0m");

        let unknown = palette_for_theme(Some("oceanic"));
        assert!(unknown.is_plain());
        assert_eq!(unknown.style("sparkle"), None);
    }
}
