use latexocr_types::{ApiFormat, CopyFormat, ImageFormat, SettingsForm};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod env;
pub mod store;

pub use env::SessionOverrides;
pub use store::{ConfigError, ConfigStore};

fn default_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_api_model() -> String {
    "gpt-4o".to_string()
}

fn default_hotkey() -> String {
    "<ctrl>+<shift>+a".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_preview_command() -> String {
    "latexocr-preview".to_string()
}

/// Application settings, persisted as a flat JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: String,
    pub api_model: String,
    pub api_format: ApiFormat,
    /// Format used by the automatic copy after OCR
    pub copy_format: CopyFormat,
    pub image_format: ImageFormat,
    /// Global capture chord, e.g. `<ctrl>+<shift>+a`
    pub hotkey: String,
    pub request_timeout_secs: u64,
    /// Renderer host executable, launched with the preview page path
    pub preview_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: String::new(),
            api_model: default_api_model(),
            api_format: ApiFormat::default(),
            copy_format: CopyFormat::default(),
            image_format: ImageFormat::default(),
            hotkey: default_hotkey(),
            request_timeout_secs: default_request_timeout_secs(),
            preview_command: default_preview_command(),
        }
    }
}

impl Config {
    /// Overlay the recognized keys of `loaded` on top of `defaults`.
    ///
    /// Unknown keys are ignored and values of the wrong type keep the default,
    /// so the result always carries every setting.
    pub fn merge(defaults: Config, loaded: &Map<String, Value>) -> Config {
        let mut config = defaults;

        for (key, value) in loaded {
            match key.as_str() {
                "api_base_url" => take_string(key, value, &mut config.api_base_url),
                "api_key" => take_string(key, value, &mut config.api_key),
                "api_model" => take_string(key, value, &mut config.api_model),
                "hotkey" => take_string(key, value, &mut config.hotkey),
                "preview_command" => take_string(key, value, &mut config.preview_command),
                "api_format" => take_parsed(key, value, &mut config.api_format),
                "copy_format" => take_parsed(key, value, &mut config.copy_format),
                "image_format" => take_parsed(key, value, &mut config.image_format),
                "request_timeout_secs" => {
                    let parsed = match value {
                        Value::Number(n) => n.as_u64(),
                        Value::String(s) => s.trim().parse().ok(),
                        _ => None,
                    };
                    match parsed {
                        Some(secs) if secs > 0 => config.request_timeout_secs = secs,
                        _ => tracing::warn!("Ignoring invalid request_timeout_secs: {}", value),
                    }
                }
                other => tracing::debug!("Ignoring unknown config key '{}'", other),
            }
        }

        config
    }

    /// Current values as shown in the settings dialog
    pub fn to_form(&self) -> SettingsForm {
        SettingsForm {
            api_base_url: self.api_base_url.clone(),
            api_key: self.api_key.clone(),
            api_model: self.api_model.clone(),
            api_format: self.api_format.as_str().to_string(),
            copy_format: self.copy_format.as_str().to_string(),
            hotkey: self.hotkey.clone(),
        }
    }

    /// Apply a confirmed settings dialog. Blank model and hotkey fall back
    /// to the built-in defaults; unparsable enum values keep the current one.
    pub fn apply_form(&self, form: &SettingsForm) -> Config {
        let mut next = self.clone();
        next.api_base_url = form.api_base_url.trim().to_string();
        next.api_key = form.api_key.trim().to_string();

        let model = form.api_model.trim();
        next.api_model = if model.is_empty() {
            default_api_model()
        } else {
            model.to_string()
        };

        let hotkey = form.hotkey.trim();
        next.hotkey = if hotkey.is_empty() {
            default_hotkey()
        } else {
            hotkey.to_string()
        };

        if let Ok(format) = form.copy_format.parse() {
            next.copy_format = format;
        }
        if let Ok(format) = form.api_format.parse() {
            next.api_format = format;
        }

        next
    }
}

fn take_string(key: &str, value: &Value, slot: &mut String) {
    match value.as_str() {
        Some(s) => *slot = s.to_string(),
        None => tracing::warn!("Ignoring non-string value for '{}'", key),
    }
}

fn take_parsed<T: std::str::FromStr>(key: &str, value: &Value, slot: &mut T) {
    match value.as_str().map(str::parse::<T>) {
        Some(Ok(parsed)) => *slot = parsed,
        _ => tracing::warn!("Ignoring invalid value for '{}': {}", key, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn partial_file_keeps_every_default() {
        let loaded = map(json!({ "api_key": "sk-test" }));
        let config = Config::merge(Config::default(), &loaded);

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.api_base_url, default_api_base_url());
        assert_eq!(config.api_model, default_api_model());
        assert_eq!(config.copy_format, CopyFormat::Latex);
        assert_eq!(config.hotkey, default_hotkey());
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn invalid_values_fall_back() {
        let loaded = map(json!({
            "copy_format": "html",
            "api_model": 42,
            "request_timeout_secs": 0,
            "something_else": true,
        }));
        let config = Config::merge(Config::default(), &loaded);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn merge_reads_typed_values() {
        let loaded = map(json!({
            "copy_format": "mathml",
            "api_format": "responses",
            "image_format": "jpeg",
            "request_timeout_secs": "15",
        }));
        let config = Config::merge(Config::default(), &loaded);
        assert_eq!(config.copy_format, CopyFormat::Mathml);
        assert_eq!(config.api_format, ApiFormat::Responses);
        assert_eq!(config.image_format, ImageFormat::Jpeg);
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn serialized_config_round_trips_through_merge() {
        let mut config = Config::default();
        config.api_key = "k".into();
        config.copy_format = CopyFormat::Mathml;

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["copy_format"], "mathml");
        assert_eq!(Config::merge(Config::default(), &map(value)), config);
    }

    #[test]
    fn apply_form_trims_and_defaults_blanks() {
        let form = SettingsForm {
            api_base_url: "  https://example.test/v1/responses ".into(),
            api_key: " key ".into(),
            api_model: "   ".into(),
            api_format: "auto".into(),
            copy_format: "mathml".into(),
            hotkey: "".into(),
        };
        let next = Config::default().apply_form(&form);

        assert_eq!(next.api_base_url, "https://example.test/v1/responses");
        assert_eq!(next.api_key, "key");
        assert_eq!(next.api_model, default_api_model());
        assert_eq!(next.hotkey, default_hotkey());
        assert_eq!(next.copy_format, CopyFormat::Mathml);
    }
}
