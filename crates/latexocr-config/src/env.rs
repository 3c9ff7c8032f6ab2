use std::env;

use crate::Config;

/// Settings supplied for this run only, from `LATEXOCR_*` variables or the
/// command line. They win over the settings file but are never written to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOverrides {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub api_model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub preview_command: Option<String>,
}

impl SessionOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read `LATEXOCR_*` overrides through `lookup`. Empty values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            api_key: get("LATEXOCR_API_KEY"),
            api_base_url: get("LATEXOCR_API_BASE_URL"),
            api_model: get("LATEXOCR_API_MODEL"),
            request_timeout_secs: get("LATEXOCR_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0),
            preview_command: get("LATEXOCR_PREVIEW_COMMAND"),
        }
    }

    pub fn with_preview_command(mut self, command: Option<String>) -> Self {
        if let Some(command) = command.filter(|c| !c.trim().is_empty()) {
            self.preview_command = Some(command);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Effective settings for this run
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(model) = &self.api_model {
            config.api_model = model.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(command) = &self.preview_command {
            config.preview_command = command.clone();
        }
        config
    }

    /// What to write to the settings file after the user edited the
    /// effective settings. An overridden field the user left at its
    /// override value keeps the value from `file`.
    pub fn persistable(&self, file: &Config, mut edited: Config) -> Config {
        fn restore<T: PartialEq + Clone>(
            value: Option<&T>,
            edited: &mut T,
            file: &T,
        ) {
            if value == Some(&*edited) {
                *edited = file.clone();
            }
        }

        restore(self.api_key.as_ref(), &mut edited.api_key, &file.api_key);
        restore(
            self.api_base_url.as_ref(),
            &mut edited.api_base_url,
            &file.api_base_url,
        );
        restore(self.api_model.as_ref(), &mut edited.api_model, &file.api_model);
        restore(
            self.request_timeout_secs.as_ref(),
            &mut edited.request_timeout_secs,
            &file.request_timeout_secs,
        );
        restore(
            self.preview_command.as_ref(),
            &mut edited.preview_command,
            &file.preview_command,
        );
        edited
    }
}
