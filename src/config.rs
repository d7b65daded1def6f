//! Configuration types for the voice assistant.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AssistantError, Result};

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Realtime voice transport settings.
    pub voice: VoiceConfig,
    /// Session context settings.
    pub context: ContextConfig,
    /// Media backend client settings.
    pub media: cutscene_media::MediaConfig,
    /// Secret references overlaid into the media sections at startup.
    pub secrets: SecretsConfig,
}

/// Realtime voice service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// WebSocket endpoint of the realtime voice service.
    pub endpoint_url: String,
    /// Voice configuration id selecting persona and tool definitions.
    pub config_id: Option<String>,
    /// API key reference for token acquisition.
    pub api_key: SecretRef,
    /// Secret key reference for token acquisition.
    pub secret_key: SecretRef,
    /// Base URL of the token endpoint.
    pub auth_base_url: String,
    /// Token request timeout in seconds.
    pub auth_timeout_seconds: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "wss://api.hume.ai/v0/evi/chat".to_owned(),
            config_id: None,
            api_key: SecretRef::None,
            secret_key: SecretRef::None,
            auth_base_url: "https://api.hume.ai".to_owned(),
            auth_timeout_seconds: 30,
        }
    }
}

impl VoiceConfig {
    /// Resolves the token credentials, erroring when either is missing.
    pub fn resolve_credentials(&self) -> Result<(String, String)> {
        let api_key = self
            .api_key
            .resolve()?
            .ok_or_else(|| AssistantError::Config("voice.api_key is not configured".to_owned()))?;
        let secret_key = self.secret_key.resolve()?.ok_or_else(|| {
            AssistantError::Config("voice.secret_key is not configured".to_owned())
        })?;
        Ok((api_key, secret_key))
    }
}

/// Session context configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Delay between the session opening and context injection, in ms.
    pub inject_delay_ms: u64,
    /// Identifier of the video the assistant should know about.
    pub video_no: Option<String>,
    /// Source URL of that video.
    pub video_url: Option<String>,
    /// Send context with the connection request instead of injecting
    /// after the session opens.
    pub inline: bool,
    /// Query conversation to resume for follow-up questions.
    pub session_id: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            inject_delay_ms: 500,
            video_no: None,
            video_url: None,
            inline: false,
            session_id: None,
        }
    }
}

/// Secret references for the media backend API keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Image generation API key.
    pub image_api_key: SecretRef,
    /// Video generation API key.
    pub video_api_key: SecretRef,
    /// Video query/indexing API key.
    pub query_api_key: SecretRef,
    /// File storage API key.
    pub upload_api_key: SecretRef,
}

/// Secret reference used for API credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretRef {
    /// No secret configured.
    #[default]
    None,
    /// Inline literal value (discouraged; use env when possible).
    Literal { value: String },
    /// Resolve from an environment variable.
    Env { var: String },
}

impl SecretRef {
    /// Resolves the reference to a concrete value.
    ///
    /// # Errors
    ///
    /// Returns a config error when a referenced environment variable is
    /// missing or empty.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::Literal { value } => Ok(Some(value.clone())),
            Self::Env { var } => {
                let value = std::env::var(var).map_err(|_| {
                    AssistantError::Config(format!("secret env var is missing: {var}"))
                })?;
                if value.trim().is_empty() {
                    return Err(AssistantError::Config(format!(
                        "secret env var is empty: {var}"
                    )));
                }
                Ok(Some(value))
            }
        }
    }
}

impl AssistantConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AssistantError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AssistantError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default path, or return defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_config_path();
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path: `~/.config/cutscene/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("cutscene").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("cutscene")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/cutscene-config/config.toml")
        }
    }

    /// Overlays resolved secret references into the media sections.
    ///
    /// Unset references leave the corresponding key untouched, so inline
    /// `media.*.api_key` values still work.
    ///
    /// # Errors
    ///
    /// Propagates resolution failures (missing or empty env vars).
    pub fn resolve_media_secrets(&mut self) -> Result<()> {
        if let Some(key) = self.secrets.image_api_key.resolve()? {
            self.media.image.api_key = key;
        }
        if let Some(key) = self.secrets.video_api_key.resolve()? {
            self.media.video.api_key = key;
        }
        if let Some(key) = self.secrets.query_api_key.resolve()? {
            self.media.query.api_key = key;
        }
        if let Some(key) = self.secrets.upload_api_key.resolve()? {
            self.media.upload.api_key = key;
        }
        Ok(())
    }

    /// Validates the configuration, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.voice.endpoint_url.trim().is_empty() {
            return Err(AssistantError::Config(
                "voice.endpoint_url must not be empty".to_owned(),
            ));
        }
        if !self.voice.endpoint_url.starts_with("ws") {
            return Err(AssistantError::Config(
                "voice.endpoint_url must be a ws:// or wss:// URL".to_owned(),
            ));
        }
        if self.voice.auth_base_url.trim().is_empty() {
            return Err(AssistantError::Config(
                "voice.auth_base_url must not be empty".to_owned(),
            ));
        }
        if self.voice.auth_timeout_seconds == 0 {
            return Err(AssistantError::Config(
                "voice.auth_timeout_seconds must be greater than 0".to_owned(),
            ));
        }
        self.media.validate()?;
        Ok(())
    }
}
