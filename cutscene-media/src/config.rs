//! Media backend configuration with sensible defaults.
//!
//! One section per service. API keys default to empty strings and are
//! normally overlaid from secret references by the embedding application
//! before any client is constructed.

use serde::{Deserialize, Serialize};

use crate::error::MediaError;

/// Minimum accepted indexing quality (vertical resolution).
pub const MIN_INDEX_QUALITY: u32 = 360;
/// Maximum accepted indexing quality (vertical resolution).
pub const MAX_INDEX_QUALITY: u32 = 4096;

/// Configuration for all media backend clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Image generation service settings.
    pub image: ImageApiConfig,
    /// Video generation service settings.
    pub video: VideoApiConfig,
    /// Semantic video query and indexing service settings.
    pub query: QueryApiConfig,
    /// File storage upload service settings.
    pub upload: UploadApiConfig,
}

impl MediaConfig {
    /// Validates every section, returning the first error found.
    pub fn validate(&self) -> Result<(), MediaError> {
        self.image.validate()?;
        self.video.validate()?;
        self.query.validate()?;
        self.upload.validate()?;
        Ok(())
    }
}

/// Image generation API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageApiConfig {
    /// API key sent in the authentication task.
    pub api_key: String,
    /// Service base URL.
    pub base_url: String,
    /// Model identifier sent with every generation request.
    pub model: String,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ImageApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.runware.ai".to_owned(),
            model: "runware:101@1".to_owned(),
            timeout_seconds: 120,
        }
    }
}

impl ImageApiConfig {
    fn validate(&self) -> Result<(), MediaError> {
        if self.base_url.trim().is_empty() {
            return Err(MediaError::Config("image.base_url must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(MediaError::Config(
                "image.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Video generation API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoApiConfig {
    /// API key sent in the authentication task.
    pub api_key: String,
    /// Service base URL.
    pub base_url: String,
    /// Model identifier sent with every generation request.
    pub model: String,
    /// Output width used when the request does not specify one.
    pub default_width: u32,
    /// Output height used when the request does not specify one.
    pub default_height: u32,
    /// HTTP request timeout in seconds. Video generation is slow.
    pub timeout_seconds: u64,
}

impl Default for VideoApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.runware.ai".to_owned(),
            model: "klingai:5@3".to_owned(),
            default_width: 1920,
            default_height: 1080,
            timeout_seconds: 600,
        }
    }
}

impl VideoApiConfig {
    fn validate(&self) -> Result<(), MediaError> {
        if self.base_url.trim().is_empty() {
            return Err(MediaError::Config("video.base_url must not be empty".into()));
        }
        if self.default_width == 0 || self.default_height == 0 {
            return Err(MediaError::Config(
                "video.default_width and video.default_height must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(MediaError::Config(
                "video.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Semantic video query and indexing API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryApiConfig {
    /// Raw API key sent as the `Authorization` header.
    pub api_key: String,
    /// Service base URL.
    pub base_url: String,
    /// Library namespace used when a request does not carry one.
    pub unique_id: String,
    /// Optional webhook notified when indexing completes.
    pub callback_url: Option<String>,
    /// Indexing quality (vertical resolution), 360 to 4096.
    pub quality: u32,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for QueryApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.memories.ai".to_owned(),
            unique_id: "default".to_owned(),
            callback_url: None,
            quality: 720,
            timeout_seconds: 120,
        }
    }
}

impl QueryApiConfig {
    fn validate(&self) -> Result<(), MediaError> {
        if self.base_url.trim().is_empty() {
            return Err(MediaError::Config("query.base_url must not be empty".into()));
        }
        if self.unique_id.trim().is_empty() {
            return Err(MediaError::Config("query.unique_id must not be empty".into()));
        }
        if !(MIN_INDEX_QUALITY..=MAX_INDEX_QUALITY).contains(&self.quality) {
            return Err(MediaError::Config(format!(
                "query.quality must be between {MIN_INDEX_QUALITY} and {MAX_INDEX_QUALITY}"
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(MediaError::Config(
                "query.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// File storage upload API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadApiConfig {
    /// API key passed as the `key` query parameter.
    pub api_key: String,
    /// Service base URL.
    pub base_url: String,
    /// HTTP request timeout in seconds. Uploads can be large.
    pub timeout_seconds: u64,
}

impl Default for UploadApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.filestackapi.com".to_owned(),
            timeout_seconds: 300,
        }
    }
}

impl UploadApiConfig {
    fn validate(&self) -> Result<(), MediaError> {
        if self.base_url.trim().is_empty() {
            return Err(MediaError::Config("upload.base_url must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(MediaError::Config(
                "upload.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = MediaConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_config_has_sensible_values() {
        let config = MediaConfig::default();
        assert_eq!(config.image.model, "runware:101@1");
        assert_eq!(config.video.model, "klingai:5@3");
        assert_eq!(config.video.default_width, 1920);
        assert_eq!(config.video.default_height, 1080);
        assert_eq!(config.query.unique_id, "default");
        assert_eq!(config.query.quality, 720);
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = MediaConfig {
            image: ImageApiConfig {
                timeout_seconds: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_base_url_rejected() {
        let config = MediaConfig {
            query: QueryApiConfig {
                base_url: "  ".to_owned(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn quality_bounds_enforced() {
        for quality in [0, 359, 4097] {
            let config = MediaConfig {
                query: QueryApiConfig {
                    quality,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(config.validate().is_err(), "quality {quality} should fail");
        }
        for quality in [360, 720, 4096] {
            let config = MediaConfig {
                query: QueryApiConfig {
                    quality,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "quality {quality} should pass");
        }
    }

    #[test]
    fn zero_video_dimensions_rejected() {
        let config = MediaConfig {
            video: VideoApiConfig {
                default_width: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_toml_shape() {
        let config = MediaConfig::default();
        let json = serde_json::to_string(&config).unwrap_or_default();
        let parsed: MediaConfig = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(parsed.image.base_url, config.image.base_url);
        assert_eq!(parsed.query.quality, config.query.quality);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: MediaConfig = serde_json::from_str("{}").unwrap_or_default();
        assert_eq!(parsed.video.timeout_seconds, 600);
        assert_eq!(parsed.upload.timeout_seconds, 300);
    }
}
