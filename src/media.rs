//! Media backend seam between the tool router and the service clients.
//!
//! The router depends on [`MediaBackends`] so tests can substitute stub
//! backends; [`LiveMediaBackends`] wires the trait to the real clients.

use async_trait::async_trait;
use cutscene_media::config::MediaConfig;
use cutscene_media::image::ImageClient;
use cutscene_media::query::VideoQueryClient;
use cutscene_media::types::{
    GenerationOutcome, ImageRequest, QueryOutcome, VideoQueryRequest, VideoRequest,
};
use cutscene_media::video::VideoClient;

use crate::Result;

/// The slow media operations the tool router can invoke.
#[async_trait]
pub trait MediaBackends: Send + Sync {
    async fn generate_image(&self, request: &ImageRequest) -> Result<GenerationOutcome>;
    async fn generate_video(&self, request: &VideoRequest) -> Result<GenerationOutcome>;
    async fn query_videos(&self, request: &VideoQueryRequest) -> Result<QueryOutcome>;
}

/// Backends backed by the real generation and query services.
pub struct LiveMediaBackends {
    image: ImageClient,
    video: VideoClient,
    query: VideoQueryClient,
}

impl LiveMediaBackends {
    pub fn new(config: &MediaConfig) -> Result<Self> {
        Ok(Self {
            image: ImageClient::new(config.image.clone())?,
            video: VideoClient::new(config.video.clone())?,
            query: VideoQueryClient::new(config.query.clone())?,
        })
    }
}

#[async_trait]
impl MediaBackends for LiveMediaBackends {
    async fn generate_image(&self, request: &ImageRequest) -> Result<GenerationOutcome> {
        Ok(self.image.generate(request).await?)
    }

    async fn generate_video(&self, request: &VideoRequest) -> Result<GenerationOutcome> {
        Ok(self.video.generate(request).await?)
    }

    async fn query_videos(&self, request: &VideoQueryRequest) -> Result<QueryOutcome> {
        Ok(self.query.query(request).await?)
    }
}
