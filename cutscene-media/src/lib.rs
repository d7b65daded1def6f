//! # cutscene-media
//!
//! HTTP clients for the media services behind Cutscene's voice assistant.
//!
//! The assistant's tool calls bottom out in slow, fallible web APIs:
//! image and video generation, semantic queries over indexed footage, and
//! file storage. This crate wraps those APIs behind small typed clients
//! so the rest of Cutscene never touches their wire formats.
//!
//! ## Design
//!
//! - One client per service, each built from its own config section
//! - Expected failures (rejected input, API errors, empty results) are
//!   reported in the outcome types, not as `Err`
//! - `Err` is reserved for transport faults, undecodable responses and
//!   misconfiguration
//! - No retries or caching; callers own their failure policy
//!
//! ## Security
//!
//! - API keys are plain strings here; the embedding application resolves
//!   them from secret references before constructing clients
//! - Prompts and API keys never appear in log output

pub mod config;
pub mod error;
mod http;
pub mod image;
mod inference;
pub mod query;
pub mod types;
pub mod upload;
pub mod video;

pub use config::{ImageApiConfig, MediaConfig, QueryApiConfig, UploadApiConfig, VideoApiConfig};
pub use error::{MediaError, Result};
pub use image::ImageClient;
pub use query::VideoQueryClient;
pub use types::{
    GenerationOutcome, ImageRequest, IndexedVideo, QueryOutcome, QueryThinking, ReferenceSegment,
    UploadedFile, VideoQueryRequest, VideoReference, VideoRequest,
};
pub use upload::UploadClient;
pub use video::{VideoClient, MAX_DURATION_SECONDS};
