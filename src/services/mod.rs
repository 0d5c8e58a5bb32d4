//! Service layer modules for external integrations.
//!
//! Contains clients for Redis caching, the Gemini API and media storage.

pub mod ai_client;
pub mod cache;
pub mod media;

pub use ai_client::GeminiClient;
pub use cache::RedisCache;
pub use media::MediaStore;
