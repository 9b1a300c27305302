//! Client for the external multimodal inference API.
//!
//! Speaks the OpenAI-compatible chat-completions protocol: an image is sent
//! inline as a base64 `data:` URL next to a text prompt, and the model's
//! free-form text answer is returned to the caller for parsing.

pub mod client;
pub mod config;
pub mod messages;

pub use client::{VisionClient, VisionError};
pub use config::{VisionConfig, DEFAULT_TIMEOUT_SECS};
