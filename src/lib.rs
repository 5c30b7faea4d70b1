//! FocusMate Gateway - prompt and voice gateway for cloud AI services
//!
//! Serves a single-page UI and relays its requests to three Google services:
//! - Gemini for text generation
//! - Cloud Text-to-Speech for spoken replies
//! - Cloud Speech-to-Text for voice prompts
//!
//! # Architecture
//!
//! ```text
//! Browser ──► GET /            embedded page
//!         ──► POST /generate   Gemini ──► Text-to-Speech ──► "text||audio"
//!         ──► POST /transcribe Speech-to-Text ──► transcript
//! ```

pub mod api;
pub mod clients;
pub mod config;
pub mod error;

pub use clients::{GenerationClient, Service, ServiceError, SynthesisClient, TranscriptionClient};
pub use config::Config;
pub use error::{Error, Result};
