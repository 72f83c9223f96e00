//! KakaoTalk skill webhook bridge to an OpenAI-compatible chat API
//!
//! The platform enforces a hard response deadline that the model call
//! routinely exceeds, so the bridge decouples the two: completions run as
//! detached background tasks writing into a per-user response slot, and
//! request handlers poll that slot for a bounded wait budget before
//! falling back to a "check back later" quick-reply.

pub mod api;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod sweep;

pub use api::{build_router, AppState};
pub use config::Config;
pub use error::{BridgeError, Result};
