//! Per-user conversation state: models, expiring store, token-ceiling
//! trimming, and token estimation.

pub mod history;
pub mod models;
pub mod store;
pub mod token_estimator;

pub use history::{append_and_trim, TrimOutcome};
pub use models::{ChatMessage, ResponseSlot, Role, UserRecord};
pub use store::ConversationStore;
pub use token_estimator::{TiktokenEstimator, TokenEstimator};
