//! Request orchestration for the skill endpoint
//!
//! The handler never waits on the model call itself. It launches the
//! completion as a detached task and polls the user's response slot for
//! at most the wait budget, answering with the "check back later" button
//! when the budget runs out. The worker keeps running either way and its
//! result stays readable until the next utterance overwrites the slot.

use axum::{extract::State, Json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::api::models::{
    SkillRequest, SkillResponse, CHECK_ANSWER_COMMAND, GENERIC_ERROR_TEXT,
    NEW_CONVERSATION_COMMAND, NEW_CONVERSATION_TEXT, PROMPT_FOR_INPUT_TEXT, TOO_LONG_TEXT,
};
use crate::chat::{run_completion, CompletionBackend, InflightClaim, InflightGuard};
use crate::config::Config;
use crate::conversation::{
    append_and_trim, ChatMessage, ConversationStore, ResponseSlot, TokenEstimator, TrimOutcome,
    UserRecord,
};

/// Shared application state, constructed once at startup
#[derive(Clone)]
pub struct AppState {
    pub store: ConversationStore,
    pub backend: Arc<dyn CompletionBackend>,
    pub estimator: Arc<dyn TokenEstimator>,
    pub inflight: InflightGuard,
    pub config: Arc<Config>,
}

/// Handle one skill request
///
/// POST /api/chatgpt
pub async fn handle_skill(
    State(state): State<AppState>,
    Json(request): Json<SkillRequest>,
) -> Json<SkillResponse> {
    let start = Instant::now();
    let user_id = request.user_request.user.id;
    let utterance = request.user_request.utterance.trim().to_string();

    info!(user_id = %user_id, "skill request");

    if state.store.user(&user_id).await.is_none() {
        debug!(user_id = %user_id, "first contact, initializing state");
        state
            .store
            .set_user(UserRecord {
                user_id: user_id.clone(),
                chat_limit: state.config.chat_limit,
            })
            .await;
        state.store.set_response_slot(&user_id, ResponseSlot::Init).await;
        state.store.reset_history(&user_id).await;
    }

    let response = match utterance.as_str() {
        CHECK_ANSWER_COMMAND => check_answer(&state, &user_id, start).await,
        NEW_CONVERSATION_COMMAND => {
            state.store.reset_history(&user_id).await;
            SkillResponse::text(NEW_CONVERSATION_TEXT)
        }
        _ => ask(&state, &user_id, &utterance, start).await,
    };

    Json(response)
}

/// The check-for-answer command: re-read the slot, polling first if a
/// completion is still in flight. The slot stays readable until the next
/// normal utterance overwrites it.
async fn check_answer(state: &AppState, user_id: &str, start: Instant) -> SkillResponse {
    let mut slot = state.store.response_slot(user_id).await;
    if slot.as_ref().is_some_and(ResponseSlot::is_running) {
        slot = poll_slot(state, user_id, start).await;
    }
    render_slot(slot)
}

/// A normal utterance: append it to the history, trim to the token
/// ceiling, launch the completion worker, and wait out the poll budget.
async fn ask(state: &AppState, user_id: &str, utterance: &str, start: Instant) -> SkillResponse {
    let slot = state.store.response_slot(user_id).await;
    if slot.as_ref().is_some_and(ResponseSlot::is_running) {
        debug!(user_id = %user_id, "completion already in flight");
        return SkillResponse::check_later();
    }

    // Claim the in-flight entry before touching history so two racing
    // requests cannot both append and launch. The claim releases itself
    // if this future is dropped before the worker is spawned.
    let claim = match InflightClaim::try_claim(&state.inflight, user_id) {
        Some(claim) => claim,
        None => return SkillResponse::check_later(),
    };

    let history = match state.store.history(user_id).await {
        Some(messages) => messages,
        None => vec![ChatMessage::system(state.config.system_prompt.clone())],
    };

    let messages = match append_and_trim(
        history,
        utterance,
        state.estimator.as_ref(),
        state.config.token_ceiling,
    ) {
        TrimOutcome::Fits(messages, num_tokens) => {
            debug!(user_id = %user_id, num_tokens, "history trimmed");
            messages
        }
        TrimOutcome::TooLong => {
            state.store.reset_history(user_id).await;
            return SkillResponse::text(TOO_LONG_TEXT);
        }
    };

    state.store.set_history(user_id, messages.clone()).await;
    state.store.set_response_slot(user_id, ResponseSlot::Running).await;

    tokio::spawn(run_completion(
        state.store.clone(),
        state.backend.clone(),
        state.inflight.clone(),
        messages,
        user_id.to_string(),
    ));
    claim.transfer();

    render_slot(poll_slot(state, user_id, start).await)
}

/// Re-read the response slot every poll interval until it leaves
/// `Running` or the wait budget (measured from request start) is spent.
async fn poll_slot(state: &AppState, user_id: &str, start: Instant) -> Option<ResponseSlot> {
    loop {
        let slot = state.store.response_slot(user_id).await;
        if !slot.as_ref().is_some_and(ResponseSlot::is_running)
            || start.elapsed() >= state.config.wait_budget()
        {
            return slot;
        }
        tokio::time::sleep(state.config.poll_interval()).await;
    }
}

/// Map a slot value to the platform envelope. An absent slot (expired)
/// is treated like `Init`.
fn render_slot(slot: Option<ResponseSlot>) -> SkillResponse {
    match slot {
        Some(ResponseSlot::Running) => SkillResponse::check_later(),
        Some(ResponseSlot::Init) | None => SkillResponse::text(PROMPT_FOR_INPUT_TEXT),
        Some(ResponseSlot::Error) => SkillResponse::text(GENERIC_ERROR_TEXT),
        Some(ResponseSlot::Reply(text)) => SkillResponse::text(text),
    }
}
