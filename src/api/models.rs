//! Kakao skill request/response envelopes
//!
//! Response shapes follow the skill response format:
//! https://i.kakao.com/docs/skill-response-format

use serde::{Deserialize, Serialize};

/// Utterance that re-reads the response slot instead of asking the model
pub const CHECK_ANSWER_COMMAND: &str = "답변 확인 하기";
/// Utterance that resets the conversation
pub const NEW_CONVERSATION_COMMAND: &str = "새로운 대화";

pub const STILL_THINKING_TEXT: &str = "답변을 준비하고 있습니다.";
pub const PROMPT_FOR_INPUT_TEXT: &str = "질문을 입력 해주세요.";
pub const GENERIC_ERROR_TEXT: &str = "오류가 발생하였습니다.";
pub const TOO_LONG_TEXT: &str = "너무 긴 입력입니다. 다시 입력해주세요.";
pub const NEW_CONVERSATION_TEXT: &str = "새로운 대화를 시작합니다.";

/// Incoming skill payload; only the fields the bridge uses
#[derive(Debug, Clone, Deserialize)]
pub struct SkillRequest {
    #[serde(rename = "userRequest")]
    pub user_request: UserRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRequest {
    pub user: SkillUser,
    pub utterance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillUser {
    pub id: String,
}

/// Outgoing skill response envelope
#[derive(Debug, Clone, Serialize)]
pub struct SkillResponse {
    pub version: &'static str,
    pub template: SkillTemplate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillTemplate {
    pub outputs: Vec<SkillOutput>,
    #[serde(rename = "quickReplies", skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReply>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillOutput {
    #[serde(rename = "simpleText")]
    pub simple_text: SimpleText,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimpleText {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickReply {
    #[serde(rename = "messageText")]
    pub message_text: String,
    pub action: &'static str,
    pub label: String,
}

impl SkillResponse {
    /// Plain text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            version: "2.0",
            template: SkillTemplate {
                outputs: vec![SkillOutput { simple_text: SimpleText { text: text.into() } }],
                quick_replies: None,
            },
        }
    }

    /// "Still thinking" reply with a quick-reply button that re-sends the
    /// check-for-answer command
    pub fn check_later() -> Self {
        Self {
            version: "2.0",
            template: SkillTemplate {
                outputs: vec![SkillOutput {
                    simple_text: SimpleText { text: STILL_THINKING_TEXT.to_string() },
                }],
                quick_replies: Some(vec![QuickReply {
                    message_text: CHECK_ANSWER_COMMAND.to_string(),
                    action: "message",
                    label: CHECK_ANSWER_COMMAND.to_string(),
                }]),
            },
        }
    }
}
