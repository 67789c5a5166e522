use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod question;
pub mod session;

pub use question::{Question, Tier};
pub use session::{AnswerRecord, Selection, SelectionSource, SessionState};

/// Body of `POST /sessions/{id}/questions`: either both levels or an explicit tier.
#[derive(Debug, Deserialize, Validate)]
pub struct NextQuestionRequest {
    #[validate(range(min = 0))]
    pub requester_level: Option<i64>,
    #[validate(range(min = 0))]
    pub counterpart_level: Option<i64>,
    pub tier: Option<Tier>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdaptiveQuestionRequest {
    #[validate(range(min = 0))]
    pub requester_level: i64,
    #[validate(range(min = 0))]
    pub counterpart_level: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordResultRequest {
    #[validate(length(min = 1, max = 128))]
    pub question_id: String,
    pub correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question: Question,
    pub requested_tier: Tier,
    pub served_tier: Tier,
    pub source: SelectionSource,
    pub damage_multiplier: f64,
}

impl From<Selection> for QuestionResponse {
    fn from(selection: Selection) -> Self {
        let served_tier = selection.served_tier();
        Self {
            damage_multiplier: selection.question.damage_multiplier(),
            requested_tier: selection.requested_tier,
            served_tier,
            source: selection.source,
            question: selection.question,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub tier: Option<Tier>,
    pub category: Option<String>,
}
