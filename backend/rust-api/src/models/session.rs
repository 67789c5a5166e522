use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::{Question, Tier};

/// Read-only snapshot of one session, as handed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub session_id: String,
    /// Distinct question ids served so far, in the order first served.
    pub used_question_ids: Vec<String>,
    /// Every successful selection, last-resort repeats included.
    pub served_count: u32,
    pub answers_recorded: u32,
    /// Trailing run of incorrect answers.
    pub miss_streak: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerRecord {
    pub question_id: String,
    pub correct: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Where a served question came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionSource {
    /// Unused question from the requested tier.
    Fresh,
    /// Unused question from a tier further down the fallback order.
    Fallback { tier: Tier },
    /// Every tier exhausted; a question is served again.
    Repeat,
}

impl SelectionSource {
    pub fn label(&self) -> &'static str {
        match self {
            SelectionSource::Fresh => "fresh",
            SelectionSource::Fallback { .. } => "fallback",
            SelectionSource::Repeat => "repeat",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Selection {
    pub question: Question,
    pub requested_tier: Tier,
    pub source: SelectionSource,
}

impl Selection {
    pub fn served_tier(&self) -> Tier {
        self.question.tier
    }
}
