use chrono::Utc;
use std::sync::Arc;

use crate::config::AdaptiveSettings;
use crate::error::QuizError;
use crate::metrics::{
    ANSWERS_RECORDED_TOTAL, QUESTIONS_SERVED_TOTAL, SESSIONS_ACTIVE, SESSIONS_TOTAL,
};
use crate::models::{AnswerRecord, Selection, SessionState, Tier};
use crate::services::{
    difficulty::{level_differential, select_tier},
    question_bank::QuestionBank,
    question_selector,
    session_store::SessionStore,
};

/// Public entry point for question delivery: session lifecycle plus selection.
pub struct QuizService {
    bank: Arc<QuestionBank>,
    sessions: SessionStore,
    adaptive: AdaptiveSettings,
}

impl QuizService {
    pub fn new(bank: Arc<QuestionBank>, adaptive: AdaptiveSettings) -> Self {
        Self {
            bank,
            sessions: SessionStore::new(),
            adaptive,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn create_session(&self) -> SessionState {
        let session = self.sessions.create();

        SESSIONS_TOTAL.with_label_values(&["created"]).inc();
        SESSIONS_ACTIVE.inc();

        tracing::info!(session_id = %session.session_id, "Question session created");
        session
    }

    pub fn session_state(&self, session_id: &str) -> Result<SessionState, QuizError> {
        self.sessions.get(session_id)
    }

    /// Ends a session. Ending an unknown or already ended session is a no-op.
    pub fn end_session(&self, session_id: &str) {
        if self.sessions.end(session_id) {
            SESSIONS_TOTAL.with_label_values(&["ended"]).inc();
            SESSIONS_ACTIVE.dec();
            tracing::info!(session_id, "Question session ended");
        } else {
            tracing::debug!(session_id, "End requested for unknown session, ignoring");
        }
    }

    pub fn select_question(&self, session_id: &str, tier: Tier) -> Result<Selection, QuizError> {
        let selection = self.sessions.with_session(session_id, |record| {
            question_selector::select_question(
                &self.bank,
                record,
                tier,
                &mut rand::rng(),
                Utc::now(),
            )
        })?;

        record_selection(&selection);
        Ok(selection)
    }

    pub fn select_question_for_levels(
        &self,
        session_id: &str,
        requester_level: i64,
        counterpart_level: i64,
    ) -> Result<Selection, QuizError> {
        let tier = select_tier(level_differential(requester_level, counterpart_level));
        self.select_question(session_id, tier)
    }

    pub fn record_result(
        &self,
        session_id: &str,
        question_id: &str,
        correct: bool,
    ) -> Result<SessionState, QuizError> {
        let state = self.sessions.with_session(session_id, |record| {
            record.record_answer(AnswerRecord {
                question_id: question_id.to_string(),
                correct,
                recorded_at: Utc::now(),
            });
            record.snapshot()
        })?;

        ANSWERS_RECORDED_TOTAL
            .with_label_values(&[if correct { "true" } else { "false" }])
            .inc();

        tracing::debug!(
            session_id,
            question_id,
            correct,
            miss_streak = state.miss_streak,
            "Answer result recorded"
        );
        Ok(state)
    }

    /// Level-based selection that eases off by one tier after a run of misses.
    pub fn select_adaptive_question(
        &self,
        session_id: &str,
        requester_level: i64,
        counterpart_level: i64,
    ) -> Result<Selection, QuizError> {
        let base = select_tier(level_differential(requester_level, counterpart_level));
        let threshold = self.adaptive.miss_streak_threshold;

        let selection = self.sessions.with_session(session_id, |record| {
            let miss_streak = record.miss_streak();
            let tier = if threshold > 0 && miss_streak >= threshold {
                tracing::debug!(
                    session_id = record.session_id(),
                    miss_streak,
                    from = %base,
                    to = %base.easier(),
                    "Stepping difficulty down after repeated misses"
                );
                base.easier()
            } else {
                base
            };

            question_selector::select_question(
                &self.bank,
                record,
                tier,
                &mut rand::rng(),
                Utc::now(),
            )
        })?;

        record_selection(&selection);
        Ok(selection)
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many were removed.
    pub fn reap_idle_sessions(&self, ttl: std::time::Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expired = self.sessions.reap_idle(Utc::now(), ttl);

        if !expired.is_empty() {
            SESSIONS_TOTAL
                .with_label_values(&["expired"])
                .inc_by(expired.len() as u64);
            SESSIONS_ACTIVE.sub(expired.len() as i64);
            tracing::info!(count = expired.len(), "Reaped idle question sessions");
        }

        expired.len()
    }
}

fn record_selection(selection: &Selection) {
    QUESTIONS_SERVED_TOTAL
        .with_label_values(&[
            selection.requested_tier.as_str(),
            selection.served_tier().as_str(),
            selection.source.label(),
        ])
        .inc();
}
