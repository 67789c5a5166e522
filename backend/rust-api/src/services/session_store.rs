use chrono::{DateTime, Duration, Utc};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use uuid::Uuid;

use crate::error::QuizError;
use crate::models::{AnswerRecord, SessionState};

/// Mutable history of one session. Only reachable through [`SessionStore`].
#[derive(Debug)]
pub struct SessionRecord {
    session_id: String,
    used_order: Vec<String>,
    used: HashSet<String>,
    served_count: u32,
    answers: Vec<AnswerRecord>,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl SessionRecord {
    fn new(session_id: String, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            used_order: Vec::new(),
            used: HashSet::new(),
            served_count: 0,
            answers: Vec::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_used(&self, question_id: &str) -> bool {
        self.used.contains(question_id)
    }

    pub fn used_question_ids(&self) -> &[String] {
        &self.used_order
    }

    /// Records a served question. Serving an already-used id again counts
    /// towards `served_count` but does not duplicate it in the used set.
    pub fn mark_served(&mut self, question_id: &str, now: DateTime<Utc>) {
        self.served_count += 1;
        if self.used.insert(question_id.to_string()) {
            self.used_order.push(question_id.to_string());
        }
        self.last_active_at = now;
    }

    pub fn record_answer(&mut self, answer: AnswerRecord) {
        self.last_active_at = answer.recorded_at;
        self.answers.push(answer);
    }

    pub fn miss_streak(&self) -> u32 {
        self.answers
            .iter()
            .rev()
            .take_while(|answer| !answer.correct)
            .count() as u32
    }

    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            session_id: self.session_id.clone(),
            used_question_ids: self.used_order.clone(),
            served_count: self.served_count,
            answers_recorded: self.answers.len() as u32,
            miss_streak: self.miss_streak(),
            created_at: self.created_at,
        }
    }
}

/// Registry of active sessions keyed by id.
///
/// The outer lock only guards membership; each session carries its own mutex so
/// concurrent selections on one session are serialized while different sessions
/// never wait on each other.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionRecord>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> SessionState {
        self.create_at(Utc::now())
    }

    pub fn create_at(&self, now: DateTime<Utc>) -> SessionState {
        let session_id = Uuid::new_v4().to_string();
        let record = SessionRecord::new(session_id.clone(), now);
        let state = record.snapshot();

        self.write()
            .insert(session_id, Arc::new(Mutex::new(record)));

        state
    }

    pub fn get(&self, session_id: &str) -> Result<SessionState, QuizError> {
        self.with_session(session_id, |record| record.snapshot())
    }

    /// Removes a session. Unknown ids are ignored; the return value tells
    /// whether anything was removed.
    pub fn end(&self, session_id: &str) -> bool {
        self.write().remove(session_id).is_some()
    }

    /// Runs `f` while holding the session's lock.
    pub fn with_session<F, R>(&self, session_id: &str, f: F) -> Result<R, QuizError>
    where
        F: FnOnce(&mut SessionRecord) -> R,
    {
        let handle = self
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| QuizError::SessionNotFound(session_id.to_string()))?;

        let mut record = lock_record(&handle);
        Ok(f(&mut record))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Drops sessions idle for longer than `ttl` and returns their ids.
    pub fn reap_idle(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<String> {
        let mut sessions = self.write();
        let mut expired = Vec::new();

        sessions.retain(|session_id, handle| {
            let alive = lock_record(handle)
                .last_active_at()
                .checked_add_signed(ttl)
                .is_none_or(|deadline| deadline > now);
            if !alive {
                expired.push(session_id.clone());
            }
            alive
        });

        expired
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Mutex<SessionRecord>>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Mutex<SessionRecord>>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_record(handle: &Mutex<SessionRecord>) -> MutexGuard<'_, SessionRecord> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
