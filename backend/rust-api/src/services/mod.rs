use std::sync::Arc;

use crate::config::Config;
use question_bank::QuestionBank;
use quiz_service::QuizService;

pub struct AppState {
    pub config: Config,
    pub quiz: Arc<QuizService>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let bank = match config.content.question_bank_path.as_deref() {
            Some(path) => {
                tracing::info!("Loading question bank from {}", path);
                QuestionBank::from_path(path)
                    .map_err(|e| anyhow::anyhow!("Failed to load question bank {}: {}", path, e))?
            }
            None => QuestionBank::builtin()?,
        };

        tracing::info!(
            beginner = bank.tier_len(crate::models::Tier::Beginner),
            intermediate = bank.tier_len(crate::models::Tier::Intermediate),
            advanced = bank.tier_len(crate::models::Tier::Advanced),
            "Question bank ready"
        );

        let quiz = Arc::new(QuizService::new(Arc::new(bank), config.adaptive));

        Ok(Self { config, quiz })
    }
}

pub mod difficulty;
pub mod question_bank;
pub mod question_selector;
pub mod quiz_service;
pub mod session_reaper;
pub mod session_store;
