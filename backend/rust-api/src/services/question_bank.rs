use rand::{seq::IndexedRandom, Rng};
use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use crate::error::BankError;
use crate::models::{Question, Tier};
use crate::services::difficulty::select_tier;

const BUILTIN_BANK: &str = include_str!("../../content/questions.json");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BankFile {
    #[serde(default)]
    beginner: Vec<Question>,
    #[serde(default)]
    intermediate: Vec<Question>,
    #[serde(default)]
    advanced: Vec<Question>,
}

/// Immutable, tier-partitioned set of questions loaded once at startup.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    tiers: [Vec<Question>; 3],
    index: HashMap<String, (Tier, usize)>,
}

impl QuestionBank {
    /// The bank shipped with the crate.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json_str(BUILTIN_BANK)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, BankError> {
        let file: BankFile = serde_json::from_str(raw)?;
        Self::from_tiers(file.beginner, file.intermediate, file.advanced)
    }

    pub fn from_tiers(
        beginner: Vec<Question>,
        intermediate: Vec<Question>,
        advanced: Vec<Question>,
    ) -> Result<Self, BankError> {
        let tiers = [beginner, intermediate, advanced];
        let mut index = HashMap::new();

        for (listed, questions) in Tier::ALL.into_iter().zip(tiers.iter()) {
            for (position, question) in questions.iter().enumerate() {
                if question.tier != listed {
                    return Err(BankError::TierMismatch {
                        id: question.id.clone(),
                        declared: question.tier,
                        listed,
                    });
                }
                if question.correct_answer >= question.options.len() {
                    return Err(BankError::InvalidAnswerIndex {
                        id: question.id.clone(),
                        index: question.correct_answer,
                        options: question.options.len(),
                    });
                }
                if index
                    .insert(question.id.clone(), (listed, position))
                    .is_some()
                {
                    return Err(BankError::DuplicateId(question.id.clone()));
                }
            }
        }

        if index.is_empty() {
            return Err(BankError::Empty);
        }

        Ok(Self { tiers, index })
    }

    pub fn questions(&self, tier: Tier) -> &[Question] {
        &self.tiers[tier as usize]
    }

    pub fn all(&self) -> impl Iterator<Item = &Question> {
        self.tiers.iter().flatten()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.index
            .get(id)
            .map(|(tier, position)| &self.tiers[*tier as usize][*position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Question> {
        self.all().filter(move |question| question.category == category)
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.all().map(|question| question.category.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn tier_len(&self, tier: Tier) -> usize {
        self.questions(tier).len()
    }

    /// Uniform pick from one tier, ignoring any session history.
    pub fn random_question<R: Rng>(&self, tier: Tier, rng: &mut R) -> Option<&Question> {
        self.questions(tier).choose(rng)
    }

    /// Stateless pick for a level differential.
    pub fn question_for_level_difference<R: Rng>(
        &self,
        level_differential: i64,
        rng: &mut R,
    ) -> Option<&Question> {
        self.random_question(select_tier(level_differential), rng)
    }
}
