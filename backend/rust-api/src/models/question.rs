use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Difficulty tier partitioning the question bank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
}

impl Tier {
    /// All tiers in ascending difficulty.
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Intermediate => "intermediate",
            Tier::Advanced => "advanced",
        }
    }

    /// Battle damage scale for a correct answer at this tier.
    pub fn damage_multiplier(&self) -> f64 {
        match self {
            Tier::Beginner => 1.0,
            Tier::Intermediate => 1.3,
            Tier::Advanced => 1.8,
        }
    }

    /// One step down in difficulty. `Beginner` stays where it is.
    pub fn easier(&self) -> Tier {
        match self {
            Tier::Beginner | Tier::Intermediate => Tier::Beginner,
            Tier::Advanced => Tier::Intermediate,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "beginner" => Ok(Tier::Beginner),
            "intermediate" => Ok(Tier::Intermediate),
            "advanced" => Ok(Tier::Advanced),
            _ => Err(format!("Invalid tier: {}", value)),
        }
    }
}

/// A single multiple-choice question. Only `id` and `tier` matter to selection;
/// the rest is content handed through to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub tier: Tier,
    pub category: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl Question {
    pub fn damage_multiplier(&self) -> f64 {
        self.tier.damage_multiplier()
    }
}
