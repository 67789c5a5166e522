use chrono::{DateTime, Utc};
use rand::{seq::IndexedRandom, Rng};

use crate::models::{Question, Selection, SelectionSource, Tier};
use crate::services::{
    difficulty::fallback_order, question_bank::QuestionBank, session_store::SessionRecord,
};

/// Picks one question for a session and records it as served.
///
/// Unused questions of `requested` come first; once that tier is exhausted the
/// fallback order is walked. When every tier is exhausted a question from
/// `requested` is served again rather than failing.
pub fn select_question<R: Rng>(
    bank: &QuestionBank,
    record: &mut SessionRecord,
    requested: Tier,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Selection {
    let (question, source) = match pick_unused(bank, record, requested, rng) {
        Some(question) => (question, SelectionSource::Fresh),
        None => fallback_order(requested)
            .into_iter()
            .find_map(|tier| {
                pick_unused(bank, record, tier, rng)
                    .map(|question| (question, SelectionSource::Fallback { tier }))
            })
            .unwrap_or_else(|| (pick_repeat(bank, requested, rng), SelectionSource::Repeat)),
    };

    match source {
        SelectionSource::Fresh => tracing::debug!(
            session_id = record.session_id(),
            question_id = %question.id,
            tier = %requested,
            "Serving fresh question"
        ),
        SelectionSource::Fallback { tier } => tracing::info!(
            session_id = record.session_id(),
            question_id = %question.id,
            requested = %requested,
            served = %tier,
            "Requested tier exhausted, serving from fallback tier"
        ),
        SelectionSource::Repeat => tracing::warn!(
            session_id = record.session_id(),
            question_id = %question.id,
            tier = %requested,
            "All tiers exhausted, serving a repeat question"
        ),
    }

    record.mark_served(&question.id, now);

    Selection {
        question: question.clone(),
        requested_tier: requested,
        source,
    }
}

fn pick_unused<'a, R: Rng>(
    bank: &'a QuestionBank,
    record: &SessionRecord,
    tier: Tier,
    rng: &mut R,
) -> Option<&'a Question> {
    let eligible: Vec<&Question> = bank
        .questions(tier)
        .iter()
        .filter(|question| !record.is_used(&question.id))
        .collect();

    eligible.choose(rng).copied()
}

/// Last resort: ignore history. Draws from `requested`, or from the first
/// non-empty tier in its fallback order when `requested` has no questions at all.
fn pick_repeat<'a, R: Rng>(
    bank: &'a QuestionBank,
    requested: Tier,
    rng: &mut R,
) -> &'a Question {
    let pool = std::iter::once(requested)
        .chain(fallback_order(requested))
        .map(|tier| bank.questions(tier))
        .find(|pool| !pool.is_empty())
        .unwrap_or_default();

    // a validated bank holds at least one question, so `pool` is non-empty here
    &pool[rng.random_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::question_bank::tests::{question, small_bank};
    use crate::services::session_store::SessionStore;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn serve(
        bank: &QuestionBank,
        store: &SessionStore,
        session_id: &str,
        tier: Tier,
        rng: &mut StdRng,
    ) -> Selection {
        store
            .with_session(session_id, |record| {
                select_question(bank, record, tier, rng, Utc::now())
            })
            .unwrap()
    }

    #[test]
    fn test_no_repeat_until_tier_exhausted() {
        let bank = small_bank();
        let store = SessionStore::new();
        let session = store.create();
        let mut rng = StdRng::seed_from_u64(1);

        let served: HashSet<String> = (0..3)
            .map(|_| {
                let selection =
                    serve(&bank, &store, &session.session_id, Tier::Beginner, &mut rng);
                assert_eq!(selection.source, SelectionSource::Fresh);
                selection.question.id
            })
            .collect();

        let expected: HashSet<String> = ["b1", "b2", "b3"].map(String::from).into();
        assert_eq!(served, expected);
    }

    #[test]
    fn test_beginner_falls_back_to_intermediate_before_advanced() {
        let bank = small_bank();
        let store = SessionStore::new();
        let session = store.create();
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..3 {
            serve(&bank, &store, &session.session_id, Tier::Beginner, &mut rng);
        }

        for _ in 0..2 {
            let selection = serve(&bank, &store, &session.session_id, Tier::Beginner, &mut rng);
            assert_eq!(
                selection.source,
                SelectionSource::Fallback {
                    tier: Tier::Intermediate
                }
            );
            assert_eq!(selection.served_tier(), Tier::Intermediate);
            assert_eq!(selection.requested_tier, Tier::Beginner);
        }

        let selection = serve(&bank, &store, &session.session_id, Tier::Beginner, &mut rng);
        assert_eq!(
            selection.source,
            SelectionSource::Fallback {
                tier: Tier::Advanced
            }
        );
        assert_eq!(selection.question.id, "a1");
    }

    #[test]
    fn test_intermediate_falls_back_to_beginner_first() {
        let bank = small_bank();
        let store = SessionStore::new();
        let session = store.create();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..2 {
            serve(&bank, &store, &session.session_id, Tier::Intermediate, &mut rng);
        }

        let selection = serve(&bank, &store, &session.session_id, Tier::Intermediate, &mut rng);
        assert_eq!(selection.served_tier(), Tier::Beginner);
    }

    #[test]
    fn test_advanced_falls_back_to_intermediate_then_beginner() {
        let bank = small_bank();
        let store = SessionStore::new();
        let session = store.create();
        let mut rng = StdRng::seed_from_u64(4);

        let tiers: Vec<Tier> = (0..6)
            .map(|_| {
                serve(&bank, &store, &session.session_id, Tier::Advanced, &mut rng).served_tier()
            })
            .collect();

        assert_eq!(
            tiers,
            vec![
                Tier::Advanced,
                Tier::Intermediate,
                Tier::Intermediate,
                Tier::Beginner,
                Tier::Beginner,
                Tier::Beginner,
            ]
        );
    }

    #[test]
    fn test_repeat_served_from_requested_tier_when_everything_is_used() {
        let bank = small_bank();
        let store = SessionStore::new();
        let session = store.create();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..bank.len() {
            let selection = serve(&bank, &store, &session.session_id, Tier::Beginner, &mut rng);
            assert_ne!(selection.source, SelectionSource::Repeat);
        }

        for _ in 0..5 {
            let selection = serve(&bank, &store, &session.session_id, Tier::Advanced, &mut rng);
            assert_eq!(selection.source, SelectionSource::Repeat);
            assert_eq!(selection.question.id, "a1");
        }

        let state = store.get(&session.session_id).unwrap();
        assert_eq!(state.used_question_ids.len(), bank.len());
        assert_eq!(state.served_count as usize, bank.len() + 5);
    }

    #[test]
    fn test_repeat_uses_fallback_pool_when_requested_tier_is_empty() {
        let bank = QuestionBank::from_tiers(
            vec![question("b1", Tier::Beginner)],
            vec![question("i1", Tier::Intermediate)],
            vec![],
        )
        .unwrap();
        let store = SessionStore::new();
        let session = store.create();
        let mut rng = StdRng::seed_from_u64(6);

        let first = serve(&bank, &store, &session.session_id, Tier::Advanced, &mut rng);
        let second = serve(&bank, &store, &session.session_id, Tier::Advanced, &mut rng);
        let third = serve(&bank, &store, &session.session_id, Tier::Advanced, &mut rng);

        assert_eq!(first.question.id, "i1");
        assert_eq!(second.question.id, "b1");
        assert_eq!(third.source, SelectionSource::Repeat);
        assert_eq!(third.question.id, "i1");
    }

    #[test]
    fn test_selection_is_recorded_in_session() {
        let bank = small_bank();
        let store = SessionStore::new();
        let session = store.create();
        let mut rng = StdRng::seed_from_u64(8);

        let selection = serve(&bank, &store, &session.session_id, Tier::Intermediate, &mut rng);
        let state = store.get(&session.session_id).unwrap();

        assert_eq!(state.used_question_ids, vec![selection.question.id]);
    }
}
