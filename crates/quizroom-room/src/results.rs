//! Result formatting: per-player answer lists → per-question maps.

use quizroom_protocol::{QuestionResult, Roster};

/// Fallback question count for a round whose quiz length is unknown.
pub const DEFAULT_QUESTION_COUNT: usize = 10;

/// Pivots every player's answers into one map per question index.
///
/// Entry `i` maps username → that player's answer to question `i`.
/// Players with no answers (absent or empty) are left out, as is any
/// player whose list ends before `i`. Extra answers beyond the quiz
/// length are dropped. A `question_count` of zero falls back to
/// [`DEFAULT_QUESTION_COUNT`].
///
/// ```
/// use quizroom_protocol::{PlayerState, Roster};
/// use quizroom_room::format_results;
///
/// let mut players = Roster::new();
/// players.insert("alice".into(), PlayerState { answers: Some(vec![0, 1]) });
/// players.insert("bob".into(), PlayerState { answers: None });
///
/// let results = format_results(&players, 2);
/// assert_eq!(results[1]["alice"], 1);
/// assert!(!results[0].contains_key("bob"));
/// ```
pub fn format_results(players: &Roster, question_count: usize) -> Vec<QuestionResult> {
    let count = if question_count == 0 {
        DEFAULT_QUESTION_COUNT
    } else {
        question_count
    };

    let mut results = vec![QuestionResult::new(); count];
    for (username, player) in players {
        let Some(answers) = player.answers.as_deref() else {
            continue;
        };
        for (slot, answer) in results.iter_mut().zip(answers) {
            slot.insert(username.clone(), *answer);
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizroom_protocol::PlayerState;

    fn roster(entries: &[(&str, Option<Vec<u32>>)]) -> Roster {
        entries
            .iter()
            .map(|(name, answers)| {
                (
                    name.to_string(),
                    PlayerState {
                        answers: answers.clone(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_format_results_two_players_pivots_by_index() {
        let players = roster(&[("alice", Some(vec![0, 1])), ("bob", Some(vec![1, 1]))]);

        let results = format_results(&players, 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], QuestionResult::from([("alice".into(), 0), ("bob".into(), 1)]));
        assert_eq!(results[1], QuestionResult::from([("alice".into(), 1), ("bob".into(), 1)]));
    }

    #[test]
    fn test_format_results_absent_and_empty_answers_are_omitted() {
        let players = roster(&[
            ("alice", Some(vec![2, 3])),
            ("bob", None),
            ("carol", Some(vec![])),
        ]);

        let results = format_results(&players, 2);

        for slot in &results {
            assert_eq!(slot.len(), 1);
            assert!(slot.contains_key("alice"));
        }
    }

    #[test]
    fn test_format_results_short_list_omitted_past_its_end() {
        let players = roster(&[("alice", Some(vec![0, 1, 2])), ("bob", Some(vec![3]))]);

        let results = format_results(&players, 3);

        assert_eq!(results[0].get("bob"), Some(&3));
        assert!(!results[1].contains_key("bob"));
        assert!(!results[2].contains_key("bob"));
        assert_eq!(results[2].get("alice"), Some(&2));
    }

    #[test]
    fn test_format_results_extra_answers_dropped() {
        let players = roster(&[("alice", Some(vec![0, 1, 2, 3]))]);
        assert_eq!(format_results(&players, 2).len(), 2);
    }

    #[test]
    fn test_format_results_nobody_answered_gives_empty_maps() {
        let players = roster(&[("alice", None), ("bob", None)]);

        let results = format_results(&players, 3);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(QuestionResult::is_empty));
    }

    #[test]
    fn test_format_results_zero_count_uses_default() {
        let results = format_results(&Roster::new(), 0);
        assert_eq!(results.len(), DEFAULT_QUESTION_COUNT);
    }
}
