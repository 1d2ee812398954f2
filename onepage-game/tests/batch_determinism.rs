use std::sync::Arc;

use onepage_game::{BatchConfig, BatchRunner, DiceStream, RuleSet, load_rule_set};

const CLIMB_RULES: &str = r#"{
    "full_title": "Climb",
    "full_description": "Reach five renown.",
    "die_size": 6,
    "no_outcomes_per_category": 2,
    "no_scores": 1,
    "scores": [
        { "name": "Renown", "ending_message": "Legendary.", "start": 0, "end": 5, "win_at_end": true }
    ],
    "categories": [
        { "name": "Deeds", "outcomes": [
            { "message": "A rescue", "score_changes": [1] },
            { "message": "A duel", "score_changes": [1] }
        ] },
        { "name": "Songs", "outcomes": [
            { "message": "A ballad", "score_changes": [1] },
            { "message": "A toast", "score_changes": [1] }
        ] },
        { "name": "Scandal", "outcomes": [
            { "message": "A rumor", "score_changes": [-1] },
            { "message": "A feud", "score_changes": [-1] }
        ] }
    ]
}"#;

fn climb() -> Arc<RuleSet> {
    Arc::new(load_rule_set(CLIMB_RULES).unwrap())
}

#[test]
fn fixed_seed_batches_are_identical() {
    let config = BatchConfig {
        runs: 50,
        seed: 0x5EED,
        ..BatchConfig::default()
    };
    let mut first = BatchRunner::from_config(climb(), config);
    let mut second = BatchRunner::from_config(climb(), config);
    first.run();
    second.run();

    assert_eq!(first.final_scores(), second.final_scores());
    assert_eq!(first.terminal_counts(), second.terminal_counts());
    assert_eq!(first.turn_counts(), second.turn_counts());
    assert_eq!(first.did_win(), second.did_win());
    assert_eq!(first.stats(), second.stats());
}

#[test]
fn climb_batches_always_win_on_renown() {
    let mut runner = BatchRunner::new(climb(), 50, DiceStream::from_seed(3));
    runner.run();
    let stats = runner.stats();
    assert_eq!(stats.games, 50);
    assert_eq!(stats.wins, 50);
    assert_eq!(stats.terminal_totals, vec![50]);
    assert!(runner.final_scores().iter().all(|row| row == &[5]));
    assert!(stats.mean_turns >= 5.0);
    assert!(runner.turn_counts().iter().all(|&turns| turns >= 5));
}

#[test]
fn inconclusive_runs_count_as_neither_win_nor_loss() {
    let config = BatchConfig {
        runs: 40,
        seed: 9,
        step_ceiling: 3,
    };
    let mut runner = BatchRunner::from_config(climb(), config);
    runner.run();
    let stats = runner.stats();
    assert_eq!(stats.games, 40);
    assert_eq!(stats.wins + stats.losses + stats.inconclusive, 40);
    assert!(stats.wins + stats.losses <= 40);
    assert_eq!(stats.inconclusive, 40);
    assert!(runner.terminal_counts().iter().all(|row| row == &[0]));
    assert!(runner.turn_counts().iter().all(|&turns| turns == 3));
    for record in runner.run_records() {
        assert_eq!(record.did_win, None);
        assert_eq!(record.terminal_dimension, None);
    }
}

#[test]
fn different_seeds_diverge() {
    let mut a = BatchRunner::new(climb(), 30, DiceStream::from_seed(1));
    let mut b = BatchRunner::new(climb(), 30, DiceStream::from_seed(2));
    a.run();
    b.run();
    assert_ne!(a.turn_counts(), b.turn_counts());
}
