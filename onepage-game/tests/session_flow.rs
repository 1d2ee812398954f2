use std::sync::Arc;

use onepage_game::{
    DiceStream, GameSession, GameStatus, OutcomeTable, PlayConfig, PlayOutcome, RuleSet,
    RuleSetBuilder, STEP_CEILING, TurnObserver, TurnRecord,
};
use rand::RngCore;

/// RNG that only ever yields zero, so every roll lands on 0.
struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        dest.fill(0);
        Ok(())
    }
}

fn climb_builder() -> RuleSetBuilder {
    let mut builder = RuleSetBuilder::new(1, 5, 6);
    builder.set_starting_scores(&[0]).unwrap();
    builder.set_ending_scores(&[5], &[true]).unwrap();
    builder.set_score_text(&["Renown"], &["The bards sing of you."]).unwrap();
    for (slot, delta) in [1, 1, -1].into_iter().enumerate() {
        let mut table = OutcomeTable::new(2, 1);
        table.set_category(format!("Category {slot}"));
        table.set_outcome(0, &[delta], "first").unwrap();
        table.set_outcome(1, &[delta], "second").unwrap();
        builder.set_rule(slot, table);
    }
    builder
}

fn climb_rules() -> Arc<RuleSet> {
    Arc::new(climb_builder().build().unwrap())
}

fn twin_finish_rules() -> Arc<RuleSet> {
    let mut builder = RuleSetBuilder::new(2, 1, 6);
    builder.set_starting_scores(&[0, 0]).unwrap();
    builder.set_ending_scores(&[1, 1], &[true, false]).unwrap();
    builder
        .set_score_text(&["Treasure", "Curse"], &["Rich.", "Doomed."])
        .unwrap();
    for slot in 0..3 {
        let mut table = OutcomeTable::new(3, 2);
        for idx in 0..3 {
            table.set_outcome(idx, &[1, 1], "both rise").unwrap();
        }
        builder.set_rule(slot, table);
    }
    Arc::new(builder.build().unwrap())
}

#[test]
fn fresh_session_starts_at_starting_scores() {
    let session = GameSession::new(climb_rules(), DiceStream::from_seed(1));
    assert_eq!(session.status(), GameStatus::Ongoing);
    assert_eq!(session.scores(), &[0]);
    assert!(session.roll_history().is_empty());
    assert_eq!(session.step_count(), 0);
    assert_eq!(session.terminal_dimension(), None);
}

#[test]
fn scripted_rolls_climb_to_a_win_on_the_fifth_turn() {
    let mut session = GameSession::new(climb_rules(), DiceStream::new(ZeroRng));
    for turn in 1..=4 {
        let record = session.step().expect("session is ongoing");
        assert_eq!(record.category, 0);
        assert_eq!(record.outcome_roll, 0);
        assert_eq!(record.description, "Category 0: first");
        assert_eq!(session.scores(), &[turn]);
        assert_eq!(session.status(), GameStatus::Ongoing);
        assert!(session.reached_dimensions().is_empty());
    }

    let last = session.step().expect("fifth turn resolves");
    assert_eq!(session.scores(), &[5]);
    assert_eq!(last.terminal_dimension, Some(0));
    assert_eq!(session.status(), GameStatus::Win);
    assert_eq!(session.terminal_dimension(), Some(0));
    assert_eq!(session.roll_history(), &[0; 10]);
    assert_eq!(
        session.outcome(),
        PlayOutcome::Won {
            dimension: 0,
            turns: 5
        }
    );
}

#[test]
fn below_threshold_scores_are_not_done() {
    let mut session = GameSession::new(climb_rules(), DiceStream::new(ZeroRng));
    session.step();
    session.step();
    assert_eq!(session.is_game_done(), None);
}

#[test]
fn reset_restores_initial_state() {
    let mut session = GameSession::new(climb_rules(), DiceStream::from_seed(77));
    let outcome = session.play();
    assert!(outcome.did_win().is_some());
    session.reset();
    assert_eq!(session.status(), GameStatus::Ongoing);
    assert_eq!(session.scores(), &[0]);
    assert!(session.roll_history().is_empty());
    assert_eq!(session.step_count(), 0);
    assert_eq!(session.terminal_dimension(), None);
}

#[test]
fn undefined_ruleset_stays_invalid() {
    let mut draft = climb_builder();
    draft.set_rule(1, OutcomeTable::new(2, 1));
    let mut session = GameSession::from_builder(&draft, DiceStream::from_seed(1));
    assert_eq!(session.status(), GameStatus::Invalid);
    assert_eq!(session.play(), PlayOutcome::Invalid);
    session.reset();
    assert_eq!(session.status(), GameStatus::Invalid);
    assert_eq!(session.step_count(), 0);
}

#[test]
fn play_never_exceeds_the_step_ceiling() {
    let mut builder = climb_builder();
    let mut stuck = OutcomeTable::new(2, 1);
    stuck.set_outcome(0, &[0], "nothing").unwrap();
    stuck.set_outcome(1, &[0], "still nothing").unwrap();
    for slot in 0..3 {
        builder.set_rule(slot, stuck.clone());
    }
    let rules = Arc::new(builder.build().unwrap());
    let mut session = GameSession::new(rules, DiceStream::from_seed(2));
    assert_eq!(session.config().step_ceiling, STEP_CEILING);
    let outcome = session.play();
    assert_eq!(outcome, PlayOutcome::Inconclusive { turns: STEP_CEILING });
    assert_eq!(session.status(), GameStatus::Ongoing);
    assert_eq!(session.roll_history().len(), 2 * STEP_CEILING as usize);
}

#[test]
fn tie_break_picks_each_reached_dimension_fairly() {
    let rules = twin_finish_rules();
    let mut session = GameSession::new(rules, DiceStream::from_seed(2024));
    let trials = 4000;
    let mut treasure = 0;
    for _ in 0..trials {
        let outcome = session.play();
        match outcome {
            PlayOutcome::Won { dimension: 0, turns: 1 } => treasure += 1,
            PlayOutcome::Lost { dimension: 1, turns: 1 } => {}
            other => panic!("unexpected outcome {other:?}"),
        }
        session.reset();
    }
    let share = f64::from(treasure) / f64::from(trials);
    assert!((0.45..=0.55).contains(&share), "treasure share {share}");
}

#[derive(Default)]
struct Recorder {
    started: bool,
    turns: Vec<TurnRecord>,
    finished: Option<PlayOutcome>,
}

impl TurnObserver for Recorder {
    fn on_start(&mut self, _rules: &RuleSet) {
        self.started = true;
    }

    fn on_turn(&mut self, _rules: &RuleSet, record: &TurnRecord, _scores: &[i32]) {
        self.turns.push(record.clone());
    }

    fn on_finish(&mut self, _rules: &RuleSet, outcome: PlayOutcome, _scores: &[i32]) {
        self.finished = Some(outcome);
    }
}

#[test]
fn observer_sees_every_turn() {
    let mut session = GameSession::new(climb_rules(), DiceStream::new(ZeroRng))
        .with_config(PlayConfig::default());
    let mut recorder = Recorder::default();
    let outcome = session.play_with(&mut recorder);
    assert!(recorder.started);
    assert_eq!(recorder.turns.len(), 5);
    assert_eq!(recorder.finished, Some(outcome));
    assert_eq!(recorder.turns.last().unwrap().status, GameStatus::Win);
}
