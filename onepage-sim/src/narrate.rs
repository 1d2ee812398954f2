//! Human-readable narration for single-play mode.
use colored::Colorize;
use onepage_game::{PlayOutcome, RuleSet, TurnObserver, TurnRecord};
use std::io::{self, Write};

/// Writes a play-by-play account of a game. The first write error is kept and
/// returned from [`Narrator::finish`]; later events are dropped.
pub struct Narrator<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> Narrator<W> {
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, write: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = write(&mut self.out).and_then(|()| self.out.flush()) {
            self.error = Some(err);
        }
    }
}

impl<W: Write> TurnObserver for Narrator<W> {
    fn on_start(&mut self, rules: &RuleSet) {
        self.emit(|out| {
            writeln!(out, "{}\n", rules.title().bold())?;
            writeln!(out, "{}\n", rules.description())?;
            writeln!(out, "----------\n")
        });
    }

    fn on_turn(&mut self, rules: &RuleSet, record: &TurnRecord, scores: &[i32]) {
        let line = rules.format_scores(scores);
        self.emit(|out| {
            writeln!(out, "You rolled a {}.", record.outcome_roll + 1)?;
            writeln!(out, "{}", record.description)?;
            writeln!(out, "bringing your current scores to")?;
            writeln!(out, "{line}\n")
        });
    }

    fn on_finish(&mut self, rules: &RuleSet, outcome: PlayOutcome, _scores: &[i32]) {
        let message = outcome
            .dimension()
            .and_then(|dim| rules.track(dim))
            .map(|track| track.ending_message.clone());
        self.emit(|out| match (outcome, message) {
            (PlayOutcome::Won { .. }, Some(message)) => writeln!(out, "{}", message.green()),
            (PlayOutcome::Lost { .. }, Some(message)) => writeln!(out, "{}", message.red()),
            (PlayOutcome::Inconclusive { turns }, _) => writeln!(
                out,
                "{}",
                format!(
                    "There has been an error. The game was halted after {turns} turns without reaching an ending."
                )
                .yellow()
            ),
            (PlayOutcome::Invalid, _) => writeln!(out, "{}", "Can not play. Game is invalid.".red()),
            _ => writeln!(out, "{}", "There has been an error.".red()),
        });
    }
}
