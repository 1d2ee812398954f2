use anyhow::Result;
use colored::Colorize;
use onepage_game::{BatchStats, RunRecord};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

#[derive(Serialize)]
struct JsonReport<'a> {
    stats: &'a BatchStats,
    runs: &'a [RunRecord],
}

fn dimension_label(stats: &BatchStats, dimension: usize) -> String {
    stats
        .score_names
        .get(dimension)
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| format!("score {dimension}"))
}

fn outcome_label(did_win: Option<bool>) -> &'static str {
    match did_win {
        Some(true) => "win",
        Some(false) => "loss",
        None => "inconclusive",
    }
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    stats: &BatchStats,
    runs: Option<&[RunRecord]>,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Batch Simulation Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "===========================".cyan())?;
    if !stats.title.is_empty() {
        writeln!(writer, "Ruleset: {}", stats.title.bold())?;
    }

    writeln!(
        writer,
        "Out of {} games, there were {} wins and {} losses.",
        stats.games,
        stats.wins.to_string().green(),
        stats.losses.to_string().red()
    )?;
    if stats.inconclusive > 0 {
        writeln!(
            writer,
            "Inconclusive games (hit the step ceiling): {}",
            stats.inconclusive.to_string().yellow()
        )?;
    }
    writeln!(writer, "Win rate: {:.1}%", stats.win_rate() * 100.0)?;
    writeln!(
        writer,
        "Average length: {:.2} turns (std {:.2})",
        stats.mean_turns, stats.std_turns
    )?;
    writeln!(writer, "Simulation time: {total_duration:?}")?;
    writeln!(writer)?;

    writeln!(writer, "{}", "🎯 Ending Scores".bright_yellow().bold())?;
    writeln!(writer, "{}", "================".yellow())?;
    for (dim, total) in stats.terminal_totals.iter().enumerate() {
        writeln!(
            writer,
            "{:<16} ended {:>6} games ({} wins)   average final score {:>8.2}",
            dimension_label(stats, dim),
            total,
            stats.wins_by_dimension.get(dim).copied().unwrap_or(0),
            stats.mean_scores.get(dim).copied().unwrap_or(0.0)
        )?;
    }

    if let Some(runs) = runs {
        writeln!(writer)?;
        writeln!(writer, "{}", "🧾 Individual Runs".bright_white().bold())?;
        for record in runs {
            let ending = record
                .terminal_dimension
                .map_or_else(|| "-".to_string(), |dim| dimension_label(stats, dim));
            let status = match record.did_win {
                Some(true) => "WIN ".green(),
                Some(false) => "LOSS".red(),
                None => "HALT".yellow(),
            };
            writeln!(
                writer,
                "  #{:<5} {} after {:>6} turns via {:<16} scores {:?}",
                record.run + 1,
                status,
                record.turns,
                ending,
                record.final_scores
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    stats: &BatchStats,
    runs: &[RunRecord],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(&JsonReport { stats, runs })?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_csv_report<W: Write + ?Sized>(
    writer: &mut W,
    stats: &BatchStats,
    runs: &[RunRecord],
) -> Result<()> {
    let score_columns = (0..stats.score_names.len())
        .map(|dim| dimension_label(stats, dim).replace(',', " "))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "run,turns,outcome,terminal,{score_columns}")?;
    for record in runs {
        let terminal = record
            .terminal_dimension
            .map(|dim| dimension_label(stats, dim).replace(',', " "))
            .unwrap_or_default();
        let scores = record
            .final_scores
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            writer,
            "{},{},{},{},{}",
            record.run + 1,
            record.turns,
            outcome_label(record.did_win),
            terminal,
            scores
        )?;
    }
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(writer: &mut W, stats: &BatchStats) -> Result<()> {
    let title = if stats.title.is_empty() {
        "Ruleset"
    } else {
        stats.title.as_str()
    };
    writeln!(writer, "# {title} Balance Report\n")?;

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Games**: {}", stats.games)?;
    writeln!(writer, "- **Wins**: {}", stats.wins)?;
    writeln!(writer, "- **Losses**: {}", stats.losses)?;
    writeln!(writer, "- **Inconclusive**: {}", stats.inconclusive)?;
    writeln!(writer, "- **Win rate**: {:.1}%", stats.win_rate() * 100.0)?;
    writeln!(
        writer,
        "- **Average length**: {:.2} turns (std {:.2})\n",
        stats.mean_turns, stats.std_turns
    )?;

    writeln!(writer, "## Score Tracks\n")?;
    writeln!(writer, "| Score | Games ended | Wins | Mean final score |")?;
    writeln!(writer, "|---|---|---|---|")?;
    for (dim, total) in stats.terminal_totals.iter().enumerate() {
        writeln!(
            writer,
            "| {} | {} | {} | {:.2} |",
            dimension_label(stats, dim),
            total,
            stats.wins_by_dimension.get(dim).copied().unwrap_or(0),
            stats.mean_scores.get(dim).copied().unwrap_or(0.0)
        )?;
    }
    Ok(())
}
