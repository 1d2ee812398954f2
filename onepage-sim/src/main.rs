mod narrate;
mod reports;
mod rules_file;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use narrate::Narrator;
use onepage_game::constants::DEFAULT_SEED;
use onepage_game::{
    BatchConfig, BatchStats, PlayConfig, PlayOutcome, RuleSet, RulesEngine, RunRecord,
    STEP_CEILING,
};
use rules_file::RulesFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Play one narrated game at human pace
    Play,
    /// Run many silent games and report statistics
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Csv,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "onepage-sim", version = "0.1.0")]
#[command(about = "Play or balance-test a one-page dice RPG ruleset")]
struct Args {
    /// Play a single game or run a batch
    #[arg(long, value_enum, default_value_t = RunMode::Play)]
    mode: RunMode,

    /// Seconds between turns in play mode; number of games in batch mode
    #[arg(long, default_value_t = 3)]
    count: u64,

    /// JSON rules document (defaults to the bundled example)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Seed for the dice
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Turns allowed before a game is declared inconclusive
    #[arg(long, default_value_t = STEP_CEILING)]
    step_ceiling: u32,

    /// Batch report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the narration or report instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List every run in the console report
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let engine = RulesEngine::new(RulesFile::from_arg(args.rules.clone()));

    match args.mode {
        RunMode::Play => {
            let outcome = run_play(&args, &engine)?;
            log::debug!("play finished: {outcome:?}");
        }
        RunMode::Batch => {
            let stats = run_batch(&args, &engine)?;
            log::debug!(
                "batch finished: {} wins, {} losses",
                stats.wins,
                stats.losses
            );
        }
    }

    println!(
        "⏱️  Ran in {:.3} seconds",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn announce_banner() {
    println!("{}", "🎲 One-Page RPG Simulator".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn play_config(args: &Args) -> PlayConfig {
    PlayConfig {
        step_ceiling: args.step_ceiling,
        ..PlayConfig::paced(args.count)
    }
}

fn log_rules(rules: &RuleSet) {
    let (score_dim, die_size) = rules.dims();
    log::info!(
        "loaded '{}' with {score_dim} scores on a d{die_size}",
        rules.title()
    );
}

fn batch_config(args: &Args) -> Result<BatchConfig> {
    let runs = usize::try_from(args.count)
        .with_context(|| format!("{} games is more than this platform can hold", args.count))?;
    Ok(BatchConfig {
        runs,
        seed: args.seed,
        step_ceiling: args.step_ceiling,
    })
}

fn run_play(args: &Args, engine: &RulesEngine<RulesFile>) -> Result<PlayOutcome> {
    let mut session = engine
        .create_session(args.seed, play_config(args))
        .context("cannot build a ruleset to play")?;
    if let Some(rules) = session.rules() {
        log_rules(rules);
    }
    let mut narrator = Narrator::new(OutputTarget::new(args.output.clone())?);
    let outcome = session.play_with(&mut narrator);
    narrator
        .finish()
        .context("failed to write the game narration")?;
    log::info!(
        "final scores after {} dice draws: {}",
        session.dice().draws(),
        session.score_line()
    );
    Ok(outcome)
}

fn run_batch(args: &Args, engine: &RulesEngine<RulesFile>) -> Result<BatchStats> {
    let config = batch_config(args)?;
    let mut runner = engine
        .create_batch(config)
        .context("cannot build a ruleset to simulate")?;
    if let Some(rules) = runner.session().rules() {
        log_rules(rules);
    }
    let batch_start = Instant::now();
    runner.run();
    let elapsed = batch_start.elapsed();

    let stats = runner.stats();
    write_reports(args, &stats, &runner.run_records(), elapsed)?;
    Ok(stats)
}

fn write_reports(
    args: &Args,
    stats: &BatchStats,
    runs: &[RunRecord],
    duration: Duration,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, stats, runs)?,
        ReportFormat::Csv => reports::generate_csv_report(&mut output_target, stats, runs)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut output_target, stats)?,
        ReportFormat::Console => reports::generate_console_report(
            &mut output_target,
            stats,
            args.verbose.then_some(runs),
            duration,
        )?,
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            mode: RunMode::Batch,
            count: 5,
            rules: None,
            seed: 1337,
            step_ceiling: STEP_CEILING,
            report: ReportFormat::Console,
            verbose: false,
            output: None,
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("onepage-sim-{}-{name}", std::process::id()))
    }

    fn builtin() -> RulesEngine<RulesFile> {
        RulesEngine::new(RulesFile::Bundled)
    }

    #[test]
    fn parses_defaults() {
        let args = Args::try_parse_from(["onepage-sim"]).unwrap();
        assert_eq!(args.mode, RunMode::Play);
        assert_eq!(args.count, 3);
        assert_eq!(args.seed, DEFAULT_SEED);
        assert_eq!(args.report, ReportFormat::Console);
        assert!(args.rules.is_none());
    }

    #[test]
    fn rejects_unknown_report_format() {
        assert!(Args::try_parse_from(["onepage-sim", "--report", "yaml"]).is_err());
    }

    #[test]
    fn play_config_uses_count_as_pause() {
        let args = Args {
            count: 2,
            step_ceiling: 50,
            ..base_args()
        };
        let config = play_config(&args);
        assert_eq!(config.pause(), Duration::from_secs(2));
        assert_eq!(config.step_ceiling, 50);
    }

    #[test]
    fn missing_rules_file_fails_before_playing() {
        let engine = RulesEngine::new(RulesFile::Path(temp_file("absent.json")));
        let args = Args {
            output: Some(temp_file("never-written.txt")),
            ..base_args()
        };
        let err = run_batch(&args, &engine).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read rules file"));
    }

    #[test]
    fn batch_config_uses_count_as_runs() {
        let config = batch_config(&base_args()).unwrap();
        assert_eq!(config.runs, 5);
        assert_eq!(config.seed, 1337);
    }

    #[test]
    fn run_play_narrates_into_output_file() {
        colored::control::set_override(false);
        let temp = temp_file("play.txt");
        let args = Args {
            mode: RunMode::Play,
            count: 0,
            output: Some(temp.clone()),
            ..base_args()
        };
        let outcome = run_play(&args, &builtin()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("The Harbor Run"));
        assert!(content.contains("You rolled a"));
        assert!(outcome.did_win().is_some());
    }

    #[test]
    fn run_batch_is_repeatable_for_a_seed() {
        let temp = temp_file("batch-a.json");
        let args = Args {
            report: ReportFormat::Json,
            output: Some(temp.clone()),
            ..base_args()
        };
        let first = run_batch(&args, &builtin()).unwrap();
        let second = run_batch(&args, &builtin()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.games, 5);
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = temp_file("report.json");
        let args = Args {
            report: ReportFormat::Json,
            output: Some(temp.clone()),
            ..base_args()
        };
        run_batch(&args, &builtin()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["stats"]["games"], 5);
        assert_eq!(value["runs"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn write_reports_emits_csv_report() {
        let temp = temp_file("report.csv");
        let args = Args {
            report: ReportFormat::Csv,
            output: Some(temp.clone()),
            ..base_args()
        };
        run_batch(&args, &builtin()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.starts_with("run,turns,outcome,terminal,Supplies,Distance,Storm"));
        assert_eq!(content.lines().count(), 6);
    }

    #[test]
    fn write_reports_emits_markdown_report() {
        let temp = temp_file("report.md");
        let args = Args {
            report: ReportFormat::Markdown,
            output: Some(temp.clone()),
            ..base_args()
        };
        run_batch(&args, &builtin()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("# The Harbor Run Balance Report"));
    }

    #[test]
    fn verbose_console_report_lists_runs() {
        colored::control::set_override(false);
        let temp = temp_file("report.txt");
        let args = Args {
            verbose: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        run_batch(&args, &builtin()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Out of 5 games"));
        assert!(content.contains("Individual Runs"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
