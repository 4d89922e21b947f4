//! ClickPunter CLI - A/B/C selections and boxed stake plans from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use clickpunter::core::odds::{cents_to_dollars, format_currency, format_odds};
use clickpunter::core::{
    RaceAnalysis, Role, StakeBreakdown, StakeCalculator, Strategy, StrategyKind,
};
use clickpunter::history::{BetHistory, HistorySummary, RaceResult, ResultStatus};
use clickpunter::models::{OddsValue, RaceContext, RunnerEntry, StrategyRequest, TrackCondition};
use clickpunter::{load_runners, Settings};

/// Default bet history file
const DEFAULT_HISTORY_PATH: &str = "clickpunter_history.json";

#[derive(Parser)]
#[command(name = "clickpunter")]
#[command(author, version, about = "A/B/C race selection and boxed stake calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Path to the bet history file
    #[arg(long, default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,

    /// Path to a JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a race from a CSV or pasted-text file
    Analyze {
        /// Runner file (.csv, or text with one runner per line)
        file: PathBuf,

        /// Meeting name
        #[arg(short, long)]
        meeting: Option<String>,

        /// Race number
        #[arg(short, long)]
        race: Option<u32>,

        /// Track name (for track specialist cues)
        #[arg(long)]
        track: Option<String>,

        /// Race distance in metres
        #[arg(short, long)]
        distance: Option<u32>,

        /// Track condition (good, soft, heavy, synth)
        #[arg(short, long, default_value = "good")]
        condition: String,

        /// Declared field size, if different from the runners supplied
        #[arg(long)]
        field_size: Option<usize>,

        /// Strategy key (see `strategies`)
        #[arg(short, long, default_value = "budget_6")]
        strategy: String,

        /// Budget in dollars (custom strategy)
        #[arg(long)]
        budget: Option<f64>,

        /// Trifecta share of the budget, 0-1 (custom strategy)
        #[arg(long)]
        share: Option<f64>,

        /// Save the bet to history
        #[arg(long)]
        save: bool,
    },

    /// List strategy presets
    Strategies,

    /// Saved bets
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved bets
    List,

    /// Hit rate, ROI and drawdown
    Summary,

    /// Record the result of a saved bet
    Settle {
        /// Bet id
        id: u64,

        /// Winner
        #[arg(long)]
        first: String,

        /// Second place
        #[arg(long)]
        second: String,

        /// Third place
        #[arg(long)]
        third: Option<String>,

        /// $1 trifecta dividend
        #[arg(long)]
        trifecta_dividend: Option<f64>,

        /// $1 quinella dividend
        #[arg(long)]
        quinella_dividend: Option<f64>,
    },
}

fn init_logging() -> Result<()> {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    println!("{}", "ClickPunter CLI".cyan().bold());
    println!();

    let settings = Settings::load_or_default(cli.config.as_deref())
        .with_context(|| format!("Failed to load settings from {:?}", cli.config))?;

    if cli.interactive {
        run_interactive(&settings, &cli.history)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Analyze {
                file,
                meeting,
                race,
                track,
                distance,
                condition,
                field_size,
                strategy,
                budget,
                share,
                save,
            } => {
                let race = RaceContext {
                    meeting,
                    race_number: race,
                    track,
                    distance_m: distance,
                    track_condition: TrackCondition::parse(&condition),
                    declared_runners: field_size,
                };
                let strategy = strategy_request(&strategy, budget, share)?;
                let entries = load_runners(&file)
                    .with_context(|| format!("Failed to load runners from {:?}", file))?;
                analyze_race(&settings, &cli.history, &race, &entries, &strategy, save)?;
            }
            Commands::Strategies => print_strategies()?,
            Commands::History { action } => match action {
                HistoryAction::List => list_history(&cli.history)?,
                HistoryAction::Summary => show_summary(&cli.history)?,
                HistoryAction::Settle {
                    id,
                    first,
                    second,
                    third,
                    trifecta_dividend,
                    quinella_dividend,
                } => {
                    let result = RaceResult {
                        first,
                        second,
                        third,
                        trifecta_dividend,
                        quinella_dividend,
                    };
                    settle_bet(&cli.history, id, result)?;
                }
            },
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

/// Build a strategy request from CLI arguments
fn strategy_request(
    key: &str,
    budget: Option<f64>,
    share: Option<f64>,
) -> Result<StrategyRequest> {
    let kind: StrategyKind = key.parse()?;
    if kind != StrategyKind::Custom && (budget.is_some() || share.is_some()) {
        bail!("--budget and --share only apply to the custom strategy");
    }
    Ok(StrategyRequest {
        kind,
        budget,
        trifecta_share: share,
        quinella_share: share.map(|s| 1.0 - s),
    })
}

fn analyze_race(
    settings: &Settings,
    history_path: &Path,
    race: &RaceContext,
    entries: &[RunnerEntry],
    strategy_req: &StrategyRequest,
    save: bool,
) -> Result<()> {
    println!("{}: {}", "Analyzing".green(), race.label());
    println!();

    let analysis = settings
        .classifier()
        .analyze(race, entries)
        .context("Analysis failed")?;
    print_analysis(&analysis);

    let strategy = Strategy::from_request(strategy_req)?;
    let calculator: StakeCalculator = settings.calculator();
    let breakdown = match calculator.calculate(&analysis.selection, &strategy) {
        Ok(b) => b,
        Err(e) => {
            println!("{} {}", "No stakes:".red(), e);
            return Ok(());
        }
    };
    print_breakdown(&breakdown);

    if save {
        let mut history = BetHistory::load(history_path)
            .with_context(|| format!("Failed to load history from {:?}", history_path))?;
        let id = history
            .record(analysis.race.clone(), analysis.selection.clone(), breakdown)
            .context("Bet not saved")?
            .id;
        history
            .save(history_path)
            .with_context(|| format!("Failed to save history to {:?}", history_path))?;
        println!();
        println!("{} bet #{} to {:?}", "Saved".green(), id, history_path);
    }

    Ok(())
}

fn print_analysis(analysis: &RaceAnalysis) {
    println!("{}", "Selection:".yellow().bold());
    println!(
        "{:>2} {:<8} {:<20} {:>4} {:>8} {:>6}  {}",
        "", "Role", "Runner", "Bar", "Odds", "Score", "Why"
    );
    println!("{}", "-".repeat(80));

    for slot in analysis.selection.slots() {
        match &slot.pick {
            Some(pick) => println!(
                "{:>2} {:<8} {:<20} {:>4} {:>8} {:>6}  {}",
                slot.role.letter().bold(),
                slot.role.name(),
                truncate_name(&pick.runner.name, 20),
                pick.runner.barrier,
                format_odds(pick.runner.odds),
                pick.score,
                pick.justification().dimmed()
            ),
            None => println!(
                "{:>2} {:<8} {}",
                slot.role.letter().bold(),
                slot.role.name(),
                slot.unfilled_reason
                    .as_deref()
                    .unwrap_or("no candidate")
                    .red()
            ),
        }
    }
    println!();

    let alternates = [
        (Role::Anchor, &analysis.alternates.anchor),
        (Role::Pace, &analysis.alternates.pace),
        (Role::Value, &analysis.alternates.value),
    ];
    if alternates.iter().any(|(_, alts)| !alts.is_empty()) {
        println!("{}", "Alternates:".yellow().bold());
        for (role, alts) in alternates {
            if alts.is_empty() {
                continue;
            }
            let names: Vec<String> = alts
                .iter()
                .map(|c| format!("{} ({}, {})", c.runner.name, format_odds(c.runner.odds), c.score))
                .collect();
            println!("  {}: {}", role.letter(), names.join(", "));
        }
        println!();
    }

    let checklist = &analysis.checklist;
    println!(
        "{} {}/4",
        "Checklist:".yellow().bold(),
        checklist.passed()
    );
    let checks = [
        ("Field size", checklist.field_size_ok),
        ("Barriers", checklist.barriers_ok),
        ("Track", checklist.track_ok),
        ("Market", checklist.market_firmer),
    ];
    for (name, ok) in checks {
        let mark = if ok { "✓".green() } else { "✗".red() };
        println!("  {} {}", mark, name);
    }
    for note in &checklist.notes {
        println!("    {}", note.dimmed());
    }
    println!();

    if !analysis.warnings.is_empty() {
        println!("{}", "Warnings:".red().bold());
        for warning in &analysis.warnings {
            println!("  - {}", warning);
        }
        println!();
    }
}

fn print_breakdown(breakdown: &StakeBreakdown) {
    println!(
        "{} {} ({} budget)",
        "Stakes:".yellow().bold(),
        breakdown.strategy,
        format_currency(breakdown.budget_cents)
    );
    println!(
        "{:<26} {:>6} {:>8} {:>8} {:>10}",
        "Bet", "Combos", "Unit", "Flexi", "Stake"
    );
    println!("{}", "-".repeat(62));

    for line in &breakdown.lines {
        println!(
            "{:<26} {:>6} {:>8} {:>7.0}% {:>10}",
            line.label,
            line.combination_count,
            format_currency(line.unit_cents),
            line.flexi_percent(),
            format_currency(line.stake_cents)
        );
    }
    println!("{}", "-".repeat(62));
    println!(
        "{:<26} {:>35}",
        "Total",
        format_currency(breakdown.total_stake_cents).bold()
    );
    println!();

    println!("{}", "TAB instructions:".yellow().bold());
    for line in &breakdown.lines {
        println!("  {}", line.instruction().green());
    }
    println!();

    let estimate = &breakdown.estimate;
    println!("{}", "Estimated returns:".yellow().bold());
    if let Some(div) = estimate.trifecta_dividend {
        println!(
            "  Trifecta ~${:.2} dividend, return ~${:.2}",
            div, estimate.trifecta_return
        );
    }
    if let Some(div) = estimate.quinella_dividend {
        println!(
            "  Quinella ~${:.2} dividend, return ~${:.2}",
            div, estimate.quinella_return
        );
    }
    println!("  {}", estimate.disclaimer.dimmed());

    for warning in &breakdown.warnings {
        println!("  {} {}", "!".red(), warning);
    }
}

fn print_strategies() -> Result<()> {
    println!("{}", "Strategies:".yellow().bold());
    println!("{:<15} {:>8}  {}", "Key", "Budget", "Bets");
    println!("{}", "-".repeat(80));

    for kind in StrategyKind::PRESETS {
        let strategy = Strategy::preset(kind)?;
        println!(
            "{:<15} {:>8}  {}",
            kind.key(),
            format_currency(strategy.budget_cents),
            strategy.description()
        );
    }
    println!(
        "{:<15} {:>8}  {}",
        StrategyKind::Custom.key(),
        "--budget",
        "Trifecta and quinella flexi boxes split by --share (default 0.4)"
    );

    Ok(())
}

fn list_history(history_path: &Path) -> Result<()> {
    let history = BetHistory::load(history_path)
        .with_context(|| format!("Failed to load history from {:?}", history_path))?;

    if history.is_empty() {
        println!("{}", "No saved bets.".yellow());
        return Ok(());
    }

    println!(
        "{:>4} {:<17} {:<24} {:<12} {:>8} {:>10} {:<8}",
        "ID", "Placed", "Race", "Strategy", "Stake", "Return", "Status"
    );
    println!("{}", "-".repeat(90));

    for bet in history.iter() {
        let status = match bet.status {
            ResultStatus::Won => bet.status.as_str().green(),
            ResultStatus::Partial => bet.status.as_str().yellow(),
            ResultStatus::Lost => bet.status.as_str().red(),
            ResultStatus::Pending => bet.status.as_str().dimmed(),
        };
        let returned = if bet.is_settled() {
            format_currency(bet.return_cents())
        } else {
            "-".to_string()
        };
        println!(
            "{:>4} {:<17} {:<24} {:<12} {:>8} {:>10} {:<8}",
            bet.id,
            bet.placed_at.format("%Y-%m-%d %H:%M"),
            truncate_name(&bet.race.label(), 24),
            bet.breakdown.strategy.key(),
            format_currency(bet.stake_cents()),
            returned,
            status
        );
    }

    Ok(())
}

fn show_summary(history_path: &Path) -> Result<()> {
    let history = BetHistory::load(history_path)
        .with_context(|| format!("Failed to load history from {:?}", history_path))?;
    print_summary(&history.summary());
    Ok(())
}

fn print_summary(summary: &HistorySummary) {
    println!("{}", "History summary:".yellow().bold());
    println!("{}", "-".repeat(40));
    println!("Bets:            {}", summary.total_bets);
    println!("Settled:         {}", summary.settled_bets);
    println!("Pending:         {}", summary.pending_bets);
    println!("Winning:         {}", summary.winning_bets);
    println!("Hit rate:        {:.1}%", summary.hit_rate * 100.0);
    println!("Staked:          {}", format_currency(summary.total_staked_cents));
    println!("Returned:        {}", format_currency(summary.total_returned_cents));

    let net = format_currency(summary.net_profit_cents);
    let net = if summary.net_profit_cents >= 0 {
        net.green()
    } else {
        net.red()
    };
    println!("Net:             {}", net);
    println!("ROI:             {:.1}%", summary.roi * 100.0);
    println!(
        "Max drawdown:    {}",
        format_currency(summary.max_drawdown_cents)
    );
}

fn settle_bet(history_path: &Path, id: u64, result: RaceResult) -> Result<()> {
    let mut history = BetHistory::load(history_path)
        .with_context(|| format!("Failed to load history from {:?}", history_path))?;

    let record = history.settle(id, result)?;
    let status = record.status;
    let returned = record.return_cents();
    let profit = record.profit_cents();

    history
        .save(history_path)
        .with_context(|| format!("Failed to save history to {:?}", history_path))?;

    println!(
        "Bet #{} {}: returned {} ({} net)",
        id,
        status.as_str().bold(),
        format_currency(returned),
        format_currency(profit)
    );
    Ok(())
}

fn run_interactive(settings: &Settings, history_path: &Path) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();

    loop {
        let options = vec![
            "Analyze a race file",
            "Enter runners manually",
            "Show strategies",
            "History summary",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 | 1 => {
                let entries = if selection == 0 {
                    let path: String = Input::with_theme(&theme)
                        .with_prompt("Runner file (.csv or text)")
                        .interact_text()?;
                    match load_runners(Path::new(path.trim())) {
                        Ok(entries) => entries,
                        Err(e) => {
                            println!("{} {}", "Could not load runners:".red(), e);
                            continue;
                        }
                    }
                } else {
                    prompt_runners(&theme)?
                };

                let race = prompt_race(&theme)?;
                let strategy = prompt_strategy(&theme)?;
                let save = Confirm::with_theme(&theme)
                    .with_prompt("Save the bet to history?")
                    .default(false)
                    .interact()?;

                println!();
                let outcome =
                    analyze_race(settings, history_path, &race, &entries, &strategy, save);
                if let Err(e) = outcome {
                    println!("{} {:#}", "Error:".red(), e);
                }
                println!();
            }
            2 => {
                println!();
                print_strategies()?;
                println!();
            }
            3 => {
                println!();
                show_summary(history_path)?;
                println!();
            }
            4 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

fn prompt_runners(theme: &ColorfulTheme) -> Result<Vec<RunnerEntry>> {
    println!("Enter runners, leave the name blank to finish.");
    let mut entries = Vec::new();

    loop {
        let name: String = Input::with_theme(theme)
            .with_prompt(format!("Runner {} name", entries.len() + 1))
            .allow_empty(true)
            .interact_text()?;
        if name.trim().is_empty() {
            break;
        }

        let barrier: u32 = Input::with_theme(theme)
            .with_prompt("Barrier")
            .interact_text()?;
        let odds: String = Input::with_theme(theme)
            .with_prompt("Odds (e.g. 3.50 or 5/2)")
            .interact_text()?;
        let form: String = Input::with_theme(theme)
            .with_prompt("Last runs (e.g. 12x)")
            .allow_empty(true)
            .interact_text()?;
        let note: String = Input::with_theme(theme)
            .with_prompt("Note")
            .allow_empty(true)
            .interact_text()?;

        entries.push(RunnerEntry {
            name,
            barrier: Some(barrier),
            odds: Some(OddsValue::Text(odds)),
            form,
            note: (!note.trim().is_empty()).then_some(note),
            ..Default::default()
        });
    }

    Ok(entries)
}

fn prompt_race(theme: &ColorfulTheme) -> Result<RaceContext> {
    let meeting: String = Input::with_theme(theme)
        .with_prompt("Meeting")
        .allow_empty(true)
        .interact_text()?;
    let distance: u32 = Input::with_theme(theme)
        .with_prompt("Distance in metres (0 if unknown)")
        .default(0)
        .interact_text()?;

    let conditions = [
        TrackCondition::Good,
        TrackCondition::Soft,
        TrackCondition::Heavy,
        TrackCondition::Synth,
    ];
    let labels: Vec<&str> = conditions.iter().map(|c| c.as_str()).collect();
    let condition = Select::with_theme(theme)
        .with_prompt("Track condition")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(RaceContext {
        meeting: (!meeting.trim().is_empty()).then_some(meeting),
        distance_m: (distance > 0).then_some(distance),
        track_condition: conditions[condition],
        ..Default::default()
    })
}

fn prompt_strategy(theme: &ColorfulTheme) -> Result<StrategyRequest> {
    let mut labels = Vec::new();
    for kind in StrategyKind::PRESETS {
        let strategy = Strategy::preset(kind)?;
        labels.push(format!("{} - {}", kind.key(), strategy.description()));
    }
    labels.push("custom - your own budget and split".to_string());

    let choice = Select::with_theme(theme)
        .with_prompt("Strategy")
        .items(&labels)
        .default(1)
        .interact()?;

    if let Some(&kind) = StrategyKind::PRESETS.get(choice) {
        return Ok(StrategyRequest {
            kind,
            budget: None,
            trifecta_share: None,
            quinella_share: None,
        });
    }

    let budget: f64 = Input::with_theme(theme)
        .with_prompt("Budget ($)")
        .default(cents_to_dollars(1_000))
        .interact_text()?;
    let share: f64 = Input::with_theme(theme)
        .with_prompt("Trifecta share (0-1)")
        .default(0.4)
        .interact_text()?;

    strategy_request("custom", Some(budget), Some(share))
}

/// Truncate name to fit display width
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_len {
        name.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
