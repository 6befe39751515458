use clap::{Parser, Subcommand};
use planner_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "wplan")]
#[command(about = "Personalized workout queue planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a new plan and start a fresh session
    Plan {
        /// JSON catalog file (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Muscle to focus on (repeatable; replaces configured focus)
        #[arg(long = "focus")]
        focus: Vec<String>,

        /// Muscle to train less (repeatable; replaces configured list)
        #[arg(long = "reduce")]
        reduce: Vec<String>,

        /// Muscle to leave out entirely (repeatable; replaces configured list)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Show the current exercise (default)
    Next,

    /// Complete the current exercise
    Done {
        /// Working weight used, in kg
        #[arg(long)]
        kg: f64,
    },

    /// Swap the current exercise for one of its alternatives
    Swap {
        /// Exercise id of the alternative
        #[arg(long = "to")]
        to: u32,
    },

    /// Show the whole queue with completion marks
    Status,

    /// Export the completion journal to CSV
    Export {
        /// Remove archived journals after export
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() {
    planner_core::logging::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Plan {
            catalog,
            focus,
            reduce,
            exclude,
        }) => cmd_plan(&data_dir, &config, catalog, focus, reduce, exclude),
        Some(Commands::Done { kg }) => cmd_done(&data_dir, kg),
        Some(Commands::Swap { to }) => cmd_swap(&data_dir, to),
        Some(Commands::Status) => cmd_status(&data_dir),
        Some(Commands::Export { cleanup }) => cmd_export(&data_dir, cleanup),
        Some(Commands::Next) | None => cmd_next(&data_dir),
    }
}

fn cmd_plan(
    data_dir: &Path,
    config: &Config,
    catalog: Option<PathBuf>,
    focus: Vec<String>,
    reduce: Vec<String>,
    exclude: Vec<String>,
) -> Result<()> {
    let mut goals_config = config.goals.clone();
    if !focus.is_empty() {
        goals_config.focus_muscles = focus;
    }
    if !reduce.is_empty() {
        goals_config.reduced_muscles = reduce;
    }
    if !exclude.is_empty() {
        goals_config.excluded_muscles = exclude;
    }
    let goals = goals_config.to_profile();

    let provider: Box<dyn CatalogProvider> = match catalog.or_else(|| config.catalog.path.clone()) {
        Some(path) => Box::new(JsonCatalogFile::new(path)),
        None => Box::new(BuiltinCatalog),
    };

    let mut session = WorkoutSession::open(data_dir)?;
    let orchestrator = FallbackOrchestrator::new(RuleBasedPlanner);
    let state = session.regenerate_plan(
        provider.as_ref(),
        &orchestrator,
        &goals,
        config.catalog.limit,
    )?;

    if state.plan().queue.is_empty() {
        println!("No exercises match your goals - the plan is empty.");
        return Ok(());
    }

    println!("✓ New plan with {} exercises", state.plan().queue.len());
    print_queue(state);
    Ok(())
}

fn cmd_next(data_dir: &Path) -> Result<()> {
    let session = WorkoutSession::open(data_dir)?;
    let Some(state) = session.state() else {
        println!("No plan yet. Run `wplan plan` to build one.");
        return Ok(());
    };

    let Some(slot) = state.next_exercise() else {
        println!("Workout complete! Run `wplan plan` for a new one.");
        return Ok(());
    };

    let performance = session.performance()?;
    let best = performance
        .iter()
        .find(|r| r.exercise_id == slot.exercise.id)
        .map(|r| r.max_weight_kg);
    let journal = planner_core::journal::read_entries(session.journal_path())?;
    let last = planner_core::history::last_completion(&journal, slot.exercise.id);

    display_slot(state, slot, best, last);
    Ok(())
}

fn cmd_done(data_dir: &Path, kg: f64) -> Result<()> {
    let mut session = WorkoutSession::open(data_dir)?;
    let entry = session.complete_current(kg)?;

    println!("✓ {} done at {} kg", entry.exercise_name, entry.weight_kg);

    match session.current() {
        Some(next) => println!("  Next: {} ({})", next.exercise.name, next.exercise.primary_muscle),
        None => println!("  Workout complete!"),
    }
    Ok(())
}

fn cmd_swap(data_dir: &Path, to: u32) -> Result<()> {
    let mut session = WorkoutSession::open(data_dir)?;
    let slot = session.swap_current(to)?;

    println!("✓ Swapped to {} [{}]", slot.exercise.name, slot.exercise.id);
    Ok(())
}

fn cmd_status(data_dir: &Path) -> Result<()> {
    let session = WorkoutSession::open(data_dir)?;
    match session.state() {
        Some(state) => print_queue(state),
        None => println!("No plan yet. Run `wplan plan` to build one."),
    }
    Ok(())
}

fn cmd_export(data_dir: &Path, cleanup: bool) -> Result<()> {
    let session = WorkoutSession::open(data_dir)?;
    let log_path = session.journal_path();

    if !log_path.exists() {
        println!("No journal found - nothing to export.");
        return Ok(());
    }

    let csv_path = session.csv_path();
    let count = planner_core::export::log_to_csv_and_archive(log_path, csv_path)?;

    println!("✓ Exported {} completions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        if let Some(dir) = log_path.parent() {
            let cleaned = planner_core::export::cleanup_processed_logs(dir)?;
            if cleaned > 0 {
                println!("✓ Cleaned up {} archived journals", cleaned);
            }
        }
    }

    Ok(())
}

fn print_queue(state: &SessionState) {
    let (done, total) = state.progress();
    let current = state.next_exercise().map(|s| s.id);

    println!();
    println!("  Progress: {}/{}", done, total);
    for slot in &state.plan().queue {
        let mark = if state.is_completed(slot.exercise.id) {
            "✓"
        } else if Some(slot.id) == current {
            "→"
        } else {
            " "
        };
        println!(
            "  {} {}. {} [{}] - {} x {}",
            mark,
            slot.id + 1,
            slot.exercise.name,
            slot.exercise.id,
            slot.sets,
            slot.rep_range
        );
    }
    println!();
}

fn display_slot(
    state: &SessionState,
    slot: &PlanSlot,
    best: Option<f64>,
    last: Option<&CompletionEntry>,
) {
    let (done, total) = state.progress();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  EXERCISE {} OF {}", done + 1, total);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {} [{}]", slot.exercise.name, slot.exercise.id);
    println!("  Muscle: {}", slot.exercise.primary_muscle);
    println!("  Equipment: {}", slot.exercise.equipment);
    println!("  → {} sets x {} reps", slot.sets, slot.rep_range);

    if let Some(kg) = best {
        println!("  → Best: {} kg", kg);
    }
    if let Some(entry) = last {
        println!(
            "  → Last: {} kg on {}",
            entry.weight_kg,
            entry.completed_at.format("%Y-%m-%d")
        );
    }

    if !slot.alternatives.is_empty() {
        println!();
        println!("  Alternatives (wplan swap --to ID):");
        for alt in &slot.alternatives {
            println!("    [{}] {} ({})", alt.id, alt.name, alt.equipment);
        }
    }

    if let Some(ref url) = slot.exercise.image_ref {
        println!();
        println!("  ℹ Image: {}", url);
    }

    println!();
}
