//! Command implementations for the data store operator tool
//!
//! Each command opens the file-backed context, runs one library operation
//! and prints a short coloured summary. Library errors are wrapped with
//! `anyhow` context for the final report in `main`.

use crate::cli::args::{Args, Commands, KindArg, ListArgs, StoreArgs, UpdateArgs};
use crate::context::StoreContext;
use crate::data_store::DataStore;
use crate::error::Result as StoreResult;
use crate::kinds::{Database, Method, Normalization, StoreKind, Weighting};
use crate::models::ProcessingStats;
use crate::progress::{ReprocessProgress, create_spinner};
use crate::updates::{ReprocessReport, Updates};
use anyhow::{Context, Result, bail};
use colored::*;
use tracing::{debug, info};

/// Run the parsed command
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    let config = args.store_config();
    let mut ctx = StoreContext::open(config.clone()).with_context(|| {
        format!(
            "Failed to open data directory {}",
            config.data_dir.display()
        )
    })?;

    match &args.command {
        Some(Commands::Status) => run_status(&mut ctx),
        Some(Commands::Update(update)) => run_update(&mut ctx, update, args.show_progress()),
        Some(Commands::List(list)) => run_list(&ctx, list),
        Some(Commands::Process(store)) => run_process(&mut ctx, store),
        Some(Commands::Backup(store)) => run_backup(&mut ctx, store),
        None => Ok(()),
    }
}

fn run_status(ctx: &mut StoreContext) -> Result<()> {
    let updates = Updates::builtin();
    let pending = updates
        .check_status(ctx)
        .context("Failed to check update status")?;

    if pending.is_empty() {
        println!("{}", "Data is up to date".green().bold());
        return Ok(());
    }

    println!("{}", "Pending updates:".yellow().bold());
    for name in &pending {
        println!("  {} {}", "•".yellow(), name.bold());
        println!("    {}", updates.explain(name)?.dimmed());
    }
    println!();
    println!("Apply them with {}", "lca-datastore update --all".cyan());
    Ok(())
}

fn run_update(ctx: &mut StoreContext, args: &UpdateArgs, show_progress: bool) -> Result<()> {
    let updates = Updates::builtin();
    let names = match &args.name {
        Some(name) => vec![name.clone()],
        None => updates.check_status(ctx)?,
    };

    if names.is_empty() {
        println!("{}", "No updates to apply".green());
        return Ok(());
    }

    let mut total = ReprocessReport::default();
    for name in &names {
        println!("{} {}", "Applying".cyan().bold(), name);
        let mut progress = if show_progress {
            ReprocessProgress::new()
        } else {
            ReprocessProgress::hidden()
        };
        let report = updates
            .do_update(ctx, name, &mut |kind: &str, done: usize, count: usize| {
                progress.observe(kind, done, count)
            })
            .with_context(|| format!("Update '{}' failed", name))?;
        progress.finish();

        total.processed += report.processed;
        total.failed.extend(report.failed);
    }

    print_report(&total);
    if !total.is_clean() {
        bail!("{} stores failed to reprocess", total.failed.len());
    }
    Ok(())
}

fn print_report(report: &ReprocessReport) {
    println!();
    println!(
        "{} {} stores reprocessed",
        "✓".green().bold(),
        report.processed.to_string().bold()
    );
    for failure in &report.failed {
        println!(
            "{} {} '{}': {}",
            "✗".red().bold(),
            failure.kind,
            failure.name,
            failure.error.red()
        );
    }
}

fn run_list(ctx: &StoreContext, args: &ListArgs) -> Result<()> {
    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => KindArg::all().to_vec(),
    };

    for kind in kinds {
        let names = ctx
            .registry(kind.registry())
            .map(|registry| registry.names())
            .unwrap_or_default();
        println!(
            "{} ({})",
            kind.registry().cyan().bold(),
            names.len().to_string().bold()
        );
        for name in names {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn run_process(ctx: &mut StoreContext, args: &StoreArgs) -> Result<()> {
    let spinner = create_spinner(&format!("Processing {}", args.name));
    let result = match args.kind {
        KindArg::Database => process_store(ctx, Database, &args.name),
        KindArg::Method => process_store(ctx, Method, &args.name),
        KindArg::Weighting => process_store(ctx, Weighting, &args.name),
        KindArg::Normalization => process_store(ctx, Normalization, &args.name),
    };
    spinner.finish_and_clear();

    let stats = result.with_context(|| format!("Failed to process '{}'", args.name))?;
    println!(
        "{} Processed '{}': {} rows x {} fields ({} negative) in {}ms",
        "✓".green().bold(),
        args.name.bold(),
        stats.rows,
        stats.fields,
        stats.negative_rows,
        stats.processing_time_ms
    );
    Ok(())
}

fn process_store<K: StoreKind>(
    ctx: &mut StoreContext,
    kind: K,
    name: &str,
) -> StoreResult<ProcessingStats> {
    let store = DataStore::new(ctx, kind, name);
    store.assert_registered(ctx)?;
    store.process(ctx)
}

fn run_backup(ctx: &mut StoreContext, args: &StoreArgs) -> Result<()> {
    let result = match args.kind {
        KindArg::Database => backup_store(ctx, Database, &args.name),
        KindArg::Method => backup_store(ctx, Method, &args.name),
        KindArg::Weighting => backup_store(ctx, Weighting, &args.name),
        KindArg::Normalization => backup_store(ctx, Normalization, &args.name),
    };
    let location = result.with_context(|| format!("Failed to back up '{}'", args.name))?;
    info!("Backup of '{}' written", args.name);
    println!("{} Backup written to {}", "✓".green().bold(), location.cyan());
    Ok(())
}

fn backup_store<K: StoreKind>(ctx: &mut StoreContext, kind: K, name: &str) -> StoreResult<String> {
    let store = DataStore::new(ctx, kind, name);
    store.backup(ctx)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lca_datastore={}", log_level)));

    let layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    let _ = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_timer(fmt::time::uptime()))
            .try_init()
    };

    debug!("Logging initialized at level: {}", log_level);
}
