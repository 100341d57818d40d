use anyhow::{Context, Result};
use backup_sweeper::config::{self, Config, ResolvedStoreConfig};
use backup_sweeper::managers::logging;
use backup_sweeper::managers::notification::NotificationManager;
use backup_sweeper::managers::sweep::{SweepManager, SweepPlan};
use backup_sweeper::store::DirStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backup-sweeper")]
#[command(about = "Prune timestamped backups with a tiered retention policy", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "BACKUP_SWEEPER_CONFIG",
        default_value = "/etc/backup-sweeper/config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the keep/delete plan without deleting anything
    Plan {
        /// Specific store to plan (defaults to all enabled stores)
        #[arg(short, long)]
        store: Option<String>,

        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Categorize backups, ask for confirmation, then delete
    Sweep {
        /// Specific store to sweep (defaults to all enabled stores)
        #[arg(short, long)]
        store: Option<String>,

        /// Skip the confirmation prompt (for cron use)
        #[arg(short, long)]
        yes: bool,
    },

    /// List backups with their extracted timestamps
    List {
        /// Specific store to list (defaults to all enabled stores)
        #[arg(short, long)]
        store: Option<String>,
    },

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Validate needs only config and console logging.
    if matches!(cli.command, Commands::Validate) {
        logging::init_console_logging();
        let config = config::load_config(&cli.config)?;
        let resolved = config::resolve_all_stores(&config);
        println!("Configuration is valid!");
        println!("Stores: {}", resolved.len());
        println!(
            "Notifications: {}",
            if config.notifications.webhook_url.is_empty() {
                "disabled"
            } else {
                "enabled"
            }
        );
        return Ok(());
    }

    let config = config::load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    // Setup logging with file rotation (must keep guard alive)
    let logging_config = logging::LoggingConfig::from_config(
        &config.global.log_directory,
        &config.global.log_level,
        config.global.log_max_files,
        config.global.log_max_size_mb,
    );
    let _log_guard = logging::init_logging(&logging_config)?;

    match cli.command {
        Commands::Plan { store, json } => {
            for manager in select_managers(&config, store.as_deref())? {
                let plan = manager.plan()?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&plan)?);
                } else {
                    render_plan(&plan);
                }
            }
        }

        Commands::Sweep { store, yes } => {
            let mut errors = Vec::new();

            for manager in select_managers(&config, store.as_deref())? {
                if let Err(e) = sweep_store(&manager, yes) {
                    manager.notify_failure(&format!("{:#}", e));
                    errors.push(format!("{}: {:#}", manager.store_name(), e));
                }
            }

            if !errors.is_empty() {
                anyhow::bail!(
                    "{} store(s) failed to sweep:\n{}",
                    errors.len(),
                    errors.join("\n")
                );
            }
        }

        Commands::List { store } => {
            for manager in select_managers(&config, store.as_deref())? {
                let plan = manager.plan()?;

                println!("=== Store: {} ===", plan.store);

                if plan.is_empty() {
                    println!("No backups found\n");
                    continue;
                }

                let mut records: Vec<_> = plan
                    .retention
                    .keep
                    .iter()
                    .chain(plan.retention.delete.iter())
                    .collect();
                records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

                for record in records {
                    println!(
                        "  {} ({})",
                        record.key,
                        record.timestamp.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                for key in &plan.skipped {
                    println!("  {} (no timestamp)", key);
                }
                println!("\n  Total: {} backups, {} without timestamp\n", plan.retention.total(), plan.skipped.len());
            }
        }

        Commands::Validate => unreachable!("Validate is handled before config resolution"),
    }

    Ok(())
}

/// Build sweep managers for the selected store, or all enabled stores.
fn select_managers(config: &Config, selection: Option<&str>) -> Result<Vec<SweepManager>> {
    let resolved = config::resolve_all_stores(config);

    let selected: Vec<ResolvedStoreConfig> = if let Some(name) = selection {
        let store = resolved
            .get(name)
            .with_context(|| format!("Store '{}' not found in configuration", name))?;
        vec![store.clone()]
    } else {
        let mut enabled: Vec<_> = resolved.into_values().filter(|s| s.enabled).collect();
        enabled.sort_by(|a, b| a.name.cmp(&b.name));
        if enabled.is_empty() {
            anyhow::bail!("No enabled stores in configuration");
        }
        enabled
    };

    let managers = selected
        .into_iter()
        .map(|store_config| {
            let root = config::expand_tilde(&store_config.root);
            let store = Box::new(DirStore::new(root));
            let mut manager = SweepManager::new(store_config, store);

            if !config.notifications.webhook_url.is_empty() {
                manager = manager
                    .with_notification_manager(NotificationManager::new(config.notifications.clone()));
            }

            manager
        })
        .collect();

    Ok(managers)
}

/// Plan, confirm, and execute a sweep of one store.
fn sweep_store(manager: &SweepManager, assume_yes: bool) -> Result<()> {
    let plan = manager.plan()?;

    if plan.retention.total() == 0 {
        println!("No backups found in store '{}'", plan.store);
        return Ok(());
    }

    render_plan(&plan);

    if plan.retention.delete.is_empty() {
        println!("No backups to delete in store '{}'\n", plan.store);
        return Ok(());
    }

    if !assume_yes && !ask_for_confirmation() {
        println!("Deletion cancelled");
        return Ok(());
    }

    println!("\nDeleting backups...");
    let outcome = manager.execute(&plan)?;

    for (key, error) in &outcome.failures {
        eprintln!("  ✗ Failed to delete {}: {}", key, error);
    }

    println!(
        "\nSuccessfully deleted {}/{} backups",
        outcome.deleted, outcome.attempted
    );

    Ok(())
}

/// Render the keep/delete plan for human review.
fn render_plan(plan: &SweepPlan) {
    println!("=== Store: {} ===", plan.store);
    println!("\n=== All Backups ===");

    let mut records: Vec<_> = plan
        .retention
        .keep
        .iter()
        .map(|r| ("[KEEP]   ", r))
        .chain(plan.retention.delete.iter().map(|r| ("[DELETE] ", r)))
        .collect();
    records.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));

    for (status, record) in records {
        println!(
            "{} {} ({})",
            status,
            record.key,
            record.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }

    for key in &plan.skipped {
        println!("[SKIP]    {} (no timestamp)", key);
    }

    println!("\n=== Summary ===");
    println!("Total backups: {}", plan.retention.total());
    println!("Will keep: {}", plan.retention.keep.len());
    println!("Will delete: {}", plan.retention.delete.len());
    if !plan.skipped.is_empty() {
        println!("Skipped (no timestamp): {}", plan.skipped.len());
    }
}

/// Ask the operator to confirm deletion. Anything but an explicit yes,
/// including a failed read, aborts.
fn ask_for_confirmation() -> bool {
    dialoguer::Confirm::new()
        .with_prompt("Do you want to proceed with deletion?")
        .default(false)
        .interact()
        .unwrap_or(false)
}
