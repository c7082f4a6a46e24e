// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stratos: a quota-governed AI business-strategy report service.
//!
//! Binary entry point: loads configuration, wires the service core, and
//! dispatches operator commands.

use clap::{Parser, Subcommand};

use stratos_core::{StratosError, UserId};

mod app;
mod ask;
mod status;

use app::App;

/// Quota-governed business-strategy reports.
#[derive(Parser, Debug)]
#[command(name = "stratos", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask for a strategy report as a given user.
    Ask {
        /// Acting user id.
        #[arg(long)]
        user: i64,
        /// Strategy archetype colouring the report.
        #[arg(long, default_value = "visionary")]
        archetype: String,
        /// Token budget for the generated report.
        #[arg(long, default_value_t = 2048)]
        max_tokens: u32,
        /// The question.
        query: String,
    },
    /// Ask a follow-up to a previous report as a given user.
    FollowUp {
        /// Acting user id.
        #[arg(long)]
        user: i64,
        /// Strategy archetype colouring the report.
        #[arg(long, default_value = "visionary")]
        archetype: String,
        /// Token budget for the generated answer.
        #[arg(long, default_value_t = 2048)]
        max_tokens: u32,
        /// The follow-up question.
        query: String,
    },
    /// Show a user's plan and usage.
    Status {
        #[arg(long)]
        user: i64,
        /// Emit structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// List the plan catalog.
    Plans {
        #[arg(long)]
        json: bool,
    },
    /// Create a user account.
    UserAdd {
        #[arg(long)]
        email: String,
        /// Plan name; defaults to the free tier.
        #[arg(long)]
        plan: Option<String>,
        /// Flag the account administrator.
        #[arg(long)]
        admin: bool,
    },
    /// Grant (or re-grant) one-time report access to a user.
    Grant {
        #[arg(long)]
        user: i64,
    },
    /// Zero all per-user usage counters now.
    ResetUsage,
    /// Run one pre-warm pass now.
    Prewarm,
    /// Run the pre-warm job on its cron schedule (blocks).
    Schedule,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match stratos_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            stratos_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    if let Err(err) = run(cli, &config).await {
        tracing::error!(error = %err, "command failed");
        eprintln!("stratos: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &stratos_config::StratosConfig) -> Result<(), StratosError> {
    let app = App::open(config).await?;

    let result = dispatch(&cli.command, &app, config).await;
    app.close().await?;
    result
}

async fn dispatch(
    command: &Commands,
    app: &App,
    config: &stratos_config::StratosConfig,
) -> Result<(), StratosError> {
    match command {
        Commands::Ask {
            user,
            archetype,
            max_tokens,
            query,
        } => {
            let generator = app.generator(config)?;
            let outcome = ask::run_ask(
                app,
                generator,
                UserId(*user),
                archetype,
                query,
                *max_tokens,
            )
            .await?;
            ask::print_outcome(&outcome);
            Ok(())
        }
        Commands::FollowUp {
            user,
            archetype,
            max_tokens,
            query,
        } => {
            let generator = app.generator(config)?;
            let outcome = ask::run_follow_up(
                app,
                generator,
                UserId(*user),
                archetype,
                query,
                *max_tokens,
            )
            .await?;
            ask::print_follow_up_outcome(&outcome);
            Ok(())
        }
        Commands::Status { user, json } => status::run_status(app, UserId(*user), *json).await,
        Commands::Plans { json } => {
            status::run_plans(app, *json);
            Ok(())
        }
        Commands::UserAdd { email, plan, admin } => {
            let plan = plan
                .clone()
                .unwrap_or_else(|| app.registry.default_plan().name.clone());
            if app.registry.get(&plan).is_none() {
                return Err(StratosError::UnknownPlan { plan });
            }
            let id = app
                .users
                .create(stratos_storage::NewUser {
                    email: email.clone(),
                    // Credential handling lives outside this core.
                    password_hash: String::new(),
                    plan,
                })
                .await?;
            if *admin {
                app.users.set_admin(id, true).await?;
            }
            println!("created user {id}");
            Ok(())
        }
        Commands::Grant { user } => {
            app.quota.grant_one_time_access(UserId(*user)).await?;
            println!("one-time access granted to user {user}");
            Ok(())
        }
        Commands::ResetUsage => {
            let summary = app.reset.run().await?;
            println!(
                "reset {} counters ({} query, {} follow-up, {} document)",
                summary.total(),
                summary.query_counters,
                summary.follow_up_counters,
                summary.document_counters
            );
            Ok(())
        }
        Commands::Prewarm => {
            let job = prewarm_job(app, config)?;
            let summary = job.run().await?;
            println!(
                "pre-warm: {} selected, {} warmed, {} already cached, {} failed",
                summary.selected, summary.warmed, summary.already_cached, summary.failed
            );
            Ok(())
        }
        Commands::Schedule => {
            let job = prewarm_job(app, config)?;
            let scheduler =
                stratos_prewarm::PrewarmScheduler::new(job, &config.prewarm.schedule)?;
            scheduler.run_forever().await
        }
    }
}

fn prewarm_job(
    app: &App,
    config: &stratos_config::StratosConfig,
) -> Result<stratos_prewarm::PrewarmJob, StratosError> {
    let generator = app.generator(config)?;
    Ok(stratos_prewarm::PrewarmJob::new(
        app.frequency.clone(),
        app.cache.clone(),
        generator,
        stratos_prewarm::PrewarmOptions {
            top_n: config.prewarm.top_n as usize,
            tier: config.prewarm.model_tier,
            max_tokens: config.prewarm.max_tokens,
        },
    ))
}

/// Initialize the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stratos={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
