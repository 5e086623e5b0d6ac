//! bizc - one-person company business consultant
//!
//! CLI entry point for chatting with the consultant and managing reports.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use bizconsult::cli::{Cli, Command, ReportCommand};
use bizconsult::config::Config;
use bizconsult::domain::{ItemId, ItemKind, ItemStatus, Report};
use bizconsult::error::ConsultError;
use bizconsult::gateway::{Gateway, create_gateway};
use bizconsult::project::ProjectContext;
use bizconsult::report::{ReportManager, export};
use bizconsult::repl;
use bizconsult::session::Session;
use sessionstore::{FileStore, KeyValueStore};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bizconsult")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("bizconsult.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Everything a command needs, built once from config
struct App {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    session: Session,
    gateway: Arc<dyn Gateway>,
    reports: ReportManager,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        debug!(session_dir = %config.storage.session_dir.display(), "App::new: called");
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.session_dir)?);
        let session = Session::new(store.clone());
        let gateway = create_gateway(&config, session.clone()).map_err(|e| eyre::eyre!("Failed to create gateway: {}", e))?;
        let reports = ReportManager::from_config(gateway.clone(), session.clone(), &config);
        Ok(Self {
            config,
            store,
            session,
            gateway,
            reports,
        })
    }

    /// Fail early with a login hint when no token is stored
    fn require_login(&self) -> Result<()> {
        if self.session.is_signed_in() {
            Ok(())
        } else {
            Err(user_error(ConsultError::Unauthenticated))
        }
    }

    async fn projects(&self) -> Result<ProjectContext> {
        self.require_login()?;
        ProjectContext::load(self.gateway.as_ref(), self.store.clone())
            .await
            .map_err(user_error)
    }
}

/// Turn a consultant error into a report with a next step where one exists
fn user_error(err: ConsultError) -> eyre::Report {
    match err {
        ConsultError::Unauthenticated => eyre::eyre!("{}. Run `bizc login --token <TOKEN>` first", err),
        ConsultError::MissingContext => eyre::eyre!("{}. Run `bizc projects` and `bizc use <PROJECT_ID>`", err),
        other => eyre::eyre!("{}", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    let app = App::new(config)?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Login { token }) => cmd_login(&app, &token),
        Some(Command::Logout) => cmd_logout(&app),
        Some(Command::Whoami) => cmd_whoami(&app).await,
        Some(Command::Projects) => cmd_projects(&app).await,
        Some(Command::Use { project_id }) => cmd_use(&app, &project_id).await,
        Some(Command::Chat { new }) => cmd_chat(&app, new).await,
        Some(Command::Reports) => cmd_reports(&app).await,
        Some(Command::Report { command }) => cmd_report(&app, command).await,
        None => {
            debug!("main: no command specified, starting chat");
            cmd_chat(&app, false).await
        }
    }
}

fn cmd_login(app: &App, token: &str) -> Result<()> {
    debug!("cmd_login: called");
    match app.session.sign_in(token)? {
        Some(user) if !user.username.is_empty() => println!("Signed in as {}", user.username.bright_green()),
        _ => println!("Token stored (identity could not be read from it)"),
    }
    Ok(())
}

fn cmd_logout(app: &App) -> Result<()> {
    debug!("cmd_logout: called");
    app.session.invalidate();
    println!("Signed out");
    Ok(())
}

async fn cmd_whoami(app: &App) -> Result<()> {
    debug!("cmd_whoami: called");
    if !app.session.is_signed_in() {
        println!("Not signed in");
        return Ok(());
    }
    match app.session.user() {
        Some(user) => {
            println!("Username: {}", user.username);
            if !user.did.is_empty() {
                println!("DID:      {}", user.did);
            }
        }
        None => println!("Signed in (identity unknown)"),
    }

    // Listing failures only cost the project line
    let context = ProjectContext::restore(app.gateway.as_ref(), app.store.clone()).await;
    match context.selected() {
        Some(project) => println!("Project:  {}", project),
        None => println!("Project:  (none selected)"),
    }
    Ok(())
}

async fn cmd_projects(app: &App) -> Result<()> {
    debug!("cmd_projects: called");
    let context = app.projects().await?;
    if context.projects().is_empty() {
        println!("No projects found");
        return Ok(());
    }

    let selected = context.selected().map(|p| p.project_id.as_str());
    println!("  {:<40} {}", "ID", "NAME");
    println!("{}", "-".repeat(72));
    for project in context.projects() {
        let marker = if Some(project.project_id.as_str()) == selected { "*" } else { " " };
        println!("{} {:<40} {}", marker.bright_green(), project.project_id, project.project_name);
    }
    Ok(())
}

async fn cmd_use(app: &App, project_id: &str) -> Result<()> {
    debug!(%project_id, "cmd_use: called");
    let mut context = app.projects().await?;
    let project = context.select(project_id).map_err(user_error)?;
    println!("Using project {}", project.to_string().bright_green());
    Ok(())
}

async fn cmd_chat(app: &App, start_new: bool) -> Result<()> {
    debug!(start_new, "cmd_chat: called");
    let context = app.projects().await?;
    let project = context
        .selected()
        .cloned()
        .ok_or_else(|| user_error(ConsultError::MissingContext))?;

    repl::run_interactive(
        &app.config,
        app.gateway.clone(),
        app.store.clone(),
        app.reports.clone(),
        project,
        start_new,
    )
    .await
}

async fn cmd_reports(app: &App) -> Result<()> {
    debug!("cmd_reports: called");
    let context = app.projects().await?;
    let reports = app.reports.list(context.selected()).await.map_err(user_error)?;

    if reports.is_empty() {
        println!("No reports yet. Start one with `bizc chat` and save it with /save");
        return Ok(());
    }

    println!("{:<28} {:<18} {:<10} {}", "ID", "CREATED", "PUBLISHED", "GOAL");
    println!("{}", "-".repeat(90));
    for report in &reports {
        let doc = &report.recommendations;
        let total = doc.ai_workflows.len() + doc.human_roles.len();
        println!(
            "{:<28} {:<18} {:<10} {}",
            report.report_id,
            created_at(report),
            format!("{}/{}", doc.published_count(), total),
            report.business_goal
        );
    }
    Ok(())
}

async fn cmd_report(app: &App, command: ReportCommand) -> Result<()> {
    debug!(?command, "cmd_report: called");
    match command {
        ReportCommand::Show { report_id } => {
            app.require_login()?;
            let report = app.reports.load(&report_id).await.map_err(user_error)?;
            print_report(app, &report);
        }
        ReportCommand::Publish { report_id, item } => {
            app.require_login()?;
            println!("Publishing {}...", item);
            let outcome = app.reports.publish(&report_id, item).await.map_err(user_error)?;
            println!("{} {} -> task {}", "Published".bright_green(), outcome.item_id, outcome.task_id);
            if outcome.tags.is_empty() {
                println!("Tags: {}", "(none)".dimmed());
            } else {
                println!("Tags: {}", outcome.tags.join(", "));
            }
            println!("View: {}", outcome.task_url);
        }
        ReportCommand::Cancel { report_id, item } => {
            app.require_login()?;
            let outcome = app.reports.cancel(&report_id, item).await.map_err(user_error)?;
            if outcome.changed {
                println!(
                    "{} {} (was task {})",
                    "Unpublished".yellow(),
                    outcome.item_id,
                    outcome.previous_task_id.unwrap_or_default()
                );
            } else {
                println!("{} is not published; nothing to cancel", outcome.item_id);
            }
        }
        ReportCommand::Delete { report_id, yes } => {
            app.require_login()?;
            if !yes && !confirm(&format!("Delete report {}? This cannot be undone. [y/N] ", report_id))? {
                println!("Cancelled");
                return Ok(());
            }
            app.reports.delete(&report_id).await.map_err(user_error)?;
            println!("Deleted report {}", report_id);
        }
        ReportCommand::Export { report_id, output } => {
            app.require_login()?;
            let report = app.reports.load(&report_id).await.map_err(user_error)?;
            let content = export::render_txt(&[], &report.business_goal, Some(&report.recommendations), Local::now());
            let dir = match output {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let path = export::write_txt(&dir, &content)?;
            println!("Exported to {}", path.display());
        }
    }
    Ok(())
}

fn print_report(app: &App, report: &Report) {
    let doc = &report.recommendations;
    println!("{}", format!("Report {}", report.report_id).bright_cyan().bold());
    println!("Goal:    {}", report.business_goal);
    println!("Created: {}", created_at(report));
    if !doc.summary.is_empty() {
        println!();
        println!("{}", doc.summary);
    }

    println!();
    println!("{:<10} {:<14} {:<24} {}", "ITEM", "STATUS", "TASK", "NAME");
    println!("{}", "-".repeat(80));
    for id in doc.item_ids() {
        let state = doc.item_state(id).unwrap_or_default();
        let status = match state.status {
            Some(ItemStatus::Published) => "published".bright_green(),
            Some(ItemStatus::DraftCreated) => "draft".yellow(),
            None => "unpublished".dimmed(),
        };
        println!(
            "{:<10} {:<14} {:<24} {}",
            id.to_string(),
            status,
            state.task_id.as_deref().unwrap_or("-"),
            item_name(report, id)
        );
    }

    for id in doc.item_ids() {
        if let Some(task_id) = doc.item_state(id).and_then(|s| s.task_id) {
            println!("  {} {}", id, app.reports.task_url(&task_id).dimmed());
        }
    }

    if !doc.phases.is_empty() {
        println!();
        println!("{}", "Phases:".bright_cyan());
        for (i, phase) in doc.phases.iter().enumerate() {
            let budget = phase.monthly_budget.as_ref().map(|b| format!(", {} XZT/月", b)).unwrap_or_default();
            println!("  {}. {} ({}{})", i + 1, phase.phase_name, phase.duration, budget);
        }
    }
}

fn item_name(report: &Report, id: ItemId) -> String {
    let doc = &report.recommendations;
    let name = match id.kind {
        ItemKind::Workflow => doc.workflow(id.index).map(|w| w.name.clone()),
        ItemKind::Role => doc.role(id.index).map(|r| r.title.clone()),
    };
    name.unwrap_or_default()
}

fn created_at(report: &Report) -> String {
    report
        .created_at
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
