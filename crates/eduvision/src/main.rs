//! `eduv` - CLI for eduvision
//!
//! This binary renders the student pages from the EduVision API and manages
//! the remembered session.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use eduvision::api::ApiClient;
use eduvision::cli::{ApiBaseCommand, Cli, Command, ConfigCommand};
use eduvision::pages::{controller_for, ImprovementPage, PageController, ReportsPage};
use eduvision::session::{self, Resolution, Session};
use eduvision::view::RenderContext;
use eduvision::{init_logging, Config, Error, Storage};

/// Exit code when no student PRN can be resolved.
const NO_SESSION: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Configuration commands must work even when the configuration is broken
    if let Command::Config(cmd) = &cli.command {
        return handle_config(cli.config.clone(), cmd);
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let storage = Storage::open(config.database_path()).context("failed to open session storage")?;
    debug!("Session storage at {}", storage.path().display());

    match &cli.command {
        Command::Dashboard
        | Command::Progress
        | Command::Reports(_)
        | Command::Improvement(_)
        | Command::All => handle_pages(&cli, &config, &storage).await,
        Command::Login { student } => handle_login(&storage, student),
        Command::Logout => handle_logout(&storage),
        Command::Whoami => handle_whoami(&cli, &config, &storage),
        Command::ApiBase(cmd) => handle_api_base(&cli, &config, &storage, cmd),
        Command::Health(cmd) => handle_health(&cli, &config, &storage, cmd.json).await,
        Command::Students(cmd) => handle_students(&cli, &config, &storage, cmd.json).await,
        Command::Config(_) => Ok(ExitCode::SUCCESS),
    }
}

fn no_session() -> ExitCode {
    eprintln!("{}", Error::MissingSession);
    eprintln!("Landing page: {}", session::REDIRECT_TARGET);
    ExitCode::from(NO_SESSION)
}

async fn handle_pages(cli: &Cli, config: &Config, storage: &Storage) -> Result<ExitCode> {
    let session = match session::resolve(&cli.session_request(), config, storage)? {
        Resolution::Active(session) => session,
        Resolution::Redirect { .. } => return Ok(no_session()),
    };

    let api = ApiClient::new(session.api_base().clone());
    let out_dir = cli.out.clone().unwrap_or_else(|| config.output_dir());
    let chart_script_url = config.output.chart_script_url.as_str();
    info!("Rendering pages for {} into {}", session.prn(), out_dir.display());

    let mut failed = false;
    match &cli.command {
        Command::Reports(args) => {
            let mut page = ReportsPage::new();
            page.load(&api, &session).await;
            failed |= write_page(&page, &session, chart_script_url, &out_dir)?;

            if args.export {
                match page.export_transcript(&out_dir)? {
                    Some(path) => println!("Transcript: {}", path.display()),
                    None => warn!("No reports loaded, transcript not exported"),
                }
            }
        }
        Command::Improvement(args) if args.interactive => {
            failed = run_interactive(&api, &session, chart_script_url, &out_dir).await?;
        }
        command => {
            for page in command.pages() {
                let mut controller = controller_for(page);
                controller.load(&api, &session).await;
                failed |= write_page(controller.as_ref(), &session, chart_script_url, &out_dir)?;
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Write a rendered page; returns whether its last load failed.
fn write_page(
    controller: &dyn PageController,
    session: &Session,
    chart_script_url: &str,
    out_dir: &Path,
) -> Result<bool> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let ctx = RenderContext::new(session, chart_script_url);
    let path = out_dir.join(controller.page().file());
    std::fs::write(&path, controller.render(&ctx).into_string())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());

    match controller.error() {
        Some(message) => {
            eprintln!("{}: {}", controller.page().title(), message);
            if !controller.is_loaded() {
                warn!("{} page written without data", controller.page());
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

async fn run_interactive(
    api: &ApiClient,
    session: &Session,
    chart_script_url: &str,
    out_dir: &Path,
) -> Result<bool> {
    let mut page = ImprovementPage::new();
    page.load(api, session).await;
    let mut failed = write_page(&page, session, chart_script_url, out_dir)?;

    println!("Press Enter to refresh recommendations, or type q to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        if matches!(line.trim(), "q" | "quit" | "exit") {
            break;
        }
        page.refresh(api, session).await;
        failed = write_page(&page, session, chart_script_url, out_dir)?;
    }

    Ok(failed)
}

fn handle_login(storage: &Storage, raw: &str) -> Result<ExitCode> {
    match session::login(storage, raw)? {
        Some(prn) => {
            println!("Logged in as {prn}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("PRN must not be empty");
            Ok(ExitCode::from(NO_SESSION))
        }
    }
}

fn handle_logout(storage: &Storage) -> Result<ExitCode> {
    if session::logout(storage)? {
        println!("Logged out");
    } else {
        println!("No PRN was stored");
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_whoami(cli: &Cli, config: &Config, storage: &Storage) -> Result<ExitCode> {
    let api_base = session::resolve_api_base(cli.api_base.as_deref(), config, storage)?;
    match session::stored_prn(storage)? {
        Some(prn) => {
            println!("PRN:      {prn}");
            println!("API base: {api_base}");
            for setting in storage.entries()? {
                println!(
                    "Stored:   {} = {} ({})",
                    setting.key,
                    setting.value,
                    setting.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(no_session()),
    }
}

fn handle_api_base(
    cli: &Cli,
    config: &Config,
    storage: &Storage,
    cmd: &ApiBaseCommand,
) -> Result<ExitCode> {
    match cmd {
        ApiBaseCommand::Set { base } => {
            let base = session::set_api_base_override(storage, base)?;
            println!("API base set to {base}");
        }
        ApiBaseCommand::Clear => {
            if session::clear_api_base_override(storage)? {
                println!("API base override removed");
            } else {
                println!("No API base override was stored");
            }
        }
        ApiBaseCommand::Show => {
            let base = session::resolve_api_base(cli.api_base.as_deref(), config, storage)?;
            println!("{base}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_health(cli: &Cli, config: &Config, storage: &Storage, json: bool) -> Result<ExitCode> {
    let base = session::resolve_api_base(cli.api_base.as_deref(), config, storage)?;
    let status = ApiClient::new(base.clone())
        .health()
        .await
        .with_context(|| format!("health check against {base} failed"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("eduvision API health");
        println!("--------------------");
        println!("API base:  {base}");
        println!("Status:    {}", if status.ok { "ok" } else { "unhealthy" });
        println!("Service:   {}", status.service.as_deref().unwrap_or("-"));
        println!("Database:  {}", status.database.as_deref().unwrap_or("-"));
        println!("DB name:   {}", status.db_name.as_deref().unwrap_or("-"));
        println!(
            "Gemini:    {}",
            if status.gemini_configured {
                "configured"
            } else {
                "not configured"
            }
        );
        if let Some(details) = &status.details {
            println!("Details:   {details}");
        }
    }

    Ok(if status.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn handle_students(cli: &Cli, config: &Config, storage: &Storage, json: bool) -> Result<ExitCode> {
    let base = session::resolve_api_base(cli.api_base.as_deref(), config, storage)?;
    let directory = ApiClient::new(base.clone())
        .students()
        .await
        .with_context(|| format!("failed to list students from {base}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&directory)?);
    } else {
        println!("{:<16} NAME", "PRN");
        for student in &directory.students {
            println!(
                "{:<16} {}",
                student.prn,
                student.name.as_deref().unwrap_or("-")
            );
        }
        println!();
        println!("{} students", directory.count);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config_path: Option<std::path::PathBuf>, cmd: &ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Base URL:           {}", config.api.base_url);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Output]");
                println!("  Directory:          {}", config.output_dir().display());
                println!("  Chart script:       {}", config.output.chart_script_url);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .clone()
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
