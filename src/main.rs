mod app;
mod cli;
mod ui;

use parsha_tracker::api;
use parsha_tracker::config;
use parsha_tracker::fetch;
use parsha_tracker::gateway::{Gateway, HttpGateway, LocalGateway};
use parsha_tracker::reading::{self, Parsha};
use parsha_tracker::storage::{Catalog, ProgressStore};
use parsha_tracker::tracker::Tracker;
use parsha_tracker::utils;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands, ServeCommand};
use config::Config;
use std::env;
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::ops::RangeInclusive;
use std::panic;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use ui::theme::Theme;
use utils::paths::{get_crash_log_path, get_database_path, get_logs_dir, get_pid_file_path};
use utils::unicode::pad_to_width;

/// Install a panic hook that writes crash information to a log file
fn install_crash_handler() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if let Ok(crash_log_path) = get_crash_log_path() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let mut crash_report = format!("=== CRASH at {timestamp} ===\n");

            if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
                crash_report.push_str(&format!("Message: {message}\n"));
            } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
                crash_report.push_str(&format!("Message: {message}\n"));
            }

            if let Some(location) = panic_info.location() {
                crash_report.push_str(&format!(
                    "Location: {}:{}:{}\n",
                    location.file(),
                    location.line(),
                    location.column()
                ));
            }

            crash_report.push_str(&format!(
                "\nBacktrace:\n{}\n",
                std::backtrace::Backtrace::force_capture()
            ));
            crash_report.push('\n');

            if let Some(parent) = crash_log_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log_path)
            {
                let _ = file.write_all(crash_report.as_bytes());
                eprintln!("\nCrash logged to: {}", crash_log_path.display());
            }
        }

        default_hook(panic_info);
    }));
}

/// Initialize file-based logging for the terminal client and `parsha init`.
///
/// Logs are written to ~/.parsha-tracker/logs/parsha.log.<date>.
/// Log level can be controlled with RUST_LOG env var (default: info).
fn init_file_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let logs_dir = match get_logs_dir() {
        Ok(dir) => dir,
        Err(_) => return None,
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Warning: Could not create logs directory: {e}");
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "parsha.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    Some(guard)
}

fn main() -> Result<()> {
    install_crash_handler();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Some(Commands::Serve { command, port }) => {
            handle_serve_command(command, port, &config)?;
        }
        Some(Commands::Init {
            output,
            force,
            from_year,
            to_year,
        }) => {
            let _log_guard = init_file_logging();
            let output = match output {
                Some(path) => path,
                None => config.data_file()?,
            };
            let runtime = Runtime::new()?;
            runtime.block_on(handle_init(&output, force, from_year..=to_year, &config))?;
        }
        Some(command) => {
            let runtime = Runtime::new()?;
            let gateway = build_gateway(cli.offline, &config)?;
            runtime.block_on(handle_command(command, gateway))?;
        }
        None => {
            // Guard must be kept alive for the duration of the app
            let _log_guard = init_file_logging();

            tracing::info!(offline = cli.offline, "parsha starting");

            let runtime = Runtime::new()?;
            let gateway = build_gateway(cli.offline, &config)?;
            let watch_path = if cli.offline {
                Some(get_database_path()?)
            } else {
                None
            };

            let mut state = app::AppState::new(
                Tracker::new(gateway),
                Theme::from_config(&config),
                runtime.handle().clone(),
            );
            state.refresh();

            ui::run_tui(state, watch_path)?;

            tracing::info!("parsha exiting gracefully");
        }
    }

    Ok(())
}

fn open_local_catalog(config: &Config) -> Result<Catalog> {
    let store = ProgressStore::open(get_database_path()?)?;
    let data_file = config.data_file()?;
    Catalog::open(&data_file, store)
        .with_context(|| format!("Failed to load readings from {}", data_file.display()))
}

fn build_gateway(offline: bool, config: &Config) -> Result<Arc<dyn Gateway>> {
    if offline {
        let catalog = open_local_catalog(config)?;
        return Ok(Arc::new(LocalGateway::new(Arc::new(catalog))));
    }

    if config.targets_local_server() {
        ensure_server_running(config.port)?;
    }

    let gateway = HttpGateway::new(&config.api_url, config.request_timeout())?;
    Ok(Arc::new(gateway))
}

async fn handle_command(command: Commands, gateway: Arc<dyn Gateway>) -> Result<()> {
    match command {
        Commands::Stats => {
            let stats = gateway.fetch_stats().await?;
            print_stats(&stats);
        }
        Commands::Overview => {
            let parshiot = gateway.fetch_parshiot().await?;
            print_overview(&parshiot);
        }
        Commands::Show { title } => {
            let mut tracker = Tracker::new(gateway);
            tracker.refresh().await?;
            if let Some(title) = title
                && !tracker.selection_mut().select_by_title(&title)
            {
                return Err(anyhow!("Parsha not found: {title}"));
            }
            match tracker.selection().selected() {
                Some(parsha) => print_parsha(parsha),
                None => println!("No parshiot found"),
            }
        }
        Commands::Toggle { title, number } => {
            let parsha = gateway.fetch_parsha(&title).await?;
            let current = parsha
                .aliyah(number)
                .map(|a| a.is_complete)
                .ok_or_else(|| anyhow!("Aliyah {number} not found in {title}"))?;

            let mut tracker = Tracker::new(gateway);
            tracker.toggle_one(&title, number, current).await?;
            let state = if current { "incomplete" } else { "complete" };
            println!("✓ {} aliyah {number} marked {state}", parsha.short_title());
        }
        Commands::ToggleAll { title } => {
            let parsha = gateway.fetch_parsha(&title).await?;
            let mut tracker = Tracker::new(gateway);
            let target = tracker.toggle_all(&parsha).await?;
            let state = if target { "complete" } else { "incomplete" };
            println!(
                "✓ {} aliyot of {} marked {state}",
                parsha.aliyot.len(),
                parsha.short_title()
            );
        }
        Commands::Serve { .. } | Commands::Init { .. } => {
            return Err(anyhow!("this command does not go through a gateway"));
        }
    }
    Ok(())
}

fn print_stats(stats: &reading::AggregateStats) {
    println!("Torah reading progress");
    println!(
        "  Aliyot: {}/{} ({}%)",
        stats.completed.aliyot, stats.total.aliyot, stats.percentage.aliyot
    );
    println!(
        "  Verses: {}/{} ({}%)",
        stats.completed.verses, stats.total.verses, stats.percentage.verses
    );
    println!(
        "  Words:  {}/{} ({}%)",
        stats.completed.words, stats.total.words, stats.percentage.words
    );
}

fn print_overview(parshiot: &[Parsha]) {
    let groups = reading::group_by_book(parshiot);
    if groups.canonical().next().is_none() {
        println!("No parshiot found");
        return;
    }

    for (book, in_book) in groups.canonical() {
        let totals = reading::book_stats(in_book.iter().copied());
        println!(
            "{book}  ({}/{} aliyot, {}% of words)",
            totals.completed.aliyot, totals.total.aliyot, totals.percentage.words
        );
        for parsha in in_book {
            let figures = reading::parsha_stats(parsha, &totals.total);
            println!(
                "  {} {}/{}  {:.1}% of words  {:.1}% of verses",
                pad_to_width(parsha.short_title(), 22),
                figures.completed_aliyot,
                figures.total_aliyot,
                figures.word_share_of_book,
                figures.verse_share_of_book
            );
        }
    }
}

fn print_parsha(parsha: &Parsha) {
    println!("{}  {}", parsha.title, parsha.name);
    println!("{}  ·  {}", parsha.book, parsha.torah_portion);
    println!();

    for aliyah in parsha.aliyot_in_order() {
        let checkbox = if aliyah.is_complete { "[x]" } else { "[ ]" };
        let completed_on = aliyah
            .date_completed
            .map(|d| format!("  completed {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!(
            "{checkbox} {:>2}. {} {} verses, {} words{completed_on}",
            aliyah.number,
            pad_to_width(&aliyah.verses, 26),
            aliyah.verse_count,
            aliyah.word_count
        );
    }
}

async fn handle_init(
    output: &Path,
    force: bool,
    years: RangeInclusive<i32>,
    config: &Config,
) -> Result<()> {
    if output.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            output.display()
        ));
    }
    if years.is_empty() {
        return Err(anyhow!(
            "Empty year range {}..={}",
            years.start(),
            years.end()
        ));
    }

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("parsha-tracker/", env!("CARGO_PKG_VERSION")))
        .build()?;

    println!(
        "Fetching aliyot for {}-{} from Hebcal and counting words with Sefaria...",
        years.start(),
        years.end()
    );
    println!("This may take several minutes.");

    let parshiot = fetch::initialize(&client, fetch::HEBCAL_URL, fetch::SEFARIA_URL, years).await?;
    fetch::write_readings(output, &parshiot)?;

    let summary = fetch::InitSummary::of(&parshiot);
    tracing::info!(?summary, path = %output.display(), "Readings written");
    println!(
        "✓ Wrote {} parshiot ({} aliyot) to {}",
        summary.parshiot,
        summary.aliyot,
        output.display()
    );
    if summary.parshiot < fetch::PARSHIOT.len() {
        println!(
            "  {} parshiot are missing; see the log for which",
            fetch::PARSHIOT.len() - summary.parshiot
        );
    }
    if summary.uncounted > 0 {
        println!("  {} aliyot have no word count", summary.uncounted);
    }
    Ok(())
}

fn handle_serve_command(command: Option<ServeCommand>, port: u16, config: &Config) -> Result<()> {
    match command.unwrap_or(ServeCommand::Start { daemon: false }) {
        ServeCommand::Start { daemon } => {
            if daemon {
                run_server_foreground(port, config)
            } else {
                handle_serve_start(port)
            }
        }
        ServeCommand::Stop => handle_serve_stop(),
        ServeCommand::Status => handle_serve_status(port),
    }
}

fn handle_serve_start(port: u16) -> Result<()> {
    if is_server_running(port) {
        println!("Server is already running on port {port}");
        return Ok(());
    }

    start_server_background(port)?;
    println!("Server started on port {port}");
    Ok(())
}

fn handle_serve_stop() -> Result<()> {
    let pid = read_pid_file()?;

    if let Some(pid) = pid {
        kill_process(pid)?;
        remove_pid_file()?;
        println!("Server stopped (PID: {pid})");
    } else {
        println!("Server is not running (no PID file found)");
    }

    Ok(())
}

fn handle_serve_status(port: u16) -> Result<()> {
    let pid = read_pid_file()?;
    let running = is_server_running(port);

    match (pid, running) {
        (Some(pid), true) => {
            println!("Server is running on port {port} (PID: {pid})");
        }
        (Some(pid), false) => {
            println!("Server PID file exists ({pid}) but server is not responding on port {port}");
            println!("Consider running 'parsha serve stop' to clean up");
        }
        (None, true) => {
            println!("Server is running on port {port} but no PID file found");
        }
        (None, false) => {
            println!("Server is not running");
        }
    }

    Ok(())
}

fn is_server_running(port: u16) -> bool {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match TcpStream::connect_timeout(&addr, Duration::from_millis(500)) {
        Ok(mut stream) => {
            let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
            let request = format!(
                "GET /api/health HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n"
            );
            if stream.write_all(request.as_bytes()).is_ok() {
                let mut response = String::new();
                let _ = stream.read_to_string(&mut response);
                response.contains("200") || response.contains("healthy")
            } else {
                false
            }
        }
        Err(_) => false,
    }
}

fn start_server_background(port: u16) -> Result<()> {
    let current_exe = env::current_exe()?;

    let child = Command::new(&current_exe)
        .args(["serve", "start", "--port", &port.to_string(), "--daemon"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    write_pid_file(child.id())?;

    std::thread::sleep(Duration::from_millis(500));

    if !is_server_running(port) {
        return Err(anyhow!(
            "Failed to start server - not responding on port {port}"
        ));
    }

    Ok(())
}

fn ensure_server_running(port: u16) -> Result<()> {
    if !is_server_running(port) {
        println!("Starting API server on port {port}...");
        start_server_background(port)?;
    }
    Ok(())
}

fn read_pid_file() -> Result<Option<u32>> {
    let pid_path = get_pid_file_path()?;

    if !pid_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&pid_path)?;
    let pid: u32 = content.trim().parse()?;
    Ok(Some(pid))
}

fn write_pid_file(pid: u32) -> Result<()> {
    let pid_path = get_pid_file_path()?;

    if let Some(parent) = pid_path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    fs::write(&pid_path, pid.to_string())?;
    Ok(())
}

fn remove_pid_file() -> Result<()> {
    let pid_path = get_pid_file_path()?;
    if pid_path.exists() {
        fs::remove_file(&pid_path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn kill_process(pid: u32) -> Result<()> {
    Command::new("kill").args(["-9", &pid.to_string()]).output()?;
    Ok(())
}

#[cfg(windows)]
fn kill_process(pid: u32) -> Result<()> {
    Command::new("taskkill")
        .args(["/F", "/PID", &pid.to_string()])
        .output()?;
    Ok(())
}

#[tokio::main]
async fn run_server_foreground(port: u16, config: &Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let catalog = open_local_catalog(config)?;
    if !catalog.is_initialized() {
        tracing::warn!("No Torah readings loaded; serving an empty collection");
    }

    let app = api::create_router(Arc::new(catalog));
    let addr = format!("0.0.0.0:{port}");

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
