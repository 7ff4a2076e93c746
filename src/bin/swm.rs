use clap::Parser;

use swm::config::Config;
use swm::context::DisplayContext;
use swm::prelude::*;
use swm::wm::WindowManager;

use std::process::exit;

/// Command line arguments.
#[derive(Parser)]
#[command(name = "swm", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Print the version and exit.
    #[arg(short = 'v')]
    version: bool,
}

/// Print to stderr and exit unsuccessfully.
fn die(message: impl std::fmt::Display) -> ! {
    eprintln!("swm: {}", message);
    exit(1)
}

/// Configure file logging.
fn setup_logger() -> SwmResult<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("swm")
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

    let mut log_path = xdg_dirs.get_cache_home();
    log_path.push("logs");

    if !log_path.exists() {
        std::fs::create_dir_all(&log_path)?;
    }

    // Log file with current timestamp.
    log_path.push(
        &format!(
            "{}.log",
            chrono::Local::now().format("swm-%Y-%m-%d-%H:%M:%S")
        )[..],
    );

    #[cfg(debug_assertions)]
    let current_log_level = log::LevelFilter::Debug;

    #[cfg(not(debug_assertions))]
    let current_log_level = log::LevelFilter::Info;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(current_log_level)
        .chain(fern::log_file(log_path)?)
        .chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Warn)
                .chain(std::io::stderr()),
        )
        .apply()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(())
}

/// User configuration if present, compiled-in table otherwise.
fn load_config() -> Config {
    let path = xdg::BaseDirectories::with_prefix("swm")
        .ok()
        .and_then(|dirs| dirs.find_config_file("config.json"));

    match path {
        Some(path) => Config::from_path(&path).unwrap_or_else(|e| {
            warn!("Ignoring {:?}: {}", path, e);
            Config::default()
        }),
        None => Config::default(),
    }
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|_| die("use swm [-v]"));
    if cli.version {
        // Non-zero on purpose: `swm -v` has always exited with status 1.
        eprintln!("swm-{}", env!("CARGO_PKG_VERSION"));
        exit(1);
    }

    if let Err(e) = setup_logger() {
        eprintln!("swm: logging disabled: {}", e);
    }

    let conn = DisplayContext::connect().unwrap_or_else(|e| die(e));
    let mut wm = WindowManager::new(conn, load_config()).unwrap_or_else(|e| die(e));

    if let Err(e) = wm.adopt_existing() {
        warn!("Could not adopt existing windows: {}", e);
    }

    info!("Initialized.");

    if let Err(e) = wm.run() {
        error!("{}", e);
        drop(wm);
        die(e);
    }
}
