use std::cmp::max;

use backend::Backend;
use board::{CoordinateError, CoordinateMove};
use clap::Parser;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use terminal_ui::TerminalUIPlayer;

/// Play chess against someone sitting at the same terminal
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug mode. This raises the log level to at least `Debug`.
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Set the log level for the application
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Disable colored output in the logs
    #[arg(long, default_value_t = false)]
    no_colors: bool,

    /// Moves to play before the players take over, such as "e2e4 e7e5"
    #[arg(long, default_value = "")]
    opening: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("couldn't start logging: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("couldn't read the opening: {0}")]
    Opening(#[from] CoordinateError),
    #[error(transparent)]
    Game(#[from] backend::Error),
}

fn run(args: Cli) -> Result<(), CliError> {
    let log_level = if args.debug {
        max(LevelFilter::Debug, args.log_level)
    } else {
        args.log_level
    };
    let mut config_builder = simplelog::ConfigBuilder::new();
    if args.debug {
        config_builder.set_target_level(LevelFilter::Error);
        config_builder.set_location_level(LevelFilter::Error);
    } else {
        config_builder.set_time_level(LevelFilter::Off);
        config_builder.set_target_level(LevelFilter::Off);
        config_builder.set_location_level(LevelFilter::Off);
    }
    let color_choice = if args.no_colors {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    TermLogger::init(
        log_level,
        config_builder.build(),
        TerminalMode::Stderr,
        color_choice,
    )?;
    log::debug!("Parsed arguments: {args:?}");

    let opening = args
        .opening
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<CoordinateMove>, _>>()?;
    let mut backend = Backend::new(TerminalUIPlayer::new(), TerminalUIPlayer::new())
        .with_opening(&opening)?;
    let end = backend.play_game()?;
    println!("{end}");
    Ok(())
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
