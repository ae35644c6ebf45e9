use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger,
};

use crate::config::Cli;

/// Sets up a colored terminal sink plus a rotating-by-restart file sink
/// under `<data_dir>/logs/thornkeep.log`, matching the `--debug`/`--silent`/
/// `--no-color`/`--no-console` surface in §6.
pub fn init(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = Vec::new();

    if !cli.silent && !cli.no_console {
        let color_choice = if cli.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        loggers.push(TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            color_choice,
        ));
    }

    let log_dir = cli.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("thornkeep.log"))?;
    loggers.push(WriteLogger::new(LevelFilter::Info, Config::default(), log_file));

    CombinedLogger::init(loggers)?;
    Ok(())
}
