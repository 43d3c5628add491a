//! devterm console entry point.
//!
//! Interactive when stdin is a terminal: raw-mode line editing, history on
//! the arrow keys, Tab completion, Ctrl-C to drop the line, Ctrl-D to quit.
//! Piped input is run one line at a time without a prompt.

mod input;
mod launch;
mod render;

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use devterm_platform::{FileStore, Persistence};
use devterm_terminal::{DisplaySink, Services, Shell, StyleTag};
use devterm_types::config::TerminalConfig;

use render::ConsoleDisplay;

const DEFAULT_CONFIG: &str = "devterm.toml";
/// Upper bound on how late a timer or alert poll can fire.
const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = load_config();
    log::info!(
        "Starting devterm as {}@{} (state in {})",
        config.user,
        config.hostname,
        config.state_file.display()
    );

    let store = Persistence::new(FileStore::open(&config.state_file));
    let mut shell = Shell::new(&config, store, Services::desktop());

    if io::stdin().is_terminal() {
        run_interactive(&mut shell)
    } else {
        run_piped(&mut shell)
    }
}

/// Config path from the first argument, `DEVTERM_CONFIG`, or the default
/// file name.
fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("DEVTERM_CONFIG"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn load_config() -> TerminalConfig {
    let path = config_path();
    TerminalConfig::load(&path).unwrap_or_else(|e| {
        log::error!("{}: {e}; using defaults", path.display());
        TerminalConfig::default()
    })
}

/// Restores cooked mode when dropped.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            original_hook(info);
        }));
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::error!("Failed to disable raw mode: {e}");
        }
    }
}

fn run_interactive(shell: &mut Shell) -> Result<()> {
    let _raw = RawMode::enable()?;
    let palette = shell.session().presentation.palette();
    let mut display = ConsoleDisplay::new(io::stdout(), palette, true, true);
    shell.boot(&mut display);

    while !shell.exit_requested() {
        display.set_palette(shell.session().presentation.palette());
        display.draw_prompt(&shell.prompt(), shell.input(), false)?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && let Some(ev) = input::map_key(key)
        {
            shell.handle_input(ev, &mut display);
            display.draw_prompt(&shell.prompt(), shell.input(), true)?;
        }
        shell.tick(Instant::now(), &mut display);

        if let Some(program) = shell.take_launch() {
            let message = launch::run(program, &mut io::stdout())?;
            display.write(&message, Some(StyleTag::System));
        }
    }
    display.finish()?;
    Ok(())
}

fn run_piped(shell: &mut Shell) -> Result<()> {
    let palette = shell.session().presentation.palette();
    let mut display = ConsoleDisplay::new(io::stdout(), palette, false, io::stdout().is_terminal());
    shell.boot(&mut display);

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        shell.submit(line);
        shell.process_queue(&mut display);
        shell.tick(Instant::now(), &mut display);
        if let Some(program) = shell.take_launch() {
            log::warn!("{program:?} needs an interactive terminal");
            display.write(
                "This program needs an interactive terminal.",
                Some(StyleTag::Error),
            );
        }
        if shell.exit_requested() {
            break;
        }
    }
    Ok(())
}
