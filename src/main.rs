use std::{
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use fokus::{
    app::App,
    app_dirs::AppDirs,
    clock::MonotonicClock,
    config::{Config, ConfigStore, FileConfigStore},
    controller::Controller,
    countdown::hms_from_duration,
    effects::{AlarmTone, CommandAlarm, DesktopNotifier},
    history,
    prompt::TerminalDecider,
    registry::Tab,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    session::SessionLog,
    store::{KvStore, MemoryStore, SqliteStore},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

type TerminalApp = App<MonotonicClock, DesktopNotifier, CommandAlarm>;

/// focus stopwatch, countdown and rest timer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A focus stopwatch that prescribes rest in proportion to the work done, a countdown timer with presets, and a local log of every focus session."
)]
pub struct Cli {
    /// alarm tone for focus stops and rest completion
    #[clap(long, value_enum)]
    alarm: Option<AlarmTone>,

    /// sampling interval in milliseconds
    #[clap(long)]
    tick_rate: Option<u64>,

    /// disable desktop notifications
    #[clap(long)]
    no_notify: bool,

    /// preconfigure the countdown, e.g. 25m, 1h30m, 90s (a bare number is minutes)
    #[clap(short = 'c', long, value_parser = parse_duration_arg)]
    countdown: Option<Duration>,

    /// session database to use instead of the default
    #[clap(long)]
    db: Option<PathBuf>,

    /// log at debug level
    #[clap(short, long)]
    verbose: bool,

    /// persist the effective settings to the config file and exit
    #[clap(long)]
    save_config: bool,

    /// print the session log and exit
    #[clap(long)]
    history: bool,

    /// print the session log as CSV
    #[clap(long, requires = "history")]
    csv: bool,
}

impl Cli {
    /// Layer the command line over the stored settings
    fn apply(&self, mut config: Config) -> Config {
        if let Some(alarm) = self.alarm {
            config.alarm = alarm;
        }
        if let Some(ms) = self.tick_rate {
            config.tick_rate_ms = ms;
        }
        if self.no_notify {
            config.notifications = false;
        }
        config
    }
}

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    let too_long = || "duration is too long".to_string();
    let mut total = 0u64;
    if let Ok(minutes) = s.parse::<u64>() {
        total = minutes.checked_mul(60).ok_or_else(too_long)?;
    } else {
        let mut current = String::new();
        for ch in s.chars() {
            if ch.is_ascii_digit() {
                current.push(ch);
                continue;
            }
            let unit = match ch {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => return Err(format!("unexpected '{ch}' in duration")),
            };
            if current.is_empty() {
                return Err(format!("missing number before '{ch}'"));
            }
            let value = current.parse::<u64>().map_err(|_| too_long())?;
            total = value
                .checked_mul(unit)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(too_long)?;
            current.clear();
        }
        if !current.is_empty() {
            return Err(format!("missing unit after {current}"));
        }
    }
    if total == 0 {
        return Err("duration must be positive".to_string());
    }
    Ok(Duration::from_secs(total))
}

/// Log to a file in the state directory; the terminal belongs to the TUI.
fn init_logging(verbose: bool) {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = if verbose {
        EnvFilter::new("fokus=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fokus=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn open_store(path: Option<&Path>) -> Box<dyn KvStore> {
    let opened = match path {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::open_default(),
    };
    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "session database unavailable, sessions kept in memory");
            Box::new(MemoryStore::new())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());

    if cli.save_config {
        config_store
            .save(&config)
            .with_context(|| format!("writing {}", config_store.path().display()))?;
        println!("saved {}", config_store.path().display());
        return Ok(());
    }

    let store = open_store(cli.db.as_deref());

    if cli.history {
        let log = SessionLog::load(store.as_ref());
        let stdout = io::stdout();
        if cli.csv {
            history::write_csv(&log, stdout.lock())?;
        } else {
            history::write_table(&log, &mut stdout.lock())?;
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let tick_rate = config.tick_rate();
    let controller = Controller::new(
        MonotonicClock::new(),
        config,
        store,
        DesktopNotifier,
        CommandAlarm,
    );
    let mut app = App::new(controller);
    if let Some(duration) = cli.countdown {
        let (hours, minutes, seconds) = hms_from_duration(duration);
        if app
            .controller
            .configure_countdown(hours, minutes, seconds)
            .is_ok()
        {
            let _ = app.controller.switch_tab(Tab::Countdown);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!("fokus started");
    let result = start_tui(&mut terminal, &mut app, tick_rate);
    app.controller.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut TerminalApp,
    tick_rate: Duration,
) -> Result<()> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick_rate));
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit {
        let event = runner.step();
        let redraw = {
            let mut decider = TerminalDecider::new(terminal, &runner);
            app.on_event(event, &mut decider)
        };
        for signal in app.controller.drain_signals() {
            tracing::debug!(?signal, "controller signal");
        }
        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}
