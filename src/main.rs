mod tui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};
use worm_game::config::{GRID_SIZE, INITIAL_INTERVAL, MIN_INTERVAL, SPEED_STEP};
use worm_game::{
    Error, FileStore, GameConfig, HighScoreStore, LoopControl, MonotonicClock, Phase, Scheduler,
    Session,
};

use tui::{Term, TerminalRenderer};

/// Display cadence; logic steps run on their own interval.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(name = "worm", about = "Grid worm game for the terminal", version)]
struct Cli {
    /// Side length of the square grid
    #[arg(long, default_value_t = GRID_SIZE)]
    grid: i32,

    /// Fixed seed for reproducible food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Starting step interval in milliseconds
    #[arg(long, default_value_t = INITIAL_INTERVAL.as_millis() as u64)]
    interval_ms: u64,

    /// Interval reduction every few points, in milliseconds
    #[arg(long, default_value_t = SPEED_STEP.as_millis() as u64)]
    speed_step_ms: u64,

    /// Fastest allowed step interval in milliseconds
    #[arg(long, default_value_t = MIN_INTERVAL.as_millis() as u64)]
    min_interval_ms: u64,

    /// Ignore direction keys while paused
    #[arg(long)]
    pause_drops_input: bool,

    /// High score file (default: platform data directory)
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    #[arg(long, default_value = "worm.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> GameConfig {
        GameConfig {
            grid_size: self.grid,
            initial_interval: Duration::from_millis(self.interval_ms),
            speed_step: Duration::from_millis(self.speed_step_ms),
            min_interval: Duration::from_millis(self.min_interval_ms),
            queue_while_paused: !self.pause_drops_input,
            ..GameConfig::default()
        }
    }
}

fn main() {
    if let Err(e) = run_app(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_app(cli: Cli) -> Result<(), Error> {
    // The terminal belongs to the game, so logs go to a file.
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), File::create(&cli.log_file)?)?;
    info!("starting worm");

    let store: Box<dyn HighScoreStore> = match &cli.high_score_file {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(FileStore::in_data_dir()?),
    };
    let cfg = cli.config();
    let mut session = match cli.seed {
        Some(seed) => Session::with_seed(cfg, store, seed)?,
        None => Session::new(cfg, store)?,
    };

    // --- Init terminal ---
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let res = run(&mut terminal, &mut session);

    // --- Restore terminal even on error ---
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!("game loop failed: {e}");
    }
    info!("exiting with high score {}", session.high_score());
    Ok(res?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn run(terminal: &mut Term, session: &mut Session) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || forward_events(tx));

    let mut scheduler = Scheduler::new(MonotonicClock::new());
    let mut renderer = TerminalRenderer::new(terminal);

    loop {
        if drain_events(&rx, session, &mut scheduler) == Flow::Quit {
            return Ok(());
        }

        match scheduler.frame(session, &mut renderer)? {
            LoopControl::Continue => thread::sleep(FRAME),
            LoopControl::Stop => {
                // Nothing to animate: block until restart or quit.
                let Ok(event) = rx.recv() else {
                    return Ok(());
                };
                if handle_event(session, &mut scheduler, event) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

/// Input thread: the only reader of terminal events.
fn forward_events(tx: Sender<Event>) {
    loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    return;
                }
            }
            Err(e) => {
                error!("reading terminal events: {e}");
                return;
            }
        }
    }
}

fn drain_events(
    rx: &Receiver<Event>,
    session: &mut Session,
    scheduler: &mut Scheduler<MonotonicClock>,
) -> Flow {
    loop {
        match rx.try_recv() {
            Ok(event) => {
                if handle_event(session, scheduler, event) == Flow::Quit {
                    return Flow::Quit;
                }
            }
            Err(TryRecvError::Empty) => return Flow::Continue,
            Err(TryRecvError::Disconnected) => return Flow::Quit,
        }
    }
}

fn handle_event(
    session: &mut Session,
    scheduler: &mut Scheduler<MonotonicClock>,
    event: Event,
) -> Flow {
    let Event::Key(key) = event else {
        return Flow::Continue;
    };
    if key.kind != KeyEventKind::Press {
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Flow::Quit,

        KeyCode::Enter if session.phase() == Phase::Ready => session.start(),
        KeyCode::Enter | KeyCode::Char('r') if session.phase() == Phase::GameOver => {
            session.restart();
            scheduler.resume();
        }

        code => {
            if let Some(name) = key_name(code) {
                session.submit_key(&name);
            }
        }
    }
    Flow::Continue
}

/// Raw key name for the session's key map.
fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Esc => "Escape",
        KeyCode::Char(c) => return Some(c.to_string()),
        _ => return None,
    };
    Some(name.to_owned())
}
