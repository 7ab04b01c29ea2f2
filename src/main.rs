//! QUADTRIS - falling blocks, in one direction or four
//!
//! Terminal front end and headless line protocol for the quadtris engine.

mod input;
mod ui;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use input::{Command, KeyBindings};
use quadtris::game::{FinalResult, Game};
use quadtris::leaderboard::{Leaderboard, MAX_NAME_LEN};
use quadtris::scheduler::Driver;
use quadtris::settings::Settings;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, BufRead, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui::Panel;

/// Upper bound on how long the loop waits for input between redraws
const FRAME_DURATION: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "quadtris", version, about = "Falling blocks, in one direction or four")]
struct Opts {
    /// Start in quad mode
    #[arg(long)]
    quad: bool,
    /// Seed for a reproducible piece and direction sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Initials offered when a score makes the leaderboard
    #[arg(long)]
    name: Option<String>,
    /// Read action tokens from stdin and write JSON snapshots to stdout
    #[arg(long)]
    headless: bool,
    /// Print the stored leaderboard and exit
    #[arg(long)]
    leaderboard: bool,
    /// Remove every stored leaderboard entry and exit
    #[arg(long)]
    clear_leaderboard: bool,
    /// Leaderboard file (defaults to the platform data directory)
    #[arg(long)]
    leaderboard_path: Option<PathBuf>,
}

/// Get the quadtris temp directory, creating it if needed
fn quadtris_temp_dir() -> Option<PathBuf> {
    let dir = std::env::temp_dir().join("quadtris");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log to a per-session file; the terminal belongs to the game
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let session_id: u32 = rand::random();
    let dir = quadtris_temp_dir()?;
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quadtris=debug"));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    info!(
        "QUADTRIS starting up, session={:08x}, log={}",
        session_id,
        dir.join(&log_file).display()
    );
    Some(guard)
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let _guard = init_logging();

    let settings = Settings::load();
    let board_path = opts.leaderboard_path.clone().or_else(Leaderboard::default_path);

    if opts.clear_leaderboard {
        let path = board_path.context("Could not determine leaderboard path")?;
        // A corrupt file is replaced as well
        let mut board = Leaderboard::load(&path).unwrap_or_default();
        board.clear();
        board.save(&path)?;
        println!("Leaderboard cleared");
        return Ok(());
    }

    if opts.leaderboard {
        let path = board_path.context("Could not determine leaderboard path")?;
        print_leaderboard(&Leaderboard::load(&path)?);
        return Ok(());
    }

    let quad = opts.quad || settings.gameplay.start_in_quad_mode;
    let seed = opts.seed.unwrap_or_else(rand::random);
    info!(seed, quad, "session configured");
    let game = Game::with_options(seed, quad);

    if opts.headless {
        return run_headless(game);
    }

    let leaderboard = match board_path.as_deref().map(Leaderboard::load) {
        Some(Ok(board)) => board,
        Some(Err(e)) => {
            warn!(error = %e, "starting with an empty leaderboard");
            Leaderboard::default()
        }
        None => Leaderboard::default(),
    };
    let player_name = opts
        .name
        .clone()
        .unwrap_or_else(|| settings.gameplay.player_name.clone());

    let mut app = App {
        driver: Driver::new(game, Instant::now()),
        keys: KeyBindings::from_settings(&settings),
        settings,
        leaderboard,
        board_path,
        player_name,
        screen: Screen::Playing,
        offered: false,
    };

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let result = Terminal::new(backend)
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| {
            terminal.clear()?;
            run_app(&mut terminal, &mut app)
        });

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    let game = &app.driver.game;
    println!("\nThanks for playing QUADTRIS!");
    println!("Final Score: {}", game.score());
    println!("Level: {} | Lines: {}", game.level(), game.lines_cleared());

    result
}

fn print_leaderboard(board: &Leaderboard) {
    if board.is_empty() {
        println!("No high scores yet");
        return;
    }
    for (rank, entry) in board.top().iter().enumerate() {
        println!(
            "{:>2}. {:<3} {:>8}  level {:<2} lines {:<4} {}",
            rank + 1,
            entry.player_name,
            entry.score,
            entry.level,
            entry.lines_cleared,
            entry.date.format("%Y-%m-%d"),
        );
    }
}

/// One action token (or `TICK`) per input line, one JSON snapshot per output line
fn run_headless(mut game: Game) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let token = line.trim();
        if token.eq_ignore_ascii_case("TICK") {
            game.drop_tick();
        } else {
            game.apply_token(token);
        }

        serde_json::to_writer(&mut out, &game.snapshot()).context("Failed to write snapshot")?;
        writeln!(out)?;
        out.flush()?;
    }

    info!(score = game.score(), "headless session finished");
    Ok(())
}

/// What currently has the keyboard
enum Screen {
    Playing,
    NameEntry { name: String, result: FinalResult },
    Leaderboard { status: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

struct App {
    driver: Driver,
    keys: KeyBindings,
    settings: Settings,
    leaderboard: Leaderboard,
    board_path: Option<PathBuf>,
    player_name: String,
    screen: Screen,
    /// Whether this game's score was already offered to the leaderboard
    offered: bool,
}

impl App {
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        match &mut self.screen {
            Screen::Playing => match self.keys.command_for(key) {
                Some(Command::Exit) => return Flow::Exit,
                Some(Command::Game(action)) => self.driver.dispatch(action, now),
                None => {}
            },
            Screen::NameEntry { name, result } => match key.code {
                KeyCode::Char(c) if c.is_ascii_alphanumeric() && name.len() < MAX_NAME_LEN => {
                    name.push(c.to_ascii_uppercase());
                }
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Enter => {
                    let (name, result) = (name.clone(), *result);
                    self.submit(result, &name);
                }
                KeyCode::Esc => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::Leaderboard { .. } => self.screen = Screen::Playing,
        }
        Flow::Continue
    }

    fn submit(&mut self, result: FinalResult, name: &str) {
        self.leaderboard.submit(result, name, Utc::now());
        let status = match &self.board_path {
            Some(path) => self.leaderboard.save(path).err().map(|e| {
                warn!(error = %e, "could not save leaderboard");
                "Could not save the leaderboard".to_string()
            }),
            None => Some("No place to save the leaderboard".to_string()),
        };
        self.screen = Screen::Leaderboard { status };
    }

    /// Ask for initials once per finished game, if the score earns a place
    fn offer_submission(&mut self) {
        let game = &self.driver.game;
        if !game.is_over() {
            self.offered = false;
            return;
        }
        if self.offered || !matches!(self.screen, Screen::Playing) {
            return;
        }
        self.offered = true;
        if let Some(result) = game.final_result() {
            if self.leaderboard.qualifies(result.score) {
                let name = quadtris::leaderboard::normalize_name(&self.player_name);
                self.screen = Screen::NameEntry { name, result };
            }
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let panel = match &app.screen {
                Screen::Playing => Panel::Game,
                Screen::NameEntry { name, result } => Panel::NameEntry {
                    name,
                    score: result.score,
                },
                Screen::Leaderboard { status } => Panel::Leaderboard {
                    entries: app.leaderboard.top(),
                    status: status.as_deref(),
                },
            };
            ui::render_game(frame, &app.driver.game, &app.settings, panel);
        })?;

        // Wake up for whichever comes first: a key or the next drop
        let wait = app
            .driver
            .time_until_due(Instant::now())
            .map_or(FRAME_DURATION, |due| due.min(FRAME_DURATION));

        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && app.handle_key(key, Instant::now()) == Flow::Exit
                {
                    return Ok(());
                }
            }
        }

        app.driver.advance(Instant::now());
        app.offer_submission();
    }
}
