mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing::{info, warn};

use duel_shooter::audio::{self, AudioSink, TerminalBell};
use duel_shooter::config::{self, DuelConfig};
use duel_shooter::driver::{self, Realtime};
use duel_shooter::entities::{Direction, PlayerId};
use duel_shooter::input::Key;
use duel_shooter::session::{Phase, Session};

/// Step applied by the volume keys.
const VOLUME_STEP: f32 = 0.1;

/// A key is considered "held" if its last press/repeat event arrived within
/// this window.  Only used on terminals that don't emit key-release events;
/// the OS key-repeat keeps refreshing a key that is actually held down.
const HOLD_WINDOW: Duration = Duration::from_millis(133);

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(author, version, about = "Two-player terminal duel", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name shown for player 1 (blue, W A S D)
    #[arg(long)]
    p1_name: Option<String>,

    /// Name shown for player 2 (red, arrow keys)
    #[arg(long)]
    p2_name: Option<String>,

    /// Master volume between 0 and 1
    #[arg(long)]
    volume: Option<f32>,

    /// Where log output goes (stdout is the game screen)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<DuelConfig> {
    let mut cfg = config::load(args.config.as_deref()).context("load configuration")?;
    if let Some(name) = &args.p1_name {
        cfg.player1_name = name.clone();
    }
    if let Some(name) = &args.p2_name {
        cfg.player2_name = name.clone();
    }
    if let Some(volume) = args.volume {
        cfg.volume = volume;
    }
    if let Some(path) = &args.log_file {
        cfg.log_file = path.clone();
    }
    cfg.validate().context("command-line overrides")?;
    Ok(cfg)
}

// ============================================================================
// Logging
// ============================================================================

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("open log file {}", log_file.display()))?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(())
}

// ============================================================================
// Key mapping
// ============================================================================

/// What a terminal key means right now. Enter starts the match from the
/// start screen and is player 2's trigger everywhere else.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Command {
    Game(Key),
    Start,
    Restart,
    PlayAgain,
    Volume(f32),
    Quit,
}

fn map_key(code: KeyCode, modifiers: KeyModifiers, phase: Phase) -> Option<Command> {
    use PlayerId::{Player1, Player2};

    let command = match code {
        KeyCode::Esc => Command::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Enter if phase == Phase::Idle => Command::Start,
        KeyCode::Enter => Command::Game(Key::Fire(Player2)),
        KeyCode::Char(' ') => Command::Game(Key::Fire(Player1)),
        KeyCode::Up => Command::Game(Key::Move(Player2, Direction::Up)),
        KeyCode::Down => Command::Game(Key::Move(Player2, Direction::Down)),
        KeyCode::Left => Command::Game(Key::Move(Player2, Direction::Left)),
        KeyCode::Right => Command::Game(Key::Move(Player2, Direction::Right)),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Command::Game(Key::Move(Player1, Direction::Up)),
            's' => Command::Game(Key::Move(Player1, Direction::Down)),
            'a' => Command::Game(Key::Move(Player1, Direction::Left)),
            'd' => Command::Game(Key::Move(Player1, Direction::Right)),
            'q' => Command::Game(Key::Shield(Player1)),
            'm' => Command::Game(Key::Shield(Player2)),
            'p' => Command::Game(Key::Pause),
            'r' => Command::Restart,
            'y' => Command::PlayAgain,
            '+' | '=' => Command::Volume(VOLUME_STEP),
            '-' | '_' => Command::Volume(-VOLUME_STEP),
            _ => return None,
        },
        // CapsLock and everything else is ignored
        _ => return None,
    };
    Some(command)
}

// ============================================================================
// Held keys
// ============================================================================

/// Last time each game key was seen pressed or repeating.  Lets terminals
/// without release events still report a key as released: it expires once
/// it has been silent for `HOLD_WINDOW`.
#[derive(Default)]
struct HeldKeys {
    last_seen: HashMap<Key, Instant>,
}

impl HeldKeys {
    fn touch(&mut self, key: Key, now: Instant) {
        self.last_seen.insert(key, now);
    }

    fn forget(&mut self, key: Key) {
        self.last_seen.remove(&key);
    }

    /// Remove and return every key not refreshed within the window.
    fn expire(&mut self, now: Instant) -> Vec<Key> {
        let stale: Vec<Key> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.saturating_duration_since(**seen) > HOLD_WINDOW)
            .map(|(&key, _)| key)
            .collect();
        for key in &stale {
            self.last_seen.remove(key);
        }
        stale
    }
}

/// Only a positive answer to the enhancement query means release events will
/// arrive. Without them held keys have to expire on their own.
fn reports_key_release(probe: std::io::Result<bool>) -> bool {
    match probe {
        Ok(supported) => supported,
        Err(err) => {
            warn!(%err, "keyboard enhancement query failed");
            false
        }
    }
}

/// Synthesise key-up for every key the terminal has gone quiet about.
fn release_stale(session: &mut Session, held: &mut HeldKeys, now: Instant) {
    for key in held.expire(now) {
        session.key_up(key);
    }
}

// ============================================================================
// Game loop
// ============================================================================

/// Returns `true` when the player asked to quit.
fn handle_key(
    session: &mut Session,
    audio: &mut impl AudioSink,
    held: &mut HeldKeys,
    event: KeyEvent,
) -> bool {
    let KeyEvent {
        code, kind, modifiers, ..
    } = event;
    let Some(command) = map_key(code, modifiers, session.phase()) else {
        return false;
    };

    match (command, kind) {
        (Command::Game(key), KeyEventKind::Press) => {
            held.touch(key, Instant::now());
            session.key_down(key);
        }
        (Command::Game(key), KeyEventKind::Repeat) => {
            held.touch(key, Instant::now());
            if let Key::Move(..) = key {
                session.key_down(key);
            }
        }
        (Command::Game(key), KeyEventKind::Release) => {
            held.forget(key);
            session.key_up(key);
        }
        (_, KeyEventKind::Release) => {}
        (Command::Quit, _) => return true,
        (Command::Start, _) => session.start(),
        (Command::Restart, _) => session.restart(),
        (Command::PlayAgain, _) => session.play_again(),
        (Command::Volume(delta), _) => {
            audio.set_volume(audio.volume() + delta);
            info!(volume = audio.volume(), "volume changed");
        }
    }
    false
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    cfg: &DuelConfig,
    keyboard_enhanced: bool,
) -> Result<()> {
    let mut session = Session::new(cfg.tuning, cfg.name_inputs());
    let mut audio = TerminalBell::new(stdout(), cfg.volume);
    let mut scheduler = Realtime::default();
    let mut held = HeldKeys::default();

    loop {
        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            if let Event::Key(key_event) = ev {
                if handle_key(&mut session, &mut audio, &mut held, key_event) {
                    return Ok(());
                }
            }
        }
        if !keyboard_enhanced {
            release_stale(&mut session, &mut held, Instant::now());
        }

        if let Some(winner) = driver::step(&mut session, &mut scheduler) {
            info!(?winner, "round decided");
        }

        audio::play_all(&mut audio, session.take_cues());

        display::render(out, &session, audio.volume()).context("draw frame")?;
    }
}

// ============================================================================
// Entry point
// ============================================================================

fn main() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    let cfg = load_config(&args)?;
    init_tracing(&cfg.log_file)?;
    info!(?cfg, "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("enable raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to HOLD_WINDOW.
    let keyboard_enhanced = reports_key_release(terminal::supports_keyboard_enhancement());
    if keyboard_enhanced {
        out.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }
    info!(keyboard_enhanced, "terminal ready");

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(err) => {
                warn!(%err, "terminal event read failed");
                break;
            }
        }
    });

    let result = run(&mut out, &rx, &cfg, keyboard_enhanced);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "exiting with error");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_starts_then_fires() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key(KeyCode::Enter, none, Phase::Idle), Some(Command::Start));
        assert_eq!(
            map_key(KeyCode::Enter, none, Phase::Running),
            Some(Command::Game(Key::Fire(PlayerId::Player2)))
        );
    }

    #[test]
    fn letters_ignore_case() {
        let none = KeyModifiers::NONE;
        assert_eq!(
            map_key(KeyCode::Char('W'), none, Phase::Running),
            map_key(KeyCode::Char('w'), none, Phase::Running)
        );
        assert_eq!(
            map_key(KeyCode::Char('M'), KeyModifiers::SHIFT, Phase::Running),
            Some(Command::Game(Key::Shield(PlayerId::Player2)))
        );
    }

    #[test]
    fn caps_lock_and_unknown_keys_do_nothing() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key(KeyCode::CapsLock, none, Phase::Running), None);
        assert_eq!(map_key(KeyCode::Char('z'), none, Phase::Running), None);
    }

    #[test]
    fn silent_keys_expire() {
        let mut held = HeldKeys::default();
        let t0 = Instant::now();
        let key = Key::Move(PlayerId::Player1, Direction::Left);
        held.touch(key, t0);
        assert!(held.expire(t0 + Duration::from_millis(50)).is_empty());
        assert_eq!(held.expire(t0 + Duration::from_millis(500)), vec![key]);
        assert!(held.expire(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn release_events_need_a_positive_answer() {
        assert!(reports_key_release(Ok(true)));
        assert!(!reports_key_release(Ok(false)));
        let err = std::io::Error::new(std::io::ErrorKind::Other, "not a tty");
        assert!(!reports_key_release(Err(err)));
    }

    #[test]
    fn quiet_fire_key_rearms_and_quiet_move_key_stops() {
        let mut session = Session::new(Default::default(), Default::default());
        session.start();
        let mut scheduler = driver::FixedStep(Duration::from_millis(16));
        while session.phase() != Phase::Running {
            driver::step(&mut session, &mut scheduler);
        }

        let mut held = HeldKeys::default();
        let t0 = Instant::now();
        let fire = Key::Fire(PlayerId::Player1);
        let walk = Key::Move(PlayerId::Player1, Direction::Up);
        for key in [fire, walk] {
            held.touch(key, t0);
            session.key_down(key);
        }
        assert!(!session.arena().player1.can_shoot);
        assert!(session.input().is_held(PlayerId::Player1, Direction::Up));

        release_stale(&mut session, &mut held, t0 + Duration::from_millis(50));
        assert!(!session.arena().player1.can_shoot);

        release_stale(&mut session, &mut held, t0 + Duration::from_millis(400));
        assert!(session.arena().player1.can_shoot);
        assert!(!session.input().is_held(PlayerId::Player1, Direction::Up));
    }
}
