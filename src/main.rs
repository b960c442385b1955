//! Term Rex entry point
//!
//! Prepares the terminal, wires the collaborators together and runs the game.

use std::fs::File;
use std::io::{self, stdout};
use std::process::ExitCode;

use crossterm::{cursor, execute, terminal};

use term_rex::audio::Audio;
use term_rex::config::{JumpTuning, LOG_FILE, SETTINGS_FILE, home_file};
use term_rex::highscore::{FileHighScoreStore, HighScoreStore};
use term_rex::input::InputListener;
use term_rex::render::Screen;
use term_rex::settings::Settings;
use term_rex::stage::StageTable;
use term_rex::{AppError, Game, Session};

// ── Logging ─────────────────────────────────────────────────────────────────

/// Log to a file: the terminal belongs to the game while it runs.
fn init_logging() {
    let path = std::env::temp_dir().join(LOG_FILE);
    let Ok(file) = File::create(&path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    if std::env::args()
        .skip(1)
        .any(|arg| matches!(arg.as_str(), "--version" | "-V" | "-v"))
    {
        println!("term-rex {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_logging();
    log::info!("term-rex {} starting", env!("CARGO_PKG_VERSION"));

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("term-rex: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    // Configuration defects are fatal before the terminal is touched
    let table = StageTable::builtin()?;
    let tuning = JumpTuning::default();
    tuning.validate()?;

    let settings_path = home_file(SETTINGS_FILE);
    let settings = settings_path
        .as_deref()
        .map(Settings::load_from)
        .unwrap_or_default();
    let scores = FileHighScoreStore::in_home();
    let high_score = scores.load();
    let audio = Audio::open(settings.volume, settings.muted);

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    if let Err(err) = execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    ) {
        let _ = terminal::disable_raw_mode();
        return Err(err.into());
    }

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let played = play(table, tuning, high_score, audio, scores);
    if let Err(err) = cleanup(&mut out) {
        log::error!("failed to restore the terminal: {err}");
    }
    let muted = settle(played, settings.muted);

    if let Some(path) = settings_path {
        let settings = Settings { muted, ..settings };
        if let Err(err) = settings.save_to(&path) {
            log::warn!("failed to save settings to {}: {err}", path.display());
        }
    }
    Ok(())
}

/// Once the terminal is up, an I/O failure ends the game but not the process
/// status. Falls back to `muted` when the final mute state is lost.
fn settle(played: io::Result<bool>, muted: bool) -> bool {
    played.unwrap_or_else(|err| {
        log::error!("game stopped: {err}");
        muted
    })
}

/// Run the game on the already prepared terminal. Returns the final mute state.
fn play(
    table: StageTable,
    tuning: JumpTuning,
    high_score: u64,
    audio: Audio,
    scores: FileHighScoreStore,
) -> io::Result<bool> {
    let (cols, rows) = terminal::size()?;
    let session = Session::new(table, tuning, cols, rand::random(), high_score);
    let screen = Screen::new(stdout(), cols, rows);
    let input = InputListener::spawn();

    let mut game = Game::new(session, screen, input, Box::new(audio), Box::new(scores));
    game.run()?;
    Ok(game.is_muted())
}
