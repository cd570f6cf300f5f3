use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Duration,
};

use kwiz::{
    app::{App, AppSettings, Control},
    app_dirs::AppDirs,
    bank::ExerciseBank,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    exercise::ExerciseKind,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    speech,
};

const TICK_RATE_MS: u64 = 100;

/// keyboard-driven exercise quizzes in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice spelling, grammar and vocabulary with sorting, gap-fill, highlighting, sequencing and table exercises, scored and timed per question."
)]
pub struct Cli {
    /// exercise to open directly, skipping the menu
    #[clap(short = 'e', long, value_enum)]
    exercise: Option<ExerciseKind>,

    /// directory of <kind>.json banks that replace the built-in ones
    #[clap(long)]
    bank_dir: Option<PathBuf>,

    /// how long a correct answer stays on screen before the next question
    #[clap(long)]
    feedback_delay_ms: Option<u64>,

    /// text-to-speech command the question audio is passed to, e.g. "espeak -s 120"
    #[clap(long)]
    speech_command: Option<String>,

    /// where to write the log (the terminal is taken by the UI)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the available question banks and exit
    #[clap(long)]
    list: bool,
}

impl Cli {
    /// Flags given on the command line win over the stored config.
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(kind) = self.exercise {
            config.exercise = Some(kind);
        }
        if let Some(dir) = &self.bank_dir {
            config.bank_dir = Some(dir.clone());
        }
        if let Some(ms) = self.feedback_delay_ms {
            config.feedback_delay_ms = ms;
        }
        if let Some(cmd) = &self.speech_command {
            config.speech_command = Some(cmd.clone());
        }
        config
    }
}

fn settings_from(config: &Config) -> AppSettings {
    AppSettings {
        bank_dir: config.bank_dir.clone(),
        feedback_delay: Duration::from_millis(config.feedback_delay_ms),
    }
}

fn print_banks(bank_dir: Option<&Path>) -> Result<(), Box<dyn Error>> {
    for kind in ExerciseKind::ALL {
        let bank = ExerciseBank::load(kind, bank_dir)?;
        println!(
            "{:<16} {:<20} {:>3} questions  ({})",
            kind.to_string(),
            kind.title(),
            bank.len(),
            bank.name
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        let level = logging::level_from(std::env::var(logging::LOG_ENV).ok().as_deref());
        if let Err(e) = logging::init(&path, level) {
            eprintln!("logging disabled, could not open {}: {e}", path.display());
        }
    }

    let store = FileConfigStore::new();
    let mut config = cli.apply_to(store.load());

    if cli.list {
        return print_banks(config.bank_dir.as_deref());
    }

    // Everything that can fail on bad input happens before raw mode.
    let initial_bank = match cli.exercise {
        Some(kind) => Some(ExerciseBank::load(kind, config.bank_dir.as_deref())?),
        None => None,
    };
    let speaker = speech::speaker_for(config.speech_command.as_deref())?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::with_speaker(SystemClock::new(), settings_from(&config), speaker);
    if let Some(i) = config
        .exercise
        .and_then(|kind| ExerciseKind::ALL.iter().position(|k| *k == kind))
    {
        app.menu_index = i;
    }
    if let Some(bank) = initial_bank {
        app.start(bank);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(kind) = app.last_exercise() {
        config.exercise = Some(kind);
        if let Err(e) = store.save(&config) {
            log::warn!("could not save config to {}: {e}", store.path().display());
        }
    }

    outcome
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<SystemClock>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let redraw = match runner.step() {
            QuizEvent::Tick => app.on_tick(),
            QuizEvent::Resize => true,
            QuizEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
                true
            }
        };
        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["kwiz"]).unwrap();
        assert!(cli.exercise.is_none());
        assert!(cli.bank_dir.is_none());
        assert!(!cli.list);
    }

    #[test]
    fn test_cli_exercise_kind() {
        let cli = Cli::try_parse_from(["kwiz", "-e", "gap_fill"]).unwrap();
        assert_eq!(cli.exercise, Some(ExerciseKind::GapFill));
        assert!(Cli::try_parse_from(["kwiz", "-e", "crossword"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "kwiz",
            "--feedback-delay-ms",
            "500",
            "--speech-command",
            "espeak",
        ])
        .unwrap();
        let stored = Config {
            exercise: Some(ExerciseKind::Sequencing),
            bank_dir: Some(PathBuf::from("/banks")),
            feedback_delay_ms: 3000,
            speech_command: None,
        };
        let merged = cli.apply_to(stored);
        assert_eq!(merged.exercise, Some(ExerciseKind::Sequencing));
        assert_eq!(merged.bank_dir, Some(PathBuf::from("/banks")));
        assert_eq!(merged.feedback_delay_ms, 500);
        assert_eq!(merged.speech_command.as_deref(), Some("espeak"));

        let settings = settings_from(&merged);
        assert_eq!(settings.feedback_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_print_banks_builtin() {
        assert!(print_banks(None).is_ok());
    }
}
