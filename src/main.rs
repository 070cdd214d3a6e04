pub mod app_dirs;
pub mod bank;
pub mod codes;
pub mod config;
pub mod history;
pub mod quiz;
pub mod runtime;
pub mod stopwatch;
pub mod ui;

use crate::{
    bank::QuestionBank,
    codes::{BrowserNavigator, CodeRegistry, Navigate},
    config::{Config, ConfigStore, FileConfigStore},
    history::{HistoryLog, RunRecord},
    quiz::{Phase, Quiz, Submission},
    runtime::{EventSource, FixedTicker, QuizEvent, Runner, TerminalEventSource, Ticker},
    ui::screen::current_screen,
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// timed math quiz tui with a live stopwatch
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed math quiz for the terminal: a fixed ladder of arithmetic and calculus questions answered as free text, graded with a small numeric tolerance, against a millisecond stopwatch."
)]
pub struct Cli {
    /// path to a custom question bank (json with prompt/answer pairs)
    #[clap(short = 'q', long)]
    questions: Option<PathBuf>,

    /// how long a revealed answer stays on screen before the skip advances
    #[clap(long)]
    reveal_delay_ms: Option<u64>,

    /// stopwatch refresh interval
    #[clap(long)]
    tick_rate_ms: Option<u64>,
}

impl Cli {
    /// Stored settings with this invocation's overrides applied
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(ms) = self.tick_rate_ms {
            config.tick_rate_ms = ms;
        }
        if let Some(ms) = self.reveal_delay_ms {
            config.reveal_delay_ms = ms;
        }
        config
    }
}

/// Whether the event loop keeps going after a key
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub quiz: Quiz,
    pub history: HistoryLog,
    pub last_run: Option<RunRecord>,
    pub best_run: Option<RunRecord>,
}

impl App {
    pub fn new(quiz: Quiz, history: HistoryLog) -> Self {
        let last_run = history.last_run();
        let best_run = history.best_run();
        Self {
            quiz,
            history,
            last_run,
            best_run,
        }
    }

    /// Log a completed run and refresh the start-screen summaries
    fn record_finish(&mut self, elapsed: Duration) {
        let record = RunRecord {
            finished_at: Local::now(),
            questions: self.quiz.question_count(),
            wrong_attempts: self.quiz.wrong_attempts,
            skips: self.quiz.skips,
            elapsed_secs: elapsed.as_secs_f64(),
        };
        // History is best-effort; a failed append never interrupts the quiz
        let _ = self.history.append(&record);
        self.last_run = self.history.last_run();
        self.best_run = self.history.best_run();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    let _ = store.save(&config);

    let bank = match &cli.questions {
        Some(path) => QuestionBank::from_json_file(path)?,
        None => QuestionBank::standard(),
    };

    let quiz = Quiz::new(
        bank,
        CodeRegistry::standard(),
        Duration::from_millis(config.reveal_delay_ms),
    );
    let mut app = App::new(quiz, HistoryLog::new());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        TerminalEventSource::new(),
        FixedTicker::new(Duration::from_millis(config.tick_rate_ms)),
    );
    let mut navigator = BrowserNavigator;
    start_tui(&mut terminal, &mut app, &runner, &mut navigator)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    navigator: &mut dyn Navigate,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| draw(app, f))?;

    loop {
        match runner.step() {
            QuizEvent::Tick => {
                let fired = app.quiz.on_tick(runner.tick_interval());
                if let Some(Submission::Finished(elapsed)) = &fired {
                    app.record_finish(*elapsed);
                }
                // Redraw while the clock is visibly moving, and once more
                // when a skip countdown changed the screen
                if fired.is_some() || app.quiz.phase() == Phase::InProgress {
                    terminal.draw(|f| draw(app, f))?;
                }
            }
            QuizEvent::Resize => {
                terminal.draw(|f| draw(app, f))?;
            }
            QuizEvent::Key(key) => {
                if handle_key(key, app, navigator) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| draw(app, f))?;
            }
        }
    }

    Ok(())
}

fn handle_key(key: KeyEvent, app: &mut App, navigator: &mut dyn Navigate) -> Flow {
    if key.code == KeyCode::Esc {
        return Flow::Quit;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    match app.quiz.phase() {
        Phase::NotStarted => {
            if key.code == KeyCode::Enter {
                app.quiz.start();
            }
        }
        Phase::InProgress => match key.code {
            KeyCode::Enter => match app.quiz.submit() {
                Submission::Redirect(entry) => {
                    // Terminal action: hand over to the browser and leave
                    let _ = navigator.navigate_to(&entry.destination);
                    return Flow::Quit;
                }
                Submission::Finished(elapsed) => app.record_finish(elapsed),
                Submission::Advanced | Submission::Wrong | Submission::Ignored => {}
            },
            KeyCode::Backspace => app.quiz.backspace(),
            KeyCode::Tab => app.quiz.skip(),
            KeyCode::Char(c) => app.quiz.write(c),
            _ => {}
        },
        Phase::Finished => {
            if key.code == KeyCode::Char('r') {
                app.quiz.restart();
            }
        }
    }

    Flow::Continue
}

fn draw(app: &mut App, f: &mut Frame) {
    current_screen(app.quiz.phase()).render(app, f);
}
