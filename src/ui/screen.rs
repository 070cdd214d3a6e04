use ratatui::Frame;

use crate::{quiz::Phase, App};

/// A UI screen boundary: one renderer per quiz phase
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Start screen - title, recorded runs, key hints
pub struct StartScreen;

impl Screen for StartScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Question screen - prompt, answer box, feedback, elapsed time
pub struct QuestionScreen;

impl Screen for QuestionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Finished screen - final time and restart hint
pub struct FinishedScreen;

impl Screen for FinishedScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::NotStarted => Box::new(StartScreen),
        Phase::InProgress => Box::new(QuestionScreen),
        Phase::Finished => Box::new(FinishedScreen),
    }
}
