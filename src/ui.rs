pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    quiz::{Feedback, Phase},
    stopwatch::format_elapsed,
    App,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.quiz.phase() {
            Phase::NotStarted => render_start_screen(self, area, buf),
            Phase::InProgress => render_question_screen(self, area, buf),
            Phase::Finished => render_finished_screen(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn render_start_screen(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // title
            Constraint::Length(1), // tagline
            Constraint::Length(1),
            Constraint::Length(2), // recorded runs
            Constraint::Length(1),
            Constraint::Length(1), // key hints
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "mathdash",
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    let tagline = Paragraph::new(Span::styled(
        format!(
            "{} questions against the clock",
            app.quiz.question_count()
        ),
        dim_bold(),
    ))
    .alignment(Alignment::Center);
    tagline.render(chunks[2], buf);

    let mut run_lines: Vec<Line> = Vec::new();
    match &app.last_run {
        Some(last) => {
            run_lines.push(Line::from(Span::styled(
                format!(
                    "last run: {} ({})",
                    format_elapsed(std::time::Duration::from_secs_f64(last.elapsed_secs.max(0.0))),
                    last.finished_ago()
                ),
                italic().fg(Color::Gray),
            )));
            if let Some(best) = &app.best_run {
                run_lines.push(Line::from(Span::styled(
                    format!(
                        "best run: {}",
                        format_elapsed(std::time::Duration::from_secs_f64(best.elapsed_secs.max(0.0)))
                    ),
                    italic().fg(Color::Gray),
                )));
            }
        }
        None => {
            run_lines.push(Line::from(Span::styled(
                "no runs recorded yet",
                italic().fg(Color::Gray),
            )));
        }
    }
    let runs = Paragraph::new(run_lines).alignment(Alignment::Center);
    runs.render(chunks[4], buf);

    let hints = Paragraph::new(Span::styled("(enter) start  (esc) quit", italic()))
        .alignment(Alignment::Center);
    hints.render(chunks[6], buf);
}

fn render_question_screen(app: &App, area: Rect, buf: &mut Buffer) {
    let quiz = &app.quiz;
    let prompt = quiz
        .current_question()
        .map(|q| q.prompt.as_str())
        .unwrap_or_default();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let mut prompt_occupied_lines =
        ((prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if prompt.width() <= max_chars_per_line as usize {
        prompt_occupied_lines = 1;
    }

    let used = prompt_occupied_lines + 6;
    let pad = (area.height.saturating_sub(used)) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(1), // progress
            Constraint::Length(1),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1),
            Constraint::Length(1), // answer box
            Constraint::Length(1), // feedback
            Constraint::Length(1), // elapsed
            Constraint::Min(0),
        ])
        .split(area);

    let progress = Paragraph::new(Span::styled(quiz.progress_label(), dim_bold()))
        .alignment(Alignment::Center);
    progress.render(chunks[1], buf);

    let question = Paragraph::new(Span::styled(prompt.to_string(), bold()))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    question.render(chunks[3], buf);

    let answer = Paragraph::new(Line::from(vec![
        Span::styled("❯ ", dim_bold()),
        Span::styled(quiz.input().to_string(), bold()),
        Span::styled(
            " ",
            dim_bold().add_modifier(Modifier::UNDERLINED),
        ),
    ]))
    .alignment(Alignment::Center);
    answer.render(chunks[5], buf);

    if let Some(feedback) = quiz.feedback() {
        let style = match feedback {
            Feedback::Wrong => bold().fg(Color::Red),
            // Revealed answers read as a hint, not an error
            Feedback::Reveal { .. } => italic().fg(Color::Gray),
        };
        let line = Paragraph::new(Span::styled(feedback.to_string(), style))
            .alignment(Alignment::Center);
        line.render(chunks[6], buf);
    }

    let elapsed = Paragraph::new(Span::styled(format_elapsed(quiz.elapsed()), dim_bold()))
        .alignment(Alignment::Center);
    elapsed.render(chunks[7], buf);
}

fn render_finished_screen(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // headline
            Constraint::Length(1),
            Constraint::Length(1), // final time
            Constraint::Length(1),
            Constraint::Length(1), // key hints
            Constraint::Min(1),
        ])
        .split(area);

    let headline = Paragraph::new(Span::styled(
        "Finished!",
        bold().fg(Color::Green),
    ))
    .alignment(Alignment::Center);
    headline.render(chunks[1], buf);

    let final_time = Paragraph::new(Span::styled(
        format!("Final time: {}", format_elapsed(app.quiz.elapsed())),
        bold(),
    ))
    .alignment(Alignment::Center);
    final_time.render(chunks[3], buf);

    let hints = Paragraph::new(Span::styled("(r)estart  (esc) quit", italic()))
        .alignment(Alignment::Center);
    hints.render(chunks[5], buf);
}
