use std::time::Duration;

use crate::bank::{Question, QuestionBank};
use crate::codes::{CodeEntry, CodeRegistry};
use crate::stopwatch::Stopwatch;

/// Maximum absolute difference between a submitted and an expected answer
/// for the submission to count as correct
pub const ANSWER_TOLERANCE: f64 = 1e-6;

/// How long a revealed answer stays on screen before a skip advances
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(800);

/// Coarse lifecycle stage of a quiz run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished,
}

/// Feedback line shown under the answer box
#[derive(Clone, Copy, Debug, PartialEq, strum_macros::Display)]
pub enum Feedback {
    #[strum(to_string = "Wrong, try again")]
    Wrong,
    #[strum(to_string = "Answer: {answer}")]
    Reveal { answer: f64 },
}

/// Result of grading the answer box. The redirect side effect is performed
/// by the caller; once it happens the engine state is no longer meaningful.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    Redirect(CodeEntry),
    Advanced,
    Finished(Duration),
    Wrong,
    /// Submission has no meaning in the current phase
    Ignored,
}

/// Skip-advance scheduled for a specific question. It only fires if the run
/// is still on that question when the countdown ends.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingAdvance {
    index: usize,
    remaining: Duration,
}

/// The quiz state machine.
///
/// Owns every piece of per-run state: the phase, the current question index,
/// the transient answer buffer and feedback, the stopwatch, and the skip
/// countdown. All mutation goes through the operations below; while the run
/// is `InProgress` the current index is always a valid bank position, and it
/// equals the bank length exactly when the run is `Finished`.
#[derive(Debug)]
pub struct Quiz {
    bank: QuestionBank,
    codes: CodeRegistry,
    phase: Phase,
    current: usize,
    input: String,
    feedback: Option<Feedback>,
    stopwatch: Stopwatch,
    pending_advance: Option<PendingAdvance>,
    reveal_delay: Duration,
    pub wrong_attempts: u32,
    pub skips: u32,
}

impl Quiz {
    pub fn new(bank: QuestionBank, codes: CodeRegistry, reveal_delay: Duration) -> Self {
        Self {
            bank,
            codes,
            phase: Phase::NotStarted,
            current: 0,
            input: String::new(),
            feedback: None,
            stopwatch: Stopwatch::new(),
            pending_advance: None,
            reveal_delay,
            wrong_attempts: 0,
            skips: 0,
        }
    }

    /// Begin the run and the stopwatch. No-op once started.
    pub fn start(&mut self) {
        if self.phase != Phase::NotStarted {
            return;
        }
        if self.bank.is_empty() {
            // Nothing to ask; a zero-length run is over the moment it begins
            self.phase = Phase::Finished;
            return;
        }
        self.phase = Phase::InProgress;
        self.stopwatch.start();
    }

    /// Append a character to the answer buffer
    pub fn write(&mut self, c: char) {
        if self.phase == Phase::InProgress {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.phase == Phase::InProgress {
            self.input.pop();
        }
    }

    /// Grade the answer buffer.
    ///
    /// Codes are honored in every phase. Otherwise, only an `InProgress` run
    /// grades input: empty, non-numeric, and out-of-tolerance answers all
    /// surface as `Wrong` with no state change; a correct answer advances or
    /// finishes the run.
    pub fn submit(&mut self) -> Submission {
        if let Some(entry) = self.codes.lookup(&self.input) {
            return Submission::Redirect(entry.clone());
        }

        if self.phase != Phase::InProgress {
            return Submission::Ignored;
        }

        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return self.reject();
        }

        // Total parse; malformed input is just a wrong answer
        let parsed = match trimmed.parse::<f64>() {
            Ok(value) => value,
            Err(_) => return self.reject(),
        };

        let expected = self
            .bank
            .get(self.current)
            .expect("current index is valid while a run is in progress")
            .answer;

        if (parsed - expected).abs() <= ANSWER_TOLERANCE {
            self.advance_or_finish()
        } else {
            self.reject()
        }
    }

    /// Reveal the expected answer, then advance after the reveal delay.
    /// The advance is keyed to the current question; skipping again while
    /// one reveal is pending does nothing.
    pub fn skip(&mut self) {
        if self.phase != Phase::InProgress || self.pending_advance.is_some() {
            return;
        }
        let answer = self
            .bank
            .get(self.current)
            .expect("current index is valid while a run is in progress")
            .answer;
        self.skips += 1;
        self.feedback = Some(Feedback::Reveal { answer });
        self.pending_advance = Some(PendingAdvance {
            index: self.current,
            remaining: self.reveal_delay,
        });
    }

    /// Count down a pending skip-advance. When it comes due it fires only if
    /// the run is still on the question it was scheduled for; a stale
    /// countdown (the run moved on or ended) is discarded.
    pub fn on_tick(&mut self, dt: Duration) -> Option<Submission> {
        let due = match self.pending_advance.as_mut() {
            Some(pending) => {
                pending.remaining = pending.remaining.saturating_sub(dt);
                pending.remaining.is_zero()
            }
            None => false,
        };
        if !due {
            return None;
        }

        let pending = self.pending_advance.take()?;
        if self.phase == Phase::InProgress && self.current == pending.index {
            Some(self.advance_or_finish())
        } else {
            None
        }
    }

    /// Return to the start screen. Valid only after a finished run; timing
    /// does not resume until `start` is called again.
    pub fn restart(&mut self) {
        if self.phase != Phase::Finished {
            return;
        }
        self.phase = Phase::NotStarted;
        self.current = 0;
        self.input.clear();
        self.feedback = None;
        self.pending_advance = None;
        self.stopwatch.reset();
        self.wrong_attempts = 0;
        self.skips = 0;
    }

    fn reject(&mut self) -> Submission {
        self.wrong_attempts += 1;
        self.feedback = Some(Feedback::Wrong);
        Submission::Wrong
    }

    fn advance_or_finish(&mut self) -> Submission {
        self.input.clear();
        self.feedback = None;
        self.pending_advance = None;

        let next = self.current + 1;
        if next >= self.bank.len() {
            self.stopwatch.stop();
            self.current = self.bank.len();
            self.phase = Phase::Finished;
            Submission::Finished(self.stopwatch.elapsed_now())
        } else {
            self.current = next;
            Submission::Advanced
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::InProgress => self.bank.get(self.current),
            _ => None,
        }
    }

    pub fn question_count(&self) -> usize {
        self.bank.len()
    }

    pub fn progress_label(&self) -> String {
        format!(
            "Question {} / {}",
            (self.current + 1).min(self.bank.len()),
            self.bank.len()
        )
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn reveal_pending(&self) -> bool {
        self.pending_advance.is_some()
    }

    /// Elapsed run time: live while in progress, frozen once finished
    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed_now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::thread;

    fn tiny_bank() -> QuestionBank {
        QuestionBank::new(
            "tiny",
            vec![
                Question {
                    prompt: "1+1".to_string(),
                    answer: 2.0,
                },
                Question {
                    prompt: "2+2".to_string(),
                    answer: 4.0,
                },
            ],
        )
    }

    fn tiny_quiz() -> Quiz {
        Quiz::new(tiny_bank(), CodeRegistry::standard(), DEFAULT_REVEAL_DELAY)
    }

    fn started_quiz() -> Quiz {
        let mut quiz = tiny_quiz();
        quiz.start();
        quiz
    }

    fn type_str(quiz: &mut Quiz, s: &str) {
        for c in s.chars() {
            quiz.write(c);
        }
    }

    #[test]
    fn test_new_quiz_state() {
        let quiz = tiny_quiz();

        assert_eq!(quiz.phase(), Phase::NotStarted);
        assert_eq!(quiz.current_index(), 0);
        assert!(!quiz.has_started());
        assert!(!quiz.has_finished());
        assert_eq!(quiz.elapsed(), Duration::ZERO);
        assert_eq!(quiz.input(), "");
        assert_eq!(quiz.feedback(), None);
    }

    #[test]
    fn test_start_transitions_to_first_question() {
        let quiz = started_quiz();

        assert_eq!(quiz.phase(), Phase::InProgress);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.current_question().unwrap().prompt, "1+1");
        assert_eq!(quiz.progress_label(), "Question 1 / 2");
    }

    #[test]
    fn test_start_twice_keeps_baseline() {
        let mut quiz = started_quiz();
        thread::sleep(Duration::from_millis(10));
        quiz.start();

        assert_eq!(quiz.phase(), Phase::InProgress);
        assert!(quiz.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_start_on_empty_bank_finishes_immediately() {
        let mut quiz = Quiz::new(
            QuestionBank::new("empty", vec![]),
            CodeRegistry::standard(),
            DEFAULT_REVEAL_DELAY,
        );
        quiz.start();

        assert_eq!(quiz.phase(), Phase::Finished);
        assert_eq!(quiz.current_index(), 0);
    }

    #[test]
    fn test_write_and_backspace_edit_the_buffer() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "42");
        quiz.backspace();
        quiz.write('0');

        assert_eq!(quiz.input(), "40");
    }

    #[test]
    fn test_write_ignored_before_start() {
        let mut quiz = tiny_quiz();
        quiz.write('2');

        assert_eq!(quiz.input(), "");
    }

    #[test]
    fn test_correct_answer_advances() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");

        assert_matches!(quiz.submit(), Submission::Advanced);
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.input(), "");
        assert_eq!(quiz.feedback(), None);
        assert_eq!(quiz.progress_label(), "Question 2 / 2");
    }

    #[test]
    fn test_every_question_advances_on_exact_answer() {
        let bank = QuestionBank::standard();
        let mut quiz = Quiz::new(
            bank.clone(),
            CodeRegistry::standard(),
            DEFAULT_REVEAL_DELAY,
        );
        quiz.start();

        for i in 0..bank.len() {
            assert_eq!(quiz.current_index(), i);
            type_str(&mut quiz, &bank.get(i).unwrap().answer.to_string());
            let outcome = quiz.submit();
            if i + 1 == bank.len() {
                assert_matches!(outcome, Submission::Finished(_));
            } else {
                assert_matches!(outcome, Submission::Advanced);
            }
        }

        assert_eq!(quiz.phase(), Phase::Finished);
        assert_eq!(quiz.current_index(), bank.len());
    }

    #[test]
    fn test_last_answer_finishes_and_freezes_elapsed() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");
        quiz.submit();

        thread::sleep(Duration::from_millis(10));
        type_str(&mut quiz, "4");
        let outcome = quiz.submit();

        let final_elapsed = match outcome {
            Submission::Finished(elapsed) => elapsed,
            other => panic!("expected Finished, got {:?}", other),
        };
        assert!(final_elapsed >= Duration::from_millis(10));
        assert_eq!(quiz.phase(), Phase::Finished);
        assert_eq!(quiz.current_index(), 2);

        // Frozen: re-reading later yields the same value
        thread::sleep(Duration::from_millis(10));
        assert_eq!(quiz.elapsed(), final_elapsed);
    }

    #[test]
    fn test_answer_within_tolerance_accepted() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2.0000005");

        assert_matches!(quiz.submit(), Submission::Advanced);
    }

    #[test]
    fn test_answer_outside_tolerance_rejected() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2.00001");

        assert_matches!(quiz.submit(), Submission::Wrong);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.feedback(), Some(Feedback::Wrong));
    }

    #[test]
    fn test_empty_input_is_wrong() {
        let mut quiz = started_quiz();

        assert_matches!(quiz.submit(), Submission::Wrong);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.wrong_attempts, 1);
    }

    #[test]
    fn test_whitespace_only_input_is_wrong() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "   ");

        assert_matches!(quiz.submit(), Submission::Wrong);
        assert_eq!(quiz.current_index(), 0);
    }

    #[test]
    fn test_non_numeric_input_is_wrong() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "two");

        assert_matches!(quiz.submit(), Submission::Wrong);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.feedback(), Some(Feedback::Wrong));
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "  2  ");

        assert_matches!(quiz.submit(), Submission::Advanced);
    }

    #[test]
    fn test_unlimited_attempts() {
        let mut quiz = started_quiz();

        for _ in 0..5 {
            type_str(&mut quiz, "999");
            assert_matches!(quiz.submit(), Submission::Wrong);
            quiz.backspace();
            quiz.backspace();
            quiz.backspace();
        }
        assert_eq!(quiz.wrong_attempts, 5);

        type_str(&mut quiz, "2");
        assert_matches!(quiz.submit(), Submission::Advanced);
    }

    #[test]
    fn test_code_trigger_redirects() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "DOOM3-D3WASM");

        let outcome = quiz.submit();
        let entry = match outcome {
            Submission::Redirect(entry) => entry,
            other => panic!("expected Redirect, got {:?}", other),
        };
        assert_eq!(entry.label, "DOOM 3");
        // Grading never happened
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.feedback(), None);
    }

    #[test]
    fn test_code_trigger_tolerates_padding() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "  MOTHER3-M3WASM ");

        assert_matches!(quiz.submit(), Submission::Redirect(_));
    }

    #[test]
    fn test_code_trigger_works_in_any_phase() {
        // Before start
        let mut quiz = tiny_quiz();
        quiz.input.push_str("DOOM3-D3WASM");
        assert_matches!(quiz.submit(), Submission::Redirect(_));

        // After finishing
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");
        quiz.submit();
        type_str(&mut quiz, "4");
        quiz.submit();
        assert!(quiz.has_finished());
        quiz.input.push_str("MOTHER3-M3WASM");
        assert_matches!(quiz.submit(), Submission::Redirect(_));
    }

    #[test]
    fn test_submit_outside_in_progress_is_ignored() {
        let mut quiz = tiny_quiz();
        assert_matches!(quiz.submit(), Submission::Ignored);

        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");
        quiz.submit();
        type_str(&mut quiz, "4");
        quiz.submit();
        assert_matches!(quiz.submit(), Submission::Ignored);
    }

    #[test]
    fn test_skip_reveals_and_schedules_advance() {
        let mut quiz = started_quiz();
        quiz.skip();

        assert_eq!(quiz.feedback(), Some(Feedback::Reveal { answer: 2.0 }));
        assert!(quiz.reveal_pending());
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.skips, 1);
    }

    #[test]
    fn test_skip_advances_only_after_delay() {
        let mut quiz = started_quiz();
        quiz.skip();

        assert_eq!(quiz.on_tick(Duration::from_millis(400)), None);
        assert_eq!(quiz.current_index(), 0);

        let outcome = quiz.on_tick(Duration::from_millis(400));
        assert_eq!(outcome, Some(Submission::Advanced));
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.feedback(), None);
        assert!(!quiz.reveal_pending());
    }

    #[test]
    fn test_skip_on_last_question_finishes() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");
        quiz.submit();

        quiz.skip();
        let outcome = quiz.on_tick(DEFAULT_REVEAL_DELAY);

        assert_matches!(outcome, Some(Submission::Finished(_)));
        assert_eq!(quiz.phase(), Phase::Finished);
    }

    #[test]
    fn test_second_skip_while_pending_is_noop() {
        let mut quiz = started_quiz();
        quiz.skip();
        quiz.skip();

        assert_eq!(quiz.skips, 1);
        quiz.on_tick(DEFAULT_REVEAL_DELAY);
        // Only one advance happened
        assert_eq!(quiz.current_index(), 1);
    }

    #[test]
    fn test_stale_skip_advance_is_discarded() {
        let mut quiz = started_quiz();
        quiz.skip();

        // Answering correctly during the reveal moves the run along
        type_str(&mut quiz, "2");
        assert_matches!(quiz.submit(), Submission::Advanced);
        assert_eq!(quiz.current_index(), 1);

        // The countdown was cancelled by the advance; nothing fires later
        assert_eq!(quiz.on_tick(DEFAULT_REVEAL_DELAY), None);
        assert_eq!(quiz.current_index(), 1);
    }

    #[test]
    fn test_tick_without_pending_advance_is_noop() {
        let mut quiz = started_quiz();

        assert_eq!(quiz.on_tick(Duration::from_millis(50)), None);
        assert_eq!(quiz.current_index(), 0);
    }

    #[test]
    fn test_restart_returns_to_start_screen() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "wrong");
        quiz.submit();
        quiz.input.clear();
        type_str(&mut quiz, "2");
        quiz.submit();
        type_str(&mut quiz, "4");
        quiz.submit();
        assert!(quiz.has_finished());

        quiz.restart();

        assert_eq!(quiz.phase(), Phase::NotStarted);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.input(), "");
        assert_eq!(quiz.feedback(), None);
        assert_eq!(quiz.elapsed(), Duration::ZERO);
        assert_eq!(quiz.wrong_attempts, 0);
        assert_eq!(quiz.skips, 0);
    }

    #[test]
    fn test_restart_then_start_times_fresh() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");
        quiz.submit();
        thread::sleep(Duration::from_millis(10));
        type_str(&mut quiz, "4");
        quiz.submit();

        quiz.restart();
        quiz.start();

        assert_eq!(quiz.phase(), Phase::InProgress);
        assert_eq!(quiz.current_index(), 0);
        assert!(quiz.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn test_restart_mid_run_is_noop() {
        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");
        quiz.submit();

        quiz.restart();

        assert_eq!(quiz.phase(), Phase::InProgress);
        assert_eq!(quiz.current_index(), 1);
    }

    #[test]
    fn test_feedback_messages() {
        assert_eq!(Feedback::Wrong.to_string(), "Wrong, try again");
        assert_eq!(
            Feedback::Reveal { answer: 7.0 }.to_string(),
            "Answer: 7"
        );
        assert_eq!(
            Feedback::Reveal { answer: 1.5 }.to_string(),
            "Answer: 1.5"
        );
    }

    #[test]
    fn test_current_question_outside_run() {
        let quiz = tiny_quiz();
        assert!(quiz.current_question().is_none());

        let mut quiz = started_quiz();
        type_str(&mut quiz, "2");
        quiz.submit();
        type_str(&mut quiz, "4");
        quiz.submit();
        assert!(quiz.current_question().is_none());
    }
}
