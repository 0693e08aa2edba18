//! Quiz run state machine.
//!
//! A run walks the bank once: each question accepts exactly one selection, which
//! locks the answer until `advance` moves the cursor. Reaching the end of the
//! bank is terminal; the caller hands the final score to the controller.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{Feedback, Question, QuizBank, OPTION_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  AwaitingAnswer,
  AnswerLocked,
  Finished,
}

/// User events understood by a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizInput {
  Select(usize),
  Advance,
}

/// Observable result of feeding one input to a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizOutcome {
  /// Input had no effect in the current phase.
  Ignored,
  /// First selection for the current question was recorded.
  Answered(Feedback),
  /// Cursor moved to the given question.
  NextQuestion(usize),
  /// The run just became terminal. Emitted exactly once per run.
  Finished { score: u32 },
}

#[derive(Clone, Debug)]
pub struct QuizRun {
  bank: Arc<QuizBank>,
  cursor: usize,
  score: u32,
  phase: Phase,
  selected: Option<usize>,
  feedback: Option<Feedback>,
}

impl QuizRun {
  /// Fresh run at question 0. An empty bank starts already finished.
  pub fn new(bank: Arc<QuizBank>) -> Self {
    let phase = if bank.is_empty() { Phase::Finished } else { Phase::AwaitingAnswer };
    Self { bank, cursor: 0, score: 0, phase, selected: None, feedback: None }
  }

  pub fn apply(&mut self, input: QuizInput) -> QuizOutcome {
    match (self.phase, input) {
      (Phase::AwaitingAnswer, QuizInput::Select(choice)) => {
        if choice >= OPTION_COUNT {
          return QuizOutcome::Ignored;
        }
        let Some(question) = self.bank.get(self.cursor) else {
          return QuizOutcome::Ignored;
        };
        let feedback = if question.is_correct(choice) {
          self.score += 1;
          Feedback::Correct
        } else {
          Feedback::Incorrect
        };
        self.selected = Some(choice);
        self.feedback = Some(feedback);
        self.phase = Phase::AnswerLocked;
        QuizOutcome::Answered(feedback)
      }
      (Phase::AnswerLocked, QuizInput::Advance) => {
        self.cursor += 1;
        self.selected = None;
        self.feedback = None;
        if self.cursor >= self.bank.len() {
          self.phase = Phase::Finished;
          QuizOutcome::Finished { score: self.score }
        } else {
          self.phase = Phase::AwaitingAnswer;
          QuizOutcome::NextQuestion(self.cursor)
        }
      }
      // advance while awaiting, select while locked, anything once finished
      _ => QuizOutcome::Ignored,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }

  pub fn cursor(&self) -> usize { self.cursor }

  pub fn score(&self) -> u32 { self.score }

  pub fn total(&self) -> usize { self.bank.len() }

  pub fn is_finished(&self) -> bool { self.phase == Phase::Finished }

  /// Question under the cursor, `None` once finished.
  pub fn current(&self) -> Option<&Question> {
    if self.is_finished() { None } else { self.bank.get(self.cursor) }
  }

  pub fn selected(&self) -> Option<usize> { self.selected }

  pub fn feedback(&self) -> Option<Feedback> { self.feedback }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_quiz_bank;

  fn run() -> QuizRun {
    QuizRun::new(Arc::new(seed_quiz_bank()))
  }

  fn feed(run: &mut QuizRun, inputs: &[QuizInput]) -> Vec<QuizOutcome> {
    inputs.iter().map(|i| run.apply(*i)).collect()
  }

  use QuizInput::{Advance, Select};

  #[test]
  fn perfect_run_finishes_with_full_score() {
    let mut r = run();
    let out = feed(&mut r, &[Select(0), Advance, Select(0), Advance, Select(0), Advance]);
    assert_eq!(out.last(), Some(&QuizOutcome::Finished { score: 3 }));
    assert_eq!(r.phase(), Phase::Finished);
    assert_eq!(r.cursor(), 3);
  }

  #[test]
  fn mixed_run_counts_only_correct_answers() {
    let mut r = run();
    let out = feed(&mut r, &[Select(1), Advance, Select(0), Advance, Select(2), Advance]);
    assert_eq!(out[0], QuizOutcome::Answered(Feedback::Incorrect));
    assert_eq!(out[2], QuizOutcome::Answered(Feedback::Correct));
    assert_eq!(out[4], QuizOutcome::Answered(Feedback::Incorrect));
    assert_eq!(out[5], QuizOutcome::Finished { score: 1 });
  }

  #[test]
  fn locked_answer_ignores_second_selection() {
    let mut r = run();
    assert_eq!(r.apply(Select(0)), QuizOutcome::Answered(Feedback::Correct));
    assert_eq!(r.apply(Select(2)), QuizOutcome::Ignored);
    assert_eq!(r.score(), 1);
    assert_eq!(r.selected(), Some(0));
    assert_eq!(r.feedback(), Some(Feedback::Correct));
    assert_eq!(r.apply(Advance), QuizOutcome::NextQuestion(1));
    assert_eq!(r.score(), 1);
  }

  #[test]
  fn advance_before_answer_is_ignored() {
    let mut r = run();
    assert_eq!(r.apply(Advance), QuizOutcome::Ignored);
    assert_eq!(r.cursor(), 0);
    assert_eq!(r.phase(), Phase::AwaitingAnswer);
  }

  #[test]
  fn out_of_range_option_is_ignored() {
    let mut r = run();
    assert_eq!(r.apply(Select(4)), QuizOutcome::Ignored);
    assert_eq!(r.apply(Select(usize::MAX)), QuizOutcome::Ignored);
    assert_eq!(r.phase(), Phase::AwaitingAnswer);
    assert_eq!(r.score(), 0);
  }

  #[test]
  fn finished_is_terminal() {
    let mut r = run();
    feed(&mut r, &[Select(0), Advance, Select(0), Advance, Select(0), Advance]);
    assert_eq!(r.apply(Select(0)), QuizOutcome::Ignored);
    assert_eq!(r.apply(Advance), QuizOutcome::Ignored);
    assert_eq!(r.score(), 3);
    assert!(r.current().is_none());
  }

  #[test]
  fn empty_bank_starts_finished() {
    let r = QuizRun::new(Arc::new(QuizBank::default()));
    assert!(r.is_finished());
    assert_eq!(r.score(), 0);
    assert_eq!(r.total(), 0);
  }

  #[test]
  fn score_never_exceeds_questions_seen() {
    let mut r = run();
    let inputs = [Select(0), Select(0), Advance, Advance, Select(3), Select(0), Advance, Select(0), Advance, Select(0)];
    for i in inputs {
      r.apply(i);
      let answered = r.cursor() + usize::from(r.phase() == Phase::AnswerLocked);
      assert!(r.score() as usize <= answered);
    }
    assert_eq!(r.score(), 2);
  }
}
