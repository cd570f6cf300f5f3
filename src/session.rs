use std::time::Duration;
use thiserror::Error;

use crate::bank::ExerciseBank;
use crate::clock::{Clock, Timer};
use crate::evaluator::{Evaluate, ResponseMismatch};
use crate::exercise::{ExerciseKind, Question};
use crate::progress::{AnswerAttempt, Progress, Results};
use crate::response::Response;

/// How long a correct answer stays on screen before the next question.
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_secs(2);
const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Waiting for an answer to the current question.
    InProgress,
    /// A correct answer is on display; the session advances on its own.
    CorrectDelay,
    /// An incorrect answer is on display until acknowledged.
    AwaitingAck,
    Finished,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("the session is finished")]
    Finished,

    #[error("the previous answer is still on display ({0})")]
    Busy(Phase),

    #[error("the answer is not complete enough to submit")]
    NotSubmittable,

    #[error("there is no incorrect answer to acknowledge")]
    NotAwaitingAck,

    #[error(transparent)]
    Response(#[from] ResponseMismatch),
}

/// What the stats bar shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// 1-based number of the current question, 0 for an empty bank.
    pub question_number: usize,
    pub total_questions: usize,
    pub answered: usize,
    pub elapsed_seconds: u64,
    pub question_seconds: u64,
    pub score: f64,
}

/// One run through an exercise bank.
///
/// All time-driven behavior goes through [`Session::poll`], which reads the
/// injected clock. The per-second ticker and the deferred advance after a
/// correct answer are timers owned here; restarting or dropping the session
/// drops them, so neither can fire into a session it was not armed for.
#[derive(Debug)]
pub struct Session<C: Clock> {
    bank: ExerciseBank,
    clock: C,
    feedback_delay: Duration,
    current_index: usize,
    elapsed_seconds: u64,
    question_seconds: u64,
    phase: Phase,
    draft: Option<Response>,
    progress: Progress,
    ticker: Option<Timer>,
    pending_advance: Option<Timer>,
}

impl<C: Clock> Session<C> {
    pub fn new(bank: ExerciseBank, clock: C, feedback_delay: Duration) -> Self {
        let mut session = Self {
            progress: Progress::new(bank.len()),
            bank,
            clock,
            feedback_delay,
            current_index: 0,
            elapsed_seconds: 0,
            question_seconds: 0,
            phase: Phase::InProgress,
            draft: None,
            ticker: None,
            pending_advance: None,
        };
        session.reset_state();
        session
    }

    fn reset_state(&mut self) {
        self.current_index = 0;
        self.elapsed_seconds = 0;
        self.question_seconds = 0;
        self.progress.reset();
        self.pending_advance = None;
        self.draft = self.bank.get(0).map(Evaluate::blank_response);

        if self.bank.is_empty() {
            self.phase = Phase::Finished;
            self.ticker = None;
        } else {
            self.phase = Phase::InProgress;
            self.ticker = Some(Timer::every(self.clock.now(), TICK_INTERVAL));
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        self.bank.kind
    }

    pub fn bank(&self) -> &ExerciseBank {
        &self.bank
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            None
        } else {
            self.bank.get(self.current_index)
        }
    }

    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    pub fn stats(&self) -> Stats {
        let total_questions = self.bank.len();
        let question_number = if total_questions == 0 {
            0
        } else {
            (self.current_index + 1).min(total_questions)
        };
        Stats {
            question_number,
            total_questions,
            answered: self.progress.snapshot().answered(),
            elapsed_seconds: self.elapsed_seconds,
            question_seconds: self.question_seconds,
            score: self.progress.score(),
        }
    }

    pub fn results(&self) -> &Results {
        self.progress.snapshot()
    }

    /// The attempt currently on display, if any.
    pub fn last_attempt(&self) -> Option<&AnswerAttempt> {
        match self.phase {
            Phase::CorrectDelay | Phase::AwaitingAck => self.results().questions.last(),
            _ => None,
        }
    }

    /// The response being built for the current question.
    pub fn draft(&self) -> Option<&Response> {
        self.draft.as_ref()
    }

    /// Editable only while the session waits for an answer.
    pub fn draft_mut(&mut self) -> Option<&mut Response> {
        if self.phase == Phase::InProgress {
            self.draft.as_mut()
        } else {
            None
        }
    }

    /// The current question together with its editable draft, while the
    /// session waits for an answer.
    pub fn editing(&mut self) -> Option<(&Question, &mut Response)> {
        if self.phase != Phase::InProgress {
            return None;
        }
        let question = self.bank.get(self.current_index)?;
        let draft = self.draft.as_mut()?;
        Some((question, draft))
    }

    pub fn can_submit_draft(&self) -> bool {
        match (self.phase, self.current_question(), self.draft.as_ref()) {
            (Phase::InProgress, Some(question), Some(draft)) => question.can_submit(draft),
            _ => false,
        }
    }

    /// One second of activity. No-op once finished.
    pub fn tick(&mut self) {
        if self.is_finished() {
            return;
        }
        self.elapsed_seconds += 1;
        self.question_seconds += 1;
    }

    /// Fire whatever timers have come due on the clock. Returns whether the
    /// session changed.
    ///
    /// Ticks due before a pending advance fire first; once the advance has
    /// finished the session, later ticks are dropped with the ticker.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now();
        let mut changed = false;

        let advance_at = self
            .pending_advance
            .as_ref()
            .and_then(Timer::due)
            .filter(|due| *due <= now);
        if let Some(at) = advance_at {
            changed |= self.fire_ticks(at);
            self.pending_advance = None;
            self.move_on();
            changed = true;
        }

        changed |= self.fire_ticks(now);
        changed
    }

    fn fire_ticks(&mut self, until: Duration) -> bool {
        let ticks = self.ticker.as_mut().map_or(0, |t| t.poll(until));
        for _ in 0..ticks {
            self.tick();
        }
        ticks > 0
    }

    pub fn submit(&mut self, response: Response) -> Result<&AnswerAttempt, SessionError> {
        match self.phase {
            Phase::Finished => return Err(SessionError::Finished),
            Phase::CorrectDelay | Phase::AwaitingAck => return Err(SessionError::Busy(self.phase)),
            Phase::InProgress => {}
        }
        let question = self
            .bank
            .get(self.current_index)
            .ok_or(SessionError::Finished)?;

        let verdict = question.evaluate(&response)?;
        if !question.can_submit(&response) {
            return Err(SessionError::NotSubmittable);
        }

        log::debug!(
            "{} question {}: {} (answered {:?}, expected {:?})",
            self.bank.kind,
            self.current_index + 1,
            if verdict.is_correct { "correct" } else { "incorrect" },
            verdict.user_answer,
            verdict.correct_answer
        );

        if verdict.is_correct {
            self.phase = Phase::CorrectDelay;
            self.pending_advance = Some(Timer::once(self.clock.now(), self.feedback_delay));
        } else {
            self.phase = Phase::AwaitingAck;
        }

        let attempt = AnswerAttempt::new(
            self.current_index,
            question.prompt(),
            response,
            verdict,
            self.question_seconds,
        );
        Ok(self.progress.record(attempt))
    }

    /// Submit the current response buffer.
    pub fn submit_draft(&mut self) -> Result<&AnswerAttempt, SessionError> {
        let draft = self.draft.clone().ok_or(SessionError::Finished)?;
        self.submit(draft)
    }

    pub fn acknowledge_incorrect(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::AwaitingAck => {
                self.move_on();
                Ok(())
            }
            Phase::Finished => Err(SessionError::Finished),
            _ => Err(SessionError::NotAwaitingAck),
        }
    }

    /// Move to the next question, or finish after the last one. Cancels a
    /// pending deferred advance.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        self.move_on();
        Ok(())
    }

    fn move_on(&mut self) {
        self.pending_advance = None;
        let next = self.current_index + 1;
        match self.bank.get(next) {
            Some(question) => {
                self.current_index = next;
                self.question_seconds = 0;
                self.draft = Some(question.blank_response());
                self.phase = Phase::InProgress;
            }
            None => self.finish(),
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        self.ticker = None;
        let results = self.progress.snapshot();
        log::info!(
            "{} session finished: {}/{} correct, score {:.0}, {}s",
            self.bank.kind,
            results.correct_count,
            self.bank.len(),
            results.final_score,
            self.elapsed_seconds
        );
    }

    /// Back to the first question with empty results. Drops any pending
    /// advance and re-arms the ticker.
    pub fn restart(&mut self) {
        self.reset_state();
        log::info!("{} session restarted", self.bank.kind);
    }
}
