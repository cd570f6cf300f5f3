use serde::Serialize;

use crate::evaluator::Verdict;
use crate::response::Response;
use crate::util::mean;

/// One submitted answer. Appended to the results, never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerAttempt {
    pub question_index: usize,
    pub prompt: String,
    pub response: Response,
    pub is_correct: bool,
    pub user_answer: String,
    pub correct_answer: String,
    /// Seconds spent on the question when the answer was submitted.
    pub elapsed_at_submission: u64,
}

impl AnswerAttempt {
    pub fn new(
        question_index: usize,
        prompt: impl Into<String>,
        response: Response,
        verdict: Verdict,
        elapsed_at_submission: u64,
    ) -> Self {
        Self {
            question_index,
            prompt: prompt.into(),
            response,
            is_correct: verdict.is_correct,
            user_answer: verdict.user_answer,
            correct_answer: verdict.correct_answer,
            elapsed_at_submission,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Results {
    pub questions: Vec<AnswerAttempt>,
    pub times: Vec<u64>,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub final_score: f64,
}

impl Results {
    pub fn total_seconds(&self) -> u64 {
        self.times.iter().sum()
    }

    pub fn average_seconds(&self) -> Option<f64> {
        mean(&self.times.iter().map(|t| *t as f64).collect::<Vec<_>>())
    }

    pub fn answered(&self) -> usize {
        self.questions.len()
    }
}

/// Accumulates attempts for one session. The only place the score is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    total_questions: usize,
    results: Results,
}

impl Progress {
    pub fn new(total_questions: usize) -> Self {
        Self {
            total_questions,
            results: Results::default(),
        }
    }

    pub fn record(&mut self, attempt: AnswerAttempt) -> &AnswerAttempt {
        let results = &mut self.results;
        if attempt.is_correct {
            results.correct_count += 1;
        } else {
            results.wrong_count += 1;
        }
        results.times.push(attempt.elapsed_at_submission);
        results.questions.push(attempt);
        results.final_score = score_for(results.correct_count, self.total_questions);

        &results.questions[results.questions.len() - 1]
    }

    pub fn snapshot(&self) -> &Results {
        &self.results
    }

    pub fn score(&self) -> f64 {
        self.results.final_score
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn reset(&mut self) {
        self.results = Results::default();
    }
}

/// Each correct answer is worth `100 / total` points.
fn score_for(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 * (100.0 / total as f64)
    }
}
