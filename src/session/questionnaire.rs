use tracing::{debug, info, warn};

use super::state::Phase;
use crate::geometry::Vec3;

/// One answer, placed at the last accepted gaze hit
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireAnswer {
    /// Seconds since the session started
    pub timestamp: f64,
    pub answer: String,
    /// Last accepted local hit when the answer was given
    pub estimated_position: Vec3,
}

/// Answer selection event, queued until the next tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    /// Keypad digit, resolved through the keypad layout
    Key(u8),
    /// Answer number, 1-based
    Number(usize),
    /// Label chosen in an external UI
    Label(String),
}

/// Answer labels and the keypad layout that selects them
#[derive(Debug, Clone)]
pub struct AnswerChoices {
    labels: Vec<String>,
    keypad: Vec<u8>,
}

impl AnswerChoices {
    pub fn new(labels: Vec<String>, keypad: Vec<u8>) -> Self {
        Self { labels, keypad }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label for an input event, `None` for unmapped keys and out-of-range numbers
    pub fn resolve(&self, input: &AnswerInput) -> Option<String> {
        match input {
            AnswerInput::Key(digit) => {
                let Some(pos) = self.keypad.iter().position(|k| k == digit) else {
                    debug!("Key {} is not bound to an answer", digit);
                    return None;
                };
                self.by_number(pos + 1)
            }
            AnswerInput::Number(n) => self.by_number(*n),
            AnswerInput::Label(label) => Some(label.clone()),
        }
    }

    fn by_number(&self, number: usize) -> Option<String> {
        if number == 0 || number > self.labels.len() {
            warn!("Attempted to select an invalid answer number: {}", number);
            return None;
        }
        Some(self.labels[number - 1].clone())
    }
}

/// Ordered answers for the current session
#[derive(Debug, Clone, Default)]
pub struct QuestionnaireLog {
    answers: Vec<QuestionnaireAnswer>,
}

impl QuestionnaireLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an answer; ignored unless the session is in the Gazing phase
    pub fn record(&mut self, phase: Phase, label: &str, position: Vec3, timestamp: f64) -> bool {
        if phase != Phase::Gazing {
            debug!("Ignoring answer '{}' outside the gazing phase ({})", label, phase);
            return false;
        }

        info!("Questionnaire answer '{}' at {:.2}s", label, timestamp);
        self.answers.push(QuestionnaireAnswer {
            timestamp,
            answer: label.to_string(),
            estimated_position: position,
        });
        true
    }

    pub fn answers(&self) -> &[QuestionnaireAnswer] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}
