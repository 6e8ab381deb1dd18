// src/session/state.rs
// Request run state and the cool-down gated state machine that owns it

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::idea::ParsedIdea;
use crate::llm::Completion;
use crate::retrieval::ExampleSet;

/// The only failure text the user ever sees
pub const USER_ERROR_MESSAGE: &str = "Try again";

/// Time source for the cool-down window
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Busy,
    Success,
    Error,
}

/// Everything one run produces. Reset as a unit when a new run starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub phase: Phase,
    pub is_busy: bool,
    pub last_request_at: Option<Instant>,
    pub had_error: bool,
    pub examples: Option<ExampleSet>,
    pub used_fallback: bool,
    pub prompt: Option<String>,
    pub raw_completion: Option<Completion>,
    pub parsed_idea: Option<ParsedIdea>,
    pub run_id: Option<Uuid>,
}

/// Proof that a trigger was accepted; needed to record that run's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    run_id: Uuid,
}

impl RunTicket {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success {
        examples: ExampleSet,
        prompt: String,
        completion: Completion,
        idea: ParsedIdea,
    },
    /// Neither the store nor the catalog produced examples
    NoExamples,
    /// Both generation models failed
    GenerationFailed { examples: ExampleSet, prompt: String },
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunView {
    pub phase: Phase,
    pub is_busy: bool,
    pub had_error: bool,
    pub used_fallback: bool,
    pub idea: Option<ParsedIdea>,
}

impl RunView {
    /// The idea to render, if there is anything to show
    pub fn card(&self) -> Option<&ParsedIdea> {
        self.idea.as_ref().filter(|idea| !idea.is_blank())
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.had_error.then_some(USER_ERROR_MESSAGE)
    }
}

/// `Idle -> Busy -> (Success | Error)`, re-enterable from any terminal phase.
///
/// A trigger while busy is ignored until the cool-down (measured from the
/// last accepted trigger) has elapsed; with no cool-down every trigger is
/// accepted.
pub struct RequestStateMachine {
    state: RunState,
    cooldown: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl RequestStateMachine {
    pub fn new(cooldown: Option<Duration>) -> Self {
        Self::with_clock(cooldown, Arc::new(SystemClock))
    }

    pub fn with_clock(cooldown: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RunState::default(),
            cooldown,
            clock,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Whether a trigger right now would start a run (the button's enabled flag)
    pub fn is_enabled(&self) -> bool {
        self.accepts_at(self.clock.now())
    }

    fn accepts_at(&self, now: Instant) -> bool {
        if !self.state.is_busy {
            return true;
        }
        match (self.cooldown, self.state.last_request_at) {
            (None, _) | (_, None) => true,
            (Some(cooldown), Some(last)) => now.saturating_duration_since(last) >= cooldown,
        }
    }

    /// Accept a trigger: clear every per-run field and mark the run busy.
    ///
    /// Returns `None` (and changes nothing) when the trigger is gated.
    pub fn begin(&mut self) -> Option<RunTicket> {
        let now = self.clock.now();
        if !self.accepts_at(now) {
            debug!(run_id = ?self.state.run_id, "Trigger ignored: run in flight within cool-down");
            return None;
        }

        if self.state.is_busy {
            info!(stale_run = ?self.state.run_id, "Cool-down elapsed, superseding busy run");
        }

        let run_id = Uuid::new_v4();
        self.state = RunState {
            phase: Phase::Busy,
            is_busy: true,
            last_request_at: Some(now),
            run_id: Some(run_id),
            ..RunState::default()
        };
        Some(RunTicket { run_id })
    }

    /// Record a run's outcome. Outcomes of superseded runs are dropped so a
    /// result surfaces at most once.
    pub fn finish(&mut self, ticket: RunTicket, outcome: RunOutcome) -> bool {
        if self.state.run_id != Some(ticket.run_id) || !self.state.is_busy {
            debug!(run_id = %ticket.run_id, "Dropping outcome of superseded run");
            return false;
        }

        match outcome {
            RunOutcome::Success {
                examples,
                prompt,
                completion,
                idea,
            } => {
                self.state.phase = Phase::Success;
                self.state.used_fallback = examples.used_fallback();
                self.state.examples = Some(examples);
                self.state.prompt = Some(prompt);
                self.state.raw_completion = Some(completion);
                self.state.parsed_idea = Some(idea);
            }
            RunOutcome::NoExamples => {
                self.state.phase = Phase::Error;
                self.state.had_error = true;
                self.state.examples = None;
                self.state.used_fallback = false;
                self.state.prompt = None;
                self.state.raw_completion = None;
                self.state.parsed_idea = None;
            }
            RunOutcome::GenerationFailed { examples, prompt } => {
                self.state.phase = Phase::Error;
                self.state.had_error = true;
                self.state.used_fallback = examples.used_fallback();
                self.state.examples = Some(examples);
                self.state.prompt = Some(prompt);
                self.state.raw_completion = None;
                self.state.parsed_idea = None;
            }
        }
        self.state.is_busy = false;
        info!(run_id = %ticket.run_id, phase = ?self.state.phase, "Run finished");
        true
    }

    pub fn view(&self) -> RunView {
        RunView {
            phase: self.state.phase,
            is_busy: self.state.is_busy,
            had_error: self.state.had_error,
            used_fallback: self.state.used_fallback,
            idea: self.state.parsed_idea.clone(),
        }
    }
}
