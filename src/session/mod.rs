// src/session/mod.rs
// One user's session: a state machine plus the shared pipeline it drives

pub mod pipeline;
pub mod state;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Instrument, debug, info_span};

pub use pipeline::IdeaPipeline;
pub use state::{
    Clock, Phase, RequestStateMachine, RunOutcome, RunState, RunTicket, RunView, SystemClock,
    USER_ERROR_MESSAGE,
};

use crate::idea::Selection;

/// Session-owned run state and randomness; never shared between users.
pub struct Session {
    machine: RequestStateMachine,
    pipeline: Arc<IdeaPipeline>,
    rng: StdRng,
}

impl Session {
    pub fn new(pipeline: Arc<IdeaPipeline>) -> Self {
        let cooldown = pipeline.profile().cooldown;
        Self {
            machine: RequestStateMachine::new(cooldown),
            pipeline,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Session with an explicit clock and seed, for deterministic runs
    pub fn with_parts(pipeline: Arc<IdeaPipeline>, clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        let cooldown = pipeline.profile().cooldown;
        Self {
            machine: RequestStateMachine::with_clock(cooldown, clock),
            pipeline,
            rng,
        }
    }

    pub fn state(&self) -> &RunState {
        self.machine.state()
    }

    pub fn view(&self) -> RunView {
        self.machine.view()
    }

    /// Whether the trigger is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.machine.is_enabled()
    }

    /// The single "start request" entry point.
    ///
    /// Runs the pipeline to completion and returns the resulting view; a
    /// gated trigger returns the current view untouched.
    pub async fn submit(&mut self, selection: Selection) -> RunView {
        let Some(ticket) = self.machine.begin() else {
            debug!("Trigger ignored");
            return self.machine.view();
        };

        let span = info_span!("run", run_id = %ticket.run_id(), category = %selection.category);
        let outcome = self
            .pipeline
            .run(&selection, &mut self.rng)
            .instrument(span)
            .await;
        self.machine.finish(ticket, outcome);
        self.machine.view()
    }
}
