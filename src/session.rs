//! Async host around [`EngineCore`].
//!
//! The engine is synchronous and owns all state; `Session` shares it behind
//! a `tokio::sync::Mutex` and drives the evaluation round trip. The lock is
//! never held across the network await, so input, drags and resets keep
//! working while a submission is pending. The round trip runs in its own
//! task, so a caller that stops waiting never strands the engine in flight.

use std::sync::Arc;

use canvas::engine::{Action, EngineCore};
use canvas::geom::Point;
use canvas::overlay::OverlayId;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use crate::eval::Evaluator;

#[derive(Clone)]
pub struct Session {
    core: Arc<Mutex<EngineCore>>,
    evaluator: Arc<dyn Evaluator>,
}

impl Session {
    #[must_use]
    pub fn new(core: EngineCore, evaluator: Arc<dyn Evaluator>) -> Self {
        Self { core: Arc::new(Mutex::new(core)), evaluator }
    }

    /// Capture the surface, send it with the current bindings, and apply the
    /// outcome. Failures come back as [`Action::ShowError`].
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Vec<Action> {
        let ticket = {
            let mut core = self.core.lock().await;
            match core.begin_submission() {
                Ok(ticket) => ticket,
                Err(e) => return vec![Action::ShowError { code: e.error_code(), message: e.to_string() }],
            }
        };

        // Runs to completion even if the caller drops this future.
        let core = Arc::clone(&self.core);
        let evaluator = Arc::clone(&self.evaluator);
        let round_trip = tokio::spawn(async move {
            let uri = ticket.image.to_data_uri();
            let outcome = evaluator.evaluate(&uri, &ticket.bindings).await;

            let mut core = core.lock().await;
            match outcome {
                Ok(results) => {
                    info!(count = results.len(), "evaluation returned");
                    core.complete_submission(ticket, results)
                }
                Err(e) => core.fail_submission(ticket, e.error_code(), e.to_string()),
            }
        });

        match round_trip.await {
            Ok(actions) => actions,
            Err(e) => {
                error!(error = %e, "submission task failed");
                vec![Action::ShowError { code: "E_SUBMIT_TASK", message: e.to_string() }]
            }
        }
    }

    pub async fn reset(&self) -> Vec<Action> {
        self.core.lock().await.reset()
    }

    pub async fn tick(&self, elapsed_ms: u64) -> Vec<Action> {
        self.core.lock().await.tick(elapsed_ms)
    }

    /// Advance until every scheduled reveal has fired.
    pub async fn settle(&self) -> Vec<Action> {
        let mut core = self.core.lock().await;
        let mut actions = Vec::new();
        while let Some(wait) = core.next_reveal_in_ms() {
            actions.extend(core.tick(wait));
        }
        actions
    }

    pub async fn pointer_down(&self, point: Point) -> Vec<Action> {
        self.core.lock().await.on_pointer_down(point)
    }

    pub async fn pointer_move(&self, point: Point) -> Vec<Action> {
        self.core.lock().await.on_pointer_move(point)
    }

    pub async fn pointer_up(&self) -> Vec<Action> {
        self.core.lock().await.on_pointer_up()
    }

    pub async fn move_overlay(&self, id: &OverlayId, position: Point) -> Vec<Action> {
        self.core.lock().await.move_overlay(id, position)
    }

    /// Run `f` with exclusive access to the engine.
    pub async fn with_core<R>(&self, f: impl FnOnce(&mut EngineCore) -> R) -> R {
        let mut core = self.core.lock().await;
        f(&mut core)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
