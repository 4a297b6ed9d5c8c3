//! Scripted sessions: a JSON list of input events replayed against a
//! [`Session`].
//!
//! ```json
//! [
//!   { "op": "color", "value": "rgb(255, 0, 0)" },
//!   { "op": "stroke", "points": [{ "x": 10, "y": 10 }, { "x": 40, "y": 12 }] },
//!   { "op": "run" },
//!   { "op": "wait", "ms": 1000 },
//!   { "op": "drag", "index": 0, "x": 200, "y": 80 }
//! ]
//! ```

use canvas::engine::Action;
use canvas::geom::Point;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Pick a brush color (CSS `rgb()` / `rgba()` / `#hex`).
    Color { value: String },
    Width { value: f64 },
    Eraser,
    /// Press at the first point, drag through the rest, release.
    Stroke { points: Vec<Point> },
    Resize { width: u32, height: u32 },
    /// Submit the drawing for evaluation.
    Run,
    /// Advance the reveal clock.
    Wait { ms: u64 },
    /// Drag the overlay at `index` (creation order) to `(x, y)`.
    Drag { index: usize, x: f64, y: f64 },
    Reset,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScriptError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_SCRIPT_PARSE",
        }
    }
}

/// # Errors
///
/// Returns [`ScriptError::Parse`] if `json` is not a list of events.
pub fn parse(json: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Apply `events` in order and collect every action the engine emitted.
///
/// `Run` events only submit when `submit` is set. Events that cannot apply
/// (an unknown color, a drag past the last overlay, a zero-size resize) are
/// logged and skipped.
pub async fn replay(session: &Session, events: &[ScriptEvent], submit: bool) -> Vec<Action> {
    let mut actions = Vec::new();
    for (step, event) in events.iter().enumerate() {
        debug!(step, ?event, "replay");
        match event {
            ScriptEvent::Color { value } => {
                if !session.with_core(|c| c.set_color_css(value)).await {
                    warn!(step, color = %value, "skipping unknown color");
                }
            }
            ScriptEvent::Width { value } => session.with_core(|c| c.set_width(*value)).await,
            ScriptEvent::Eraser => session.with_core(canvas::engine::EngineCore::toggle_eraser).await,
            ScriptEvent::Stroke { points } => {
                let Some((first, rest)) = points.split_first() else {
                    continue;
                };
                actions.extend(session.pointer_down(*first).await);
                for p in rest {
                    actions.extend(session.pointer_move(*p).await);
                }
                actions.extend(session.pointer_up().await);
            }
            ScriptEvent::Resize { width, height } => match session.with_core(|c| c.resize(*width, *height)).await {
                Ok(a) => actions.extend(a),
                Err(e) => warn!(step, code = e.error_code(), "skipping resize"),
            },
            ScriptEvent::Run => {
                if submit {
                    actions.extend(session.submit().await);
                }
            }
            ScriptEvent::Wait { ms } => actions.extend(session.tick(*ms).await),
            ScriptEvent::Drag { index, x, y } => {
                let id = session.with_core(|c| c.overlays().all().get(*index).map(|o| o.id)).await;
                match id {
                    Some(id) => actions.extend(session.move_overlay(&id, Point::new(*x, *y)).await),
                    None => warn!(step, index, "no overlay to drag"),
                }
            }
            ScriptEvent::Reset => actions.extend(session.reset().await),
        }
    }
    actions
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
