use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::capture::{self, Capture, CaptureError};
use crate::clock::Scheduler;
use crate::consts::{DEFAULT_REVEAL_DELAY_MS, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use crate::geom::Point;
use crate::input::{BrushState, parse_color};
use crate::locate;
use crate::overlay::{OverlayId, OverlayStore};
use crate::surface::{DrawingSurface, SurfaceError};
use crate::vars::{Bindings, EvaluationResult, VariableStore};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine entry points for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Surface pixels changed; redraw the canvas.
    RenderNeeded,
    /// Overlay set, visibility or positions changed.
    OverlaysChanged,
    /// The displayed-expression list changed; re-typeset with this list.
    Typeset(Vec<String>),
    /// Surface a failure to the user.
    ShowError { code: &'static str, message: String },
}

/// Errors from [`EngineCore::begin_submission`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Another submission has not finished yet.
    #[error("a submission is already in flight")]
    InFlight,
    /// The surface could not be captured.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl SubmitError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InFlight => "E_IN_FLIGHT",
            Self::Capture(e) => e.error_code(),
        }
    }
}

/// Errors from [`EngineCore::load_png`].
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Decode(#[from] CaptureError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl ImportError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Decode(e) => e.error_code(),
            Self::Surface(e) => e.error_code(),
        }
    }
}

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Initial surface width in pixels.
    pub width: u32,
    /// Initial surface height in pixels.
    pub height: u32,
    /// Delay between a successful submission and its overlays appearing.
    /// Every overlay of a batch shares this delay.
    pub reveal_delay_ms: u64,
    /// Clear the drawing when a batch of overlays appears.
    pub clear_on_reveal: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            clear_on_reveal: true,
        }
    }
}

/// Everything a submission needs, captured in one step.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    epoch: u64,
    /// PNG snapshot of the surface.
    pub image: Capture,
    /// Bindings to send along with the image.
    pub bindings: Bindings,
    /// Where this submission's overlays will be placed.
    pub anchor: Point,
}

#[derive(Debug, Clone)]
enum Deferred {
    Reveal(Vec<OverlayId>),
}

/// Core engine state: the single owner of surface, brush, bindings and overlays.
///
/// Every mutating entry point returns the [`Action`]s the host must carry out.
/// [`EngineCore::reset`] is the only teardown path.
pub struct EngineCore {
    config: EngineConfig,
    surface: DrawingSurface,
    brush: BrushState,
    vars: VariableStore,
    overlays: OverlayStore,
    scheduler: Scheduler<Deferred>,
    /// Bumped by every reset; tickets from an older epoch are stale.
    epoch: u64,
    in_flight: bool,
    pending_anchor: Option<Point>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            surface: DrawingSurface::new(config.width.max(1), config.height.max(1)),
            brush: BrushState::default(),
            vars: VariableStore::new(),
            overlays: OverlayStore::new(),
            scheduler: Scheduler::new(),
            epoch: 0,
            in_flight: false,
            pending_anchor: None,
        }
    }

    // --- Brush ---

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.brush.set_color(color);
    }

    /// Set the color from a CSS string. Returns `false` (brush unchanged) if it does not parse.
    pub fn set_color_css(&mut self, raw: &str) -> bool {
        let Some(color) = parse_color(raw) else {
            warn!(color = raw, "unrecognized brush color");
            return false;
        };
        self.brush.set_color(color);
        true
    }

    pub fn set_width(&mut self, width: f64) {
        self.brush.set_width(width);
    }

    pub fn toggle_eraser(&mut self) {
        self.brush.toggle_eraser();
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, point: Point) -> Vec<Action> {
        self.surface.begin_stroke(point, &self.brush);
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, point: Point) -> Vec<Action> {
        if self.surface.continue_stroke(point) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Pointer released or left the surface.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.surface.end_stroke();
        Vec::new()
    }

    // --- Geometry ---

    /// Resize the surface, closing any open stroke first.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::ZeroSize`] for an empty size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Vec<Action>, SurfaceError> {
        self.surface.end_stroke();
        self.surface.resize(width, height)?;
        Ok(vec![Action::RenderNeeded])
    }

    /// Replace the drawing with a decoded PNG, closing any open stroke first.
    ///
    /// # Errors
    ///
    /// [`ImportError::Decode`] if the bytes are not a PNG.
    pub fn load_png(&mut self, bytes: &[u8]) -> Result<Vec<Action>, ImportError> {
        let buffer = capture::decode_png(bytes)?;
        self.surface.end_stroke();
        self.surface.load(buffer)?;
        Ok(vec![Action::RenderNeeded])
    }

    // --- Capture / submission ---

    /// Snapshot the surface without starting a submission.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] if PNG encoding fails.
    pub fn export(&self) -> Result<Capture, CaptureError> {
        capture::export(self.surface.buffer())
    }

    /// Capture image, bindings and anchor for a new submission.
    ///
    /// # Errors
    ///
    /// [`SubmitError::InFlight`] while another submission is pending;
    /// [`SubmitError::Capture`] if the image cannot be encoded.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, SubmitError> {
        if self.in_flight {
            warn!("submission rejected: another is in flight");
            return Err(SubmitError::InFlight);
        }
        let image = self.export()?;
        let anchor = locate::anchor(self.surface.buffer());
        let bindings = self.vars.snapshot();

        self.in_flight = true;
        self.pending_anchor = Some(anchor);
        debug!(epoch = self.epoch, x = anchor.x, y = anchor.y, vars = bindings.len(), "submission started");

        Ok(SubmissionTicket { epoch: self.epoch, image, bindings, anchor })
    }

    /// Apply a successful response. Results for a ticket issued before the
    /// latest reset are discarded.
    pub fn complete_submission(&mut self, ticket: SubmissionTicket, results: Vec<EvaluationResult>) -> Vec<Action> {
        if !self.accept(&ticket) {
            return Vec::new();
        }

        for r in &results {
            self.vars.apply(r);
        }
        let ids = self.overlays.add_batch(&results, ticket.anchor);
        info!(count = ids.len(), vars = self.vars.len(), "evaluation results applied");

        if ids.is_empty() {
            return Vec::new();
        }
        self.scheduler.schedule(self.config.reveal_delay_ms, Deferred::Reveal(ids));
        vec![Action::OverlaysChanged]
    }

    /// Record a failed submission. Bindings and overlays are left as they were.
    pub fn fail_submission(&mut self, ticket: SubmissionTicket, code: &'static str, message: String) -> Vec<Action> {
        if !self.accept(&ticket) {
            return Vec::new();
        }
        warn!(code, %message, "submission failed");
        vec![Action::ShowError { code, message }]
    }

    fn accept(&mut self, ticket: &SubmissionTicket) -> bool {
        if ticket.epoch != self.epoch {
            debug!(ticket = ticket.epoch, current = self.epoch, "discarding results from before reset");
            return false;
        }
        self.in_flight = false;
        self.pending_anchor = None;
        true
    }

    // --- Time ---

    /// Advance the virtual clock and reveal any overlays now due.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<Action> {
        let mut revealed = 0usize;
        for task in self.scheduler.advance(elapsed_ms) {
            match task {
                Deferred::Reveal(ids) => {
                    revealed += ids.iter().filter(|id| self.overlays.reveal(id)).count();
                }
            }
        }
        if revealed == 0 {
            return Vec::new();
        }

        let mut actions = Vec::with_capacity(3);
        if self.config.clear_on_reveal {
            self.surface.clear();
            actions.push(Action::RenderNeeded);
        }
        actions.push(Action::OverlaysChanged);
        actions.push(Action::Typeset(self.overlays.displayed_latex()));
        actions
    }

    // --- Overlays ---

    /// User drag of one overlay.
    pub fn move_overlay(&mut self, id: &OverlayId, position: Point) -> Vec<Action> {
        if self.overlays.move_to(id, position) {
            vec![Action::OverlaysChanged]
        } else {
            Vec::new()
        }
    }

    // --- Lifecycle ---

    /// Clear surface, bindings, overlays, pending reveals and the pending
    /// anchor in one step. Any in-flight submission becomes stale.
    pub fn reset(&mut self) -> Vec<Action> {
        self.surface.end_stroke();
        self.surface.clear();
        self.vars.reset();
        self.overlays.reset();
        self.scheduler.cancel_all();
        self.pending_anchor = None;
        self.in_flight = false;
        self.epoch += 1;
        debug!(epoch = self.epoch, "engine reset");
        vec![Action::RenderNeeded, Action::OverlaysChanged, Action::Typeset(Vec::new())]
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    #[must_use]
    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    #[must_use]
    pub fn buffer(&self) -> &RgbaImage {
        self.surface.buffer()
    }

    #[must_use]
    pub fn bindings(&self) -> Bindings {
        self.vars.snapshot()
    }

    #[must_use]
    pub fn overlays(&self) -> &OverlayStore {
        &self.overlays
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn pending_anchor(&self) -> Option<Point> {
        self.pending_anchor
    }

    /// Virtual milliseconds until the next overlay reveal, if any is pending.
    #[must_use]
    pub fn next_reveal_in_ms(&self) -> Option<u64> {
        self.scheduler
            .next_due_ms()
            .map(|due| due.saturating_sub(self.scheduler.now_ms()))
    }
}
