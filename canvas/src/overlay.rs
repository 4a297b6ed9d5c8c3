//! Result overlays: one draggable rendering per evaluation result.
//!
//! Overlays are created hidden by [`OverlayStore::add_batch`], every overlay
//! of a batch positioned at the batch anchor, and revealed later by the
//! engine's scheduler. Positions change only through [`OverlayStore::move_to`]
//! (a user drag); nothing else writes an existing overlay's position.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use serde::Serialize;
use uuid::Uuid;

use crate::geom::Point;
use crate::render;
use crate::vars::EvaluationResult;

/// Unique identifier for an overlay.
pub type OverlayId = Uuid;

/// A positioned expression/result pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub id: OverlayId,
    /// Recognized expression.
    pub expression: String,
    /// Evaluated value.
    pub result: String,
    /// Top-left placement in surface coordinates.
    pub position: Point,
    /// Whether the reveal delay has elapsed.
    pub visible: bool,
    /// Set once the user has dragged this overlay.
    pub dragged: bool,
}

impl Overlay {
    /// Display text, `expr = result`.
    #[must_use]
    pub fn content(&self) -> String {
        format!("{} = {}", self.expression, self.result)
    }

    /// The string handed to the typesetting collaborator.
    #[must_use]
    pub fn latex(&self) -> String {
        render::latex(&self.expression, &self.result)
    }
}

/// Ordered collection of overlays (creation order is display order).
#[derive(Debug, Clone, Default)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
}

impl OverlayStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one hidden overlay per result, in order, all at `anchor`.
    /// Existing overlays are untouched.
    pub fn add_batch(&mut self, results: &[EvaluationResult], anchor: Point) -> Vec<OverlayId> {
        let mut ids = Vec::with_capacity(results.len());
        for r in results {
            let id = Uuid::new_v4();
            self.overlays.push(Overlay {
                id,
                expression: r.expression.clone(),
                result: r.result.clone(),
                position: anchor,
                visible: false,
                dragged: false,
            });
            ids.push(id);
        }
        ids
    }

    /// Make an overlay visible. Returns `false` if it is unknown or already visible.
    pub fn reveal(&mut self, id: &OverlayId) -> bool {
        match self.get_mut(id) {
            Some(o) if !o.visible => {
                o.visible = true;
                true
            }
            _ => false,
        }
    }

    /// Move exactly one overlay. Unknown ids and non-finite positions are no-ops.
    pub fn move_to(&mut self, id: &OverlayId, position: Point) -> bool {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return false;
        }
        let Some(o) = self.get_mut(id) else {
            return false;
        };
        o.position = position;
        o.dragged = true;
        true
    }

    #[must_use]
    pub fn get(&self, id: &OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == *id)
    }

    fn get_mut(&mut self, id: &OverlayId) -> Option<&mut Overlay> {
        self.overlays.iter_mut().find(|o| o.id == *id)
    }

    /// All overlays in creation order, hidden ones included.
    #[must_use]
    pub fn all(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Visible overlays in creation order.
    pub fn visible(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter().filter(|o| o.visible)
    }

    /// Typesetting strings for every visible overlay, in display order.
    #[must_use]
    pub fn displayed_latex(&self) -> Vec<String> {
        self.visible().map(Overlay::latex).collect()
    }

    pub fn reset(&mut self) {
        self.overlays.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}
