#![allow(clippy::float_cmp)]

use super::*;
use crate::input::BrushMode;

// =============================================================
// Helpers
// =============================================================

fn small_config() -> EngineConfig {
    EngineConfig { width: 100, height: 100, reveal_delay_ms: 1000, clear_on_reveal: true }
}

fn core() -> EngineCore {
    EngineCore::new(small_config())
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn stroke(core: &mut EngineCore, from: Point, to: Point) {
    core.on_pointer_down(from);
    core.on_pointer_move(to);
    core.on_pointer_up();
}

fn assign(expr: &str, value: &str) -> EvaluationResult {
    EvaluationResult::new(expr, value, true)
}

fn expr(expr: &str, value: &str) -> EvaluationResult {
    EvaluationResult::new(expr, value, false)
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_render_needed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::RenderNeeded))
}

fn typeset_list(actions: &[Action]) -> Option<&Vec<String>> {
    actions.iter().find_map(|a| match a {
        Action::Typeset(list) => Some(list),
        _ => None,
    })
}

// =============================================================
// Construction and defaults
// =============================================================

#[test]
fn new_core_is_blank_and_idle() {
    let core = core();
    assert!(core.surface().is_blank());
    assert!(!core.surface().is_stroking());
    assert!(core.bindings().is_empty());
    assert!(core.overlays().is_empty());
    assert!(!core.is_submitting());
    assert!(core.pending_anchor().is_none());
}

#[test]
fn default_config_matches_constants() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.width, DEFAULT_SURFACE_WIDTH);
    assert_eq!(cfg.height, DEFAULT_SURFACE_HEIGHT);
    assert_eq!(cfg.reveal_delay_ms, 1000);
    assert!(cfg.clear_on_reveal);
}

#[test]
fn zero_sized_config_is_bumped_to_one_pixel() {
    let core = EngineCore::new(EngineConfig { width: 0, height: 0, ..small_config() });
    assert_eq!(core.surface().width(), 1);
    assert_eq!(core.surface().height(), 1);
}

// =============================================================
// Brush
// =============================================================

#[test]
fn set_color_css_accepts_swatch() {
    let mut core = core();
    assert!(core.set_color_css("#ee3333"));
    assert_eq!(core.brush().color, Rgba([0xee, 0x33, 0x33, 255]));
}

#[test]
fn set_color_css_rejects_garbage_and_keeps_brush() {
    let mut core = core();
    let before = *core.brush();
    assert!(!core.set_color_css("chartreuse-ish"));
    assert_eq!(*core.brush(), before);
}

#[test]
fn color_pick_disables_eraser() {
    let mut core = core();
    core.toggle_eraser();
    assert_eq!(core.brush().mode, BrushMode::Erase);
    core.set_color(Rgba([0, 0, 0, 255]));
    assert_eq!(core.brush().mode, BrushMode::Draw);
}

#[test]
fn set_width_is_clamped() {
    let mut core = core();
    core.set_width(99.0);
    assert_eq!(core.brush().width, 20.0);
}

// =============================================================
// Pointer input
// =============================================================

#[test]
fn pointer_move_while_idle_is_noop() {
    let mut core = core();
    let actions = core.on_pointer_move(pt(10.0, 10.0));
    assert!(actions.is_empty());
    assert!(core.surface().is_blank());
}

#[test]
fn drawing_requests_render() {
    let mut core = core();
    core.on_pointer_down(pt(10.0, 10.0));
    let actions = core.on_pointer_move(pt(30.0, 10.0));
    assert!(has_render_needed(&actions));
    assert!(!core.surface().is_blank());
}

#[test]
fn pointer_up_twice_is_harmless() {
    let mut core = core();
    core.on_pointer_down(pt(10.0, 10.0));
    core.on_pointer_up();
    core.on_pointer_up();
    assert!(!core.surface().is_stroking());
}

#[test]
fn eraser_stroke_removes_pixels() {
    let mut core = core();
    core.set_width(6.0);
    stroke(&mut core, pt(10.0, 50.0), pt(90.0, 50.0));
    core.toggle_eraser();
    core.set_width(20.0);
    stroke(&mut core, pt(0.0, 50.0), pt(100.0, 50.0));
    assert!(core.surface().is_blank());
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_closes_open_stroke_first() {
    let mut core = core();
    core.on_pointer_down(pt(10.0, 10.0));
    let actions = core.resize(200, 150).unwrap();
    assert!(has_render_needed(&actions));
    assert!(!core.surface().is_stroking());
    assert_eq!(core.surface().width(), 200);
}

#[test]
fn resize_to_zero_is_error() {
    let mut core = core();
    assert!(matches!(core.resize(0, 5), Err(SurfaceError::ZeroSize { .. })));
}

#[test]
fn load_png_replaces_drawing() {
    let mut source = core();
    stroke(&mut source, pt(10.0, 10.0), pt(40.0, 10.0));
    let png = source.export().unwrap().png;

    let mut target = EngineCore::new(EngineConfig { width: 20, height: 20, ..small_config() });
    target.on_pointer_down(pt(1.0, 1.0));
    let actions = target.load_png(&png).unwrap();
    assert!(has_render_needed(&actions));
    assert!(!target.surface().is_stroking());
    assert_eq!(target.buffer(), source.buffer());
}

#[test]
fn load_png_rejects_garbage() {
    let mut core = core();
    let err = core.load_png(b"nope").unwrap_err();
    assert!(matches!(err, ImportError::Decode(_)));
    assert!(core.surface().is_blank());
}

// =============================================================
// Submission lifecycle
// =============================================================

#[test]
fn begin_submission_captures_image_bindings_and_anchor() {
    let mut core = core();
    stroke(&mut core, pt(20.0, 40.0), pt(60.0, 40.0));
    let ticket = core.begin_submission().unwrap();
    assert!(ticket.image.png.starts_with(b"\x89PNG"));
    assert!(ticket.bindings.is_empty());
    assert!((ticket.anchor.x - 40.0).abs() < 1.5);
    assert!((ticket.anchor.y - 40.0).abs() < 1.5);
    assert!(core.is_submitting());
    assert_eq!(core.pending_anchor(), Some(ticket.anchor));
}

#[test]
fn second_submission_while_in_flight_is_rejected() {
    let mut core = core();
    let _ticket = core.begin_submission().unwrap();
    let err = core.begin_submission().unwrap_err();
    assert!(matches!(err, SubmitError::InFlight));
    assert_eq!(err.error_code(), "E_IN_FLIGHT");
}

#[test]
fn submission_allowed_again_after_completion() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![]);
    assert!(!core.is_submitting());
    assert!(core.begin_submission().is_ok());
}

#[test]
fn submission_allowed_again_after_failure() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.fail_submission(ticket, "E_NETWORK", "down".into());
    assert!(!core.is_submitting());
    assert!(core.begin_submission().is_ok());
}

#[test]
fn blank_surface_anchor_is_origin() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    assert_eq!(ticket.anchor, pt(0.0, 0.0));
}

#[test]
fn bindings_round_trip_into_next_ticket() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![assign("y", "3")]);
    let next = core.begin_submission().unwrap();
    assert_eq!(next.bindings.get("y").map(String::as_str), Some("3"));
}

// =============================================================
// Scenarios
// =============================================================

#[test]
fn assignment_result_updates_bindings() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![assign("x", "5")]);
    let mut expected = Bindings::new();
    expected.insert("x".into(), "5".into());
    assert_eq!(core.bindings(), expected);
}

#[test]
fn expression_result_creates_one_overlay_and_leaves_bindings() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    let actions = core.complete_submission(ticket, vec![expr("2+2", "4")]);
    assert!(has_action(&actions, |a| matches!(a, Action::OverlaysChanged)));
    assert!(core.bindings().is_empty());
    assert_eq!(core.overlays().len(), 1);
    assert_eq!(core.overlays().all()[0].content(), "2+2 = 4");
}

#[test]
fn square_anchor_seeds_all_overlays_of_batch() {
    let mut core = core();
    for y in 10..14 {
        for x in 10..14 {
            core.surface.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    let ticket = core.begin_submission().unwrap();
    assert_eq!(ticket.anchor, pt(11.5, 11.5));
    core.complete_submission(ticket, vec![expr("a", "1"), expr("b", "2"), assign("c", "3")]);
    assert_eq!(core.overlays().len(), 3);
    for o in core.overlays().all() {
        assert_eq!(o.position, pt(11.5, 11.5));
    }
}

#[test]
fn mixed_batch_applies_assignments_in_order() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![assign("x", "1"), expr("x+1", "2"), assign("x", "9")]);
    assert_eq!(core.bindings().get("x").map(String::as_str), Some("9"));
    assert_eq!(core.overlays().len(), 3);
}

// =============================================================
// Failure handling
// =============================================================

#[test]
fn failure_surfaces_error_and_leaves_state() {
    let mut core = core();
    let first = core.begin_submission().unwrap();
    core.complete_submission(first, vec![assign("x", "5")]);
    let overlays_before = core.overlays().len();

    let ticket = core.begin_submission().unwrap();
    let actions = core.fail_submission(ticket, "E_SERVER", "HTTP 500".into());
    assert_eq!(actions, vec![Action::ShowError { code: "E_SERVER", message: "HTTP 500".into() }]);
    assert_eq!(core.bindings().get("x").map(String::as_str), Some("5"));
    assert_eq!(core.overlays().len(), overlays_before);
    assert!(core.pending_anchor().is_none());
}

// =============================================================
// Reveal timing
// =============================================================

#[test]
fn overlays_hidden_until_delay_elapses() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![expr("1+1", "2")]);
    assert_eq!(core.overlays().visible().count(), 0);
    assert_eq!(core.next_reveal_in_ms(), Some(1000));

    assert!(core.tick(999).is_empty());
    let actions = core.tick(1);
    assert_eq!(core.overlays().visible().count(), 1);
    assert_eq!(typeset_list(&actions), Some(&vec![r"\(\LARGE{1+1 = 2}\)".to_owned()]));
    assert_eq!(core.next_reveal_in_ms(), None);
}

#[test]
fn whole_batch_reveals_at_the_same_instant() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![expr("a", "1"), expr("b", "2"), expr("c", "3")]);
    core.tick(1000);
    assert_eq!(core.overlays().visible().count(), 3);
}

#[test]
fn reveal_clears_drawing_when_configured() {
    let mut core = core();
    stroke(&mut core, pt(10.0, 10.0), pt(50.0, 50.0));
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![expr("e", "1")]);
    assert!(!core.surface().is_blank());
    let actions = core.tick(1000);
    assert!(has_render_needed(&actions));
    assert!(core.surface().is_blank());
}

#[test]
fn reveal_keeps_drawing_when_disabled() {
    let mut core = EngineCore::new(EngineConfig { clear_on_reveal: false, ..small_config() });
    stroke(&mut core, pt(10.0, 10.0), pt(50.0, 50.0));
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![expr("e", "1")]);
    let actions = core.tick(1000);
    assert!(!has_render_needed(&actions));
    assert!(!core.surface().is_blank());
}

#[test]
fn typeset_list_accumulates_across_batches() {
    let mut core = core();
    let t1 = core.begin_submission().unwrap();
    core.complete_submission(t1, vec![expr("a", "1")]);
    core.tick(1000);
    let t2 = core.begin_submission().unwrap();
    core.complete_submission(t2, vec![expr("b", "2")]);
    let actions = core.tick(1000);
    assert_eq!(
        typeset_list(&actions),
        Some(&vec![r"\(\LARGE{a = 1}\)".to_owned(), r"\(\LARGE{b = 2}\)".to_owned()])
    );
}

#[test]
fn empty_result_list_schedules_nothing() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    assert!(core.complete_submission(ticket, vec![]).is_empty());
    assert_eq!(core.next_reveal_in_ms(), None);
}

// =============================================================
// Dragging
// =============================================================

#[test]
fn move_overlay_changes_only_target() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![expr("a", "1"), expr("b", "2")]);
    let ids: Vec<OverlayId> = core.overlays().all().iter().map(|o| o.id).collect();
    let actions = core.move_overlay(&ids[0], pt(70.0, 80.0));
    assert_eq!(actions, vec![Action::OverlaysChanged]);
    assert_eq!(core.overlays().get(&ids[0]).unwrap().position, pt(70.0, 80.0));
    assert_eq!(core.overlays().get(&ids[1]).unwrap().position, pt(0.0, 0.0));
}

#[test]
fn dragged_overlay_survives_later_submission() {
    let mut core = core();
    let t1 = core.begin_submission().unwrap();
    core.complete_submission(t1, vec![expr("a", "1")]);
    let id = core.overlays().all()[0].id;
    core.move_overlay(&id, pt(5.0, 95.0));

    stroke(&mut core, pt(40.0, 40.0), pt(60.0, 60.0));
    let t2 = core.begin_submission().unwrap();
    core.complete_submission(t2, vec![expr("b", "2")]);
    core.tick(1000);
    assert_eq!(core.overlays().get(&id).unwrap().position, pt(5.0, 95.0));
}

#[test]
fn move_unknown_overlay_is_noop() {
    let mut core = core();
    assert!(core.move_overlay(&uuid::Uuid::new_v4(), pt(1.0, 1.0)).is_empty());
}

// =============================================================
// Reset
// =============================================================

#[test]
fn reset_clears_everything_at_once() {
    let mut core = core();
    stroke(&mut core, pt(10.0, 10.0), pt(50.0, 50.0));
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![assign("x", "5"), expr("x*2", "10")]);
    core.on_pointer_down(pt(20.0, 20.0));

    let actions = core.reset();
    assert!(core.surface().is_blank());
    assert!(!core.surface().is_stroking());
    assert!(core.bindings().is_empty());
    assert!(core.overlays().is_empty());
    assert!(core.pending_anchor().is_none());
    assert_eq!(core.next_reveal_in_ms(), None);
    assert_eq!(typeset_list(&actions), Some(&Vec::new()));
}

#[test]
fn results_arriving_after_reset_are_discarded() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.reset();
    let actions = core.complete_submission(ticket, vec![assign("x", "5"), expr("1+1", "2")]);
    assert!(actions.is_empty());
    assert!(core.bindings().is_empty());
    assert!(core.overlays().is_empty());
}

#[test]
fn failure_arriving_after_reset_is_discarded() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.reset();
    assert!(core.fail_submission(ticket, "E_NETWORK", "x".into()).is_empty());
}

#[test]
fn reset_releases_in_flight_slot() {
    let mut core = core();
    let stale = core.begin_submission().unwrap();
    core.reset();
    let fresh = core.begin_submission().unwrap();
    assert!(core.complete_submission(stale, vec![expr("old", "1")]).is_empty());
    assert!(core.is_submitting());
    core.complete_submission(fresh, vec![expr("new", "2")]);
    assert_eq!(core.overlays().len(), 1);
    assert_eq!(core.overlays().all()[0].expression, "new");
}

#[test]
fn reset_cancels_pending_reveals() {
    let mut core = core();
    let ticket = core.begin_submission().unwrap();
    core.complete_submission(ticket, vec![expr("a", "1")]);
    core.reset();
    assert!(core.tick(5000).is_empty());
}

#[test]
fn export_matches_buffer_dimensions() {
    let core = core();
    let capture = core.export().unwrap();
    assert_eq!((capture.width, capture.height), (100, 100));
}
