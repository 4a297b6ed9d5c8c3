//! Drawing and result-overlay engine for the handwritten-math board.
//!
//! This crate owns everything that happens on the client between pointer
//! input and the evaluation round trip: the pixel buffer and its stroke state
//! machine, PNG capture, variable bindings, anchor placement and the result
//! overlays. It performs no I/O; the host drives it through
//! [`engine::EngineCore`], performs the network call itself, and feeds the
//! outcome back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Controller owning all state; emits [`engine::Action`]s |
//! | [`surface`] | Pixel buffer and stroke state machine |
//! | [`input`] | Brush settings, color parsing, stroke states |
//! | [`capture`] | Lossless PNG export and data URIs |
//! | [`vars`] | Evaluation results and the variable store |
//! | [`locate`] | Bounding box of drawn content, overlay anchor |
//! | [`overlay`] | Draggable result overlays |
//! | [`clock`] | Virtual clock for delayed reveals |
//! | [`render`] | Strings for the typesetting collaborator |
//! | [`geom`] | Points and rectangles |
//! | [`consts`] | Shared defaults (brush, surface, reveal delay) |

pub mod capture;
pub mod clock;
pub mod consts;
pub mod engine;
pub mod geom;
pub mod input;
pub mod locate;
pub mod overlay;
pub mod render;
pub mod surface;
pub mod vars;
