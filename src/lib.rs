//! Host side of the handwritten-math board: configuration, the evaluation
//! service client, the async session around the drawing engine, and
//! scripted replay.

pub mod config;
pub mod eval;
pub mod script;
pub mod session;
