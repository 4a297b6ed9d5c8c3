//! Strings for the math-typesetting collaborator.
//!
//! The core never typesets; it produces inline-math source and leaves layout
//! to whatever engine the host embeds.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

/// Inline-math source for one result: `\(\LARGE{expr = result}\)`.
#[must_use]
pub fn latex(expression: &str, result: &str) -> String {
    format!("\\(\\LARGE{{{expression} = {result}}}\\)")
}
