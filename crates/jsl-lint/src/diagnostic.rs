//! # Diagnostics
//!
//! A [`Diagnostic`] names the location, rule and message of one detected
//! pattern. The engine hands each one to a caller-supplied [`Reporter`]
//! and keeps nothing.

use serde::Serialize;

use jsl_core::Pointer;

/// One detected pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Location of the offending sub-schema.
    pub pointer: Pointer,
    /// Id of the rule that matched.
    pub rule: String,
    /// The rule's message.
    pub message: String,
}

/// Sink for diagnostics, called in discovery order.
pub trait Reporter {
    /// Receive one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl Reporter for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Reporter that only counts.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingReporter {
    /// Diagnostics received so far.
    pub count: usize,
}

impl Reporter for CountingReporter {
    fn report(&mut self, _diagnostic: Diagnostic) {
        self.count += 1;
    }
}
