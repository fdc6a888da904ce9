//! Code Source Adapters
//!
//! Implements the `CodeSource` port with the CSPRNG and with a fixed script.

use crate::algorithms::generate_code;
use crate::domain::CodeRange;
use crate::ports::outbound::CodeSource;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Codes drawn from the thread-local CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn next_code(&self, range: CodeRange) -> String {
        generate_code(range)
    }
}

/// Hands out a fixed list of codes in order, wrapping around at the end.
///
/// The range is ignored; scripted codes are used as given.
pub struct ScriptedCodeSource {
    codes: Vec<String>,
    next: AtomicUsize,
}

impl ScriptedCodeSource {
    /// Script the given codes. An empty script falls back to random codes.
    pub fn new<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// How many codes have been handed out.
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl CodeSource for ScriptedCodeSource {
    fn next_code(&self, range: CodeRange) -> String {
        if self.codes.is_empty() {
            return generate_code(range);
        }
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.codes[index % self.codes.len()].clone()
    }
}
