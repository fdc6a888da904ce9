//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits: record store, notification channels,
//! clocks, code sources, and the store wrappers tests rely on.

mod channels;
mod clock;
mod code_source;
mod memory_store;
mod test_doubles;

pub use channels::{
    LogEmailChannel, LogSmsChannel, RecordingEmailChannel, RecordingSmsChannel, SentEmail,
    SentSms,
};
pub use clock::{ManualClock, SystemClock};
pub use code_source::{RandomCodeSource, ScriptedCodeSource};
pub use memory_store::InMemoryOtpStore;
pub use test_doubles::{FaultyStore, SpyStore, StoreCalls};
