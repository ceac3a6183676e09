//! Rule-based health triage: keyword registries, priority response
//! selection, and the presentation sequencer that paces replies.

pub mod config;
pub mod dialogue;
pub mod io;
pub mod triage;
pub mod types;
