pub mod log;
pub mod reveal;
pub mod sequencer;

pub use log::{ChatLog, TYPING_INDICATOR};
pub use reveal::{FrameReceiver, RevealFrame};
pub use sequencer::{Sequencer, SequencerState};
