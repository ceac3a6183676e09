pub mod voice;

pub use voice::{MicState, VoiceCapture, VoiceError};
