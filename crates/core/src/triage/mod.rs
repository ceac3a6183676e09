pub mod matcher;
pub mod registry;
pub mod selector;

pub use registry::PhraseSet;
pub use selector::{respond, select};
