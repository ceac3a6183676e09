use super::registry::PhraseSet;

/// True iff any phrase of `phrases` occurs in `message`, ignoring case.
pub fn matches(message: &str, phrases: &PhraseSet) -> bool {
    first_match(message, phrases).is_some()
}

/// The first phrase (in registry order) contained in `message`.
pub fn first_match(message: &str, phrases: &PhraseSet) -> Option<&'static str> {
    if message.is_empty() {
        return None;
    }
    let lower = message.to_lowercase();
    phrases.iter().find(|p| lower.contains(*p))
}
