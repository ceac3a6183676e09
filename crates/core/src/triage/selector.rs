//! Response selection: fixed priority, first match wins.
//!
//! Emergency > mental health > generic health topic > fallback. The order is
//! a safety policy: a message mentioning both "chest pain" and "fever" must
//! produce the emergency banner.

use super::matcher;
use super::registry::{
    self, EMERGENCY, EMERGENCY_HEADLINE, FALLBACK_REPLY, MENTAL_HEALTH, MENTAL_HEALTH_REPLY,
    TOPIC_RULES,
};
use crate::types::{Category, Payload, Response};

/// Select the response for `message`. Total over all strings.
pub fn select(message: &str) -> Response {
    let (response, matched) = classify(message);
    tracing::debug!(
        category = ?response.category,
        matched = matched.unwrap_or(""),
        "response selected"
    );
    response
}

/// Select for user input, or `None` when the input is empty or whitespace-only.
pub fn respond(message: &str) -> Option<Response> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(select(trimmed))
}

fn classify(message: &str) -> (Response, Option<&'static str>) {
    if let Some(phrase) = matcher::first_match(message, &EMERGENCY) {
        let payload = Payload::Actions {
            headline: EMERGENCY_HEADLINE.to_string(),
            actions: registry::emergency_contacts(),
        };
        return (Response::new(Category::Emergency, payload), Some(phrase));
    }

    if let Some(phrase) = matcher::first_match(message, &MENTAL_HEALTH) {
        let payload = Payload::text(MENTAL_HEALTH_REPLY);
        return (Response::new(Category::MentalHealth, payload), Some(phrase));
    }

    for rule in TOPIC_RULES {
        if let Some(phrase) = matcher::first_match(message, &rule.triggers) {
            let payload = Payload::text(rule.reply);
            return (Response::new(Category::GenericHealth, payload), Some(phrase));
        }
    }

    (Response::new(Category::Fallback, Payload::text(FALLBACK_REPLY)), None)
}
