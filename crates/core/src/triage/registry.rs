//! Static keyword registries and canned replies.
//!
//! Every phrase is a lowercase literal. Order matters only for logging:
//! the first phrase found is the one reported.

use crate::types::ContactAction;

/// An ordered, immutable set of lowercase trigger phrases.
#[derive(Debug, Clone, Copy)]
pub struct PhraseSet {
    name: &'static str,
    phrases: &'static [&'static str],
}

impl PhraseSet {
    pub const fn new(name: &'static str, phrases: &'static [&'static str]) -> Self {
        Self { name, phrases }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phrases(&self) -> &'static [&'static str] {
        self.phrases
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.phrases.iter().copied()
    }
}

pub const EMERGENCY: PhraseSet = PhraseSet::new(
    "emergency",
    &[
        "chest pain",
        "heart attack",
        "can't breathe",
        "cannot breathe",
        "severe bleeding",
        "stroke",
        "unconscious",
        "seizure",
        "fainted",
    ],
);

pub const MENTAL_HEALTH: PhraseSet = PhraseSet::new(
    "mental_health",
    &[
        "suicide",
        "kill myself",
        "self harm",
        "end my life",
        "hopeless",
        "depressed",
    ],
);

/// A generic health topic: any trigger phrase selects its reply.
#[derive(Debug, Clone, Copy)]
pub struct TopicRule {
    pub triggers: PhraseSet,
    pub reply: &'static str,
}

/// Checked in order, first match wins.
pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        triggers: PhraseSet::new("fever", &["fever"]),
        reply: "Fever is commonly caused by infection. Stay hydrated and rest. \
                If fever persists for more than 2 days or is very high, consult a doctor.",
    },
    TopicRule {
        triggers: PhraseSet::new("headache", &["headache"]),
        reply: "Headaches can result from stress, dehydration, or lack of sleep. \
                Rest and proper hydration may help. \
                Seek medical advice if headaches are severe or frequent.",
    },
    TopicRule {
        triggers: PhraseSet::new("cold_cough", &["cold", "cough"]),
        reply: "Common cold and cough usually resolve on their own. \
                Warm fluids and rest may help. \
                Consult a healthcare professional if symptoms worsen.",
    },
];

pub const FALLBACK_REPLY: &str = "I can provide general health information, \
    but I am not a substitute for a medical professional. \
    Please consult a doctor for accurate diagnosis and treatment.";

pub const EMERGENCY_HEADLINE: &str = "🚨 MEDICAL EMERGENCY DETECTED\n\n🇮🇳 Call immediately:";

pub const MENTAL_HEALTH_REPLY: &str = "🧠 I’m really sorry you’re feeling this way.
Help is available in India:

📞 KIRAN Mental Health Helpline: 1800-599-0019
🚨 Emergency: 112

Please talk to a trusted person or seek professional help.";

pub const AMBULANCE_NUMBER: &str = "108";
pub const EMERGENCY_NUMBER: &str = "112";
pub const KIRAN_HELPLINE: &str = "1800-599-0019";

/// Ambulance, general emergency, mental-health helpline, in that order.
pub fn emergency_contacts() -> Vec<ContactAction> {
    vec![
        ContactAction::new("🚑 Ambulance (108)", AMBULANCE_NUMBER),
        ContactAction::new("🚓 Emergency (112)", EMERGENCY_NUMBER),
        ContactAction::new("🧠 KIRAN Mental Health", KIRAN_HELPLINE),
    ]
}
