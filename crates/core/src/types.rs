use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority tag of a response. Emergency outranks everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Emergency,
    MentalHealth,
    GenericHealth,
    Fallback,
}

impl Category {
    /// Rank in the selection order: 0 is checked first.
    pub fn priority(self) -> u8 {
        match self {
            Category::Emergency => 0,
            Category::MentalHealth => 1,
            Category::GenericHealth => 2,
            Category::Fallback => 3,
        }
    }

    /// Safety responses render at once and never go through the typing animation.
    pub fn is_priority(self) -> bool {
        matches!(self, Category::Emergency | Category::MentalHealth)
    }

    /// Styling hook for the front-end. Both safety categories share the emergency style.
    pub fn style_class(self) -> &'static str {
        if self.is_priority() { "emergency" } else { "" }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Category {
    /// Higher priority compares greater.
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority().cmp(&self.priority())
    }
}

/// A dialable contact shown in the emergency banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactAction {
    pub label: String,
    pub number: String,
}

impl ContactAction {
    pub fn new(label: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            number: number.into(),
        }
    }

    /// `tel:` URI with separators stripped, e.g. `tel:18005990019`.
    pub fn tel_uri(&self) -> String {
        let digits: String = self.number.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("tel:{digits}")
    }
}

/// What a response shows: plain text or a headline with contact actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Text { text: String },
    Actions { headline: String, actions: Vec<ContactAction> },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text { text: text.into() }
    }

    /// Plain text rendering used for the chat log and the reveal animation.
    pub fn display_text(&self) -> String {
        match self {
            Payload::Text { text } => text.clone(),
            Payload::Actions { headline, actions } => {
                let mut out = headline.clone();
                out.push('\n');
                for action in actions {
                    out.push('\n');
                    out.push_str(&action.label);
                }
                out
            }
        }
    }

    pub fn actions(&self) -> &[ContactAction] {
        match self {
            Payload::Text { .. } => &[],
            Payload::Actions { actions, .. } => actions,
        }
    }
}

/// The single result of evaluating one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub category: Category,
    pub payload: Payload,
}

impl Response {
    pub fn new(category: Category, payload: Payload) -> Self {
        Self { category, payload }
    }
}

/// Who produced a turn in the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
    /// Capability notices (voice unsupported, microphone errors).
    System,
}

/// One entry of the append-only chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub sender: Sender,
    pub category: Option<Category>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ContactAction>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::with(Sender::User, None, content.into(), Vec::new())
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with(Sender::System, None, content.into(), Vec::new())
    }

    /// A bot turn carrying the full payload of `response`.
    pub fn bot(response: &Response) -> Self {
        Self::with(
            Sender::Bot,
            Some(response.category),
            response.payload.display_text(),
            response.payload.actions().to_vec(),
        )
    }

    /// An empty bot turn that the reveal animation fills in.
    pub fn bot_pending(category: Category) -> Self {
        Self::with(Sender::Bot, Some(category), String::new(), Vec::new())
    }

    fn with(
        sender: Sender,
        category: Option<Category>,
        content: String,
        actions: Vec<ContactAction>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            category,
            content,
            actions,
            timestamp: Utc::now(),
        }
    }

    pub fn style_class(&self) -> &'static str {
        self.category.map(Category::style_class).unwrap_or("")
    }
}
