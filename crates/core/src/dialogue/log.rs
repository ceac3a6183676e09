use crate::types::{ContactAction, Sender, Turn};

/// Text shown while a reply is pending.
pub const TYPING_INDICATOR: &str = "AI is typing...";

/// Append-only conversation log for one session.
///
/// Turns are never removed or reordered. The typing indicator is not a turn:
/// it is a transient placeholder rendered after the last turn while shown.
#[derive(Debug, Default)]
pub struct ChatLog {
    turns: Vec<Turn>,
    typing: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return its index.
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns from `sender`.
    pub fn count(&self, sender: Sender) -> usize {
        self.turns.iter().filter(|t| t.sender == sender).count()
    }

    pub fn show_typing(&mut self) {
        self.typing = true;
    }

    /// Remove the indicator. Returns whether it was shown.
    pub fn hide_typing(&mut self) -> bool {
        std::mem::replace(&mut self.typing, false)
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Append one character to the turn at `index`.
    pub fn append_char(&mut self, index: usize, ch: char) {
        if let Some(turn) = self.turns.get_mut(index) {
            turn.content.push(ch);
        }
    }

    /// Replace the content of the turn at `index` (reply completion).
    pub fn set_content(&mut self, index: usize, content: String) {
        if let Some(turn) = self.turns.get_mut(index) {
            turn.content = content;
        }
    }

    /// Contact actions of the most recent turn that has any.
    pub fn latest_actions(&self) -> &[ContactAction] {
        self.turns
            .iter()
            .rev()
            .find(|t| !t.actions.is_empty())
            .map(|t| t.actions.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::select;

    #[test]
    fn typing_indicator_toggles() {
        let mut log = ChatLog::new();
        assert!(!log.hide_typing());
        log.show_typing();
        assert!(log.is_typing());
        assert!(log.hide_typing());
        assert!(!log.is_typing());
        assert!(log.is_empty());
    }

    #[test]
    fn append_builds_content_in_place() {
        let mut log = ChatLog::new();
        log.push(Turn::user("fever"));
        let idx = log.push(Turn::bot_pending(crate::types::Category::GenericHealth));
        for ch in "ok".chars() {
            log.append_char(idx, ch);
        }
        assert_eq!(log.turns()[idx].content, "ok");
        log.set_content(idx, "done".into());
        assert_eq!(log.turns()[idx].content, "done");
        // Out of range is a no-op.
        log.append_char(99, 'x');
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn latest_actions_from_newest_banner() {
        let mut log = ChatLog::new();
        assert!(log.latest_actions().is_empty());
        log.push(Turn::bot(&select("stroke")));
        log.push(Turn::bot(&select("fever")));
        assert_eq!(log.latest_actions().len(), 3);
        assert_eq!(log.count(Sender::Bot), 2);
    }
}
