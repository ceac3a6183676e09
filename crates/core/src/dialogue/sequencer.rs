//! Presentation sequencer: turns a selected response into log mutations.
//!
//! Per turn: Idle → ShowingTypingIndicator → RevealingContent → Idle.
//! Safety responses skip straight to the full text. Reveal tasks only send
//! frames; every log mutation happens in [`Sequencer::apply`] on the owning
//! loop, so frames from a cancelled reveal can be dropped by generation.

use std::time::Duration;

use crate::config::{RevealMode, TriageCfg};
use crate::triage::selector;
use crate::types::{Category, Response, Turn};

use super::log::ChatLog;
use super::reveal::{self, FrameReceiver, FrameSender, RevealController, RevealFrame, RevealPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    #[default]
    Idle,
    ShowingTypingIndicator,
    RevealingContent,
}

/// Reply whose reveal is in flight.
#[derive(Debug)]
struct PendingReply {
    generation: u64,
    response: Response,
    /// Log index of the bot turn, once content has started.
    turn: Option<usize>,
}

pub struct Sequencer {
    log: ChatLog,
    reveals: RevealController,
    pending: Option<PendingReply>,
    state: SequencerState,
    frame_tx: FrameSender,
    indicator_delay: Duration,
    char_delay: Duration,
    mode: RevealMode,
    cancelled: usize,
}

impl Sequencer {
    /// Create a sequencer and the receiver its reveal frames arrive on.
    /// The caller feeds every received frame back through [`Sequencer::apply`].
    pub fn new(cfg: &TriageCfg) -> (Self, FrameReceiver) {
        let (frame_tx, frame_rx) = reveal::channel();
        let seq = Self {
            log: ChatLog::new(),
            reveals: RevealController::new(),
            pending: None,
            state: SequencerState::Idle,
            frame_tx,
            indicator_delay: cfg.indicator_delay(),
            char_delay: cfg.char_delay(),
            mode: cfg.reveal,
            cancelled: 0,
        };
        (seq, frame_rx)
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Number of reveals interrupted by a newer turn.
    pub fn cancelled_reveals(&self) -> usize {
        self.cancelled
    }

    /// Handle one user submission. Blank input is ignored and returns `None`.
    /// Must be called inside a tokio runtime: animated replies spawn a reveal task.
    pub fn submit(&mut self, text: &str) -> Option<Category> {
        let response = selector::respond(text)?;
        self.interrupt();

        self.log.push(Turn::user(text.trim()));
        let category = response.category;

        if category.is_priority() {
            self.log.push(Turn::bot(&response));
            return Some(category);
        }

        let (generation, token) = self.reveals.start();
        let plan = RevealPlan {
            generation,
            text: response.payload.display_text(),
            indicator_delay: self.indicator_delay,
            char_delay: self.char_delay,
            mode: self.mode,
        };
        self.pending = Some(PendingReply {
            generation,
            response,
            turn: None,
        });
        self.log.show_typing();
        self.state = SequencerState::ShowingTypingIndicator;
        tokio::spawn(reveal::run(plan, token, self.frame_tx.clone()));

        Some(category)
    }

    /// Apply a reveal frame. Frames from stale generations are ignored.
    pub fn apply(&mut self, frame: RevealFrame) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if pending.generation != frame.generation() {
            tracing::trace!(generation = frame.generation(), "stale reveal frame dropped");
            return;
        }

        match frame {
            RevealFrame::Begin { .. } => {
                self.log.hide_typing();
                pending.turn = Some(self.log.push(Turn::bot_pending(pending.response.category)));
                self.state = SequencerState::RevealingContent;
            }
            RevealFrame::Char { ch, .. } => {
                if let Some(index) = pending.turn {
                    self.log.append_char(index, ch);
                }
            }
            RevealFrame::Finished { .. } | RevealFrame::Whole { .. } => self.complete(),
        }
    }

    /// Append a system notice (voice capability messages).
    pub fn notice(&mut self, text: impl Into<String>) {
        self.log.push(Turn::system(text));
    }

    /// Cancel any reveal without flushing it. Used on exit.
    pub fn shutdown(&mut self) {
        self.reveals.cancel_current();
        self.pending = None;
        self.log.hide_typing();
        self.state = SequencerState::Idle;
    }

    /// Cancel the in-flight reveal and show its reply in full, so no turn
    /// is left without an answer and no indicator lingers.
    fn interrupt(&mut self) {
        if self.pending.is_none() {
            return;
        }
        if self.reveals.cancel_current() {
            self.cancelled += 1;
        }
        if let Some(pending) = self.pending.as_ref() {
            tracing::debug!(generation = pending.generation, "reveal interrupted by new turn");
        }
        self.complete();
    }

    fn complete(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.log.hide_typing();
        match pending.turn {
            Some(index) => self.log.set_content(index, pending.response.payload.display_text()),
            None => {
                self.log.push(Turn::bot(&pending.response));
            }
        }
        self.reveals.finish(pending.generation);
        self.state = SequencerState::Idle;
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.reveals.cancel_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sender;

    fn cfg(mode: RevealMode) -> TriageCfg {
        TriageCfg {
            reveal: mode,
            ..TriageCfg::default()
        }
    }

    async fn drain_until_idle(seq: &mut Sequencer, rx: &mut FrameReceiver) {
        while seq.state() != SequencerState::Idle {
            let frame = rx.recv().await.expect("reveal channel closed");
            seq.apply(frame);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_leaves_log_untouched() {
        let (mut seq, _rx) = Sequencer::new(&TriageCfg::default());
        assert_eq!(seq.submit("   "), None);
        assert_eq!(seq.submit(""), None);
        assert!(seq.log().is_empty());
        assert!(!seq.log().is_typing());
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn priority_reply_renders_immediately() {
        let (mut seq, _rx) = Sequencer::new(&TriageCfg::default());
        assert_eq!(seq.submit("I feel hopeless"), Some(Category::MentalHealth));
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(!seq.log().is_typing());
        let turns = seq.log().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].category, Some(Category::MentalHealth));
        assert!(turns[1].content.contains("1800-599-0019"));
    }

    #[tokio::test(start_paused = true)]
    async fn indicator_removed_when_content_begins() {
        let (mut seq, mut rx) = Sequencer::new(&TriageCfg::default());
        seq.submit("fever");
        assert_eq!(seq.state(), SequencerState::ShowingTypingIndicator);
        assert!(seq.log().is_typing());
        assert_eq!(seq.log().len(), 1);

        let begin = rx.recv().await.unwrap();
        assert!(matches!(begin, RevealFrame::Begin { .. }));
        seq.apply(begin);
        assert!(!seq.log().is_typing());
        assert_eq!(seq.state(), SequencerState::RevealingContent);
        assert_eq!(seq.log().turns()[1].content, "");

        seq.apply(rx.recv().await.unwrap());
        assert_eq!(seq.log().turns()[1].content, "F");

        drain_until_idle(&mut seq, &mut rx).await;
        let reply = &seq.log().turns()[1];
        assert_eq!(reply.sender, Sender::Bot);
        assert!(reply.content.starts_with("Fever is commonly caused by infection."));
        assert!(reply.content.ends_with("consult a doctor."));
    }

    #[tokio::test(start_paused = true)]
    async fn instant_mode_replaces_indicator_with_full_text() {
        let (mut seq, mut rx) = Sequencer::new(&cfg(RevealMode::Instant));
        seq.submit("headache");
        let frame = rx.recv().await.unwrap();
        assert!(matches!(frame, RevealFrame::Whole { .. }));
        seq.apply(frame);
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(!seq.log().is_typing());
        assert!(seq.log().turns()[1].content.starts_with("Headaches"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_turn_cancels_active_reveal_exactly_once() {
        let (mut seq, mut rx) = Sequencer::new(&TriageCfg::default());
        seq.submit("fever");
        seq.submit("cold");
        assert_eq!(seq.cancelled_reveals(), 1);

        drain_until_idle(&mut seq, &mut rx).await;

        let log = seq.log();
        assert_eq!(log.count(Sender::User), 2);
        assert_eq!(log.count(Sender::Bot), 2);
        assert!(!log.is_typing());
        let contents: Vec<_> = log.turns().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents[0], "fever");
        assert!(contents[1].starts_with("Fever"));
        assert_eq!(contents[2], "cold");
        assert!(contents[3].starts_with("Common cold"));
        assert!(contents[3].ends_with("if symptoms worsen."));
    }

    #[tokio::test(start_paused = true)]
    async fn emergency_mid_reveal_flushes_previous_reply() {
        let (mut seq, mut rx) = Sequencer::new(&TriageCfg::default());
        seq.submit("fever");
        // Begin plus a few characters.
        for _ in 0..4 {
            seq.apply(rx.recv().await.unwrap());
        }
        assert_eq!(seq.state(), SequencerState::RevealingContent);
        assert_eq!(seq.log().turns()[1].content, "Fev");

        assert_eq!(seq.submit("CHEST PAIN"), Some(Category::Emergency));
        assert_eq!(seq.cancelled_reveals(), 1);
        assert_eq!(seq.state(), SequencerState::Idle);
        let snapshot: Vec<String> = seq.log().turns().iter().map(|t| t.content.clone()).collect();
        assert!(snapshot[1].ends_with("consult a doctor."));
        assert_eq!(seq.log().turns()[3].category, Some(Category::Emergency));
        assert_eq!(seq.log().latest_actions().len(), 3);

        // Anything still queued belongs to the cancelled generation.
        tokio::time::sleep(Duration::from_secs(5)).await;
        while let Ok(frame) = rx.try_recv() {
            seq.apply(frame);
        }
        let after: Vec<String> = seq.log().turns().iter().map(|t| t.content.clone()).collect();
        assert_eq!(after, snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_clears_indicator() {
        let (mut seq, _rx) = Sequencer::new(&TriageCfg::default());
        seq.submit("cough");
        seq.shutdown();
        assert!(!seq.log().is_typing());
        assert_eq!(seq.state(), SequencerState::Idle);
        assert_eq!(seq.log().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notice_is_system_turn() {
        let (mut seq, _rx) = Sequencer::new(&TriageCfg::default());
        seq.notice("Voice input not supported in this terminal.");
        assert_eq!(seq.log().turns()[0].sender, Sender::System);
    }
}
