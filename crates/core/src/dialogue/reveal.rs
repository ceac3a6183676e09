//! Cancellable reveal task: typing indicator delay, then character frames.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::RevealMode;

/// A step of a reveal, tagged with the generation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealFrame {
    /// Indicator delay elapsed; content starts.
    Begin { generation: u64 },
    Char { generation: u64, ch: char },
    Finished { generation: u64 },
    /// Instant mode: indicator replaced by the full text.
    Whole { generation: u64 },
}

impl RevealFrame {
    pub fn generation(&self) -> u64 {
        match *self {
            RevealFrame::Begin { generation }
            | RevealFrame::Char { generation, .. }
            | RevealFrame::Finished { generation }
            | RevealFrame::Whole { generation } => generation,
        }
    }
}

pub type FrameSender = mpsc::UnboundedSender<RevealFrame>;
pub type FrameReceiver = mpsc::UnboundedReceiver<RevealFrame>;

pub fn channel() -> (FrameSender, FrameReceiver) {
    mpsc::unbounded_channel()
}

/// Pacing for a single reveal.
#[derive(Debug, Clone)]
pub struct RevealPlan {
    pub generation: u64,
    pub text: String,
    pub indicator_delay: Duration,
    pub char_delay: Duration,
    pub mode: RevealMode,
}

impl RevealPlan {
    /// Zero per-character delay degrades to an instant reveal.
    fn is_instant(&self) -> bool {
        self.mode == RevealMode::Instant || self.char_delay.is_zero()
    }
}

/// Drive one reveal, emitting frames until done or cancelled.
/// Nothing is sent after cancellation is observed.
pub async fn run(plan: RevealPlan, token: CancellationToken, tx: FrameSender) {
    let generation = plan.generation;

    tokio::select! {
        _ = token.cancelled() => return,
        _ = tokio::time::sleep(plan.indicator_delay) => {}
    }

    if plan.is_instant() {
        let _ = tx.send(RevealFrame::Whole { generation });
        return;
    }

    if tx.send(RevealFrame::Begin { generation }).is_err() {
        return;
    }

    let mut ticker = tokio::time::interval(plan.char_delay);
    // First tick completes immediately.
    ticker.tick().await;
    for ch in plan.text.chars() {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }
        if tx.send(RevealFrame::Char { generation, ch }).is_err() {
            return;
        }
    }

    if !token.is_cancelled() {
        let _ = tx.send(RevealFrame::Finished { generation });
    }
}

/// Owns the single active reveal handle. Starting a new reveal cancels the previous one.
#[derive(Debug, Default)]
pub struct RevealController {
    current: Option<(u64, CancellationToken)>,
    last_generation: u64,
}

impl RevealController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a generation and token for a new reveal, cancelling any previous one.
    pub fn start(&mut self) -> (u64, CancellationToken) {
        self.cancel_current();
        self.last_generation += 1;
        let token = CancellationToken::new();
        self.current = Some((self.last_generation, token.clone()));
        (self.last_generation, token)
    }

    /// Cancel the active reveal. Returns whether one was active.
    pub fn cancel_current(&mut self) -> bool {
        match self.current.take() {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Release the handle of a reveal that completed on its own.
    pub fn finish(&mut self, generation: u64) {
        if self.is_current(generation) {
            self.current = None;
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current.as_ref().is_some_and(|(g, _)| *g == generation)
    }

    pub fn has_active(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|(_, t)| !t.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(text: &str, mode: RevealMode, char_ms: u64) -> RevealPlan {
        RevealPlan {
            generation: 7,
            text: text.into(),
            indicator_delay: Duration::from_millis(400),
            char_delay: Duration::from_millis(char_ms),
            mode,
        }
    }

    async fn collect(mut rx: FrameReceiver) -> Vec<RevealFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn start_cancels_previous_reveal() {
        let mut ctrl = RevealController::new();
        let (g1, t1) = ctrl.start();
        assert!(!t1.is_cancelled());

        let (g2, _t2) = ctrl.start();
        assert!(t1.is_cancelled());
        assert!(g2 > g1);
        assert!(ctrl.is_current(g2));
        assert!(!ctrl.is_current(g1));
    }

    #[test]
    fn finish_releases_without_cancelling() {
        let mut ctrl = RevealController::new();
        assert!(!ctrl.has_active());
        let (g, t) = ctrl.start();
        assert!(ctrl.has_active());
        ctrl.finish(g);
        assert!(!ctrl.has_active());
        assert!(!t.is_cancelled());
        assert!(!ctrl.cancel_current());
    }

    #[tokio::test(start_paused = true)]
    async fn progressive_emits_each_char_in_order() {
        let (tx, rx) = channel();
        run(plan("hi!", RevealMode::Progressive, 5), CancellationToken::new(), tx).await;
        let frames = collect(rx).await;
        assert_eq!(
            frames,
            vec![
                RevealFrame::Begin { generation: 7 },
                RevealFrame::Char { generation: 7, ch: 'h' },
                RevealFrame::Char { generation: 7, ch: 'i' },
                RevealFrame::Char { generation: 7, ch: '!' },
                RevealFrame::Finished { generation: 7 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_char_delay_is_instant() {
        let (tx, rx) = channel();
        run(plan("hello", RevealMode::Progressive, 0), CancellationToken::new(), tx).await;
        assert_eq!(collect(rx).await, vec![RevealFrame::Whole { generation: 7 }]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_indicator_delay_sends_nothing() {
        let (tx, rx) = channel();
        let token = CancellationToken::new();
        token.cancel();
        run(plan("hello", RevealMode::Instant, 5), token, tx).await;
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn indicator_delay_precedes_first_frame() {
        let (tx, mut rx) = channel();
        let start = tokio::time::Instant::now();
        tokio::spawn(run(plan("a", RevealMode::Progressive, 5), CancellationToken::new(), tx));
        let first = rx.recv().await.unwrap();
        assert_eq!(first, RevealFrame::Begin { generation: 7 });
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
