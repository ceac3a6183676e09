use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use triage_core::config::TriageCfg;
use triage_core::dialogue::Sequencer;
use triage_core::io::voice::{self, MicState, VoiceCapture, VoiceError};

use crate::event::AppEvent;
use crate::widgets;

type VoiceResult = Result<String, VoiceError>;

/// TUI application state. The sequencer owns the conversation itself.
pub struct App {
    pub seq: Sequencer,
    pub input: String,
    pub cursor: usize,
    pub scroll_offset: u16,
    pub anim_frame: usize,
    pub mic: MicState,
    pub voice_available: bool,
    pub should_exit: bool,
}

impl App {
    fn new(seq: Sequencer, voice_available: bool) -> Self {
        Self {
            seq,
            input: String::new(),
            cursor: 0,
            scroll_offset: 0,
            anim_frame: 0,
            mic: MicState::Ready,
            voice_available,
            should_exit: false,
        }
    }

    /// Submit the input field. Blank input stays in place and nothing is logged.
    fn submit_input(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.input);
        self.cursor = 0;
        if self.seq.submit(&text).is_some() {
            self.scroll_offset = 0;
        }
    }

    /// Fill the input field with a transcript and submit it.
    fn submit_transcript(&mut self, transcript: String) {
        self.input = transcript;
        self.cursor = self.input.len();
        self.submit_input();
    }

    /// Outcome of one capture. The mic goes back to Ready either way; a failure
    /// posts a notice and is not retried.
    fn on_voice_result(&mut self, result: VoiceResult) {
        self.mic = MicState::Ready;
        match result {
            Ok(transcript) => self.submit_transcript(transcript),
            Err(e) => {
                tracing::warn!(error = %e, "voice capture failed");
                self.seq.notice(e.notice());
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.input.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn move_cursor_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor >= self.input.len() {
            return;
        }
        self.cursor = self.input[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.input.len());
    }

    /// Dial the `index`-th contact of the newest emergency banner.
    fn activate_contact(&mut self, index: usize) {
        let Some(action) = self.seq.log().latest_actions().get(index).cloned() else {
            return;
        };
        let uri = action.tel_uri();
        tracing::info!(uri = %uri, label = %action.label, "opening contact action");
        if let Err(e) = open::that_detached(&uri) {
            tracing::warn!(uri = %uri, error = %e, "no handler for contact action");
            self.seq
                .notice(format!("Could not open {uri}. Please dial {} directly.", action.number));
        }
    }
}

/// Run the TUI event loop until the user exits (Ctrl+C) or `token` is cancelled.
pub async fn run_app(
    cfg: TriageCfg,
    voice: Option<Arc<dyn VoiceCapture>>,
    token: CancellationToken,
) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let stop = Arc::new(AtomicBool::new(false));
    let mut event_rx = crate::event::spawn(stop.clone());
    let (voice_tx, mut voice_rx) = mpsc::unbounded_channel::<VoiceResult>();

    let (seq, mut frame_rx) = Sequencer::new(&cfg);
    let mut app = App::new(seq, voice.is_some());

    let mut anim_interval = tokio::time::interval(std::time::Duration::from_millis(80));
    anim_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    terminal.draw(|f| widgets::draw(f, &app))?;

    loop {
        if app.should_exit {
            break;
        }
        tokio::select! {
            _ = token.cancelled() => {
                break;
            }
            evt = event_rx.recv() => {
                let Some(evt) = evt else { break };
                match evt {
                    AppEvent::Key(key) => handle_key(&mut app, key, voice.as_ref(), &voice_tx),
                }
            }
            Some(frame) = frame_rx.recv() => {
                app.seq.apply(frame);
            }
            Some(result) = voice_rx.recv() => app.on_voice_result(result),
            _ = anim_interval.tick() => {
                if app.seq.log().is_typing() || app.mic == MicState::Listening {
                    app.anim_frame = app.anim_frame.wrapping_add(1);
                }
            }
        }
        terminal.draw(|f| widgets::draw(f, &app))?;
    }

    app.seq.shutdown();
    stop.store(true, Ordering::Relaxed);
    terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn handle_key(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    voice: Option<&Arc<dyn VoiceCapture>>,
    voice_tx: &mpsc::UnboundedSender<VoiceResult>,
) {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            app.should_exit = true;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => start_capture(app, voice, voice_tx),
        (_, KeyCode::Enter) => app.submit_input(),
        (_, KeyCode::F(n @ 1..=3)) => app.activate_contact(usize::from(n - 1)),
        (_, KeyCode::Backspace) => app.delete_char_before_cursor(),
        (_, KeyCode::Left) => app.move_cursor_left(),
        (_, KeyCode::Right) => app.move_cursor_right(),
        (_, KeyCode::Up) => {
            app.scroll_offset = app.scroll_offset.saturating_add(1);
        }
        (_, KeyCode::Down) => {
            app.scroll_offset = app.scroll_offset.saturating_sub(1);
        }
        (_, KeyCode::Home) => {
            app.cursor = 0;
        }
        (_, KeyCode::End) => {
            app.cursor = app.input.len();
        }
        (_, KeyCode::Char(c)) => app.insert_char(c),
        _ => {}
    }
}

/// Mic trigger. One capture at a time; failures reset to Ready with a notice.
fn start_capture(
    app: &mut App,
    voice: Option<&Arc<dyn VoiceCapture>>,
    voice_tx: &mpsc::UnboundedSender<VoiceResult>,
) {
    if app.mic == MicState::Listening {
        return;
    }
    let Some(voice) = voice else {
        app.seq.notice(voice::UNSUPPORTED_NOTICE);
        return;
    };

    app.mic = MicState::Listening;
    let voice = Arc::clone(voice);
    let tx = voice_tx.clone();
    tokio::spawn(async move {
        tracing::debug!(backend = voice.name(), "voice capture started");
        let _ = tx.send(voice.capture().await);
    });
}
