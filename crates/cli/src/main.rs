mod event;
mod tui;
mod widgets;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::config::TriageCfg;
use triage_core::io::voice::{self, VoiceCapture};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Panic hook: restore terminal even on panic in raw mode
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        default_hook(info);
    }));

    let cfg = TriageCfg::from_env();

    // Tracing: write to file when RUST_LOG is set (raw mode breaks stderr)
    if std::env::var("RUST_LOG").is_ok() {
        let file = std::fs::File::create(&cfg.log_path)?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().json().with_target(true).with_writer(file))
            .init();
    }
    for (key, value, desc) in cfg.to_entries() {
        tracing::debug!(key, value = %value, desc, "config");
    }

    let voice: Option<Arc<dyn VoiceCapture>> = voice::from_cfg(&cfg).map(|v| {
        tracing::info!(command = v.name(), "voice capture enabled");
        Arc::new(v) as _
    });
    if voice.is_none() {
        tracing::warn!("TRIAGE_VOICE_CMD not set, text input only");
    }

    let token = CancellationToken::new();
    spawn_signal_canceler(token.clone());

    tui::run_app(cfg, voice, token).await
}

/// Cancel the UI on SIGTERM so the terminal is restored before exit.
fn spawn_signal_canceler(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    let _ = sigterm.recv().await;
                    tracing::info!("received SIGTERM, shutting down");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to register SIGTERM handler");
                    return;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received Ctrl+C, shutting down");
        }
        token.cancel();
    });
}
