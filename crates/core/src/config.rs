use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Prefix of environment variables read by [`TriageCfg::from_env`].
pub const ENV_PREFIX: &str = "TRIAGE_";

/// How a non-priority reply appears once the typing indicator is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    /// One character per `char_delay_ms`.
    Progressive,
    /// Replace the indicator with the full text.
    Instant,
}

impl FromStr for RevealMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "progressive" => Ok(RevealMode::Progressive),
            "instant" => Ok(RevealMode::Instant),
            other => Err(format!("unknown reveal mode: {other}")),
        }
    }
}

impl std::fmt::Display for RevealMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevealMode::Progressive => f.write_str("progressive"),
            RevealMode::Instant => f.write_str("instant"),
        }
    }
}

/// All triage parameters. Session-scoped; nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageCfg {
    // presentation pacing
    pub char_delay_ms: u64,
    pub indicator_delay_ms: u64,
    pub reveal: RevealMode,

    // voice capture
    pub voice_command: Option<String>,
    pub voice_lang: String,

    // logging
    pub log_path: String,
}

impl Default for TriageCfg {
    fn default() -> Self {
        Self {
            char_delay_ms: 5,
            indicator_delay_ms: 400,
            reveal: RevealMode::Progressive,
            voice_command: None,
            voice_lang: "en-IN".into(),
            log_path: "/tmp/triage.log".into(),
        }
    }
}

impl TriageCfg {
    /// Read `TRIAGE_*` environment variables, falling back to defaults per key.
    pub fn from_env() -> Self {
        let map: HashMap<String, String> = std::env::vars()
            .filter_map(|(k, v)| {
                k.strip_prefix(ENV_PREFIX)
                    .map(|key| (key.to_ascii_lowercase(), v))
            })
            .collect();
        Self::from_map(&map)
    }

    /// Build from string values keyed by field name. Missing or unparsable
    /// values keep their default.
    pub fn from_map(m: &HashMap<String, String>) -> Self {
        let d = Self::default();
        Self {
            char_delay_ms: get_or(m, "char_delay_ms", d.char_delay_ms),
            indicator_delay_ms: get_or(m, "indicator_delay_ms", d.indicator_delay_ms),
            reveal: get_or(m, "reveal", d.reveal),
            voice_command: m
                .get("voice_cmd")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or(d.voice_command),
            voice_lang: get_or(m, "voice_lang", d.voice_lang),
            log_path: get_or(m, "log_path", d.log_path),
        }
    }

    pub fn char_delay(&self) -> Duration {
        Duration::from_millis(self.char_delay_ms)
    }

    pub fn indicator_delay(&self) -> Duration {
        Duration::from_millis(self.indicator_delay_ms)
    }

    /// Key, value, description triples for startup logging.
    pub fn to_entries(&self) -> Vec<(&'static str, String, &'static str)> {
        vec![
            ("char_delay_ms", self.char_delay_ms.to_string(), "Reveal delay per character ms"),
            ("indicator_delay_ms", self.indicator_delay_ms.to_string(), "Typing indicator duration ms"),
            ("reveal", self.reveal.to_string(), "Reveal mode (progressive|instant)"),
            (
                "voice_cmd",
                self.voice_command.clone().unwrap_or_default(),
                "Speech-to-text command (empty = voice disabled)",
            ),
            ("voice_lang", self.voice_lang.clone(), "Voice recognition language"),
            ("log_path", self.log_path.clone(), "Log file when RUST_LOG is set"),
        ]
    }
}

fn get_or<T: FromStr>(map: &HashMap<String, String>, key: &str, default: T) -> T {
    map.get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_widget_pacing() {
        let cfg = TriageCfg::default();
        assert_eq!(cfg.char_delay(), Duration::from_millis(5));
        assert_eq!(cfg.indicator_delay(), Duration::from_millis(400));
        assert_eq!(cfg.reveal, RevealMode::Progressive);
        assert!(cfg.voice_command.is_none());
        assert_eq!(cfg.voice_lang, "en-IN");
    }

    #[test]
    fn from_map_overrides_known_keys() {
        let cfg = TriageCfg::from_map(&map(&[
            ("char_delay_ms", "20"),
            ("reveal", "Instant"),
            ("voice_cmd", "whisper-cli --once"),
        ]));
        assert_eq!(cfg.char_delay_ms, 20);
        assert_eq!(cfg.reveal, RevealMode::Instant);
        assert_eq!(cfg.voice_command.as_deref(), Some("whisper-cli --once"));
        assert_eq!(cfg.indicator_delay_ms, 400);
    }

    #[test]
    fn from_map_keeps_defaults_on_bad_values() {
        let cfg = TriageCfg::from_map(&map(&[
            ("char_delay_ms", "fast"),
            ("reveal", "sideways"),
            ("voice_cmd", "   "),
        ]));
        assert_eq!(cfg.char_delay_ms, 5);
        assert_eq!(cfg.reveal, RevealMode::Progressive);
        assert!(cfg.voice_command.is_none());
    }

    #[test]
    fn entries_cover_every_field() {
        let keys: Vec<_> = TriageCfg::default()
            .to_entries()
            .into_iter()
            .map(|(k, _, _)| k)
            .collect();
        assert_eq!(
            keys,
            ["char_delay_ms", "indicator_delay_ms", "reveal", "voice_cmd", "voice_lang", "log_path"]
        );
    }
}
