//! LRC lyric parsing.
//!
//! The lyrics registry stores either an array of lines or one newline
//! separated string. Only timestamped lines (`[mm:ss]`, `[mm:ss.xx]`,
//! `[mm:ss.xxx]`) with non-empty text are kept.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::model::LyricLine;

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{2}):(\d{2})(?:\.(\d{2,3}))?\](.*)").expect("valid timestamp regex")
});

/// Parse a registry entry. Returns `None` when nothing timestamped is found.
pub fn parse_lyrics(raw: &Value) -> Option<Vec<LyricLine>> {
    match raw {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => parse_lrc(text),
        Value::Array(lines) => collect(lines.iter().filter_map(Value::as_str)),
        other => parse_lrc(&other.to_string()),
    }
}

/// Parse LRC text.
pub fn parse_lrc(text: &str) -> Option<Vec<LyricLine>> {
    collect(text.lines())
}

fn collect<'a>(lines: impl Iterator<Item = &'a str>) -> Option<Vec<LyricLine>> {
    let parsed: Vec<LyricLine> = lines.filter_map(parse_line).collect();
    (!parsed.is_empty()).then_some(parsed)
}

fn parse_line(line: &str) -> Option<LyricLine> {
    let caps = TIMESTAMP.captures(line)?;

    let minutes: f64 = caps[1].parse().ok()?;
    let seconds: f64 = caps[2].parse().ok()?;
    let fraction: f64 = match caps.get(3) {
        Some(m) => format!("0.{}", m.as_str()).parse().ok()?,
        None => 0.0,
    };

    let text = caps[4].trim();
    if text.is_empty() {
        return None;
    }

    Some(LyricLine {
        time: minutes * 60.0 + seconds + fraction,
        text: text.to_string(),
    })
}
