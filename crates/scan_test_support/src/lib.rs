//! Fixture loading and event-trace helpers for scanner tests.
//!
//! Scenarios live in TOML files: an input document and the expected
//! line-per-event trace of walking it. The trace format is deliberately
//! flat so fixtures stay diffable by eye.

use std::path::Path;
use std::rc::Rc;

use scan::{Navigator, StringSource, Tag};
use serde::Deserialize;

pub mod trace;

pub use trace::trace_events;

/// One fixture file: a list of scenarios.
#[derive(Debug, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub scenario: Vec<Scenario>,
}

/// A single input document and its expected event trace.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub input: String,
    pub events: Vec<String>,
}

/// Load and parse a fixture file, panicking with context on failure (this
/// is test-only tooling).
pub fn load_fixture(path: &Path) -> FixtureFile {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()));
    toml::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse fixture {}: {err}", path.display()))
}

/// Escape control characters and quotes so traces stay single-line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Render a first-mismatch report with a few lines of context, plus a
/// length summary.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;
    let max = expected.len().max(actual.len());
    let missing = "<missing>";
    let mut out = String::new();
    let mismatch = (0..max).find(|&i| {
        expected.get(i).map(String::as_str).unwrap_or(missing)
            != actual.get(i).map(String::as_str).unwrap_or(missing)
    });
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line_idx in start..end {
            let left = expected.get(line_idx).map(String::as_str).unwrap_or(missing);
            let right = actual.get(line_idx).map(String::as_str).unwrap_or(missing);
            let marker = if line_idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line_idx + 1);
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line_idx + 1);
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

pub(crate) fn new_navigator(input: &str) -> Navigator<StringSource> {
    Navigator::new(StringSource::new(input.to_string()))
}

pub(crate) fn describe_open(tag: &Rc<Tag>) -> String {
    use std::fmt::Write;
    let mut line = format!("open {} depth={}", tag.name(), tag.depth());
    if !tag.classes().is_empty() {
        let _ = write!(&mut line, " class={}", tag.classes().join("|"));
    }
    for (key, value) in tag.attributes() {
        let _ = write!(&mut line, " {key}=\"{}\"", escape_text(value));
    }
    if tag.is_self_closing() {
        line.push_str(" self-closing");
    }
    line
}
