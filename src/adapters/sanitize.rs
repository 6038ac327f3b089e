//! Log sanitization for survey answers, contact details and secrets.
//!
//! Formatted log lines are scanned before they reach the sink and the
//! following are replaced:
//! - answers to sensitive survey questions written as `field=value` or
//!   `"field": "value"` (self-harm, suicidal thoughts, depression, ...)
//! - email addresses and phone numbers
//! - UUIDs
//! - bearer tokens, JWTs and long hex key material
//!
//! Handlers avoid logging raw answers in the first place; this is the
//! fallback for anything that slips through (e.g. a serde error echoing
//! the request body).
//!
//! Input is capped at `HARBOR_SANITIZE_MAX_BYTES` (default 16 KiB) per line.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

use crate::domain::SurveyField;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Pattern {
    regex: Regex,
    replacement: String,
}

struct Patterns {
    /// Index 0 is the sensitive-answer key; `i + 1` is `rules[i]`.
    set: RegexSet,
    answer_key: Regex,
    answer_end: Regex,
    rules: Vec<Pattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("HARBOR_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

const REDACTED_ANSWER: &str = "[REDACTED-ANSWER]";

/// The `field=`, `field: ` or `"field": ` prefix of a sensitive answer.
fn sensitive_key_pattern() -> String {
    let names: Vec<&str> = SurveyField::ALL
        .into_iter()
        .filter(|f| f.is_sensitive())
        .map(SurveyField::column)
        .collect();
    format!(r#"(?i)\b(?:{})"?\s*[:=]\s*"#, names.join("|"))
}

/// Where an unquoted answer stops: the next `, key=` / `, key:`, a closing
/// brace or the end of the line. Answers may contain spaces and commas.
const ANSWER_END: &str = r#",\s*"?[A-Za-z_][A-Za-z0-9_]*"?\s*[:=]|[}\n]"#;

fn redact_answers(input: &str, key: &Regex, end: &Regex) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for m in key.find_iter(input) {
        if m.start() < last {
            continue;
        }
        out.push_str(&input[last..m.end()]);

        let rest = &input[m.end()..];
        let value_len = match rest.strip_prefix('"') {
            Some(quoted) => quoted.find('"').map_or(rest.len(), |i| i + 2),
            None => end.find(rest).map_or(rest.len(), |e| e.start()),
        };
        out.push_str(REDACTED_ANSWER);
        last = m.end() + value_len;
    }

    out.push_str(&input[last..]);
    out
}

fn get_patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let rules: Vec<(String, &'static str)> = vec![
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}".into(),
                "[REDACTED-UUID]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b".into(),
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b".into(),
                "[REDACTED-PHONE]",
            ),
            (
                r"\beyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\b".into(),
                "[REDACTED-JWT]",
            ),
            (
                r"(?i)\bbearer\s+[A-Za-z0-9._~+/-]{16,}=*".into(),
                "Bearer [REDACTED-TOKEN]",
            ),
            // Model artifact hashes are logged on purpose and are 64 chars.
            (r"\b[0-9a-fA-F]{80,}\b".into(), "[REDACTED-KEY]"),
        ];

        let key_pattern = sensitive_key_pattern();
        let set = RegexSet::new(
            std::iter::once(key_pattern.as_str()).chain(rules.iter().map(|(p, _)| p.as_str())),
        )
        .expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Pattern {
                regex: Regex::new(&pattern).expect("Valid regex"),
                replacement: replacement.to_string(),
            })
            .collect();

        Patterns {
            set,
            answer_key: Regex::new(&key_pattern).expect("Valid regex"),
            answer_end: Regex::new(ANSWER_END).expect("Valid regex"),
            rules,
        }
    })
}

/// Replace every sensitive match in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        if idx == 0 {
            result = redact_answers(&result, &patterns.answer_key, &patterns.answer_end);
            continue;
        }
        let pattern = &patterns.rules[idx - 1];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement.as_str())
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Whether `input` contains anything [`sanitize`] would replace.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    get_patterns().set.is_match(prefix)
}

/// `MakeWriter` wrapper that sanitizes each formatted line before writing.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let sanitized = sanitize(&String::from_utf8_lossy(&line));
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not grow the buffer forever.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}
