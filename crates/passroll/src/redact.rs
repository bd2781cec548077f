//! Cleaning of captured remote output before it is stored in a failure reason.
//!
//! Failure reasons end up in logs and reports, so they must never carry a
//! secret even if the remote terminal echoed one back.

use std::borrow::Cow;

/// Placeholder written in place of a secret.
pub const REDACTED: &str = "[REDACTED]";

/// Maximum number of characters of captured output kept in a reason.
pub const MAX_CAPTURE_CHARS: usize = 500;

/// Replace every occurrence of each secret with [`REDACTED`].
///
/// Matches of all secrets are located in the original text first and
/// overlapping or adjacent matches are merged, so a secret that contains
/// another one is never left partially visible.
#[must_use]
pub fn scrub(text: &str, secrets: &[&str]) -> String {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for secret in secrets.iter().filter(|s| !s.is_empty()) {
        for (start, _) in text.char_indices() {
            if text[start..].starts_with(secret) {
                spans.push((start, start + secret.len()));
            }
        }
    }
    if spans.is_empty() {
        return text.to_string();
    }

    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&text[cursor..start]);
        out.push_str(REDACTED);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Final byte of a CSI sequence.
const fn is_csi_final(c: char) -> bool {
    matches!(c, '\x40'..='\x7e')
}

/// Remove ANSI escape sequences (CSI, OSC, charset designations).
#[must_use]
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains('\x1b') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                for param in chars.by_ref() {
                    if is_csi_final(param) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(osc) = chars.next() {
                    if osc == '\x07' {
                        break;
                    }
                    if osc == '\x1b' {
                        if chars.peek() == Some(&'\\') {
                            chars.next();
                        }
                        break;
                    }
                }
            }
            Some('(' | ')' | '*' | '+') => {
                chars.next();
                chars.next();
            }
            Some(_) => {
                chars.next();
            }
            None => {}
        }
    }

    Cow::Owned(result)
}

/// Turn raw captured output into a single-line, secret-free diagnostic.
///
/// Escape sequences are stripped, whitespace runs collapsed, and the tail of
/// overly long captures kept.
#[must_use]
pub fn capture_for_reason(raw: &str, secrets: &[&str]) -> String {
    let scrubbed = scrub(&strip_ansi(raw), secrets);
    let collapsed = scrubbed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let total = collapsed.chars().count();
    if total <= MAX_CAPTURE_CHARS {
        return collapsed;
    }
    let tail: String = collapsed.chars().skip(total - MAX_CAPTURE_CHARS).collect();
    format!("...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_replaces_every_secret() {
        let out = scrub("old=s3cret new=n3w s3cret", &["s3cret", "n3w"]);
        assert_eq!(out, "old=[REDACTED] new=[REDACTED] [REDACTED]");
    }

    #[test]
    fn scrub_covers_secret_containing_another() {
        let secrets = ["Summer2023", "Summer2023!x"];
        let out = scrub("echo: Summer2023!x and Summer2023", &secrets);
        assert_eq!(out, "echo: [REDACTED] and [REDACTED]");

        let reason = capture_for_reason("echo: Summer2023!x", &secrets);
        assert!(!reason.contains("!x"), "{reason}");
        assert!(!reason.contains("Summer"), "{reason}");
    }

    #[test]
    fn scrub_merges_overlapping_secrets() {
        assert_eq!(scrub("xxabcdefyy", &["abcd", "cdef"]), "xx[REDACTED]yy");
        assert_eq!(scrub("aaaa", &["aaa"]), "[REDACTED]");
    }

    #[test]
    fn scrub_ignores_empty_secret() {
        assert_eq!(scrub("abc", &[""]), "abc");
    }

    #[test]
    fn strip_ansi_removes_sequences() {
        let text = "\x1b[1;32mpasswd:\x1b[0m password updated \x1b]0;title\x07done";
        assert_eq!(strip_ansi(text), "passwd: password updated done");
    }

    #[test]
    fn strip_ansi_accepts_every_csi_final_byte() {
        assert_eq!(strip_ansi("\x1b[2~Current password: "), "Current password: ");
        assert_eq!(strip_ansi("\x1b[1{New\x1b[0|"), "New");
    }

    #[test]
    fn strip_ansi_borrows_plain_text() {
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn capture_collapses_and_scrubs() {
        let raw = "passwd: Authentication token\r\n  manipulation error\r\nhunter2\r\n$ ";
        let reason = capture_for_reason(raw, &["hunter2"]);
        assert_eq!(
            reason,
            "passwd: Authentication token manipulation error [REDACTED] $"
        );
    }

    #[test]
    fn capture_keeps_tail_of_long_output() {
        let raw = "x".repeat(MAX_CAPTURE_CHARS + 50) + " END";
        let reason = capture_for_reason(&raw, &[]);
        assert!(reason.starts_with("..."));
        assert!(reason.ends_with("END"));
        assert_eq!(reason.chars().count(), MAX_CAPTURE_CHARS + 3);
    }
}
