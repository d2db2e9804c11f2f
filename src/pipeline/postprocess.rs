//! Post-processing: deterministic cleanup of converter output.
//!
//! Converters differ in how they end lines and pad blocks. These rules give
//! every output file the same shape without touching content, and they are
//! idempotent: cleaning already-clean Markdown returns it unchanged, which
//! keeps repeated runs byte-identical.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the per-line rules see `\n` only;
//! the final-newline pass runs last. The whitespace rules leave fenced code
//! blocks (```` ``` ```` or `~~~`) alone: trailing spaces and blank lines
//! inside a `<pre>` block are content.

/// Apply all post-processing rules to raw converter output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Trim trailing whitespace per line, keeping two-space hard breaks
///    (outside code fences)
/// 4. Collapse 3+ consecutive blank lines down to 2 (outside code fences)
/// 5. Ensure the file ends with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Code fences ─────────────────────────────────────────────────────────────

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    let mut in_fence = false;
    input
        .lines()
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                return line.trim_end().to_string();
            }
            if in_fence {
                return line.to_string();
            }
            let trimmed = line.trim_end();
            let trailing = &line[trimmed.len()..];
            if !trimmed.is_empty() && trailing.starts_with("  ") && !trailing.contains('\t') {
                format!("{trimmed}  ")
            } else {
                trimmed.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

fn collapse_blank_lines(input: &str) -> String {
    let mut in_fence = false;
    let mut blanks = 0;
    let mut kept = Vec::new();
    for line in input.split('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
        }
        if !in_fence && line.is_empty() {
            blanks += 1;
            if blanks > 2 {
                continue;
            }
        } else {
            blanks = 0;
        }
        kept.push(line);
    }
    kept.join("\n")
}

// ── Rule 5: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_becomes_lf() {
        assert_eq!(clean_markdown("a\r\nb\rc"), "a\nb\nc\n");
    }

    #[test]
    fn trailing_spaces_trimmed_but_hard_break_kept() {
        assert_eq!(clean_markdown("line one   \nline two\t\n"), "line one  \nline two\n");
        assert_eq!(clean_markdown("x \ny"), "x\ny\n");
    }

    #[test]
    fn blank_runs_collapse() {
        assert_eq!(clean_markdown("a\n\n\n\n\n\nb"), "a\n\n\nb\n");
    }

    #[test]
    fn fenced_code_is_left_alone() {
        let raw = "Intro   \n\n```\nlet x = 1;   \n\n\n\n\nlet y = 2;\t\n```\n\n\n\n\nOutro  \t\n";
        assert_eq!(
            clean_markdown(raw),
            "Intro  \n\n```\nlet x = 1;   \n\n\n\n\nlet y = 2;\t\n```\n\n\nOutro\n"
        );
        let once = clean_markdown(raw);
        assert_eq!(clean_markdown(&once), once);
    }

    #[test]
    fn invisible_chars_removed() {
        assert_eq!(clean_markdown("\u{FEFF}Title\u{200B}"), "Title\n");
    }

    #[test]
    fn empty_output_is_single_newline() {
        assert_eq!(clean_markdown(""), "\n");
        assert_eq!(clean_markdown("  \n\n"), "\n");
    }

    #[test]
    fn idempotent() {
        let raw = "Title\n=====\r\n\r\n\r\n\r\n\r\nBody  \nmore\t \n\n";
        let once = clean_markdown(raw);
        assert_eq!(clean_markdown(&once), once);
    }
}
