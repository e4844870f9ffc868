//! Splitting extracted text into one sentence per line, each followed by an
//! empty annotation `{{}}` for the coders to fill in.
//!
//! A possible sentence end is one of `. : ? !` followed by a blank, where a
//! newline (or a run of whitespace ending in one) counts as a blank. Text that
//! merely looks like a sentence end (`e.g. `, `et al. `, ...) is protected
//! beforehand by swapping the end characters for rare look-alikes.

use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const EMPTY_ANNOTATION: &str = "{{}}";

static POSSIBLE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.:?!]\s*[ \n$]").expect("valid regex"));
static NON_SENTENCE_ENDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"e\.g\.\s",
        r"et ?al.\s",
        r"https?:\s",
        r"i\.e\.\s",
        r"vs\.\s",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});
// Headings with a dotted number or a pseudo-end in the title. Matches include
// the final newline, which is then left untouched.
static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n# \d\d?\.?\s.+\n").expect("valid regex"));
// e.g. "2.3.4. Acro: The Design Phase!"
static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(\d\d?\.){0,3}\d\d?\.?\s.+\n").expect("valid regex"));

const PROTECTION_REPLACEMENTS: [(char, char); 4] = [
    ('.', '\u{2059}'),
    (':', '\u{205a}'),
    ('?', '\u{2056}'),
    ('!', '\u{205e}'),
];

/// Split `text` into sentences and put `{{}}` on a line after each.
pub fn prepared(text: &str) -> String {
    let mut rest = with_protection(text);
    let mut result = String::new();
    while !rest.is_empty() {
        match POSSIBLE_END.find(&rest).map(|m| m.end()) {
            Some(end) => {
                let tail = rest.split_off(end);
                result.push_str(&replacement_for(&rest));
                rest = tail;
            }
            None => {
                result.push_str(&replacement_for(&rest));
                rest.clear();
            }
        }
    }
    unprotect(&result)
}

/// Replace characters that could indicate a sentence end by super-rare ones.
pub fn protect(text: &str) -> String {
    text.chars()
        .map(|c| {
            PROTECTION_REPLACEMENTS
                .iter()
                .find(|(plain, _)| *plain == c)
                .map_or(c, |(_, rare)| *rare)
        })
        .collect()
}

pub fn unprotect(text: &str) -> String {
    text.chars()
        .map(|c| {
            PROTECTION_REPLACEMENTS
                .iter()
                .find(|(_, rare)| *rare == c)
                .map_or(c, |(plain, _)| *plain)
        })
        .collect()
}

/// Protect sentence-end lookalikes and turn numbered section headings into sentences.
fn with_protection(text: &str) -> String {
    let mut result = text.to_string();
    for non_end in NON_SENTENCE_ENDS.iter() {
        result = non_end
            .replace_all(&result, |caps: &Captures| protect(&caps[0]))
            .into_owned();
    }
    result = replace_up_to_newline(&NUMBERED_HEADING, &result, protect);
    replace_up_to_newline(&SECTION_HEADING, &result, |heading| {
        format!("{}.", protect(heading))
    })
}

/// Like `replace_all` for patterns ending in `\n`, but the newline is neither
/// replaced nor consumed, so it can start the next match.
fn replace_up_to_newline(pattern: &Regex, text: &str, replace: impl Fn(&str) -> String) -> String {
    let mut result = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    while let Some(m) = pattern.find_at(text, pos) {
        let line_end = m.end() - 1;
        result.push_str(&text[copied..m.start()]);
        result.push_str(&replace(&text[m.start()..line_end]));
        copied = line_end;
        pos = line_end;
    }
    result.push_str(&text[copied..]);
    result
}

/// What appears in the coding file for a sentence: the sentence without
/// trailing whitespace, then the empty annotation on its own line.
fn replacement_for(candidate: &str) -> String {
    format!("{}\n{}\n", candidate.trim_end(), EMPTY_ANNOTATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepared_splits_at_sentence_ends() {
        let text = "This is one. This is two!\nAnd e.g. this is three? Yes: four.\n";
        assert_eq!(
            prepared(text),
            "This is one.\n{{}}\nThis is two!\n{{}}\nAnd e.g. this is three?\n{{}}\nYes:\n{{}}\nfour.\n{{}}\n"
        );
    }

    #[test]
    fn test_prepared_keeps_unterminated_remainder() {
        assert_eq!(
            prepared("First. And no end"),
            "First.\n{{}}\nAnd no end\n{{}}\n"
        );
        assert_eq!(prepared(""), "");
    }

    #[test]
    fn test_prepared_protects_abbreviations() {
        let text = "Smith et al. showed it, i.e. the tool works vs. others. See https: later.\n";
        assert_eq!(
            prepared(text),
            "Smith et al. showed it, i.e. the tool works vs. others.\n{{}}\nSee https: later.\n{{}}\n"
        );
    }

    #[test]
    fn test_section_heading_becomes_a_sentence() {
        let text = "Intro text.\n2.3 Design: Phase\nWe did it.\n";
        assert_eq!(
            prepared(text),
            "Intro text.\n{{}}\n2.3 Design: Phase.\n{{}}\nWe did it.\n{{}}\n"
        );
    }

    #[test]
    fn test_consecutive_headings_are_both_protected() {
        let text = "Intro.\n1. Scope\n2. Method\nDone.\n";
        assert_eq!(
            prepared(text),
            "Intro.\n{{}}\n1. Scope.\n{{}}\n2. Method.\n{{}}\nDone.\n{{}}\n"
        );
    }

    #[test]
    fn test_protect_roundtrip_on_mixed_text() {
        let text = "a.b:c?d!";
        assert_eq!(protect(text), "a\u{2059}b\u{205a}c\u{2056}d\u{205e}");
        assert_eq!(unprotect(&protect(text)), text);
    }
}
