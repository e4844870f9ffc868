//! Knowledge about annotation syntax.
//!
//! Terminology:
//! - annotation: `{{abc, defg:i1}}` on a line by itself
//! - annotationish: ditto, perhaps with broken braces or not alone on its line
//! - codings: `abc, defg:i1`
//! - coding: `defg:i1`
//! - code: `defg`
//! - fullsuffix: `:flag:i1` (with or without the leading colon)
//! - suffix: `i1`, `i1u1` or `u1`

use crate::core::codebook::Codebook;
use crate::domain::model::AnnotatedSentence;
use crate::utils::error::{QscriptError, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static ANNOTATIONISH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\n(\{\{[^}]*\})\n|\n(\{[^{]*\}\})\n|\n(.+\{\{.*\}\})|\n(\{\{.*\}\})\n",
    )
    .expect("valid regex")
});
static ANNOTATION_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w-]+)((?::[\w\d]+)*)").expect("valid regex"));
static BARE_CODENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?([\w-]+)(:[\w\d]*)?").expect("valid regex"));
static EMPTY_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{\s*\}\}").expect("valid regex"));
static LINE_AND_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*)\n(\{\{.*\}\})").expect("valid regex"));
static INFORMATIVENESS_GAPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"i(\d+)").expect("valid regex"));
static UNDERSTANDABILITY_GAPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"u(\d+)").expect("valid regex"));

/// Something that looks like an annotation, well-formed or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotationish {
    MissingClosingBrace(String),
    MissingOpeningBrace(String),
    NotAlone(String),
    Valid(String),
}

impl Annotationish {
    /// The annotation if well-formed, otherwise a message describing the problem.
    pub fn check(&self) -> std::result::Result<&str, String> {
        match self {
            Self::MissingClosingBrace(text) => Err(format!(
                "second closing brace appears to be missing: '{}'",
                text
            )),
            Self::MissingOpeningBrace(text) => Err(format!(
                "second opening brace appears to be missing: '{}'",
                text
            )),
            Self::NotAlone(text) => Err(format!(
                "{{{{}}}} annotation must be alone on a line: '{}'",
                text
            )),
            Self::Valid(annotation) => Ok(annotation),
        }
    }
}

/// Informativeness and understandability gap counts of one code in two annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IuCounts {
    pub icount1: u32,
    pub ucount1: u32,
    pub icount2: u32,
    pub ucount2: u32,
}

pub fn find_all_annotationish(content: &str) -> Vec<Annotationish> {
    ANNOTATIONISH
        .captures_iter(content)
        .filter_map(|caps| {
            let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
            group(1)
                .map(Annotationish::MissingClosingBrace)
                .or_else(|| group(2).map(Annotationish::MissingOpeningBrace))
                .or_else(|| group(3).map(Annotationish::NotAlone))
                .or_else(|| group(4).map(Annotationish::Valid))
        })
        .collect()
}

pub fn find_all_line_and_annotation_pairs(content: &str) -> Vec<(String, String)> {
    LINE_AND_ANNOTATION
        .captures_iter(content)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Pairs of a sentence and the annotation that follows it.
///
/// A sentence starts right after a blank line or right after an annotation line,
/// so a title separated by a blank line is never part of a pair. It extends
/// (possibly over several lines) up to the next `\n{{`; the annotation ends at
/// the first `}}`.
pub fn find_all_sentence_and_annotation_pairs(content: &str) -> Vec<AnnotatedSentence> {
    let bytes = content.as_bytes();
    let may_start_at = |pos: usize| {
        pos >= 3 && (&bytes[pos - 2..pos] == b"\n\n" || &bytes[pos - 3..pos] == b"}}\n")
    };

    let mut result = Vec::new();
    let mut pos = 0;
    loop {
        let Some(start) = (pos..=bytes.len()).find(|&p| may_start_at(p)) else {
            break;
        };
        let Some(open) = content[start..].find("\n{{").map(|i| start + i) else {
            break;
        };
        let Some(close) = content[open + 3..].find("}}").map(|i| open + 3 + i) else {
            break;
        };
        result.push(AnnotatedSentence {
            index: result.len() + 1,
            sentence: content[start..open].to_string(),
            annotation: content[open + 1..close + 2].to_string(),
        });
        pos = close + 2;
    }
    result
}

/// Strip a leading dash and trailing suffixes: `-unsure:x` becomes `unsure`.
pub fn bare_codename(coding: &str) -> Option<&str> {
    BARE_CODENAME
        .captures(coding)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_empty_annotation(annotation: &str) -> bool {
    EMPTY_ANNOTATION.is_match(annotation)
}

/// `{{a,b:i1}}` becomes `[("a", ""), ("b", ":i1")]`.
pub fn split_into_codings(annotation: &str) -> Vec<(String, String)> {
    let inner = annotation
        .strip_prefix("{{")
        .and_then(|a| a.strip_suffix("}}"))
        .unwrap_or(annotation);
    ANNOTATION_CONTENT
        .captures_iter(inner)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Annotation services that need the codebook.
#[derive(Debug, Clone)]
pub struct Annotations {
    codebook: Codebook,
}

impl Annotations {
    pub fn new(codebook: Codebook) -> Self {
        Self { codebook }
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    /// The set of codings in an annotation.
    pub fn codings_of(
        &self,
        annotation: &str,
        strip_suffixes: bool,
        strip_subjective: bool,
    ) -> BTreeSet<String> {
        ANNOTATION_CONTENT
            .captures_iter(annotation)
            .filter(|caps| !(strip_subjective && self.codebook.is_subjective_code(&caps[1])))
            .map(|caps| {
                if strip_suffixes {
                    caps[1].to_string()
                } else {
                    format!("{}{}", &caps[1], &caps[2])
                }
            })
            .collect()
    }

    /// Check a single coding. Unknown codes and disallowed suffixes are coding errors.
    pub fn check_coding(&self, code: &str, fullsuffix: &str) -> Result<()> {
        if !self.codebook.exists(code) {
            return Err(QscriptError::coding(format!("unknown code: '{}'", code)));
        }
        self.codebook.check_suffix(code, fullsuffix)
    }

    /// Summed `i<n>` and `u<n>` suffix counts per non-subjective code of both annotations.
    pub fn codes_with_iucounts(
        &self,
        annotation1: &str,
        annotation2: &str,
    ) -> BTreeMap<String, IuCounts> {
        let mut result: BTreeMap<String, IuCounts> = BTreeMap::new();
        for (first, annotation) in [(true, annotation1), (false, annotation2)] {
            for (code, fullsuffix) in split_into_codings(annotation) {
                if self.codebook.is_subjective_code(&code) {
                    continue;
                }
                let icount = gap_count(&INFORMATIVENESS_GAPS, &fullsuffix);
                let ucount = gap_count(&UNDERSTANDABILITY_GAPS, &fullsuffix);
                let counts = result.entry(code).or_default();
                if first {
                    counts.icount1 += icount;
                    counts.ucount1 += ucount;
                } else {
                    counts.icount2 += icount;
                    counts.ucount2 += ucount;
                }
            }
        }
        result
    }
}

fn gap_count(pattern: &Regex, fullsuffix: &str) -> u32 {
    fullsuffix
        .split(':')
        .flat_map(|suffix| pattern.captures_iter(suffix))
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .sum()
}
