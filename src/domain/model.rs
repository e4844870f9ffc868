use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A sample-list line such as `volumes/EMSE-2021/AbuDab21.pdf`.
pub type Entry = String;

/// Two annotated files of the same article that must be compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub file1: PathBuf,
    pub coder1: String,
    pub file2: PathBuf,
    pub coder2: String,
}

/// One file implied by the who/what file: which coder annotates it, in which block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedFile {
    pub path: PathBuf,
    pub citekey: String,
    pub coder: String,
    pub block: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSentence {
    /// 1-based position within the file
    pub index: usize,
    pub sentence: String,
    pub annotation: String,
}

/// Which part of an article an extraction is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Abstract,
    Conclusion,
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Part::Abstract => write!(f, "abstract"),
            Part::Conclusion => write!(f, "conclusion"),
        }
    }
}

/// How to find a part in the text of one family of article layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    /// Venue names (`TSE`) or volume names (`ICSE-2022`)
    pub applies_to: Vec<String>,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// Bibliographic metadata of one article as found in `<volume>-dblp.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub identifier: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeMetadata {
    pub corpus_metadata: Vec<ArticleMetadata>,
}
