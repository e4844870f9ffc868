//! Reading (and a little writing) of the sample metadata files.

use crate::domain::model::Entry;
use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

pub const SAMPLE_LIST: &str = "sample.list";

static ENTRY_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^/]+)/([^/]+)\.pdf$").expect("valid regex"));
static VENUE_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)-(\d+)/([\w-]+)\.").expect("valid regex"));
static FULL_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^20\d\d$").expect("valid regex"));
static VOLUME_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+/)?([A-Za-z]+)-(\d\d\d\d)$").expect("valid regex"));

/// From `volumes/EMSE-2021/AbuDab21.pdf` return `("EMSE-2021", "AbuDab21")`.
pub fn split_entry(entry: &str) -> Result<(&str, &str)> {
    let caps = ENTRY_PARTS
        .captures(entry)
        .ok_or_else(|| QscriptError::metadata(format!("not a sample entry: '{}'", entry)))?;
    let volume = caps.get(1).map_or("", |m| m.as_str());
    let citekey = caps.get(2).map_or("", |m| m.as_str());
    Ok((volume, citekey))
}

pub fn citekey(entry: &str) -> Result<&str> {
    split_entry(entry).map(|(_, citekey)| citekey)
}

pub fn volume(entry: &str) -> Result<&str> {
    split_entry(entry).map(|(volume, _)| volume)
}

/// Split `some/path/ICSE-2021` into `(Some("some/path/"), "ICSE", 2021)`.
pub fn volume_as_path_name_year(volumepath: &str) -> Result<(Option<&str>, &str, u16)> {
    let caps = VOLUME_NAME
        .captures(volumepath)
        .ok_or_else(|| QscriptError::metadata(format!("not a volume name: '{}'", volumepath)))?;
    let path = caps.get(1).map(|m| m.as_str());
    let name = caps.get(2).map_or("", |m| m.as_str());
    let year = caps[3]
        .parse()
        .map_err(|_| QscriptError::metadata(format!("bad year in volume '{}'", volumepath)))?;
    Ok((path, name, year))
}

/// A list file ends with `\n`, so the final empty element is dropped.
pub fn read_list<S: Storage>(storage: &S, path: &Path) -> Result<Vec<Entry>> {
    let content = storage.read_to_string(path)?;
    let mut entries: Vec<Entry> = content.split('\n').map(str::to_string).collect();
    entries.pop();
    Ok(entries)
}

pub fn write_list<S, I>(storage: &S, path: &Path, entries: I) -> Result<()>
where
    S: Storage,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut content = String::new();
    for entry in entries {
        content.push_str(entry.as_ref());
        content.push('\n');
    }
    storage.write(path, content.as_bytes())
}

/// Knows which venue and volume each citekey of `sample.list` belongs to.
#[derive(Debug, Clone, Default)]
pub struct Venue {
    venue: HashMap<String, String>,
    volume: HashMap<String, String>,
}

impl Venue {
    pub fn load<S: Storage>(storage: &S, workdir: &Path) -> Result<Self> {
        let path = workdir.join(SAMPLE_LIST);
        let content = storage.read_to_string(&path)?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let mut result = Self::default();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let caps = VENUE_ENTRY
                .captures(line)
                .ok_or_else(|| QscriptError::MalformedLine {
                    file: origin.to_string(),
                    line: lineno + 1,
                    text: line.to_string(),
                })?;
            let venue = &caps[1];
            let number = &caps[2];
            // TSE-2022 becomes TSE22, TSE-48 stays TSE48
            let number = if FULL_YEAR.is_match(number) {
                &number[2..]
            } else {
                number
            };
            let citekey = caps[3].to_string();
            result.venue.insert(citekey.clone(), venue.to_string());
            result.volume.insert(citekey, format!("{}{}", venue, number));
        }
        Ok(result)
    }

    pub fn venue_of(&self, citekey: &str) -> Option<&str> {
        self.venue.get(citekey).map(String::as_str)
    }

    pub fn volume_of(&self, citekey: &str) -> Option<&str> {
        self.volume.get(citekey).map(String::as_str)
    }
}
