//! Which coder annotates which file, and which pairs of files get compared.
//!
//! The who/what file lists one article per line, followed by one column per
//! annotated copy: `AbuDab21  alice  bob`. Column `i` implies the file
//! `<workdir>/<prefix><letter>/<citekey>.txt` where the letter is `A` for the
//! first column, `B` for the second and so on. The prefix is whatever the
//! single `*A` entry of the workdir starts with (`abstracts.A` -> `abstracts.`).
//! Coder names starting with `-` are reservations: the column is held for
//! somebody but nothing is annotated yet.

use crate::config::toml_config::{Pairing, WhoWhatConfig};
use crate::domain::model::{CodedFile, FilePair};
use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static BLOCK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#---+ [Bb]lock (\d+)").expect("valid regex"));
static FILENAME_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(.*)?([A-Z])/(\w+)\.txt$").expect("valid regex"));

const MAX_COLUMNS: usize = 26;

#[derive(Debug, Clone)]
pub struct WhoWhat {
    workdir: PathBuf,
    subdir_prefix: String,
    coders: BTreeSet<String>,
    files: Vec<CodedFile>,
    index: HashMap<PathBuf, usize>,
    all_pairs: Vec<FilePair>,
}

impl WhoWhat {
    pub fn load<S: Storage>(storage: &S, workdir: &Path, config: &WhoWhatConfig) -> Result<Self> {
        let subdir_prefix = match &config.subdir_prefix {
            Some(prefix) => prefix.clone(),
            None => detect_subdir_prefix(storage, workdir)?,
        };
        let path = workdir.join(&config.file);
        let content = storage.read_to_string(&path)?;
        let whowhat = Self::parse(
            &content,
            workdir,
            &subdir_prefix,
            config.pairing,
            &path.display().to_string(),
        )?;
        tracing::debug!(
            "{}: {} coders, {} files, {} pairs",
            path.display(),
            whowhat.coders.len(),
            whowhat.files.len(),
            whowhat.all_pairs.len()
        );
        Ok(whowhat)
    }

    pub fn parse(
        content: &str,
        workdir: &Path,
        subdir_prefix: &str,
        pairing: Pairing,
        origin: &str,
    ) -> Result<Self> {
        let mut result = Self {
            workdir: workdir.to_path_buf(),
            subdir_prefix: subdir_prefix.to_string(),
            coders: BTreeSet::new(),
            files: Vec::new(),
            index: HashMap::new(),
            all_pairs: Vec::new(),
        };
        let mut current_block = String::new();

        for (lineno, line) in content.lines().enumerate() {
            if line.starts_with('#') {
                if let Some(caps) = BLOCK_HEADER.captures(line) {
                    current_block = caps[1].to_string();
                }
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(citekey) = parts.next() else {
                continue;
            };
            let columns: Vec<&str> = parts.collect();
            if columns.len() > MAX_COLUMNS {
                return Err(QscriptError::MalformedLine {
                    file: origin.to_string(),
                    line: lineno + 1,
                    text: format!("{} (more than {} columns)", line, MAX_COLUMNS),
                });
            }

            for (column, coder) in columns.iter().enumerate() {
                if is_reservation(coder) {
                    continue;
                }
                result.coders.insert(coder.to_string());
                let coded = CodedFile {
                    path: result.implied_filename(citekey, column),
                    citekey: citekey.to_string(),
                    coder: coder.to_string(),
                    block: current_block.clone(),
                };
                match result.index.get(&coded.path) {
                    Some(&at) => result.files[at] = coded,
                    None => {
                        result.index.insert(coded.path.clone(), result.files.len());
                        result.files.push(coded);
                    }
                }
            }

            let pairs = match pairing {
                Pairing::WithA => result.pairs_with_a(citekey, &columns),
                Pairing::Neighbors => result.neighboring_pairs(citekey, &columns),
            };
            result.all_pairs.extend(pairs);
        }
        Ok(result)
    }

    pub fn coders(&self) -> &BTreeSet<String> {
        &self.coders
    }

    pub fn files(&self) -> &[CodedFile] {
        &self.files
    }

    pub fn files_of<'a>(&'a self, coder: &'a str) -> impl Iterator<Item = &'a CodedFile> + 'a {
        self.files.iter().filter(move |f| f.coder == coder)
    }

    /// Which block does this file belong to?
    pub fn blockname(&self, file: &Path) -> Option<&str> {
        self.index
            .get(file)
            .map(|&at| self.files[at].block.as_str())
    }

    /// Pairs in which neither side is a reservation.
    pub fn pairs(&self) -> impl Iterator<Item = &FilePair> {
        self.all_pairs
            .iter()
            .filter(|p| !is_reservation(&p.coder1) && !is_reservation(&p.coder2))
    }

    pub fn subdir_prefix(&self) -> &str {
        &self.subdir_prefix
    }

    fn implied_filename(&self, citekey: &str, column: usize) -> PathBuf {
        let letter = char::from(b'A' + column as u8);
        self.workdir
            .join(format!("{}{}", self.subdir_prefix, letter))
            .join(format!("{}.txt", citekey))
    }

    /// A/B, A/C, A/D, ... whether reservation or not.
    fn pairs_with_a(&self, citekey: &str, columns: &[&str]) -> Vec<FilePair> {
        let Some((coder_a, others)) = columns.split_first() else {
            return Vec::new();
        };
        let file_a = self.implied_filename(citekey, 0);
        others
            .iter()
            .enumerate()
            .map(|(i, coder)| FilePair {
                file1: file_a.clone(),
                coder1: coder_a.to_string(),
                file2: self.implied_filename(citekey, i + 1),
                coder2: coder.to_string(),
            })
            .collect()
    }

    /// A/B, C/D, ... whether reservation or not. An odd last column stays unpaired.
    fn neighboring_pairs(&self, citekey: &str, columns: &[&str]) -> Vec<FilePair> {
        columns
            .chunks_exact(2)
            .enumerate()
            .map(|(chunk, coders)| FilePair {
                file1: self.implied_filename(citekey, 2 * chunk),
                coder1: coders[0].to_string(),
                file2: self.implied_filename(citekey, 2 * chunk + 1),
                coder2: coders[1].to_string(),
            })
            .collect()
    }
}

pub fn is_reservation(codername: &str) -> bool {
    codername.starts_with('-')
}

/// Citekey part of an implied filename such as `work/abstracts.B/AbuDab21.txt`.
pub fn citekey(file: &Path) -> Option<String> {
    filename_part(file, 3)
}

/// Column letter of an implied filename such as `work/abstracts.B/AbuDab21.txt`.
pub fn coder_letter(file: &Path) -> Option<String> {
    filename_part(file, 2)
}

fn filename_part(file: &Path, which: usize) -> Option<String> {
    let name = file.to_string_lossy();
    FILENAME_PARTS
        .captures(&name)
        .and_then(|caps| caps.get(which))
        .map(|m| m.as_str().to_string())
}

/// `workdir/abstracts.A` yields `abstracts.`, `workdir/A` yields the empty prefix.
fn detect_subdir_prefix<S: Storage>(storage: &S, workdir: &Path) -> Result<String> {
    let candidates: Vec<String> = storage
        .list_dir(workdir)?
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .filter(|name| name.ends_with('A') && !name.starts_with('.'))
        .collect();

    match candidates.as_slice() {
        [single] => Ok(single[..single.len() - 1].to_string()),
        _ => Err(QscriptError::metadata(format!(
            "expected exactly one '*A' subdirectory in '{}', found {:?}",
            workdir.display(),
            candidates
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;

    const WHO_WHAT: &str = "\
# what      abstracts.A   abstracts.B
#----- Block 1
AbuDab21   alice   bob
LiuKimBis21   bob   -carol
#----- Block 2
Smi20   carol   alice   bob
Jon19
";

    fn parsed(pairing: Pairing) -> WhoWhat {
        WhoWhat::parse(WHO_WHAT, Path::new("work"), "abstracts.", pairing, "who-what").unwrap()
    }

    #[test]
    fn test_coders_exclude_reservations() {
        let whowhat = parsed(Pairing::WithA);
        let coders: Vec<_> = whowhat.coders().iter().cloned().collect();
        assert_eq!(coders, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_files_and_blocks() {
        let whowhat = parsed(Pairing::WithA);
        let bobs: Vec<_> = whowhat.files_of("bob").map(|f| f.path.clone()).collect();
        assert_eq!(
            bobs,
            vec![
                PathBuf::from("work/abstracts.B/AbuDab21.txt"),
                PathBuf::from("work/abstracts.A/LiuKimBis21.txt"),
                PathBuf::from("work/abstracts.C/Smi20.txt"),
            ]
        );
        assert_eq!(
            whowhat.blockname(Path::new("work/abstracts.A/AbuDab21.txt")),
            Some("1")
        );
        assert_eq!(
            whowhat.blockname(Path::new("work/abstracts.C/Smi20.txt")),
            Some("2")
        );
        // the reservation implies no file
        assert_eq!(
            whowhat.blockname(Path::new("work/abstracts.B/LiuKimBis21.txt")),
            None
        );
    }

    #[test]
    fn test_pairs_with_a_skip_reservations() {
        let whowhat = parsed(Pairing::WithA);
        let pairs: Vec<_> = whowhat
            .pairs()
            .map(|p| (p.coder1.as_str(), p.coder2.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("alice", "bob"), ("carol", "alice"), ("carol", "bob")]
        );
        let last = whowhat.pairs().last().unwrap();
        assert_eq!(last.file1, PathBuf::from("work/abstracts.A/Smi20.txt"));
        assert_eq!(last.file2, PathBuf::from("work/abstracts.C/Smi20.txt"));
    }

    #[test]
    fn test_neighboring_pairs_leave_odd_column_unpaired() {
        let whowhat = parsed(Pairing::Neighbors);
        let pairs: Vec<_> = whowhat
            .pairs()
            .map(|p| (p.coder1.as_str(), p.coder2.as_str()))
            .collect();
        assert_eq!(pairs, vec![("alice", "bob"), ("carol", "alice")]);
    }

    #[test]
    fn test_filename_parts() {
        let file = Path::new("work/abstracts.B/AbuDab21.txt");
        assert_eq!(citekey(file).as_deref(), Some("AbuDab21"));
        assert_eq!(coder_letter(file).as_deref(), Some("B"));
        assert_eq!(coder_letter(Path::new("work/B/AbuDab21.txt")).as_deref(), Some("B"));
        assert_eq!(citekey(Path::new("AbuDab21.txt")), None);
    }

    #[test]
    fn test_too_many_columns() {
        let line = format!("Big20 {}\n", vec!["c"; 27].join(" "));
        let err = WhoWhat::parse(&line, Path::new("w"), "", Pairing::WithA, "who-what").unwrap_err();
        assert!(err.to_string().contains("who-what:1"));
    }

    #[test]
    fn test_load_detects_subdir_prefix() {
        let storage = MemoryStorage::new()
            .with_file("work/sample-who-what.txt", WHO_WHAT)
            .with_dir("work/abstracts.A")
            .with_dir("work/abstracts.B");
        let whowhat = WhoWhat::load(&storage, Path::new("work"), &WhoWhatConfig::default()).unwrap();
        assert_eq!(whowhat.subdir_prefix(), "abstracts.");
        assert_eq!(whowhat.files().len(), 6);
    }

    #[test]
    fn test_load_without_a_directory_fails() {
        let storage = MemoryStorage::new()
            .with_file("work/sample-who-what.txt", WHO_WHAT)
            .with_dir("work/abstracts.B");
        let err = WhoWhat::load(&storage, Path::new("work"), &WhoWhatConfig::default()).unwrap_err();
        assert!(err.to_string().contains("'*A'"));
    }

    #[test]
    fn test_configured_prefix_skips_detection() {
        let storage = MemoryStorage::new().with_file("work/sample-who-what.txt", "AbuDab21 alice bob\n");
        let config = WhoWhatConfig {
            subdir_prefix: Some(String::new()),
            ..WhoWhatConfig::default()
        };
        let whowhat = WhoWhat::load(&storage, Path::new("work"), &config).unwrap();
        assert_eq!(
            whowhat.files()[1].path,
            PathBuf::from("work/B/AbuDab21.txt")
        );
    }
}
