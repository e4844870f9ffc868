use crate::config::toml_config::ProjectConfig;
use crate::core::annotations::{self, Annotations};
use crate::core::codebook::Codebook;
use crate::core::whowhat::WhoWhat;
use crate::domain::model::CodedFile;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::palette::Palette;
use std::io::Write;
use std::path::PathBuf;

/// More problems than this and the rest of the file is skipped.
const MAX_PROBLEMS_PER_FILE: usize = 3;

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Directory where the who/what file and the extracts subdirectories live
    pub workdir: PathBuf,
}

pub fn execute<S: Storage, W: Write>(
    args: &Args,
    storage: &S,
    config: &ProjectConfig,
    palette: Palette,
    out: &mut W,
) -> Result<u8> {
    let rule = "=".repeat(79);
    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "=== check individual files (correct mistakes even if they are not your own) ==="
    )?;
    writeln!(out, "{}", rule)?;

    let annotations = Annotations::new(Codebook::load(storage, &config.codebook)?);
    let whowhat = WhoWhat::load(storage, &args.workdir, &config.whowhat)?;
    let mut problems = 0usize;
    for coder in whowhat.coders() {
        writeln!(out, "\n#################### {}'s: ####################\n", coder)?;
        for file in whowhat.files_of(coder) {
            problems += report_problems(storage, file, &annotations, palette, out)?;
        }
    }
    tracing::debug!("{} problems found", problems);
    Ok(u8::try_from(problems).unwrap_or(u8::MAX))
}

/// Print the problems of one file under a header. Returns how many there were.
fn report_problems<S: Storage, W: Write>(
    storage: &S,
    file: &CodedFile,
    annotations: &Annotations,
    palette: Palette,
    out: &mut W,
) -> Result<usize> {
    let problems = find_problems(storage, file, annotations, palette);
    if !problems.is_empty() {
        writeln!(
            out,
            "---- {}  ({}, Block {}):\n{}",
            palette.blue(&file.path.display().to_string()),
            file.coder,
            file.block,
            problems.join("\n")
        )?;
    }
    Ok(problems.len())
}

fn find_problems<S: Storage>(
    storage: &S,
    file: &CodedFile,
    annotations: &Annotations,
    palette: Palette,
) -> Vec<String> {
    let content = match storage.read_to_string(&file.path) {
        Ok(content) => content,
        Err(e) => return vec![palette.red(&e.to_string())],
    };
    let mut problems = Vec::new();
    for annotationish in annotations::find_all_annotationish(&content) {
        match annotationish.check() {
            Err(msg) => problems.push(palette.red(&msg)),
            Ok(annotation) => {
                problems.extend(problems_within_braces(annotation, annotations, palette))
            }
        }
        if problems.len() > MAX_PROBLEMS_PER_FILE {
            problems.push("too many problems in this file, stopping.\n".to_string());
            break;
        }
    }
    problems
}

fn problems_within_braces(
    annotation: &str,
    annotations: &Annotations,
    palette: Palette,
) -> Vec<String> {
    annotations::split_into_codings(annotation)
        .into_iter()
        .filter_map(|(code, fullsuffix)| annotations.check_coding(&code, &fullsuffix).err())
        .map(|e| format!("{}\n{}", annotation, palette.red(&e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;

    const CODEBOOK: &str = "code `gap:i\\d:u\\d` code `design` code `-ignorediff`";

    fn storage(file_b: &str) -> MemoryStorage {
        MemoryStorage::new()
            .with_file("codebook.md", CODEBOOK)
            .with_file(
                "w/sample-who-what.txt",
                "# what  A  B\n#----- Block 1\nAbc21  alice  bob\n",
            )
            .with_file(
                "w/A/Abc21.txt",
                "Title\n\nOne.\n{{design}}\nTwo.\n{{gap:i1}}\n---\n",
            )
            .with_file("w/B/Abc21.txt", file_b)
    }

    fn run(storage: &MemoryStorage) -> (String, u8) {
        let args = Args {
            workdir: PathBuf::from("w"),
        };
        let mut out = Vec::new();
        let code = execute(
            &args,
            storage,
            &ProjectConfig::default(),
            Palette::plain(),
            &mut out,
        )
        .unwrap();
        (String::from_utf8(out).unwrap(), code)
    }

    #[test]
    fn test_clean_files_have_no_problems() {
        let (out, code) = run(&storage("Title\n\nOne.\n{{design}}\nTwo.\n{{gap:u2}}\n"));
        assert_eq!(code, 0);
        assert!(out.contains("#################### alice's: ####################"));
        assert!(out.contains("#################### bob's: ####################"));
        assert!(!out.contains("----"));
    }

    #[test]
    fn test_problems_are_reported_per_file() {
        let (out, code) = run(&storage(
            "Title\n\nOne.\n{{desing}}\nTwo.\n{{gap:x1}}\nThree.\n{{design}\n",
        ));
        assert_eq!(code, 3);
        assert!(out.contains("---- w/B/Abc21.txt  (bob, Block 1):\n"));
        assert!(out.contains("{{desing}}\nunknown code: 'desing'"));
        assert!(out.contains("{{gap:x1}}\nsuffix 'x1' not allowed for code 'gap': gap:i\\d:u\\d"));
        assert!(out.contains("second closing brace appears to be missing: '{{design}'"));
    }

    #[test]
    fn test_too_many_problems_stop_the_file() {
        let (out, code) = run(&storage(
            "T\n\nA.\n{{a}}\nB.\n{{b}}\nC.\n{{c}}\nD.\n{{d}}\nE.\n{{e}}\n",
        ));
        assert_eq!(code, 5);
        assert!(out.contains("unknown code: 'd'\ntoo many problems in this file, stopping.\n"));
        assert!(!out.contains("'e'"));
    }

    #[test]
    fn test_missing_file_counts_as_problem() {
        let storage = MemoryStorage::new()
            .with_file("codebook.md", CODEBOOK)
            .with_file("w/sample-who-what.txt", "Abc21  alice\n")
            .with_dir("w/A");
        let (out, code) = run(&storage);
        assert_eq!(code, 1);
        assert!(out.contains("w/A/Abc21.txt"));
    }
}
