use crate::config::toml_config::ProjectConfig;
use crate::core::annotations::Annotations;
use crate::core::codebook::Codebook;
use crate::core::comparator::{CodingsComparator, ComparatorContext};
use crate::core::whowhat::WhoWhat;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::palette::Palette;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Directory where the who/what file and the extracts subdirectories live
    pub workdir: PathBuf,

    /// How much the smaller gap count may be smaller without a message [default: from config]
    #[arg(long, value_name = "N")]
    pub maxcountdiff: Option<u32>,

    /// Only messages for this coder will be displayed
    #[arg(long, value_name = "CODERNAME")]
    pub onlyfor: Option<String>,
}

pub fn execute<S: Storage, W: Write>(
    args: &Args,
    storage: &S,
    config: &ProjectConfig,
    palette: Palette,
    out: &mut W,
) -> Result<u8> {
    let whowhat = WhoWhat::load(storage, &args.workdir, &config.whowhat)?;
    let annotations = Annotations::new(Codebook::load(storage, &config.codebook)?);
    let maxcountdiff = args.maxcountdiff.unwrap_or(config.compare.max_count_diff);
    let mut comparator = CodingsComparator::new(&annotations, maxcountdiff, palette);

    let rule = "=".repeat(89);
    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "=== check pairs of files (consult with your fellow coder except for obvious mistakes) ==="
    )?;
    writeln!(out, "{}", rule)?;

    for coder in whowhat.coders() {
        if args.onlyfor.as_ref().is_some_and(|only| only != coder) {
            continue;
        }
        writeln!(out, "\n\n#################### {}'s: ####################\n", coder)?;
        for pair in whowhat.pairs() {
            if pair.coder1 != *coder && pair.coder2 != *coder {
                continue;
            }
            let block = whowhat.blockname(&pair.file1).unwrap_or_default();
            let ctx = ComparatorContext::new(pair, block);
            comparator.compare_files(storage, &ctx, out)?;
        }
    }
    tracing::debug!("{} messages", comparator.msgcount());
    Ok(comparator.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;

    fn storage() -> MemoryStorage {
        MemoryStorage::new()
            .with_file("codebook.md", "code `design` code `gap:i\\d:u\\d` code `-ignorediff`")
            .with_file(
                "w/sample-who-what.txt",
                "#----- Block 4\nAbc21  alice  bob\nDef20  alice  -carol\n",
            )
            .with_file("w/A/Abc21.txt", "T\n\nOne.\n{{design}}\nTwo.\n{{gap:i1}}\n")
            .with_file("w/B/Abc21.txt", "T\n\nOne.\n{{gap}}\nTwo.\n{{gap:i1}}\n")
            .with_file("w/A/Def20.txt", "T\n\nOne.\n{{}}\n")
    }

    fn run(args: Args) -> (String, u8) {
        let mut out = Vec::new();
        let code = execute(
            &args,
            &storage(),
            &ProjectConfig::default(),
            Palette::plain(),
            &mut out,
        )
        .unwrap();
        (String::from_utf8(out).unwrap(), code)
    }

    #[test]
    fn test_each_pair_is_shown_for_both_coders() {
        let (out, code) = run(Args {
            workdir: PathBuf::from("w"),
            maxcountdiff: None,
            onlyfor: None,
        });
        assert_eq!(out.matches("##### The sets of codes applied are different").count(), 2);
        assert!(out.contains("w/A/Abc21.txt  (alice, Block 4)\nw/B/Abc21.txt  (bob, Block 4)\n"));
        assert!(out.contains("[2] Two.\n{{gap:i1}}  -OK- (alice)\n"));
        // the reserved column is never compared
        assert!(!out.contains("Def20"));
        assert_eq!(code, 1);
    }

    #[test]
    fn test_onlyfor_restricts_to_one_coder() {
        let (out, code) = run(Args {
            workdir: PathBuf::from("w"),
            maxcountdiff: Some(0),
            onlyfor: Some("bob".to_string()),
        });
        assert!(out.contains("bob's:"));
        assert!(!out.contains("alice's:"));
        assert_eq!(out.matches("\n##### ").count(), 1);
        assert_eq!(code, 0);
    }
}
