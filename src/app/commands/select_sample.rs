use crate::core::metadata::{self, SAMPLE_LIST};
use crate::core::sampling::{self, Population, Sample};
use crate::domain::model::VolumeMetadata;
use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use crate::utils::validation::validate_positive_number;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const WHO_WHAT_FILE: &str = "sample-who-what.txt";
pub const TITLES_FILE: &str = "sample-titles.json";

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Total number of articles in the sample
    #[arg(long, value_name = "N")]
    pub size: usize,

    /// Size of subsamples that are stratified over volumes and randomized
    #[arg(long, value_name = "K")]
    pub blocksize: usize,

    /// Target directory where to place the result
    #[arg(long, value_name = "TARGETDIR")]
    pub to: PathBuf,

    /// Random seed, for a reproducible sample [default: fresh]
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory of a volume (subpopulation)
    #[arg(required = true, value_name = "VOLUME")]
    pub volumes: Vec<PathBuf>,
}

pub fn execute<S: Storage, W: Write>(args: &Args, storage: &S, out: &mut W) -> Result<u8> {
    validate_positive_number("--size", args.size, 1)?;
    validate_positive_number("--blocksize", args.blocksize, 1)?;
    let listfile = args.to.join(SAMPLE_LIST);
    if storage.exists(&listfile) {
        return Err(QscriptError::AlreadyExists { path: listfile });
    }

    let seed = args.seed.unwrap_or_else(sampling::fresh_seed);
    tracing::info!("drawing {} articles with seed {}", args.size, seed);
    let mut rng = sampling::rng_from(seed);
    let mut population = Population::load(storage, &args.volumes, &mut rng)?;
    let mut sample = Sample::new(args.blocksize);
    for _ in 0..args.size {
        let entry = population.draw1()?;
        sample.add(entry, &mut rng);
    }

    metadata::write_list(storage, &listfile, sample.entries())?;
    writeln!(out, "wrote '{}'", listfile.display())?;
    let whowhat = write_who_what(storage, &args.to, &sample, seed)?;
    writeln!(out, "wrote '{}'", whowhat.display())?;
    let titles = write_titles(storage, &args.to, &sample, &args.volumes)?;
    writeln!(out, "wrote '{}'", titles.display())?;
    Ok(0)
}

/// A who/what skeleton: one line per citekey, a block header every `blocksize` lines.
fn write_who_what<S: Storage>(storage: &S, to: &Path, sample: &Sample, seed: u64) -> Result<PathBuf> {
    let mut content = String::from("# what      abstracts.A   abstracts.B\n");
    content.push_str(&format!(
        "# drawn {} with --seed {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M"),
        seed
    ));
    for (i, citekey) in sample.citekeys()?.iter().enumerate() {
        if i % sample.blocksize() == 0 {
            content.push_str(&format!("#----- Block {}\n", i / sample.blocksize() + 1));
        }
        content.push_str(&format!("{}   \n", citekey));
    }
    let path = to.join(WHO_WHAT_FILE);
    storage.write(&path, content.as_bytes())?;
    Ok(path)
}

/// Map each sampled citekey to its article title, from the volumes' DBLP metadata.
fn write_titles<S: Storage>(
    storage: &S,
    to: &Path,
    sample: &Sample,
    volumedirs: &[PathBuf],
) -> Result<PathBuf> {
    let mut alltitles = HashMap::new();
    for volumedir in volumedirs {
        let metadatafile = sampling::volume_metadata_file(volumedir)?;
        let volume: VolumeMetadata = serde_json::from_str(&storage.read_to_string(&metadatafile)?)?;
        for article in volume.corpus_metadata {
            alltitles.insert(article.identifier, article.title);
        }
    }

    let mut titles = serde_json::Map::new();
    for citekey in sample.citekeys()? {
        let title = alltitles.get(citekey).ok_or_else(|| {
            QscriptError::metadata(format!("no title found for '{}'", citekey))
        })?;
        titles.insert(citekey.to_string(), serde_json::Value::String(title.clone()));
    }
    let path = to.join(TITLES_FILE);
    let json = serde_json::to_string_pretty(&titles)?;
    storage.write(&path, json.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;

    fn storage() -> MemoryStorage {
        MemoryStorage::new()
            .with_file(
                "vols/EMSE-2021/metadata/EMSE-2021.list",
                "EMSE-2021/Abu21.pdf\nEMSE-2021/Bar21.pdf\nEMSE-2021/Cid21.pdf\n",
            )
            .with_file(
                "vols/EMSE-2021/metadata/EMSE-2021-dblp.json",
                r#"{"corpus_metadata": [
                    {"identifier": "Abu21", "title": "On A"},
                    {"identifier": "Bar21", "title": "On B"},
                    {"identifier": "Cid21", "title": "On C"}]}"#,
            )
            .with_file("vols/TSE-2019/metadata/TSE-2019.list", "TSE-2019/Dox19.pdf\n")
            .with_file(
                "vols/TSE-2019/metadata/TSE-2019-dblp.json",
                r#"{"corpus_metadata": [{"identifier": "Dox19", "title": "On D"}]}"#,
            )
            .with_dir("study")
    }

    fn args(size: usize) -> Args {
        Args {
            size,
            blocksize: 2,
            to: PathBuf::from("study"),
            seed: Some(11),
            volumes: vec![PathBuf::from("vols/EMSE-2021"), PathBuf::from("vols/TSE-2019")],
        }
    }

    #[test]
    fn test_select_sample_writes_three_files() {
        let storage = storage();
        let mut out = Vec::new();
        execute(&args(3), &storage, &mut out).unwrap();

        let list = storage.content("study/sample.list").unwrap();
        let entries: Vec<&str> = list.lines().collect();
        assert_eq!(entries.len(), 3);
        // round-robin: the only TSE article is among the first block
        assert!(entries[..2].contains(&"TSE-2019/Dox19.pdf"));

        let whowhat = storage.content("study/sample-who-what.txt").unwrap();
        assert!(whowhat.contains("with --seed 11\n#----- Block 1\n"));
        assert_eq!(whowhat.matches("#----- Block").count(), 2);

        let titles: HashMap<String, String> =
            serde_json::from_str(&storage.content("study/sample-titles.json").unwrap()).unwrap();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles["Dox19"], "On D");

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("wrote 'study/sample.list'"));
    }

    #[test]
    fn test_select_sample_is_reproducible() {
        let first = storage();
        let second = storage();
        execute(&args(4), &first, &mut std::io::sink()).unwrap();
        execute(&args(4), &second, &mut std::io::sink()).unwrap();
        assert_eq!(
            first.content("study/sample.list"),
            second.content("study/sample.list")
        );
    }

    #[test]
    fn test_select_sample_refuses_to_overwrite_and_to_overdraw() {
        let storage = storage().with_file("study/sample.list", "old\n");
        let err = execute(&args(2), &storage, &mut std::io::sink()).unwrap_err();
        assert!(matches!(err, QscriptError::AlreadyExists { .. }));
        assert_eq!(storage.content("study/sample.list").unwrap(), "old\n");

        let err = execute(&args(5), &self::storage(), &mut std::io::sink()).unwrap_err();
        assert!(matches!(err, QscriptError::PopulationExhausted));
    }
}
