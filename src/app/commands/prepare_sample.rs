use crate::app::commands::select_sample::TITLES_FILE;
use crate::config::toml_config::ProjectConfig;
use crate::core::extract::decide_layouttype;
use crate::core::metadata::{self, SAMPLE_LIST};
use crate::core::sentences;
use crate::domain::model::{Layout, Part};
use crate::domain::ports::{Extractor, Storage};
use crate::utils::error::{QscriptError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// What to extract from the articles
    #[arg(value_enum)]
    pub part: Part,

    /// Directory with the sample* files, where the 'raw' result dir is placed
    pub workdir: PathBuf,

    /// Directory containing the volume directories mentioned in sample.list
    #[arg(long, value_name = "DIR")]
    pub volumedir: PathBuf,

    /// Silently skip existing extracts and create any missing ones
    #[arg(long)]
    pub remainder: bool,
}

pub fn execute<E: Extractor, S: Storage, W: Write>(
    args: &Args,
    extractor: &E,
    storage: &S,
    config: &ProjectConfig,
    out: &mut W,
) -> Result<u8> {
    let layouts = config.extract.required_layouts(args.part)?;
    let targetdir = args.workdir.join("raw");
    if args.remainder {
        if !storage.exists(&targetdir) {
            return Err(QscriptError::file(
                &targetdir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "does not exist, so there is no remainder to complete",
                ),
            ));
        }
    } else if storage.exists(&targetdir) {
        return Err(QscriptError::AlreadyExists { path: targetdir });
    } else {
        storage.create_dir(&targetdir)?;
    }

    let sample = metadata::read_list(storage, &args.workdir.join(SAMPLE_LIST))?;
    let titles: HashMap<String, String> =
        serde_json::from_str(&storage.read_to_string(&args.workdir.join(TITLES_FILE))?)?;
    let mut written = 0usize;
    for article in &sample {
        if prepare_article(extractor, storage, layouts, &targetdir, &args.volumedir, article, &titles, out)? {
            written += 1;
        }
    }
    tracing::info!("{} of {} articles prepared", written, sample.len());
    Ok(0)
}

/// Extract the part, split it by sentence with `{{}}` after each, and write it
/// under its title. Existing files are kept. Returns whether a file was written.
#[allow(clippy::too_many_arguments)]
fn prepare_article<E: Extractor, S: Storage, W: Write>(
    extractor: &E,
    storage: &S,
    layouts: &[Layout],
    targetdir: &Path,
    volumedir: &Path,
    article: &str,
    titles: &HashMap<String, String>,
    out: &mut W,
) -> Result<bool> {
    let citekey = metadata::citekey(article)?;
    let targetfile = targetdir.join(format!("{}.txt", citekey));
    if storage.exists(&targetfile) {
        return Ok(false);
    }
    writeln!(out, "{}  \t-> {}", article, targetfile.display())?;
    let layout = decide_layouttype(layouts, article)?;
    let text = extractor.extract(layout, &volumedir.join(article))?;
    let title = titles
        .get(citekey)
        .ok_or_else(|| QscriptError::metadata(format!("no title for '{}' in {}", citekey, TITLES_FILE)))?;
    let content = format!("{}\n\n{}---\n", title, sentences::prepared(&text));
    storage.write(&targetfile, content.as_bytes())?;
    Ok(true)
}
