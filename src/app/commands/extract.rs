use crate::config::toml_config::ProjectConfig;
use crate::core::extract::extract_parts;
use crate::domain::model::Part;
use crate::domain::ports::{Extractor, Storage};
use crate::utils::error::Result;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Which part of the articles to extract
    #[arg(value_enum)]
    pub part: Part,

    /// Directory where the extracted <basename>.txt files are placed
    pub outputdir: PathBuf,

    /// A .pdf file, or a .list file naming one PDF per line
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Use this layout type instead of deciding by venue or volume
    #[arg(long, value_name = "NAME")]
    pub layout: Option<String>,
}

pub fn execute<E: Extractor, S: Storage, W: Write>(
    args: &Args,
    extractor: &E,
    storage: &S,
    config: &ProjectConfig,
    out: &mut W,
) -> Result<u8> {
    let layouts = config.extract.required_layouts(args.part)?;
    let mut written = 0;
    for input in &args.inputs {
        written += extract_parts(
            extractor,
            storage,
            layouts,
            args.layout.as_deref(),
            &args.outputdir,
            input,
        )?;
    }
    writeln!(
        out,
        "wrote {} {} file(s) to '{}'",
        written,
        args.part,
        args.outputdir.display()
    )?;
    Ok(0)
}
