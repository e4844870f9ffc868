use crate::core::sentences;
use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Directory where prepared files will be placed
    pub outputdir: PathBuf,

    /// Text file to split by sentence, with an empty {{}} inserted after each
    #[arg(required = true)]
    pub textfiles: Vec<PathBuf>,
}

pub fn execute<S: Storage, W: Write>(args: &Args, storage: &S, out: &mut W) -> Result<u8> {
    for inputfile in &args.textfiles {
        prepare_one_file(storage, inputfile, &args.outputdir, out)?;
    }
    Ok(0)
}

/// Writes `<outputdir>/<basename of inputfile>` unless it exists.
fn prepare_one_file<S: Storage, W: Write>(
    storage: &S,
    inputfile: &Path,
    outputdir: &Path,
    out: &mut W,
) -> Result<()> {
    let text = storage.read_to_string(inputfile)?;
    let filename = inputfile
        .file_name()
        .ok_or_else(|| QscriptError::metadata(format!("no file name in '{}'", inputfile.display())))?;
    let outputpath = outputdir.join(filename);
    if storage.exists(&outputpath) {
        writeln!(out, "#### '{}' exists! SKIPPED.", outputpath.display())?;
        return Ok(());
    }
    writeln!(out, "---- writing '{}'", outputpath.display())?;
    storage.write(&outputpath, sentences::prepared(&text).as_bytes())
}
