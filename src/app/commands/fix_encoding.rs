use crate::domain::ports::Storage;
use crate::utils::error::Result;
use encoding_rs::WINDOWS_1252;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Files to check and perhaps convert
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn execute<S: Storage, W: Write>(args: &Args, storage: &S, out: &mut W) -> Result<u8> {
    let rule = "=".repeat(60);
    writeln!(out, "{}", rule)?;
    writeln!(out, "=== Rewrite non-UTF8 files (interpreted as Windows-1252) ===")?;
    writeln!(out, "{}", rule)?;
    for file in &args.files {
        check_and_perhaps_rewrite(storage, file, out)?;
    }
    Ok(0)
}

/// Returns whether the file was rewritten.
fn check_and_perhaps_rewrite<S: Storage, W: Write>(
    storage: &S,
    file: &Path,
    out: &mut W,
) -> Result<bool> {
    writeln!(out, "reading '{}'", file.display())?;
    let bytes = storage.read_bytes(file)?;
    if std::str::from_utf8(&bytes).is_ok() {
        return Ok(false);
    }
    writeln!(
        out,
        "==> rewriting '{}' from assumed Windows-1252 to UTF-8",
        file.display()
    )?;
    let (content, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
    storage.write(file, content.as_bytes())?;
    Ok(true)
}
