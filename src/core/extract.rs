//! Framework for extracting one part (abstract, conclusion) of article PDFs.

use crate::core::metadata;
use crate::domain::model::Layout;
use crate::domain::ports::{Extractor, Storage};
use crate::utils::error::{QscriptError, Result};
use regex::Regex;
use std::path::Path;

/// The first layout type whose `applies_to` names the entry's venue (`TSE`) or volume (`ICSE-2022`).
pub fn decide_layouttype<'a>(layouts: &'a [Layout], entry: &str) -> Result<&'a Layout> {
    let volume = metadata::volume(entry)?;
    let (_, venue, _) = metadata::volume_as_path_name_year(volume)?;
    layouts
        .iter()
        .find(|layout| {
            layout
                .applies_to
                .iter()
                .any(|candidate| candidate == venue || candidate == volume)
        })
        .ok_or_else(|| QscriptError::ExtractionError {
            message: format!("cannot find layouttype for volume '{}'", volume),
        })
}

pub fn layout_by_name<'a>(layouts: &'a [Layout], name: &str) -> Result<&'a Layout> {
    layouts
        .iter()
        .find(|layout| layout.name == name)
        .ok_or_else(|| QscriptError::InvalidConfigValueError {
            field: "layout".to_string(),
            value: name.to_string(),
            reason: format!(
                "Known layouts: {}",
                layouts
                    .iter()
                    .map(|l| l.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
}

/// Extract from a single `.pdf` or from every PDF named in a `.list` file.
/// Returns the number of files written.
pub fn extract_parts<E: Extractor, S: Storage>(
    extractor: &E,
    storage: &S,
    layouts: &[Layout],
    layout_name: Option<&str>,
    outputdir: &Path,
    inputfile: &Path,
) -> Result<usize> {
    let choose = |entry: &str| match layout_name {
        Some(name) => layout_by_name(layouts, name),
        None => decide_layouttype(layouts, entry),
    };

    match inputfile.extension().and_then(|e| e.to_str()) {
        Some("pdf") => {
            let entry = inputfile.to_string_lossy();
            let layout = choose(entry.as_ref())?;
            extract_part(extractor, storage, layout, inputfile, outputdir).map(usize::from)
        }
        Some("list") => {
            let mut written = 0;
            for entry in metadata::read_list(storage, inputfile)? {
                if entry.trim().is_empty() {
                    continue;
                }
                let layout = choose(entry.as_str())?;
                if extract_part(extractor, storage, layout, Path::new(&entry), outputdir)? {
                    written += 1;
                }
            }
            Ok(written)
        }
        _ => {
            tracing::warn!(
                "'{}': unknown input file type; must be .pdf or .list",
                inputfile.display()
            );
            Ok(0)
        }
    }
}

/// Extract into `<outputdir>/<basename>.txt` unless that exists. Returns whether a file was written.
pub fn extract_part<E: Extractor, S: Storage>(
    extractor: &E,
    storage: &S,
    layout: &Layout,
    pdffile: &Path,
    outputdir: &Path,
) -> Result<bool> {
    let basename = pdffile
        .file_stem()
        .ok_or_else(|| QscriptError::metadata(format!("no file name in '{}'", pdffile.display())))?;
    let outputpath = outputdir.join(format!("{}.txt", basename.to_string_lossy()));
    if storage.exists(&outputpath) {
        tracing::warn!("'{}' exists! SKIPPED.", outputpath.display());
        return Ok(false);
    }
    let part = extractor.extract(layout, pdffile)?;
    tracing::info!("writing '{}'", outputpath.display());
    storage.write(&outputpath, part.as_bytes())?;
    Ok(true)
}

/// The text between the layout's `start` and `end` patterns, cleaned up.
pub fn cut_part(text: &str, layout: &Layout) -> Result<String> {
    let start = compile(&layout.start)?;
    let begin = start
        .find(text)
        .map(|m| m.end())
        .ok_or_else(|| QscriptError::ExtractionError {
            message: format!("layout '{}': start pattern not found", layout.name),
        })?;
    let rest = &text[begin..];
    let part = match &layout.end {
        Some(end) => {
            let end = compile(end)?;
            end.find(rest).map_or(rest, |m| &rest[..m.start()])
        }
        None => rest,
    };
    let cleaned = remove_stuff(part, &layout.remove)?;
    Ok(more_readable(cleaned.trim()))
}

/// Replace some special characters (such as ligatures) by more readable equivalents.
pub fn more_readable(text: &str) -> String {
    text.replace('\u{fb01}', "fi").replace('\u{fb02}', "fl")
}

/// Replace regex matches (which are often whole paragraphs) by a single newline.
pub fn remove_stuff<P: AsRef<str>>(text: &str, removelist: &[P]) -> Result<String> {
    let mut result = text.to_string();
    for pattern in removelist {
        let regex = compile(pattern.as_ref())?;
        result = regex.replace_all(&result, "\n").into_owned();
    }
    Ok(result)
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| QscriptError::pattern(pattern, e))
}
