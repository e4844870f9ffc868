pub mod commands;

use crate::adapters::PdfToText;
use crate::config::toml_config::ProjectConfig;
use crate::config::Command;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::palette::Palette;
use commands::{
    check_codings, codebook, coding_report, compare_codings, extract, fix_encoding, prepare_ann,
    prepare_sample, select_sample,
};
use std::io::Write;

/// Run one subcommand. Returns the problem count, capped at 255, for the exit code.
pub fn run<S: Storage, W: Write>(
    command: &Command,
    storage: &S,
    config: &ProjectConfig,
    palette: Palette,
    out: &mut W,
) -> Result<u8> {
    tracing::debug!("running {:?}", command);
    match command {
        Command::CheckCodings(args) => check_codings::execute(args, storage, config, palette, out),
        Command::CompareCodings(args) => {
            compare_codings::execute(args, storage, config, palette, out)
        }
        Command::CodingReport(args) => coding_report::execute(args, storage, config, out),
        Command::SelectSample(args) => select_sample::execute(args, storage, out),
        Command::PrepareSample(args) => {
            let extractor = PdfToText::new(&config.extract.pdftotext);
            prepare_sample::execute(args, &extractor, storage, config, out)
        }
        Command::PrepareAnn(args) => prepare_ann::execute(args, storage, out),
        Command::FixEncoding(args) => fix_encoding::execute(args, storage, out),
        Command::Extract(args) => {
            let extractor = PdfToText::new(&config.extract.pdftotext);
            extract::execute(args, &extractor, storage, config, out)
        }
        Command::Codebook(args) => codebook::execute(args, storage, config, palette, out),
    }
}
