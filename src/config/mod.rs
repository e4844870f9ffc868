pub mod toml_config;

use crate::app::commands::{
    check_codings, codebook, coding_report, compare_codings, extract, fix_encoding, prepare_ann,
    prepare_sample, select_sample,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "qscript")]
#[command(version)]
#[command(about = "Tooling for qualitative coding studies of research articles")]
pub struct Cli {
    /// Project configuration file [default: ./qscript.toml if present]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not color the reports
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check annotated (and unannotated) extracts files for syntax errors and undefined codes
    ///
    /// Reads all extracts files listed in the who/what file and reports problems on stdout.
    /// The exit code is the number of problems.
    #[command(visible_alias = "check")]
    CheckCodings(check_codings::Args),

    /// Compare annotations between coders and flag discrepancies
    ///
    /// Knows about allowed and non-allowed discrepancies and about the code for
    /// silencing discrepancies. Reports problems on stdout.
    #[command(visible_aliases = ["compare", "comp"])]
    CompareCodings(compare_codings::Args),

    /// Report coding progress per coder pair and per coder
    #[command(visible_alias = "report")]
    CodingReport(coding_report::Args),

    /// Draw a block-randomized list of articles of the given size
    SelectSample(select_sample::Args),

    /// Extract and prepare the sample's abstracts or conclusions (after select-sample)
    PrepareSample(prepare_sample::Args),

    /// Prepare text files for annotation
    ///
    /// Breaks lines after each sentence (using simple heuristics to determine the
    /// end of sentences) and inserts empty annotation braces {{}} on the next line.
    PrepareAnn(prepare_ann::Args),

    /// Make each file conform to UTF-8 encoding
    ///
    /// Files that are not valid UTF-8 are read as Windows-1252 and written back as UTF-8.
    FixEncoding(fix_encoding::Args),

    /// Extract the abstract or conclusion from article PDFs
    Extract(extract::Args),

    /// List the codes of the codebook with their suffixes and topics
    Codebook(codebook::Args),
}
