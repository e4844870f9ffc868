//! One module per subcommand: its clap `Args` and an `execute` that writes
//! its report to `out` and returns the number of problems found.

pub mod check_codings;
pub mod codebook;
pub mod coding_report;
pub mod compare_codings;
pub mod extract;
pub mod fix_encoding;
pub mod prepare_ann;
pub mod prepare_sample;
pub mod select_sample;
