use crate::config::toml_config::ProjectConfig;
use crate::core::whowhat::WhoWhat;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Directory where the who/what file lives
    pub workdir: PathBuf,

    /// Also write the report rows to this CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

/// Compared pairs and the blocks they come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub pair_count: usize,
    pub blocks: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressReport {
    pub total: Progress,
    /// Coder pairs (names sorted within the pair), most pairs first
    pub pairs: Vec<((String, String), Progress)>,
    /// Coders that take part in any pair, most pairs first
    pub coders: Vec<(String, Progress)>,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    kind: &'a str,
    name: String,
    pairs: usize,
    blocks: usize,
}

impl ProgressReport {
    pub fn gather(whowhat: &WhoWhat) -> Self {
        let mut total = Progress::default();
        let mut pairs: Vec<((String, String), Progress)> = Vec::new();
        let mut position: HashMap<(String, String), usize> = HashMap::new();

        for pair in whowhat.pairs() {
            let key = if pair.coder1 <= pair.coder2 {
                (pair.coder1.clone(), pair.coder2.clone())
            } else {
                (pair.coder2.clone(), pair.coder1.clone())
            };
            let block = whowhat.blockname(&pair.file1).unwrap_or_default().to_string();
            total.pair_count += 1;
            total.blocks.insert(block.clone());
            let at = *position.entry(key.clone()).or_insert_with(|| {
                pairs.push((key, Progress::default()));
                pairs.len() - 1
            });
            pairs[at].1.pair_count += 1;
            pairs[at].1.blocks.insert(block);
        }
        // stable, so ties keep their order of first appearance
        pairs.sort_by(|a, b| b.1.pair_count.cmp(&a.1.pair_count));

        let mut coders: Vec<(String, Progress)> = Vec::new();
        for coder in whowhat.coders() {
            let mut progress = Progress::default();
            let mut involved = false;
            for ((first, second), data) in &pairs {
                if first == coder || second == coder {
                    involved = true;
                    progress.pair_count += data.pair_count;
                    progress.blocks.extend(data.blocks.iter().cloned());
                }
            }
            if involved {
                coders.push((coder.clone(), progress));
            }
        }
        coders.sort_by(|a, b| b.1.pair_count.cmp(&a.1.pair_count));

        Self {
            total,
            pairs,
            coders,
        }
    }

    pub fn write_text<W: Write>(&self, name_pad: usize, out: &mut W) -> Result<()> {
        writeln!(out, "=================================")?;
        writeln!(out, "=== Report of Coding Progress ===")?;
        writeln!(out, "=================================")?;
        writeln!(
            out,
            "\nCoded Units: {} ({} blocks)",
            self.total.pair_count,
            self.total.blocks.len()
        )?;
        writeln!(out, "\nCoding Pairs:")?;
        for ((first, second), data) in &self.pairs {
            writeln!(
                out,
                "{:<pad$} & {:<pad$} {} ({} blocks)",
                first,
                second,
                data.pair_count,
                data.blocks.len(),
                pad = name_pad
            )?;
        }
        writeln!(out, "\nCoding Individuals:")?;
        for (coder, data) in &self.coders {
            writeln!(
                out,
                "{:<pad$} {} ({} blocks)",
                coder,
                data.pair_count,
                data.blocks.len(),
                pad = name_pad
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let rows = std::iter::once(CsvRow {
            kind: "total",
            name: String::new(),
            pairs: self.total.pair_count,
            blocks: self.total.blocks.len(),
        })
        .chain(self.pairs.iter().map(|((first, second), data)| CsvRow {
            kind: "pair",
            name: format!("{} & {}", first, second),
            pairs: data.pair_count,
            blocks: data.blocks.len(),
        }))
        .chain(self.coders.iter().map(|(coder, data)| CsvRow {
            kind: "coder",
            name: coder.clone(),
            pairs: data.pair_count,
            blocks: data.blocks.len(),
        }));
        for row in rows {
            writer.serialize(row)?;
        }
        writer.into_inner().map_err(|e| e.into_error().into())
    }
}

pub fn execute<S: Storage, W: Write>(
    args: &Args,
    storage: &S,
    config: &ProjectConfig,
    out: &mut W,
) -> Result<u8> {
    let whowhat = WhoWhat::load(storage, &args.workdir, &config.whowhat)?;
    let report = ProgressReport::gather(&whowhat);
    let name_pad = whowhat.coders().iter().map(String::len).max().unwrap_or(0);
    report.write_text(name_pad, out)?;

    if let Some(csvfile) = &args.csv {
        storage.write(csvfile, &report.to_csv()?)?;
        tracing::info!("wrote '{}'", csvfile.display());
    }
    Ok(0)
}
