use crate::config::toml_config::ProjectConfig;
use crate::core::codebook::{Codebook, SUFFIX_SEPARATOR};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::palette::Palette;
use std::io::Write;

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Report codes without a topic as problems
    #[arg(long)]
    pub check_topics: bool,
}

pub fn execute<S: Storage, W: Write>(
    args: &Args,
    storage: &S,
    config: &ProjectConfig,
    palette: Palette,
    out: &mut W,
) -> Result<u8> {
    let codebook = Codebook::load(storage, &config.codebook)?;
    let rows: Vec<(String, Option<&str>)> = codebook
        .codedefs()
        .map(|def| {
            let name = if def.suffixdef.is_empty() {
                def.code.clone()
            } else {
                format!("{}{}{}", def.code, SUFFIX_SEPARATOR, def.suffixdef)
            };
            (name, codebook.topic(&def.code).ok())
        })
        .collect();
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let mut problems = 0usize;
    for (name, topic) in &rows {
        match topic {
            Some(topic) => writeln!(out, "{:<width$}  {}", name, topic, width = width)?,
            None => {
                writeln!(out, "{:<width$}  {}", name, palette.red("?"), width = width)?;
                problems += 1;
            }
        }
    }
    writeln!(out, "\n{} codes", rows.len())?;
    if !args.check_topics {
        return Ok(0);
    }
    Ok(u8::try_from(problems).unwrap_or(u8::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;

    #[test]
    fn test_codebook_listing_with_topics() {
        let storage = MemoryStorage::new().with_file(
            "codebook.md",
            "code `gap:i\\d:u\\d`, code `h-gap`, code `-unsure`, code `design`",
        );
        let mut config = ProjectConfig::default();
        config
            .codebook
            .topics
            .insert("gap".to_string(), "quality".to_string());

        let mut out = Vec::new();
        let code = execute(
            &Args { check_topics: true },
            &storage,
            &config,
            Palette::plain(),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "gap:i\\d:u\\d  quality\n\
             h-gap        quality\n\
             -unsure      none\n\
             design       ?\n\
             \n4 codes\n"
        );
        assert_eq!(code, 1);

        let code = execute(
            &Args { check_topics: false },
            &storage,
            &config,
            Palette::plain(),
            &mut std::io::sink(),
        )
        .unwrap();
        assert_eq!(code, 0);
    }
}
