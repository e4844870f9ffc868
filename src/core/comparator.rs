//! Comparing the annotations two coders made for the same article.

use crate::core::annotations::{self, Annotations};
use crate::domain::model::{AnnotatedSentence, FilePair};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::palette::Palette;
use std::io::Write;
use std::path::Path;

/// The file pair under comparison, for message headers.
#[derive(Debug, Clone, Copy)]
pub struct ComparatorContext<'a> {
    pub file1: &'a Path,
    pub name1: &'a str,
    pub file2: &'a Path,
    pub name2: &'a str,
    pub block: &'a str,
}

impl<'a> ComparatorContext<'a> {
    pub fn new(pair: &'a FilePair, block: &'a str) -> Self {
        Self {
            file1: &pair.file1,
            name1: &pair.coder1,
            file2: &pair.file2,
            name2: &pair.coder2,
            block,
        }
    }
}

/// Prints discrepancies between coders and counts them.
///
/// Consecutive messages of the same kind share one header. After a problem,
/// the next agreeing sentence is shown once as context.
pub struct CodingsComparator<'a> {
    annotations: &'a Annotations,
    palette: Palette,
    maxcountdiff: u32,
    msgcount: usize,
    /// Message type in the last header
    lastmsg: String,
    /// Whether one more sentence after the previous problem has been shown already
    extra_line_done: bool,
}

impl<'a> CodingsComparator<'a> {
    pub fn new(annotations: &'a Annotations, maxcountdiff: u32, palette: Palette) -> Self {
        Self {
            annotations,
            palette,
            maxcountdiff,
            msgcount: 0,
            lastmsg: String::new(),
            extra_line_done: true,
        }
    }

    pub fn msgcount(&self) -> usize {
        self.msgcount
    }

    /// Each pair is visited once per coder, so every message was counted twice.
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.msgcount / 2).unwrap_or(u8::MAX)
    }

    pub fn compare_files<S: Storage, W: Write>(
        &mut self,
        storage: &S,
        ctx: &ComparatorContext<'_>,
        out: &mut W,
    ) -> Result<()> {
        let content1 = storage.read_to_string(ctx.file1)?;
        let content2 = storage.read_to_string(ctx.file2)?;
        let sentences1 = annotations::find_all_sentence_and_annotation_pairs(&content1);
        let sentences2 = annotations::find_all_sentence_and_annotation_pairs(&content2);
        self.compare_codings(ctx, &sentences1, &sentences2, out)
    }

    pub fn compare_codings<W: Write>(
        &mut self,
        ctx: &ComparatorContext<'_>,
        sentences1: &[AnnotatedSentence],
        sentences2: &[AnnotatedSentence],
        out: &mut W,
    ) -> Result<()> {
        self.lastmsg.clear();
        self.extra_line_done = true;
        let ignore = self.annotations.codebook().ignore_code().to_string();

        for (as1, as2) in sentences1.iter().zip(sentences2) {
            if as1.sentence != as2.sentence {
                let items = [
                    self.of(ctx.name1, &format!("\"{}\"", as1.sentence)),
                    self.of(ctx.name2, &format!("\"{}\"", as2.sentence)),
                ];
                self.printmsg(
                    ctx,
                    "Annotations should be at parallel points in the files, but are at different points here:",
                    &items,
                    out,
                )?;
                break;
            }
            if annotations::is_empty_annotation(&as1.annotation)
                || annotations::is_empty_annotation(&as2.annotation)
            {
                let items = self.problem_items(ctx, as1, as2);
                self.printmsg(
                    ctx,
                    "Incomplete annotation found, skipping rest of this file pair:",
                    &items,
                    out,
                )?;
                break;
            }

            let set1 = self.annotations.codings_of(&as1.annotation, true, true);
            let set2 = self.annotations.codings_of(&as2.annotation, true, true);
            if set1.contains(&ignore) && set2.contains(&ignore) {
                let items = self.problem_items(ctx, as1, as2);
                let msg = format!(
                    "Code '{}' should only appear in one coding, never in both as it does here:",
                    ignore
                );
                self.printmsg(ctx, &msg, &items, out)?;
                continue;
            }
            if set1.contains(&ignore) || set2.contains(&ignore) {
                continue;
            }
            if set1 != set2 {
                let items = self.problem_items(ctx, as1, as2);
                self.printmsg(
                    ctx,
                    "The sets of codes applied are different, please check:",
                    &items,
                    out,
                )?;
                continue;
            }

            let before = self.msgcount;
            self.check_suffixes(ctx, as1, as2, out)?;
            if self.msgcount > before {
                continue;
            }
            let items = [
                self.numbered_sentence(as1),
                self.of_ok(ctx.name1, &as1.annotation),
                self.of_ok(ctx.name2, &as2.annotation),
            ];
            self.printextra(&items, out)?;
        }
        Ok(())
    }

    fn check_suffixes<W: Write>(
        &mut self,
        ctx: &ComparatorContext<'_>,
        as1: &AnnotatedSentence,
        as2: &AnnotatedSentence,
        out: &mut W,
    ) -> Result<()> {
        let counts = self
            .annotations
            .codes_with_iucounts(&as1.annotation, &as2.annotation);
        for (code, counts) in counts {
            let idiff = counts.icount1.abs_diff(counts.icount2) > self.maxcountdiff;
            let udiff = counts.ucount1.abs_diff(counts.ucount2) > self.maxcountdiff;
            let what = match (idiff, udiff) {
                (true, true) => "i&u gaps",
                (true, false) => "informativeness gaps",
                (false, true) => "understandability gaps",
                (false, false) => continue,
            };
            let msg = format!("{}: Very different numbers of {}, please reconsider:", code, what);
            let items = self.problem_items(ctx, as1, as2);
            self.printmsg(ctx, &msg, &items, out)?;
        }
        Ok(())
    }

    /// Show a sentence with a problem. The header is suppressed if it equals the previous one.
    fn printmsg<W: Write>(
        &mut self,
        ctx: &ComparatorContext<'_>,
        msg: &str,
        items: &[String],
        out: &mut W,
    ) -> Result<()> {
        if msg != self.lastmsg {
            writeln!(out, "\n{}", self.palette.yellow(&format!("##### {}", msg)))?;
            for (file, name) in [(ctx.file1, ctx.name1), (ctx.file2, ctx.name2)] {
                writeln!(
                    out,
                    "{}  ({}, Block {})",
                    self.palette.blue(&file.display().to_string()),
                    name,
                    ctx.block
                )?;
            }
            self.lastmsg = msg.to_string();
        }
        for item in items {
            writeln!(out, "{}", item)?;
        }
        self.extra_line_done = false;
        self.msgcount += 1;
        Ok(())
    }

    /// Only once between any two problems.
    fn printextra<W: Write>(&mut self, items: &[String], out: &mut W) -> Result<()> {
        if self.extra_line_done {
            return Ok(());
        }
        for item in items {
            writeln!(out, "{}", item)?;
        }
        self.extra_line_done = true;
        Ok(())
    }

    fn problem_items(
        &self,
        ctx: &ComparatorContext<'_>,
        as1: &AnnotatedSentence,
        as2: &AnnotatedSentence,
    ) -> [String; 3] {
        [
            self.numbered_sentence(as1),
            self.of(ctx.name1, &as1.annotation),
            self.of(ctx.name2, &as2.annotation),
        ]
    }

    fn numbered_sentence(&self, sentence: &AnnotatedSentence) -> String {
        format!("[{}] {}", sentence.index, self.palette.bold(&sentence.sentence))
    }

    fn of(&self, name: &str, text: &str) -> String {
        format!("{}  ({})", self.palette.red(text), name)
    }

    fn of_ok(&self, name: &str, text: &str) -> String {
        format!("{}  -OK- ({})", self.palette.green(text), name)
    }
}
