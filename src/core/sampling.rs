//! Block-randomized drawing of articles from several volumes.
//!
//! Each volume directory is a subpopulation whose articles are listed in
//! `<volumedir>/metadata/<volumename>.list`. Draws go round-robin over the
//! volumes so that every block of the sample is stratified over them.

use crate::core::metadata;
use crate::domain::model::Entry;
use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Draws are reproducible from the seed alone.
pub fn rng_from(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// A seed for when the user gives none. It gets recorded with the sample.
pub fn fresh_seed() -> u64 {
    rand::random()
}

pub fn volumename(volumedir: &Path) -> Result<String> {
    volumedir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| {
            QscriptError::metadata(format!("not a volume directory: '{}'", volumedir.display()))
        })
}

/// `<volumedir>/metadata/<volumename>.list`
pub fn volume_list_file(volumedir: &Path) -> Result<PathBuf> {
    let name = volumename(volumedir)?;
    Ok(volumedir.join("metadata").join(format!("{}.list", name)))
}

/// `<volumedir>/metadata/<volumename>-dblp.json`
pub fn volume_metadata_file(volumedir: &Path) -> Result<PathBuf> {
    let name = volumename(volumedir)?;
    Ok(volumedir.join("metadata").join(format!("{}-dblp.json", name)))
}

#[derive(Debug, Clone)]
pub struct Population {
    subpopulations: Vec<Vec<Entry>>,
    /// Where to attempt to draw from next time
    next: usize,
}

impl Population {
    pub fn load<S: Storage, R: Rng + ?Sized>(
        storage: &S,
        volumedirs: &[PathBuf],
        rng: &mut R,
    ) -> Result<Self> {
        let mut subpopulations = Vec::with_capacity(volumedirs.len());
        for volumedir in volumedirs {
            let listfile = volume_list_file(volumedir)?;
            let entries = metadata::read_list(storage, &listfile)?;
            tracing::debug!("{}: {} articles", listfile.display(), entries.len());
            subpopulations.push(entries);
        }
        Ok(Self::new(subpopulations, rng))
    }

    /// Shuffles each subpopulation.
    pub fn new<R: Rng + ?Sized>(mut subpopulations: Vec<Vec<Entry>>, rng: &mut R) -> Self {
        for subpopulation in &mut subpopulations {
            subpopulation.shuffle(rng);
        }
        Self {
            subpopulations,
            next: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.subpopulations.iter().map(Vec::len).sum()
    }

    /// Draw from the next subpopulation, skipping those that have run dry.
    pub fn draw1(&mut self) -> Result<Entry> {
        if self.remaining() == 0 {
            return Err(QscriptError::PopulationExhausted);
        }
        loop {
            let current = self.next;
            self.next = (current + 1) % self.subpopulations.len();
            if let Some(entry) = self.subpopulations[current].pop() {
                return Ok(entry);
            }
        }
    }
}

/// A list that shuffles each block as soon as it is complete.
/// An incomplete last block is left in drawing order.
#[derive(Debug, Clone)]
pub struct Sample {
    blocksize: usize,
    elems: Vec<Entry>,
}

impl Sample {
    pub fn new(blocksize: usize) -> Self {
        Self {
            blocksize,
            elems: Vec::new(),
        }
    }

    pub fn add<R: Rng + ?Sized>(&mut self, elem: Entry, rng: &mut R) {
        self.elems.push(elem);
        let len = self.elems.len();
        if len % self.blocksize == 0 {
            self.elems[len - self.blocksize..].shuffle(rng);
        }
    }

    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.elems
    }

    pub fn citekeys(&self) -> Result<Vec<&str>> {
        self.elems.iter().map(|e| metadata::citekey(e)).collect()
    }
}
