// src/retrieval/catalog.rs
// Local fallback catalog of example documents

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::index;
use serde_json::Value;
use tracing::{debug, warn};

use super::{EXAMPLE_COUNT, ExampleRecord, ExampleSet};
use crate::error::{IdeaError, Result};

/// A directory of `*.json` example documents, read on every fetch.
///
/// Reads are read-only and idempotent, so independent sessions may share one
/// catalog without synchronisation.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    dir: PathBuf,
}

impl FallbackCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Candidate `*.json` files in file-name order
    fn document_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(IdeaError::Catalog(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Sample [`EXAMPLE_COUNT`] documents uniformly without replacement.
    ///
    /// Only the sampled files are parsed. A chosen file that is unreadable or
    /// not a JSON object is skipped and replaced by a fresh draw from the
    /// files not yet tried.
    pub fn fetch_local_examples<R>(&self, rng: &mut R) -> Result<ExampleSet>
    where
        R: Rng + ?Sized,
    {
        let mut untried = self.document_paths()?;
        let available = untried.len();
        let mut picked = Vec::with_capacity(EXAMPLE_COUNT);

        while picked.len() < EXAMPLE_COUNT {
            let needed = EXAMPLE_COUNT - picked.len();
            if untried.len() < needed {
                return Err(IdeaError::Catalog(format!(
                    "{} has fewer than {} valid documents",
                    self.dir.display(),
                    EXAMPLE_COUNT
                )));
            }

            let drawn = index::sample(rng, untried.len(), needed).into_vec();
            let chosen: Vec<PathBuf> = drawn.iter().map(|&i| untried[i].clone()).collect();
            untried = untried
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !drawn.contains(i))
                .map(|(_, path)| path)
                .collect();

            for path in chosen {
                match read_document(&path) {
                    Ok(record) => picked.push(record),
                    Err(e) => warn!(path = %path.display(), error = %e, "Skipping catalog document"),
                }
            }
        }
        debug!(available, "Sampled fallback examples");

        Ok(ExampleSet::local(picked))
    }
}

fn read_document(path: &Path) -> Result<ExampleRecord> {
    let raw = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => Ok(ExampleRecord::from_metadata(&map)),
        _ => Err(IdeaError::Catalog(format!(
            "{} is not a JSON object",
            path.display()
        ))),
    }
}
