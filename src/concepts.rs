//! Candidate concept pool and pair sampling.
//!
//! The pool is loaded once at startup from the single-column CSV written by
//! `fetch_seeds` and shared read-only by every run.

use std::fmt;
use std::io::Read;
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{DaydreamError, Result};

/// Two concepts in draw order. Serialized as a 2-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct ConceptPair {
    pub first: String,
    pub second: String,
}

impl ConceptPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl From<[String; 2]> for ConceptPair {
    fn from([first, second]: [String; 2]) -> Self {
        Self { first, second }
    }
}

impl From<ConceptPair> for [String; 2] {
    fn from(pair: ConceptPair) -> Self {
        [pair.first, pair.second]
    }
}

impl fmt::Display for ConceptPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.first, self.second)
    }
}

/// Draw two independent uniform picks, with replacement.
pub fn sample_pair<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> Result<ConceptPair> {
    let (Some(first), Some(second)) = (candidates.choose(rng), candidates.choose(rng)) else {
        return Err(DaydreamError::config("concept candidate list is empty"));
    };
    Ok(ConceptPair::new(first.clone(), second.clone()))
}

#[derive(Debug, Clone)]
pub struct ConceptPool {
    concepts: Vec<String>,
}

impl ConceptPool {
    /// Trims entries and drops blanks; an empty result is a configuration error.
    pub fn new(concepts: impl IntoIterator<Item = String>) -> Result<Self> {
        let concepts: Vec<String> = concepts
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if concepts.is_empty() {
            return Err(DaydreamError::config("concept pool has no usable entries"));
        }
        Ok(Self { concepts })
    }

    /// Parse a headerless single-column CSV. Rows with unquoted commas are
    /// rejoined so a plain one-title-per-line file still loads intact.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut concepts = Vec::new();
        for record in rdr.records() {
            let record = record?;
            concepts.push(record.iter().collect::<Vec<_>>().join(","));
        }
        Self::new(concepts)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            DaydreamError::config(format!("cannot open seed file {}: {}", path.display(), e))
        })?;
        let pool = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            concepts = pool.len(),
            "Loaded concept pool"
        );
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ConceptPair> {
        sample_pair(&self.concepts, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sample_from_empty_list_is_config_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = sample_pair(&[], &mut rng).unwrap_err();
        assert!(matches!(err, DaydreamError::Config { .. }));
    }

    #[test]
    fn single_candidate_pairs_with_itself() {
        let mut rng = StdRng::seed_from_u64(7);
        let pair = sample_pair(&["Entropy".to_string()], &mut rng).unwrap();
        assert_eq!(pair, ConceptPair::new("Entropy", "Entropy"));
    }

    #[test]
    fn samples_stay_within_candidates() {
        let candidates: Vec<String> = ["Jazz", "Mycelium", "Bridges"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let pair = sample_pair(&candidates, &mut rng).unwrap();
            assert!(candidates.contains(&pair.first));
            assert!(candidates.contains(&pair.second));
        }
    }

    #[test]
    fn pair_serializes_as_ordered_array() {
        let pair = ConceptPair::new("Jazz", "Mycelium");
        assert_eq!(
            serde_json::to_string(&pair).unwrap(),
            r#"["Jazz","Mycelium"]"#
        );
        let back: ConceptPair = serde_json::from_str(r#"["Jazz","Mycelium"]"#).unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn pool_reads_quoted_csv_and_skips_blanks() {
        let csv = "Entropy\n\"Crime and Punishment, novel\"\n\n  Jazz  \nPeace, war\n";
        let pool = ConceptPool::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            pool.concepts(),
            &[
                "Entropy".to_string(),
                "Crime and Punishment, novel".to_string(),
                "Jazz".to_string(),
                "Peace, war".to_string(),
            ]
        );
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(ConceptPool::from_reader("\n\n".as_bytes()).is_err());
        assert!(ConceptPool::new(vec!["   ".to_string()]).is_err());
    }
}
