//! Domain entities: species and the distances between them

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::DomainError;

/// Header field holding the organism name in NCBI `ref` style headers,
/// e.g. `>gi|4504347|ref|NP_000510.1| hemoglobin |beta| Homo sapiens`.
const HEADER_NAME_FIELD: usize = 6;

/// Anything that can be placed at a leaf of a phylogenetic tree.
pub trait Entity {
    /// Unique, non-empty name. Becomes the leaf label.
    fn name(&self) -> &str;

    /// Symmetric, non-negative dissimilarity to another entity.
    fn distance(&self, other: &Self) -> f64;
}

/// A named biological sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    pub name: String,
    pub sequence: String,
}

impl Species {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    /// Distance to `other` under the given metric.
    pub fn distance_with(&self, other: &Species, metric: DistanceMetric) -> f64 {
        metric.distance(&self.sequence, &other.sequence)
    }
}

impl Entity for Species {
    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, other: &Self) -> f64 {
        self.distance_with(other, DistanceMetric::Hamming)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Sequence dissimilarity measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    /// Mismatching aligned positions plus the length difference.
    #[default]
    Hamming,
    /// Hamming distance divided by the longer sequence length.
    PDistance,
}

impl DistanceMetric {
    pub fn distance(self, a: &str, b: &str) -> f64 {
        let (a, b) = (a.as_bytes(), b.as_bytes());
        let mismatches = a.iter().zip(b.iter()).filter(|(x, y)| x != y).count();
        let hamming = mismatches + a.len().abs_diff(b.len());
        match self {
            DistanceMetric::Hamming => hamming as f64,
            DistanceMetric::PDistance => {
                let longest = a.len().max(b.len());
                if longest == 0 {
                    0.0
                } else {
                    hamming as f64 / longest as f64
                }
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Hamming => write!(f, "hamming"),
            DistanceMetric::PDistance => write!(f, "p-distance"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hamming" => Ok(DistanceMetric::Hamming),
            "p-distance" | "pdistance" | "p" => Ok(DistanceMetric::PDistance),
            other => Err(DomainError::UnknownMetric(other.to_string())),
        }
    }
}

/// Parse FASTA content into species.
///
/// Records whose name cannot be resolved are skipped, as are later records
/// repeating an already seen name. Text before the first header is ignored.
pub fn parse_fasta(content: &str) -> Vec<Species> {
    let mut species = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<(Option<String>, String)> = None;

    let mut flush = |record: Option<(Option<String>, String)>, species: &mut Vec<Species>| {
        if let Some((name, sequence)) = record {
            match name {
                Some(name) if seen.insert(name.clone()) => species.push(Species::new(name, sequence)),
                Some(name) => debug!("skipping duplicate species: {}", name),
                None => debug!("skipping record without resolvable name"),
            }
        }
    };

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('>') {
            flush(current.take(), &mut species);
            current = Some((header_name(header), String::new()));
        } else if let Some((_, sequence)) = current.as_mut() {
            sequence.extend(trimmed.chars().filter(|c| !c.is_whitespace()));
        }
    }
    flush(current.take(), &mut species);

    species
}

/// Resolve the species name from a FASTA header (without the leading `>`).
fn header_name(header: &str) -> Option<String> {
    let name = if header.contains('|') {
        header.split('|').nth(HEADER_NAME_FIELD)?.trim()
    } else {
        header.split_whitespace().next()?
    };
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AAAA", "AAAA", 0.0)]
    #[case("AAAA", "AAAT", 1.0)]
    #[case("AAAA", "TTTT", 4.0)]
    #[case("AAAA", "AA", 2.0)]
    #[case("", "", 0.0)]
    fn test_hamming(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert_eq!(DistanceMetric::Hamming.distance(a, b), expected);
        assert_eq!(DistanceMetric::Hamming.distance(b, a), expected);
    }

    #[rstest]
    #[case("AAAA", "AAAT", 0.25)]
    #[case("AAAA", "AA", 0.5)]
    #[case("", "", 0.0)]
    fn test_p_distance(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert_eq!(DistanceMetric::PDistance.distance(a, b), expected);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("hamming".parse::<DistanceMetric>(), Ok(DistanceMetric::Hamming));
        assert_eq!("P-Distance".parse::<DistanceMetric>(), Ok(DistanceMetric::PDistance));
        assert_eq!(
            "jukes".parse::<DistanceMetric>(),
            Err(DomainError::UnknownMetric("jukes".to_string()))
        );
    }

    #[test]
    fn test_species_entity_uses_hamming() {
        let a = Species::new("A", "ACGT");
        let b = Species::new("B", "ACGA");
        assert_eq!(a.distance(&b), 1.0);
        assert_eq!(a.name(), "A");
    }

    #[test]
    fn test_parse_fasta_plain_headers() {
        let content = "ignored preamble\n>human some description\nACGT\nAC GT\n>mouse\nTTTT\n";
        let species = parse_fasta(content);
        assert_eq!(
            species,
            vec![Species::new("human", "ACGTACGT"), Species::new("mouse", "TTTT")]
        );
    }

    #[test]
    fn test_parse_fasta_ref_headers() {
        let content = ">gi|4504347|ref|NP_000510.1| hemoglobin |beta| Homo sapiens\nMVHLT\nPEEK\n\
                       >gi|1|ref|NP_1| short\nAAAA\n";
        let species = parse_fasta(content);
        assert_eq!(species, vec![Species::new("Homo sapiens", "MVHLTPEEK")]);
    }

    #[test]
    fn test_parse_fasta_skips_unnamed_and_duplicates() {
        let content = ">\nAAAA\n>x\nCCCC\n>x\nGGGG\n";
        let species = parse_fasta(content);
        assert_eq!(species, vec![Species::new("x", "CCCC")]);
    }

    #[test]
    fn test_parse_fasta_empty() {
        assert!(parse_fasta("").is_empty());
    }
}
