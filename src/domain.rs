use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneId(String);

impl GeneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GeneId {
    type Err = ProxyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        if !is_path_segment(&normalized, &['.', '_', '-']) {
            return Err(ProxyError::InvalidGeneId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantId(String);

impl VariantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VariantId {
    type Err = ProxyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        if !is_path_segment(&normalized, &['.', '_', '-', ':']) {
            return Err(ProxyError::InvalidVariantId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species(String);

impl Species {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Species {
    type Err = ProxyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        if !is_path_segment(&normalized, &['_']) {
            return Err(ProxyError::InvalidSpecies(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

fn is_path_segment(value: &str, extra: &[char]) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || extra.contains(&ch))
}

pub mod paths {
    use super::{GeneId, Species, VariantId};

    pub fn lookup(gene: &GeneId) -> String {
        format!("/lookup/id/{gene}")
    }

    pub fn variation(species: &Species, variant: &VariantId) -> String {
        format!("/variation/{species}/{variant}")
    }

    pub fn homology(gene: &GeneId) -> String {
        format!("/homology/id/{gene}")
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_gene_id_trims() {
        let id: GeneId = " ENSG00000139618.17 ".parse().unwrap();
        assert_eq!(id.as_str(), "ENSG00000139618.17");
    }

    #[test]
    fn gene_id_rejects_path_traversal() {
        let err = "../info/ping".parse::<GeneId>().unwrap_err();
        assert_matches!(err, ProxyError::InvalidGeneId(_));
    }

    #[test]
    fn empty_species_rejected() {
        let err = "  ".parse::<Species>().unwrap_err();
        assert_matches!(err, ProxyError::InvalidSpecies(_));
    }

    #[test]
    fn variant_id_rejects_query_chars() {
        let err = "rs699?x=1".parse::<VariantId>().unwrap_err();
        assert_matches!(err, ProxyError::InvalidVariantId(_));
    }

    #[test]
    fn build_paths() {
        let gene: GeneId = "ENSG00000139618".parse().unwrap();
        let species: Species = "human".parse().unwrap();
        let variant: VariantId = "rs699".parse().unwrap();
        assert_eq!(paths::lookup(&gene), "/lookup/id/ENSG00000139618");
        assert_eq!(paths::homology(&gene), "/homology/id/ENSG00000139618");
        assert_eq!(
            paths::variation(&species, &variant),
            "/variation/human/rs699"
        );
    }
}
