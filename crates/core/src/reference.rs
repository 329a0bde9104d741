//! Jeu de séquences de référence
//!
//! La première séquence est la référence primaire : toutes les coordonnées
//! du schéma sont exprimées par rapport à elle. Les autres ne servent qu'à
//! l'alignement de spécificité.

use crate::error::{Result, SchemeError};
use bio::alphabets::dna;
use bio::io::fasta;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Séquence de référence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Identifiant (en-tête FASTA)
    pub id: String,
    /// Séquence en majuscules, sans gaps
    pub seq: String,
}

impl Reference {
    /// Crée une référence en normalisant la séquence
    pub fn new(id: impl Into<String>, seq: &str) -> Self {
        let seq = seq
            .chars()
            .filter(|c| !matches!(c, '-' | '.') && !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        Self { id: id.into(), seq }
    }

    /// Longueur de la séquence
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// Vérifie si la séquence est vide
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// Jeu ordonné et non vide de références
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSet {
    references: Vec<Reference>,
}

impl ReferenceSet {
    /// Construit le jeu depuis des références déjà chargées
    pub fn new(references: Vec<Reference>) -> Result<Self> {
        let primary = references.first().ok_or(SchemeError::EmptyReferenceSet)?;

        if primary.is_empty() {
            return Err(SchemeError::InvalidReference(format!(
                "la référence primaire {} est vide",
                primary.id
            )));
        }
        if !primary.seq.is_ascii() {
            return Err(SchemeError::InvalidReference(format!(
                "la référence primaire {} contient des caractères non ASCII",
                primary.id
            )));
        }

        Ok(Self { references })
    }

    /// Lit un fichier FASTA (aligné ou non)
    pub fn from_fasta<R: Read>(reader: R) -> Result<Self> {
        let mut references = Vec::new();

        for record in fasta::Reader::new(reader).records() {
            let record = record?;
            let seq = std::str::from_utf8(record.seq()).map_err(|e| {
                SchemeError::InvalidReference(format!("{}: {}", record.id(), e))
            })?;
            references.push(Reference::new(record.id(), seq));
        }

        Self::new(references)
    }

    /// Référence primaire
    pub fn primary(&self) -> &Reference {
        &self.references[0]
    }

    /// Longueur de la référence primaire
    pub fn primary_len(&self) -> usize {
        self.primary().len()
    }

    /// Nombre de références
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Toujours faux : le jeu n'est jamais vide
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Itère sur les références, primaire en tête
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter()
    }

    /// Identifiants des références
    pub fn ids(&self) -> Vec<String> {
        self.references.iter().map(|r| r.id.clone()).collect()
    }
}

/// Complément inverse d'une séquence (codes IUPAC gérés)
pub fn reverse_complement(seq: &str) -> String {
    String::from_utf8_lossy(&dna::revcomp(seq.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_normalisation() {
        let reference = Reference::new("ref", "ac-gt..n\nA");
        assert_eq!(reference.seq, "ACGTNA");
        assert_eq!(reference.len(), 6);
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(
            ReferenceSet::new(Vec::new()),
            Err(SchemeError::EmptyReferenceSet)
        ));
        assert!(matches!(
            ReferenceSet::new(vec![Reference::new("vide", "---")]),
            Err(SchemeError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_from_fasta() {
        let fasta = b">MN908947.3 primaire\nACGTACGT\nGGCC\n>MT\nACGT-CGTGGCC\n";
        let set = ReferenceSet::from_fasta(&fasta[..]).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.primary().id, "MN908947.3");
        assert_eq!(set.primary_len(), 12);
        assert_eq!(set.ids(), vec!["MN908947.3".to_string(), "MT".to_string()]);
        assert_eq!(set.iter().nth(1).unwrap().seq, "ACGTCGTGGCC");
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("AACGTT"), "AACGTT");
        assert_eq!(reverse_complement("AAAC"), "GTTT");
        assert_eq!(reverse_complement("ACGN"), "NCGT");
    }
}
