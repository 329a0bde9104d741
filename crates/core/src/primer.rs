//! Amorces candidates, paires candidates et collaborateurs externes
//!
//! Convention de coordonnées (référence primaire, 0-based, inclusives) :
//! `start` est la base 5' de l'amorce et `end` sa base 3'. Une amorce gauche
//! a donc `start <= end`, une amorce droite `start >= end`.

use crate::config::PrimerParameters;
use crate::error::{Result, SchemeError};
use crate::reference::ReferenceSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pondération du défaut d'identité dans la pénalité combinée
pub const IDENTITY_PENALTY_WEIGHT: f64 = 10.0;

/// Orientation d'une amorce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Amorce gauche (brin direct)
    Left,
    /// Amorce droite (brin complémentaire)
    Right,
}

impl Direction {
    /// Vrai pour les amorces conçues sur le complément inverse
    pub fn is_reverse(self) -> bool {
        matches!(self, Direction::Right)
    }

    /// Brin au format BED
    pub fn strand(self) -> char {
        match self {
            Direction::Left => '+',
            Direction::Right => '-',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "LEFT"),
            Direction::Right => write!(f, "RIGHT"),
        }
    }
}

/// Résultat d'alignement d'une amorce contre une référence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// Identifiant de la référence alignée
    pub reference_id: String,
    /// Score brut de l'aligneur
    pub score: i32,
    /// Fraction de bases identiques (0-1) sur la longueur de l'amorce
    pub identity: f64,
    /// Début de l'alignement sur la référence (inclusif)
    pub ref_start: usize,
    /// Fin de l'alignement sur la référence (exclusive)
    pub ref_end: usize,
    /// Représentation CIGAR
    pub cigar: String,
}

/// Amorce candidate proposée par le moteur de conception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePrimer {
    pub direction: Direction,
    /// Base 5' sur la référence primaire
    pub start: usize,
    /// Base 3' sur la référence primaire
    pub end: usize,
    /// Séquence 5'->3'
    pub seq: String,
    /// Pénalité du moteur (plus bas = meilleur)
    pub penalty: f64,
    /// Alignements contre le jeu de références
    pub alignments: Vec<Alignment>,
}

impl CandidatePrimer {
    /// Traduit un résultat du moteur sur une tranche en coordonnées de référence
    ///
    /// `pos` est la position 5' de l'amorce dans la tranche telle que vue par
    /// le moteur, c'est-à-dire dans le complément inverse pour une amorce droite.
    pub fn from_slice_hit(
        direction: Direction,
        offset: usize,
        slice_len: usize,
        pos: usize,
        seq: impl Into<String>,
        penalty: f64,
    ) -> Result<Self> {
        let seq = seq.into();
        let len = seq.len();

        if len == 0 || pos + len > slice_len {
            return Err(SchemeError::Designer(format!(
                "amorce {} hors tranche: position {} longueur {} (tranche {})",
                direction, pos, len, slice_len
            )));
        }

        let (start, end) = match direction {
            Direction::Left => (offset + pos, offset + pos + len - 1),
            Direction::Right => {
                let start = offset + slice_len - 1 - pos;
                (start, start + 1 - len)
            }
        };

        Ok(Self {
            direction,
            start,
            end,
            seq,
            penalty,
            alignments: Vec::new(),
        })
    }

    /// Longueur de l'amorce
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// Vérifie si l'amorce est vide
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Empreinte sur la référence, bornes inclusives croissantes
    pub fn footprint(&self) -> (usize, usize) {
        (self.start.min(self.end), self.start.max(self.end))
    }

    /// Identité moyenne sur l'ensemble des alignements
    pub fn identity(&self) -> f64 {
        if self.alignments.is_empty() {
            return 0.0;
        }
        self.alignments.iter().map(|a| a.identity).sum::<f64>() / self.alignments.len() as f64
    }
}

/// Paire d'amorces candidate pour une région
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePrimerPair {
    pub left: CandidatePrimer,
    pub right: CandidatePrimer,
}

impl CandidatePrimerPair {
    pub fn new(left: CandidatePrimer, right: CandidatePrimer) -> Self {
        Self { left, right }
    }

    /// Identité moyenne des deux amorces
    pub fn mean_identity(&self) -> f64 {
        (self.left.identity() + self.right.identity()) / 2.0
    }

    /// Score de classement (plus bas = meilleur)
    pub fn combined_penalty(&self) -> f64 {
        self.left.penalty
            + self.right.penalty
            + (1.0 - self.mean_identity()) * IDENTITY_PENALTY_WEIGHT
    }

    /// Taille de l'amplicon, amorces comprises
    pub fn amplicon_size(&self) -> usize {
        (self.right.start + 1).saturating_sub(self.left.start)
    }
}

impl fmt::Display for CandidatePrimerPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} ({} pb, pénalité {:.2}, identité {:.2})",
            self.left.start,
            self.right.start,
            self.amplicon_size(),
            self.combined_penalty(),
            self.mean_identity()
        )
    }
}

/// Requête adressée au moteur de conception pour une tranche
#[derive(Debug, Clone, Copy)]
pub struct DesignRequest<'a> {
    /// Tranche (ou son complément inverse pour les amorces droites)
    pub sequence: &'a str,
    /// Position de la tranche sur la référence primaire
    pub offset: usize,
    pub direction: Direction,
    pub parameters: &'a PrimerParameters,
    /// Seuil d'unicité, non interprété par le schéma
    pub min_unique: usize,
}

/// Moteur de conception d'amorces externe
pub trait PrimerDesigner: Send + Sync {
    /// Propose des amorces candidates (éventuellement aucune) pour une tranche
    fn design(&self, request: &DesignRequest<'_>) -> Result<Vec<CandidatePrimer>>;
}

impl<F> PrimerDesigner for F
where
    F: Fn(&DesignRequest<'_>) -> Result<Vec<CandidatePrimer>> + Send + Sync,
{
    fn design(&self, request: &DesignRequest<'_>) -> Result<Vec<CandidatePrimer>> {
        self(request)
    }
}

/// Aligneur de spécificité externe
///
/// Doit renvoyer `SchemeError::AlignmentFailed` si aucun alignement
/// exploitable n'existe sur la référence primaire.
pub trait Aligner {
    fn align(&self, primer: &CandidatePrimer, references: &ReferenceSet) -> Result<Vec<Alignment>>;
}

impl<F> Aligner for F
where
    F: Fn(&CandidatePrimer, &ReferenceSet) -> Result<Vec<Alignment>>,
{
    fn align(&self, primer: &CandidatePrimer, references: &ReferenceSet) -> Result<Vec<Alignment>> {
        self(primer, references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alignment(identity: f64) -> Alignment {
        Alignment {
            reference_id: "ref".to_string(),
            score: 20,
            identity,
            ref_start: 0,
            ref_end: 20,
            cigar: "20=".to_string(),
        }
    }

    #[test]
    fn test_left_hit_coordinates() {
        let primer =
            CandidatePrimer::from_slice_hit(Direction::Left, 100, 420, 5, "ACGTACGTACGTACGTACGT", 1.0)
                .unwrap();
        assert_eq!(primer.start, 105);
        assert_eq!(primer.end, 124);
        assert_eq!(primer.footprint(), (105, 124));
    }

    #[test]
    fn test_right_hit_coordinates() {
        let primer =
            CandidatePrimer::from_slice_hit(Direction::Right, 100, 420, 5, "ACGTACGTACGTACGTACGT", 1.0)
                .unwrap();
        assert_eq!(primer.start, 514);
        assert_eq!(primer.end, 495);
        assert_eq!(primer.footprint(), (495, 514));
    }

    #[test]
    fn test_hit_outside_slice_rejected() {
        let result = CandidatePrimer::from_slice_hit(Direction::Right, 0, 10, 5, "ACGTACGT", 0.5);
        assert!(matches!(result, Err(SchemeError::Designer(_))));
    }

    #[test]
    fn test_combined_penalty() {
        let mut left =
            CandidatePrimer::from_slice_hit(Direction::Left, 0, 420, 0, "ACGTACGTACGTACGTACGT", 1.0)
                .unwrap();
        let mut right =
            CandidatePrimer::from_slice_hit(Direction::Right, 0, 420, 0, "ACGTACGTACGTACGTACGT", 2.0)
                .unwrap();
        left.alignments = vec![alignment(1.0), alignment(0.8)];
        right.alignments = vec![alignment(1.0), alignment(1.0)];

        let pair = CandidatePrimerPair::new(left, right);
        assert!((pair.mean_identity() - 0.95).abs() < 1e-9);
        assert!((pair.combined_penalty() - 3.5).abs() < 1e-9);
        assert_eq!(pair.amplicon_size(), 420);
    }

    #[test]
    fn test_identity_without_alignments() {
        let primer =
            CandidatePrimer::from_slice_hit(Direction::Left, 0, 30, 0, "ACGT", 0.0).unwrap();
        assert_eq!(primer.identity(), 0.0);
    }
}
