//! Alignement de spécificité des amorces
//!
//! Les références sont supposées colinéaires à la primaire : chaque amorce
//! est alignée (semi-globalement) dans une fenêtre centrée sur sa position,
//! élargie de `margin` bases de part et d'autre.

use amptile_core::{Aligner, Alignment, CandidatePrimer, Direction, ReferenceSet, Result, SchemeError};
use bio::alignment::pairwise;
use bio::alignment::AlignmentOperation;
use bio::alphabets::dna;
use tracing::trace;

/// Aligneur par programmation dynamique (`bio::alignment::pairwise`)
#[derive(Debug, Clone)]
pub struct PairwiseAligner {
    /// Marge autour de la position attendue (pb)
    pub margin: usize,
    /// Identité minimale exigée sur la référence primaire (0-1)
    pub min_primary_identity: f64,
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for PairwiseAligner {
    fn default() -> Self {
        Self {
            margin: 100,
            min_primary_identity: 0.9,
            match_score: 1,
            mismatch_score: -1,
            gap_open: -5,
            gap_extend: -1,
        }
    }
}

impl Aligner for PairwiseAligner {
    fn align(&self, primer: &CandidatePrimer, references: &ReferenceSet) -> Result<Vec<Alignment>> {
        if primer.is_empty() {
            return Err(SchemeError::AlignmentFailed("amorce vide".to_string()));
        }

        // Les amorces droites sont lues sur le brin direct
        let probe = match primer.direction {
            Direction::Left => primer.seq.as_bytes().to_vec(),
            Direction::Right => dna::revcomp(primer.seq.as_bytes()),
        };
        let (lo, hi) = primer.footprint();

        let (match_score, mismatch_score) = (self.match_score, self.mismatch_score);
        let score = |a: u8, b: u8| if a == b { match_score } else { mismatch_score };
        let mut aligner = pairwise::Aligner::with_capacity(
            probe.len(),
            probe.len() + 2 * self.margin,
            self.gap_open,
            self.gap_extend,
            score,
        );

        let mut alignments = Vec::with_capacity(references.len());
        for (i, reference) in references.iter().enumerate() {
            let text = reference.seq.as_bytes();
            let from = lo.saturating_sub(self.margin).min(text.len());
            let to = (hi + 1 + self.margin).min(text.len());

            if from >= to {
                if i == 0 {
                    return Err(SchemeError::AlignmentFailed(format!(
                        "{} hors de la référence primaire {}",
                        primer.seq, reference.id
                    )));
                }
                trace!("{}: fenêtre vide pour {}", reference.id, primer.seq);
                continue;
            }

            let aln = aligner.semiglobal(&probe, &text[from..to]);
            let matches = aln
                .operations
                .iter()
                .filter(|op| matches!(op, AlignmentOperation::Match))
                .count();
            let identity = matches as f64 / probe.len() as f64;

            if i == 0 && identity < self.min_primary_identity {
                return Err(SchemeError::AlignmentFailed(format!(
                    "{}: identité {:.2} sur {} < {:.2}",
                    primer.seq, identity, reference.id, self.min_primary_identity
                )));
            }

            alignments.push(Alignment {
                reference_id: reference.id.clone(),
                score: aln.score,
                identity,
                ref_start: from + aln.ystart,
                ref_end: from + aln.yend,
                cigar: aln.cigar(false),
            });
        }

        Ok(alignments)
    }
}
