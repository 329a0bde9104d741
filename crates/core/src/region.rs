//! Région d'un schéma : recherche d'une paire d'amorces dans une fenêtre
//!
//! La recherche suit une petite machine à états explicite : on tente la
//! tranche courante, puis on décale vers la gauche jusqu'à la borne, on
//! revient à la position initiale et on décale vers la droite. Chaque
//! direction est bornée, la recherche termine donc toujours.

use crate::config::SchemeConfig;
use crate::error::{Result, SchemeError};
use crate::primer::{Aligner, CandidatePrimer, CandidatePrimerPair, DesignRequest, Direction, PrimerDesigner};
use crate::reference::{reverse_complement, ReferenceSet};
use crate::window::Window;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Pénalité individuelle maximale d'une amorce retenue
pub const PENALTY_THRESHOLD: f64 = 5.0;

/// Nombre de paires candidates détaillées dans les logs
const LOGGED_CANDIDATES: usize = 10;

/// Pool d'amplification (alternance stricte 1, 2, 1, 2...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Pool {
    One,
    Two,
}

impl Pool {
    /// Pool d'une région numérotée à partir de 1
    pub fn for_region(region_num: usize) -> Self {
        if region_num % 2 == 1 {
            Pool::One
        } else {
            Pool::Two
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Pool::One => 1,
            Pool::Two => 2,
        }
    }
}

impl From<Pool> for u8 {
    fn from(pool: Pool) -> u8 {
        pool.number()
    }
}

impl TryFrom<u8> for Pool {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Pool::One),
            2 => Ok(Pool::Two),
            other => Err(format!("pool inconnu: {}", other)),
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Collaborateurs et données partagés par toutes les recherches
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub references: &'a ReferenceSet,
    pub config: &'a SchemeConfig,
    pub designer: &'a dyn PrimerDesigner,
    pub aligner: &'a dyn Aligner,
}

/// Position de recherche courante d'une région
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAttempt {
    pub window: Window,
    /// La gauche a été explorée jusqu'à la borne
    pub exhausted_left: bool,
}

impl SearchAttempt {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            exhausted_left: false,
        }
    }

    /// Tentative suivante après un échec « amorces insuffisantes »
    pub fn next(self, region_num: usize) -> Result<Self> {
        if self.exhausted_left {
            return match self.window.step_right() {
                Ok(window) => Ok(Self { window, ..self }),
                Err(e) if e.is_bounds() => Err(SchemeError::NoSuitablePrimers {
                    region_num,
                    reason: "limite droite atteinte".to_string(),
                }),
                Err(e) => Err(e),
            };
        }

        match self.window.step_left() {
            Ok(window) => Ok(Self { window, ..self }),
            Err(e) if e.is_bounds() => Ok(Self {
                window: self.window.reset_slice(),
                exhausted_left: true,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Région conçue avec succès
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Numéro dans le schéma (à partir de 1)
    pub region_num: usize,
    pub pool: Pool,
    /// Fenêtre à la position où la paire a été trouvée
    pub window: Window,
    /// Meilleure paire candidate
    pub top_pair: CandidatePrimerPair,
}

impl Region {
    /// Cherche une paire d'amorces en déplaçant la fenêtre si nécessaire
    pub fn find_primers(region_num: usize, window: Window, ctx: &SearchContext<'_>) -> Result<Self> {
        let pool = Pool::for_region(region_num);
        debug!("Région {}, pool {}", region_num, pool);

        let mut attempt = SearchAttempt::new(window);
        loop {
            match find_primers_for_slice(&attempt.window, ctx) {
                Ok(top_pair) => {
                    return Ok(Self {
                        region_num,
                        pool,
                        window: attempt.window,
                        top_pair,
                    })
                }
                Err(e) if e.is_insufficient() => {
                    trace!("Région {}: {}", region_num, e);
                    attempt = attempt.next(region_num)?;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Une seule tentative sur la tranche courante, sans déplacement
pub fn find_primers_for_slice(window: &Window, ctx: &SearchContext<'_>) -> Result<CandidatePrimerPair> {
    debug!(
        "Recherche d'amorces sur [{}:{}]",
        window.slice_start(),
        window.slice_end()
    );

    let slice = window.ref_slice(ctx.references);
    let rev_slice = reverse_complement(slice);
    let request = |sequence, direction| DesignRequest {
        sequence,
        offset: window.slice_start(),
        direction,
        parameters: &ctx.config.primer,
        min_unique: ctx.config.min_unique,
    };
    let forward = request(slice, Direction::Left);
    let reverse = request(rev_slice.as_str(), Direction::Right);

    let designer = ctx.designer;
    let (left, right) = rayon::join(|| designer.design(&forward), || designer.design(&reverse));

    let left = retain_specific(left?, ctx)?;
    let right = retain_specific(right?, ctx)?;

    if left.is_empty() || right.is_empty() {
        return Err(SchemeError::InsufficientCandidates {
            left: left.len(),
            right: right.len(),
        });
    }

    let pairs = left
        .iter()
        .flat_map(|l| right.iter().map(move |r| CandidatePrimerPair::new(l.clone(), r.clone())))
        .collect();

    pick_pair(pairs)
}

/// Aligne chaque candidate et ne garde que celles spécifiques et sous le seuil
fn retain_specific(candidates: Vec<CandidatePrimer>, ctx: &SearchContext<'_>) -> Result<Vec<CandidatePrimer>> {
    let mut survivors = Vec::with_capacity(candidates.len());

    for mut primer in candidates {
        match ctx.aligner.align(&primer, ctx.references) {
            Ok(alignments) => primer.alignments = alignments,
            Err(SchemeError::AlignmentFailed(reason)) => {
                trace!("Amorce {} écartée: {}", primer.seq, reason);
                continue;
            }
            Err(e) => return Err(e),
        }

        if primer.penalty > PENALTY_THRESHOLD {
            trace!("Amorce {} écartée: pénalité {:.2}", primer.seq, primer.penalty);
            continue;
        }
        survivors.push(primer);
    }

    Ok(survivors)
}

/// Trie les paires par pénalité combinée croissante (tri stable)
pub fn rank_pairs(mut pairs: Vec<CandidatePrimerPair>) -> Vec<CandidatePrimerPair> {
    pairs.sort_by(|a, b| a.combined_penalty().total_cmp(&b.combined_penalty()));
    pairs
}

fn pick_pair(pairs: Vec<CandidatePrimerPair>) -> Result<CandidatePrimerPair> {
    let ranked = rank_pairs(pairs);

    for (i, pair) in ranked.iter().take(LOGGED_CANDIDATES).enumerate() {
        debug!(
            "Paire candidate {}: pénalité {:.2}, identité {:.2}",
            i,
            pair.combined_penalty(),
            pair.mean_identity()
        );
    }

    let top_pair = ranked
        .into_iter()
        .next()
        .ok_or(SchemeError::InsufficientCandidates { left: 0, right: 0 })?;

    debug!("Retenue: {}", top_pair);
    for alignment in top_pair.left.alignments.iter().chain(&top_pair.right.alignments) {
        trace!("{} {} {}", alignment.reference_id, alignment.ref_start, alignment.cigar);
    }

    Ok(top_pair)
}
