#![allow(dead_code)]

//! Collaborateurs scriptés pour les tests d'intégration

use amptile_core::{
    Aligner, Alignment, CandidatePrimer, DesignRequest, Direction, PrimerDesigner, PrimerParameters,
    Reference, ReferenceSet, Result, SchemeConfig, SchemeError,
};
use std::sync::Mutex;

/// Position de l'amorce dans chaque tranche (vue par le moteur)
pub const HIT_POS: usize = 5;
/// Longueur des amorces proposées
pub const HIT_LEN: usize = 20;

/// Moteur scripté : une amorce par brin quand `accepts(offset)` est vrai
pub struct ScriptedDesigner {
    accepts: Box<dyn Fn(usize) -> bool + Send + Sync>,
    fail_with_error: Option<Box<dyn Fn(usize) -> bool + Send + Sync>>,
    left_pos: Option<Box<dyn Fn(usize) -> usize + Send + Sync>>,
    forward_offsets: Mutex<Vec<usize>>,
}

impl ScriptedDesigner {
    pub fn new(accepts: impl Fn(usize) -> bool + Send + Sync + 'static) -> Self {
        Self {
            accepts: Box::new(accepts),
            fail_with_error: None,
            left_pos: None,
            forward_offsets: Mutex::new(Vec::new()),
        }
    }

    /// Renvoie une erreur non classée pour les positions indiquées
    pub fn failing_hard(mut self, when: impl Fn(usize) -> bool + Send + Sync + 'static) -> Self {
        self.fail_with_error = Some(Box::new(when));
        self
    }

    /// Place l'amorce gauche à une position dépendant de la tranche
    pub fn placing_left(mut self, pos: impl Fn(usize) -> usize + Send + Sync + 'static) -> Self {
        self.left_pos = Some(Box::new(pos));
        self
    }

    /// Positions des tranches demandées sur le brin direct, dans l'ordre
    pub fn forward_offsets(&self) -> Vec<usize> {
        self.forward_offsets.lock().unwrap().clone()
    }
}

impl PrimerDesigner for ScriptedDesigner {
    fn design(&self, request: &DesignRequest<'_>) -> Result<Vec<CandidatePrimer>> {
        if request.direction == Direction::Left {
            self.forward_offsets.lock().unwrap().push(request.offset);
        }
        if let Some(when) = &self.fail_with_error {
            if when(request.offset) {
                return Err(SchemeError::Designer("moteur interrompu".to_string()));
            }
        }
        if !(self.accepts)(request.offset) {
            return Ok(Vec::new());
        }

        let pos = match (&self.left_pos, request.direction) {
            (Some(place), Direction::Left) => place(request.offset),
            _ => HIT_POS,
        };
        let primer = CandidatePrimer::from_slice_hit(
            request.direction,
            request.offset,
            request.sequence.len(),
            pos,
            &request.sequence[pos..pos + HIT_LEN],
            0.5,
        )?;
        Ok(vec![primer])
    }
}

/// Aligneur parfait : identité 1.0 sur chaque référence
pub struct PerfectAligner;

impl Aligner for PerfectAligner {
    fn align(&self, primer: &CandidatePrimer, references: &ReferenceSet) -> Result<Vec<Alignment>> {
        let (lo, hi) = primer.footprint();
        Ok(references
            .iter()
            .map(|r| Alignment {
                reference_id: r.id.clone(),
                score: primer.len() as i32,
                identity: 1.0,
                ref_start: lo,
                ref_end: hi + 1,
                cigar: format!("{}=", primer.len()),
            })
            .collect())
    }
}

/// Référence déterministe de longueur `len`
pub fn references(len: usize) -> ReferenceSet {
    let seq: String = "ACGTTGCAAGCTTAGC".chars().cycle().take(len).collect();
    ReferenceSet::new(vec![
        Reference::new("primaire", &seq),
        Reference::new("secondaire", &seq),
    ])
    .unwrap()
}

/// Amplicons 400-420, pas de 10, chevauchement visé de 50
pub fn config() -> SchemeConfig {
    SchemeConfig {
        prefix: "TEST".to_string(),
        target_overlap: 50,
        step_distance: 10,
        min_unique: 3,
        primer: PrimerParameters {
            amplicon_size_min: 400,
            amplicon_size_max: 420,
            primer_max_size: 30,
            ..Default::default()
        },
    }
}
