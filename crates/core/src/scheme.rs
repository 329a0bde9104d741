//! Orchestration d'un schéma multiplex en tuiles
//!
//! Les régions sont construites une par une : les bornes de la région N+1
//! dépendent de la paire retenue pour la région N (chevauchement visé) et
//! pour la région N-1 (pas de chevauchement dans un même pool).

use crate::config::SchemeConfig;
use crate::error::{Result, SchemeError};
use crate::primer::{Aligner, CandidatePrimerPair, PrimerDesigner};
use crate::reference::ReferenceSet;
use crate::region::{Region, SearchContext};
use crate::window::Window;
use crate::{log_error, log_operation};
use tracing::{debug, info, warn};

/// Observateur de progression : (bases couvertes, bases totales)
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize);

/// Bornes initiales d'une région
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub left_limit: usize,
    /// Position visée, pouvant être négative si la référence est trop courte
    pub slice_start: i64,
    /// Le reste de la référence tient dans un dernier amplicon
    pub is_last: bool,
}

/// Schéma multiplex complet
#[derive(Debug, Clone)]
pub struct MultiplexScheme {
    references: ReferenceSet,
    config: SchemeConfig,
    pub(crate) regions: Vec<Region>,
}

impl MultiplexScheme {
    /// Crée un schéma vide après validation de la configuration
    pub fn new(references: ReferenceSet, config: SchemeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            references,
            config,
            regions: Vec::new(),
        })
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// Régions conçues, dans l'ordre du génome
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Longueur de la référence primaire
    pub fn reference_len(&self) -> usize {
        self.references.primary_len()
    }

    /// Conçoit le schéma complet
    ///
    /// Un échec sur la première région est propagé. Un échec ultérieur arrête
    /// simplement la croissance du schéma : les régions déjà conçues restent
    /// valides.
    pub fn design_scheme(
        &mut self,
        designer: &dyn PrimerDesigner,
        aligner: &dyn Aligner,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<()> {
        log_operation!("design_scheme", {
            let ref_len = self.reference_len();
            let ctx = SearchContext {
                references: &self.references,
                config: &self.config,
                designer,
                aligner,
            };

            let mut regions: Vec<Region> = Vec::new();
            let mut is_last = false;

            while !is_last {
                let region_num = regions.len() + 1;
                let prev = regions.last().map(|r| &r.top_pair);
                let prev_in_pool = if region_num > 2 {
                    regions.get(regions.len() - 2).map(|r| &r.top_pair)
                } else {
                    None
                };

                let bounds = region_bounds(&self.config, ref_len, prev, prev_in_pool);
                is_last = bounds.is_last;
                debug!("Région {}: {:?}", region_num, bounds);

                let region = start_window(&self.config, ref_len, &bounds)
                    .and_then(|window| Region::find_primers(region_num, window, &ctx));

                let region = match region {
                    Ok(region) => region,
                    Err(e) if e.is_region_exhausted() => {
                        if region_num == 1 {
                            return Err(log_error!(e));
                        }
                        warn!("Arrêt du schéma à la région {}: {}", region_num, e);
                        break;
                    }
                    Err(e) => return Err(log_error!(e)),
                };

                info!(
                    "Région {} (pool {}): {}",
                    region.region_num, region.pool, region.top_pair
                );
                if let Some(report) = progress.as_deref_mut() {
                    report(region.top_pair.right.start, ref_len);
                }
                regions.push(region);
            }

            info!("{} régions conçues", regions.len());
            self.regions = regions;
            if let Some(report) = progress.as_deref_mut() {
                report(ref_len, ref_len);
            }
            Ok(())
        })
    }
}

/// Construit la fenêtre de départ, une position négative étant hors limites
fn start_window(config: &SchemeConfig, ref_len: usize, bounds: &RegionBounds) -> Result<Window> {
    let slice_start = usize::try_from(bounds.slice_start).map_err(|_| SchemeError::BoundsExceeded {
        start: bounds.slice_start,
        end: bounds.slice_start + config.primer.amplicon_size_max as i64,
        left_limit: bounds.left_limit,
        right_limit: ref_len,
    })?;

    Window::new(config, ref_len, bounds.left_limit, slice_start, None)
}

/// Calcule les bornes de la région suivante
///
/// `prev` est la paire de la région précédente, `prev_in_pool` celle de la
/// région précédente du même pool (deux rangs plus tôt).
pub fn region_bounds(
    config: &SchemeConfig,
    ref_len: usize,
    prev: Option<&CandidatePrimerPair>,
    prev_in_pool: Option<&CandidatePrimerPair>,
) -> RegionBounds {
    let Some(prev) = prev else {
        return RegionBounds {
            left_limit: 0,
            slice_start: 0,
            is_last: false,
        };
    };

    // Premier amplicon du pool 2, ou trou entre les pools : on force la progression
    let left_limit = match prev_in_pool {
        Some(in_pool) if prev.left.start <= in_pool.right.start => in_pool.right.start + 1,
        _ => prev.left.end + 1,
    };

    let primer = &config.primer;
    let insert_start = prev.right.end as i64 - config.target_overlap as i64 - 1;
    let mut slice_start =
        insert_start - primer.primer_max_size as i64 - primer.amplicon_max_variation() as i64;

    // Chevauchement visé impossible : position la plus serrée permise
    slice_start = slice_start.max(left_limit as i64);

    let remaining = ref_len as i64 - prev.right.start as i64;
    let is_last = remaining <= primer.amplicon_size_max as i64;
    if is_last {
        // En fin de référence, on accepte un trou plutôt que de déborder
        let right_aligned = ref_len as i64 - primer.amplicon_size_max as i64;
        slice_start = slice_start.min(right_aligned);
    }

    RegionBounds {
        left_limit,
        slice_start,
        is_last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrimerParameters;
    use crate::primer::{CandidatePrimer, Direction};

    fn config() -> SchemeConfig {
        SchemeConfig {
            target_overlap: 50,
            step_distance: 10,
            primer: PrimerParameters {
                amplicon_size_min: 400,
                amplicon_size_max: 420,
                primer_max_size: 30,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Paire dont l'amorce gauche commence en `left` et la droite en `right`
    fn pair(left: usize, right: usize) -> CandidatePrimerPair {
        CandidatePrimerPair::new(
            CandidatePrimer::from_slice_hit(Direction::Left, left, 420, 0, "A".repeat(20), 0.0).unwrap(),
            CandidatePrimer::from_slice_hit(Direction::Right, 0, right + 1, 0, "T".repeat(20), 0.0).unwrap(),
        )
    }

    #[test]
    fn test_first_region_bounds() {
        let bounds = region_bounds(&config(), 1000, None, None);
        assert_eq!(
            bounds,
            RegionBounds {
                left_limit: 0,
                slice_start: 0,
                is_last: false
            }
        );
    }

    #[test]
    fn test_second_region_forces_progress() {
        let prev = pair(5, 414);
        let bounds = region_bounds(&config(), 1000, Some(&prev), None);

        assert_eq!(bounds.left_limit, 25);
        // 395 - 50 - 1 - 30 - 20
        assert_eq!(bounds.slice_start, 294);
        assert!(!bounds.is_last);
    }

    #[test]
    fn test_same_pool_limit() {
        let prev_in_pool = pair(5, 414);
        let prev = pair(299, 708);
        let bounds = region_bounds(&config(), 3000, Some(&prev), Some(&prev_in_pool));

        assert_eq!(bounds.left_limit, 415);
        assert_eq!(bounds.slice_start, 588);
    }

    #[test]
    fn test_gap_branch_forces_progress() {
        let prev_in_pool = pair(5, 414);
        let prev = pair(500, 909);
        let bounds = region_bounds(&config(), 3000, Some(&prev), Some(&prev_in_pool));

        assert_eq!(bounds.left_limit, 520);
    }

    #[test]
    fn test_unreachable_overlap_clamps_to_left_limit() {
        let mut config = config();
        config.target_overlap = 400;
        let prev_in_pool = pair(5, 414);
        let prev = pair(299, 708);
        let bounds = region_bounds(&config, 3000, Some(&prev), Some(&prev_in_pool));

        assert_eq!(bounds.slice_start, 415);
    }

    #[test]
    fn test_last_region_right_aligned() {
        let prev = pair(5, 414);
        let bounds = region_bounds(&config(), 829, Some(&prev), None);
        assert!(bounds.is_last);
        assert_eq!(bounds.slice_start, 294);

        let prev_in_pool = pair(5, 414);
        let prev = pair(299, 708);
        let bounds = region_bounds(&config(), 1000, Some(&prev), Some(&prev_in_pool));
        assert!(bounds.is_last);
        assert_eq!(bounds.slice_start, 580);
    }
}
