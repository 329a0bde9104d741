//! Fenêtre glissante sur la référence primaire
//!
//! Une `Window` est une valeur immuable : chaque déplacement renvoie une
//! nouvelle fenêtre ou une erreur `BoundsExceeded`, sans jamais modifier
//! l'originale. Les bornes sont vérifiées à la construction et à chaque pas.

use crate::config::SchemeConfig;
use crate::error::{Result, SchemeError};
use crate::reference::ReferenceSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    left_limit: usize,
    slice_start: usize,
    right_limit: usize,
    initial_slice_start: usize,
    /// Largeur de la tranche (taille d'amplicon max)
    span: usize,
    /// Pas de déplacement
    step: usize,
}

impl Window {
    /// Crée une fenêtre, `right_limit` valant par défaut la longueur de la référence
    ///
    /// Une limite droite au-delà de la référence est ramenée à sa longueur.
    pub fn new(
        config: &SchemeConfig,
        reference_len: usize,
        left_limit: usize,
        slice_start: usize,
        right_limit: Option<usize>,
    ) -> Result<Self> {
        Self::with_geometry(
            left_limit,
            slice_start,
            right_limit.map_or(reference_len, |limit| limit.min(reference_len)),
            config.primer.amplicon_size_max,
            config.step_distance,
        )
    }

    /// Crée une fenêtre à partir de sa géométrie brute
    pub fn with_geometry(
        left_limit: usize,
        slice_start: usize,
        right_limit: usize,
        span: usize,
        step: usize,
    ) -> Result<Self> {
        debug!(
            "Fenêtre: left_limit {}, slice_start {}, right_limit {}",
            left_limit, slice_start, right_limit
        );

        let window = Self {
            left_limit,
            slice_start,
            right_limit,
            initial_slice_start: slice_start,
            span,
            step,
        };
        window.check_bounds()?;
        Ok(window)
    }

    fn check_bounds(&self) -> Result<()> {
        if self.slice_start < self.left_limit || self.slice_end() > self.right_limit {
            return Err(self.out_of_bounds(self.slice_start as i64));
        }
        Ok(())
    }

    fn out_of_bounds(&self, start: i64) -> SchemeError {
        SchemeError::BoundsExceeded {
            start,
            end: start + self.span as i64,
            left_limit: self.left_limit,
            right_limit: self.right_limit,
        }
    }

    /// Borne gauche (fixe)
    pub fn left_limit(&self) -> usize {
        self.left_limit
    }

    /// Borne droite (fixe)
    pub fn right_limit(&self) -> usize {
        self.right_limit
    }

    /// Origine courante de la tranche
    pub fn slice_start(&self) -> usize {
        self.slice_start
    }

    /// Fin (exclusive) de la tranche
    pub fn slice_end(&self) -> usize {
        self.slice_start + self.span
    }

    /// Origine de la tranche à la construction
    pub fn initial_slice_start(&self) -> usize {
        self.initial_slice_start
    }

    /// Décale la tranche d'un pas vers la gauche
    pub fn step_left(&self) -> Result<Self> {
        let start = self.slice_start as i64 - self.step as i64;
        if start < self.left_limit as i64 {
            debug!("Limite gauche atteinte");
            return Err(self.out_of_bounds(start));
        }

        debug!("Pas vers la gauche: {}", start);
        Ok(Self {
            slice_start: start as usize,
            ..*self
        })
    }

    /// Décale la tranche d'un pas vers la droite
    pub fn step_right(&self) -> Result<Self> {
        let start = self.slice_start + self.step;
        if start + self.span > self.right_limit {
            debug!("Limite droite atteinte");
            return Err(self.out_of_bounds(start as i64));
        }

        debug!("Pas vers la droite: {}", start);
        Ok(Self {
            slice_start: start,
            ..*self
        })
    }

    /// Replace la tranche à sa position initiale
    pub fn reset_slice(&self) -> Self {
        Self {
            slice_start: self.initial_slice_start,
            ..*self
        }
    }

    /// Sous-séquence de la référence primaire couverte par la tranche
    pub fn ref_slice<'a>(&self, references: &'a ReferenceSet) -> &'a str {
        &references.primary().seq[self.slice_start..self.slice_end()]
    }
}
