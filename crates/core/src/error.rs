//! Types d'erreurs pour la conception de schémas d'amorces

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemeError {
    #[error("Fenêtre hors limites: [{start}, {end}) pas dans [{left_limit}, {right_limit}]")]
    BoundsExceeded {
        start: i64,
        end: i64,
        left_limit: usize,
        right_limit: usize,
    },

    #[error("Amorces insuffisantes: {left} gauche(s), {right} droite(s)")]
    InsufficientCandidates { left: usize, right: usize },

    #[error("Alignement échoué: {0}")]
    AlignmentFailed(String),

    #[error("Aucune amorce convenable pour la région {region_num}: {reason}")]
    NoSuitablePrimers { region_num: usize, reason: String },

    #[error("Configuration invalide: {0}")]
    InvalidConfig(String),

    #[error("Jeu de références vide")]
    EmptyReferenceSet,

    #[error("Référence invalide: {0}")]
    InvalidReference(String),

    #[error("Erreur du moteur de conception: {0}")]
    Designer(String),

    #[error("Erreur IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erreur de sérialisation: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchemeError {
    /// Vrai si l'erreur signale seulement un manque de place pour la fenêtre
    pub fn is_bounds(&self) -> bool {
        matches!(self, SchemeError::BoundsExceeded { .. })
    }

    /// Vrai si une tentative sur une autre position peut encore réussir
    pub fn is_insufficient(&self) -> bool {
        matches!(self, SchemeError::InsufficientCandidates { .. })
    }

    /// Vrai si la région ne peut pas être construite (fin de croissance du schéma)
    pub fn is_region_exhausted(&self) -> bool {
        matches!(
            self,
            SchemeError::NoSuitablePrimers { .. } | SchemeError::BoundsExceeded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SchemeError>;
