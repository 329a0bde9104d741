//! Moteurs externes branchés sur amptile-core
//!
//! - `primer3` : conception d'amorces via l'exécutable `primer3_core`
//! - `aligner` : alignement de spécificité avec `bio::alignment::pairwise`

pub mod aligner;
pub mod primer3;

pub use aligner::PairwiseAligner;
pub use primer3::Primer3Designer;
