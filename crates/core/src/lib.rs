//! amptile Core Library
//!
//! Conception de schémas d'amorces multiplex en tuiles : amplicons
//! chevauchants couvrant la référence primaire, répartis en deux pools sans
//! chevauchement interne.

pub mod config;
pub mod error;
pub mod logging;
pub mod primer;
pub mod reference;
pub mod region;
pub mod report;
pub mod scheme;
pub mod window;

// Réexportations principales
pub use config::{PrimerParameters, SchemeConfig};
pub use error::{Result, SchemeError};
pub use logging::{init_logging, init_logging_with_verbosity};
// Les macros log_operation et log_error sont automatiquement exportées à la racine du crate
pub use primer::{Aligner, Alignment, CandidatePrimer, CandidatePrimerPair, DesignRequest, Direction, PrimerDesigner};
pub use reference::{reverse_complement, Reference, ReferenceSet};
pub use region::{Pool, Region, SearchAttempt, SearchContext, PENALTY_THRESHOLD};
pub use report::{CoverageSummary, SchemeReport};
pub use scheme::{region_bounds, MultiplexScheme, ProgressFn, RegionBounds};
pub use window::Window;
