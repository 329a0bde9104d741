//! Affichage console

pub mod regions;
