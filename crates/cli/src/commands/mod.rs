//! Sous-commandes de la CLI

pub mod config;
pub mod multiplex;
