//! Configuration d'un schéma multiplex

use crate::error::{Result, SchemeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Paramètres de conception d'amorces
///
/// `engine` est transmis tel quel au moteur de conception externe
/// (clés de type `PRIMER_OPT_TM` pour Primer3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimerParameters {
    /// Taille minimale d'amplicon (pb)
    pub amplicon_size_min: usize,
    /// Taille maximale d'amplicon (pb)
    pub amplicon_size_max: usize,
    /// Longueur minimale d'amorce
    pub primer_min_size: usize,
    /// Longueur optimale d'amorce
    pub primer_opt_size: usize,
    /// Longueur maximale d'amorce
    pub primer_max_size: usize,
    /// Paramètres opaques du moteur
    pub engine: BTreeMap<String, Value>,
}

impl Default for PrimerParameters {
    fn default() -> Self {
        let mut engine = BTreeMap::new();
        engine.insert("PRIMER_MIN_TM".to_string(), Value::from(59.5));
        engine.insert("PRIMER_OPT_TM".to_string(), Value::from(62.5));
        engine.insert("PRIMER_MAX_TM".to_string(), Value::from(65.0));
        engine.insert("PRIMER_MIN_GC".to_string(), Value::from(30.0));
        engine.insert("PRIMER_MAX_GC".to_string(), Value::from(55.0));
        engine.insert("PRIMER_MAX_POLY_X".to_string(), Value::from(5));
        engine.insert("PRIMER_NUM_RETURN".to_string(), Value::from(10));

        Self {
            amplicon_size_min: 380,
            amplicon_size_max: 420,
            primer_min_size: 19,
            primer_opt_size: 22,
            primer_max_size: 30,
            engine,
        }
    }
}

impl PrimerParameters {
    /// Variation de taille tolérée entre amplicons
    pub fn amplicon_max_variation(&self) -> usize {
        self.amplicon_size_max - self.amplicon_size_min
    }
}

/// Configuration complète d'un schéma
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeConfig {
    /// Préfixe des noms d'amorces
    pub prefix: String,
    /// Chevauchement visé entre amplicons consécutifs (pb)
    pub target_overlap: usize,
    /// Pas de déplacement de la fenêtre (pb)
    pub step_distance: usize,
    /// Seuil d'unicité transmis au moteur
    pub min_unique: usize,
    /// Paramètres d'amorces
    pub primer: PrimerParameters,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            prefix: "SCHEME".to_string(),
            target_overlap: 0,
            step_distance: 11,
            min_unique: 3,
            primer: PrimerParameters::default(),
        }
    }
}

impl SchemeConfig {
    /// Vérifie la cohérence de la configuration
    pub fn validate(&self) -> Result<()> {
        let p = &self.primer;

        if p.amplicon_size_min == 0 || p.amplicon_size_max == 0 {
            return Err(SchemeError::InvalidConfig(
                "les tailles d'amplicon doivent être > 0".to_string(),
            ));
        }
        if p.amplicon_size_min > p.amplicon_size_max {
            return Err(SchemeError::InvalidConfig(format!(
                "taille d'amplicon min {} > max {}",
                p.amplicon_size_min, p.amplicon_size_max
            )));
        }
        if p.primer_max_size == 0 || p.primer_max_size >= p.amplicon_size_min {
            return Err(SchemeError::InvalidConfig(format!(
                "taille d'amorce max {} hors de ]0, {}[",
                p.primer_max_size, p.amplicon_size_min
            )));
        }
        if p.primer_min_size > p.primer_max_size {
            return Err(SchemeError::InvalidConfig(format!(
                "taille d'amorce min {} > max {}",
                p.primer_min_size, p.primer_max_size
            )));
        }
        if self.step_distance == 0 {
            return Err(SchemeError::InvalidConfig(
                "le pas de la fenêtre doit être > 0".to_string(),
            ));
        }
        if self.prefix.trim().is_empty() {
            return Err(SchemeError::InvalidConfig("préfixe vide".to_string()));
        }

        Ok(())
    }

    /// Charge une configuration JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SchemeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SchemeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.primer.amplicon_max_variation(), 40);
    }

    #[test]
    fn test_invalid_amplicon_range() {
        let mut config = SchemeConfig::default();
        config.primer.amplicon_size_min = 500;
        assert!(matches!(
            config.validate(),
            Err(SchemeError::InvalidConfig(_))
        ));

        config.primer.amplicon_size_min = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_step_and_primer_size() {
        let mut config = SchemeConfig::default();
        config.step_distance = 0;
        assert!(config.validate().is_err());

        let mut config = SchemeConfig::default();
        config.primer.primer_max_size = 400;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"prefix": "nCoV", "primer": {"amplicon_size_min": 400, "amplicon_size_max": 420}}"#;
        let config = SchemeConfig::from_json(json).unwrap();

        assert_eq!(config.prefix, "nCoV");
        assert_eq!(config.step_distance, 11);
        assert_eq!(config.primer.amplicon_size_max, 420);
        assert_eq!(config.primer.primer_max_size, 30);
        assert!(config.primer.engine.contains_key("PRIMER_OPT_TM"));
    }
}
