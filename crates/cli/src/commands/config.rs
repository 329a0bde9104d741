//! Chargement et affichage de la configuration

use amptile_core::SchemeConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Préfixe des variables d'environnement (`AMPTILE__PRIMER__AMPLICON_SIZE_MIN=400`)
pub const ENV_PREFIX: &str = "AMPTILE";

/// Charge la configuration : valeurs par défaut, fichier optionnel, puis
/// variables d'environnement
pub fn load_config(path: Option<&Path>) -> Result<SchemeConfig> {
    let defaults = config::Config::try_from(&SchemeConfig::default())
        .context("sérialisation de la configuration par défaut")?;

    let mut builder = config::Config::builder().add_source(defaults);
    if let Some(path) = path {
        debug!("Configuration lue depuis {}", path.display());
        builder = builder.add_source(config::File::from(path).required(true));
    }
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder.build().context("lecture de la configuration")?;
    let config = settings
        .try_deserialize::<SchemeConfig>()
        .context("configuration invalide")?;
    Ok(config)
}

pub fn run(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
