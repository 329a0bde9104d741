//! Commande de conception d'un schéma multiplex

use super::config::load_config;
use crate::display::regions::region_table;
use crate::{create_progress_bar, create_spinner};
use amptile_core::report::write_outputs;
use amptile_core::{CoverageSummary, MultiplexScheme, ReferenceSet, SchemeConfig};
use amptile_engines::{PairwiseAligner, Primer3Designer};
use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub struct MultiplexArgs {
    /// FASTA des références (la première est la référence primaire)
    pub fasta: PathBuf,

    /// Répertoire de sortie
    #[arg(short, long)]
    pub output: PathBuf,

    /// Préfixe des noms d'amorces
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Taille minimale d'amplicon (pb)
    #[arg(long)]
    pub amplicon_min: Option<usize>,

    /// Taille maximale d'amplicon (pb)
    #[arg(long)]
    pub amplicon_max: Option<usize>,

    /// Chevauchement visé entre amplicons (pb)
    #[arg(long)]
    pub target_overlap: Option<usize>,

    /// Pas de déplacement de la fenêtre (pb)
    #[arg(long)]
    pub step_distance: Option<usize>,

    /// Seuil d'unicité transmis au moteur
    #[arg(long)]
    pub min_unique: Option<usize>,

    /// Fichier de configuration (JSON, TOML, YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Chemin de l'exécutable primer3_core
    #[arg(long, default_value = amptile_engines::primer3::DEFAULT_EXECUTABLE)]
    pub primer3: PathBuf,

    /// Écraser un répertoire de sortie non vide
    #[arg(short, long)]
    pub force: bool,
}

impl MultiplexArgs {
    /// Applique les options de la ligne de commande à la configuration
    pub fn apply_overrides(&self, config: &mut SchemeConfig) {
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(min) = self.amplicon_min {
            config.primer.amplicon_size_min = min;
        }
        if let Some(max) = self.amplicon_max {
            config.primer.amplicon_size_max = max;
        }
        if let Some(overlap) = self.target_overlap {
            config.target_overlap = overlap;
        }
        if let Some(step) = self.step_distance {
            config.step_distance = step;
        }
        if let Some(min_unique) = self.min_unique {
            config.min_unique = min_unique;
        }
    }
}

/// Refuse d'écrire dans un répertoire non vide sans `--force`
pub fn check_output_dir(dir: &Path, force: bool) -> Result<()> {
    if force || !dir.exists() {
        return Ok(());
    }
    if !dir.is_dir() {
        bail!("{} existe et n'est pas un répertoire", dir.display());
    }
    let occupied = std::fs::read_dir(dir)
        .with_context(|| format!("lecture de {}", dir.display()))?
        .next()
        .is_some();
    if occupied {
        bail!("{} n'est pas vide (utiliser --force)", dir.display());
    }
    Ok(())
}

fn load_references(path: &Path) -> Result<ReferenceSet> {
    let file = File::open(path).with_context(|| format!("ouverture de {}", path.display()))?;
    let references = ReferenceSet::from_fasta(BufReader::new(file))
        .with_context(|| format!("lecture FASTA de {}", path.display()))?;
    Ok(references)
}

pub fn run(args: MultiplexArgs) -> Result<()> {
    println!("🧬 Schéma multiplex pour: {}", args.fasta.display());

    check_output_dir(&args.output, args.force)?;

    let mut config = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    // 1. Références
    let spinner = create_spinner("Lecture des références...");
    let references = load_references(&args.fasta)?;
    spinner.finish_with_message(format!(
        "{} référence(s), primaire {} ({} pb)",
        references.len(),
        references.primary().id,
        references.primary_len()
    ));

    // 2. Conception
    let designer = Primer3Designer::new(&args.primer3);
    let aligner = PairwiseAligner::default();
    let mut scheme = MultiplexScheme::new(references, config)?;

    let pb = create_progress_bar(scheme.reference_len() as u64, "Conception des régions...");
    let mut progress = |covered: usize, total: usize| {
        pb.set_length(total as u64);
        pb.set_position(covered as u64);
    };
    let result = scheme.design_scheme(&designer, &aligner, Some(&mut progress));
    match &result {
        Ok(()) => pb.finish_with_message(format!("{} région(s)", scheme.regions().len())),
        Err(_) => pb.abandon_with_message("échec"),
    }
    result?;

    // 3. Fichiers de sortie
    let spinner = create_spinner("Écriture des résultats...");
    let paths = write_outputs(&args.output, &scheme)?;
    spinner.finish_with_message(format!("{} fichier(s) dans {}", paths.len(), args.output.display()));
    info!("Sorties: {:?}", paths);

    // 4. Résumé
    println!("\n{}", region_table(scheme.regions()));

    let coverage = CoverageSummary::compute(scheme.regions(), scheme.reference_len());
    println!("\n📊 Résumé:");
    println!("   Régions: {} (pool 1: {}, pool 2: {})", coverage.regions, coverage.pool_one, coverage.pool_two);
    println!(
        "   Couverture: {}",
        style(format!(
            "{:.1}% ({}/{} pb)",
            coverage.coverage_ratio() * 100.0,
            coverage.covered_bases,
            coverage.reference_len
        ))
        .cyan()
    );
    if coverage.gaps.is_empty() {
        println!("\n{}", style("✅ Référence entièrement couverte").green().bold());
    } else {
        for (start, end) in &coverage.gaps {
            println!("   {} {}-{}", style("Non couvert:").yellow(), start, end);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: MultiplexArgs,
    }

    #[test]
    fn test_overrides_only_touch_given_flags() {
        let cli = TestCli::parse_from(["amptile", "refs.fasta", "-o", "out", "--prefix", "nCoV", "--amplicon-min", "300"]);
        let mut config = SchemeConfig::default();
        cli.args.apply_overrides(&mut config);

        assert_eq!(config.prefix, "nCoV");
        assert_eq!(config.primer.amplicon_size_min, 300);
        assert_eq!(config.primer.amplicon_size_max, SchemeConfig::default().primer.amplicon_size_max);
        assert_eq!(cli.args.primer3, PathBuf::from("primer3_core"));
        assert!(!cli.args.force);
    }

    #[test]
    fn test_output_dir_checks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_output_dir(dir.path(), false).is_ok());
        assert!(check_output_dir(&dir.path().join("nouveau"), false).is_ok());

        std::fs::write(dir.path().join("SCHEME.primer.bed"), "").unwrap();
        assert!(check_output_dir(dir.path(), false).is_err());
        assert!(check_output_dir(dir.path(), true).is_ok());
    }

    #[test]
    fn test_load_references() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.fasta");
        std::fs::write(&path, ">ref1\nACGT-ACGT\n>ref2\nACGTACGT\n").unwrap();

        let references = load_references(&path).unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references.primary_len(), 8);
        assert!(load_references(&dir.path().join("absent.fasta")).is_err());
    }
}
