//! Rapports et fichiers de sortie d'un schéma

use crate::config::SchemeConfig;
use crate::error::Result;
use crate::region::{Pool, Region};
use crate::scheme::MultiplexScheme;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Couverture de la référence primaire par les amplicons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub reference_len: usize,
    pub regions: usize,
    pub pool_one: usize,
    pub pool_two: usize,
    /// Bases couvertes par au moins un amplicon
    pub covered_bases: usize,
    /// Intervalles non couverts [début, fin)
    pub gaps: Vec<(usize, usize)>,
}

impl CoverageSummary {
    pub fn compute(regions: &[Region], reference_len: usize) -> Self {
        let mut spans: Vec<(usize, usize)> = regions
            .iter()
            .map(|r| {
                let start = r.top_pair.left.start.min(r.top_pair.right.start);
                let end = (r.top_pair.right.start + 1).min(reference_len);
                (start, end.max(start))
            })
            .collect();
        spans.sort_unstable();

        let mut gaps = Vec::new();
        let mut covered_bases = 0;
        let mut cursor = 0;
        for (start, end) in spans {
            if start > cursor {
                gaps.push((cursor, start));
            }
            if end > cursor {
                covered_bases += end - start.max(cursor);
                cursor = end;
            }
        }
        if cursor < reference_len {
            gaps.push((cursor, reference_len));
        }

        Self {
            reference_len,
            regions: regions.len(),
            pool_one: regions.iter().filter(|r| r.pool == Pool::One).count(),
            pool_two: regions.iter().filter(|r| r.pool == Pool::Two).count(),
            covered_bases,
            gaps,
        }
    }

    /// Fraction de la référence couverte (0-1)
    pub fn coverage_ratio(&self) -> f64 {
        if self.reference_len == 0 {
            return 0.0;
        }
        self.covered_bases as f64 / self.reference_len as f64
    }
}

/// Rapport JSON complet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeReport {
    pub generated_at: DateTime<Utc>,
    pub references: Vec<String>,
    pub reference_len: usize,
    pub config: SchemeConfig,
    pub regions: Vec<Region>,
    pub coverage: CoverageSummary,
}

impl SchemeReport {
    pub fn from_scheme(scheme: &MultiplexScheme) -> Self {
        Self {
            generated_at: Utc::now(),
            references: scheme.references().ids(),
            reference_len: scheme.reference_len(),
            config: scheme.config().clone(),
            regions: scheme.regions().to_vec(),
            coverage: CoverageSummary::compute(scheme.regions(), scheme.reference_len()),
        }
    }
}

fn primer_name(prefix: &str, region: &Region, suffix: &str) -> String {
    format!("{}_{}_{}", prefix, region.region_num, suffix)
}

/// Fichier BED des amorces (une ligne par amorce, score = pool)
pub fn primer_bed(scheme: &MultiplexScheme) -> String {
    let ref_id = &scheme.references().primary().id;
    let prefix = &scheme.config().prefix;
    let mut out = String::new();

    for region in scheme.regions() {
        for primer in [&region.top_pair.left, &region.top_pair.right] {
            let (lo, hi) = primer.footprint();
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                ref_id,
                lo,
                hi + 1,
                primer_name(prefix, region, &primer.direction.to_string()),
                region.pool,
                primer.direction.strand()
            );
        }
    }
    out
}

/// Fichier BED des inserts entre amorces
pub fn insert_bed(scheme: &MultiplexScheme) -> String {
    let ref_id = &scheme.references().primary().id;
    let prefix = &scheme.config().prefix;
    let mut out = String::new();

    for region in scheme.regions() {
        let start = region.top_pair.left.end + 1;
        let end = region.top_pair.right.end.max(start);
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}_INSERT_{}\t{}\t+",
            ref_id, start, end, prefix, region.region_num, region.pool
        );
    }
    out
}

/// Table TSV des amorces
pub fn primer_tsv(scheme: &MultiplexScheme) -> String {
    let prefix = &scheme.config().prefix;
    let mut out = String::from("name\tpool\tseq\tlength\tpenalty\tidentity\n");

    for region in scheme.regions() {
        for primer in [&region.top_pair.left, &region.top_pair.right] {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{:.2}\t{:.3}",
                primer_name(prefix, region, &primer.direction.to_string()),
                region.pool,
                primer.seq,
                primer.len(),
                primer.penalty,
                primer.identity()
            );
        }
    }
    out
}

/// Écrit les fichiers de sortie dans `dir` et renvoie leurs chemins
pub fn write_outputs(dir: &Path, scheme: &MultiplexScheme) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let prefix = &scheme.config().prefix;

    let report = serde_json::to_string_pretty(&SchemeReport::from_scheme(scheme))?;
    let outputs = [
        (format!("{}.primer.bed", prefix), primer_bed(scheme)),
        (format!("{}.insert.bed", prefix), insert_bed(scheme)),
        (format!("{}.primer.tsv", prefix), primer_tsv(scheme)),
        (format!("{}.report.json", prefix), report),
    ];

    let mut paths = Vec::with_capacity(outputs.len());
    for (name, content) in outputs {
        let path = dir.join(name);
        fs::write(&path, content)?;
        info!("Écrit: {}", path.display());
        paths.push(path);
    }
    Ok(paths)
}
