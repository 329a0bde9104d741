//! Adaptateur Primer3 (format Boulder-IO sur stdin/stdout)
//!
//! Chaque requête devient un enregistrement `PRIMER_TASK=generic` ne
//! choisissant que des amorces gauches : le complément inverse de la tranche
//! fournit les amorces droites. La recherche est limitée au flanc 5' de la
//! séquence, large de `primer_max_size + (amplicon_size_max - amplicon_size_min)`.

use amptile_core::{CandidatePrimer, DesignRequest, PrimerDesigner, Result, SchemeError};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// Exécutable utilisé par défaut
pub const DEFAULT_EXECUTABLE: &str = "primer3_core";

/// Moteur de conception appelant `primer3_core`
#[derive(Debug, Clone)]
pub struct Primer3Designer {
    executable: PathBuf,
}

impl Primer3Designer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Default for Primer3Designer {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

impl PrimerDesigner for Primer3Designer {
    fn design(&self, request: &DesignRequest<'_>) -> Result<Vec<CandidatePrimer>> {
        let input = boulder_input(request);
        trace!("Entrée primer3:\n{}", input);

        let mut child = Command::new(&self.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SchemeError::Designer(format!(
                    "lancement de {} impossible: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        // stdin est fermé avant l'attente, même en cas d'échec d'écriture
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        };
        let output = child.wait_with_output()?;
        written?;

        if !output.status.success() {
            return Err(SchemeError::Designer(format!(
                "{} a échoué ({}): {}",
                self.executable.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let candidates = parse_boulder_output(&String::from_utf8_lossy(&output.stdout), request)?;
        debug!(
            "primer3: {} amorce(s) {} pour la tranche {}",
            candidates.len(),
            request.direction,
            request.offset
        );
        Ok(candidates)
    }
}

/// Largeur du flanc 5' dans lequel les amorces sont cherchées
pub fn search_flank(request: &DesignRequest<'_>) -> usize {
    let p = request.parameters;
    (p.primer_max_size + p.amplicon_max_variation()).min(request.sequence.len())
}

fn boulder_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(boulder_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => None,
    }
}

/// Construit l'enregistrement Boulder-IO d'une requête
pub fn boulder_input(request: &DesignRequest<'_>) -> String {
    let p = request.parameters;
    let mut tags: Vec<(String, String)> = vec![
        (
            "SEQUENCE_ID".to_string(),
            format!("amptile_{}_{}", request.offset, request.direction),
        ),
        ("SEQUENCE_TEMPLATE".to_string(), request.sequence.to_string()),
        (
            "SEQUENCE_INCLUDED_REGION".to_string(),
            format!("0,{}", search_flank(request)),
        ),
        ("PRIMER_TASK".to_string(), "generic".to_string()),
        ("PRIMER_PICK_LEFT_PRIMER".to_string(), "1".to_string()),
        ("PRIMER_PICK_INTERNAL_OLIGO".to_string(), "0".to_string()),
        ("PRIMER_PICK_RIGHT_PRIMER".to_string(), "0".to_string()),
        ("PRIMER_MIN_SIZE".to_string(), p.primer_min_size.to_string()),
        ("PRIMER_OPT_SIZE".to_string(), p.primer_opt_size.to_string()),
        ("PRIMER_MAX_SIZE".to_string(), p.primer_max_size.to_string()),
    ];

    // Les paramètres moteur ne remplacent jamais les tags ci-dessus
    for (key, value) in &p.engine {
        let key = key.to_ascii_uppercase();
        if tags.iter().any(|(k, _)| *k == key) {
            continue;
        }
        if let Some(value) = boulder_value(value) {
            tags.push((key, value));
        }
    }

    let mut record = String::new();
    for (key, value) in tags {
        let _ = writeln!(record, "{}={}", key, value);
    }
    record.push_str("=\n");
    record
}

/// Convertit la sortie Boulder-IO en amorces candidates
pub fn parse_boulder_output(output: &str, request: &DesignRequest<'_>) -> Result<Vec<CandidatePrimer>> {
    let tags: HashMap<&str, &str> = output
        .lines()
        .filter_map(|line| line.split_once('='))
        .collect();

    if let Some(error) = tags.get("PRIMER_ERROR") {
        return Err(SchemeError::Designer(format!("primer3: {}", error)));
    }

    let returned = match tags.get("PRIMER_LEFT_NUM_RETURNED") {
        Some(n) => n
            .trim()
            .parse::<usize>()
            .map_err(|e| SchemeError::Designer(format!("PRIMER_LEFT_NUM_RETURNED invalide: {}", e)))?,
        None => 0,
    };

    let tag = |name: String| {
        tags.get(name.as_str())
            .copied()
            .ok_or_else(|| SchemeError::Designer(format!("tag primer3 manquant: {}", name)))
    };

    (0..returned)
        .map(|i| -> Result<CandidatePrimer> {
            let seq = tag(format!("PRIMER_LEFT_{}_SEQUENCE", i))?;
            let location = tag(format!("PRIMER_LEFT_{}", i))?;
            let penalty = tag(format!("PRIMER_LEFT_{}_PENALTY", i))?;

            let pos = location
                .split(',')
                .next()
                .and_then(|p| p.trim().parse::<usize>().ok())
                .ok_or_else(|| SchemeError::Designer(format!("position primer3 invalide: {}", location)))?;
            let penalty = penalty
                .trim()
                .parse::<f64>()
                .map_err(|e| SchemeError::Designer(format!("pénalité primer3 invalide: {}", e)))?;

            CandidatePrimer::from_slice_hit(
                request.direction,
                request.offset,
                request.sequence.len(),
                pos,
                seq.trim().to_ascii_uppercase(),
                penalty,
            )
        })
        .collect()
}
