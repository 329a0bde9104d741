//! Benchmarks pour la conception de schémas

use amptile_core::{
    Aligner, Alignment, CandidatePrimer, DesignRequest, MultiplexScheme, PrimerDesigner, PrimerParameters,
    Reference, ReferenceSet, Result, SchemeConfig,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

/// Moteur minimal : une amorce par brin sur chaque tranche acceptée
struct StripedDesigner {
    /// Une tranche sur `stride` pas est refusée, pour exercer les déplacements
    stride: usize,
}

impl PrimerDesigner for StripedDesigner {
    fn design(&self, request: &DesignRequest<'_>) -> Result<Vec<CandidatePrimer>> {
        if (request.offset / 11) % self.stride == 0 {
            return Ok(Vec::new());
        }
        let primer = CandidatePrimer::from_slice_hit(
            request.direction,
            request.offset,
            request.sequence.len(),
            3,
            &request.sequence[3..25],
            1.0,
        )?;
        Ok(vec![primer])
    }
}

struct ExactAligner;

impl Aligner for ExactAligner {
    fn align(&self, primer: &CandidatePrimer, references: &ReferenceSet) -> Result<Vec<Alignment>> {
        let (lo, hi) = primer.footprint();
        Ok(references
            .iter()
            .map(|r| Alignment {
                reference_id: r.id.clone(),
                score: primer.len() as i32,
                identity: 1.0,
                ref_start: lo,
                ref_end: hi + 1,
                cigar: format!("{}=", primer.len()),
            })
            .collect())
    }
}

fn references(len: usize) -> ReferenceSet {
    let seq: String = "ATGCGTACCTGAAGTC".chars().cycle().take(len).collect();
    ReferenceSet::new(vec![Reference::new("bench", &seq)]).unwrap()
}

fn benchmark_design_scheme(c: &mut Criterion) {
    // Génomes de différentes tailles
    let genomes = vec![
        ("10kb", references(10_000)),
        ("30kb", references(30_000)),
    ];

    let config = SchemeConfig {
        target_overlap: 0,
        step_distance: 11,
        primer: PrimerParameters::default(),
        ..Default::default()
    };

    let mut group = c.benchmark_group("Scheme Design");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for (name, refs) in genomes {
        group.bench_function(format!("design_{}", name), |b| {
            let designer = StripedDesigner { stride: 3 };
            b.iter(|| {
                let mut scheme = MultiplexScheme::new(black_box(refs.clone()), config.clone()).unwrap();
                let _ = scheme.design_scheme(&designer, &ExactAligner, None);
                scheme.regions().len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_design_scheme);
criterion_main!(benches);
