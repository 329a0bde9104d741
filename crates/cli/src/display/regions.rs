//! Tableau des régions conçues

use amptile_core::Region;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "Région")]
    region: usize,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Gauche")]
    left: String,
    #[tabled(rename = "Droite")]
    right: String,
    #[tabled(rename = "Amplicon")]
    amplicon: usize,
    #[tabled(rename = "Pénalité")]
    penalty: String,
    #[tabled(rename = "Identité")]
    identity: String,
}

impl From<&Region> for RegionRow {
    fn from(region: &Region) -> Self {
        let pair = &region.top_pair;
        Self {
            region: region.region_num,
            pool: region.pool.to_string(),
            left: format!("{}-{}", pair.left.start, pair.left.end),
            right: format!("{}-{}", pair.right.end, pair.right.start),
            amplicon: pair.amplicon_size(),
            penalty: format!("{:.2}", pair.combined_penalty()),
            identity: format!("{:.1}%", pair.mean_identity() * 100.0),
        }
    }
}

/// Construit le tableau des régions
pub fn region_table(regions: &[Region]) -> String {
    let rows: Vec<RegionRow> = regions.iter().map(RegionRow::from).collect();
    Table::new(rows).to_string()
}
