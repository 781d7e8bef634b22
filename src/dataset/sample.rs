use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use super::ComplaintRecord;

/// Reduce the corpus to `sample_size` records while preserving per-product
/// proportions (largest-remainder allocation).
///
/// The RNG is seeded so the same corpus, size, and seed always produce the
/// same sample in the same order; downstream entry ids depend on that
/// ordering. Record indices are reassigned to the ordinal position within
/// the returned sample. When `sample_size` covers the whole corpus, the
/// corpus is returned unchanged apart from reindexing.
#[inline]
pub fn stratified_sample(
    records: Vec<ComplaintRecord>,
    sample_size: usize,
    seed: u64,
) -> Vec<ComplaintRecord> {
    if records.len() <= sample_size {
        debug!(
            "Sample size {} covers all {} records, keeping everything",
            sample_size,
            records.len()
        );
        return reindex(records);
    }

    let total = records.len();

    // Group source positions by product; BTreeMap keeps allocation order
    // independent of hash state
    let mut strata: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (position, record) in records.iter().enumerate() {
        strata
            .entry(record.product.clone())
            .or_default()
            .push(position);
    }

    let quotas = allocate_quotas(&strata, sample_size, total);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut selected = Vec::with_capacity(sample_size);
    for ((product, positions), quota) in strata.iter().zip(quotas.iter()) {
        let mut positions = positions.clone();
        positions.shuffle(&mut rng);
        positions.truncate(*quota);
        debug!("Product {:?}: sampled {} of stratum", product, quota);
        selected.extend(positions);
    }

    // Restore source order so the sample ordering is stable and readable
    selected.sort_unstable();

    let mut by_position: BTreeMap<usize, ComplaintRecord> = records
        .into_iter()
        .enumerate()
        .collect();

    let sampled: Vec<ComplaintRecord> = selected
        .into_iter()
        .filter_map(|position| by_position.remove(&position))
        .collect();

    info!(
        "Stratified sample drew {} of {} records across {} products",
        sampled.len(),
        total,
        strata.len()
    );

    reindex(sampled)
}

/// Largest-remainder apportionment of `sample_size` across strata.
fn allocate_quotas(
    strata: &BTreeMap<String, Vec<usize>>,
    sample_size: usize,
    total: usize,
) -> Vec<usize> {
    let mut quotas: Vec<usize> = Vec::with_capacity(strata.len());
    let mut remainders: Vec<(usize, usize)> = Vec::with_capacity(strata.len());

    for (stratum_idx, positions) in strata.values().enumerate() {
        let exact_numerator = positions.len() * sample_size;
        quotas.push(exact_numerator / total);
        remainders.push((exact_numerator % total, stratum_idx));
    }

    let allocated: usize = quotas.iter().sum();
    let mut leftover = sample_size.saturating_sub(allocated);

    // Hand leftover seats to the largest fractional remainders; ties resolve
    // by stratum order, which is already deterministic
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, stratum_idx) in remainders {
        if leftover == 0 {
            break;
        }
        let stratum_len = strata.values().nth(stratum_idx).map_or(0, Vec::len);
        if quotas[stratum_idx] < stratum_len {
            quotas[stratum_idx] += 1;
            leftover -= 1;
        }
    }

    quotas
}

fn reindex(mut records: Vec<ComplaintRecord>) -> Vec<ComplaintRecord> {
    for (record_index, record) in records.iter_mut().enumerate() {
        record.record_index = record_index;
    }
    records
}
