#[cfg(test)]
mod tests;

pub mod sample;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub use sample::stratified_sample;

/// One sampled complaint, the read-only input to the pipeline.
///
/// `record_index` is the ordinal position within the sampled set and is the
/// stable half of every indexed entry's id; it is assigned by
/// [`stratified_sample`], not by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintRecord {
    pub record_index: usize,
    /// External complaint identifier, when the source provides one
    pub complaint_id: Option<String>,
    pub narrative: String,
    pub product: String,
    pub issue: Option<String>,
    pub company: Option<String>,
}

/// Row shape of the cleaned complaints export
#[derive(Debug, Deserialize)]
struct RawComplaintRow {
    #[serde(rename = "Complaint ID", default)]
    complaint_id: Option<String>,
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Issue", default)]
    issue: Option<String>,
    #[serde(rename = "Company", default)]
    company: Option<String>,
    #[serde(rename = "clean_narrative", default)]
    clean_narrative: Option<String>,
}

/// Load complaint records from a cleaned CSV export.
///
/// Rows without a `clean_narrative` are outside the pipeline's contract and
/// are dropped here with a logged count rather than surfacing later as
/// undefined behavior.
#[inline]
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<ComplaintRecord>> {
    let path = path.as_ref();
    debug!("Loading complaint records from {}", path.display());

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open input dataset: {}", path.display()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (row_number, row) in reader.deserialize::<RawComplaintRow>().enumerate() {
        let row = row.with_context(|| {
            format!("Failed to parse row {} of {}", row_number + 1, path.display())
        })?;

        let narrative = match row.clean_narrative {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                skipped += 1;
                continue;
            }
        };

        records.push(ComplaintRecord {
            record_index: records.len(),
            complaint_id: row.complaint_id,
            narrative,
            product: row.product,
            issue: row.issue,
            company: row.company,
        });
    }

    if skipped > 0 {
        warn!("Dropped {} rows without a clean narrative", skipped);
    }
    info!(
        "Loaded {} complaint records from {}",
        records.len(),
        path.display()
    );

    Ok(records)
}
