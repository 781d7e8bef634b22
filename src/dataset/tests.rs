use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write csv");
    file
}

fn record(index: usize, product: &str, narrative: &str) -> ComplaintRecord {
    ComplaintRecord {
        record_index: index,
        complaint_id: Some(format!("C-{}", index)),
        narrative: narrative.to_string(),
        product: product.to_string(),
        issue: None,
        company: None,
    }
}

#[test]
fn loads_rows_with_all_columns() {
    let file = write_csv(
        "Complaint ID,Product,Issue,Company,clean_narrative\n\
         12345,Credit card,Billing dispute,Acme Bank,charged twice for one purchase\n\
         67890,Mortgage,Escrow,Home Corp,escrow balance was miscalculated\n",
    );

    let records = load_records(file.path()).expect("load records");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].complaint_id.as_deref(), Some("12345"));
    assert_eq!(records[0].product, "Credit card");
    assert_eq!(records[0].issue.as_deref(), Some("Billing dispute"));
    assert_eq!(records[0].company.as_deref(), Some("Acme Bank"));
    assert_eq!(records[0].narrative, "charged twice for one purchase");
    assert_eq!(records[1].record_index, 1);
}

#[test]
fn drops_rows_without_narrative() {
    let file = write_csv(
        "Complaint ID,Product,Issue,Company,clean_narrative\n\
         1,Credit card,Billing,Acme,has a narrative\n\
         2,Credit card,Billing,Acme,\n\
         3,Mortgage,Escrow,Home,   \n\
         4,Mortgage,Escrow,Home,another narrative\n",
    );

    let records = load_records(file.path()).expect("load records");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].complaint_id.as_deref(), Some("1"));
    assert_eq!(records[1].complaint_id.as_deref(), Some("4"));
}

#[test]
fn tolerates_missing_optional_columns() {
    let file = write_csv(
        "Product,clean_narrative\n\
         Credit card,the card was cancelled without notice\n",
    );

    let records = load_records(file.path()).expect("load records");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].complaint_id, None);
    assert_eq!(records[0].issue, None);
    assert_eq!(records[0].company, None);
}

#[test]
fn empty_optional_values_become_none() {
    let file = write_csv(
        "Complaint ID,Product,Issue,Company,clean_narrative\n\
         ,Credit card,,,a narrative with empty optionals\n",
    );

    let records = load_records(file.path()).expect("load records");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].complaint_id, None);
    assert_eq!(records[0].issue, None);
    assert_eq!(records[0].company, None);
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_records("/nonexistent/complaints.csv").is_err());
}

fn mixed_corpus() -> Vec<ComplaintRecord> {
    let mut records = Vec::new();
    for i in 0..80 {
        records.push(record(i, "Credit card", "credit card narrative"));
    }
    for i in 80..100 {
        records.push(record(i, "Mortgage", "mortgage narrative"));
    }
    reindexed(records)
}

fn reindexed(mut records: Vec<ComplaintRecord>) -> Vec<ComplaintRecord> {
    for (i, r) in records.iter_mut().enumerate() {
        r.record_index = i;
    }
    records
}

#[test]
fn sample_preserves_product_proportions() {
    let sampled = stratified_sample(mixed_corpus(), 50, 42);

    assert_eq!(sampled.len(), 50);
    let credit = sampled.iter().filter(|r| r.product == "Credit card").count();
    let mortgage = sampled.iter().filter(|r| r.product == "Mortgage").count();
    assert_eq!(credit, 40);
    assert_eq!(mortgage, 10);
}

#[test]
fn sample_is_deterministic_for_a_seed() {
    let first = stratified_sample(mixed_corpus(), 30, 42);
    let second = stratified_sample(mixed_corpus(), 30, 42);

    assert_eq!(first, second);
}

#[test]
fn different_seeds_draw_different_samples() {
    let first = stratified_sample(mixed_corpus(), 30, 42);
    let second = stratified_sample(mixed_corpus(), 30, 7);

    // Same proportions, but (almost surely) different members
    assert_eq!(first.len(), second.len());
    let first_ids: Vec<_> = first.iter().filter_map(|r| r.complaint_id.clone()).collect();
    let second_ids: Vec<_> = second.iter().filter_map(|r| r.complaint_id.clone()).collect();
    assert_ne!(first_ids, second_ids);
}

#[test]
fn sample_reassigns_sequential_record_indices() {
    let sampled = stratified_sample(mixed_corpus(), 25, 42);

    for (expected, record) in sampled.iter().enumerate() {
        assert_eq!(record.record_index, expected);
    }
}

#[test]
fn sample_size_covering_corpus_keeps_everything() {
    let sampled = stratified_sample(mixed_corpus(), 500, 42);

    assert_eq!(sampled.len(), 100);
    for (expected, record) in sampled.iter().enumerate() {
        assert_eq!(record.record_index, expected);
    }
}

#[test]
fn sampling_empty_corpus_yields_empty_sample() {
    assert!(stratified_sample(Vec::new(), 100, 42).is_empty());
}
