use super::*;

fn sample_record() -> ComplaintRecord {
    ComplaintRecord {
        record_index: 7,
        complaint_id: Some("987654".to_string()),
        narrative: "the bank closed my account without warning".to_string(),
        product: "Checking account".to_string(),
        issue: Some("Account closure".to_string()),
        company: Some("Acme Bank".to_string()),
    }
}

#[test]
fn entry_id_joins_record_and_chunk_indices() {
    assert_eq!(entry_id(0, 0), "0_0");
    assert_eq!(entry_id(7, 3), "7_3");
    assert_eq!(entry_id(11999, 42), "11999_42");
}

#[test]
fn entry_id_is_stable() {
    assert_eq!(entry_id(5, 2), entry_id(5, 2));
}

#[test]
fn metadata_uses_external_complaint_id_when_present() {
    let metadata = EntryMetadata::for_chunk(&sample_record(), 3);

    assert_eq!(metadata.complaint_id, "987654");
    assert_eq!(metadata.product, "Checking account");
    assert_eq!(metadata.issue.as_deref(), Some("Account closure"));
    assert_eq!(metadata.company.as_deref(), Some("Acme Bank"));
    assert_eq!(metadata.chunk_index, 3);
}

#[test]
fn metadata_falls_back_to_record_index() {
    let mut record = sample_record();
    record.complaint_id = None;

    let metadata = EntryMetadata::for_chunk(&record, 0);
    assert_eq!(metadata.complaint_id, "7");
}

#[test]
fn missing_optional_fields_stay_explicitly_absent() {
    let mut record = sample_record();
    record.issue = None;
    record.company = None;

    let metadata = EntryMetadata::for_chunk(&record, 1);
    assert_eq!(metadata.issue, None);
    assert_eq!(metadata.company, None);
}

#[test]
fn assemble_builds_the_full_tuple() {
    let record = sample_record();
    let chunk = NarrativeChunk {
        content: "the bank closed my account".to_string(),
        chunk_index: 2,
    };

    let entry = IndexedEntry::assemble(&record, &chunk, vec![0.1, 0.2, 0.3]);

    assert_eq!(entry.id, "7_2");
    assert_eq!(entry.document, "the bank closed my account");
    assert_eq!(entry.vector.len(), 3);
    assert_eq!(entry.metadata.chunk_index, 2);
}
