//! Integration tests for the UniProt XML annotation parser

use flate2::write::GzEncoder;
use flate2::Compression;
use manas_ingest::uniprot::{
    parse_entries, parse_entry, AnnotationParser, CrossReference, ParsedDocument, ParserConfig,
};
use proptest::prelude::*;
use std::io::Write;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path().join(name)).expect("Failed to read fixture")
}

// ============================================================================
// Single entry
// ============================================================================

#[test]
fn test_go_reference_with_evidence() {
    let xml = r#"<entry><dbReference type="GO" id="GO:0005515"><property type="evidence" value="ECO:0000255"/></dbReference></entry>"#;

    let record = parse_entry(xml).unwrap();

    let expected =
        vec![CrossReference::new("go", "GO:0005515").with_property("evidence", "ECO:0000255")];
    assert_eq!(record.terms_of("go"), expected.as_slice());
    assert_eq!(record.terms.len(), 1);
}

#[test]
fn test_sequence_is_verbatim() {
    let xml = "<entry><sequence length=\"9\"> MKVLAAGIV\n</sequence></entry>";
    let record = parse_entry(xml).unwrap();
    assert_eq!(record.sequence.as_deref(), Some(" MKVLAAGIV\n"));
}

#[test]
fn test_entry_without_references() {
    let record = parse_entry("<entry><accession>P00000</accession></entry>").unwrap();
    assert!(record.terms.is_empty());
    assert!(record.sequence.is_none());
    assert!(record.go_terms().is_empty());
}

#[test]
fn test_parse_fixture_entry() {
    let record = parse_entry(&fixture("P12345.xml")).unwrap();

    assert_eq!(record.sequence.as_deref(), Some("MALLHSARVLSGVASAFHPGLAAAASARAS"));
    assert_eq!(record.term_types(), vec!["alphafolddb", "go", "interpro", "pdb"]);
    assert_eq!(record.go_term_ids(), vec!["GO:0005739", "GO:0004069"]);

    let pdb = &record.terms_of("PDB")[0];
    assert_eq!(pdb.id, "1AJS");
    assert_eq!(pdb.property("method"), Some("X-ray"));
    assert_eq!(pdb.property("resolution"), Some("1.60 A"));

    let interpro = &record.terms_of("interpro")[0];
    assert_eq!(interpro.property("entry name"), Some("Aminotransferase_I/II"));

    assert!(record.terms_of("alphafolddb")[0].properties.is_empty());
    assert_eq!(record.structure_references().count(), 2);
}

#[test]
fn test_go_only_fixture() {
    let parser = AnnotationParser::new(ParserConfig::default().go_only());
    let record = parser.parse_entry(&fixture("P12345.xml")).unwrap();

    assert_eq!(record.term_types(), vec!["go"]);
    assert_eq!(record.go_terms().len(), 2);
    // Properties of the filtered PDB reference do not leak anywhere
    assert!(record
        .go_terms()
        .iter()
        .all(|go| go.property("method").is_none()));
}

#[test]
fn test_without_sequence() {
    let parser = AnnotationParser::new(ParserConfig::default().without_sequence());
    let record = parser.parse_entry(&fixture("P12345.xml")).unwrap();
    assert!(record.sequence.is_none());
    assert_eq!(record.go_terms().len(), 2);
}

// ============================================================================
// Entry sets
// ============================================================================

#[test]
fn test_entry_set_fixture() {
    let records = parse_entries(&fixture("entries.xml")).unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].go_term_ids(), vec!["GO:0000004"]);
    assert_eq!(records[0].sequence.as_deref(), Some("MKVLA"));

    // A property after </dbReference> still belongs to that reference
    let pdb = &records[1].terms_of("pdb")[0];
    assert_eq!(pdb.property("method"), Some("NMR"));
    assert_eq!(pdb.property("trailing"), Some("kept"));
    assert!(records[1].go_terms().is_empty());

    // The leading property of entry 3 has no reference to attach to
    let go = &records[2].go_terms()[0];
    assert_eq!(go.id, "GO:0000002");
    assert!(go.properties.is_empty());
    assert!(records[2].sequence.is_none());
    assert_eq!(records[1].terms_of("pdb").len(), 1);
}

#[test]
fn test_entry_contexts_are_isolated() {
    let xml = r#"<uniprot>
        <entry><dbReference type="GO" id="GO:1"/></entry>
        <entry><dbReference type="GO" id="GO:2"/></entry>
        <entry><property type="evidence" value="ECO:1"/></entry>
    </uniprot>"#;

    let records = parse_entries(xml).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records[0].go_terms()[0].properties.is_empty());
    assert!(records[1].go_terms()[0].properties.is_empty());
    assert!(records[2].terms.is_empty());
}

#[test]
fn test_property_between_entries_does_not_reach_previous_reference() {
    let xml = r#"<uniprot>
        <entry>
            <dbReference type="GO" id="GO:1"/>
            <dbReference type="PDB" id="1ABC"><property type="method" value="X-ray"/></dbReference>
        </entry>
        <property type="method" value="NMR"/>
        <property type="resolution" value="2.0 A"/>
        <entry><dbReference type="GO" id="GO:2"/></entry>
    </uniprot>"#;

    let records = parse_entries(xml).unwrap();
    assert_eq!(records.len(), 2);

    let pdb = records[0].terms_of("pdb");
    assert_eq!(pdb.len(), 1);
    assert_eq!(pdb[0].property("method"), Some("X-ray"));
    assert_eq!(pdb[0].property("resolution"), None);
    assert_eq!(pdb[0].properties.len(), 1);
    assert!(records[1].go_terms()[0].properties.is_empty());
}

#[test]
fn test_parse_dispatches_on_mode() {
    let xml = fixture("entries.xml");

    let single = AnnotationParser::default().parse(&xml).unwrap();
    let ParsedDocument::Entry(merged) = single else {
        panic!("expected a single record");
    };
    assert_eq!(merged.go_term_ids(), vec!["GO:0000004", "GO:0000002"]);

    let set = AnnotationParser::new(ParserConfig::default().entry_set())
        .parse(&xml)
        .unwrap();
    assert_eq!(set.into_records().len(), 3);
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_parse_file_plain() {
    let document = AnnotationParser::default()
        .parse_file(&fixture_path().join("P12345.xml"))
        .unwrap();
    assert_eq!(document.into_records().len(), 1);
}

#[test]
fn test_parse_file_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.xml.gz");

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(fixture("entries.xml").as_bytes()).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let parser = AnnotationParser::new(ParserConfig::default().entry_set());
    let records = parser.parse_file(&path).unwrap().into_records();
    assert_eq!(records, parse_entries(&fixture("entries.xml")).unwrap());
}

#[test]
fn test_parse_file_missing() {
    let result = AnnotationParser::default().parse_file(&fixture_path().join("missing.xml"));
    assert!(result.is_err());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_malformed_xml_reports_position() {
    let xml = "<entry><dbReference type=\"GO\" id=\"GO:1\"></entry>";
    let err = parse_entry(xml).unwrap_err();
    assert!(err.position > 0);
}

#[test]
fn test_truncated_document() {
    let xml = &fixture("P12345.xml")[..200];
    assert!(parse_entry(xml).is_err());
}

#[test]
fn test_empty_document() {
    assert!(parse_entry("").is_err());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_reparse_is_equal() {
    let xml = fixture("P12345.xml");
    assert_eq!(parse_entry(&xml).unwrap(), parse_entry(&xml).unwrap());
}

proptest! {
    #[test]
    fn prop_reparse_is_equal(
        ids in proptest::collection::vec("GO:[0-9]{7}", 0..6),
        sequence in "[ARNDCEQGHILKMFPSTWYV]{0,40}",
    ) {
        let mut xml = String::from("<entry>");
        for id in &ids {
            xml.push_str(&format!(
                "<dbReference type=\"GO\" id=\"{}\"><property type=\"evidence\" value=\"ECO:0000255\"/></dbReference>",
                id
            ));
        }
        xml.push_str(&format!("<sequence>{}</sequence></entry>", sequence));

        let first = parse_entry(&xml).unwrap();
        let second = parse_entry(&xml).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.go_terms().len(), ids.len());
        if sequence.is_empty() {
            prop_assert!(first.sequence.is_none());
        } else {
            prop_assert_eq!(first.sequence.as_deref(), Some(sequence.as_str()));
        }
    }
}
