//! UniProt XML annotation parser
//!
//! Single forward pass over the `quick-xml` event stream. No DOM is built:
//! a small [`ParseCursor`] owned by each parse call tracks the element that
//! was opened last, the cross-reference currently receiving properties, and
//! the records produced so far.
//!
//! Recognized elements are `entry`, `dbReference` (`type`, `id`), `property`
//! (`type`, `value`) and `sequence`. Everything else is skipped.

use flate2::read::GzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

use super::models::{AnnotationRecord, CrossReference, GO_TERM_TYPE};
use super::{ParseError, Result};

const ENTRY: &str = "entry";
const DB_REFERENCE: &str = "dbreference";
const PROPERTY: &str = "property";
const SEQUENCE: &str = "sequence";

/// How `<entry>` elements map onto records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// The whole document is one record; `<entry>` boundaries are ignored
    #[default]
    SingleEntry,
    /// Every `<entry>` starts a new record
    EntrySet,
}

/// Which `<dbReference>` types become cross-references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermFilter {
    #[default]
    All,
    /// Only `type="GO"` references are kept
    GoOnly,
}

impl TermFilter {
    fn accepts(self, db_type: &str) -> bool {
        match self {
            TermFilter::All => true,
            TermFilter::GoOnly => db_type == GO_TERM_TYPE,
        }
    }
}

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub mode: EntryMode,
    pub term_filter: TermFilter,
    /// Whether `<sequence>` text is captured at all
    pub capture_sequence: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mode: EntryMode::SingleEntry,
            term_filter: TermFilter::All,
            capture_sequence: true,
        }
    }
}

impl ParserConfig {
    pub fn entry_set(mut self) -> Self {
        self.mode = EntryMode::EntrySet;
        self
    }

    pub fn single_entry(mut self) -> Self {
        self.mode = EntryMode::SingleEntry;
        self
    }

    pub fn go_only(mut self) -> Self {
        self.term_filter = TermFilter::GoOnly;
        self
    }

    pub fn without_sequence(mut self) -> Self {
        self.capture_sequence = false;
        self
    }
}

/// Parse output, shaped by [`EntryMode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedDocument {
    Entry(AnnotationRecord),
    EntrySet(Vec<AnnotationRecord>),
}

impl ParsedDocument {
    /// Flatten into a list of records regardless of mode
    pub fn into_records(self) -> Vec<AnnotationRecord> {
        match self {
            ParsedDocument::Entry(record) => vec![record],
            ParsedDocument::EntrySet(records) => records,
        }
    }
}

/// Streaming parser for UniProt entry XML
#[derive(Debug, Clone, Default)]
pub struct AnnotationParser {
    config: ParserConfig,
}

impl AnnotationParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a document according to the configured mode
    pub fn parse(&self, xml: &str) -> std::result::Result<ParsedDocument, ParseError> {
        let records = run(xml, &self.config)?;
        Ok(match self.config.mode {
            EntryMode::EntrySet => ParsedDocument::EntrySet(records),
            EntryMode::SingleEntry => {
                ParsedDocument::Entry(records.into_iter().next().unwrap_or_default())
            },
        })
    }

    /// Parse a document as a single entry
    pub fn parse_entry(&self, xml: &str) -> std::result::Result<AnnotationRecord, ParseError> {
        let config = self.config.single_entry();
        let records = run(xml, &config)?;
        Ok(records.into_iter().next().unwrap_or_default())
    }

    /// Parse a document holding any number of `<entry>` elements
    pub fn parse_entries(
        &self,
        xml: &str,
    ) -> std::result::Result<Vec<AnnotationRecord>, ParseError> {
        let config = self.config.entry_set();
        run(xml, &config)
    }

    /// Parse a `.xml` or `.xml.gz` file
    pub fn parse_file(&self, path: &Path) -> Result<ParsedDocument> {
        let file = std::fs::File::open(path)?;

        let mut xml = String::new();
        if path.extension().and_then(|s| s.to_str()) == Some("gz") {
            GzDecoder::new(file).read_to_string(&mut xml)?;
        } else {
            std::io::BufReader::new(file).read_to_string(&mut xml)?;
        }

        debug!(path = %path.display(), bytes = xml.len(), "Parsing UniProt XML file");
        Ok(self.parse(&xml)?)
    }
}

/// Parse one entry with the default configuration
pub fn parse_entry(xml: &str) -> std::result::Result<AnnotationRecord, ParseError> {
    AnnotationParser::default().parse_entry(xml)
}

/// Parse an entry-set document with the default configuration
pub fn parse_entries(xml: &str) -> std::result::Result<Vec<AnnotationRecord>, ParseError> {
    AnnotationParser::default().parse_entries(xml)
}

/// Location of the cross-reference currently receiving properties
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveReference {
    bucket: String,
    index: usize,
}

/// Mutable parse state, private to one parse call
#[derive(Debug)]
struct ParseCursor<'c> {
    config: &'c ParserConfig,
    records: Vec<AnnotationRecord>,
    /// Lower-cased name of the most recently opened element, cleared on close
    current_element: Option<String>,
    /// Survives element closes; replaced only by the next `<dbReference>`
    active_reference: Option<ActiveReference>,
    /// Text seen inside the current `<sequence>`, committed on the next tag
    sequence_buffer: Option<String>,
    /// Between `<entry>` and `</entry>`; always set in single-entry mode
    in_entry: bool,
}

impl<'c> ParseCursor<'c> {
    fn new(config: &'c ParserConfig) -> Self {
        let records = match config.mode {
            EntryMode::SingleEntry => vec![AnnotationRecord::new()],
            EntryMode::EntrySet => Vec::new(),
        };

        Self {
            config,
            records,
            current_element: None,
            active_reference: None,
            sequence_buffer: None,
            in_entry: config.mode == EntryMode::SingleEntry,
        }
    }

    fn active_record(&mut self) -> Option<&mut AnnotationRecord> {
        if !self.in_entry {
            return None;
        }
        self.records.last_mut()
    }

    /// Start-tag transition. Side effects first, then the name is recorded.
    fn open(&mut self, name: String, attrs: Attrs) {
        self.commit_sequence();

        match name.as_str() {
            ENTRY if self.config.mode == EntryMode::EntrySet => {
                self.records.push(AnnotationRecord::new());
                self.active_reference = None;
                self.in_entry = true;
            },
            DB_REFERENCE => self.open_reference(attrs),
            PROPERTY => self.set_property(attrs),
            _ => {},
        }

        self.current_element = Some(name);
    }

    fn open_reference(&mut self, attrs: Attrs) {
        let Some(db_type) = attrs.db_type else {
            return;
        };

        let accepted = attrs.id.filter(|_| self.config.term_filter.accepts(&db_type));
        let Some(id) = accepted else {
            // properties of a skipped reference must not land on the previous one
            self.active_reference = None;
            return;
        };

        let Some(record) = self.active_record() else {
            trace!(db_type = %db_type, id = %id, "dbReference outside of an entry");
            return;
        };

        let reference = CrossReference {
            db_type: db_type.clone(),
            id,
            properties: Default::default(),
        };
        let index = record.push_reference(reference);
        self.active_reference = Some(ActiveReference {
            bucket: db_type,
            index,
        });
    }

    fn set_property(&mut self, attrs: Attrs) {
        let (Some(key), Some(value)) = (attrs.db_type, attrs.value) else {
            return;
        };
        let Some(active) = self.active_reference.clone() else {
            trace!(key = %key, "property without an active cross-reference");
            return;
        };

        if let Some(reference) = self
            .active_record()
            .and_then(|record| record.terms.get_mut(&active.bucket))
            .and_then(|bucket| bucket.get_mut(active.index))
        {
            reference.properties.insert(key, value);
        }
    }

    /// End-tag transition. The active cross-reference stays active.
    fn close(&mut self, name: &str) {
        self.commit_sequence();
        self.current_element = None;

        if name == ENTRY && self.config.mode == EntryMode::EntrySet {
            self.active_reference = None;
            self.in_entry = false;
        }
    }

    fn text(&mut self, text: &str) {
        if !self.config.capture_sequence || self.current_element.as_deref() != Some(SEQUENCE) {
            return;
        }
        self.sequence_buffer
            .get_or_insert_with(String::new)
            .push_str(text);
    }

    /// Replace the active record's sequence with the buffered text
    fn commit_sequence(&mut self) {
        let Some(sequence) = self.sequence_buffer.take() else {
            return;
        };
        if let Some(record) = self.active_record() {
            record.sequence = Some(sequence);
        }
    }

    fn finish(mut self) -> Vec<AnnotationRecord> {
        self.commit_sequence();
        self.records
    }
}

/// Attributes the cursor cares about, with `type` already lower-cased
#[derive(Debug, Default)]
struct Attrs {
    db_type: Option<String>,
    id: Option<String>,
    value: Option<String>,
}

impl Attrs {
    fn read(
        element: &BytesStart<'_>,
        reader: &Reader<&[u8]>,
    ) -> std::result::Result<Self, ParseError> {
        let mut attrs = Attrs::default();

        for attr in element.attributes() {
            let attr = attr.map_err(|e| ParseError::new(reader.buffer_position(), e))?;
            let slot = match attr.key.as_ref() {
                b"type" => &mut attrs.db_type,
                b"id" => &mut attrs.id,
                b"value" => &mut attrs.value,
                _ => continue,
            };
            let value = attr
                .unescape_value()
                .map_err(|e| ParseError::new(reader.buffer_position(), e))?;
            *slot = Some(value.into_owned());
        }

        attrs.db_type = attrs.db_type.map(|t| t.to_lowercase());
        Ok(attrs)
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).to_lowercase()
}

/// Drive the cursor over the whole token stream
fn run(xml: &str, config: &ParserConfig) -> std::result::Result<Vec<AnnotationRecord>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut cursor = ParseCursor::new(config);
    let mut depth = 0usize;
    let mut root_seen = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::new(reader.error_position(), e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if depth == 0 && root_seen {
                    return Err(ParseError::new(
                        reader.buffer_position(),
                        "junk after document element",
                    ));
                }
                root_seen = true;

                let name = element_name(e);
                let attrs = Attrs::read(e, &reader)?;
                cursor.open(name.clone(), attrs);

                if matches!(event, Event::Empty(_)) {
                    cursor.close(&name);
                } else {
                    depth += 1;
                }
            },
            Event::End(ref e) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ParseError::new(reader.buffer_position(), "unmatched end tag")
                })?;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                cursor.close(&name);
            },
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| ParseError::new(reader.buffer_position(), err))?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(ParseError::new(
                            reader.buffer_position(),
                            "text outside of the document element",
                        ));
                    }
                    continue;
                }
                cursor.text(&text);
            },
            Event::CData(ref e) => {
                let text = std::str::from_utf8(e)
                    .map_err(|err| ParseError::new(reader.buffer_position(), err))?;
                cursor.text(text);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !root_seen {
        return Err(ParseError::new(reader.buffer_position(), "no element found"));
    }
    if depth != 0 {
        return Err(ParseError::new(
            reader.buffer_position(),
            format!("unexpected end of document, {} element(s) left open", depth),
        ));
    }

    let records = cursor.finish();
    debug!(records = records.len(), "Parsed UniProt XML");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_ENTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<uniprot xmlns="http://uniprot.org/uniprot">
  <entry dataset="Swiss-Prot">
    <accession>P12345</accession>
    <dbReference type="GO" id="GO:0005515">
      <property type="evidence" value="ECO:0000255"/>
    </dbReference>
    <sequence length="8">MKVLAAGI</sequence>
  </entry>
</uniprot>"#;

    #[test]
    fn test_property_resolves_against_open_reference() {
        let record = parse_entry(SINGLE_ENTRY).unwrap();
        let go = record.terms_of("go");
        assert_eq!(go.len(), 1);
        assert_eq!(go[0].id, "GO:0005515");
        assert_eq!(go[0].property("evidence"), Some("ECO:0000255"));
        assert_eq!(record.sequence.as_deref(), Some("MKVLAAGI"));
    }

    #[test]
    fn test_active_reference_survives_property_close() {
        let xml = r#"<entry>
            <dbReference type="PDB" id="1ABC">
              <property type="method" value="X-ray"/>
              <property type="resolution" value="2.00 A"></property>
            </dbReference>
            <comment>unrelated</comment>
            <property type="chains" value="A=1-100"/>
        </entry>"#;

        let record = parse_entry(xml).unwrap();
        let pdb = &record.terms_of("pdb")[0];
        assert_eq!(pdb.property("method"), Some("X-ray"));
        assert_eq!(pdb.property("resolution"), Some("2.00 A"));
        assert_eq!(pdb.property("chains"), Some("A=1-100"));
    }

    #[test]
    fn test_property_before_any_reference_is_dropped() {
        let xml = r#"<entry>
            <property type="evidence" value="ECO:1"/>
            <dbReference type="GO" id="GO:0000001"/>
        </entry>"#;

        let record = parse_entry(xml).unwrap();
        assert!(record.terms_of("go")[0].properties.is_empty());
    }

    #[test]
    fn test_repeated_property_last_write_wins() {
        let xml = r#"<entry><dbReference type="GO" id="GO:1">
            <property type="Evidence" value="first"/>
            <property type="evidence" value="second"/>
        </dbReference></entry>"#;

        let record = parse_entry(xml).unwrap();
        let go = &record.terms_of("go")[0];
        assert_eq!(go.properties.len(), 1);
        assert_eq!(go.property("evidence"), Some("second"));
    }

    #[test]
    fn test_reference_without_id_is_skipped() {
        let xml = r#"<entry>
            <dbReference type="GO" id="GO:1"/>
            <dbReference type="GO"><property type="x" value="y"/></dbReference>
        </entry>"#;

        let record = parse_entry(xml).unwrap();
        let go = record.terms_of("go");
        assert_eq!(go.len(), 1);
        assert!(go[0].properties.is_empty());
    }

    #[test]
    fn test_go_only_filter() {
        let xml = r#"<entry>
            <dbReference type="GO" id="GO:1"/>
            <dbReference type="PDB" id="1ABC"><property type="method" value="NMR"/></dbReference>
        </entry>"#;

        let parser = AnnotationParser::new(ParserConfig::default().go_only());
        let record = parser.parse_entry(xml).unwrap();
        assert_eq!(record.term_types(), vec!["go"]);
        assert!(record.terms_of("go")[0].properties.is_empty());
    }

    #[test]
    fn test_sequence_capture_can_be_disabled() {
        let parser = AnnotationParser::new(ParserConfig::default().without_sequence());
        let record = parser.parse_entry(SINGLE_ENTRY).unwrap();
        assert_eq!(record.sequence, None);
        assert_eq!(record.terms_of("go").len(), 1);
    }

    #[test]
    fn test_sequence_is_replaced_not_appended() {
        let xml = "<entry><sequence>AAAA</sequence><sequence>CCCC</sequence></entry>";
        let record = parse_entry(xml).unwrap();
        assert_eq!(record.sequence.as_deref(), Some("CCCC"));
    }

    #[test]
    fn test_sequence_chunks_are_joined() {
        let xml = "<entry><sequence>MK<![CDATA[VL]]>A&amp;G</sequence></entry>";
        let record = parse_entry(xml).unwrap();
        assert_eq!(record.sequence.as_deref(), Some("MKVLA&G"));
    }

    #[test]
    fn test_sequence_text_after_child_element_is_ignored() {
        let xml = "<entry><sequence>MKV<note/>LLL</sequence></entry>";
        let record = parse_entry(xml).unwrap();
        assert_eq!(record.sequence.as_deref(), Some("MKV"));
    }

    #[test]
    fn test_empty_sequence_element_leaves_none() {
        let record = parse_entry("<entry><sequence/></entry>").unwrap();
        assert_eq!(record.sequence, None);
    }

    #[test]
    fn test_entry_set_mode_returns_entry_set() {
        let xml = "<uniprot><entry/><entry/></uniprot>";
        let parser = AnnotationParser::new(ParserConfig::default().entry_set());
        match parser.parse(xml).unwrap() {
            ParsedDocument::EntrySet(records) => assert_eq!(records.len(), 2),
            other => panic!("expected entry set, got {:?}", other),
        }
    }

    #[test]
    fn test_single_entry_mode_merges_entries() {
        let xml = r#"<uniprot>
            <entry><dbReference type="GO" id="GO:1"/></entry>
            <entry><dbReference type="GO" id="GO:2"/></entry>
        </uniprot>"#;
        let record = parse_entry(xml).unwrap();
        assert_eq!(record.go_term_ids(), vec!["GO:1", "GO:2"]);
    }

    #[test]
    fn test_reference_before_first_entry_is_dropped_in_entry_set_mode() {
        let xml = r#"<uniprot>
            <dbReference type="GO" id="GO:0"/>
            <entry><dbReference type="GO" id="GO:1"/></entry>
        </uniprot>"#;
        let records = parse_entries(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].go_term_ids(), vec!["GO:1"]);
    }

    #[test]
    fn test_content_between_entries_is_dropped_in_entry_set_mode() {
        let xml = r#"<uniprot>
            <entry><dbReference type="GO" id="GO:1"/><sequence>AAAA</sequence></entry>
            <dbReference type="PDB" id="9XYZ"><property type="method" value="NMR"/></dbReference>
            <sequence>CCCC</sequence>
            <entry><dbReference type="GO" id="GO:2"/></entry>
        </uniprot>"#;
        let records = parse_entries(xml).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].go_term_ids(), vec!["GO:1"]);
        assert!(records[0].terms_of("pdb").is_empty());
        assert_eq!(records[0].sequence.as_deref(), Some("AAAA"));
        assert_eq!(records[1].go_term_ids(), vec!["GO:2"]);
        assert!(records[1].terms_of("pdb").is_empty());
        assert!(records[1].sequence.is_none());
    }

    #[test]
    fn test_content_between_entries_is_kept_in_single_entry_mode() {
        let xml = r#"<uniprot>
            <entry><dbReference type="GO" id="GO:1"/></entry>
            <dbReference type="PDB" id="9XYZ"/>
            <sequence>CCCC</sequence>
        </uniprot>"#;
        let record = parse_entry(xml).unwrap();

        assert_eq!(record.terms_of("pdb")[0].id, "9XYZ");
        assert_eq!(record.sequence.as_deref(), Some("CCCC"));
    }

    #[test]
    fn test_malformed_xml_reports_position() {
        let err = parse_entry("<entry><sequence>MKV</entry>").unwrap_err();
        assert!(err.position > 0);
    }

    #[test]
    fn test_unclosed_document_is_an_error() {
        assert!(parse_entry("<entry><dbReference type=\"GO\" id=\"GO:1\">").is_err());
    }

    #[test]
    fn test_empty_document_is_an_error() {
        assert!(parse_entry("").is_err());
        assert!(parse_entry("   \n").is_err());
    }

    #[test]
    fn test_second_root_is_an_error() {
        assert!(parse_entry("<entry/><entry/>").is_err());
    }
}
