//! End-to-end parsing of pasted notes

use note_parser::{
    parse_document, parse_multi_line_field, parse_single_line_field, HeaderCatalog, NoteFormat,
    NoteParser,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

const COMPLETE_NOTE: &str = "\
Name: John Tan
NRIC: S1234567A
Date of Visit: 12/03/2024
BP: 130/80
Pulse: 72
SpO2: 98%
Temp: 36.8
Hypocount: 5.6 mmol/L

Past Medical History:
Hypertension
Hyperlipidaemia

Presenting Complaint:
Cough for 3 days

Issues:
1. URTI

Examination:
Chest clear
Throat injected

Plan:
Symptomatic treatment
Review if fever persists
";

const PARTIAL_NOTE: &str = "\
Name: Mary Lim
NRIC: T7654321B
Date of Visit: 13/03/2024
BP: 142/90

Presenting Complaint:
Giddiness on standing

Plan:
Check lying and standing BP
";

#[test]
fn test_header_case_and_spacing() {
    assert_eq!(parse_single_line_field("bp:130/80", &["BP"]), "130/80");
    assert_eq!(parse_single_line_field("BP : 130/80", &["BP"]), "130/80");
    assert_eq!(
        parse_single_line_field("Blood Pressure: 130/80", &["BP", "Blood Pressure"]),
        "130/80"
    );
}

#[test]
fn test_value_on_next_line() {
    assert_eq!(parse_single_line_field("Name:\nJohn Tan\n", &["Name"]), "John Tan");
}

#[test]
fn test_multi_line_stops_at_next_header() {
    let text = "Past Medical History:\nline1\nline2\nPresenting Complaint:\nother";
    assert_eq!(
        parse_multi_line_field(text, &["Past Medical History"]),
        "line1\nline2"
    );
}

#[test]
fn test_next_line_header_is_not_a_value() {
    assert_eq!(parse_single_line_field("BP:\nSpO2: 98%", &["BP"]), "");
}

#[test]
fn test_complete_note() {
    let note = parse_document(COMPLETE_NOTE);
    let catalog = HeaderCatalog::avixo();

    for field in &catalog.fields {
        assert!(note.is_filled(&field.key), "{} should be filled", field.key);
    }
    assert_eq!(note.get("name"), Some("John Tan"));
    assert_eq!(note.get("hypocount"), Some("5.6 mmol/L"));
    assert_eq!(
        note.get("past_medical_history"),
        Some("Hypertension\nHyperlipidaemia")
    );
    assert_eq!(note.get("examination"), Some("Chest clear\nThroat injected"));
    assert_eq!(
        note.get("plan"),
        Some("Symptomatic treatment\nReview if fever persists")
    );
    assert!(note.empty.is_empty());
    assert!(note.summary.ends_with("○ Empty:"));
}

#[test]
fn test_partial_note() {
    let note = parse_document(PARTIAL_NOTE);

    let keys: Vec<&str> = note.fields.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["bp", "date_of_visit", "name", "nric", "plan", "presenting_complaint"]
    );
    assert_eq!(note.get("plan"), Some("Check lying and standing BP"));
    assert_eq!(
        note.summary,
        "✓ Filled: Name, NRIC, Date of Visit, BP, Complaint, Plan\n\
         ○ Empty: Pulse, SpO2, Temp, Hypocount, PMH, Issues, Examination"
    );
}

#[test]
fn test_windows_line_endings() {
    let note = parse_document(&COMPLETE_NOTE.replace('\n', "\r\n"));
    assert_eq!(note, parse_document(COMPLETE_NOTE));
}

#[test]
fn test_merge_keeps_existing_values() {
    let mut record = BTreeMap::from([
        ("name".to_string(), "Typed By Hand".to_string()),
        ("pulse".to_string(), "80".to_string()),
    ]);

    let written = parse_document(PARTIAL_NOTE).merge_into(&mut record);

    assert_eq!(written, 5);
    assert_eq!(record["name"], "Typed By Hand");
    assert_eq!(record["pulse"], "80");
    assert_eq!(record["nric"], "T7654321B");
}

#[test]
fn test_catalog_from_json() {
    let catalog = HeaderCatalog::from_json(
        r#"{"fields": [
            {"key": "ward", "label": "Ward", "headers": ["Ward", "Bed"]},
            {"key": "remarks", "label": "Remarks", "shape": "multiLine", "headers": ["Remarks"]}
        ]}"#,
    )
    .unwrap();
    let parser = NoteParser::new(catalog).unwrap();

    let note = parser.parse("Bed: 12\nRemarks:\nStable\nWard: 4\n");
    assert_eq!(note.get("ward"), Some("4"));
    assert_eq!(note.get("remarks"), Some("Stable"));
}

#[test]
fn test_lentor_format() {
    let text = "Resident Name: Goh Siew Lan\nWard: 1C\nNotes:\nSlept well\nAte half of lunch\nIsolation: Y\n";
    let note = NoteFormat::Lentor.parse(text);

    assert_eq!(note.get("name"), Some("Goh Siew Lan"));
    assert_eq!(note.get("progress_notes"), Some("Slept well\nAte half of lunch"));
    assert_eq!(note.get("isolation"), Some("Yes"));
}
