//! End-to-end batch scenarios over in-memory documents.

use pretty_assertions::assert_eq;
use rstest::*;
use sap_orient::core::normalize::Handedness;
use sap_orient::{process_batch, BatchError, DocumentStore, MemoryDocumentSink, PlotRow};

const HOUSE_TYPE_A: &str = r#"<Report>
  <Assessment>
    <PropertyType2>MidTerrace</PropertyType2>
    <ShelteredSides>0</ShelteredSides>
    <Reference>TYPE-A</Reference>
    <DwellingOrientation>South</DwellingOrientation>
  </Assessment>
  <Openings>
    <Opening><Orientation>East</Orientation></Opening>
    <Opening><Orientation>South</Orientation></Opening>
  </Openings>
  <PhotovoltaicUnits>
    <PhotovoltaicUnit>
      <Orientation>South</Orientation>
      <Elevation>_30</Elevation>
    </PhotovoltaicUnit>
  </PhotovoltaicUnits>
  <Plot>
    <Reference>UNSET</Reference>
    <TypeReference>H23(AS)</TypeReference>
    <HouseName>Type A</HouseName>
    <HouseNumber>0</HouseNumber>
  </Plot>
</Report>"#;

fn base_row(reference: &str) -> PlotRow {
    PlotRow {
        plot_reference: reference.to_string(),
        xml_filename: "type_a".to_string(),
        dwelling_orientation: "North".to_string(),
        connotation: None,
        sheltered_sides: None,
        plot_number: None,
        roof_orientation: None,
        roof_pitch: None,
        handedness: Handedness::AsDrawn,
    }
}

#[fixture]
fn store() -> DocumentStore {
    let mut store = DocumentStore::new();
    store.insert("type_a.xml", HOUSE_TYPE_A.as_bytes().to_vec());
    store
}

fn output_text(sink: &MemoryDocumentSink, name: &str) -> String {
    String::from_utf8(sink.document(name).expect("output missing").to_vec()).unwrap()
}

#[rstest]
fn as_drawn_plot_is_rotated_but_not_mirrored(store: DocumentStore) {
    let mut sink = MemoryDocumentSink::new();
    let outcome = process_batch(vec![base_row("P100")], &store, &mut sink).unwrap();

    assert_eq!(outcome.written, vec!["P100.xml".to_string()]);
    let output = output_text(&sink, "P100.xml");
    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(output.contains("<DwellingOrientation>North</DwellingOrientation>"));
    // South -> North rotates everything by 180 degrees.
    assert!(output.contains("<Orientation>West</Orientation>"));
    assert!(output.contains("<Orientation>North</Orientation>"));
}

#[rstest]
fn opposite_hand_plot_mirrors_rotated_openings(store: DocumentStore) {
    let mut row = base_row("P100");
    row.handedness = Handedness::Opposite;
    let mut sink = MemoryDocumentSink::new();
    process_batch(vec![row], &store, &mut sink).unwrap();

    let output = output_text(&sink, "P100.xml");
    // The East-facing opening rotates to West, then mirrors back to East
    // about the new North axis.
    assert!(output.contains("<Orientation>East</Orientation>"));
    assert!(output.contains("<TypeReference>H23(OP)</TypeReference>"));
    assert!(output.contains("<HouseNumber>H23(OP)</HouseNumber>"));
}

#[rstest]
fn schedule_fields_flow_into_both_sections(store: DocumentStore) {
    let mut row = base_row("P100");
    row.connotation = Some("SEMI".to_string());
    row.sheltered_sides = Some("2.0".to_string());
    row.plot_number = Some("41".to_string());
    row.roof_orientation = Some("SE".to_string());
    row.roof_pitch = Some("45.0".to_string());
    let mut sink = MemoryDocumentSink::new();
    process_batch(vec![row], &store, &mut sink).unwrap();

    let output = output_text(&sink, "P100.xml");
    assert!(output.contains("<PropertyType2>SemiDetached</PropertyType2>"));
    assert!(output.contains("<ShelteredSides>2</ShelteredSides>"));
    assert!(output.contains("<Reference>41</Reference>"));
    assert!(output.contains("<Orientation>Southeast</Orientation>"));
    assert!(output.contains("<Elevation>_45</Elevation>"));
    assert!(output.contains("<Reference>P100</Reference>"));
    assert!(output.contains("<HouseName>41</HouseName>"));
}

#[rstest]
fn duplicate_references_produce_no_files_at_all(store: DocumentStore) {
    let mut sink = MemoryDocumentSink::new();
    let result = process_batch(
        vec![base_row("P100"), base_row("P100")],
        &store,
        &mut sink,
    );

    match result {
        Err(BatchError::DuplicatePlotReferences { references }) => {
            assert_eq!(references, vec!["P100".to_string()]);
        }
        other => panic!("expected duplicate reference error, got {other:?}"),
    }
    assert!(sink.documents().is_empty());
}

#[rstest]
fn a_degraded_batch_still_emits_every_matched_row(store: DocumentStore) {
    let mut missing = base_row("P101");
    missing.xml_filename = "type_b".to_string();
    let mut unparsable_fields = base_row("P102");
    unparsable_fields.connotation = Some("DETACHED".to_string());
    unparsable_fields.roof_pitch = Some("steep".to_string());

    let mut sink = MemoryDocumentSink::new();
    let outcome = process_batch(
        vec![base_row("P100"), missing, unparsable_fields],
        &store,
        &mut sink,
    )
    .unwrap();

    assert_eq!(
        outcome.written,
        vec!["P100.xml".to_string(), "P102.xml".to_string()]
    );
    assert_eq!(outcome.skipped_missing, vec!["type_b.xml".to_string()]);
    let output = output_text(&sink, "P102.xml");
    // Unrecognized cells leave the prior values in place.
    assert!(output.contains("<PropertyType2>MidTerrace</PropertyType2>"));
    assert!(output.contains("<Elevation>_30</Elevation>"));
}
