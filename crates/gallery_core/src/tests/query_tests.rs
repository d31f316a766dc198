use super::*;
use serde_json::json;

fn record(value: serde_json::Value) -> Record {
    serde_json::from_value(value).expect("record")
}

#[test]
fn parses_exact_and_contains_clauses() {
    let exact: FieldFilter = "Species=Heliconius erato".parse().unwrap();
    assert_eq!(exact, FieldFilter::exact("Species", "Heliconius erato"));

    let contains: FieldFilter = " Subspecies_Form ~ LATI ".parse().unwrap();
    assert_eq!(contains.field, "Subspecies_Form");
    assert_eq!(contains.value, "lati");
    assert_eq!(contains.mode, MatchMode::Contains);
}

#[test]
fn splits_at_the_first_operator() {
    let filter: FieldFilter = "Notes~a=b".parse().unwrap();
    assert_eq!(filter.field, "Notes");
    assert_eq!(filter.value, "a=b");
    assert_eq!(filter.mode, MatchMode::Contains);
}

#[test]
fn rejects_malformed_clauses() {
    assert_eq!(
        "Species".parse::<FieldFilter>(),
        Err(QueryParseError::MissingOperator("Species".into()))
    );
    assert_eq!(
        "=x".parse::<FieldFilter>(),
        Err(QueryParseError::EmptyField("=x".into()))
    );
    assert!(RecordQuery::parse_all(["Sex=M", "broken"]).is_err());
}

#[test]
fn clauses_are_anded() {
    let male_erato = record(json!({"Species": "Heliconius erato", "Sex": "M"}));
    let female_erato = record(json!({"Species": "Heliconius erato", "Sex": "F"}));
    let query = RecordQuery::parse_all(["Species~ERATO", "Sex=M"]).unwrap();

    assert!(query.matches(&male_erato));
    assert!(!query.matches(&female_erato));
    assert_eq!(query.to_string(), "Species~erato & Sex=M");
}

#[test]
fn empty_query_matches_everything() {
    let query = RecordQuery::all();
    assert!(query.matches(&record(json!({}))));
    assert_eq!(query.to_string(), "*");
}

#[test]
fn exact_match_is_case_sensitive_and_absent_is_empty() {
    let rec = record(json!({"Sex": "M", "Notes": null, "Row": 7}));

    assert!(!FieldFilter::exact("Sex", "m").matches(&rec));
    assert!(FieldFilter::exact("Notes", "").matches(&rec));
    assert!(FieldFilter::exact("Row", "7").matches(&rec));
}

#[test]
fn predicate_drives_the_controller() {
    use crate::{GalleryController, GalleryOptionsStore};
    use shared::Records;
    use tokio::sync::watch;

    let rows: Vec<Record> = serde_json::from_value(json!([
        {"CAM_ID": "1", "Sex": "M", "URLd": "a"},
        {"CAM_ID": "2", "Sex": "F", "URLd": "b"},
        {"CAM_ID": "3", "Sex": "M", "URLd": "c"}
    ]))
    .unwrap();
    let store = GalleryOptionsStore::default();
    let (_tx, rx) = watch::channel(Records::from(rows));
    let mut gallery = GalleryController::new(rx, &store);

    let query = RecordQuery::all().with(FieldFilter::exact("Sex", "M"));
    gallery.apply_predicate(query.into_predicate());

    assert_eq!(gallery.matches().len(), 2);
}
