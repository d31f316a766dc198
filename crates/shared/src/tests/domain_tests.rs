use super::*;
use serde_json::json;

fn record(value: Value) -> Record {
    serde_json::from_value(value).expect("record")
}

#[test]
fn composite_key_falls_back_for_missing_and_empty_columns() {
    let full = record(json!({"Subspecies_Form": "lysimnia", "Sex": "F"}));
    assert_eq!(full.subspecies_sex_key(), "lysimnia|F");

    let blank = record(json!({"Subspecies_Form": "", "Sex": null}));
    assert_eq!(blank.subspecies_sex_key(), "None|Unknown");
}

#[test]
fn photo_presence_accepts_legacy_fields_or_non_empty_list() {
    assert!(record(json!({"URLd": "https://img/d"})).has_any_photo());
    assert!(record(json!({"URLv": "https://img/v"})).has_any_photo());
    assert!(record(json!({"all_photos": ["https://img/1"]})).has_any_photo());
    assert!(!record(json!({"all_photos": []})).has_any_photo());
    assert!(!record(json!({"URLd": null, "URLv": ""})).has_any_photo());
}

#[test]
fn preservation_date_prefers_formatted_column() {
    let both = record(json!({
        "Preservation_date": "2021-03-05",
        "Preservation_date_formatted": "05/Mar/2021"
    }));
    assert_eq!(both.preservation_date().as_deref(), Some("05/Mar/2021"));

    let raw_only = record(json!({"Preservation_date": "2021-03-05"}));
    assert_eq!(raw_only.preservation_date().as_deref(), Some("2021-03-05"));
}

#[test]
fn photos_are_filtered_by_side() {
    let specimen = record(json!({
        "URLd": "https://img/legacy-d",
        "all_photos": [
            {"Name": "CAM016049v.JPG", "URL_to_view": "https://img/list-v"},
            {"Name": "CAM016049_extra.JPG", "URL_to_view": "https://img/list-x"},
            "https://img/plain"
        ]
    }));

    let dorsal: Vec<_> = specimen
        .photos(Side::Dorsal)
        .into_iter()
        .map(|p| p.url)
        .collect();
    assert_eq!(
        dorsal,
        vec!["https://img/legacy-d", "https://img/list-x", "https://img/plain"]
    );

    let ventral = specimen.photos(Side::Ventral);
    assert_eq!(ventral[0].url, "https://img/list-v");
    assert_eq!(ventral[0].side, Some(PhotoSide::Ventral));
    assert_eq!(specimen.photos(Side::DorsalAndVentral).len(), 4);
}

#[test]
fn non_string_columns_render_as_json_text() {
    let specimen = record(json!({"CAM_ID": 16049, "Sex": "M"}));
    assert_eq!(specimen.cam_id().as_deref(), Some("16049"));
}

#[test]
fn zero_counts_as_a_present_value() {
    let specimen = record(json!({"URLd": 0, "Sex": false, "CAM_ID": 0}));
    assert!(specimen.has_legacy_photo());
    assert_eq!(specimen.cam_id().as_deref(), Some("0"));
    assert_eq!(specimen.sex(), None);
}
