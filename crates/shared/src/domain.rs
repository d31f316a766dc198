use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::Side;

pub const FIELD_SUBSPECIES_FORM: &str = "Subspecies_Form";
pub const FIELD_SEX: &str = "Sex";
pub const FIELD_PRESERVATION_DATE: &str = "Preservation_date";
pub const FIELD_PRESERVATION_DATE_FORMATTED: &str = "Preservation_date_formatted";
pub const FIELD_URL_DORSAL: &str = "URLd";
pub const FIELD_URL_VENTRAL: &str = "URLv";
pub const FIELD_ALL_PHOTOS: &str = "all_photos";
pub const FIELD_CAM_ID: &str = "CAM_ID";

/// Immutable, shareable snapshot of a dataset's records.
pub type Records = Arc<[Record]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetKey(pub String);

impl DatasetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One catalogued specimen.
///
/// Records are JSON objects with a handful of well-known columns and any
/// number of display-only columns. The object is shared behind an `Arc`, so
/// cloning a record (as the pipeline does when it builds match lists) never
/// copies field data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Arc<Map<String, Value>>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(Arc::new(fields))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Raw JSON value of a column, `None` when the column is absent.
    ///
    /// A column counts as absent when it is missing, `null`, `false` or the
    /// empty string. Numbers, including `0`, always count as present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| is_present(value))
    }

    /// Column rendered as text; strings are returned verbatim, other scalars
    /// use their JSON representation.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(value_text)
    }

    pub fn subspecies_form(&self) -> Option<String> {
        self.text(FIELD_SUBSPECIES_FORM)
    }

    pub fn sex(&self) -> Option<String> {
        self.text(FIELD_SEX)
    }

    pub fn cam_id(&self) -> Option<String> {
        self.text(FIELD_CAM_ID)
    }

    /// `Subspecies_Form|Sex` key used to keep one specimen per form and sex.
    pub fn subspecies_sex_key(&self) -> String {
        format!(
            "{}|{}",
            self.subspecies_form().as_deref().unwrap_or("None"),
            self.sex().as_deref().unwrap_or("Unknown")
        )
    }

    /// Preferred date text: the normalized column, then the raw one.
    pub fn preservation_date(&self) -> Option<String> {
        self.text(FIELD_PRESERVATION_DATE_FORMATTED)
            .or_else(|| self.text(FIELD_PRESERVATION_DATE))
    }

    pub fn has_legacy_photo(&self) -> bool {
        self.get(FIELD_URL_DORSAL).is_some() || self.get(FIELD_URL_VENTRAL).is_some()
    }

    pub fn photo_list(&self) -> &[Value] {
        match self.0.get(FIELD_ALL_PHOTOS) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    pub fn has_any_photo(&self) -> bool {
        self.has_legacy_photo() || !self.photo_list().is_empty()
    }

    /// Photos to display for the requested side.
    ///
    /// Legacy `URLd`/`URLv` columns come first, followed by `all_photos`
    /// entries. List entries whose file name does not reveal a side are shown
    /// for every side.
    pub fn photos(&self, side: Side) -> Vec<PhotoRef> {
        let mut photos = Vec::new();
        if let Some(url) = self.text(FIELD_URL_DORSAL) {
            photos.push(PhotoRef {
                url,
                name: None,
                side: Some(PhotoSide::Dorsal),
            });
        }
        if let Some(url) = self.text(FIELD_URL_VENTRAL) {
            photos.push(PhotoRef {
                url,
                name: None,
                side: Some(PhotoSide::Ventral),
            });
        }
        photos.extend(self.photo_list().iter().filter_map(PhotoRef::from_list_entry));
        photos.retain(|photo| side.shows(photo.side));
        photos
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSide {
    Dorsal,
    Ventral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<PhotoSide>,
}

impl PhotoRef {
    fn from_list_entry(entry: &Value) -> Option<Self> {
        match entry {
            Value::String(url) if !url.is_empty() => Some(Self {
                url: url.clone(),
                name: None,
                side: None,
            }),
            Value::Object(fields) => {
                let url = ["URL_to_view", "URL", "url"]
                    .iter()
                    .filter_map(|key| fields.get(*key))
                    .find(|value| is_present(value))
                    .map(value_text)?;
                let name = fields.get("Name").filter(|v| is_present(v)).map(value_text);
                let side = name.as_deref().and_then(side_from_file_name);
                Some(Self { url, name, side })
            }
            _ => None,
        }
    }
}

fn side_from_file_name(name: &str) -> Option<PhotoSide> {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with("d.jpg") {
        Some(PhotoSide::Dorsal)
    } else if lower.ends_with("v.jpg") {
        Some(PhotoSide::Ventral)
    } else {
        None
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
