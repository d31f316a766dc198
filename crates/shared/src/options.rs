use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{PhotoSide, FIELD_PRESERVATION_DATE};

pub const ROW_NUMBER: &str = "Row Number";

/// Column the gallery is ordered by.
///
/// `Row Number` keeps dataset order, `Preservation_date` compares parsed
/// dates, anything else compares the column as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortField {
    RowNumber,
    PreservationDate,
    Field(String),
}

impl SortField {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RowNumber => ROW_NUMBER,
            Self::PreservationDate => FIELD_PRESERVATION_DATE,
            Self::Field(name) => name,
        }
    }
}

impl Default for SortField {
    fn default() -> Self {
        Self::PreservationDate
    }
}

impl From<String> for SortField {
    fn from(value: String) -> Self {
        match value.as_str() {
            ROW_NUMBER => Self::RowNumber,
            FIELD_PRESERVATION_DATE => Self::PreservationDate,
            _ => Self::Field(value),
        }
    }
}

impl From<&str> for SortField {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<SortField> for String {
    fn from(value: SortField) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for SortField {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    #[serde(rename = "Dorsal and Ventral")]
    DorsalAndVentral,
    Dorsal,
    Ventral,
}

impl Side {
    /// Whether a photo taken from `photo_side` belongs in this view.
    /// Photos of unknown side are always shown.
    pub fn shows(self, photo_side: Option<PhotoSide>) -> bool {
        match (self, photo_side) {
            (Self::DorsalAndVentral, _) | (_, None) => true,
            (Self::Dorsal, Some(side)) => side == PhotoSide::Dorsal,
            (Self::Ventral, Some(side)) => side == PhotoSide::Ventral,
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dorsal and ventral" | "both" => Ok(Self::DorsalAndVentral),
            "dorsal" => Ok(Self::Dorsal),
            "ventral" => Ok(Self::Ventral),
            other => Err(format!("unknown side '{other}'")),
        }
    }
}

/// Grid column count; `Auto` lets the view pick based on width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnLayout {
    #[default]
    Auto,
    Fixed(u8),
}

impl TryFrom<String> for ColumnLayout {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        match trimmed.parse::<u8>() {
            Ok(count) if count > 0 => Ok(Self::Fixed(count)),
            _ => Err(format!("unknown column layout '{value}'")),
        }
    }
}

impl From<ColumnLayout> for String {
    fn from(value: ColumnLayout) -> Self {
        match value {
            ColumnLayout::Auto => "Auto".to_string(),
            ColumnLayout::Fixed(count) => count.to_string(),
        }
    }
}

/// Cross-view gallery settings shared by every tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryOptions {
    #[serde(default)]
    pub columns: ColumnLayout,
    #[serde(default)]
    pub sort_field: SortField,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub side: Side,
    #[serde(default = "default_only_photos")]
    pub only_photos: bool,
    #[serde(default)]
    pub one_per_subspecies: bool,
}

fn default_only_photos() -> bool {
    true
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            columns: ColumnLayout::Auto,
            sort_field: SortField::PreservationDate,
            sort_direction: SortDirection::Desc,
            side: Side::DorsalAndVentral,
            only_photos: true,
            one_per_subspecies: false,
        }
    }
}

impl GalleryOptions {
    /// The subset of options that changes which records are shown and in
    /// which order.
    pub fn pipeline(&self) -> PipelineOptions {
        PipelineOptions {
            sort_field: self.sort_field.clone(),
            sort_direction: self.sort_direction,
            only_photos: self.only_photos,
            one_per_subspecies: self.one_per_subspecies,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineOptions {
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub only_photos: bool,
    pub one_per_subspecies: bool,
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
