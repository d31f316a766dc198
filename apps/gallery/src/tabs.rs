use gallery_core::{FieldFilter, QueryParseError, RecordQuery};
use shared::DatasetKey;

/// A gallery tab and the dataset it shows. Every record of the dataset is in
/// scope until the caller narrows it with clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub name: &'static str,
    pub location: &'static str,
}

pub const TABS: &[Tab] = &[
    Tab {
        name: "collection",
        location: "collection.json",
    },
    Tab {
        name: "insectary",
        location: "insectary.json",
    },
    Tab {
        name: "crispr",
        location: "crispr.json",
    },
];

pub fn find(name: &str) -> Option<&'static Tab> {
    TABS.iter().find(|tab| tab.name.eq_ignore_ascii_case(name.trim()))
}

pub fn names() -> Vec<&'static str> {
    TABS.iter().map(|tab| tab.name).collect()
}

impl Tab {
    pub fn key(&self) -> DatasetKey {
        DatasetKey::from(self.name)
    }

    pub fn query(&self, clauses: &[String]) -> Result<RecordQuery, QueryParseError> {
        let mut query = RecordQuery::all();
        query.extend(
            clauses
                .iter()
                .map(|clause| clause.parse::<FieldFilter>())
                .collect::<Result<Vec<_>, _>>()?,
        );
        Ok(query)
    }
}
