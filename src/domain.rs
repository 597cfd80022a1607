use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// `sp|Q9XYZ1|NAME` and `tr|Q9XYZ1|NAME` share the key `Q9XYZ1`; anything
/// without at least two `|`-separated fields is its own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for CanonicalKey {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        let mut parts = trimmed.split('|');
        let first = parts.next();
        match (first, parts.next()) {
            (Some(_), Some(core)) => Self(core.trim().to_string()),
            _ => Self(trimmed.to_string()),
        }
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn canonical_key(accession: Option<&str>) -> String {
    match accession {
        Some(value) => CanonicalKey::from(value).into_string(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    FanOut,
    Collapse,
}

impl Cardinality {
    pub fn from_one_row_per_query(one_row_per_query: bool) -> Self {
        if one_row_per_query {
            Cardinality::Collapse
        } else {
            Cardinality::FanOut
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::FanOut => write!(f, "fanout"),
            Cardinality::Collapse => write!(f, "collapse"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationSource {
    Go,
    Kegg,
    Kog,
    Pfam,
}

impl AnnotationSource {
    pub const ALL: [AnnotationSource; 4] = [
        AnnotationSource::Go,
        AnnotationSource::Kegg,
        AnnotationSource::Kog,
        AnnotationSource::Pfam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationSource::Go => "go",
            AnnotationSource::Kegg => "kegg",
            AnnotationSource::Kog => "kog",
            AnnotationSource::Pfam => "pfam",
        }
    }
}

impl fmt::Display for AnnotationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
