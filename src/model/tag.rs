//! A single row from the Organizadores sheet: a tag definition.

use crate::model::{cell_text, cell_u64, RawRow};
use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The teal used for any tag without a color of its own.
pub const DEFAULT_TAG_COLOR: &str = "#4bc0c0";

/// A canonical tag definition.
///
/// The color is kept exactly as stored, possibly blank; the default applies
/// when views are derived, so a blank cell on the sheet stays blank.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Tag {
    name: String,
    color: String,
    /// Free-form declared kind, e.g. which selector group the tag belongs
    /// to. The aggregation core never reads it.
    kind: String,
    other_fields: BTreeMap<String, String>,
    row_number: Option<u64>,
}

impl Tag {
    pub fn new(name: String, color: String, kind: String) -> Self {
        Self {
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            kind: kind.trim().to_string(),
            other_fields: BTreeMap::new(),
            row_number: None,
        }
    }

    /// Maps a raw proxy row onto the canonical record. Total: every row
    /// produces a `Tag`, however dirty.
    pub fn from_raw(raw: &RawRow) -> Self {
        let mut name = String::new();
        let mut color = String::new();
        let mut kind = String::new();
        let mut other_fields = BTreeMap::new();
        let mut row_number = None;

        for (header, value) in raw {
            match TagColumn::from_header(header) {
                Ok(TagColumn::Name) => name = cell_text(value),
                Ok(TagColumn::Color) => color = cell_text(value),
                Ok(TagColumn::Kind) => kind = cell_text(value),
                Ok(TagColumn::RowNumber) => row_number = cell_u64(value),
                Err(_) => {
                    let _ = other_fields.insert(header.clone(), cell_text(value));
                }
            }
        }

        Self {
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            kind: kind.trim().to_string(),
            other_fields,
            row_number,
        }
    }

    /// The full-row wire form for an add operation.
    pub fn to_raw(&self) -> RawRow {
        let mut raw = RawRow::new();
        raw.insert(NAME_STR.to_string(), Value::String(self.name.clone()));
        raw.insert(COLOR_STR.to_string(), Value::String(self.color.clone()));
        raw.insert(KIND_STR.to_string(), Value::String(self.kind.clone()));
        for (header, value) in &self.other_fields {
            raw.insert(header.clone(), Value::String(value.clone()));
        }
        raw
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// The stored color, or the default teal when blank.
    pub fn color_or_default(&self) -> &str {
        if self.color.is_empty() {
            DEFAULT_TAG_COLOR
        } else {
            &self.color
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn row_number(&self) -> Option<u64> {
        self.row_number
    }
}

/// The known columns of the Organizadores sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TagColumn {
    #[serde(rename = "Tag")]
    Name,
    #[serde(rename = "Cor")]
    Color,
    #[serde(rename = "Tipo")]
    Kind,
    #[serde(rename = "ROW_NUMBER")]
    RowNumber,
}

serde_plain::derive_display_from_serialize!(TagColumn);
serde_plain::derive_fromstr_from_deserialize!(TagColumn);

impl TagColumn {
    pub fn from_header(header: impl AsRef<str>) -> Result<TagColumn> {
        let header_str = header.as_ref();
        match header_str {
            NAME_STR => Ok(TagColumn::Name),
            COLOR_STR => Ok(TagColumn::Color),
            KIND_STR => Ok(TagColumn::Kind),
            ROW_NUMBER_STR => Ok(TagColumn::RowNumber),
            bad => bail!("Invalid organizador column name '{bad}'"),
        }
    }

    pub fn as_header_str(&self) -> &'static str {
        match self {
            TagColumn::Name => NAME_STR,
            TagColumn::Color => COLOR_STR,
            TagColumn::Kind => KIND_STR,
            TagColumn::RowNumber => ROW_NUMBER_STR,
        }
    }
}

pub(super) const NAME_STR: &str = "Tag";
pub(super) const COLOR_STR: &str = "Cor";
pub(super) const KIND_STR: &str = "Tipo";
pub(super) const ROW_NUMBER_STR: &str = "ROW_NUMBER";
