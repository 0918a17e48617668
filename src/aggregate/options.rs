//! Selection vocabulary derived from the tag definitions.

use crate::model::Tag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The vocabulary a selector needs: which tag names exist, which declared
/// kinds exist, and what color each tag renders in.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Options {
    /// Distinct non-blank tag names, in the order the sheet first declares
    /// them.
    tag_names: Vec<String>,
    /// Distinct non-blank declared kinds, in first-seen order.
    kinds: Vec<String>,
    /// Tag name -> render color, the default teal filled in for blanks.
    /// When a name is declared twice, the later row's color wins.
    tag_colors: BTreeMap<String, String>,
}

impl Options {
    pub fn tag_names(&self) -> &[String] {
        &self.tag_names
    }

    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    pub fn tag_colors(&self) -> &BTreeMap<String, String> {
        &self.tag_colors
    }

    /// The render color for one tag name, falling back to the default teal
    /// for names that were never declared.
    pub fn color_of(&self, name: &str) -> &str {
        self.tag_colors
            .get(name)
            .map(String::as_str)
            .unwrap_or(crate::model::DEFAULT_TAG_COLOR)
    }
}

/// Derives [`Options`] from the tag definitions. Total over any input,
/// including none at all.
pub fn derive_options<'a, I>(tags: I) -> Options
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut options = Options::default();
    for tag in tags {
        let name = tag.name();
        if !name.is_empty() {
            if !options.tag_names.iter().any(|n| n == name) {
                options.tag_names.push(name.to_string());
            }
            options
                .tag_colors
                .insert(name.to_string(), tag.color_or_default().to_string());
        }
        let kind = tag.kind();
        if !kind.is_empty() && !options.kinds.iter().any(|k| k == kind) {
            options.kinds.push(kind.to_string());
        }
    }
    options
}
