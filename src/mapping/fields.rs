//! # Target Fields Module
//!
//! The line-item fields a spreadsheet column can map onto, and the keyword
//! table that powers mapping suggestions. The built-in keywords cover the
//! headings that show up in construction bills of quantities; callers can
//! load a replacement table from JSON when a tender uses unusual wording.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while loading a custom field table.
#[derive(Error, Debug)]
pub enum FieldTableError {
    /// Table with no entry for a required field
    #[error("Field table is missing an entry for '{0}'")]
    MissingField(TargetField),

    /// Field entry whose keyword list is empty
    #[error("Field '{0}' has no keywords")]
    EmptyKeywords(TargetField),
}

/// A line-item field that a spreadsheet column can be mapped to.
///
/// Declaration order doubles as suggestion priority: when a header cell
/// matches several fields, the earliest unmapped one wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    Description,
    Unit,
    Quantity,
    SupplyRate,
    InstallationRate,
}

impl TargetField {
    /// All fields, in suggestion-priority order.
    pub const ALL: [TargetField; 5] = [
        TargetField::Description,
        TargetField::Unit,
        TargetField::Quantity,
        TargetField::SupplyRate,
        TargetField::InstallationRate,
    ];

    /// Returns the field's wire name, as the import backend expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Unit => "unit",
            Self::Quantity => "quantity",
            Self::SupplyRate => "supply_rate",
            Self::InstallationRate => "installation_rate",
        }
    }

    /// Returns a human-readable label for prompts and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Unit => "Unit",
            Self::Quantity => "Quantity",
            Self::SupplyRate => "Supply Rate",
            Self::InstallationRate => "Installation Rate",
        }
    }

    /// Built-in keywords whose presence in a header cell suggests this field.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Description => &["description", "desc", "particular", "item"],
            Self::Unit => &["unit", "uom"],
            Self::Quantity => &["quantity", "qty"],
            Self::SupplyRate => &["supply", "material"],
            Self::InstallationRate => &["install", "erection", "labour", "fixing"],
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

/// One field's keyword list inside a [`FieldTable`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: TargetField,
    pub keywords: Vec<String>,
}

/// Ordered keyword table driving header-to-field suggestions.
///
/// Matching is case-insensitive substring containment against the header
/// text, so "Qty." and "Supply Rate (INR)" hit without exact spelling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct FieldTable {
    specs: Vec<FieldSpec>,
}

impl FieldTable {
    /// Suggests the first field, in priority order, that is still unclaimed
    /// and has a keyword contained in `text`.
    pub fn suggest<F>(&self, text: &str, taken: F) -> Option<TargetField>
    where
        F: Fn(TargetField) -> bool,
    {
        let text = text.to_lowercase();
        self.specs
            .iter()
            .filter(|spec| !taken(spec.field))
            .find(|spec| spec.keywords.iter().any(|keyword| text.contains(keyword)))
            .map(|spec| spec.field)
    }

    /// True when `text` contains a keyword for any field at all.
    pub(crate) fn matches_any(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.specs
            .iter()
            .any(|spec| spec.keywords.iter().any(|keyword| text.contains(keyword)))
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        let specs = TargetField::ALL
            .iter()
            .map(|field| FieldSpec {
                field: *field,
                keywords: field.keywords().iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        Self { specs }
    }
}

impl TryFrom<Vec<FieldSpec>> for FieldTable {
    type Error = FieldTableError;

    /// Validates a custom table: every field present, no empty keyword lists,
    /// keywords normalized to lowercase. Entry order sets suggestion priority.
    fn try_from(mut specs: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        for field in TargetField::ALL {
            if !specs.iter().any(|spec| spec.field == field) {
                return Err(FieldTableError::MissingField(field));
            }
        }
        for spec in &mut specs {
            spec.keywords.retain(|keyword| !keyword.trim().is_empty());
            if spec.keywords.is_empty() {
                return Err(FieldTableError::EmptyKeywords(spec.field));
            }
            for keyword in &mut spec.keywords {
                *keyword = keyword.trim().to_lowercase();
            }
        }
        Ok(Self { specs })
    }
}

impl From<FieldTable> for Vec<FieldSpec> {
    fn from(table: FieldTable) -> Self {
        table.specs
    }
}
