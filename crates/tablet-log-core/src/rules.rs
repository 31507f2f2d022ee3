//! Immutable intake rules, built once at startup and shared by the
//! validator, normalizer, and handler.

use chrono::FixedOffset;
use serde::Deserialize;

use crate::clock::default_timezone;
use crate::models::Field;
use crate::sanitize::MAX_TEXT_LENGTH;
use crate::schema::SchemaVariant;

/// Smallest accepted quantity.
pub const QTY_MIN: i64 = 1;
/// Largest accepted quantity.
pub const QTY_MAX: i64 = 100;

/// Fields that must be present and non-blank unless configured otherwise.
pub const DEFAULT_REQUIRED_FIELDS: [Field; 4] = [Field::Name, Field::Grade, Field::Type, Field::Qty];

/// How the `qty` parameter is turned into an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuantityParse {
    /// Leading-integer parse: surrounding junk after the digits is ignored,
    /// so `"12abc"` reads as 12.
    #[default]
    Prefix,
    /// The whole trimmed value must be an integer.
    Strict,
}

#[derive(Debug, Clone)]
pub struct IntakeRules {
    pub schema: SchemaVariant,
    pub max_text_length: usize,
    pub required_fields: Vec<Field>,
    pub valid_types: Vec<String>,
    pub quantity_parse: QuantityParse,
    pub timezone: FixedOffset,
}

impl IntakeRules {
    /// Defaults for a schema: 1000-character text limit, the four standard
    /// required fields, the schema's registration types, prefix quantity
    /// parsing, GMT+8.
    pub fn for_schema(schema: SchemaVariant) -> Self {
        Self {
            schema,
            max_text_length: MAX_TEXT_LENGTH,
            required_fields: DEFAULT_REQUIRED_FIELDS.to_vec(),
            valid_types: schema
                .default_types()
                .iter()
                .map(|t| t.to_string())
                .collect(),
            quantity_parse: QuantityParse::default(),
            timezone: default_timezone(),
        }
    }

    pub fn is_valid_type(&self, kind: &str) -> bool {
        self.valid_types.iter().any(|t| t == kind)
    }

    /// Free-text fields subject to the length limit, in check order.
    pub fn text_fields(&self) -> &'static [Field] {
        if self.schema.has_other() {
            &[Field::Remark, Field::Other]
        } else {
            &[Field::Remark]
        }
    }
}

impl Default for IntakeRules {
    fn default() -> Self {
        Self::for_schema(SchemaVariant::default())
    }
}
