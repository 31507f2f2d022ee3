//! Row layouts.
//!
//! Two layouts exist in the field: the older eight-column sheet and a
//! nine-column sheet that adds a free-text "Other" column after the
//! registration type. Everything that depends on the layout (accepted
//! types, validated fields, header labels, cell order) is derived from
//! [`SchemaVariant`].

use serde::Deserialize;

/// Which row layout the target sheet uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Date, Time, Name, Grade, Type, Quantity, Remark, Status.
    #[default]
    WithoutOther,
    /// Date, Time, Name, Grade, Type, Other, Quantity, Remark, Status.
    WithOther,
}

const HEADERS_WITHOUT_OTHER: [&str; 8] = [
    "Date",
    "Time",
    "Name Abbreviation",
    "Class",
    "Registration Type",
    "Quantity",
    "Remarks",
    "Status",
];

const HEADERS_WITH_OTHER: [&str; 9] = [
    "Date",
    "Time",
    "Name Abbreviation",
    "Class",
    "Registration Type",
    "Other",
    "Quantity",
    "Remarks",
    "Status",
];

const TYPES_WITHOUT_OTHER: [&str; 4] = ["借用", "歸還", "borrow", "return"];

const TYPES_WITH_OTHER: [&str; 6] = ["借用", "歸還", "其他", "borrow", "return", "other"];

impl SchemaVariant {
    pub fn has_other(self) -> bool {
        matches!(self, SchemaVariant::WithOther)
    }

    /// Header labels, one per column.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            SchemaVariant::WithoutOther => &HEADERS_WITHOUT_OTHER,
            SchemaVariant::WithOther => &HEADERS_WITH_OTHER,
        }
    }

    pub fn column_count(self) -> usize {
        self.headers().len()
    }

    /// Registration types accepted when no explicit list is configured.
    pub fn default_types(self) -> &'static [&'static str] {
        match self {
            SchemaVariant::WithoutOther => &TYPES_WITHOUT_OTHER,
            SchemaVariant::WithOther => &TYPES_WITH_OTHER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_counts() {
        assert_eq!(SchemaVariant::WithoutOther.column_count(), 8);
        assert_eq!(SchemaVariant::WithOther.column_count(), 9);
    }

    #[test]
    fn test_other_column_position() {
        let headers = SchemaVariant::WithOther.headers();
        assert_eq!(headers[4], "Registration Type");
        assert_eq!(headers[5], "Other");
        assert_eq!(headers[8], "Status");
    }

    #[test]
    fn test_other_type_only_in_with_other() {
        assert!(!SchemaVariant::WithoutOther.default_types().contains(&"other"));
        assert!(SchemaVariant::WithOther.default_types().contains(&"other"));
        assert!(SchemaVariant::WithOther.default_types().contains(&"其他"));
    }

    #[test]
    fn test_deserialize_from_config_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            schema: SchemaVariant,
        }
        let w: Wrapper = serde_json::from_str(r#"{"schema":"with_other"}"#).unwrap();
        assert_eq!(w.schema, SchemaVariant::WithOther);
    }
}
