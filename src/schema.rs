use serde::Serialize;
use std::collections::BTreeMap;

/// Field types understood by the indexing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Date,
    Keyword,
    Text,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Date => "date",
            FieldType::Keyword => "keyword",
            FieldType::Text => "text",
        }
    }
}

/// Schema of the fixed fields every log document carries.
///
/// The error fields are part of the schema even though they are only
/// populated for records with an attached error.
pub fn logging_fields() -> BTreeMap<String, FieldType> {
    BTreeMap::from([
        ("date".to_string(), FieldType::Date),
        ("level".to_string(), FieldType::Keyword),
        ("logger".to_string(), FieldType::Keyword),
        ("origin".to_string(), FieldType::Keyword),
        ("title".to_string(), FieldType::Text),
        ("error_type".to_string(), FieldType::Keyword),
        ("error_message".to_string(), FieldType::Text),
        ("error_trace".to_string(), FieldType::Text),
    ])
}

/// Fixed fields extended with the given extra field names, all typed
/// keyword.
pub fn merged_fields<I, S>(extra_fields: I) -> BTreeMap<String, FieldType>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut fields = logging_fields();
    for name in extra_fields {
        fields.insert(name.into(), FieldType::Keyword);
    }
    fields
}
