//! Helpers for OData instance annotations on returned records
//!
//! Pages are requested with `odata.include-annotations` for formatted values,
//! so option sets, lookups, money and dates arrive with a display string next
//! to the raw value, e.g. `statecode` and
//! `statecode@OData.Community.Display.V1.FormattedValue`.

use super::constants::odata::FORMATTED_VALUE;
use serde_json::{Map, Value};

/// Annotation key carrying the formatted value of `field`
pub fn formatted_key(field: &str) -> String {
    format!("{}@{}", field, FORMATTED_VALUE)
}

/// Formatted display value of `field`, if the server sent one
pub fn formatted_value<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(formatted_key(field))?.as_str()
}

pub fn is_annotation(key: &str) -> bool {
    key.contains('@')
}

/// Project a record onto display values.
///
/// Fields with a formatted-value annotation take that string; other fields
/// keep their raw value. Annotation keys are dropped. Non-object values are
/// returned unchanged.
pub fn with_formatted_values(record: &Value) -> Value {
    let Value::Object(fields) = record else {
        return record.clone();
    };

    let projected: Map<String, Value> = fields
        .iter()
        .filter(|(key, _)| !is_annotation(key))
        .map(|(key, raw)| {
            let value = match formatted_value(record, key) {
                Some(formatted) => Value::String(formatted.to_string()),
                None => raw.clone(),
            };
            (key.clone(), value)
        })
        .collect();

    Value::Object(projected)
}
