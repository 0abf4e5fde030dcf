//! Shapes of the raw feeds, before normalization.
//!
//! The hierarchy feed is a nested JSON object (department name -> province
//! name -> district name -> metadata). Objects are read into ordered entry
//! lists so that key order and repeated keys survive deserialization.

use crate::domain::model::ExternalEntityId;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Ordered `(name, value)` pairs read from a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntries<V>(pub Vec<(String, V)>);

impl<V> RawEntries<V> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> IntoIterator for RawEntries<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<V> FromIterator<(String, V)> for RawEntries<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for RawEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = RawEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by place name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

pub type RawDistricts = RawEntries<RawDistrict>;
pub type RawProvinces = RawEntries<RawDistricts>;
pub type RawHierarchy = RawEntries<RawProvinces>;

/// District metadata as found in the hierarchy feed.
///
/// Any value that is not an object, or fields of the wrong type, degrade
/// to missing fields instead of failing the whole feed; the builder drops
/// the entry later through the unassigned-code filter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawDistrict {
    pub code: Option<String>,
    pub alternate_code: Option<String>,
    pub external_entity_id: Option<ExternalEntityId>,
}

impl From<Value> for RawDistrict {
    fn from(value: Value) -> Self {
        let Value::Object(fields) = value else {
            return Self::default();
        };
        let pick = |keys: &[&str]| keys.iter().find_map(|key| fields.get(*key));

        Self {
            code: pick(&["code", "ubigeo"]).and_then(code_text),
            alternate_code: pick(&["alternateCode", "inei"]).and_then(code_text),
            external_entity_id: pick(&["externalEntityId", "id"])
                .and_then(ExternalEntityId::from_value),
        }
    }
}

fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One segment of a catalog code; feeds carry them as strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CodePart {
    Number(u64),
    Text(String),
}

impl CodePart {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&str> for CodePart {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A row of an external catalog (one per coding standard).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalogRow {
    #[serde(alias = "departamento")]
    pub department_part: CodePart,
    #[serde(alias = "provincia")]
    pub province_part: CodePart,
    #[serde(alias = "distrito")]
    pub district_part: CodePart,
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_order_and_duplicates() {
        let raw: RawEntries<u32> =
            serde_json::from_str(r#"{"b": 1, "a": 2, "b": 3}"#).unwrap();
        assert_eq!(
            raw.0,
            vec![
                ("b".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_entries_reject_non_objects() {
        let result: Result<RawHierarchy, _> = serde_json::from_str(r#"["Lima"]"#);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("an object keyed by place name"));
    }

    #[test]
    fn test_raw_district_accepts_both_key_styles() {
        let legacy: RawDistrict =
            serde_json::from_str(r#"{"ubigeo": 150122, "inei": "150140", "id": 7}"#).unwrap();
        assert_eq!(legacy.code.as_deref(), Some("150122"));
        assert_eq!(legacy.alternate_code.as_deref(), Some("150140"));
        assert_eq!(
            legacy.external_entity_id,
            Some(ExternalEntityId::Number(7.into()))
        );

        let modern: RawDistrict =
            serde_json::from_str(r#"{"code": "150122", "alternateCode": null}"#).unwrap();
        assert_eq!(modern.code.as_deref(), Some("150122"));
        assert_eq!(modern.alternate_code, None);
    }

    #[test]
    fn test_raw_district_tolerates_garbage() {
        let raw: RawDistrict = serde_json::from_str(r#""not an object""#).unwrap();
        assert_eq!(raw, RawDistrict::default());
    }

    #[test]
    fn test_catalog_row_aliases() {
        let row: RawCatalogRow = serde_json::from_str(
            r#"{"departamento": 15, "provincia": "01", "distrito": "22", "nombre": "MIRAFLORES"}"#,
        )
        .unwrap();
        assert_eq!(row.department_part.as_text(), "15");
        assert_eq!(row.province_part.as_text(), "01");
        assert_eq!(row.name.as_deref(), Some("MIRAFLORES"));
    }
}
