use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of the district in the upstream registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalEntityId {
    Number(serde_json::Number),
    Text(String),
}

impl ExternalEntityId {
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    /// Full six digit code under the primary standard.
    pub id: String,
    pub name: String,
    pub province_id: String,
    pub department_id: String,
    pub alternate_code: Option<String>,
    pub external_entity_id: Option<ExternalEntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub id: String,
    pub name: String,
    pub department_id: String,
    pub districts: Vec<District>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub provinces: Vec<Province>,
}

/// A district together with the province and department that own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub department: Department,
    pub province: Province,
    pub district: District,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub code: String,
    pub department_id: String,
    pub province_id: String,
    pub district_id: String,
    pub name: Option<String>,
}

/// National coding standards a district code can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CodingStandard {
    /// Primary standard; district ids are expressed in it.
    Reniec,
    /// Alternate standard, reconciled through `District::alternate_code`.
    Inei,
}

impl CodingStandard {
    pub const ALL: [CodingStandard; 2] = [CodingStandard::Reniec, CodingStandard::Inei];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Reniec => "RENIEC",
            Self::Inei => "INEI",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Reniec => "reniec",
            Self::Inei => "inei",
        }
    }
}

impl fmt::Display for CodingStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_serializes_camel_case_with_nulls() {
        let district = District {
            id: "150122".to_string(),
            name: "Miraflores".to_string(),
            province_id: "1501".to_string(),
            department_id: "15".to_string(),
            alternate_code: None,
            external_entity_id: Some(ExternalEntityId::Number(1283.into())),
        };

        let json = serde_json::to_value(&district).unwrap();
        assert_eq!(json["provinceId"], "1501");
        assert_eq!(json["alternateCode"], serde_json::Value::Null);
        assert_eq!(json["externalEntityId"], 1283);
    }

    #[test]
    fn test_external_entity_id_from_value() {
        assert_eq!(
            ExternalEntityId::from_value(&serde_json::json!("A-17")),
            Some(ExternalEntityId::Text("A-17".to_string()))
        );
        assert_eq!(ExternalEntityId::from_value(&serde_json::Value::Null), None);
    }
}
