use crate::core::hierarchy::{Hierarchy, HierarchyCounts};
use crate::domain::model::{
    CodingStandard, Department, District, ExternalEntityId, Province, Resolution,
};
use crate::domain::ports::ExportSink;
use crate::utils::error::{Result, UbigeoError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl From<&Department> for EntityRef {
    fn from(department: &Department) -> Self {
        Self {
            id: department.id.clone(),
            name: department.name.clone(),
        }
    }
}

impl From<&Province> for EntityRef {
    fn from(province: &Province) -> Self {
        Self {
            id: province.id.clone(),
            name: province.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceSummary {
    pub id: String,
    pub name: String,
    pub department_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSummary {
    pub id: String,
    pub name: String,
    pub province_id: String,
    pub department_id: String,
    pub alternate_code: Option<String>,
    pub external_entity_id: Option<ExternalEntityId>,
}

impl From<&District> for DistrictSummary {
    fn from(district: &District) -> Self {
        Self {
            id: district.id.clone(),
            name: district.name.clone(),
            province_id: district.province_id.clone(),
            department_id: district.department_id.clone(),
            alternate_code: district.alternate_code.clone(),
            external_entity_id: district.external_entity_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentBundle {
    pub department: EntityRef,
    pub provinces: Vec<ProvinceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceBundle {
    pub department: EntityRef,
    pub province: EntityRef,
    pub districts: Vec<DistrictSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictBundle {
    pub department: EntityRef,
    pub province: EntityRef,
    pub district: DistrictSummary,
}

impl From<&Resolution> for DistrictBundle {
    fn from(resolution: &Resolution) -> Self {
        Self {
            department: EntityRef::from(&resolution.department),
            province: EntityRef::from(&resolution.province),
            district: DistrictSummary::from(&resolution.district),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub generated_at: DateTime<Utc>,
    pub departments: usize,
    pub provinces: usize,
    pub districts: usize,
    pub alternate_codes: usize,
    pub files: usize,
}

/// Produces the static per-entity summaries from the hierarchy accessors.
pub struct StaticExporter<'a> {
    hierarchy: &'a Hierarchy,
}

impl<'a> StaticExporter<'a> {
    pub fn new(hierarchy: &'a Hierarchy) -> Self {
        Self { hierarchy }
    }

    pub fn index(&self) -> Vec<EntityRef> {
        self.hierarchy
            .departments()
            .iter()
            .map(EntityRef::from)
            .collect()
    }

    pub fn department_bundle(&self, department_id: &str) -> Result<DepartmentBundle> {
        let department = self
            .hierarchy
            .department_by_id(department_id)
            .ok_or_else(|| unknown("Department", department_id))?;

        Ok(DepartmentBundle {
            department: EntityRef::from(&department),
            provinces: self
                .hierarchy
                .provinces_by_department(department_id)
                .iter()
                .map(|province| ProvinceSummary {
                    id: province.id.clone(),
                    name: province.name.clone(),
                    department_id: province.department_id.clone(),
                })
                .collect(),
        })
    }

    pub fn province_bundle(&self, province_id: &str) -> Result<ProvinceBundle> {
        let province = self
            .hierarchy
            .province_by_id(province_id)
            .ok_or_else(|| unknown("Province", province_id))?;
        let department = self
            .hierarchy
            .department_by_id(&province.department_id)
            .ok_or_else(|| unknown("Department", &province.department_id))?;

        Ok(ProvinceBundle {
            department: EntityRef::from(&department),
            province: EntityRef::from(&province),
            districts: self
                .hierarchy
                .districts_by_province(province_id)
                .iter()
                .map(DistrictSummary::from)
                .collect(),
        })
    }

    pub fn district_bundle(&self, code: &str) -> Result<DistrictBundle> {
        self.hierarchy
            .lookup_by_primary_code(code)
            .map(|resolution| DistrictBundle::from(&resolution))
            .ok_or_else(|| unknown("District", code))
    }

    /// Every district keyed by its code under `standard`.
    pub fn reverse_lookup(&self, standard: CodingStandard) -> BTreeMap<String, DistrictBundle> {
        let mut lookup = BTreeMap::new();
        for district in self.all_districts() {
            let (code, resolution) = match standard {
                CodingStandard::Reniec => (
                    Some(&district.id),
                    self.hierarchy.lookup_by_primary_code(&district.id),
                ),
                CodingStandard::Inei => match &district.alternate_code {
                    Some(code) => (Some(code), self.hierarchy.lookup_by_alternate_code(code)),
                    None => (None, None),
                },
            };
            if let (Some(code), Some(resolution)) = (code, resolution) {
                lookup.insert(code.clone(), DistrictBundle::from(&resolution));
            }
        }
        lookup
    }

    fn all_districts(&self) -> Vec<District> {
        self.hierarchy
            .departments()
            .iter()
            .flat_map(|department| self.hierarchy.provinces_by_department(&department.id))
            .flat_map(|province| self.hierarchy.districts_by_province(&province.id))
            .collect()
    }

    /// Write every summary to `sink` and return the manifest.
    pub async fn write_all<S: ExportSink + ?Sized>(&self, sink: &S) -> Result<ExportManifest> {
        let mut files = 0usize;

        write_json(sink, "hierarchy.json", &self.index()).await?;
        files += 1;

        // 重複的 id 只輸出一次 (內容取自最後登記者)
        let mut written = HashSet::new();
        for department in self.hierarchy.departments() {
            let path = format!("departments/{}.json", department.id);
            if written.insert(path.clone()) {
                let bundle = self.department_bundle(&department.id)?;
                write_json(sink, &path, &bundle).await?;
                files += 1;
            }

            for province in &department.provinces {
                let path = format!("provinces/{}.json", province.id);
                if written.insert(path.clone()) {
                    let bundle = self.province_bundle(&province.id)?;
                    write_json(sink, &path, &bundle).await?;
                    files += 1;
                }

                for district in &province.districts {
                    let path = format!("districts/{}.json", district.id);
                    if written.insert(path.clone()) {
                        let bundle = self.district_bundle(&district.id)?;
                        write_json(sink, &path, &bundle).await?;
                        files += 1;
                    }
                }
            }
        }

        for standard in CodingStandard::ALL {
            let lookup = self.reverse_lookup(standard);
            write_json(sink, &format!("lookup/{}.json", standard.slug()), &lookup).await?;
            files += 1;
        }

        let HierarchyCounts {
            departments,
            provinces,
            districts,
            alternate_codes,
        } = self.hierarchy.counts();
        let manifest = ExportManifest {
            generated_at: Utc::now(),
            departments,
            provinces,
            districts,
            alternate_codes,
            files: files + 1,
        };
        write_json(sink, "manifest.json", &manifest).await?;

        let location = sink.finish().await?;
        tracing::info!("📦 Exported {} files to {}", manifest.files, location);
        Ok(manifest)
    }
}

fn unknown(kind: &'static str, id: &str) -> UbigeoError {
    UbigeoError::UnknownEntity {
        kind,
        id: id.to_string(),
    }
}

async fn write_json<S, T>(sink: &S, path: &str, payload: &T) -> Result<()>
where
    S: ExportSink + ?Sized,
    T: Serialize + Sync,
{
    let data = serde_json::to_vec_pretty(payload)?;
    tracing::debug!("Writing {} ({} bytes)", path, data.len());
    sink.write_file(path, &data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hierarchy::HierarchyBuilder;
    use crate::domain::raw::RawHierarchy;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockSink {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockSink {
        async fn json(&self, path: &str) -> serde_json::Value {
            let files = self.files.lock().await;
            serde_json::from_slice(&files[path]).unwrap()
        }
    }

    #[async_trait]
    impl ExportSink for MockSink {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn finish(&self) -> Result<String> {
            Ok("memory".to_string())
        }
    }

    fn hierarchy() -> Hierarchy {
        let raw: RawHierarchy = serde_json::from_str(
            r#"{
                "LIMA": {"LIMA": {
                    "MIRAFLORES": {"ubigeo": "150122", "inei": "150140", "id": 1283},
                    "LINCE": {"ubigeo": "150116"}
                }},
                "CUSCO": {"URUBAMBA": {"MACHUPICCHU": {"ubigeo": "080904", "inei": "081304"}}}
            }"#,
        )
        .unwrap();
        HierarchyBuilder::default().build(raw)
    }

    #[test]
    fn test_bundles() {
        let hierarchy = hierarchy();
        let exporter = StaticExporter::new(&hierarchy);

        let index: Vec<String> = exporter.index().into_iter().map(|entry| entry.id).collect();
        assert_eq!(index, vec!["08", "15"]);

        let lima = exporter.department_bundle("15").unwrap();
        assert_eq!(lima.department.name, "Lima");
        assert_eq!(lima.provinces[0].department_id, "15");

        let province = exporter.province_bundle("1501").unwrap();
        let names: Vec<&str> = province.districts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Lince", "Miraflores"]);

        let district = exporter.district_bundle("080904").unwrap();
        assert_eq!(district.department.name, "Cusco");
        assert_eq!(district.province.id, "0809");
        assert_eq!(district.district.alternate_code.as_deref(), Some("081304"));
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let hierarchy = hierarchy();
        let exporter = StaticExporter::new(&hierarchy);
        assert!(matches!(
            exporter.department_bundle("99"),
            Err(UbigeoError::UnknownEntity { kind: "Department", .. })
        ));
        assert!(matches!(
            exporter.province_bundle("9999"),
            Err(UbigeoError::UnknownEntity { kind: "Province", .. })
        ));
        assert!(exporter.district_bundle("999999").is_err());
    }

    #[test]
    fn test_reverse_lookup_by_standard() {
        let hierarchy = hierarchy();
        let exporter = StaticExporter::new(&hierarchy);

        let reniec = exporter.reverse_lookup(CodingStandard::Reniec);
        assert_eq!(reniec.len(), 3);
        assert_eq!(reniec["150116"].district.name, "Lince");

        let inei = exporter.reverse_lookup(CodingStandard::Inei);
        let codes: Vec<&String> = inei.keys().collect();
        assert_eq!(codes, vec!["081304", "150140"]);
        assert_eq!(inei["081304"].district.id, "080904");
    }

    #[tokio::test]
    async fn test_write_all() {
        let hierarchy = hierarchy();
        let sink = MockSink::default();

        let manifest = StaticExporter::new(&hierarchy).write_all(&sink).await.unwrap();

        // hierarchy + 2 departments + 2 provinces + 3 districts + 2 lookups + manifest
        assert_eq!(manifest.files, 11);
        assert_eq!(sink.files.lock().await.len(), 11);
        assert_eq!(manifest.districts, 3);
        assert_eq!(manifest.alternate_codes, 2);

        let district = sink.json("districts/150122.json").await;
        assert_eq!(district["district"]["externalEntityId"], 1283);
        assert_eq!(district["province"]["name"], "Lima");

        let province = sink.json("provinces/1501.json").await;
        assert_eq!(province["districts"][0]["alternateCode"], serde_json::Value::Null);

        let index = sink.json("hierarchy.json").await;
        assert_eq!(index[0]["name"], "Cusco");
    }
}
