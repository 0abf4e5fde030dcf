use crate::core::collation::{BaseCollator, Collator};
use crate::core::normalize::{is_unassigned, normalize_code, normalize_name, normalize_optional_code};
use crate::domain::model::{Department, District, Province, Resolution};
use crate::domain::raw::{RawDistrict, RawDistricts, RawHierarchy, RawProvinces};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProvinceSlot {
    department: usize,
    province: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DistrictSlot {
    department: usize,
    province: usize,
    district: usize,
}

/// Registration order of a node and of its children, carried through the
/// sorts so the lookup maps can honour "last registered wins".
#[derive(Debug)]
struct SeqTree {
    seq: usize,
    children: Vec<SeqTree>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub unassigned_districts: usize,
    pub mismatched_districts: usize,
    pub mismatched_provinces: usize,
    pub empty_provinces: usize,
    pub empty_departments: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyCounts {
    pub departments: usize,
    pub provinces: usize,
    pub districts: usize,
    pub alternate_codes: usize,
}

/// Turns the raw nested feed into the canonical, sorted three level tree.
pub struct HierarchyBuilder<C: Collator = BaseCollator> {
    collator: C,
}

impl Default for HierarchyBuilder<BaseCollator> {
    fn default() -> Self {
        Self::new(BaseCollator::default())
    }
}

impl<C: Collator> HierarchyBuilder<C> {
    pub fn new(collator: C) -> Self {
        Self { collator }
    }

    pub fn build(&self, raw: RawHierarchy) -> Hierarchy {
        let mut run = BuildRun::default();
        let mut departments: Vec<(SeqTree, Department)> = Vec::new();

        for (department_name, provinces) in raw {
            if let Some(department) = self.build_department(&mut run, &department_name, provinces) {
                departments.push(department);
            }
        }

        departments.sort_by(|(_, a), (_, b)| self.collator.compare(&a.name, &b.name));
        let (seqs, departments): (Vec<SeqTree>, Vec<Department>) = departments.into_iter().unzip();

        let hierarchy = Hierarchy::index(departments, &seqs, run.stats);
        let counts = hierarchy.counts();
        tracing::info!(
            "Built hierarchy: {} departments, {} provinces, {} districts ({} with alternate code)",
            counts.departments,
            counts.provinces,
            counts.districts,
            counts.alternate_codes
        );
        if run.stats != BuildStats::default() {
            tracing::warn!("Repaired source entries: {:?}", run.stats);
        }
        hierarchy
    }

    fn build_department(
        &self,
        run: &mut BuildRun,
        raw_name: &str,
        raw_provinces: RawProvinces,
    ) -> Option<(SeqTree, Department)> {
        let name = normalize_name(raw_name);
        let mut provinces: Vec<(SeqTree, Province)> = raw_provinces
            .into_iter()
            .filter_map(|(province_name, districts)| {
                self.build_province(run, &province_name, districts)
            })
            .collect();

        if provinces.is_empty() {
            tracing::debug!("Department '{}' has no provinces left, skipped", name);
            run.stats.empty_departments += 1;
            return None;
        }

        provinces.sort_by(|(_, a), (_, b)| self.collator.compare(&a.name, &b.name));
        let id = provinces[0].1.department_id.clone();
        provinces.retain(|(_, province)| {
            let agrees = province.department_id == id;
            if !agrees {
                tracing::warn!(
                    "Province {} ({}) does not belong to department {} ({}), dropped",
                    province.id,
                    province.name,
                    id,
                    name
                );
                run.stats.mismatched_provinces += 1;
            }
            agrees
        });

        let (children, provinces): (Vec<SeqTree>, Vec<Province>) = provinces.into_iter().unzip();
        let seq = run.next_seq();
        Some((
            SeqTree { seq, children },
            Department {
                id,
                name,
                provinces,
            },
        ))
    }

    fn build_province(
        &self,
        run: &mut BuildRun,
        raw_name: &str,
        raw_districts: RawDistricts,
    ) -> Option<(SeqTree, Province)> {
        let name = normalize_name(raw_name);
        let mut districts: Vec<(SeqTree, District)> = Vec::with_capacity(raw_districts.len());
        for (district_name, metadata) in raw_districts {
            match build_district(&district_name, metadata) {
                Some(district) => districts.push((run.leaf(), district)),
                None => {
                    tracing::debug!("District '{}' in '{}' has no code, skipped", district_name, name);
                    run.stats.unassigned_districts += 1;
                }
            }
        }

        if districts.is_empty() {
            run.stats.empty_provinces += 1;
            return None;
        }

        districts.sort_by(|(_, a), (_, b)| self.collator.compare(&a.name, &b.name));
        let first = &districts[0].1;
        let (id, department_id) = (first.province_id.clone(), first.department_id.clone());
        districts.retain(|(_, district)| {
            let agrees = district.province_id == id;
            if !agrees {
                tracing::warn!(
                    "District {} ({}) does not belong to province {} ({}), dropped",
                    district.id,
                    district.name,
                    id,
                    name
                );
                run.stats.mismatched_districts += 1;
            }
            agrees
        });

        let (children, districts): (Vec<SeqTree>, Vec<District>) = districts.into_iter().unzip();
        let seq = run.next_seq();
        Some((
            SeqTree { seq, children },
            Province {
                id,
                name,
                department_id,
                districts,
            },
        ))
    }
}

fn build_district(raw_name: &str, metadata: RawDistrict) -> Option<District> {
    let id = normalize_code(metadata.code.as_deref().unwrap_or_default());
    // 000000 表示尚未指派代碼
    if is_unassigned(&id) {
        return None;
    }

    Some(District {
        name: normalize_name(raw_name),
        department_id: id.chars().take(2).collect(),
        province_id: id.chars().take(4).collect(),
        alternate_code: normalize_optional_code(metadata.alternate_code.as_deref()),
        external_entity_id: metadata.external_entity_id,
        id,
    })
}

#[derive(Default)]
struct BuildRun {
    seq: usize,
    stats: BuildStats,
}

impl BuildRun {
    fn next_seq(&mut self) -> usize {
        self.seq += 1;
        self.seq
    }

    fn leaf(&mut self) -> SeqTree {
        SeqTree {
            seq: self.next_seq(),
            children: Vec::new(),
        }
    }
}

/// Keeps the entry with the highest registration order.
fn register<S>(map: &mut HashMap<String, (usize, S)>, id: &str, seq: usize, slot: S) {
    match map.entry(id.to_string()) {
        Entry::Occupied(mut entry) => {
            if entry.get().0 < seq {
                entry.insert((seq, slot));
            }
        }
        Entry::Vacant(entry) => {
            entry.insert((seq, slot));
        }
    }
}

fn strip_seq<S>(map: HashMap<String, (usize, S)>) -> HashMap<String, S> {
    map.into_iter().map(|(id, (_, slot))| (id, slot)).collect()
}

/// The canonical tree plus its lookup maps. Read-only once built.
///
/// Accessors hand out owned copies, so callers can modify what they receive
/// without affecting later reads.
#[derive(Debug, Default)]
pub struct Hierarchy {
    departments: Vec<Department>,
    departments_by_id: HashMap<String, usize>,
    provinces_by_id: HashMap<String, ProvinceSlot>,
    districts_by_id: HashMap<String, DistrictSlot>,
    districts_by_alternate: HashMap<String, DistrictSlot>,
    stats: BuildStats,
}

impl Hierarchy {
    fn index(departments: Vec<Department>, seqs: &[SeqTree], stats: BuildStats) -> Self {
        let mut by_department = HashMap::new();
        let mut by_province = HashMap::new();
        let mut by_district = HashMap::new();
        let mut by_alternate = HashMap::new();

        for (d, (department, department_seq)) in departments.iter().zip(seqs).enumerate() {
            register(&mut by_department, &department.id, department_seq.seq, d);

            for (p, (province, province_seq)) in department
                .provinces
                .iter()
                .zip(&department_seq.children)
                .enumerate()
            {
                let slot = ProvinceSlot {
                    department: d,
                    province: p,
                };
                register(&mut by_province, &province.id, province_seq.seq, slot);

                for (i, (district, district_seq)) in province
                    .districts
                    .iter()
                    .zip(&province_seq.children)
                    .enumerate()
                {
                    let slot = DistrictSlot {
                        department: d,
                        province: p,
                        district: i,
                    };
                    register(&mut by_district, &district.id, district_seq.seq, slot);
                    if let Some(alternate) = &district.alternate_code {
                        register(&mut by_alternate, alternate, district_seq.seq, slot);
                    }
                }
            }
        }

        Self {
            departments,
            departments_by_id: strip_seq(by_department),
            provinces_by_id: strip_seq(by_province),
            districts_by_id: strip_seq(by_district),
            districts_by_alternate: strip_seq(by_alternate),
            stats,
        }
    }

    pub fn departments(&self) -> Vec<Department> {
        self.departments.clone()
    }

    pub fn department_by_id(&self, id: &str) -> Option<Department> {
        self.department_ref(id).cloned()
    }

    /// Empty when the department is unknown.
    pub fn provinces_by_department(&self, department_id: &str) -> Vec<Province> {
        self.department_ref(department_id)
            .map(|department| department.provinces.clone())
            .unwrap_or_default()
    }

    pub fn province_by_id(&self, id: &str) -> Option<Province> {
        self.province_ref(id).cloned()
    }

    /// Empty when the province is unknown.
    pub fn districts_by_province(&self, province_id: &str) -> Vec<District> {
        self.province_ref(province_id)
            .map(|province| province.districts.clone())
            .unwrap_or_default()
    }

    /// Resolve a code of the primary standard; the input is normalized first.
    pub fn lookup_by_primary_code(&self, code: &str) -> Option<Resolution> {
        let slot = self.districts_by_id.get(&normalize_code(code))?;
        self.resolve(*slot)
    }

    /// Resolve a code of the alternate standard; the input is normalized first.
    pub fn lookup_by_alternate_code(&self, code: &str) -> Option<Resolution> {
        let slot = self.districts_by_alternate.get(&normalize_code(code))?;
        self.resolve(*slot)
    }

    pub fn counts(&self) -> HierarchyCounts {
        let provinces: Vec<&Province> = self.departments.iter().flat_map(|d| &d.provinces).collect();
        let districts: Vec<&District> = provinces.iter().copied().flat_map(|p| &p.districts).collect();
        HierarchyCounts {
            departments: self.departments.len(),
            provinces: provinces.len(),
            alternate_codes: districts.iter().filter(|d| d.alternate_code.is_some()).count(),
            districts: districts.len(),
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    fn department_ref(&self, id: &str) -> Option<&Department> {
        self.departments_by_id
            .get(id)
            .map(|index| &self.departments[*index])
    }

    fn province_ref(&self, id: &str) -> Option<&Province> {
        self.provinces_by_id
            .get(id)
            .map(|slot| &self.departments[slot.department].provinces[slot.province])
    }

    fn resolve(&self, slot: DistrictSlot) -> Option<Resolution> {
        let district =
            &self.departments[slot.department].provinces[slot.province].districts[slot.district];
        let province = self.province_ref(&district.province_id)?;
        let department = self.department_ref(&district.department_id)?;
        Some(Resolution {
            department: department.clone(),
            province: province.clone(),
            district: district.clone(),
        })
    }
}
