use crate::core::catalog::CatalogRepository;
use crate::core::collation::{BaseCollator, Collator};
use crate::core::normalize::CODE_WIDTH;
use crate::core::repository::HierarchyRepository;
use crate::domain::model::{CatalogRecord, CodingStandard, Resolution};
use crate::domain::ports::FeedSource;
use crate::utils::error::{Result, UbigeoError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found {
        record: CatalogRecord,
        resolution: Resolution,
    },
    /// The code is not listed in the standard's catalog.
    NotInCatalog { code: String },
    /// Listed in the catalog but missing from the hierarchy.
    NotSynchronized { code: String },
}

/// Looks up a user-supplied code under either standard.
///
/// The code must be present in that standard's catalog and then resolve
/// in the hierarchy: RENIEC codes through the primary index, INEI codes
/// through the alternate one.
pub struct CodeResolver<F: FeedSource, C: Collator = BaseCollator> {
    hierarchy: HierarchyRepository<F, C>,
    reniec: CatalogRepository<F>,
    inei: CatalogRepository<F>,
}

impl<F: FeedSource, C: Collator> CodeResolver<F, C> {
    pub fn new(
        hierarchy: HierarchyRepository<F, C>,
        reniec: CatalogRepository<F>,
        inei: CatalogRepository<F>,
    ) -> Self {
        Self {
            hierarchy,
            reniec,
            inei,
        }
    }

    pub fn hierarchy(&self) -> &HierarchyRepository<F, C> {
        &self.hierarchy
    }

    pub fn catalog(&self, standard: CodingStandard) -> &CatalogRepository<F> {
        match standard {
            CodingStandard::Reniec => &self.reniec,
            CodingStandard::Inei => &self.inei,
        }
    }

    /// Load the hierarchy and both catalogs concurrently.
    pub async fn bootstrap(&self) -> Result<()> {
        tokio::try_join!(
            self.hierarchy.bootstrap(),
            self.reniec.bootstrap(),
            self.inei.bootstrap()
        )?;
        Ok(())
    }

    pub async fn resolve(&self, standard: CodingStandard, input: &str) -> Result<LookupOutcome> {
        let code = parse_code(input)?;
        self.bootstrap().await?;

        let Some(record) = self.catalog(standard).lookup(&code) else {
            tracing::debug!("{} code {} not in catalog", standard, code);
            return Ok(LookupOutcome::NotInCatalog { code });
        };

        let resolution = match standard {
            CodingStandard::Reniec => self.hierarchy.lookup_by_primary_code(&record.code),
            CodingStandard::Inei => self.hierarchy.lookup_by_alternate_code(&record.code),
        };

        Ok(match resolution {
            Some(resolution) => LookupOutcome::Found { record, resolution },
            None => {
                tracing::warn!("{} code {} is not synchronized with the hierarchy", standard, code);
                LookupOutcome::NotSynchronized { code }
            }
        })
    }
}

/// Accepts separators but requires exactly six digits.
pub fn parse_code(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UbigeoError::InvalidCode {
            input: input.to_string(),
            reason: "code is empty".to_string(),
        });
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != CODE_WIDTH {
        return Err(UbigeoError::InvalidCode {
            input: input.to_string(),
            reason: format!("code must have {} digits", CODE_WIDTH),
        });
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MemoryFeed {
        identity: &'static str,
        body: &'static str,
    }

    impl FeedSource for MemoryFeed {
        async fn fetch(&self) -> Result<Vec<u8>> {
            Ok(self.body.as_bytes().to_vec())
        }

        fn identity(&self) -> &str {
            self.identity
        }
    }

    fn resolver() -> CodeResolver<MemoryFeed> {
        let hierarchy = MemoryFeed {
            identity: "hierarchy.json",
            body: r#"{"LIMA": {"LIMA": {
                "MIRAFLORES": {"ubigeo": "150122", "inei": "150140"},
                "SAN BORJA": {"ubigeo": "150130"}
            }}}"#,
        };
        let reniec = MemoryFeed {
            identity: "reniec.json",
            body: r#"[
                {"departamento": "15", "provincia": "01", "distrito": "22"},
                {"departamento": "15", "provincia": "01", "distrito": "99"}
            ]"#,
        };
        let inei = MemoryFeed {
            identity: "inei.csv",
            body: "departamento,provincia,distrito,nombre\n15,01,40,MIRAFLORES\n15,01,30,SAN BORJA\n",
        };

        CodeResolver::new(
            HierarchyRepository::new(hierarchy),
            CatalogRepository::new(CodingStandard::Reniec, reniec),
            CatalogRepository::new(CodingStandard::Inei, inei),
        )
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code(" 15-01-22 ").unwrap(), "150122");
        assert!(matches!(parse_code("   "), Err(UbigeoError::InvalidCode { .. })));
        assert!(matches!(parse_code("15012"), Err(UbigeoError::InvalidCode { .. })));
        assert!(matches!(parse_code("1501223"), Err(UbigeoError::InvalidCode { .. })));
    }

    #[tokio::test]
    async fn test_resolve_by_both_standards() {
        let resolver = resolver();

        let LookupOutcome::Found { resolution, .. } =
            resolver.resolve(CodingStandard::Reniec, "150122").await.unwrap()
        else {
            panic!("expected RENIEC match");
        };
        assert_eq!(resolution.district.name, "Miraflores");

        let LookupOutcome::Found { record, resolution } =
            resolver.resolve(CodingStandard::Inei, "15 01 40").await.unwrap()
        else {
            panic!("expected INEI match");
        };
        assert_eq!(record.name.as_deref(), Some("Miraflores"));
        assert_eq!(resolution.district.id, "150122");
        assert_eq!(resolution.province.id, "1501");
    }

    #[tokio::test]
    async fn test_resolve_misses() {
        let resolver = resolver();

        assert_eq!(
            resolver.resolve(CodingStandard::Reniec, "150140").await.unwrap(),
            LookupOutcome::NotInCatalog {
                code: "150140".to_string()
            }
        );
        assert_eq!(
            resolver.resolve(CodingStandard::Reniec, "150199").await.unwrap(),
            LookupOutcome::NotSynchronized {
                code: "150199".to_string()
            }
        );
        // San Borja has no INEI code in the hierarchy
        assert_eq!(
            resolver.resolve(CodingStandard::Inei, "150130").await.unwrap(),
            LookupOutcome::NotSynchronized {
                code: "150130".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_code_skips_loading() {
        let resolver = resolver();
        assert!(resolver.resolve(CodingStandard::Inei, "12").await.is_err());
        assert!(!resolver.hierarchy().is_ready());
        assert!(!resolver.catalog(CodingStandard::Inei).is_ready());
    }
}
