use crate::adapters::feed::Feed;
use crate::core::catalog::CatalogRepository;
use crate::core::collation::{BaseCollator, CollationLocale};
use crate::core::repository::HierarchyRepository;
use crate::core::resolver::CodeResolver;
use crate::domain::model::CodingStandard;
use crate::domain::ports::FeedFormat;
use crate::utils::error::{Result, UbigeoError};
use crate::utils::validation::{validate_path, validate_positive_number, validate_source, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UbigeoConfig {
    pub hierarchy: FeedConfig,
    pub catalogs: CatalogsConfig,
    pub collation: Option<CollationConfig>,
    pub http: Option<HttpConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// http(s) URL or filesystem path.
    pub source: String,
    pub format: Option<FeedFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogsConfig {
    pub reniec: FeedConfig,
    pub inei: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollationConfig {
    pub locale: CollationLocale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: Option<String>,
    pub zip: Option<bool>,
    pub clean: Option<bool>,
}

impl FeedConfig {
    fn local(path: &str) -> Self {
        Self {
            source: path.to_string(),
            format: None,
        }
    }
}

impl Default for UbigeoConfig {
    /// 與靜態網站相同的資料檔位置
    fn default() -> Self {
        Self {
            hierarchy: FeedConfig::local("./data/code_ubigeo_dep_prov_dis.json"),
            catalogs: CatalogsConfig {
                reniec: FeedConfig::local("./data/ubigeo-reniec.json"),
                inei: FeedConfig::local("./data/ubigeo-inei.json"),
            },
            collation: None,
            http: None,
            export: None,
        }
    }
}

impl UbigeoConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| UbigeoError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${UBIGEO_DATA_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| UbigeoError::Config {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn locale(&self) -> CollationLocale {
        self.collation
            .as_ref()
            .map(|c| c.locale)
            .unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        let seconds = self
            .http
            .as_ref()
            .and_then(|h| h.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        Duration::from_secs(seconds)
    }

    pub fn export_path(&self) -> Option<&str> {
        self.export.as_ref().and_then(|e| e.output_path.as_deref())
    }

    pub fn export_zip(&self) -> bool {
        self.export.as_ref().and_then(|e| e.zip).unwrap_or(false)
    }

    pub fn export_clean(&self) -> bool {
        self.export.as_ref().and_then(|e| e.clean).unwrap_or(false)
    }

    pub fn catalog(&self, standard: CodingStandard) -> &FeedConfig {
        match standard {
            CodingStandard::Reniec => &self.catalogs.reniec,
            CodingStandard::Inei => &self.catalogs.inei,
        }
    }

    pub fn feed(&self, feed: &FeedConfig) -> Result<Feed> {
        Feed::from_source(&feed.source, feed.format, self.timeout())
    }

    pub fn hierarchy_repository(&self) -> Result<HierarchyRepository<Feed>> {
        Ok(HierarchyRepository::with_collator(
            self.feed(&self.hierarchy)?,
            BaseCollator::new(self.locale()),
        ))
    }

    pub fn catalog_repository(&self, standard: CodingStandard) -> Result<CatalogRepository<Feed>> {
        Ok(CatalogRepository::new(
            standard,
            self.feed(self.catalog(standard))?,
        ))
    }

    pub fn resolver(&self) -> Result<CodeResolver<Feed>> {
        Ok(CodeResolver::new(
            self.hierarchy_repository()?,
            self.catalog_repository(CodingStandard::Reniec)?,
            self.catalog_repository(CodingStandard::Inei)?,
        ))
    }
}

impl Validate for UbigeoConfig {
    fn validate(&self) -> Result<()> {
        validate_source("hierarchy.source", &self.hierarchy.source)?;
        if self.hierarchy.format == Some(FeedFormat::Csv) {
            return Err(UbigeoError::InvalidConfigValue {
                field: "hierarchy.format".to_string(),
                value: "csv".to_string(),
                reason: "the hierarchy feed is only available as JSON".to_string(),
            });
        }

        validate_source("catalogs.reniec.source", &self.catalogs.reniec.source)?;
        validate_source("catalogs.inei.source", &self.catalogs.inei.source)?;

        if let Some(seconds) = self.http.as_ref().and_then(|h| h.timeout_seconds) {
            validate_positive_number("http.timeout_seconds", seconds, 1)?;
        }

        if let Some(path) = self.export_path() {
            validate_path("export.output_path", path)?;
        }

        Ok(())
    }
}
