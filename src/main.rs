use clap::Parser;
use serde::Serialize;
use ubigeo_index::config::Command;
use ubigeo_index::core::export::EntityRef;
use ubigeo_index::utils::error::ErrorSeverity;
use ubigeo_index::utils::{logger, validation::Validate};
use ubigeo_index::{CliConfig, LookupOutcome, UbigeoConfig, UbigeoError};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    match run(cli).await {
        Ok(found) => {
            if !found {
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

/// Returns `false` when the query matched nothing.
async fn run(cli: CliConfig) -> Result<bool, UbigeoError> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            UbigeoConfig::from_file(path)?
        }
        None => UbigeoConfig::default(),
    };
    config.validate()?;

    let resolver = config.resolver()?;
    let repository = resolver.hierarchy();

    match cli.command {
        Command::Departments => {
            repository.bootstrap().await?;
            let departments = repository.get_departments();
            print_json(&departments.iter().map(EntityRef::from).collect::<Vec<_>>())?;
        }
        Command::Provinces { department_id } => {
            repository.bootstrap().await?;
            let provinces = repository.get_provinces_by_department(&department_id);
            if provinces.is_empty() {
                eprintln!("No provinces for department {}", department_id);
                return Ok(false);
            }
            print_json(&provinces.iter().map(EntityRef::from).collect::<Vec<_>>())?;
        }
        Command::Districts { province_id } => {
            repository.bootstrap().await?;
            let districts = repository.get_districts_by_province(&province_id);
            if districts.is_empty() {
                eprintln!("No districts for province {}", province_id);
                return Ok(false);
            }
            print_json(&districts)?;
        }
        Command::Lookup { code, standard } => match resolver.resolve(standard, &code).await? {
            LookupOutcome::Found { resolution, .. } => {
                println!(
                    "Found ({}): {} / {} / {}",
                    standard,
                    resolution.department.name,
                    resolution.province.name,
                    resolution.district.name
                );
                print_json(&resolution.district)?;
            }
            LookupOutcome::NotInCatalog { code } => {
                eprintln!("No {} code {} in the catalog", standard, code);
                return Ok(false);
            }
            LookupOutcome::NotSynchronized { code } => {
                eprintln!("{} code {} is not synchronized with the hierarchy", standard, code);
                return Ok(false);
            }
        },
    }

    Ok(true)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), UbigeoError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
