use anyhow::{bail, Context};
use clap::Parser;
use ubigeo_index::utils::validation::{validate_required_field, Validate};
use ubigeo_index::utils::logger;
use ubigeo_index::{LocalStorage, StaticExporter, UbigeoConfig, ZipStorage};

#[derive(Parser)]
#[command(name = "ubigeo-export")]
#[command(about = "Write static department/province/district bundles from the UBIGEO hierarchy")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ubigeo.toml")]
    config: String,

    /// Override export.output_path from config
    #[arg(short, long)]
    output: Option<String>,

    /// Write a single zip archive instead of a directory tree
    #[arg(long)]
    zip: bool,

    /// Remove previous output before writing
    #[arg(long)]
    clean: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading configuration from: {}", args.config);
    let mut config = UbigeoConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(output) = args.output {
        config.export.get_or_insert_with(Default::default).output_path = Some(output);
    }
    config.validate()?;

    let output_path = validate_required_field(
        "export.output_path",
        &config.export_path().map(str::to_string),
    )?
    .clone();

    let repository = config.hierarchy_repository()?;
    let hierarchy = repository
        .bootstrap()
        .await
        .context("failed to load the UBIGEO hierarchy")?;
    if hierarchy.counts().districts == 0 {
        bail!("the hierarchy feed produced no districts; nothing to export");
    }

    let exporter = StaticExporter::new(&hierarchy);
    let manifest = if args.zip || config.export_zip() {
        let sink = ZipStorage::new(&output_path);
        exporter.write_all(&sink).await?
    } else {
        let sink = LocalStorage::new(&output_path);
        if args.clean || config.export_clean() {
            sink.reset().await?;
        }
        exporter.write_all(&sink).await?
    };

    println!(
        "✅ Exported {} departments, {} provinces, {} districts to {}",
        manifest.departments, manifest.provinces, manifest.districts, output_path
    );
    Ok(())
}
