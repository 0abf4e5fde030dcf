use crate::domain::model::CodingStandard;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "ubigeo")]
#[command(about = "Query Peruvian UBIGEO codes across RENIEC and INEI standards")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to the ./data feeds)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List departments
    Departments,
    /// List the provinces of a department
    Provinces { department_id: String },
    /// List the districts of a province
    Districts { province_id: String },
    /// Resolve a 6-digit code to its department, province and district
    Lookup {
        code: String,
        #[arg(long, value_enum, default_value_t = CodingStandard::Reniec)]
        standard: CodingStandard,
    },
}
