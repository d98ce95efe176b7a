//! 命令行参数定义 (clap derive)

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::app_config::{ENV_DB_PATH, ENV_LOCALE};
use crate::config::{AppConfig, SyncPolicy};

#[derive(Parser, Debug)]
#[command(name = "parts-qc")]
#[command(author, version, about = "Parts quality control: inspection, boxing and reporting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// SQLite database file
    #[arg(long, env = ENV_DB_PATH)]
    pub db: Option<String>,

    /// Interface language (en, pt-BR)
    #[arg(long, env = ENV_LOCALE)]
    pub locale: Option<String>,

    /// Run in memory only, without reading or writing the database
    #[arg(long)]
    pub no_persist: bool,

    /// When to write changes to the database
    #[arg(long, value_enum, default_value = "every-change")]
    pub sync: SyncArg,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Print the inspection report and exit
    Report {
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncArg {
    /// Save after every registration or removal
    EveryChange,
    /// Save only on explicit "save now" and on exit
    Manual,
}

impl From<SyncArg> for SyncPolicy {
    fn from(arg: SyncArg) -> Self {
        match arg {
            SyncArg::EveryChange => SyncPolicy::EveryChange,
            SyncArg::Manual => SyncPolicy::Manual,
        }
    }
}

impl Cli {
    /// 合并命令行参数与环境变量/默认值
    pub fn to_config(&self) -> AppConfig {
        AppConfig::with_overrides(
            self.db.clone(),
            self.locale.clone(),
            !self.no_persist,
            self.sync.into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "parts-qc",
            "--db",
            "/tmp/qc.db",
            "--locale",
            "pt-BR",
            "--sync",
            "manual",
            "--no-persist",
        ]);
        let config = cli.to_config();
        assert_eq!(config.db_path, "/tmp/qc.db");
        assert_eq!(config.locale, "pt-BR");
        assert!(!config.persistence);
        assert_eq!(config.sync_policy, SyncPolicy::Manual);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_report_subcommand() {
        let cli = Cli::parse_from(["parts-qc", "report", "--json"]);
        assert!(matches!(cli.command, Some(Commands::Report { json: true })));
        assert_eq!(cli.sync, SyncArg::EveryChange);
    }
}
