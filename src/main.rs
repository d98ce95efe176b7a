// ==========================================
// 零件质检装箱系统 - 命令行主入口
// ==========================================

use anyhow::Result;
use clap::Parser;

use parts_qc::app::AppState;
use parts_qc::cli::{self, Cli, Commands};

fn main() -> Result<()> {
    let args = Cli::parse();

    // 初始化日志系统（输出到 stderr）
    if args.verbose {
        parts_qc::logging::init_with_default("debug");
    } else {
        parts_qc::logging::init();
    }

    let config = args.to_config();
    parts_qc::i18n::set_locale(&config.locale);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", parts_qc::APP_NAME, parts_qc::VERSION);
    tracing::info!(locale = %parts_qc::i18n::current_locale(), "界面语言");
    tracing::info!("==================================================");

    let mut state = AppState::new(config);

    match args.command.unwrap_or(Commands::Menu) {
        Commands::Menu => cli::run(&mut state)?,
        Commands::Report { json: true } => println!("{}", state.inspection_api.summary_json()?),
        Commands::Report { json: false } => println!("{}", state.inspection_api.report()),
    }

    tracing::info!("系统退出");
    Ok(())
}
