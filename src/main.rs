mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use colored::*;

use reqlab::ReqlabError;
use reqlab::config::ConfigLoader;
use reqlab::settings::AppContext;
use reqlab::store::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    reqlab::logger::init_logger();

    let cli = Cli::parse();

    let config = ConfigLoader::find_and_load()?;
    let data_dir = config.data_dir();
    tracing::debug!("Using data directory {}", data_dir.display());

    let store = Arc::new(FileStore::new(data_dir));
    let mut ctx = AppContext::load_with_defaults(store, config.default_preferences())?;

    if let Err(e) = cli::run(cli, &mut ctx).await {
        // 校验提示按当前语言输出
        let notice = e.downcast_ref::<ReqlabError>().and_then(ReqlabError::notice);
        match notice {
            Some(notice) => eprintln!("{}", notice.text(ctx.language()).yellow()),
            None => eprintln!("{} {:#}", "error:".red().bold(), e),
        }
        std::process::exit(1);
    }
    Ok(())
}
