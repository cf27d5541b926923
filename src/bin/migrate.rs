use clap::Parser;
use mimalloc::MiMalloc;
use refri_express::config::Config;
use refri_express::migrate::{self, MigrateArgs};
use refri_express::telemetry;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = MigrateArgs::parse();

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(&cfg.loglevel);

    migrate::run(&args, &cfg).await
}
