use timetable_solver::config::AppConfig;
use timetable_solver::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.filter))
        .init();

    server::run_server(config).await
}
