use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use folha_ponto::config::AppConfig;
use folha_ponto::db::{MemoryStore, MySqlStore};
use folha_ponto::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("reading configuration")?;
    let holidays = config.holidays().context("loading holiday calendar")?;
    let pdf_options = config.pdf_options().context("loading pdf font/logo")?;

    let state = match &config.db {
        Some(db) => {
            let store = Arc::new(MySqlStore::connect(db).context("connecting to mysql")?);
            AppState {
                employees: store.clone(),
                timesheets: store,
                holidays: Arc::new(holidays),
                pdf_options: Arc::new(pdf_options),
            }
        }
        None => {
            let employees = config.seed_employees().context("loading seed employees")?;
            tracing::warn!(employees = employees.len(), "DB_HOST not set, using in-memory store");
            let store = Arc::new(MemoryStore::with_employees(employees));
            AppState {
                employees: store.clone(),
                timesheets: store,
                holidays: Arc::new(holidays),
                pdf_options: Arc::new(pdf_options),
            }
        }
    };

    server::run(config.port, state).await.context("server failed")?;
    Ok(())
}
