//! Clinic Seed
//!
//! Cria o esquema (se necessário) e popula todas as tabelas com dados
//! sintéticos.
//!
//! # Variáveis de ambiente
//!
//! - `DATABASE_URL`: string de conexão (obrigatória), ex. `sqlite://data/clinic.db`
//! - `TZ`: `UTC` ou deslocamento fixo `-03:00` (padrão: UTC)
//! - `SEED_MIN_ROWS` / `SEED_MAX_ROWS`: registros por tabela (padrão: 50 a 150)
//! - `SEED_RNG_SEED`: semente para execuções reproduzíveis
//! - `DB_MAX_CONNECTIONS`: tamanho do pool (padrão: 1)
//! - `RUST_LOG`: nível de log (padrão: info)
//! - `LOG_FORMAT=json`: logs em JSON

use std::process::ExitCode;

use clinic_seed::SeedConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // .env é opcional
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match SeedConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match clinic_seed::run(&config).await {
        Ok(report) => {
            info!("Seed concluído: {} registros inseridos", report.total());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Seed falhou: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
