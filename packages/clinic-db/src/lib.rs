//! Clinic DB - Biblioteca compartilhada com o esquema relacional da clínica
//!
//! Esta biblioteca fornece:
//! - Metadados das tabelas e relacionamentos (instalações, áreas, médicos,
//!   salas, pacientes, consultas e usuários)
//! - Modelos de dados e validação dos campos
//! - Migrações automáticas do banco de dados
//! - Handle de conexão e operações de inserção em lote, leitura de chaves e
//!   remoção lógica

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub mod error;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod schema;
pub mod validation;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::DbError;

/// Configuração da conexão com o banco de dados
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// String de conexão, por exemplo `sqlite://data/clinic.db`
    pub database_url: String,
    /// Número máximo de conexões no pool
    pub max_connections: u32,
    /// Registrar cada instrução SQL nos logs
    pub log_statements: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/clinic.db".to_string(),
            max_connections: 1,
            log_statements: false,
        }
    }
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }
}

/// Caminho do arquivo SQLite contido na string de conexão, se houver
fn database_file(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}

/// Handle da conexão com o banco.
///
/// Obtido uma única vez no início do processo e repassado explicitamente a
/// cada operação. `close` consome o handle, então a conexão é liberada uma
/// única vez.
#[derive(Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Abre a conexão, com chaves estrangeiras ativas, e aplica as migrações
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        if let Some(parent) = database_file(&config.database_url).and_then(Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DbError::ConnectionError(format!(
                        "Falha ao criar diretório para banco de dados: {}",
                        e
                    ))
                })?;
            }
        }

        let mut connection_options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| DbError::ConnectionError(format!("String de conexão inválida: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .pragma("synchronous", "NORMAL");
        if !config.log_statements {
            connection_options = connection_options.disable_statement_logging();
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(connection_options)
            .await
            .map_err(|e| {
                DbError::ConnectionError(format!("Falha ao conectar ao banco de dados: {}", e))
            })?;

        if let Err(e) = migrations::run_migrations(&pool).await {
            pool.close().await;
            return Err(e);
        }

        info!("Banco de dados inicializado com sucesso: {}", config.database_url);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Libera a conexão
    pub async fn close(self) {
        self.pool.close().await;
        info!("Conexão com o banco de dados encerrada");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_db_connection() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("nested").join("test.db");

        let config = DbConfig {
            database_url: format!("sqlite://{}", db_path.display()),
            max_connections: 2,
            log_statements: true,
        };

        let store = Store::connect(&config).await?;

        let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(store.pool()).await?;
        assert_eq!(result.0, 1);

        let fk_enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(store.pool())
            .await?;
        assert_eq!(fk_enabled, 1);

        store.close().await;
        assert!(db_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_url_is_a_connection_error() {
        let err = Store::connect(&DbConfig::new("postgres://localhost/clinic"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConnectionError(_)));
    }

    #[test]
    fn database_file_is_extracted_from_url() {
        assert_eq!(
            database_file("sqlite://data/clinic.db?mode=rwc"),
            Some(Path::new("data/clinic.db"))
        );
        assert_eq!(database_file("sqlite::memory:"), None);
        assert_eq!(database_file("postgres://x"), None);
    }
}
