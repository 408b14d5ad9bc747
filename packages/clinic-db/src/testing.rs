//! Utilitários para testes: banco SQLite temporário já migrado

use tempfile::TempDir;

use crate::{DbConfig, DbError, Store};

/// Banco temporário. O diretório é removido quando o valor é descartado,
/// então mantenha-o vivo enquanto o `Store` estiver em uso.
pub struct TempStore {
    pub dir: TempDir,
    pub config: DbConfig,
}

impl TempStore {
    pub fn new() -> Result<Self, DbError> {
        let dir = tempfile::tempdir()
            .map_err(|e| DbError::InternalError(format!("Falha ao criar diretório temporário: {}", e)))?;
        let config = DbConfig::new(format!("sqlite://{}", dir.path().join("clinic.db").display()));
        Ok(Self { dir, config })
    }

    pub async fn connect(&self) -> Result<Store, DbError> {
        Store::connect(&self.config).await
    }
}
