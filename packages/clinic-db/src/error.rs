//! Definições de erro para a biblioteca clinic-db
//!
//! Este módulo define os tipos de erro usados pela biblioteca. Violações de
//! restrição são separadas por tipo (unicidade, chave estrangeira e as demais)
//! para que o chamador consiga distinguir cada caso.

use sqlx::error::ErrorKind;
use thiserror::Error;
use validator::ValidationErrors;

/// Erros específicos para operações de banco de dados
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Erro de conexão com banco de dados: {0}")]
    ConnectionError(String),

    #[error("Erro de migração: {0}")]
    MigrationError(String),

    #[error("Erro de consulta: {0}")]
    QueryError(String),

    #[error("Entidade não encontrada: {0}")]
    NotFound(String),

    /// Campo obrigatório ausente, tamanho excedido, valor fora do conjunto
    /// enumerado ou CHECK violado
    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    #[error("Violação de unicidade: {0}")]
    UniqueViolation(String),

    #[error("Violação de integridade referencial: {0}")]
    ForeignKeyViolation(String),

    /// Remoção recusada porque ainda existem registros filhos ativos
    #[error("{table} {id} possui {count} registro(s) dependente(s) em {child}")]
    HasDependents {
        table: &'static str,
        id: i64,
        child: &'static str,
        count: i64,
    },

    #[error("Erro interno: {0}")]
    InternalError(String),
}

impl DbError {
    /// Indica se o erro é alguma violação de restrição do esquema
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            DbError::ConstraintViolation(_)
                | DbError::UniqueViolation(_)
                | DbError::ForeignKeyViolation(_)
        )
    }
}

/// Códigos estendidos do SQLite para restrições
const SQLITE_CONSTRAINT_CHECK: &str = "275";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
const SQLITE_CONSTRAINT_NOTNULL: &str = "1299";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

/// Conversão de erros específicos do SQLx para nossos tipos de erro
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DbError::NotFound("Registro não encontrado".to_string()),
            sqlx::Error::Database(dbe) => {
                let message = dbe.message().to_string();
                match dbe.kind() {
                    ErrorKind::UniqueViolation => return DbError::UniqueViolation(message),
                    ErrorKind::ForeignKeyViolation => return DbError::ForeignKeyViolation(message),
                    ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                        return DbError::ConstraintViolation(message)
                    }
                    _ => {}
                }
                match dbe.code().as_deref() {
                    Some(SQLITE_CONSTRAINT_UNIQUE) | Some(SQLITE_CONSTRAINT_PRIMARYKEY) => {
                        DbError::UniqueViolation(message)
                    }
                    Some(SQLITE_CONSTRAINT_FOREIGNKEY) => DbError::ForeignKeyViolation(message),
                    Some(SQLITE_CONSTRAINT_CHECK) | Some(SQLITE_CONSTRAINT_NOTNULL) | Some("23000") => {
                        DbError::ConstraintViolation(message)
                    }
                    _ => DbError::QueryError(message),
                }
            }
            sqlx::Error::ColumnNotFound(col) => {
                DbError::QueryError(format!("Coluna não encontrada: {}", col))
            }
            sqlx::Error::TypeNotFound { type_name } => {
                DbError::QueryError(format!("Tipo não encontrado: {}", type_name))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::QueryError(format!("Erro ao decodificar coluna {}: {}", index, source))
            }
            sqlx::Error::Io(io_err) => DbError::ConnectionError(io_err.to_string()),
            sqlx::Error::Configuration(conf_err) => DbError::ConnectionError(conf_err.to_string()),
            sqlx::Error::PoolClosed => {
                DbError::ConnectionError("Pool de conexões fechado".to_string())
            }
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionError("Timeout no pool de conexões".to_string())
            }
            sqlx::Error::WorkerCrashed => {
                DbError::InternalError("Worker do banco de dados falhou".to_string())
            }
            _ => DbError::InternalError(format!("Erro inesperado: {:?}", error)),
        }
    }
}

/// Falhas de validação de campos viram violação de restrição
impl From<ValidationErrors> for DbError {
    fn from(errors: ValidationErrors) -> Self {
        DbError::ConstraintViolation(errors.to_string())
    }
}
