//! Erros do seed

use clinic_db::DbError;
use thiserror::Error;

use crate::plan::Step;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),

    /// A etapa precisa de chaves de uma tabela que está vazia
    #[error("Etapa {step}: nenhum registro em {parent} para referenciar")]
    MissingParents { step: Step, parent: &'static str },

    #[error("Etapa {step} falhou")]
    Step {
        step: Step,
        #[source]
        source: DbError,
    },

    #[error("Falha ao gerar hash de senha: {0}")]
    Credential(String),
}

impl SeedError {
    /// Adaptador para `map_err` nas operações de banco de uma etapa
    pub fn at(step: Step) -> impl FnOnce(DbError) -> SeedError {
        move |source| SeedError::Step { step, source }
    }
}
