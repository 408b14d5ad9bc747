//! Validação antes da escrita
//!
//! As structs de criação derivam `Validate`; aqui ficam a validação de lotes
//! e a verificação de valores textuais avulsos contra os metadados.

use validator::Validate;

use crate::error::DbError;
use crate::schema::TableDef;

/// Valida todas as linhas de um lote e aponta a primeira inválida
pub fn validate_batch<T: Validate>(table: &TableDef, rows: &[T]) -> Result<(), DbError> {
    for (index, row) in rows.iter().enumerate() {
        row.validate().map_err(|errors| {
            DbError::ConstraintViolation(format!("{}[{}]: {}", table.name, index, errors))
        })?;
    }
    Ok(())
}

/// Verifica um valor textual contra a definição da coluna (tamanho ou
/// conjunto enumerado)
pub fn check_value(table: &TableDef, column: &str, value: &str) -> Result<(), DbError> {
    let def = table.column(column).ok_or_else(|| {
        DbError::QueryError(format!("Coluna desconhecida: {}.{}", table.name, column))
    })?;
    if def.accepts(value) {
        Ok(())
    } else {
        Err(DbError::ConstraintViolation(format!(
            "Valor inválido para {}.{}: {}",
            table.name, column, value
        )))
    }
}
