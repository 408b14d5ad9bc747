//! Sistema de migrações para banco de dados
//!
//! Este módulo cria as oito tabelas do esquema da clínica no SQLite. As
//! chaves estrangeiras não têm ações em cascata: remover um pai com filhos
//! é recusado pelo banco.

use sqlx::{Executor, SqlitePool};
use tracing::{error, info};

use crate::error::DbError;

/// Lista de migrações SQL a serem aplicadas
const MIGRATIONS: &[&str] = &[
    // 001_clinic_schema.sql
    r#"
    CREATE TABLE IF NOT EXISTS FACILITY (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        NAME VARCHAR(100) NOT NULL,
        DESCRIPTION VARCHAR(320) NOT NULL,
        CREATED_AT TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UPDATED_AT TIMESTAMP,
        DELETED_AT TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS AREA (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        FACILITY_ID INTEGER NOT NULL,
        NAME VARCHAR(100) NOT NULL,
        DESCRIPTION VARCHAR(320) NOT NULL,
        CREATED_AT TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UPDATED_AT TIMESTAMP,
        DELETED_AT TIMESTAMP,
        FOREIGN KEY (FACILITY_ID) REFERENCES FACILITY (ID)
    );

    CREATE TABLE IF NOT EXISTS DOCTOR (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        FIRST_NAME VARCHAR(100) NOT NULL,
        LAST_NAME VARCHAR(100) NOT NULL,
        PHONE VARCHAR(20),
        EMAIL VARCHAR(200) NOT NULL,
        CREATED_AT TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UPDATED_AT TIMESTAMP,
        DELETED_AT TIMESTAMP
    );

    -- Associação médico ↔ área: a chave é o próprio par
    CREATE TABLE IF NOT EXISTS DOCTOR_FACILITY (
        AREA_ID INTEGER NOT NULL,
        DOCTOR_ID INTEGER NOT NULL,
        PRIMARY KEY (AREA_ID, DOCTOR_ID),
        FOREIGN KEY (AREA_ID) REFERENCES AREA (ID),
        FOREIGN KEY (DOCTOR_ID) REFERENCES DOCTOR (ID)
    );

    -- NAME é único entre todas as salas
    CREATE TABLE IF NOT EXISTS ROOM (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        AREA_ID INTEGER NOT NULL,
        NAME VARCHAR(200) NOT NULL UNIQUE,
        DESCRIPTION VARCHAR(300),
        CREATED_AT TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        DELETED_AT TIMESTAMP,
        FOREIGN KEY (AREA_ID) REFERENCES AREA (ID)
    );

    CREATE TABLE IF NOT EXISTS PATIENT (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        FIRST_NAME VARCHAR(100) NOT NULL,
        LAST_NAME VARCHAR(100) NOT NULL,
        DATE_OF_BIRTH DATE NOT NULL,
        GENDER INTEGER NOT NULL CHECK (GENDER IN (0, 1)),
        PHONE VARCHAR(50),
        EMAIL VARCHAR(150) NOT NULL,
        ADDRESS VARCHAR(250),
        CREATED_AT TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UPDATED_AT TIMESTAMP,
        DELETED_AT TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS APPOINTMENT (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        PATIENT_ID INTEGER NOT NULL,
        DOCTOR_ID INTEGER NOT NULL,
        ROOM_ID INTEGER NOT NULL,
        START_TIME TIMESTAMP NOT NULL,
        END_TIME TIMESTAMP NOT NULL,
        STATUS VARCHAR(20) NOT NULL DEFAULT 'scheduled'
            CHECK (STATUS IN ('scheduled', 'completed', 'cancelled')),
        DESCRIPTION VARCHAR(500),
        CHECK (julianday(END_TIME) > julianday(START_TIME)),
        FOREIGN KEY (PATIENT_ID) REFERENCES PATIENT (ID),
        FOREIGN KEY (DOCTOR_ID) REFERENCES DOCTOR (ID),
        FOREIGN KEY (ROOM_ID) REFERENCES ROOM (ID)
    );

    CREATE TABLE IF NOT EXISTS APP_USER (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        USERNAME VARCHAR(50) NOT NULL,
        EMAIL VARCHAR(100) NOT NULL,
        PASSWORD_HASH VARCHAR(100) NOT NULL,
        ROLE VARCHAR(20) CHECK (ROLE IS NULL OR ROLE IN ('admin', 'receptionist', 'doctor')),
        IS_ACTIVE BOOLEAN NOT NULL DEFAULT 0 CHECK (IS_ACTIVE IN (0, 1)),
        CREATED_AT TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UPDATED_AT TIMESTAMP,
        DELETED_AT TIMESTAMP
    );

    -- Índices das chaves estrangeiras
    CREATE INDEX IF NOT EXISTS IDX_AREA_FACILITY_ID ON AREA (FACILITY_ID);
    CREATE INDEX IF NOT EXISTS IDX_DOCTOR_FACILITY_DOCTOR_ID ON DOCTOR_FACILITY (DOCTOR_ID);
    CREATE INDEX IF NOT EXISTS IDX_ROOM_AREA_ID ON ROOM (AREA_ID);
    CREATE INDEX IF NOT EXISTS IDX_APPOINTMENT_PATIENT_ID ON APPOINTMENT (PATIENT_ID);
    CREATE INDEX IF NOT EXISTS IDX_APPOINTMENT_DOCTOR_ID ON APPOINTMENT (DOCTOR_ID);
    CREATE INDEX IF NOT EXISTS IDX_APPOINTMENT_ROOM_ID ON APPOINTMENT (ROOM_ID);
    CREATE INDEX IF NOT EXISTS IDX_APPOINTMENT_START_TIME ON APPOINTMENT (START_TIME);
    "#,
];

/// Executa todas as migrações pendentes no banco de dados
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    info!("Aplicando migrações de banco de dados...");

    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            error!("Erro ao obter versão do banco: {}", e);
            DbError::MigrationError(format!("Falha ao ler PRAGMA user_version: {}", e))
        })?;

    info!("Versão atual do banco: {}", version);

    for (i, migration_sql) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as i64;

        if migration_version <= version {
            info!("Migração {} já aplicada", migration_version);
            continue;
        }

        info!("Aplicando migração {}...", migration_version);

        let fail = |stage: &str, e: sqlx::Error| {
            DbError::MigrationError(format!(
                "Falha ao {} migração {}: {}",
                stage, migration_version, e
            ))
        };

        let mut tx = pool.begin().await.map_err(|e| fail("iniciar transação da", e))?;

        // Várias instruções: precisa do caminho não preparado do executor
        (&mut *tx).execute(*migration_sql)
            .await
            .map_err(|e| fail("executar", e))?;

        (&mut *tx).execute(format!("PRAGMA user_version = {}", migration_version).as_str())
            .await
            .map_err(|e| fail("registrar versão da", e))?;

        tx.commit().await.map_err(|e| fail("confirmar", e))?;

        info!("Migração {} aplicada com sucesso", migration_version);
    }

    info!("Migrações concluídas. Versão atual: {}", MIGRATIONS.len());
    Ok(())
}

/// Versão do esquema após todas as migrações
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}
