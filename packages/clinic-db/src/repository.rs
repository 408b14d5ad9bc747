//! Operações de acesso a dados
//!
//! Inserção em lote por entidade (uma instrução por lote, em transação),
//! leitura das chaves geradas, busca por chave, remoção lógica e física.
//!
//! Política de remoção: nada é removido em cascata. Remover (lógica ou
//! fisicamente) um registro que ainda tem filhos ativos é recusado.

use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};
use validator::Validate;

use crate::error::DbError;
use crate::models::*;
use crate::schema::{self, PrimaryKey, TableDef};
use crate::validation::{check_value, validate_batch};
use crate::Store;

/// Limite de parâmetros por instrução do SQLite
const SQLITE_MAX_VARIABLES: usize = 32_766;

/// Valida e insere um lote numa única transação.
///
/// Retorna o número de linhas inseridas. Lote vazio não toca no banco.
async fn bulk_insert<T, F>(
    store: &Store,
    table: &TableDef,
    rows: &[T],
    mut push_row: F,
) -> Result<u64, DbError>
where
    T: Validate,
    F: FnMut(Separated<'_, 'static, Sqlite, &'static str>, &T),
{
    if rows.is_empty() {
        return Ok(0);
    }
    validate_batch(table, rows)?;

    let columns = table.insertable_columns();
    let chunk_size = (SQLITE_MAX_VARIABLES / columns.len()).max(1);
    let mut inserted = 0;

    let mut tx = store.pool().begin().await?;
    for chunk in rows.chunks(chunk_size) {
        let mut builder: QueryBuilder<'static, Sqlite> =
            QueryBuilder::new(format!("INSERT INTO {} ({}) ", table.name, columns.join(", ")));
        builder.push_values(chunk, |b, row| push_row(b, row));
        inserted += builder.build().execute(&mut *tx).await?.rows_affected();
    }
    tx.commit().await?;

    debug!("{} linhas inseridas em {}", inserted, table.name);
    Ok(inserted)
}

pub async fn insert_facilities(store: &Store, rows: &[NewFacility]) -> Result<u64, DbError> {
    let now = Utc::now();
    bulk_insert(store, &schema::FACILITY, rows, |mut b, row| {
        b.push_bind(row.name.clone())
            .push_bind(row.description.clone())
            .push_bind(row.created_at.unwrap_or(now));
    })
    .await
}

pub async fn insert_areas(store: &Store, rows: &[NewArea]) -> Result<u64, DbError> {
    let now = Utc::now();
    bulk_insert(store, &schema::AREA, rows, |mut b, row| {
        b.push_bind(row.facility_id)
            .push_bind(row.name.clone())
            .push_bind(row.description.clone())
            .push_bind(row.created_at.unwrap_or(now));
    })
    .await
}

pub async fn insert_doctors(store: &Store, rows: &[NewDoctor]) -> Result<u64, DbError> {
    let now = Utc::now();
    bulk_insert(store, &schema::DOCTOR, rows, |mut b, row| {
        b.push_bind(row.first_name.clone())
            .push_bind(row.last_name.clone())
            .push_bind(row.phone.clone())
            .push_bind(row.email.clone())
            .push_bind(row.created_at.unwrap_or(now));
    })
    .await
}

/// Vínculos médico ↔ área. Um par repetido viola a chave composta.
pub async fn insert_doctor_facilities(
    store: &Store,
    links: &[DoctorFacility],
) -> Result<u64, DbError> {
    bulk_insert(store, &schema::DOCTOR_FACILITY, links, |mut b, link| {
        b.push_bind(link.area_id).push_bind(link.doctor_id);
    })
    .await
}

pub async fn insert_rooms(store: &Store, rows: &[NewRoom]) -> Result<u64, DbError> {
    let now = Utc::now();
    bulk_insert(store, &schema::ROOM, rows, |mut b, row| {
        b.push_bind(row.area_id)
            .push_bind(row.name.clone())
            .push_bind(row.description.clone())
            .push_bind(row.created_at.unwrap_or(now));
    })
    .await
}

pub async fn insert_patients(store: &Store, rows: &[NewPatient]) -> Result<u64, DbError> {
    let now = Utc::now();
    bulk_insert(store, &schema::PATIENT, rows, |mut b, row| {
        b.push_bind(row.first_name.clone())
            .push_bind(row.last_name.clone())
            .push_bind(row.date_of_birth)
            .push_bind(row.gender)
            .push_bind(row.phone.clone())
            .push_bind(row.email.clone())
            .push_bind(row.address.clone())
            .push_bind(row.created_at.unwrap_or(now));
    })
    .await
}

pub async fn insert_appointments(store: &Store, rows: &[NewAppointment]) -> Result<u64, DbError> {
    bulk_insert(store, &schema::APPOINTMENT, rows, |mut b, row| {
        b.push_bind(row.patient_id)
            .push_bind(row.doctor_id)
            .push_bind(row.room_id)
            .push_bind(row.start_time)
            .push_bind(row.end_time)
            .push_bind(row.status)
            .push_bind(row.description.clone());
    })
    .await
}

pub async fn insert_app_users(store: &Store, rows: &[NewAppUser]) -> Result<u64, DbError> {
    let now = Utc::now();
    bulk_insert(store, &schema::APP_USER, rows, |mut b, row| {
        b.push_bind(row.username.clone())
            .push_bind(row.email.clone())
            .push_bind(row.password_hash.clone())
            .push_bind(row.role)
            .push_bind(row.is_active)
            .push_bind(row.created_at.unwrap_or(now));
    })
    .await
}

/// Chaves dos registros ativos, em ordem crescente
async fn live_ids(store: &Store, table: &TableDef) -> Result<Vec<i64>, DbError> {
    let filter = if table.soft_delete() {
        " WHERE DELETED_AT IS NULL"
    } else {
        ""
    };
    let sql = format!("SELECT ID FROM {}{} ORDER BY ID", table.name, filter);
    let ids: Vec<i64> = sqlx::query_scalar(&sql).fetch_all(store.pool()).await?;
    debug!("{} chaves lidas de {}", ids.len(), table.name);
    Ok(ids)
}

pub async fn facility_ids(store: &Store) -> Result<Vec<FacilityId>, DbError> {
    Ok(live_ids(store, &schema::FACILITY).await?.into_iter().map(FacilityId).collect())
}

pub async fn area_ids(store: &Store) -> Result<Vec<AreaId>, DbError> {
    Ok(live_ids(store, &schema::AREA).await?.into_iter().map(AreaId).collect())
}

pub async fn doctor_ids(store: &Store) -> Result<Vec<DoctorId>, DbError> {
    Ok(live_ids(store, &schema::DOCTOR).await?.into_iter().map(DoctorId).collect())
}

pub async fn room_ids(store: &Store) -> Result<Vec<RoomId>, DbError> {
    Ok(live_ids(store, &schema::ROOM).await?.into_iter().map(RoomId).collect())
}

pub async fn patient_ids(store: &Store) -> Result<Vec<PatientId>, DbError> {
    Ok(live_ids(store, &schema::PATIENT).await?.into_iter().map(PatientId).collect())
}

pub async fn appointment_ids(store: &Store) -> Result<Vec<AppointmentId>, DbError> {
    Ok(live_ids(store, &schema::APPOINTMENT).await?.into_iter().map(AppointmentId).collect())
}

pub async fn app_user_ids(store: &Store) -> Result<Vec<AppUserId>, DbError> {
    Ok(live_ids(store, &schema::APP_USER).await?.into_iter().map(AppUserId).collect())
}

/// Pares (instalação, nome) já usados por áreas
pub async fn area_names(store: &Store) -> Result<Vec<(FacilityId, String)>, DbError> {
    let rows = sqlx::query_as("SELECT FACILITY_ID, NAME FROM AREA")
        .fetch_all(store.pool())
        .await?;
    Ok(rows)
}

/// Nomes de todas as salas, inclusive removidas logicamente: a unicidade
/// vale para a tabela inteira
pub async fn room_names(store: &Store) -> Result<Vec<String>, DbError> {
    let names = sqlx::query_scalar("SELECT NAME FROM ROOM")
        .fetch_all(store.pool())
        .await?;
    Ok(names)
}

pub async fn doctor_facility_links(store: &Store) -> Result<Vec<DoctorFacility>, DbError> {
    let links = sqlx::query_as("SELECT AREA_ID, DOCTOR_ID FROM DOCTOR_FACILITY ORDER BY AREA_ID, DOCTOR_ID")
        .fetch_all(store.pool())
        .await?;
    Ok(links)
}

/// Total de linhas da tabela
pub async fn count(store: &Store, table: &TableDef) -> Result<i64, DbError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name);
    let total = sqlx::query_scalar(&sql).fetch_one(store.pool()).await?;
    Ok(total)
}

async fn find_by_id<T>(store: &Store, table: &TableDef, id: i64) -> Result<T, DbError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE ID = ?", table.name);
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(store.pool())
        .await?
        .ok_or_else(|| DbError::NotFound(format!("{} {}", table.name, id)))
}

pub async fn find_facility(store: &Store, id: FacilityId) -> Result<Facility, DbError> {
    find_by_id(store, &schema::FACILITY, id.0).await
}

pub async fn find_area(store: &Store, id: AreaId) -> Result<Area, DbError> {
    find_by_id(store, &schema::AREA, id.0).await
}

pub async fn find_doctor(store: &Store, id: DoctorId) -> Result<Doctor, DbError> {
    find_by_id(store, &schema::DOCTOR, id.0).await
}

pub async fn find_room(store: &Store, id: RoomId) -> Result<Room, DbError> {
    find_by_id(store, &schema::ROOM, id.0).await
}

pub async fn find_patient(store: &Store, id: PatientId) -> Result<Patient, DbError> {
    find_by_id(store, &schema::PATIENT, id.0).await
}

pub async fn find_appointment(store: &Store, id: AppointmentId) -> Result<Appointment, DbError> {
    find_by_id(store, &schema::APPOINTMENT, id.0).await
}

pub async fn find_app_user(store: &Store, id: AppUserId) -> Result<AppUser, DbError> {
    find_by_id(store, &schema::APP_USER, id.0).await
}

/// Todas as consultas, em ordem de chave
pub async fn appointments(store: &Store) -> Result<Vec<Appointment>, DbError> {
    let rows = sqlx::query_as("SELECT * FROM APPOINTMENT ORDER BY ID")
        .fetch_all(store.pool())
        .await?;
    Ok(rows)
}

pub async fn areas(store: &Store) -> Result<Vec<Area>, DbError> {
    let rows = sqlx::query_as("SELECT * FROM AREA ORDER BY ID")
        .fetch_all(store.pool())
        .await?;
    Ok(rows)
}

pub async fn app_users(store: &Store) -> Result<Vec<AppUser>, DbError> {
    let rows = sqlx::query_as("SELECT * FROM APP_USER ORDER BY ID")
        .fetch_all(store.pool())
        .await?;
    Ok(rows)
}

fn require_surrogate_key(table: &TableDef) -> Result<(), DbError> {
    match table.primary_key {
        PrimaryKey::AutoIncrement(_) => Ok(()),
        PrimaryKey::Composite(_) => Err(DbError::QueryError(format!(
            "{} não tem chave própria; use as operações de vínculo",
            table.name
        ))),
    }
}

/// Remoção lógica: preenche DELETED_AT (e UPDATED_AT, quando existe).
///
/// Recusada com `HasDependents` se algum filho ativo ainda referencia o
/// registro. Registro inexistente ou já removido retorna `NotFound`.
pub async fn soft_delete(store: &Store, table: &TableDef, id: i64) -> Result<(), DbError> {
    require_surrogate_key(table)?;
    if !table.soft_delete() {
        return Err(DbError::ConstraintViolation(format!(
            "{} não possui remoção lógica",
            table.name
        )));
    }

    let mut tx = store.pool().begin().await?;

    for (child, foreign_key) in schema::referencing(table.name) {
        let live = match schema::table(child) {
            Some(def) if def.soft_delete() => " AND DELETED_AT IS NULL",
            _ => "",
        };
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?{}", child, foreign_key, live);
        let dependents: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *tx).await?;
        if dependents > 0 {
            return Err(DbError::HasDependents {
                table: table.name,
                id,
                child,
                count: dependents,
            });
        }
    }

    let now: DateTime<Utc> = Utc::now();
    let sql = if table.tracks_updates() {
        format!(
            "UPDATE {} SET DELETED_AT = ?1, UPDATED_AT = ?1 WHERE ID = ?2 AND DELETED_AT IS NULL",
            table.name
        )
    } else {
        format!(
            "UPDATE {} SET DELETED_AT = ?1 WHERE ID = ?2 AND DELETED_AT IS NULL",
            table.name
        )
    };
    let result = sqlx::query(&sql).bind(now).bind(id).execute(&mut *tx).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("{} {}", table.name, id)));
    }
    tx.commit().await?;

    info!("{} {} removido logicamente", table.name, id);
    Ok(())
}

/// Remoção física. O banco recusa (`ForeignKeyViolation`) enquanto houver
/// filhos referenciando o registro, inclusive filhos removidos logicamente.
pub async fn delete(store: &Store, table: &TableDef, id: i64) -> Result<(), DbError> {
    require_surrogate_key(table)?;
    let sql = format!("DELETE FROM {} WHERE ID = ?", table.name);
    let result = sqlx::query(&sql).bind(id).execute(store.pool()).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("{} {}", table.name, id)));
    }
    info!("{} {} removido", table.name, id);
    Ok(())
}

pub async fn delete_appointment(store: &Store, id: AppointmentId) -> Result<(), DbError> {
    delete(store, &schema::APPOINTMENT, id.0).await
}

pub async fn delete_doctor_facility(store: &Store, link: DoctorFacility) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM DOCTOR_FACILITY WHERE AREA_ID = ? AND DOCTOR_ID = ?")
        .bind(link.area_id)
        .bind(link.doctor_id)
        .execute(store.pool())
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!(
            "DOCTOR_FACILITY ({}, {})",
            link.area_id, link.doctor_id
        )));
    }
    Ok(())
}

/// Marca UPDATED_AT com o instante atual
pub async fn touch(store: &Store, table: &TableDef, id: i64) -> Result<(), DbError> {
    require_surrogate_key(table)?;
    if !table.tracks_updates() {
        return Err(DbError::ConstraintViolation(format!(
            "{} não registra data de alteração",
            table.name
        )));
    }
    let sql = format!("UPDATE {} SET UPDATED_AT = ? WHERE ID = ?", table.name);
    let result = sqlx::query(&sql)
        .bind(Utc::now())
        .bind(id)
        .execute(store.pool())
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("{} {}", table.name, id)));
    }
    Ok(())
}

/// Altera o status de uma consulta a partir do valor textual
pub async fn update_appointment_status(
    store: &Store,
    id: AppointmentId,
    status: &str,
) -> Result<(), DbError> {
    check_value(&schema::APPOINTMENT, "STATUS", status)?;
    let status: AppointmentStatus = status.parse()?;
    let result = sqlx::query("UPDATE APPOINTMENT SET STATUS = ? WHERE ID = ?")
        .bind(status)
        .bind(id)
        .execute(store.pool())
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("APPOINTMENT {}", id)));
    }
    Ok(())
}

/// Altera o perfil de um usuário a partir do valor textual (ou remove o
/// perfil com `None`)
pub async fn set_user_role(
    store: &Store,
    id: AppUserId,
    role: Option<&str>,
) -> Result<(), DbError> {
    let role = match role {
        Some(value) => {
            check_value(&schema::APP_USER, "ROLE", value)?;
            Some(value.parse::<UserRole>()?)
        }
        None => None,
    };
    let result = sqlx::query("UPDATE APP_USER SET ROLE = ?, UPDATED_AT = ? WHERE ID = ?")
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .execute(store.pool())
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("APP_USER {}", id)));
    }
    Ok(())
}

/// Número de violações de chave estrangeira no banco (0 esperado)
pub async fn check_integrity(store: &Store) -> Result<usize, DbError> {
    let violations = sqlx::query("PRAGMA foreign_key_check")
        .fetch_all(store.pool())
        .await?;
    Ok(violations.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempStore;
    use chrono::{NaiveDate, TimeZone};

    async fn facility_with_area(store: &Store) -> anyhow::Result<(FacilityId, AreaId)> {
        insert_facilities(
            store,
            &[NewFacility {
                name: "Hospital Santa Luzia".to_string(),
                description: "Hospital geral".to_string(),
                created_at: None,
            }],
        )
        .await?;
        let facility = facility_ids(store).await?[0];
        insert_areas(
            store,
            &[NewArea {
                facility_id: facility,
                name: "Cardiologia".to_string(),
                description: "Cuidados cardíacos".to_string(),
                created_at: None,
            }],
        )
        .await?;
        let area = area_ids(store).await?[0];
        Ok((facility, area))
    }

    fn room(area_id: AreaId, name: &str) -> NewRoom {
        NewRoom {
            area_id,
            name: name.to_string(),
            description: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn area_requires_existing_facility() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;

        let err = insert_areas(
            &store,
            &[NewArea {
                facility_id: FacilityId(42),
                name: "Pediatria".to_string(),
                description: "Atendimento infantil".to_string(),
                created_at: None,
            }],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation(_)));
        assert_eq!(count(&store, &schema::AREA).await?, 0);

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn room_names_are_globally_unique() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;
        let (facility, area) = facility_with_area(&store).await?;

        insert_areas(
            &store,
            &[NewArea {
                facility_id: facility,
                name: "Ortopedia".to_string(),
                description: "Ossos e articulações".to_string(),
                created_at: None,
            }],
        )
        .await?;
        let other_area = area_ids(&store).await?[1];

        insert_rooms(&store, &[room(area, "Room 1")]).await?;
        let err = insert_rooms(&store, &[room(other_area, "Room 1")]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));

        // lote com duplicata interna falha inteiro
        let err = insert_rooms(&store, &[room(area, "Room 2"), room(area, "Room 2")])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));
        assert_eq!(room_names(&store).await?, vec!["Room 1".to_string()]);

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_doctor_area_pair_is_rejected() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;
        let (_, area) = facility_with_area(&store).await?;
        insert_doctors(
            &store,
            &[NewDoctor {
                first_name: "Marta".to_string(),
                last_name: "Ribeiro".to_string(),
                phone: Some("555-0101".to_string()),
                email: "marta.ribeiro@example.com".to_string(),
                created_at: None,
            }],
        )
        .await?;
        let doctor = doctor_ids(&store).await?[0];

        let link = DoctorFacility::new(area, doctor);
        assert_eq!(insert_doctor_facilities(&store, &[link]).await?, 1);
        let err = insert_doctor_facilities(&store, &[link]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));
        assert_eq!(doctor_facility_links(&store).await?, vec![link]);

        delete_doctor_facility(&store, link).await?;
        assert!(doctor_facility_links(&store).await?.is_empty());

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn nurse_role_is_rejected() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;

        insert_app_users(
            &store,
            &[NewAppUser {
                username: "recepcao".to_string(),
                email: "recepcao@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Some(UserRole::Receptionist),
                is_active: false,
                created_at: None,
            }],
        )
        .await?;
        let user_id = app_user_ids(&store).await?[0];
        let user = find_app_user(&store, user_id).await?;
        assert_eq!(user.role, Some(UserRole::Receptionist));
        assert!(!user.is_active);

        let err = set_user_role(&store, user_id, Some("nurse")).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));

        let err = sqlx::query(
            "INSERT INTO APP_USER (USERNAME, EMAIL, PASSWORD_HASH, ROLE) VALUES ('x', 'x@example.com', 'h', 'nurse')",
        )
        .execute(store.pool())
        .await
        .map_err(DbError::from)
        .unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));

        set_user_role(&store, user_id, None).await?;
        let user = find_app_user(&store, user_id).await?;
        assert_eq!(user.role, None);
        assert!(user.updated_at.is_some());

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn soft_delete_rejects_parents_with_live_children() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;
        let (facility, area) = facility_with_area(&store).await?;

        let err = soft_delete(&store, &schema::FACILITY, facility.0).await.unwrap_err();
        assert!(matches!(err, DbError::HasDependents { child: "AREA", count: 1, .. }));

        // filho removido logicamente não bloqueia mais o pai
        soft_delete(&store, &schema::AREA, area.0).await?;
        assert!(area_ids(&store).await?.is_empty());
        soft_delete(&store, &schema::FACILITY, facility.0).await?;

        let removed = find_facility(&store, facility).await?;
        assert!(removed.deleted_at.is_some());
        assert_eq!(removed.deleted_at, removed.updated_at);

        let err = soft_delete(&store, &schema::FACILITY, facility.0).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        // remoção física continua recusada pela chave estrangeira
        let err = delete(&store, &schema::FACILITY, facility.0).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation(_)));

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn tables_without_marker_cannot_be_soft_deleted() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;

        assert!(matches!(
            soft_delete(&store, &schema::APPOINTMENT, 1).await,
            Err(DbError::ConstraintViolation(_))
        ));
        assert!(matches!(
            soft_delete(&store, &schema::DOCTOR_FACILITY, 1).await,
            Err(DbError::QueryError(_))
        ));
        assert!(matches!(
            touch(&store, &schema::ROOM, 1).await,
            Err(DbError::ConstraintViolation(_))
        ));

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn appointment_lifecycle() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;
        let (_, area) = facility_with_area(&store).await?;

        insert_doctors(
            &store,
            &[NewDoctor {
                first_name: "Paulo".to_string(),
                last_name: "Nunes".to_string(),
                phone: None,
                email: "paulo.nunes@example.com".to_string(),
                created_at: None,
            }],
        )
        .await?;
        insert_rooms(&store, &[room(area, "Room 0")]).await?;
        insert_patients(
            &store,
            &[NewPatient {
                first_name: "Joana".to_string(),
                last_name: "Prado".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 2, 28).unwrap(),
                gender: 0,
                phone: None,
                email: "joana.prado@example.com".to_string(),
                address: Some("Rua das Flores, 10".to_string()),
                created_at: None,
            }],
        )
        .await?;

        let start = Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap();
        let appointment = NewAppointment {
            patient_id: patient_ids(&store).await?[0],
            doctor_id: doctor_ids(&store).await?[0],
            room_id: room_ids(&store).await?[0],
            start_time: start,
            end_time: start + chrono::Duration::minutes(45),
            status: AppointmentStatus::default(),
            description: None,
        };
        insert_appointments(&store, &[appointment.clone()]).await?;

        let id = appointment_ids(&store).await?[0];
        let stored = find_appointment(&store, id).await?;
        assert_eq!(stored.status, AppointmentStatus::Scheduled);
        assert_eq!(stored.duration(), chrono::Duration::minutes(45));
        assert_eq!(stored.start_time, start);

        let patient = find_patient(&store, stored.patient_id).await?;
        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1990, 2, 28).unwrap());

        // sala com consulta não pode ser removida
        let err = soft_delete(&store, &schema::ROOM, stored.room_id.0).await.unwrap_err();
        assert!(matches!(err, DbError::HasDependents { child: "APPOINTMENT", .. }));

        assert!(matches!(
            update_appointment_status(&store, id, "pending").await,
            Err(DbError::ConstraintViolation(_))
        ));
        update_appointment_status(&store, id, "completed").await?;
        assert_eq!(find_appointment(&store, id).await?.status, AppointmentStatus::Completed);

        // fim antes do início: recusado já na validação
        let mut backwards = appointment.clone();
        backwards.end_time = start - chrono::Duration::minutes(5);
        assert!(matches!(
            insert_appointments(&store, &[backwards]).await,
            Err(DbError::ConstraintViolation(_))
        ));

        delete_appointment(&store, id).await?;
        soft_delete(&store, &schema::ROOM, stored.room_id.0).await?;
        assert_eq!(check_integrity(&store).await?, 0);

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn touch_sets_update_timestamp() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;
        let (facility, _) = facility_with_area(&store).await?;

        assert!(find_facility(&store, facility).await?.updated_at.is_none());
        touch(&store, &schema::FACILITY, facility.0).await?;
        assert!(find_facility(&store, facility).await?.updated_at.is_some());
        assert!(matches!(
            touch(&store, &schema::FACILITY, 999).await,
            Err(DbError::NotFound(_))
        ));

        store.close().await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() -> anyhow::Result<()> {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;
        assert_eq!(insert_facilities(&store, &[]).await?, 0);
        assert_eq!(count(&store, &schema::FACILITY).await?, 0);
        store.close().await;
        Ok(())
    }
}
