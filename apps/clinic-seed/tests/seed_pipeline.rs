use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use clinic_db::models::{AppointmentStatus, UserRole};
use clinic_db::testing::TempStore;
use clinic_db::{repository, schema, DbError};
use clinic_seed::{CountRange, SeedConfig, SeedError, SeedPlan, Seeder, Step};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

#[tokio::test]
async fn full_run_fills_every_table_within_range() -> anyhow::Result<()> {
    // duas execuções em bancos novos
    for seed in [11, 12] {
        let temp = TempStore::new()?;
        let store = temp.connect().await?;

        let report = Seeder::new(&store, SeedPlan::default(), Some(seed), today())?
            .run()
            .await?;
        assert_eq!(report.steps().len(), 8);

        for step in Step::ORDER {
            let stored = repository::count(&store, step.table()).await?;
            assert_eq!(Some(stored as u64), report.inserted(step));
            if step == Step::DoctorAreas {
                assert!(stored > 0);
            } else {
                assert!(CountRange::default().contains(stored as usize), "{}: {}", step, stored);
            }
        }
        assert_eq!(repository::check_integrity(&store).await?, 0);

        store.close().await;
    }
    Ok(())
}

#[tokio::test]
async fn seeded_rows_respect_relationships_and_enumerations() -> anyhow::Result<()> {
    let temp = TempStore::new()?;
    let store = temp.connect().await?;
    Seeder::new(&store, SeedPlan::uniform(CountRange::new(20, 40)?), Some(5), today())?
        .run()
        .await?;

    let facility_ids: HashSet<_> = repository::facility_ids(&store).await?.into_iter().collect();
    let mut area_names = HashSet::new();
    for area in repository::areas(&store).await? {
        assert!(facility_ids.contains(&area.facility_id));
        assert!(area_names.insert((area.facility_id, area.name)));
    }

    let rooms = repository::room_names(&store).await?;
    let distinct: HashSet<_> = rooms.iter().collect();
    assert_eq!(distinct.len(), rooms.len());

    let links = repository::doctor_facility_links(&store).await?;
    let distinct: HashSet<_> = links.iter().collect();
    assert_eq!(distinct.len(), links.len());

    for appointment in repository::appointments(&store).await? {
        let minutes = appointment.duration().num_minutes();
        assert!((15..=120).contains(&minutes), "duração {}", minutes);
        assert!(appointment.end_time > appointment.start_time);
        assert!(AppointmentStatus::ALL.contains(&appointment.status));
    }

    for user in repository::app_users(&store).await? {
        let role = user.role.expect("papel sorteado");
        assert!(UserRole::ALL.contains(&role));
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    for id in repository::patient_ids(&store).await? {
        let patient = repository::find_patient(&store, id).await?;
        assert!(patient.date_of_birth <= NaiveDate::from_ymd_opt(2008, 10, 17).unwrap());
        assert!(patient.date_of_birth > NaiveDate::from_ymd_opt(1935, 10, 17).unwrap());
        assert!(patient.gender == 0 || patient.gender == 1);
    }

    store.close().await;
    Ok(())
}

#[tokio::test]
async fn areas_fail_without_facilities() -> anyhow::Result<()> {
    let temp = TempStore::new()?;
    let store = temp.connect().await?;
    let plan = SeedPlan::default().with(Step::Facilities, CountRange::exactly(0));

    let err = Seeder::new(&store, plan, Some(3), today())?.run().await.unwrap_err();
    assert!(matches!(
        err,
        SeedError::MissingParents { step: Step::Areas, parent: "FACILITY" }
    ));
    for table in schema::TABLES.iter() {
        assert_eq!(repository::count(&store, table).await?, 0);
    }

    store.close().await;
    Ok(())
}

#[tokio::test]
async fn earlier_steps_stay_committed_after_a_failure() -> anyhow::Result<()> {
    let temp = TempStore::new()?;
    let store = temp.connect().await?;
    let plan = SeedPlan::uniform(CountRange::exactly(10)).with(Step::Rooms, CountRange::exactly(0));

    let err = Seeder::new(&store, plan, Some(4), today())?.run().await.unwrap_err();
    assert!(matches!(
        err,
        SeedError::MissingParents { step: Step::Appointments, parent: "ROOM" }
    ));
    assert_eq!(repository::count(&store, &schema::PATIENT).await?, 10);
    assert_eq!(repository::count(&store, &schema::APPOINTMENT).await?, 0);
    assert_eq!(repository::count(&store, &schema::APP_USER).await?, 0);

    store.close().await;
    Ok(())
}

#[tokio::test]
async fn role_outside_enumeration_is_rejected_by_the_store() -> anyhow::Result<()> {
    let temp = TempStore::new()?;
    let store = temp.connect().await?;
    Seeder::new(&store, SeedPlan::uniform(CountRange::exactly(2)), Some(8), today())?
        .run()
        .await?;

    let id = repository::app_user_ids(&store).await?[0];
    let err = repository::set_user_role(&store, id, Some("nurse")).await.unwrap_err();
    assert!(err.is_constraint(), "{:?}", err);

    let raw = sqlx::query("UPDATE APP_USER SET ROLE = 'nurse' WHERE ID = ?")
        .bind(id.0)
        .execute(store.pool())
        .await
        .map_err(DbError::from)
        .unwrap_err();
    assert!(matches!(raw, DbError::ConstraintViolation(_)));

    store.close().await;
    Ok(())
}

#[tokio::test]
async fn run_closes_the_store_and_reports_config_errors() -> anyhow::Result<()> {
    let temp = TempStore::new()?;
    let mut config = SeedConfig::new(temp.config.database_url.clone());
    config.plan = SeedPlan::uniform(CountRange::exactly(3));
    config.rng_seed = Some(21);

    let report = clinic_seed::run(&config).await?;
    assert_eq!(report.inserted(Step::Patients), Some(3));

    // a conexão anterior foi liberada; uma nova enxerga os dados gravados
    let store = temp.connect().await?;
    assert_eq!(repository::count(&store, &schema::PATIENT).await?, 3);
    let created = repository::find_facility(&store, repository::facility_ids(&store).await?[0]).await?;
    assert!(created.created_at <= Utc::now());
    store.close().await;

    let err = SeedConfig::from_lookup(|_| None).unwrap_err();
    assert!(matches!(err, SeedError::InvalidConfig(_)));
    Ok(())
}
