//! Execução do seed: uma etapa por tabela, em sequência
//!
//! Cada etapa relê do banco as chaves dos pais, sorteia a quantidade,
//! gera os valores e grava tudo num único lote. Uma etapa que falha
//! interrompe a execução; as anteriores permanecem gravadas.

use std::collections::HashSet;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clinic_db::{repository, Store};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::SeedConfig;
use crate::error::SeedError;
use crate::generators::{self, CredentialHasher};
use crate::plan::{SeedPlan, Step};

/// Linhas inseridas por etapa concluída
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    steps: Vec<(Step, u64)>,
}

impl SeedReport {
    pub fn record(&mut self, step: Step, inserted: u64) {
        self.steps.push((step, inserted));
    }

    pub fn inserted(&self, step: Step) -> Option<u64> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, n)| *n)
    }

    pub fn total(&self) -> u64 {
        self.steps.iter().map(|(_, n)| n).sum()
    }

    pub fn steps(&self) -> &[(Step, u64)] {
        &self.steps
    }
}

pub struct Seeder<'s> {
    store: &'s Store,
    plan: SeedPlan,
    rng: StdRng,
    today: NaiveDate,
    hasher: CredentialHasher,
}

impl<'s> Seeder<'s> {
    pub fn new(
        store: &'s Store,
        plan: SeedPlan,
        rng_seed: Option<u64>,
        today: NaiveDate,
    ) -> Result<Self, SeedError> {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            store,
            plan,
            rng,
            today,
            hasher: CredentialHasher::new()?,
        })
    }

    /// Executa todas as etapas na ordem de dependência
    pub async fn run(mut self) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        for step in Step::ORDER {
            let wanted = self.plan.range(step).sample(&mut self.rng);
            let inserted = self.run_step(step, wanted).await?;
            info!(table = %step, "{} {} inseridos", inserted, step.label());
            report.record(step, inserted);
        }
        Ok(report)
    }

    /// Insere até `count` linhas na tabela da etapa. Quantidade zero não
    /// toca no banco.
    pub async fn run_step(&mut self, step: Step, count: usize) -> Result<u64, SeedError> {
        if count == 0 {
            return Ok(0);
        }
        let store = self.store;
        let rng = &mut self.rng;
        let now = Utc::now();

        match step {
            Step::Facilities => {
                let rows = generators::facilities(rng, count, now);
                repository::insert_facilities(store, &rows)
                    .await
                    .map_err(SeedError::at(step))
            }
            Step::Areas => {
                let facility_ids = repository::facility_ids(store).await.map_err(SeedError::at(step))?;
                let mut taken: HashSet<_> = repository::area_names(store)
                    .await
                    .map_err(SeedError::at(step))?
                    .into_iter()
                    .collect();
                debug!("{} instalações disponíveis para áreas", facility_ids.len());
                let rows = generators::areas(rng, count, &facility_ids, &mut taken, now)?;
                repository::insert_areas(store, &rows)
                    .await
                    .map_err(SeedError::at(step))
            }
            Step::Doctors => {
                let rows = generators::doctors(rng, count, now);
                repository::insert_doctors(store, &rows)
                    .await
                    .map_err(SeedError::at(step))
            }
            Step::DoctorAreas => {
                let doctor_ids = repository::doctor_ids(store).await.map_err(SeedError::at(step))?;
                let area_ids = repository::area_ids(store).await.map_err(SeedError::at(step))?;
                let existing: HashSet<_> = repository::doctor_facility_links(store)
                    .await
                    .map_err(SeedError::at(step))?
                    .into_iter()
                    .collect();
                debug!(
                    "{} médicos, {} áreas e {} vínculos existentes",
                    doctor_ids.len(),
                    area_ids.len(),
                    existing.len()
                );
                let links = generators::doctor_area_links(rng, count, &doctor_ids, &area_ids, &existing)?;
                repository::insert_doctor_facilities(store, &links)
                    .await
                    .map_err(SeedError::at(step))
            }
            Step::Rooms => {
                let area_ids = repository::area_ids(store).await.map_err(SeedError::at(step))?;
                let mut taken: HashSet<String> = repository::room_names(store)
                    .await
                    .map_err(SeedError::at(step))?
                    .into_iter()
                    .collect();
                debug!("{} áreas disponíveis para salas", area_ids.len());
                let rows = generators::rooms(rng, count, &area_ids, &mut taken, now)?;
                repository::insert_rooms(store, &rows)
                    .await
                    .map_err(SeedError::at(step))
            }
            Step::Patients => {
                let rows = generators::patients(rng, count, self.today, now);
                repository::insert_patients(store, &rows)
                    .await
                    .map_err(SeedError::at(step))
            }
            Step::Appointments => {
                let patient_ids = repository::patient_ids(store).await.map_err(SeedError::at(step))?;
                let doctor_ids = repository::doctor_ids(store).await.map_err(SeedError::at(step))?;
                let room_ids = repository::room_ids(store).await.map_err(SeedError::at(step))?;
                debug!(
                    "{} pacientes, {} médicos e {} salas disponíveis para consultas",
                    patient_ids.len(),
                    doctor_ids.len(),
                    room_ids.len()
                );
                let rows = generators::appointments(rng, count, &patient_ids, &doctor_ids, &room_ids)?;
                repository::insert_appointments(store, &rows)
                    .await
                    .map_err(SeedError::at(step))
            }
            Step::AppUsers => {
                let rows = generators::app_users(rng, count, &self.hasher, now)?;
                repository::insert_app_users(store, &rows)
                    .await
                    .map_err(SeedError::at(step))
            }
        }
    }
}

/// Conecta, popula e libera a conexão.
///
/// A conexão é fechada tanto no sucesso quanto na falha de uma etapa.
pub async fn run(config: &SeedConfig) -> anyhow::Result<SeedReport> {
    let store = Store::connect(&config.db)
        .await
        .context("Falha ao abrir o banco de dados")?;

    let today = Utc::now().with_timezone(&config.timezone).date_naive();
    info!("Iniciando seed (hoje = {}, fuso {})", today, config.timezone);

    let result = match Seeder::new(&store, config.plan.clone(), config.rng_seed, today) {
        Ok(seeder) => seeder.run().await,
        Err(e) => Err(e),
    };
    store.close().await;

    Ok(result?)
}
