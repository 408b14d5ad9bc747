//! Geração de valores sintéticos por entidade
//!
//! Funções puras sobre um `Rng`: recebem as chaves dos pais já gravados e
//! devolvem as linhas do lote. Strings respeitam o tamanho das colunas.

use std::collections::HashSet;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use chrono::{DateTime, Duration, Months, NaiveDate, TimeZone, Utc};
use clinic_db::models::*;
use clinic_db::schema::{self, TableDef};
use fake::faker::address::en::{BuildingNumber, StreetName};
use fake::faker::company::en::Bs;
use fake::faker::internet::en::{Password, SafeEmail, Username};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};
use uuid::Builder;

use crate::assets::{AREAS, HOSPITALS};
use crate::error::SeedError;
use crate::plan::Step;

/// Consultas começam entre 2024-03-15 e 2026-01-01 (UTC)
pub const APPOINTMENT_WINDOW_START: i64 = 1_710_460_800;
pub const APPOINTMENT_WINDOW_END: i64 = 1_767_225_600;
pub const MIN_APPOINTMENT_MINUTES: i64 = 15;
pub const MAX_APPOINTMENT_MINUTES: i64 = 120;
pub const MIN_PATIENT_AGE: u32 = 18;
pub const MAX_PATIENT_AGE: u32 = 90;

const ONE_YEAR_SECS: i64 = 365 * 24 * 60 * 60;

/// Corta o texto no tamanho máximo da coluna
fn fit(table: &TableDef, column: &str, value: String) -> String {
    match table.column(column).and_then(|c| c.max_len()) {
        Some(max) if value.chars().count() > max => value.chars().take(max).collect(),
        _ => value,
    }
}

fn utc(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Instante aleatório no último ano
fn past<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::seconds(rng.gen_range(1..=ONE_YEAR_SECS))
}

fn pick<T: Copy, R: Rng + ?Sized>(
    rng: &mut R,
    ids: &[T],
    step: Step,
    parent: &'static str,
) -> Result<T, SeedError> {
    ids.choose(rng)
        .copied()
        .ok_or(SeedError::MissingParents { step, parent })
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

pub fn facilities<R: Rng + ?Sized>(rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<NewFacility> {
    let mut names: Vec<&str> = HOSPITALS.to_vec();
    names.shuffle(rng);

    (0..count)
        .map(|i| {
            let name = names
                .pop()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Hospital {}", i + 1));
            let description: String = Bs().fake_with_rng(rng);
            NewFacility {
                name,
                description: fit(&schema::FACILITY, "DESCRIPTION", description),
                created_at: Some(past(rng, now)),
            }
        })
        .collect()
}

/// Áreas com nome único por instalação.
///
/// `taken` traz os pares (instalação, nome) já gravados e recebe os gerados.
/// Um nome repetido na mesma instalação ganha um sufixo aleatório.
pub fn areas<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    facility_ids: &[FacilityId],
    taken: &mut HashSet<(FacilityId, String)>,
    now: DateTime<Utc>,
) -> Result<Vec<NewArea>, SeedError> {
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        let facility_id = pick(rng, facility_ids, Step::Areas, "FACILITY")?;
        let base = AREAS.choose(rng).copied().unwrap_or("Clínica Médica");

        let mut name = base.to_string();
        while taken.contains(&(facility_id, name.clone())) {
            name = format!("{}-{}", base, random_suffix(rng));
        }
        taken.insert((facility_id, name.clone()));

        let description: String = Sentence(4..12).fake_with_rng(rng);
        rows.push(NewArea {
            facility_id,
            name: fit(&schema::AREA, "NAME", name),
            description: fit(&schema::AREA, "DESCRIPTION", description),
            created_at: Some(past(rng, now)),
        });
    }
    Ok(rows)
}

pub fn doctors<R: Rng + ?Sized>(rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<NewDoctor> {
    (0..count)
        .map(|_| {
            let phone: String = PhoneNumber().fake_with_rng(rng);
            NewDoctor {
                first_name: fit(&schema::DOCTOR, "FIRST_NAME", FirstName().fake_with_rng(rng)),
                last_name: fit(&schema::DOCTOR, "LAST_NAME", LastName().fake_with_rng(rng)),
                phone: Some(fit(&schema::DOCTOR, "PHONE", phone)),
                email: SafeEmail().fake_with_rng(rng),
                created_at: Some(past(rng, now)),
            }
        })
        .collect()
}

/// Vínculos médico ↔ área distintos entre si e dos já gravados.
///
/// A quantidade é limitada pelo número de pares livres.
pub fn doctor_area_links<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    doctor_ids: &[DoctorId],
    area_ids: &[AreaId],
    existing: &HashSet<DoctorFacility>,
) -> Result<Vec<DoctorFacility>, SeedError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if doctor_ids.is_empty() {
        return Err(SeedError::MissingParents {
            step: Step::DoctorAreas,
            parent: "DOCTOR",
        });
    }
    if area_ids.is_empty() {
        return Err(SeedError::MissingParents {
            step: Step::DoctorAreas,
            parent: "AREA",
        });
    }

    let total = doctor_ids.len() * area_ids.len();
    let free_at_least = total.saturating_sub(existing.len());

    if count * 2 <= free_at_least {
        // poucos pares em relação aos livres: sorteio com rejeição
        let mut chosen: HashSet<DoctorFacility> = HashSet::with_capacity(count);
        let mut links = Vec::with_capacity(count);
        while links.len() < count {
            let link = DoctorFacility::new(
                pick(rng, area_ids, Step::DoctorAreas, "AREA")?,
                pick(rng, doctor_ids, Step::DoctorAreas, "DOCTOR")?,
            );
            if !existing.contains(&link) && chosen.insert(link) {
                links.push(link);
            }
        }
        return Ok(links);
    }

    let free: Vec<DoctorFacility> = area_ids
        .iter()
        .flat_map(|&area| doctor_ids.iter().map(move |&doctor| DoctorFacility::new(area, doctor)))
        .filter(|link| !existing.contains(link))
        .collect();
    Ok(free.choose_multiple(rng, count).copied().collect())
}

/// Salas com nomes `Room N` únicos na tabela inteira.
///
/// `taken` traz os nomes já gravados e recebe os gerados.
pub fn rooms<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    area_ids: &[AreaId],
    taken: &mut HashSet<String>,
    now: DateTime<Utc>,
) -> Result<Vec<NewRoom>, SeedError> {
    let mut rows = Vec::with_capacity(count);
    let mut next = 0usize;
    for _ in 0..count {
        let area_id = pick(rng, area_ids, Step::Rooms, "AREA")?;
        let name = loop {
            let candidate = format!("Room {}", next);
            next += 1;
            if taken.insert(candidate.clone()) {
                break candidate;
            }
        };
        let description: String = Sentence(3..10).fake_with_rng(rng);
        rows.push(NewRoom {
            area_id,
            name,
            description: Some(fit(&schema::ROOM, "DESCRIPTION", description)),
            created_at: Some(past(rng, now)),
        });
    }
    Ok(rows)
}

/// Data de nascimento para uma idade entre 18 e 90 anos em `today`
pub fn birth_date<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let latest = today
        .checked_sub_months(Months::new(MIN_PATIENT_AGE * 12))
        .unwrap_or(today);
    let earliest = today
        .checked_sub_months(Months::new((MAX_PATIENT_AGE + 1) * 12))
        .map(|d| d + Duration::days(1))
        .unwrap_or(latest);
    let span = (latest - earliest).num_days().max(0);
    earliest + Duration::days(rng.gen_range(0..=span))
}

pub fn patients<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<NewPatient> {
    (0..count)
        .map(|_| {
            let phone: String = PhoneNumber().fake_with_rng(rng);
            let number: String = BuildingNumber().fake_with_rng(rng);
            let street: String = StreetName().fake_with_rng(rng);
            NewPatient {
                first_name: fit(&schema::PATIENT, "FIRST_NAME", FirstName().fake_with_rng(rng)),
                last_name: fit(&schema::PATIENT, "LAST_NAME", LastName().fake_with_rng(rng)),
                date_of_birth: birth_date(rng, today),
                gender: rng.gen_range(0..=1),
                phone: Some(fit(&schema::PATIENT, "PHONE", phone)),
                email: SafeEmail().fake_with_rng(rng),
                address: Some(fit(&schema::PATIENT, "ADDRESS", format!("{} {}", number, street))),
                created_at: Some(past(rng, now)),
            }
        })
        .collect()
}

/// Consultas com início na janela fixa e duração de 15 a 120 minutos
pub fn appointments<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    patient_ids: &[PatientId],
    doctor_ids: &[DoctorId],
    room_ids: &[RoomId],
) -> Result<Vec<NewAppointment>, SeedError> {
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        let patient_id = pick(rng, patient_ids, Step::Appointments, "PATIENT")?;
        let doctor_id = pick(rng, doctor_ids, Step::Appointments, "DOCTOR")?;
        let room_id = pick(rng, room_ids, Step::Appointments, "ROOM")?;

        let start_time = utc(rng.gen_range(APPOINTMENT_WINDOW_START..APPOINTMENT_WINDOW_END));
        let minutes = rng.gen_range(MIN_APPOINTMENT_MINUTES..=MAX_APPOINTMENT_MINUTES);
        let status = AppointmentStatus::ALL[rng.gen_range(0..AppointmentStatus::ALL.len())];
        let description: String = Sentence(3..12).fake_with_rng(rng);

        rows.push(NewAppointment {
            patient_id,
            doctor_id,
            room_id,
            start_time,
            end_time: start_time + Duration::minutes(minutes),
            status,
            description: Some(fit(&schema::APPOINTMENT, "DESCRIPTION", description)),
        });
    }
    Ok(rows)
}

/// Hash Argon2id com parâmetros leves: as senhas são sintéticas e o lote
/// tem até centenas de usuários
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    const MEMORY_KIB: u32 = 256;

    pub fn new() -> Result<Self, SeedError> {
        let params = Params::new(Self::MEMORY_KIB, 1, 1, None)
            .map_err(|e| SeedError::Credential(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash<R: Rng + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
        password: &str,
    ) -> Result<String, SeedError> {
        let salt = SaltString::generate(rng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SeedError::Credential(e.to_string()))
    }
}

pub fn app_users<R: Rng + CryptoRng + ?Sized>(
    rng: &mut R,
    count: usize,
    hasher: &CredentialHasher,
    now: DateTime<Utc>,
) -> Result<Vec<NewAppUser>, SeedError> {
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        let password: String = Password(8..20).fake_with_rng(rng);
        let username: String = Username().fake_with_rng(rng);
        rows.push(NewAppUser {
            username: fit(&schema::APP_USER, "USERNAME", username),
            email: SafeEmail().fake_with_rng(rng),
            password_hash: hasher.hash(rng, &password)?,
            role: Some(UserRole::ALL[rng.gen_range(0..UserRole::ALL.len())]),
            is_active: rng.gen_bool(0.5),
            created_at: Some(past(rng, now)),
        });
    }
    Ok(rows)
}
