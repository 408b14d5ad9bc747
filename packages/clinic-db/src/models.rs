//! Modelos de dados do esquema da clínica
//!
//! Cada entidade tem uma struct de leitura (linha completa, com chave gerada)
//! e uma struct de criação (`New*`) com os campos informados na inserção.
//! As colunas do banco usam identificadores em maiúsculas; os campos Rust
//! usam snake_case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::error::DbError;
use crate::schema::{APPOINTMENT_STATUSES, USER_ROLES};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Chave de FACILITY
    FacilityId
);
entity_id!(
    /// Chave de AREA
    AreaId
);
entity_id!(
    /// Chave de DOCTOR
    DoctorId
);
entity_id!(
    /// Chave de ROOM
    RoomId
);
entity_id!(
    /// Chave de PATIENT
    PatientId
);
entity_id!(AppointmentId);
entity_id!(AppUserId);

/// Status possíveis de uma consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Consulta agendada (valor padrão)
    #[default]
    Scheduled,
    /// Consulta realizada
    Completed,
    /// Consulta cancelada
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => APPOINTMENT_STATUSES[0],
            AppointmentStatus::Completed => APPOINTMENT_STATUSES[1],
            AppointmentStatus::Cancelled => APPOINTMENT_STATUSES[2],
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DbError::ConstraintViolation(format!(
                    "Valor de STATUS inválido: {} (permitidos: {})",
                    s,
                    APPOINTMENT_STATUSES.join(", ")
                ))
            })
    }
}

/// Perfil de acesso de um usuário da aplicação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Receptionist,
    Doctor,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Receptionist, UserRole::Doctor];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => USER_ROLES[0],
            UserRole::Receptionist => USER_ROLES[1],
            UserRole::Doctor => USER_ROLES[2],
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                DbError::ConstraintViolation(format!(
                    "Valor de ROLE inválido: {} (permitidos: {})",
                    s,
                    USER_ROLES.join(", ")
                ))
            })
    }
}

/// Instalação (hospital, clínica)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Facility {
    #[sqlx(rename = "ID")]
    pub id: FacilityId,
    #[sqlx(rename = "NAME")]
    pub name: String,
    #[sqlx(rename = "DESCRIPTION")]
    pub description: String,
    #[sqlx(rename = "CREATED_AT")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "UPDATED_AT")]
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "DELETED_AT")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFacility {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 320))]
    pub description: String,
    /// Quando ausente, o instante da inserção
    pub created_at: Option<DateTime<Utc>>,
}

/// Área de uma instalação (especialidade, setor)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Area {
    #[sqlx(rename = "ID")]
    pub id: AreaId,
    #[sqlx(rename = "FACILITY_ID")]
    pub facility_id: FacilityId,
    #[sqlx(rename = "NAME")]
    pub name: String,
    #[sqlx(rename = "DESCRIPTION")]
    pub description: String,
    #[sqlx(rename = "CREATED_AT")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "UPDATED_AT")]
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "DELETED_AT")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewArea {
    pub facility_id: FacilityId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 320))]
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    #[sqlx(rename = "ID")]
    pub id: DoctorId,
    #[sqlx(rename = "FIRST_NAME")]
    pub first_name: String,
    #[sqlx(rename = "LAST_NAME")]
    pub last_name: String,
    #[sqlx(rename = "PHONE")]
    pub phone: Option<String>,
    #[sqlx(rename = "EMAIL")]
    pub email: String,
    #[sqlx(rename = "CREATED_AT")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "UPDATED_AT")]
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "DELETED_AT")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDoctor {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email, length(max = 200))]
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Vínculo médico ↔ área (tabela DOCTOR_FACILITY).
///
/// O par identifica o vínculo; não existe chave própria.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, FromRow,
)]
pub struct DoctorFacility {
    #[sqlx(rename = "AREA_ID")]
    pub area_id: AreaId,
    #[sqlx(rename = "DOCTOR_ID")]
    pub doctor_id: DoctorId,
}

impl DoctorFacility {
    pub fn new(area_id: AreaId, doctor_id: DoctorId) -> Self {
        Self { area_id, doctor_id }
    }
}

// Sem campos textuais: nada a validar além das chaves estrangeiras
impl Validate for DoctorFacility {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    #[sqlx(rename = "ID")]
    pub id: RoomId,
    #[sqlx(rename = "AREA_ID")]
    pub area_id: AreaId,
    #[sqlx(rename = "NAME")]
    pub name: String,
    #[sqlx(rename = "DESCRIPTION")]
    pub description: Option<String>,
    #[sqlx(rename = "CREATED_AT")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "DELETED_AT")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRoom {
    pub area_id: AreaId,
    /// Único entre todas as salas, não apenas na área
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 300))]
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    #[sqlx(rename = "ID")]
    pub id: PatientId,
    #[sqlx(rename = "FIRST_NAME")]
    pub first_name: String,
    #[sqlx(rename = "LAST_NAME")]
    pub last_name: String,
    #[sqlx(rename = "DATE_OF_BIRTH")]
    pub date_of_birth: NaiveDate,
    #[sqlx(rename = "GENDER")]
    pub gender: i32,
    #[sqlx(rename = "PHONE")]
    pub phone: Option<String>,
    #[sqlx(rename = "EMAIL")]
    pub email: String,
    #[sqlx(rename = "ADDRESS")]
    pub address: Option<String>,
    #[sqlx(rename = "CREATED_AT")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "UPDATED_AT")]
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "DELETED_AT")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPatient {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    /// Código numérico de um dígito: 0 ou 1
    #[validate(range(min = 0, max = 1))]
    pub gender: i32,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email, length(max = 150))]
    pub email: String,
    #[validate(length(max = 250))]
    pub address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Consulta. Não tem datas de controle nem remoção lógica.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    #[sqlx(rename = "ID")]
    pub id: AppointmentId,
    #[sqlx(rename = "PATIENT_ID")]
    pub patient_id: PatientId,
    #[sqlx(rename = "DOCTOR_ID")]
    pub doctor_id: DoctorId,
    #[sqlx(rename = "ROOM_ID")]
    pub room_id: RoomId,
    #[sqlx(rename = "START_TIME")]
    pub start_time: DateTime<Utc>,
    #[sqlx(rename = "END_TIME")]
    pub end_time: DateTime<Utc>,
    #[sqlx(rename = "STATUS")]
    pub status: AppointmentStatus,
    #[sqlx(rename = "DESCRIPTION")]
    pub description: Option<String>,
}

impl Appointment {
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_time_range", skip_on_field_errors = false))]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub room_id: RoomId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

fn validate_time_range(appointment: &NewAppointment) -> Result<(), ValidationError> {
    if appointment.end_time <= appointment.start_time {
        return Err(ValidationError::new("end_time_not_after_start_time"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppUser {
    #[sqlx(rename = "ID")]
    pub id: AppUserId,
    #[sqlx(rename = "USERNAME")]
    pub username: String,
    #[sqlx(rename = "EMAIL")]
    pub email: String,
    #[sqlx(rename = "PASSWORD_HASH")]
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(rename = "ROLE")]
    pub role: Option<UserRole>,
    #[sqlx(rename = "IS_ACTIVE")]
    pub is_active: bool,
    #[sqlx(rename = "CREATED_AT")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "UPDATED_AT")]
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "DELETED_AT")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAppUser {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub password_hash: String,
    pub role: Option<UserRole>,
    /// Usuários nascem inativos
    #[serde(default)]
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_outside_enumeration_is_rejected() {
        let err = "nurse".parse::<UserRole>().unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
        assert_eq!("receptionist".parse::<UserRole>().unwrap(), UserRole::Receptionist);
    }

    #[test]
    fn status_defaults_to_scheduled() {
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Scheduled);
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
        assert!("canceled".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn appointment_must_end_after_start() {
        let start = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        let mut appointment = NewAppointment {
            patient_id: PatientId(1),
            doctor_id: DoctorId(1),
            room_id: RoomId(1),
            start_time: start,
            end_time: start,
            status: AppointmentStatus::Scheduled,
            description: None,
        };
        assert!(appointment.validate().is_err());

        appointment.end_time = start + chrono::Duration::minutes(15);
        assert!(appointment.validate().is_ok());
    }

    #[test]
    fn patient_gender_is_zero_or_one() {
        let mut patient = NewPatient {
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 17).unwrap(),
            gender: 2,
            phone: None,
            email: "ana.souza@example.com".to_string(),
            address: None,
            created_at: None,
        };
        assert!(patient.validate().is_err());
        patient.gender = 1;
        assert!(patient.validate().is_ok());
    }

    #[test]
    fn length_limits_follow_columns() {
        let doctor = NewDoctor {
            first_name: "Carlos".to_string(),
            last_name: "Lima".to_string(),
            phone: Some("1".repeat(21)),
            email: "carlos@example.com".to_string(),
            created_at: None,
        };
        let errors = doctor.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
        let err: DbError = errors.into();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
    }
}
