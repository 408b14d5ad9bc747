//! Etapas do seed e quantidade de registros por etapa

use std::collections::HashMap;
use std::fmt;

use clinic_db::schema::{self, TableDef};
use rand::Rng;

use crate::error::SeedError;

/// Uma etapa do seed: um lote inserido numa tabela
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    Facilities,
    Areas,
    Doctors,
    DoctorAreas,
    Rooms,
    Patients,
    Appointments,
    AppUsers,
}

impl Step {
    /// Ordem de execução. Cada etapa só roda depois das tabelas que ela
    /// referencia.
    pub const ORDER: [Step; 8] = [
        Step::Facilities,
        Step::Areas,
        Step::Doctors,
        Step::DoctorAreas,
        Step::Rooms,
        Step::Patients,
        Step::Appointments,
        Step::AppUsers,
    ];

    pub fn table(&self) -> &'static TableDef {
        match self {
            Step::Facilities => &schema::FACILITY,
            Step::Areas => &schema::AREA,
            Step::Doctors => &schema::DOCTOR,
            Step::DoctorAreas => &schema::DOCTOR_FACILITY,
            Step::Rooms => &schema::ROOM,
            Step::Patients => &schema::PATIENT,
            Step::Appointments => &schema::APPOINTMENT,
            Step::AppUsers => &schema::APP_USER,
        }
    }

    /// Nome usado nos logs
    pub fn label(&self) -> &'static str {
        match self {
            Step::Facilities => "instalações",
            Step::Areas => "áreas",
            Step::Doctors => "médicos",
            Step::DoctorAreas => "vínculos médico-área",
            Step::Rooms => "salas",
            Step::Patients => "pacientes",
            Step::Appointments => "consultas",
            Step::AppUsers => "usuários",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table().name)
    }
}

/// Intervalo fechado de quantidades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    min: usize,
    max: usize,
}

impl CountRange {
    pub const DEFAULT_MIN: usize = 50;
    pub const DEFAULT_MAX: usize = 150;

    pub fn new(min: usize, max: usize) -> Result<Self, SeedError> {
        if min > max {
            return Err(SeedError::InvalidConfig(format!(
                "intervalo de quantidade inválido: mínimo {} maior que máximo {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn exactly(count: usize) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for CountRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Quantidade de registros por etapa
#[derive(Debug, Clone, Default)]
pub struct SeedPlan {
    default: CountRange,
    overrides: HashMap<Step, CountRange>,
}

impl SeedPlan {
    /// Mesmo intervalo para todas as etapas
    pub fn uniform(range: CountRange) -> Self {
        Self {
            default: range,
            overrides: HashMap::new(),
        }
    }

    /// Substitui o intervalo de uma etapa
    pub fn with(mut self, step: Step, range: CountRange) -> Self {
        self.overrides.insert(step, range);
        self
    }

    pub fn range(&self, step: Step) -> CountRange {
        self.overrides.get(&step).copied().unwrap_or(self.default)
    }
}
