//! Clinic Seed - Popula o esquema da clínica com dados sintéticos
//!
//! As tabelas são preenchidas em ordem de dependência (instalações, áreas,
//! médicos, vínculos médico-área, salas, pacientes, consultas e usuários),
//! cada uma com uma quantidade sorteada e um único lote de inserção.

pub mod assets;
pub mod config;
pub mod error;
pub mod generators;
pub mod plan;
pub mod seed;

pub use config::SeedConfig;
pub use error::SeedError;
pub use plan::{CountRange, SeedPlan, Step};
pub use seed::{run, SeedReport, Seeder};
