//! Configuração do seed a partir de variáveis de ambiente

use chrono::{FixedOffset, Offset, Utc};
use clinic_db::DbConfig;
use tracing::warn;

use crate::error::SeedError;
use crate::plan::{CountRange, SeedPlan};

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub db: DbConfig,
    /// Fuso usado para calcular "hoje" (idade dos pacientes)
    pub timezone: FixedOffset,
    pub plan: SeedPlan,
    /// Semente do gerador; ausente, cada execução produz dados diferentes
    pub rng_seed: Option<u64>,
}

impl SeedConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            db: DbConfig::new(database_url),
            timezone: utc_offset(),
            plan: SeedPlan::default(),
            rng_seed: None,
        }
    }

    pub fn from_env() -> Result<Self, SeedError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lê a configuração de uma fonte qualquer de pares chave/valor
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| SeedError::InvalidConfig("DATABASE_URL não definida".to_string()))?;
        let mut config = Self::new(database_url);

        if let Some(max) = get("DB_MAX_CONNECTIONS") {
            config.db.max_connections = parse_number("DB_MAX_CONNECTIONS", &max)?;
        }

        if let Some(tz) = get("TZ") {
            config.timezone = parse_timezone(&tz).unwrap_or_else(|| {
                warn!("TZ '{}' não reconhecido, usando UTC", tz);
                utc_offset()
            });
        }

        let min = match get("SEED_MIN_ROWS") {
            Some(v) => parse_number("SEED_MIN_ROWS", &v)?,
            None => CountRange::DEFAULT_MIN,
        };
        let max = match get("SEED_MAX_ROWS") {
            Some(v) => parse_number("SEED_MAX_ROWS", &v)?,
            None => CountRange::DEFAULT_MAX,
        };
        config.plan = SeedPlan::uniform(CountRange::new(min, max)?);

        if let Some(seed) = get("SEED_RNG_SEED") {
            config.rng_seed = Some(parse_number("SEED_RNG_SEED", &seed)?);
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SeedError> {
    value
        .parse()
        .map_err(|_| SeedError::InvalidConfig(format!("{} inválido: '{}'", key, value)))
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Aceita `UTC`, `Z` ou deslocamento fixo `±HH:MM` / `±HHMM` / `±HH`.
///
/// Nomes IANA (`America/Sao_Paulo`) não são resolvidos: retornam `None`.
pub fn parse_timezone(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if ["utc", "z", "gmt"].iter().any(|name| value.eq_ignore_ascii_case(name)) {
        return Some(utc_offset());
    }

    let value = value.strip_prefix("UTC").unwrap_or(value);
    let (sign, digits) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.len() > 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
