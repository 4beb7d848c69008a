use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub db: u8,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoyaltySettings {
    pub points_per_unit: Decimal,
    pub units_per_point: Decimal,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub run_migrations: bool,
    pub metric_port: u16,
    pub otel_endpoint: String,
    pub redis: RedisSettings,
    pub loyalty: LoyaltySettings,
    pub db_max_conn: u32,
    pub db_min_conn: u32,
    pub is_dev: bool,
    pub enable_file_log: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("Missing environment variable: DATABASE_URL")?;

        let run_migrations = parse_flag("RUN_MIGRATIONS", false)?;
        let is_dev = parse_flag("DEV_MODE", false)?;
        let enable_file_log = parse_flag("ENABLE_FILE_LOG", false)?;

        let metric_port = std::env::var("ORDER_METRIC_PORT")
            .context("Missing environment variable: ORDER_METRIC_PORT")?
            .parse::<u16>()
            .context("ORDER_METRIC_PORT must be a valid u16 integer")?;

        let otel_endpoint = std::env::var("OTEL_ENDPOINT")
            .unwrap_or_else(|_| "http://otel-collector:4317".to_string());

        let db_max_conn: u32 = std::env::var("DB_MAX_CONNECTION")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("Unable to parse DB_MAX_CONNECTION as u32")?;

        let db_min_conn: u32 = std::env::var("DB_MIN_CONNECTION")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .context("Unable to parse DB_MIN_CONNECTION as u32")?;

        // redis
        let redis_host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "redis".to_string());

        let redis_port = std::env::var("REDIS_PORT")
            .unwrap_or_else(|_| "6379".to_string())
            .parse::<u16>()
            .context("REDIS_PORT must be a valid u16 integer")?;

        let redis_db = std::env::var("REDIS_DB")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u8>()
            .context("REDIS_DB must be a valid u8 integer")?;

        let redis_password = std::env::var("REDIS_PASSWORD")
            .ok()
            .filter(|pw| !pw.is_empty());

        // loyalty
        let points_per_unit = parse_rate("LOYALTY_POINTS_PER_UNIT")?;
        let units_per_point = parse_rate("LOYALTY_UNITS_PER_POINT")?;

        Ok(Self {
            database_url,
            run_migrations,
            metric_port,
            otel_endpoint,
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            loyalty: LoyaltySettings {
                points_per_unit,
                units_per_point,
            },
            db_max_conn,
            db_min_conn,
            is_dev,
            enable_file_log,
        })
    }
}

fn parse_flag(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(anyhow!("{name} must be 'true' or 'false', got '{other}'")),
        },
    }
}

fn parse_rate(name: &str) -> Result<Decimal> {
    let raw = std::env::var(name).unwrap_or_else(|_| "1".to_string());

    let rate = Decimal::from_str(raw.trim())
        .with_context(|| format!("Unable to parse {name} as a decimal"))?;

    if rate.is_sign_negative() {
        return Err(anyhow!("{name} must not be negative, got '{raw}'"));
    }

    Ok(rate)
}
