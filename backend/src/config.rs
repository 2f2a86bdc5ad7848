use anyhow::{anyhow, bail, Context};
use chrono_tz::Tz;
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use crate::services::token_store::MIN_TOKEN_BYTES;
use crate::types::TokenTtl;

/// How the transport hands a consumed check-in to the attendance sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkDelivery {
    /// Respond only after the sink accepted the record; sink failures reach the caller.
    Awaited,
    /// Respond as soon as the token is consumed; sink failures are only logged.
    Background,
}

impl FromStr for SinkDelivery {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awaited" => Ok(SinkDelivery::Awaited),
            "background" => Ok(SinkDelivery::Background),
            other => Err(anyhow!("Invalid SINK_DELIVERY value: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub token_ttl: TokenTtl,
    pub token_bytes: usize,
    /// Zero disables the background sweeper.
    pub sweep_interval_seconds: u64,
    pub time_zone: Tz,
    pub attendance_log_path: Option<PathBuf>,
    pub sink_delivery: SinkDelivery,
    pub consume_on_validate: bool,
    pub cors_allow_origins: Vec<String>,
    pub cors_allow_credentials: bool,
    pub public_base_url: Option<String>,
    /// Zero disables per-IP rate limiting of check-in routes.
    pub rate_limit_check_in_max_requests: u32,
    pub rate_limit_check_in_window_seconds: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("Invalid BIND_ADDR value")?;

        let ttl_secs: i64 = parse_or("TOKEN_TTL_SECONDS", var("TOKEN_TTL_SECONDS"), 30)?;
        let token_ttl = TokenTtl::from_secs(ttl_secs).context("Invalid TOKEN_TTL_SECONDS value")?;

        let token_bytes: usize = parse_or("TOKEN_BYTES", var("TOKEN_BYTES"), MIN_TOKEN_BYTES)?;
        if token_bytes < MIN_TOKEN_BYTES {
            bail!(
                "TOKEN_BYTES must be at least {} (128 bits), got {}",
                MIN_TOKEN_BYTES,
                token_bytes
            );
        }

        let sweep_interval_seconds =
            parse_or("SWEEP_INTERVAL_SECONDS", var("SWEEP_INTERVAL_SECONDS"), 60)?;

        let time_zone_name = var("APP_TIMEZONE").unwrap_or_else(|| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let attendance_log_path = var("ATTENDANCE_LOG_PATH").map(PathBuf::from);

        let sink_delivery = match var("SINK_DELIVERY") {
            Some(raw) => raw.parse()?,
            None => SinkDelivery::Awaited,
        };

        let consume_on_validate =
            parse_bool("CONSUME_ON_VALIDATE", var("CONSUME_ON_VALIDATE"), true)?;

        let cors_allow_origins = parse_origins(var("CORS_ALLOW_ORIGINS"));
        let cors_allow_credentials =
            parse_bool("CORS_ALLOW_CREDENTIALS", var("CORS_ALLOW_CREDENTIALS"), false)?;
        if cors_allow_credentials && cors_allow_origins.iter().any(|o| o == "*") {
            bail!("CORS_ALLOW_CREDENTIALS cannot be combined with a wildcard CORS_ALLOW_ORIGINS");
        }

        let public_base_url = var("PUBLIC_BASE_URL").map(|url| url.trim().to_string());

        let rate_limit_check_in_max_requests = parse_or(
            "RATE_LIMIT_CHECKIN_MAX_REQUESTS",
            var("RATE_LIMIT_CHECKIN_MAX_REQUESTS"),
            20,
        )?;
        let rate_limit_check_in_window_seconds = parse_or(
            "RATE_LIMIT_CHECKIN_WINDOW_SECONDS",
            var("RATE_LIMIT_CHECKIN_WINDOW_SECONDS"),
            60,
        )?;

        Ok(Config {
            bind_addr,
            token_ttl,
            token_bytes,
            sweep_interval_seconds,
            time_zone,
            attendance_log_path,
            sink_delivery,
            consume_on_validate,
            cors_allow_origins,
            cors_allow_credentials,
            public_base_url,
            rate_limit_check_in_max_requests,
            rate_limit_check_in_window_seconds,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value)),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: Option<String>, default: bool) -> anyhow::Result<bool> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("Invalid {} value: {}", key, value)),
    }
}

fn parse_origins(raw: Option<String>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_else(|| "*".to_string())
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();
    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}
