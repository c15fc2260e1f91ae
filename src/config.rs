use std::env;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub dispatch_queue_size: usize,
    pub subscriber_buffer_size: usize,
    pub notify_concurrency: usize,
    pub notify_backlog: usize,
    pub notify_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) => parse_log_format(&raw)?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            dispatch_queue_size: parse_nonzero("DISPATCH_QUEUE_SIZE", 1024)?,
            subscriber_buffer_size: parse_nonzero("SUBSCRIBER_BUFFER_SIZE", 64)?,
            notify_concurrency: parse_nonzero("NOTIFY_CONCURRENCY", 16)?,
            notify_backlog: parse_nonzero("NOTIFY_BACKLOG", 1024)?,
            notify_timeout_ms: parse_or_default("NOTIFY_TIMEOUT_MS", 5000)?,
        })
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "compact" | "" => Ok(LogFormat::Compact),
        "json" => Ok(LogFormat::Json),
        other => Err(AppError::Internal(format!(
            "invalid LOG_FORMAT: {other}, expected compact/json"
        ))),
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

// tokio channels and semaphores panic on a zero capacity
fn parse_nonzero(key: &str, default: usize) -> Result<usize, AppError> {
    let value = parse_or_default(key, default)?;
    if value == 0 {
        return Err(AppError::Internal(format!("invalid {key}: must be > 0")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{parse_log_format, LogFormat};

    #[test]
    fn log_format_is_case_insensitive() {
        assert_eq!(parse_log_format("JSON").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format(" compact ").unwrap(), LogFormat::Compact);
        assert!(parse_log_format("xml").is_err());
    }
}
