//! Configuration validation.
//!
//! Validates all config fields before any provider is built.

use crate::domain::error::DashboardError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    validate_provider(config)?;
    validate_refresh(config)?;
    validate_fetch(config)?;
    validate_screener(config)?;
    validate_world_indices(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> DashboardError {
    DashboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_provider(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    let kind = config
        .get_string("provider", "kind")
        .unwrap_or_else(|| "synthetic".to_string());

    match kind.trim().to_lowercase().as_str() {
        "synthetic" => {
            let volatility = config.get_double("provider", "daily_volatility", 0.015);
            if volatility <= 0.0 || volatility >= 1.0 {
                return Err(invalid(
                    "provider",
                    "daily_volatility",
                    "daily_volatility must be between 0 and 1",
                ));
            }
        }
        "csv" => match config.get_string("provider", "data_dir") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(DashboardError::ConfigMissing {
                    section: "provider".to_string(),
                    key: "data_dir".to_string(),
                });
            }
        },
        _ => {
            return Err(invalid(
                "provider",
                "kind",
                "kind must be 'csv' or 'synthetic'",
            ));
        }
    }

    if let Some(s) = config.get_string("provider", "end_date") {
        parse_date(&s, "provider", "end_date")?;
    }
    Ok(())
}

pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(section, key, "invalid date format, expected YYYY-MM-DD"))
}

fn validate_refresh(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    if config.get_int("refresh", "interval_secs", 60) <= 0 {
        return Err(invalid(
            "refresh",
            "interval_secs",
            "interval_secs must be positive",
        ));
    }
    Ok(())
}

fn validate_fetch(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    if config.get_int("fetch", "workers", 4) < 1 {
        return Err(invalid("fetch", "workers", "workers must be at least 1"));
    }
    if config.get_int("fetch", "timeout_ms", 5000) <= 0 {
        return Err(invalid("fetch", "timeout_ms", "timeout_ms must be positive"));
    }
    Ok(())
}

fn validate_screener(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    if config.get_double("screener", "min_market_cap_bn", 0.0) < 0.0 {
        return Err(invalid(
            "screener",
            "min_market_cap_bn",
            "min_market_cap_bn must be non-negative",
        ));
    }
    if config.get_double("screener", "min_dividend_yield", 0.0) < 0.0 {
        return Err(invalid(
            "screener",
            "min_dividend_yield",
            "min_dividend_yield must be non-negative",
        ));
    }
    if config.get_string("screener", "max_volatility_pct").is_some()
        && config.get_double("screener", "max_volatility_pct", -1.0) <= 0.0
    {
        return Err(invalid(
            "screener",
            "max_volatility_pct",
            "max_volatility_pct must be a positive number",
        ));
    }
    Ok(())
}

/// Parses `NAME=SYMBOL, NAME=SYMBOL` pairs.
pub fn parse_index_list(input: &str) -> Result<Vec<(String, String)>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| match token.split_once('=') {
            Some((name, symbol)) if !name.trim().is_empty() && !symbol.trim().is_empty() => {
                Ok((name.trim().to_string(), symbol.trim().to_string()))
            }
            _ => Err(format!("expected NAME=SYMBOL, got '{}'", token)),
        })
        .collect()
}

fn validate_world_indices(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    if let Some(list) = config.get_string("overview", "world_indices") {
        parse_index_list(&list).map_err(|e| invalid("overview", "world_indices", &e))?;
    }
    Ok(())
}
