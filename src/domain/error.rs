//! Domain error types.

/// Top-level error type for cac40dash.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("provider unavailable for {symbol}: {reason}")]
    ProviderUnavailable { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("catalog error: {reason}")]
    Catalog { reason: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DashboardError> for std::process::ExitCode {
    fn from(err: &DashboardError) -> Self {
        let code: u8 = match err {
            DashboardError::Io(_) | DashboardError::Export { .. } => 1,
            DashboardError::ConfigParse { .. }
            | DashboardError::ConfigMissing { .. }
            | DashboardError::ConfigInvalid { .. } => 2,
            DashboardError::ProviderUnavailable { .. } => 3,
            DashboardError::Catalog { .. } | DashboardError::UnknownSymbol { .. } => 4,
            DashboardError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_provider_unavailable() {
        let err = DashboardError::ProviderUnavailable {
            symbol: "MC.PA".into(),
            reason: "timeout".into(),
        };
        assert_eq!(err.to_string(), "provider unavailable for MC.PA: timeout");
    }

    #[test]
    fn display_config_missing() {
        let err = DashboardError::ConfigMissing {
            section: "provider".into(),
            key: "data_dir".into(),
        };
        assert_eq!(err.to_string(), "missing config key [provider] data_dir");
    }

    #[test]
    fn io_converts_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DashboardError = io.into();
        assert_eq!(err.to_string(), "gone");
    }
}
