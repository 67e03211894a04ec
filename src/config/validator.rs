//! Config validation: prefix shape, unique models, known operation names.

use crate::config::AdminConfig;
use crate::error::ConfigError;
use crate::model::Operation;
use std::collections::HashSet;

pub fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() || (prefix.starts_with('/') && !prefix.ends_with('/')) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPrefix(prefix.to_string()))
    }
}

pub fn validate(config: &AdminConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation("name must not be empty".into()));
    }
    validate_prefix(&config.url_prefix)?;

    let mut tables = HashSet::new();
    for m in &config.models {
        if m.table.trim().is_empty() {
            return Err(ConfigError::Validation("model table must not be empty".into()));
        }
        if !tables.insert(m.table.as_str()) {
            return Err(ConfigError::DuplicateModel(m.table.clone()));
        }
        for op in &m.excluded_operations {
            op.parse::<Operation>()?;
        }
    }
    Ok(())
}
