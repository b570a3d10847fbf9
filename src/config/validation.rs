//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, margins bounded)
//! - Check endpoint URLs, contract addresses and program ids per chain
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EngineConfig → Result<(), Vec<ValidationError>>
//! - Disabled chains are not checked

use std::fmt;

use crate::config::schema::{AccountChainConfig, AdminConfig, EngineConfig, SequenceChainConfig};
use crate::crypto::encoding::{is_valid_account_address, is_valid_sequence_address};

const COMMITMENTS: [&str; 3] = ["processed", "confirmed", "finalized"];
const MAX_GAS_MARGIN_PERCENT: u64 = 500;

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.account_chain.enabled {
        validate_account_chain(&config.account_chain, &mut errors);
    }
    if config.sequence_chain.enabled {
        validate_sequence_chain(&config.sequence_chain, &mut errors);
    }
    validate_admin(&config.admin, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn validate_account_chain(config: &AccountChainConfig, errors: &mut Vec<ValidationError>) {
    validate_url("account_chain.rpc_url", &config.rpc_url, errors);
    for (i, url) in config.failover_urls.iter().enumerate() {
        validate_url(&format!("account_chain.failover_urls[{}]", i), url, errors);
    }

    if config.evm_chain_id == 0 {
        errors.push(ValidationError::new("account_chain.evm_chain_id", "must be > 0"));
    }
    if config.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("account_chain.rpc_timeout_secs", "must be > 0"));
    }
    if config.block_time_secs == 0 {
        errors.push(ValidationError::new("account_chain.block_time_secs", "must be > 0"));
    }
    if config.gas_estimate_margin_percent > MAX_GAS_MARGIN_PERCENT {
        errors.push(ValidationError::new(
            "account_chain.gas_estimate_margin_percent",
            format!("must be <= {}", MAX_GAS_MARGIN_PERCENT),
        ));
    }

    let limits = &config.gas_limits;
    for (name, value) in [
        ("native_transfer", limits.native_transfer),
        ("token_transfer", limits.token_transfer),
        ("mint", limits.mint),
        ("burn", limits.burn),
        ("proposal", limits.proposal),
        ("vote", limits.vote),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(
                format!("account_chain.gas_limits.{}", name),
                "must be > 0",
            ));
        }
    }

    for (field, value) in [
        ("account_chain.token_contract", &config.token_contract),
        ("account_chain.governance_contract", &config.governance_contract),
    ] {
        if let Some(address) = value {
            if !is_valid_account_address(address) {
                errors.push(ValidationError::new(field, format!("invalid address '{}'", address)));
            }
        }
    }
}

fn validate_sequence_chain(config: &SequenceChainConfig, errors: &mut Vec<ValidationError>) {
    validate_url("sequence_chain.rpc_url", &config.rpc_url, errors);
    for (i, url) in config.failover_urls.iter().enumerate() {
        validate_url(&format!("sequence_chain.failover_urls[{}]", i), url, errors);
    }

    if config.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("sequence_chain.rpc_timeout_secs", "must be > 0"));
    }
    if !COMMITMENTS.contains(&config.commitment.as_str()) {
        errors.push(ValidationError::new(
            "sequence_chain.commitment",
            format!("expected one of {:?}", COMMITMENTS),
        ));
    }

    let programs = [
        ("sequence_chain.system_program", Some(&config.system_program)),
        ("sequence_chain.token_program", Some(&config.token_program)),
        ("sequence_chain.governance_program", config.governance_program.as_ref()),
        ("sequence_chain.token_mint", config.token_mint.as_ref()),
    ];
    for (field, value) in programs {
        if let Some(id) = value {
            if !is_valid_sequence_address(id) {
                errors.push(ValidationError::new(field, format!("invalid program id '{}'", id)));
            }
        }
    }
}

fn validate_admin(config: &AdminConfig, errors: &mut Vec<ValidationError>) {
    if let Some(address) = &config.account_address {
        if !is_valid_account_address(address) {
            errors.push(ValidationError::new(
                "admin.account_address",
                format!("invalid address '{}'", address),
            ));
        }
    }
    if let Some(address) = &config.sequence_address {
        if !is_valid_sequence_address(address) {
            errors.push(ValidationError::new(
                "admin.sequence_address",
                format!("invalid address '{}'", address),
            ));
        }
    }
    for (field, value) in [
        ("admin.account_key_env", &config.account_key_env),
        ("admin.sequence_key_env", &config.sequence_key_env),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }
}
