//! Contract configuration with TOML file support.

use serde::{Deserialize, Serialize};

use goc_resources::DEFAULT_RAM_FEE_BPS;
use goc_types::global::DEFAULT_MAX_RAM_SIZE;
use goc_types::{AccountName, GlobalState, GocParams, Symbol};
use goc_voting::MAX_SCHEDULE_SIZE;

use crate::SystemError;

/// Configuration for the system contract.
///
/// Can be loaded from a TOML file via [`SystemConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so an
/// empty file describes the standard network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Account holding system authority.
    #[serde(default = "default_system_account")]
    pub system_account: AccountName,

    /// Token used for staking, RAM, fees and rewards.
    #[serde(default = "default_core_symbol")]
    pub core_symbol: Symbol,

    /// Initial RAM capacity in bytes.
    #[serde(default = "default_max_ram_size")]
    pub max_ram_size: u64,

    /// Tokens seeded into the RAM market's quote connector.
    #[serde(default = "default_ram_reserve")]
    pub ram_reserve: i64,

    /// RAM trading fee in basis points.
    #[serde(default = "default_ram_fee_bps")]
    pub ram_fee_bps: u32,

    /// Voted stake required before rewards and unstaking unlock.
    #[serde(default = "default_min_activated_stake")]
    pub min_activated_stake: i64,

    /// Whether proposals may skip the vote-start delay.
    #[serde(default)]
    pub allow_debug_start_modes: bool,

    /// Producers per published schedule.
    #[serde(default = "default_schedule_size")]
    pub schedule_size: usize,

    /// Proposals settled automatically per block.
    #[serde(default = "default_settlements_per_block")]
    pub settlements_per_block: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Governance limits; network defaults when absent.
    #[serde(default)]
    pub goc: Option<GocParams>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_system_account() -> AccountName {
    AccountName::from_static("eosio")
}

fn default_core_symbol() -> Symbol {
    Symbol::from_static(4, "SYS")
}

fn default_max_ram_size() -> u64 {
    DEFAULT_MAX_RAM_SIZE
}

fn default_ram_reserve() -> i64 {
    100_000_000_000
}

fn default_ram_fee_bps() -> u32 {
    DEFAULT_RAM_FEE_BPS
}

fn default_min_activated_stake() -> i64 {
    1_500_000_000_000
}

fn default_schedule_size() -> usize {
    MAX_SCHEDULE_SIZE
}

fn default_settlements_per_block() -> usize {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SystemConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, SystemError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SystemError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SystemError> {
        let config: Self = toml::from_str(s).map_err(|e| SystemError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, SystemError> {
        toml::to_string_pretty(self).map_err(|e| SystemError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), SystemError> {
        if self.system_account.is_empty() {
            return Err(SystemError::Config("system account must be set".into()));
        }
        if self.ram_reserve <= 0 {
            return Err(SystemError::Config("ram reserve must be positive".into()));
        }
        if self.ram_fee_bps >= 10_000 {
            return Err(SystemError::Config("ram fee must be below 10000 basis points".into()));
        }
        if self.min_activated_stake < 0 {
            return Err(SystemError::Config("minimum activated stake cannot be negative".into()));
        }
        if self.schedule_size == 0 || self.schedule_size > MAX_SCHEDULE_SIZE {
            return Err(SystemError::Config(format!(
                "schedule size must be between 1 and {MAX_SCHEDULE_SIZE}"
            )));
        }
        if let Some(goc) = &self.goc {
            goc.validate().map_err(SystemError::Config)?;
        }
        Ok(())
    }

    /// The global state a fresh chain starts from.
    pub fn initial_global(&self) -> GlobalState {
        let mut global = GlobalState {
            max_ram_size: self.max_ram_size,
            min_activated_stake: self.min_activated_stake,
            ..GlobalState::default()
        };
        if let Some(goc) = &self.goc {
            global.apply_goc_params(goc);
        }
        global
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            system_account: default_system_account(),
            core_symbol: default_core_symbol(),
            max_ram_size: default_max_ram_size(),
            ram_reserve: default_ram_reserve(),
            ram_fee_bps: default_ram_fee_bps(),
            min_activated_stake: default_min_activated_stake(),
            allow_debug_start_modes: false,
            schedule_size: default_schedule_size(),
            settlements_per_block: default_settlements_per_block(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            goc: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = SystemConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = SystemConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = SystemConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.system_account, AccountName::from_static("eosio"));
        assert_eq!(config.core_symbol.to_string(), "4,SYS");
        assert_eq!(config.schedule_size, 21);
        assert_eq!(config.log_format, "human");
        assert!(!config.allow_debug_start_modes);
        assert_eq!(config.initial_global(), GlobalState::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            system_account = "gocio"
            core_symbol = "4,GOC"
            allow_debug_start_modes = true
            min_activated_stake = 0

            [goc]
            proposal_fee_limit = 500
            stake_limit = 1000
            action_fee = 1
            max_proposal_reward = 10
            governance_vote_period = 60
            bp_vote_period = 60
            vote_start_delay = 0
            bp_nay_threshold = -2.0
            gn_drain_interval = 600
            voter_inflow_bps = 100
            gn_inflow_bps = 100
        "#;
        let config = SystemConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.system_account, AccountName::from_static("gocio"));
        assert_eq!(config.core_symbol, Symbol::from_static(4, "GOC"));
        assert_eq!(config.log_level, "info"); // default

        let global = config.initial_global();
        assert!(global.is_activated());
        assert_eq!(global.goc_stake_limit, 1000);
        assert_eq!(global.goc_bp_nay_threshold, -2.0);
        assert_eq!(global.goc_gn_inflow_bps, 100);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(SystemConfig::from_toml_str("schedule_size = 0").is_err());
        assert!(SystemConfig::from_toml_str("ram_fee_bps = 10000").is_err());
        assert!(SystemConfig::from_toml_str("system_account = \"Not A Name\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "schedule_size = 5\nlog_format = \"json\"").unwrap();
        let config = SystemConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.schedule_size, 5);
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = SystemConfig::from_toml_file("/nonexistent/goc.toml");
        assert!(matches!(result, Err(SystemError::Config(_))));
    }
}
