//! goc-replay: run GOC system contract scripts against an in-memory host.

mod script;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use goc_store::{Persisted, Schema};
use goc_system::SystemConfig;

use crate::script::{Runner, Script};

#[derive(Parser)]
#[command(name = "goc-replay", about = "GOC system contract script replayer")]
struct Cli {
    /// Log format: "human" or "json". Overrides the config file.
    #[arg(long, env = "GOC_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error". Overrides the config file.
    #[arg(long, env = "GOC_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay an action script and print a JSON summary.
    Run {
        /// TOML contract configuration. Network defaults when omitted.
        #[arg(long, env = "GOC_CONFIG")]
        config: Option<PathBuf>,

        /// JSON action script.
        #[arg(long, env = "GOC_SCRIPT")]
        script: PathBuf,

        /// Write the final encoded state here.
        #[arg(long)]
        state_out: Option<PathBuf>,
    },
    /// Print every persisted entity schema as JSON.
    Schema,
}

fn schemas() -> Vec<Schema> {
    vec![
        goc_voting::VoterInfo::SCHEMA,
        goc_voting::ProducerInfo::SCHEMA,
        goc_resources::DelegatedBandwidth::SCHEMA,
        goc_resources::UserResources::SCHEMA,
        goc_resources::RefundRequest::SCHEMA,
        goc_governance::GocProposal::SCHEMA,
        goc_governance::GocVote::SCHEMA,
        goc_governance::BpVote::SCHEMA,
        goc_governance::GocReward::SCHEMA,
        goc_names::NameBid::SCHEMA,
        goc_names::BidRefund::SCHEMA,
    ]
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SystemConfig> {
    match path {
        Some(path) => {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            SystemConfig::from_toml_file(path_str)
                .with_context(|| format!("loading config from {}", path.display()))
        }
        None => Ok(SystemConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            script,
            state_out,
        } => {
            let config = load_config(config.as_ref())?;
            let format = cli.log_format.as_deref().unwrap_or(&config.log_format);
            let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
            goc_utils::init_tracing(format, level);

            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let parsed: Script = serde_json::from_str(&raw)
                .with_context(|| format!("parsing script {}", script.display()))?;
            tracing::info!(
                steps = parsed.steps.len(),
                system = %config.system_account,
                "replaying script"
            );

            let mut runner = Runner::new(config)?;
            let summary = runner.run(parsed);
            tracing::info!(
                applied = summary.applied,
                rejected = summary.rejected,
                span = %goc_utils::format_duration(summary.span_secs),
                "replay finished"
            );

            if let Some(out) = state_out {
                let bytes = runner.contract().state().save_state()?;
                std::fs::write(&out, bytes)
                    .with_context(|| format!("writing state to {}", out.display()))?;
                tracing::info!(path = %out.display(), "state written");
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Schema => {
            goc_utils::init_tracing(
                cli.log_format.as_deref().unwrap_or("human"),
                cli.log_level.as_deref().unwrap_or("warn"),
            );
            println!("{}", serde_json::to_string_pretty(&schemas())?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn schema_names_are_unique() {
        let all = schemas();
        let mut tables: Vec<_> = all.iter().map(|s| s.table).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), all.len());
        let vote = all.iter().find(|s| s.table == "votes").unwrap();
        assert!(vote.field("settle_time").is_some());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, SystemConfig::default());
    }

    #[test]
    fn config_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ram_fee_bps = 100").unwrap();
        let config = load_config(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.ram_fee_bps, 100);
    }

    #[test]
    fn cli_parses_run() {
        let cli = Cli::try_parse_from(["goc-replay", "run", "--script", "s.json"]).unwrap();
        assert!(matches!(cli.command, Command::Run { config: None, .. }));
    }
}
