//! Action scripts and the in-memory runner that replays them.

use goc_host::TokenLedger;
use goc_nullables::NullHost;
use goc_system::accounts::AUXILIARY_ACCOUNTS;
use goc_system::{Action, SystemConfig, SystemContract};
use goc_types::{AccountName, Asset, GlobalState, Timestamp};
use serde::{Deserialize, Serialize};

/// A replayable scenario: the accounts and balances to start from, then the
/// signed actions in order.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub accounts: Vec<AccountName>,
    #[serde(default)]
    pub balances: Vec<Balance>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub owner: AccountName,
    pub quantity: Asset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Unix seconds. Deferred tasks due by then run first.
    pub at: u64,
    pub signer: AccountName,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: &'static str,
    pub signer: AccountName,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub effects: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeferredOutcome {
    pub at: u64,
    pub task: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a replay left behind.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub applied: usize,
    pub rejected: usize,
    pub steps: Vec<StepOutcome>,
    pub deferred: Vec<DeferredOutcome>,
    pub global: GlobalState,
    pub schedule: Vec<AccountName>,
    pub balances: Vec<Balance>,
    pub pending_deferred: usize,
    pub span_secs: u64,
}

/// Replays scripts against a fresh contract over nullable collaborators.
pub struct Runner {
    null: NullHost,
    contract: SystemContract,
}

impl Runner {
    pub fn new(config: SystemConfig) -> anyhow::Result<Self> {
        let null = NullHost::new();
        null.accounts.add(config.system_account);
        for account in AUXILIARY_ACCOUNTS {
            null.accounts.add(account);
        }
        let contract = SystemContract::new(config, null.host())?;
        Ok(Self { null, contract })
    }

    pub fn contract(&self) -> &SystemContract {
        &self.contract
    }

    pub fn run(&mut self, script: Script) -> Summary {
        for account in &script.accounts {
            self.null.accounts.add(*account);
        }
        for balance in &script.balances {
            self.null.tokens.credit(balance.owner, balance.quantity);
        }

        let first = script.steps.first().map(|s| s.at).unwrap_or(0);
        let last = script.steps.last().map(|s| s.at).unwrap_or(first);
        let mut steps = Vec::with_capacity(script.steps.len());
        let mut deferred = Vec::new();

        for (index, step) in script.steps.into_iter().enumerate() {
            let now = Timestamp::new(step.at);
            for (task, result) in self.contract.run_deferred(now) {
                deferred.push(DeferredOutcome {
                    at: step.at,
                    task: format!("{:?}", task.action),
                    ok: result.is_ok(),
                    error: result.err().map(|e| e.to_string()),
                });
            }

            let action = step.action.name();
            let outcome = match self.contract.apply(step.signer, step.action, now) {
                Ok(effects) => StepOutcome {
                    index,
                    action,
                    signer: step.signer,
                    ok: true,
                    kind: None,
                    error: None,
                    effects: effects.len(),
                },
                Err(e) => StepOutcome {
                    index,
                    action,
                    signer: step.signer,
                    ok: false,
                    kind: Some(e.kind().to_string()),
                    error: Some(e.to_string()),
                    effects: 0,
                },
            };
            steps.push(outcome);
        }

        let applied = steps.iter().filter(|s| s.ok).count();
        let symbol = self.contract.config().core_symbol;
        let mut holders: Vec<AccountName> = script.accounts.clone();
        holders.extend(AUXILIARY_ACCOUNTS);
        let balances = holders
            .into_iter()
            .map(|owner| Balance {
                owner,
                quantity: self.null.tokens.balance(owner, symbol),
            })
            .collect();
        let state = self.contract.state();
        Summary {
            applied,
            rejected: steps.len() - applied,
            steps,
            deferred,
            global: state.global.clone(),
            schedule: state.election.schedule().iter().map(|p| p.producer_name).collect(),
            balances,
            pending_deferred: self.null.deferred.pending().len(),
            span_secs: last.saturating_sub(first),
        }
    }
}
