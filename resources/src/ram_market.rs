//! Bancor exchange between the core token and RAM bytes.
//!
//! Both sides convert through an intermediate `RAMCORE` supply with two
//! connectors of weight 0.5. Buying RAM converts tokens into `RAMCORE` on
//! the quote connector and then `RAMCORE` into bytes on the base connector;
//! selling runs the other way. Each conversion truncates towards zero, so
//! rounding always favours the market.

use goc_types::{AccountName, Asset, GlobalState, Symbol};
use serde::{Deserialize, Serialize};

use crate::delegation::DelegationLedger;
use crate::error::ResourceError;

pub const RAMCORE_SYMBOL: Symbol = Symbol::from_static(4, "RAMCORE");
pub const RAM_SYMBOL: Symbol = Symbol::from_static(0, "RAM");

/// Trading fee in basis points, rounded up: 0.5 %.
pub const DEFAULT_RAM_FEE_BPS: u32 = 50;

const INITIAL_SUPPLY: i64 = 100_000_000_000_000;
const CONNECTOR_WEIGHT: f64 = 0.5;

/// Largest `max_ram_size` accepted by `setram`: 1 PiB.
const MAX_REALISTIC_RAM: u64 = 1 << 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub balance: Asset,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RamMarket {
    pub supply: Asset,
    /// RAM bytes.
    pub base: Connector,
    /// Core token.
    pub quote: Connector,
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamPurchase {
    pub bytes: i64,
    /// Tokens moved into the market, after the fee.
    pub cost: Asset,
    pub fee: Asset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamSale {
    pub bytes: i64,
    /// Tokens paid out of the market, before the fee is taken back.
    pub proceeds: Asset,
    pub fee: Asset,
}

pub fn ram_fee(amount: i64, fee_bps: u32) -> i64 {
    let scaled = i128::from(amount) * i128::from(fee_bps);
    i64::try_from((scaled + 9_999) / 10_000).unwrap_or(i64::MAX)
}

fn default_fee_bps() -> u32 {
    DEFAULT_RAM_FEE_BPS
}

impl RamMarket {
    /// A market whose base connector holds `free_bytes` and whose quote
    /// connector holds `quote_reserve`.
    pub fn new(free_bytes: u64, quote_reserve: Asset) -> Self {
        Self {
            supply: Asset::new(INITIAL_SUPPLY, RAMCORE_SYMBOL),
            base: Connector {
                balance: Asset::new(i64::try_from(free_bytes).unwrap_or(i64::MAX), RAM_SYMBOL),
                weight: CONNECTOR_WEIGHT,
            },
            quote: Connector {
                balance: quote_reserve,
                weight: CONNECTOR_WEIGHT,
            },
            fee_bps: DEFAULT_RAM_FEE_BPS,
        }
    }

    pub fn with_fee_bps(mut self, fee_bps: u32) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub fn fee(&self, amount: i64) -> i64 {
        ram_fee(amount, self.fee_bps)
    }

    /// Smallest payment that still leaves `net` after the fee.
    pub fn gross_up(&self, net: i64) -> i64 {
        let keep = 10_000 - i128::from(self.fee_bps.min(9_999));
        let extra = (i128::from(net) * i128::from(self.fee_bps) + keep - 1) / keep;
        net.saturating_add(i64::try_from(extra).unwrap_or(i64::MAX))
    }

    pub fn core_symbol(&self) -> Symbol {
        self.quote.balance.symbol
    }

    /// Convert `from` into `to`, updating both reserves and the supply.
    pub fn convert(&mut self, from: Asset, to: Symbol) -> Result<Asset, ResourceError> {
        let mut from = from;
        loop {
            let sell = from.symbol;
            from = if sell != self.supply.symbol {
                if sell == self.base.balance.symbol {
                    convert_to_exchange(&mut self.supply, &mut self.base, from)
                } else if sell == self.quote.balance.symbol {
                    convert_to_exchange(&mut self.supply, &mut self.quote, from)
                } else {
                    return Err(ResourceError::Conversion(format!("invalid sell {sell}")));
                }
            } else if to == self.base.balance.symbol {
                convert_from_exchange(&mut self.supply, &mut self.base, from)?
            } else if to == self.quote.balance.symbol {
                convert_from_exchange(&mut self.supply, &mut self.quote, from)?
            } else {
                return Err(ResourceError::Conversion(format!("invalid conversion to {to}")));
            };
            if from.symbol == to {
                return Ok(from);
            }
        }
    }

    /// Tokens the market would pay today for `bytes`, without trading.
    pub fn quote_bytes(&self, bytes: i64) -> Result<Asset, ResourceError> {
        let mut probe = *self;
        probe.convert(Asset::new(bytes, RAM_SYMBOL), self.core_symbol())
    }

    /// Spend `quant` on RAM for `receiver`.
    pub fn buy(
        &mut self,
        global: &mut GlobalState,
        ledger: &mut DelegationLedger,
        receiver: AccountName,
        quant: Asset,
    ) -> Result<RamPurchase, ResourceError> {
        if quant.symbol != self.core_symbol() {
            return Err(ResourceError::InvalidAmount(format!(
                "must buy RAM with {}",
                self.core_symbol()
            )));
        }
        if quant.amount <= 0 {
            return Err(ResourceError::InvalidAmount("must purchase a positive amount".into()));
        }
        let fee = Asset::new(self.fee(quant.amount), quant.symbol);
        let cost = Asset::new(quant.amount - fee.amount, quant.symbol);

        let mut next = *self;
        let bytes = next.convert(cost, RAM_SYMBOL)?.amount;
        if bytes <= 0 {
            return Err(ResourceError::InvalidAmount("must reserve a positive amount".into()));
        }
        let free = global.free_ram();
        if bytes as u64 > free {
            return Err(ResourceError::RamCapacity {
                requested: bytes,
                free,
            });
        }

        ledger.adjust_ram(receiver, bytes, quant.symbol)?;
        *self = next;
        global.total_ram_bytes_reserved += bytes as u64;
        global.total_ram_stake += cost.amount;

        tracing::debug!(%receiver, bytes, %cost, %fee, "ram purchased");
        Ok(RamPurchase { bytes, cost, fee })
    }

    /// Sell `bytes` of `account`'s quota back to the market.
    ///
    /// `in_use` is the RAM the account currently occupies; quota below it
    /// cannot be sold.
    pub fn sell(
        &mut self,
        global: &mut GlobalState,
        ledger: &mut DelegationLedger,
        account: AccountName,
        bytes: i64,
        in_use: u64,
    ) -> Result<RamSale, ResourceError> {
        if bytes <= 0 {
            return Err(ResourceError::InvalidAmount("cannot sell negative byte".into()));
        }
        let quota = ledger.ram_bytes(account);
        if quota < bytes {
            return Err(ResourceError::InsufficientRam {
                have: quota,
                need: bytes,
            });
        }
        let unused = quota - i64::try_from(in_use).unwrap_or(i64::MAX);
        if unused < bytes {
            return Err(ResourceError::InsufficientRam {
                have: unused.max(0),
                need: bytes,
            });
        }

        let mut next = *self;
        let proceeds = next.convert(Asset::new(bytes, RAM_SYMBOL), self.core_symbol())?;
        if proceeds.amount <= 0 {
            return Err(ResourceError::InvalidAmount(
                "token amount received from selling ram is too low".into(),
            ));
        }
        if global.total_ram_stake < proceeds.amount {
            return Err(ResourceError::Conversion("more tokens out than staked in RAM".into()));
        }

        ledger.adjust_ram(account, -bytes, proceeds.symbol)?;
        *self = next;
        global.total_ram_bytes_reserved = global.total_ram_bytes_reserved.saturating_sub(bytes as u64);
        global.total_ram_stake -= proceeds.amount;

        let fee = Asset::new(self.fee(proceeds.amount), proceeds.symbol);
        tracing::debug!(%account, bytes, %proceeds, %fee, "ram sold");
        Ok(RamSale {
            bytes,
            proceeds,
            fee,
        })
    }

    /// Raise the network RAM capacity, releasing the new bytes into the market.
    pub fn set_max_ram(&mut self, global: &mut GlobalState, max_ram_size: u64) -> Result<(), ResourceError> {
        if max_ram_size >= MAX_REALISTIC_RAM {
            return Err(ResourceError::InvalidRamSize("ram size is unrealistic".into()));
        }
        if max_ram_size <= global.total_ram_bytes_reserved {
            return Err(ResourceError::InvalidRamSize(
                "attempt to set max below reserved".into(),
            ));
        }
        if max_ram_size <= global.max_ram_size {
            return Err(ResourceError::InvalidRamSize("ram may only be increased".into()));
        }
        let delta = max_ram_size - global.max_ram_size;
        self.base.balance.amount += delta as i64;
        global.max_ram_size = max_ram_size;
        tracing::info!(max_ram_size, delta, "ram capacity increased");
        Ok(())
    }
}

fn convert_to_exchange(supply: &mut Asset, connector: &mut Connector, input: Asset) -> Asset {
    let r = supply.amount as f64;
    let c = (connector.balance.amount + input.amount) as f64;
    let f = connector.weight;
    let t = input.amount as f64;
    let issued = (-r * (1.0 - (1.0 + t / c).powf(f))) as i64;
    supply.amount += issued;
    connector.balance.amount += input.amount;
    Asset::new(issued, supply.symbol)
}

fn convert_from_exchange(
    supply: &mut Asset,
    connector: &mut Connector,
    input: Asset,
) -> Result<Asset, ResourceError> {
    if input.symbol != supply.symbol {
        return Err(ResourceError::Conversion("unexpected asset symbol input".into()));
    }
    let r = (supply.amount - input.amount) as f64;
    let c = connector.balance.amount as f64;
    let f = 1.0 / connector.weight;
    let e = input.amount as f64;
    let out = (c * ((1.0 + e / r).powf(f) - 1.0)) as i64;
    supply.amount -= input.amount;
    connector.balance.amount -= out;
    Ok(Asset::new(out, connector.balance.symbol))
}
