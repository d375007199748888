//! RAM market actions.

use goc_types::{AccountName, Asset};

use crate::accounts::{RAM_ACCOUNT, RAM_FEE_ACCOUNT};
use crate::contract::ActionCtx;
use crate::SystemError;

impl ActionCtx<'_> {
    pub(crate) fn buyram(&mut self, payer: AccountName, receiver: AccountName, quant: Asset) -> Result<(), SystemError> {
        self.require_core(quant)?;
        self.require_account(receiver)?;
        let purchase = self.state.ram.buy(
            &mut self.state.global,
            &mut self.state.ledger,
            receiver,
            quant,
        )?;
        self.effects.transfer(payer, RAM_ACCOUNT, purchase.cost, "buy ram");
        if purchase.fee.is_positive() {
            self.effects.transfer(payer, RAM_FEE_ACCOUNT, purchase.fee, "ram fee");
        }
        self.sync_limits(receiver);
        Ok(())
    }

    /// Buy `bytes` at today's price, paying the fee on top.
    pub(crate) fn buyrambytes(&mut self, payer: AccountName, receiver: AccountName, bytes: u32) -> Result<(), SystemError> {
        let price = self.state.ram.quote_bytes(i64::from(bytes))?;
        let gross = self.state.ram.gross_up(price.amount);
        self.buyram(payer, receiver, Asset::new(gross, self.core_symbol()))
    }

    pub(crate) fn sellram(&mut self, account: AccountName, bytes: i64) -> Result<(), SystemError> {
        let in_use = self.host.accounts.ram_usage(account);
        let sale = self.state.ram.sell(
            &mut self.state.global,
            &mut self.state.ledger,
            account,
            bytes,
            in_use,
        )?;
        self.effects.transfer(RAM_ACCOUNT, account, sale.proceeds, "sell ram");
        if sale.fee.is_positive() {
            self.effects.transfer(account, RAM_FEE_ACCOUNT, sale.fee, "sell ram fee");
        }
        self.sync_limits(account);
        Ok(())
    }

    pub(crate) fn setram(&mut self, max_ram_size: u64) -> Result<(), SystemError> {
        self.state.ram.set_max_ram(&mut self.state.global, max_ram_size)?;
        Ok(())
    }
}
