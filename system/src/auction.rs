//! Name auction actions.

use goc_host::{DeferredAction, DeferredKey, DeferredTask, Effect};
use goc_names::AuctionError;
use goc_types::{AccountName, Asset, PublicKey};

use crate::accounts::NAMES_ACCOUNT;
use crate::contract::ActionCtx;
use crate::SystemError;

impl ActionCtx<'_> {
    pub(crate) fn bidname(&mut self, bidder: AccountName, newname: AccountName, bid: Asset) -> Result<(), SystemError> {
        self.require_core(bid)?;
        if self.host.accounts.exists(newname) {
            return Err(AuctionError::AccountExists(newname).into());
        }
        let now = self.now;
        let outbid = self.state.auction.bid(bidder, newname, bid, now)?;
        self.effects.transfer(bidder, NAMES_ACCOUNT, bid, "bid name");
        if let Some(refund) = outbid {
            self.effects.schedule(DeferredTask {
                action: DeferredAction::BidRefund {
                    bidder: refund.bidder,
                    newname,
                },
                execute_at: now,
            });
        }
        Ok(())
    }

    pub(crate) fn bidrefund(&mut self, bidder: AccountName, newname: AccountName) -> Result<(), SystemError> {
        let amount = self.state.auction.take_refund(bidder, newname)?;
        if amount.is_positive() {
            self.effects.transfer(NAMES_ACCOUNT, bidder, amount, "refund bid on name");
        }
        self.effects
            .push(Effect::Cancel(DeferredKey::BidRefund(bidder, newname)));
        Ok(())
    }

    pub(crate) fn claimname(
        &mut self,
        claimer: AccountName,
        newname: AccountName,
        key: PublicKey,
    ) -> Result<(), SystemError> {
        if self.host.accounts.exists(newname) {
            return Err(AuctionError::AccountExists(newname).into());
        }
        self.state.auction.claim(claimer, newname)?;
        self.effects.push(Effect::CreateAccount {
            creator: self.config.system_account,
            name: newname,
            key,
        });
        Ok(())
    }
}
