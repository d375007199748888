//! The per-block hook.
//!
//! Runs once per block before any user action. Nothing happens until the
//! chain is activated; afterwards each block credits its producer, refreshes
//! the schedule at most once a minute, closes due name auctions, settles
//! governance proposals whose ratification window has ended and drains the
//! gn bucket.

use goc_host::Effect;
use goc_types::{AccountName, Asset, BlockTimestamp};

use crate::accounts::GOC_ACCOUNT;
use crate::contract::ActionCtx;
use crate::SystemError;

impl ActionCtx<'_> {
    pub(crate) fn onblock(&mut self, timestamp: BlockTimestamp, producer: AccountName) -> Result<(), SystemError> {
        if !self.state.global.is_activated() {
            return Ok(());
        }
        let now = self.now;
        if self.state.global.last_pervote_bucket_fill.is_epoch() {
            self.state.global.last_pervote_bucket_fill = now;
        }

        self.state.producers.record_block(producer, &mut self.state.global);

        if timestamp.slots_since(self.state.global.last_producer_schedule_update) > BlockTimestamp::SLOTS_PER_MINUTE {
            if let Some(schedule) =
                self.state
                    .election
                    .elect(&self.state.producers, &mut self.state.global, timestamp)
            {
                self.effects.push(Effect::ProposeSchedule(schedule));
            }
        }

        self.state.auction.close_due(&mut self.state.global, timestamp);

        self.settle_due_proposals()?;
        self.drain_gn_bucket();
        Ok(())
    }

    fn settle_due_proposals(&mut self) -> Result<(), SystemError> {
        let now = self.now;
        let due = self
            .state
            .goc
            .due_for_settlement(now, self.config.settlements_per_block);
        for id in due {
            let settlement = self.state.goc.settle(&mut self.state.global, id, now)?;
            if let Some(fee) = settlement.fee_refund {
                self.effects
                    .transfer(GOC_ACCOUNT, settlement.owner, fee, "proposal fee refund");
            }
        }
        Ok(())
    }

    fn drain_gn_bucket(&mut self) {
        let now = self.now;
        let Some(payouts) = self.state.goc.drain_gn_bucket(&mut self.state.global, now) else {
            return;
        };
        let core = self.core_symbol();
        for (producer, amount) in payouts {
            if amount > 0 {
                self.effects
                    .transfer(GOC_ACCOUNT, producer, Asset::new(amount, core), "gn bucket payout");
            }
        }
    }
}
