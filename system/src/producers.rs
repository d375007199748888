//! Producer registration and voting actions.

use goc_types::{AccountName, PublicKey};

use crate::contract::ActionCtx;
use crate::SystemError;

impl ActionCtx<'_> {
    pub(crate) fn regproducer(
        &mut self,
        producer: AccountName,
        key: PublicKey,
        url: &str,
        location: u16,
    ) -> Result<(), SystemError> {
        self.state
            .producers
            .register(producer, key, url, location, self.now)?;
        Ok(())
    }

    pub(crate) fn unregprod(&mut self, producer: AccountName) -> Result<(), SystemError> {
        self.state.producers.unregister(producer)?;
        Ok(())
    }

    pub(crate) fn voteproducer(
        &mut self,
        voter: AccountName,
        proxy: AccountName,
        producers: &[AccountName],
    ) -> Result<(), SystemError> {
        let now = self.now;
        self.state.voters.update_votes(
            &mut self.state.producers,
            &mut self.state.global,
            voter,
            proxy,
            producers,
            true,
            now,
        )?;
        Ok(())
    }

    pub(crate) fn regproxy(&mut self, proxy: AccountName, is_proxy: bool) -> Result<(), SystemError> {
        let now = self.now;
        self.state.voters.regproxy(
            &mut self.state.producers,
            &mut self.state.global,
            proxy,
            is_proxy,
            now,
        )?;
        Ok(())
    }
}
