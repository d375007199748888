//! Privileged parameter and account actions.

use goc_host::Effect;
use goc_types::{AccountName, ChainParameters, GocParams};

use crate::contract::ActionCtx;
use crate::SystemError;

impl ActionCtx<'_> {
    pub(crate) fn setparams(&mut self, params: ChainParameters) -> Result<(), SystemError> {
        params.validate().map_err(SystemError::InvalidArgument)?;
        self.state.global.chain = params.clone();
        self.effects.push(Effect::SetChainParameters(params));
        tracing::info!("chain parameters updated");
        Ok(())
    }

    pub(crate) fn setgocparams(&mut self, params: GocParams) -> Result<(), SystemError> {
        params.validate().map_err(SystemError::InvalidArgument)?;
        self.state.global.apply_goc_params(&params);
        tracing::info!(?params, "governance parameters updated");
        Ok(())
    }

    pub(crate) fn setpriv(&mut self, account: AccountName, is_priv: bool) -> Result<(), SystemError> {
        self.require_account(account)?;
        self.effects.push(Effect::SetPrivileged {
            account,
            privileged: is_priv,
        });
        Ok(())
    }
}
