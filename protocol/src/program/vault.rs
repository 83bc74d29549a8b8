//! Instruction builders for the vault program.
//!
//! These are the only places that know which accounts each vault
//! instruction touches and with which flags. The program id comes from the
//! [`ProgramConfig`] the builder was constructed with.

use tracing::debug;

use super::codec::{CodecError, VaultInstruction};
use crate::config::{ProgramConfig, INITIAL_SUPPLY_VINNIES};
use crate::crypto::keys::PublicKey;
use crate::transaction::instruction::{AccountMeta, Instruction};

/// Builds and parses instructions addressed to one vault program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaultProgram {
    config: ProgramConfig,
}

impl VaultProgram {
    pub fn new(config: ProgramConfig) -> Self {
        Self { config }
    }

    pub fn program_id(&self) -> PublicKey {
        self.config.program_id
    }

    /// Creates `new_account`, funded by `payer` with `vinnies` and `space`
    /// bytes of storage. Both accounts sign and both are written.
    pub fn create_account(
        &self,
        payer: &PublicKey,
        new_account: &PublicKey,
        vinnies: u64,
        space: u64,
    ) -> Result<Instruction, CodecError> {
        let data = VaultInstruction::CreateAccount { vinnies, space }.encode()?;
        Ok(Instruction::new(
            self.config.program_id,
            vec![
                AccountMeta::new(*payer, true),
                AccountMeta::new(*new_account, true),
            ],
            data,
        ))
    }

    /// Moves `vinnies` from `from` (signer) to `to`.
    pub fn transfer(
        &self,
        from: &PublicKey,
        to: &PublicKey,
        vinnies: u64,
    ) -> Result<Instruction, CodecError> {
        let data = VaultInstruction::Transfer { vinnies }.encode()?;
        Ok(Instruction::new(
            self.config.program_id,
            vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
            data,
        ))
    }

    /// Creates the treasury account funded with the full initial supply.
    /// The treasury pays for itself.
    pub fn initialize_vault(
        &self,
        treasury: &PublicKey,
        space: u64,
    ) -> Result<Instruction, CodecError> {
        debug!(treasury = %treasury, space, "initializing vault treasury");
        self.create_account(treasury, treasury, INITIAL_SUPPLY_VINNIES, space)
    }

    /// Allocates `vinnies` from the treasury to a purchase account.
    pub fn allocate_funds(
        &self,
        treasury: &PublicKey,
        to: &PublicKey,
        vinnies: u64,
    ) -> Result<Instruction, CodecError> {
        self.transfer(treasury, to, vinnies)
    }

    /// Decodes an instruction's payload if it is addressed to this program.
    ///
    /// Returns `Ok(None)` for instructions belonging to other programs.
    pub fn parse(&self, instruction: &Instruction) -> Result<Option<VaultInstruction>, CodecError> {
        if *instruction.program_id() != self.config.program_id {
            return Ok(None);
        }
        VaultInstruction::decode(instruction.data()).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> PublicKey {
        PublicKey::new([n; 32])
    }

    #[test]
    fn create_account_flags() {
        let program = VaultProgram::default();
        let ix = program.create_account(&key(1), &key(2), 1_000, 64).unwrap();
        assert_eq!(*ix.program_id(), program.program_id());
        assert_eq!(
            ix.accounts(),
            &[AccountMeta::new(key(1), true), AccountMeta::new(key(2), true)]
        );
        assert_eq!(
            program.parse(&ix).unwrap(),
            Some(VaultInstruction::CreateAccount {
                vinnies: 1_000,
                space: 64
            })
        );
    }

    #[test]
    fn transfer_flags() {
        let ix = VaultProgram::default()
            .transfer(&key(1), &key(2), 500)
            .unwrap();
        assert!(ix.accounts()[0].is_signer && ix.accounts()[0].is_writable);
        assert!(!ix.accounts()[1].is_signer && ix.accounts()[1].is_writable);
    }

    #[test]
    fn zero_amounts_never_become_instructions() {
        let program = VaultProgram::default();
        assert!(program.transfer(&key(1), &key(2), 0).is_err());
        assert!(program.create_account(&key(1), &key(2), 0, 10).is_err());
        assert!(program.create_account(&key(1), &key(2), 10, 0).is_err());
        assert!(program.allocate_funds(&key(1), &key(2), 0).is_err());
    }

    #[test]
    fn initialize_vault_funds_full_supply() {
        let program = VaultProgram::default();
        let ix = program.initialize_vault(&key(7), 1024).unwrap();
        assert_eq!(ix.accounts()[0].pubkey, ix.accounts()[1].pubkey);
        assert_eq!(
            program.parse(&ix).unwrap(),
            Some(VaultInstruction::CreateAccount {
                vinnies: INITIAL_SUPPLY_VINNIES,
                space: 1024
            })
        );
    }

    #[test]
    fn program_id_is_configurable() {
        let custom = VaultProgram::new(ProgramConfig::new(key(0x42)));
        let ix = custom.transfer(&key(1), &key(2), 1).unwrap();
        assert_eq!(*ix.program_id(), key(0x42));
        assert_eq!(VaultProgram::default().parse(&ix).unwrap(), None);
        assert!(custom.parse(&ix).unwrap().is_some());
    }
}
