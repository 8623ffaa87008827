//! Parameter store.
//!
//! The fourteen parameters supplied at initialization are known keys so that
//! percentage bounds can be checked statically. Anything else governance wants
//! to track goes through `ParamKey::Custom`.

use soroban_sdk::{contracttype, xdr::ToXdr, BytesN, Env, Symbol, Vec};

use crate::error::ParameterizerError;
use crate::storage::{DataKey, PARAM_COUNT};

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum ParamKey {
    /// Listing deposit
    MinDeposit,
    /// Reparameterization proposal deposit
    PMinDeposit,
    ApplyStageLen,
    PApplyStageLen,
    CommitStageLen,
    PCommitStageLen,
    RevealStageLen,
    PRevealStageLen,
    /// Share of a losing stake returned to the winner, in percent
    DispensationPct,
    PDispensationPct,
    /// Percentage of votes needed for a ballot to pass
    VoteQuorum,
    PVoteQuorum,
    ExitTimeDelay,
    ExitPeriodLen,
    /// Governance-defined key outside the known set
    Custom(Symbol),
}

impl ParamKey {
    /// Known key at position `index` of the initialization list.
    pub fn at(index: u32) -> Option<ParamKey> {
        let key = match index {
            0 => ParamKey::MinDeposit,
            1 => ParamKey::PMinDeposit,
            2 => ParamKey::ApplyStageLen,
            3 => ParamKey::PApplyStageLen,
            4 => ParamKey::CommitStageLen,
            5 => ParamKey::PCommitStageLen,
            6 => ParamKey::RevealStageLen,
            7 => ParamKey::PRevealStageLen,
            8 => ParamKey::DispensationPct,
            9 => ParamKey::PDispensationPct,
            10 => ParamKey::VoteQuorum,
            11 => ParamKey::PVoteQuorum,
            12 => ParamKey::ExitTimeDelay,
            13 => ParamKey::ExitPeriodLen,
            _ => return None,
        };
        Some(key)
    }

    /// Whether values of this key are percentages capped at 100.
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            ParamKey::DispensationPct
                | ParamKey::PDispensationPct
                | ParamKey::VoteQuorum
                | ParamKey::PVoteQuorum
        )
    }
}

pub fn get(env: &Env, name: &ParamKey) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::Param(name.clone()))
        .unwrap_or(0)
}

pub(crate) fn set(env: &Env, name: &ParamKey, value: u64) {
    env.storage()
        .instance()
        .set(&DataKey::Param(name.clone()), &value);
}

/// Seed the known keys from the initialization list.
pub(crate) fn seed(env: &Env, values: &Vec<u64>) -> Result<(), ParameterizerError> {
    if values.len() != PARAM_COUNT {
        return Err(ParameterizerError::InvalidParams);
    }
    for (index, value) in values.iter().enumerate() {
        let key = ParamKey::at(index as u32).ok_or(ParameterizerError::InvalidParams)?;
        if key.is_percentage() && value > 100 {
            return Err(ParameterizerError::PercentageOutOfRange);
        }
        set(env, &key, value);
    }
    Ok(())
}

/// Fingerprint of a (name, value) pair. At most one proposal per fingerprint
/// is pending at a time.
pub fn proposal_id(env: &Env, name: &ParamKey, value: u64) -> BytesN<32> {
    let preimage = (name.clone(), value).to_xdr(env);
    env.crypto().sha256(&preimage).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_in_order() {
        assert_eq!(ParamKey::at(0), Some(ParamKey::MinDeposit));
        assert_eq!(ParamKey::at(9), Some(ParamKey::PDispensationPct));
        assert_eq!(ParamKey::at(13), Some(ParamKey::ExitPeriodLen));
        assert_eq!(ParamKey::at(PARAM_COUNT), None);
    }

    #[test]
    fn test_percentage_keys() {
        let env = Env::default();
        assert!(ParamKey::DispensationPct.is_percentage());
        assert!(ParamKey::PVoteQuorum.is_percentage());
        assert!(!ParamKey::MinDeposit.is_percentage());
        assert!(!ParamKey::Custom(Symbol::new(&env, "fee")).is_percentage());
    }

    #[test]
    fn test_proposal_id_depends_on_name_and_value() {
        let env = Env::default();
        let a = proposal_id(&env, &ParamKey::MinDeposit, 500);
        assert_eq!(a, proposal_id(&env, &ParamKey::MinDeposit, 500));
        assert_ne!(a, proposal_id(&env, &ParamKey::MinDeposit, 501));
        assert_ne!(a, proposal_id(&env, &ParamKey::PMinDeposit, 500));
    }
}
