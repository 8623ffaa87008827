//! Events for off-chain indexers, one per state transition.

use soroban_sdk::{Address, BytesN, Env, Symbol};

use crate::params::ParamKey;
use crate::storage::{Challenge, ParamProposal};

pub fn proposal_submitted(env: &Env, prop_id: &BytesN<32>, proposal: &ParamProposal) {
    env.events().publish(
        (Symbol::new(env, "proposal"), prop_id.clone()),
        (
            proposal.name.clone(),
            proposal.value,
            proposal.owner.clone(),
            proposal.deposit,
            proposal.app_expiry,
            proposal.process_by,
        ),
    );
}

pub fn challenge_opened(
    env: &Env,
    prop_id: &BytesN<32>,
    poll_id: u64,
    challenger: &Address,
    commit_end: u64,
    reveal_end: u64,
) {
    env.events().publish(
        (Symbol::new(env, "challenge"), prop_id.clone()),
        (poll_id, challenger.clone(), commit_end, reveal_end),
    );
}

pub fn proposal_accepted(env: &Env, prop_id: &BytesN<32>, name: &ParamKey, value: u64) {
    env.events().publish(
        (Symbol::new(env, "accepted"), prop_id.clone()),
        (name.clone(), value),
    );
}

pub fn proposal_expired(env: &Env, prop_id: &BytesN<32>) {
    env.events()
        .publish((Symbol::new(env, "expired"), prop_id.clone()), ());
}

/// Settlement of a challenge; `succeeded` is true when the challenger won.
pub fn challenge_settled(
    env: &Env,
    prop_id: &BytesN<32>,
    poll_id: u64,
    challenge: &Challenge,
    succeeded: bool,
) {
    let topic = if succeeded {
        "challenge_succeeded"
    } else {
        "challenge_failed"
    };
    env.events().publish(
        (Symbol::new(env, topic), prop_id.clone()),
        (poll_id, challenge.reward_pool, challenge.winning_tokens),
    );
}

pub fn reward_claimed(env: &Env, challenge_id: u64, voter: &Address, reward: i128) {
    env.events().publish(
        (Symbol::new(env, "reward_claimed"), challenge_id),
        (voter.clone(), reward),
    );
}
