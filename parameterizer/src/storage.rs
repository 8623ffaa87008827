use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::params::ParamKey;

/// Storage keys for the contract.
/// Configuration and parameters live in instance storage; proposals,
/// challenges and claim flags are unbounded and live in persistent storage.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Token contract used for deposits and rewards
    Token,
    /// Voting contract that runs the commit-reveal ballots
    Voting,
    /// Current value of a parameter. Every accepted `Custom` key adds an
    /// instance entry, and instance storage is loaded on each invocation.
    Param(ParamKey),
    /// Pending proposal, keyed by its (name, value) fingerprint
    Proposal(BytesN<32>),
    /// Challenge record, keyed by the poll id the voting contract returned
    Challenge(u64),
    /// Reward claimed flag: Claimed(challenge_id, voter)
    Claimed(u64, Address),
}

/// A pending change of one parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ParamProposal {
    /// Parameter the proposal targets
    pub name: ParamKey,
    /// Proposed new value
    pub value: u64,
    /// Proposer, refunded or rewarded on settlement
    pub owner: Address,
    /// Amount escrowed by the proposer
    pub deposit: i128,
    /// After this timestamp an unchallenged proposal may be accepted
    pub app_expiry: u64,
    /// After this timestamp the proposal can only expire
    pub process_by: u64,
    /// Poll id of the challenge, if one was opened
    pub challenge_id: Option<u64>,
}

/// A staked dispute against a proposal.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Challenge {
    pub challenger: Address,
    /// The proposer's deposit, matched by the challenger
    pub stake: i128,
    /// Tokens still claimable by winning-side voters
    pub reward_pool: i128,
    /// Winning-side voting weight that has not claimed yet
    pub winning_tokens: i128,
    pub resolved: bool,
}

/// Grace period added on top of the apply/commit/reveal windows when computing
/// `process_by`: seven days.
pub const PROCESS_BY_GRACE: u64 = 604_800;

/// Percentages are whole numbers out of 100.
pub const PERCENT_DENOMINATOR: i128 = 100;

/// Number of parameters supplied at initialization.
pub const PARAM_COUNT: u32 = 14;

const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const RECORD_BUMP_AMOUNT: u32 = 90 * DAY_IN_LEDGERS;
pub const RECORD_LIFETIME_THRESHOLD: u32 = RECORD_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn load_proposal(env: &Env, prop_id: &BytesN<32>) -> Option<ParamProposal> {
    env.storage()
        .persistent()
        .get(&DataKey::Proposal(prop_id.clone()))
}

pub fn save_proposal(env: &Env, prop_id: &BytesN<32>, proposal: &ParamProposal) {
    let key = DataKey::Proposal(prop_id.clone());
    env.storage().persistent().set(&key, proposal);
    env.storage()
        .persistent()
        .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}

pub fn remove_proposal(env: &Env, prop_id: &BytesN<32>) {
    env.storage()
        .persistent()
        .remove(&DataKey::Proposal(prop_id.clone()));
}

pub fn load_challenge(env: &Env, challenge_id: u64) -> Option<Challenge> {
    env.storage()
        .persistent()
        .get(&DataKey::Challenge(challenge_id))
}

pub fn save_challenge(env: &Env, challenge_id: u64, challenge: &Challenge) {
    let key = DataKey::Challenge(challenge_id);
    env.storage().persistent().set(&key, challenge);
    env.storage()
        .persistent()
        .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}

pub fn has_claimed(env: &Env, challenge_id: u64, voter: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Claimed(challenge_id, voter.clone()))
        .unwrap_or(false)
}

pub fn mark_claimed(env: &Env, challenge_id: u64, voter: &Address) {
    let key = DataKey::Claimed(challenge_id, voter.clone());
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}
