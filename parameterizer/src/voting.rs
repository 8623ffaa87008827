use soroban_sdk::{contractclient, Address, Env};

/// Commit-reveal voting contract that settles challenges.
///
/// A passed poll means the proposal side prevailed. Token counts are the
/// revealed, token-weighted votes.
#[allow(dead_code)]
#[contractclient(name = "VotingClient")]
pub trait VotingInterface {
    /// Open a poll and return its id.
    fn start_poll(env: Env, vote_quorum: u64, commit_duration: u64, reveal_duration: u64) -> u64;

    /// True once the reveal stage is over.
    fn poll_ended(env: Env, poll_id: u64) -> bool;

    fn is_passed(env: Env, poll_id: u64) -> bool;

    /// Tokens `voter` revealed for the winning option.
    fn passing_tokens(env: Env, voter: Address, poll_id: u64) -> i128;

    /// Tokens revealed for the winning option by all voters.
    fn total_winning_tokens(env: Env, poll_id: u64) -> i128;
}
