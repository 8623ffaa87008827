#![no_std]

mod error;
mod events;
mod math;
mod params;
mod storage;
mod voting;

pub use error::ParameterizerError;
pub use params::ParamKey;
pub use storage::{Challenge, ParamProposal};

use soroban_sdk::{contract, contractimpl, log, token, Address, BytesN, Env, Vec};
use storage::DataKey;
use voting::VotingClient;

/// Parameterizer Contract
///
/// Lets token holders change the parameters a registry reads, through
/// deposit-backed proposals that anyone can challenge.
///
/// Lifecycle of a proposal:
/// - Proposer escrows `PMinDeposit` and the application window opens
/// - Unchallenged past `app_expiry`: anyone processes it and the value is set
/// - Challenged: the challenger matches the deposit and a poll opens on the
///   voting contract; once it ends, processing pays the winner and leaves a
///   reward pool for winning-side voters to claim
/// - Past `process_by` without resolution: it expires and the deposit returns
///
/// Every entry point writes its bookkeeping before the token transfer that
/// ends it.
#[contract]
pub struct Parameterizer;

#[contractimpl]
impl Parameterizer {
    /// Constructor: called on deployment with the initial configuration.
    ///
    /// Delegates to initialize() for the actual setup logic.
    pub fn __constructor(env: Env, token: Address, voting: Address, params: Vec<u64>) {
        Self::initialize(env, token, voting, params).expect("initialization failed");
    }

    /// Initialize token, voting contract and the fourteen known parameters.
    ///
    /// # Arguments
    /// * `token` - Token used for deposits and rewards
    /// * `voting` - Commit-reveal voting contract that settles challenges
    /// * `params` - Values in `ParamKey` order: MinDeposit, PMinDeposit,
    ///   ApplyStageLen, PApplyStageLen, CommitStageLen, PCommitStageLen,
    ///   RevealStageLen, PRevealStageLen, DispensationPct, PDispensationPct,
    ///   VoteQuorum, PVoteQuorum, ExitTimeDelay, ExitPeriodLen
    pub fn initialize(
        env: Env,
        token: Address,
        voting: Address,
        params: Vec<u64>,
    ) -> Result<(), ParameterizerError> {
        if env.storage().instance().has(&DataKey::Token) {
            return Err(ParameterizerError::AlreadyInitialized);
        }

        params::seed(&env, &params)?;

        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::Voting, &voting);
        storage::bump_instance(&env);

        Ok(())
    }

    /// Propose a new value for a parameter.
    ///
    /// # Arguments
    /// * `proposer` - Account escrowing the deposit (must authorize)
    /// * `name` - Parameter to change
    /// * `value` - Proposed value
    ///
    /// # Returns
    /// Proposal id, the fingerprint of `(name, value)`
    pub fn propose_reparameterization(
        env: Env,
        proposer: Address,
        name: ParamKey,
        value: u64,
    ) -> Result<BytesN<32>, ParameterizerError> {
        Self::require_initialized(&env)?;

        proposer.require_auth();

        let prop_id = params::proposal_id(&env, &name, value);
        if storage::load_proposal(&env, &prop_id).is_some() {
            return Err(ParameterizerError::ProposalExists);
        }
        if value == params::get(&env, &name) {
            return Err(ParameterizerError::NoChange);
        }
        if name.is_percentage() && value > 100 {
            return Err(ParameterizerError::PercentageOutOfRange);
        }

        let deposit = i128::from(params::get(&env, &ParamKey::PMinDeposit));
        let (app_expiry, process_by) = math::deadlines(
            env.ledger().timestamp(),
            params::get(&env, &ParamKey::PApplyStageLen),
            params::get(&env, &ParamKey::PCommitStageLen),
            params::get(&env, &ParamKey::PRevealStageLen),
        )?;

        let proposal = ParamProposal {
            name,
            value,
            owner: proposer.clone(),
            deposit,
            app_expiry,
            process_by,
            challenge_id: None,
        };
        storage::save_proposal(&env, &prop_id, &proposal);
        storage::bump_instance(&env);

        events::proposal_submitted(&env, &prop_id, &proposal);
        log!(&env, "proposal submitted", prop_id, value, deposit);

        Self::escrow(&env, &proposer, deposit)?;

        Ok(prop_id)
    }

    /// Challenge a pending proposal by matching its deposit.
    ///
    /// # Arguments
    /// * `challenger` - Account escrowing the counter-deposit (must authorize)
    /// * `prop_id` - Proposal to challenge
    ///
    /// # Returns
    /// Poll id of the opened ballot, which is also the challenge id
    pub fn challenge_reparameterization(
        env: Env,
        challenger: Address,
        prop_id: BytesN<32>,
    ) -> Result<u64, ParameterizerError> {
        Self::require_initialized(&env)?;

        challenger.require_auth();

        let mut proposal =
            storage::load_proposal(&env, &prop_id).ok_or(ParameterizerError::ProposalNotFound)?;
        if proposal.challenge_id.is_some() {
            return Err(ParameterizerError::AlreadyChallenged);
        }

        let commit_len = params::get(&env, &ParamKey::PCommitStageLen);
        let reveal_len = params::get(&env, &ParamKey::PRevealStageLen);
        let reward_pool = math::reward_pool(
            proposal.deposit,
            params::get(&env, &ParamKey::PDispensationPct),
        )?;

        let poll_id = Self::voting_client(&env)?.start_poll(
            &params::get(&env, &ParamKey::PVoteQuorum),
            &commit_len,
            &reveal_len,
        );
        if storage::load_challenge(&env, poll_id).is_some() {
            return Err(ParameterizerError::StorageCorrupted);
        }

        let commit_end = env
            .ledger()
            .timestamp()
            .checked_add(commit_len)
            .ok_or(ParameterizerError::Overflow)?;
        let reveal_end = commit_end
            .checked_add(reveal_len)
            .ok_or(ParameterizerError::Overflow)?;

        let challenge = Challenge {
            challenger: challenger.clone(),
            stake: proposal.deposit,
            reward_pool,
            winning_tokens: 0,
            resolved: false,
        };
        storage::save_challenge(&env, poll_id, &challenge);
        proposal.challenge_id = Some(poll_id);
        storage::save_proposal(&env, &prop_id, &proposal);
        storage::bump_instance(&env);

        events::challenge_opened(&env, &prop_id, poll_id, &challenger, commit_end, reveal_end);
        log!(&env, "proposal challenged", prop_id, poll_id);

        Self::escrow(&env, &challenger, proposal.deposit)?;

        Ok(poll_id)
    }

    /// Move a proposal forward. Callable by anyone.
    ///
    /// Evaluated in order:
    /// 1. Application window over, deadline not reached, unchallenged: set the
    ///    value and refund the proposer
    /// 2. Challenge poll ended and unresolved: resolve the challenge and pay
    ///    the winner
    /// 3. Past `process_by`: expire and refund the proposer
    ///
    /// Fails with `NotProcessable` when none applies yet.
    pub fn process_proposal(env: Env, prop_id: BytesN<32>) -> Result<(), ParameterizerError> {
        Self::require_initialized(&env)?;

        let proposal =
            storage::load_proposal(&env, &prop_id).ok_or(ParameterizerError::ProposalNotFound)?;
        let now = env.ledger().timestamp();

        let (recipient, amount) = if Self::is_settable(&proposal, now) {
            params::set(&env, &proposal.name, proposal.value);
            storage::remove_proposal(&env, &prop_id);
            events::proposal_accepted(&env, &prop_id, &proposal.name, proposal.value);
            log!(&env, "proposal accepted", prop_id.clone(), proposal.value);
            (proposal.owner, proposal.deposit)
        } else if Self::is_resolvable(&env, &proposal)? {
            Self::resolve_challenge(&env, &prop_id, &proposal, now)?
        } else if now > proposal.process_by {
            storage::remove_proposal(&env, &prop_id);
            events::proposal_expired(&env, &prop_id);
            log!(&env, "proposal expired", prop_id.clone());
            (proposal.owner, proposal.deposit)
        } else {
            return Err(ParameterizerError::NotProcessable);
        };

        Self::check_params(&env, now)?;
        storage::bump_instance(&env);

        Self::payout(&env, &recipient, amount)
    }

    /// Claim a voter's share of a resolved challenge's reward pool.
    ///
    /// # Arguments
    /// * `voter` - Winning-side voter (must authorize)
    /// * `challenge_id` - Poll id of the challenge
    ///
    /// # Returns
    /// Amount paid to the voter
    pub fn claim_reward(
        env: Env,
        voter: Address,
        challenge_id: u64,
    ) -> Result<i128, ParameterizerError> {
        Self::require_initialized(&env)?;

        voter.require_auth();

        Self::claim(&env, &voter, challenge_id)
    }

    /// Claim several challenges in order. Any failing claim aborts the batch.
    ///
    /// # Returns
    /// Total amount paid to the voter
    pub fn claim_rewards(
        env: Env,
        voter: Address,
        challenge_ids: Vec<u64>,
    ) -> Result<i128, ParameterizerError> {
        Self::require_initialized(&env)?;

        voter.require_auth();

        let mut total: i128 = 0;
        for challenge_id in challenge_ids.iter() {
            let reward = Self::claim(&env, &voter, challenge_id)?;
            total = total
                .checked_add(reward)
                .ok_or(ParameterizerError::Overflow)?;
        }
        Ok(total)
    }

    /// Current value of a parameter, 0 if never set.
    pub fn get(env: Env, name: ParamKey) -> u64 {
        params::get(&env, &name)
    }

    /// Proposal id for a `(name, value)` pair.
    pub fn proposal_id(env: Env, name: ParamKey, value: u64) -> BytesN<32> {
        params::proposal_id(&env, &name, value)
    }

    pub fn prop_exists(env: Env, prop_id: BytesN<32>) -> bool {
        storage::load_proposal(&env, &prop_id).is_some()
    }

    /// Whether processing would accept the proposal right now.
    pub fn can_be_set(env: Env, prop_id: BytesN<32>) -> bool {
        match storage::load_proposal(&env, &prop_id) {
            Some(proposal) => Self::is_settable(&proposal, env.ledger().timestamp()),
            None => false,
        }
    }

    /// Whether processing would resolve the proposal's challenge right now.
    pub fn challenge_can_be_resolved(
        env: Env,
        prop_id: BytesN<32>,
    ) -> Result<bool, ParameterizerError> {
        Self::require_initialized(&env)?;
        match storage::load_proposal(&env, &prop_id) {
            Some(proposal) => Self::is_resolvable(&env, &proposal),
            None => Ok(false),
        }
    }

    pub fn get_proposal(
        env: Env,
        prop_id: BytesN<32>,
    ) -> Result<ParamProposal, ParameterizerError> {
        storage::load_proposal(&env, &prop_id).ok_or(ParameterizerError::ProposalNotFound)
    }

    pub fn get_challenge(env: Env, challenge_id: u64) -> Result<Challenge, ParameterizerError> {
        storage::load_challenge(&env, challenge_id).ok_or(ParameterizerError::ChallengeNotFound)
    }

    /// What the winner of an ended, unresolved challenge would receive.
    pub fn challenge_winner_reward(
        env: Env,
        challenge_id: u64,
    ) -> Result<i128, ParameterizerError> {
        Self::require_initialized(&env)?;

        let challenge = storage::load_challenge(&env, challenge_id)
            .ok_or(ParameterizerError::ChallengeNotFound)?;
        if challenge.resolved {
            return Err(ParameterizerError::AlreadyResolved);
        }

        let voting = Self::voting_client(&env)?;
        if !voting.poll_ended(&challenge_id) {
            return Err(ParameterizerError::PollNotEnded);
        }

        math::winner_reward(
            challenge.stake,
            challenge.reward_pool,
            voting.total_winning_tokens(&challenge_id),
        )
    }

    /// What `voter` would receive by claiming now.
    pub fn voter_reward(
        env: Env,
        voter: Address,
        challenge_id: u64,
    ) -> Result<i128, ParameterizerError> {
        Self::require_initialized(&env)?;

        let challenge = storage::load_challenge(&env, challenge_id)
            .ok_or(ParameterizerError::ChallengeNotFound)?;
        if !challenge.resolved {
            return Err(ParameterizerError::NotResolved);
        }

        let voter_tokens = Self::voting_client(&env)?.passing_tokens(&voter, &challenge_id);
        math::voter_reward(voter_tokens, challenge.reward_pool, challenge.winning_tokens)
    }

    pub fn has_claimed(env: Env, challenge_id: u64, voter: Address) -> bool {
        storage::has_claimed(&env, challenge_id, &voter)
    }

    /// Get the token contract address.
    pub fn get_token(env: Env) -> Result<Address, ParameterizerError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(ParameterizerError::StorageCorrupted)
    }

    /// Get the voting contract address.
    pub fn get_voting(env: Env) -> Result<Address, ParameterizerError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::Voting)
            .ok_or(ParameterizerError::StorageCorrupted)
    }

    // --- Internal helpers ---

    fn require_initialized(env: &Env) -> Result<(), ParameterizerError> {
        if !env.storage().instance().has(&DataKey::Token) {
            return Err(ParameterizerError::NotInitialized);
        }
        Ok(())
    }

    fn is_settable(proposal: &ParamProposal, now: u64) -> bool {
        now > proposal.app_expiry && now < proposal.process_by && proposal.challenge_id.is_none()
    }

    fn is_resolvable(env: &Env, proposal: &ParamProposal) -> Result<bool, ParameterizerError> {
        let Some(challenge_id) = proposal.challenge_id else {
            return Ok(false);
        };
        let challenge = storage::load_challenge(env, challenge_id)
            .ok_or(ParameterizerError::StorageCorrupted)?;
        if challenge.resolved {
            return Ok(false);
        }
        Ok(Self::voting_client(env)?.poll_ended(&challenge_id))
    }

    /// Settle a challenged proposal whose poll has ended.
    ///
    /// Records the outcome and removes the proposal, then hands back who gets
    /// paid and how much; the caller transfers last.
    fn resolve_challenge(
        env: &Env,
        prop_id: &BytesN<32>,
        proposal: &ParamProposal,
        now: u64,
    ) -> Result<(Address, i128), ParameterizerError> {
        let challenge_id = proposal
            .challenge_id
            .ok_or(ParameterizerError::StorageCorrupted)?;
        let mut challenge = storage::load_challenge(env, challenge_id)
            .ok_or(ParameterizerError::StorageCorrupted)?;

        let voting = Self::voting_client(env)?;
        let winning_tokens = voting.total_winning_tokens(&challenge_id);
        let reward = math::winner_reward(challenge.stake, challenge.reward_pool, winning_tokens)?;
        // Nobody voted for the winner: the challenger takes both stakes and
        // nothing is left for voters.
        let proposal_won = winning_tokens != 0 && voting.is_passed(&challenge_id);

        challenge.winning_tokens = winning_tokens;
        challenge.resolved = true;
        if winning_tokens == 0 {
            challenge.reward_pool = 0;
        }
        storage::save_challenge(env, challenge_id, &challenge);
        storage::remove_proposal(env, prop_id);

        let recipient = if proposal_won {
            if proposal.process_by > now {
                params::set(env, &proposal.name, proposal.value);
            }
            events::challenge_settled(env, prop_id, challenge_id, &challenge, false);
            log!(env, "challenge failed", challenge_id, reward);
            proposal.owner.clone()
        } else {
            events::challenge_settled(env, prop_id, challenge_id, &challenge, true);
            log!(env, "challenge succeeded", challenge_id, reward);
            challenge.challenger.clone()
        };

        Ok((recipient, reward))
    }

    fn claim(env: &Env, voter: &Address, challenge_id: u64) -> Result<i128, ParameterizerError> {
        let mut challenge = storage::load_challenge(env, challenge_id)
            .ok_or(ParameterizerError::ChallengeNotFound)?;
        if storage::has_claimed(env, challenge_id, voter) {
            return Err(ParameterizerError::AlreadyClaimed);
        }
        if !challenge.resolved {
            return Err(ParameterizerError::NotResolved);
        }

        let voter_tokens = Self::voting_client(env)?.passing_tokens(voter, &challenge_id);
        let claim =
            math::settle_claim(voter_tokens, challenge.reward_pool, challenge.winning_tokens)?;

        challenge.reward_pool = claim.reward_pool;
        challenge.winning_tokens = claim.winning_tokens;
        storage::save_challenge(env, challenge_id, &challenge);
        storage::mark_claimed(env, challenge_id, voter);
        storage::bump_instance(env);

        events::reward_claimed(env, challenge_id, voter, claim.reward);
        log!(env, "reward claimed", challenge_id, claim.reward);

        Self::payout(env, voter, claim.reward)?;

        Ok(claim.reward)
    }

    /// Parameters every future proposal depends on must stay usable.
    fn check_params(env: &Env, now: u64) -> Result<(), ParameterizerError> {
        if params::get(env, &ParamKey::DispensationPct) > 100
            || params::get(env, &ParamKey::PDispensationPct) > 100
        {
            return Err(ParameterizerError::InvalidDispensation);
        }
        math::deadlines(
            now,
            params::get(env, &ParamKey::PApplyStageLen),
            params::get(env, &ParamKey::PCommitStageLen),
            params::get(env, &ParamKey::PRevealStageLen),
        )?;
        Ok(())
    }

    fn token_client(env: &Env) -> Result<token::Client<'_>, ParameterizerError> {
        let token: Address = env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(ParameterizerError::StorageCorrupted)?;
        Ok(token::Client::new(env, &token))
    }

    fn voting_client(env: &Env) -> Result<VotingClient<'_>, ParameterizerError> {
        let voting: Address = env
            .storage()
            .instance()
            .get(&DataKey::Voting)
            .ok_or(ParameterizerError::StorageCorrupted)?;
        Ok(VotingClient::new(env, &voting))
    }

    /// Pull `amount` from `from` into the contract.
    fn escrow(env: &Env, from: &Address, amount: i128) -> Result<(), ParameterizerError> {
        // Note: token_client.transfer() panics on failure (insufficient balance,
        // missing authorization), which aborts the whole invocation.
        if amount > 0 {
            Self::token_client(env)?.transfer(from, &env.current_contract_address(), &amount);
        }
        Ok(())
    }

    /// Send `amount` from the contract to `to`.
    fn payout(env: &Env, to: &Address, amount: i128) -> Result<(), ParameterizerError> {
        if amount > 0 {
            Self::token_client(env)?.transfer(&env.current_contract_address(), to, &amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod mock_voting {
    use soroban_sdk::{contract, contractimpl, contracttype, Address, Env};

    #[derive(Clone)]
    #[contracttype]
    enum PollKey {
        Count,
        Config(u64),
        Ended(u64),
        Passed(u64),
        Total(u64),
        Passing(u64, Address),
    }

    /// Voting contract double: tests cast winning-side votes and end polls by hand.
    #[contract]
    pub struct MockVoting;

    #[contractimpl]
    impl MockVoting {
        pub fn start_poll(
            env: Env,
            vote_quorum: u64,
            commit_duration: u64,
            reveal_duration: u64,
        ) -> u64 {
            let poll_id: u64 = env.storage().instance().get(&PollKey::Count).unwrap_or(0) + 1;
            env.storage().instance().set(&PollKey::Count, &poll_id);
            env.storage().instance().set(
                &PollKey::Config(poll_id),
                &(vote_quorum, commit_duration, reveal_duration),
            );
            poll_id
        }

        pub fn poll_ended(env: Env, poll_id: u64) -> bool {
            env.storage()
                .instance()
                .get(&PollKey::Ended(poll_id))
                .unwrap_or(false)
        }

        pub fn is_passed(env: Env, poll_id: u64) -> bool {
            env.storage()
                .instance()
                .get(&PollKey::Passed(poll_id))
                .unwrap_or(false)
        }

        pub fn passing_tokens(env: Env, voter: Address, poll_id: u64) -> i128 {
            env.storage()
                .instance()
                .get(&PollKey::Passing(poll_id, voter))
                .unwrap_or(0)
        }

        pub fn total_winning_tokens(env: Env, poll_id: u64) -> i128 {
            env.storage()
                .instance()
                .get(&PollKey::Total(poll_id))
                .unwrap_or(0)
        }

        /// Record `tokens` revealed by `voter` for the option that will win.
        pub fn vote(env: Env, poll_id: u64, voter: Address, tokens: i128) {
            let total: i128 = env
                .storage()
                .instance()
                .get(&PollKey::Total(poll_id))
                .unwrap_or(0);
            env.storage()
                .instance()
                .set(&PollKey::Total(poll_id), &(total + tokens));
            env.storage()
                .instance()
                .set(&PollKey::Passing(poll_id, voter), &tokens);
        }

        /// End the poll; `passed` true means the proposal side won.
        pub fn end_poll(env: Env, poll_id: u64, passed: bool) {
            env.storage().instance().set(&PollKey::Ended(poll_id), &true);
            env.storage()
                .instance()
                .set(&PollKey::Passed(poll_id), &passed);
        }

        pub fn poll_config(env: Env, poll_id: u64) -> (u64, u64, u64) {
            env.storage()
                .instance()
                .get(&PollKey::Config(poll_id))
                .unwrap()
        }
    }
}
