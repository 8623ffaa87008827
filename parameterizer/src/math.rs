//! Stake, reward and deadline arithmetic.
//!
//! All amounts are token units (i128), all times are ledger timestamps in
//! seconds (u64). Every operation is checked; overflow surfaces as
//! `ParameterizerError::Overflow` instead of wrapping.
//!
//! Reward flow:
//! - Challenge opened: reward_pool = (100 - dispensation_pct) * stake / 100
//! - Challenge resolved: winner gets 2 * stake - reward_pool, or 2 * stake if
//!   nobody voted for the winning side
//! - Voter claims: reward = voter_tokens * reward_pool / winning_tokens, using
//!   the running values left behind by earlier claimants

use crate::error::ParameterizerError;
use crate::storage::{PERCENT_DENOMINATOR, PROCESS_BY_GRACE};

/// Portion of a stake set aside for winning-side voters.
pub fn reward_pool(stake: i128, dispensation_pct: u64) -> Result<i128, ParameterizerError> {
    if dispensation_pct > 100 {
        return Err(ParameterizerError::InvalidDispensation);
    }
    let kept = PERCENT_DENOMINATOR - i128::from(dispensation_pct);
    kept.checked_mul(stake)
        .ok_or(ParameterizerError::Overflow)?
        .checked_div(PERCENT_DENOMINATOR)
        .ok_or(ParameterizerError::Overflow)
}

/// What the winning party (proposer or challenger) receives at resolution.
pub fn winner_reward(
    stake: i128,
    reward_pool: i128,
    total_winning_tokens: i128,
) -> Result<i128, ParameterizerError> {
    let both_stakes = stake.checked_mul(2).ok_or(ParameterizerError::Overflow)?;
    if total_winning_tokens == 0 {
        return Ok(both_stakes);
    }
    both_stakes
        .checked_sub(reward_pool)
        .ok_or(ParameterizerError::Overflow)
}

/// A voter's share of the running reward pool. Floors, so the remainder stays
/// in the pool for later claimants and the last claimant sweeps it.
pub fn voter_reward(
    voter_tokens: i128,
    reward_pool: i128,
    winning_tokens: i128,
) -> Result<i128, ParameterizerError> {
    if voter_tokens <= 0 {
        return Err(ParameterizerError::NothingToClaim);
    }
    if voter_tokens > winning_tokens {
        return Err(ParameterizerError::InconsistentTally);
    }
    voter_tokens
        .checked_mul(reward_pool)
        .ok_or(ParameterizerError::Overflow)?
        .checked_div(winning_tokens)
        .ok_or(ParameterizerError::Overflow)
}

/// Running state of a challenge after one voter claims.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Claim {
    pub reward: i128,
    pub reward_pool: i128,
    pub winning_tokens: i128,
}

/// Pay one voter and shrink pool and weight together.
pub fn settle_claim(
    voter_tokens: i128,
    reward_pool: i128,
    winning_tokens: i128,
) -> Result<Claim, ParameterizerError> {
    let reward = voter_reward(voter_tokens, reward_pool, winning_tokens)?;
    Ok(Claim {
        reward,
        reward_pool: reward_pool
            .checked_sub(reward)
            .ok_or(ParameterizerError::Overflow)?,
        winning_tokens: winning_tokens
            .checked_sub(voter_tokens)
            .ok_or(ParameterizerError::Overflow)?,
    })
}

/// `(app_expiry, process_by)` for a proposal submitted at `now`.
pub fn deadlines(
    now: u64,
    apply_len: u64,
    commit_len: u64,
    reveal_len: u64,
) -> Result<(u64, u64), ParameterizerError> {
    let app_expiry = now.checked_add(apply_len).ok_or(ParameterizerError::Overflow)?;
    let process_by = app_expiry
        .checked_add(commit_len)
        .and_then(|t| t.checked_add(reveal_len))
        .and_then(|t| t.checked_add(PROCESS_BY_GRACE))
        .ok_or(ParameterizerError::Overflow)?;
    Ok((app_expiry, process_by))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_pool() {
        assert_eq!(reward_pool(100, 50).unwrap(), 50);
        assert_eq!(reward_pool(100, 0).unwrap(), 100);
        assert_eq!(reward_pool(100, 100).unwrap(), 0);
        // 70% of 33 floors to 23
        assert_eq!(reward_pool(33, 30).unwrap(), 23);
    }

    #[test]
    fn test_reward_pool_rejects_bad_dispensation() {
        assert!(matches!(
            reward_pool(100, 101),
            Err(ParameterizerError::InvalidDispensation)
        ));
    }

    #[test]
    fn test_winner_reward() {
        assert_eq!(winner_reward(100, 50, 10).unwrap(), 150);
        // Nobody voted for the winning side: both stakes go to the winner
        assert_eq!(winner_reward(100, 50, 0).unwrap(), 200);
    }

    #[test]
    fn test_winner_reward_overflow() {
        assert!(matches!(
            winner_reward(i128::MAX, 0, 1),
            Err(ParameterizerError::Overflow)
        ));
    }

    #[test]
    fn test_seventy_thirty_split() {
        let first = settle_claim(70, 100, 100).unwrap();
        assert_eq!(
            first,
            Claim {
                reward: 70,
                reward_pool: 30,
                winning_tokens: 30
            }
        );
        let second = settle_claim(30, first.reward_pool, first.winning_tokens).unwrap();
        assert_eq!(second.reward, 30);
        assert_eq!(second.reward_pool, 0);
        assert_eq!(second.winning_tokens, 0);
    }

    #[test]
    fn test_voter_reward_rejects_zero_weight() {
        assert!(matches!(
            voter_reward(0, 100, 100),
            Err(ParameterizerError::NothingToClaim)
        ));
    }

    #[test]
    fn test_voter_reward_rejects_weight_above_remaining() {
        assert!(matches!(
            voter_reward(101, 100, 100),
            Err(ParameterizerError::InconsistentTally)
        ));
    }

    #[test]
    fn test_claims_never_exceed_pool_and_keep_proportion() {
        // Awkward weights so every claim rounds down
        let weights: [i128; 5] = [7, 13, 29, 3, 48];
        let initial_pool: i128 = 97;
        let mut pool = initial_pool;
        let mut tokens: i128 = weights.iter().sum();
        let mut paid: i128 = 0;

        for w in weights {
            let claim = settle_claim(w, pool, tokens).unwrap();
            paid += claim.reward;

            // pool/tokens never drops below its previous ratio and rises by
            // less than one unit of rounding
            if claim.winning_tokens > 0 {
                assert!(claim.reward_pool * tokens >= pool * claim.winning_tokens);
                assert!((claim.reward_pool - 1) * tokens < pool * claim.winning_tokens);
            }

            pool = claim.reward_pool;
            tokens = claim.winning_tokens;
            assert!(paid <= initial_pool);
        }

        // The last claimant sweeps the remainder
        assert_eq!(tokens, 0);
        assert_eq!(pool, 0);
        assert_eq!(paid, initial_pool);
    }

    #[test]
    fn test_deadlines() {
        let (app_expiry, process_by) = deadlines(1_000, 600, 300, 300).unwrap();
        assert_eq!(app_expiry, 1_600);
        assert_eq!(process_by, 2_200 + PROCESS_BY_GRACE);
    }

    #[test]
    fn test_deadlines_overflow() {
        assert!(matches!(
            deadlines(u64::MAX - 10, 5, 5, 5),
            Err(ParameterizerError::Overflow)
        ));
    }
}
