use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ParameterizerError {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// Initial parameter list must hold exactly fourteen values
    InvalidParams = 3,
    /// An identical (name, value) proposal is already pending
    ProposalExists = 4,
    /// Proposed value equals the current value
    NoChange = 5,
    /// Percentage parameter above 100
    PercentageOutOfRange = 6,
    /// No pending proposal with this id
    ProposalNotFound = 7,
    /// Proposal already has a challenge attached
    AlreadyChallenged = 8,
    /// Proposal can be neither accepted, resolved nor expired yet
    NotProcessable = 9,
    /// No challenge with this id
    ChallengeNotFound = 10,
    /// Challenge not resolved yet
    NotResolved = 11,
    /// Voter already claimed the reward for this challenge
    AlreadyClaimed = 12,
    /// Voter has no winning-side tokens to claim against
    NothingToClaim = 13,
    /// Ballot still in commit or reveal stage
    PollNotEnded = 14,
    /// A dispensation percentage drifted above 100
    InvalidDispensation = 15,
    /// Arithmetic overflow
    Overflow = 16,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 17,
    /// Challenge already resolved
    AlreadyResolved = 18,
    /// Voting contract reported more winning weight for a voter than remains
    InconsistentTally = 19,
}
