use crate::model::entity::AssembledArtifact;

/// Result of recording a chunk in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The record is now authoritative for its index.
    Recorded { remaining: u64 },
    /// A verified record already exists for the index; the submission is a
    /// no-op and the earlier record stays authoritative.
    DuplicateIgnored { remaining: u64 },
    /// Index is not within `0..declared_chunk_count`.
    OutOfRange,
}

/// Result of the atomic completeness-check + `Open -> Assembling` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyClaim {
    /// The caller won the claim and must assemble.
    Claimed,
    /// Not every index has a verified record yet.
    NotReady,
    /// Another caller holds or held the claim; no side effects.
    AlreadyClaimed,
}

/// Result of driving assembly. Lost races are outcomes here, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleOutcome {
    Assembled(AssembledArtifact),
    NotReady,
    AlreadyAssembled,
    /// Whole-file verification failed; the session is now `Failed`.
    ChecksumMismatch,
    /// The session went terminal between the claim and completion; the
    /// winner's work was discarded and the terminal state stands.
    Aborted,
}

/// Result of a successful chunk submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { remaining: u64 },
    DuplicateIgnored { remaining: u64 },
}

/// What `get_artifact` observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Ready(AssembledArtifact),
    NotReady,
    Failed { reason: Option<String> },
}
