use thiserror::Error;

/// Typed failures for aggregate mutations. Validation errors are
/// rejected before any part of the tree is touched; not-found errors
/// let the command layer decide the user-facing message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("week number {0} is invalid (must be >= 1)")]
    InvalidWeekNumber(u32),

    #[error("week {0} already exists in this programme")]
    DuplicateWeek(u32),

    #[error("week not found")]
    WeekNotFound,

    #[error("exercise not found")]
    ExerciseNotFound,

    #[error("set not found")]
    SetNotFound,

    #[error("a superset needs at least 2 exercises")]
    InsufficientExercises,

    #[error("superset members must be distinct exercises")]
    DuplicateSupersetMember,

    #[error("cannot copy a week onto itself")]
    SameWeekCopy,

    #[error("reorder list must name every exercise of the day exactly once")]
    IncompleteReorder,
}

pub type DomainResult<T> = Result<T, DomainError>;
