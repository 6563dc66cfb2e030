use switchboard_protocol::{SessionStatus, TargetStatus};

/// Targets that may be offered for a session currently in `current`.
///
/// A status is never offered as its own target, a closed session cannot be
/// paused, and deletion is always available.
pub fn legal_transitions(current: SessionStatus) -> Vec<TargetStatus> {
    TargetStatus::ALL
        .into_iter()
        .filter(|target| is_legal(current, *target))
        .collect()
}

pub fn is_legal(current: SessionStatus, target: TargetStatus) -> bool {
    use {SessionStatus as S, TargetStatus as T};

    match (current, target) {
        (_, T::Delete) => true,
        (S::Opened, T::Opened)
        | (S::Paused, T::Paused)
        | (S::Closed, T::Closed)
        | (S::Closed, T::Paused) => false,
        _ => true,
    }
}
