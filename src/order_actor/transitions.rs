use thiserror::Error;

use crate::domain::OrderStatus;

/// Client-side rejection of a requested status change. Nothing is sent when one is raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("no target status selected")]
    NoStatusSelected,
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("order is already {0}")]
    Unchanged(OrderStatus),
    #[error("cannot move from {from} to {to}")]
    NotAllowed { from: String, to: OrderStatus },
    #[error("only pending orders can be confirmed (order is {0})")]
    NotPending(String),
}

/// Decides which statuses an operator may pick next.
pub trait TransitionPolicy: Send + Sync {
    /// Selectable next statuses in canonical order. `current` is `None` when the
    /// order carries a status outside the vocabulary.
    fn next_statuses(&self, current: Option<OrderStatus>) -> Vec<OrderStatus>;
}

/// Offers the whole vocabulary from every state.
///
/// This mirrors the service's current behaviour and places no constraint on
/// edges; the intended restrictions have not been agreed yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissivePolicy;

impl TransitionPolicy for PermissivePolicy {
    fn next_statuses(&self, _current: Option<OrderStatus>) -> Vec<OrderStatus> {
        OrderStatus::ALL.to_vec()
    }
}

/// Checks an operator's selection against the current raw status.
pub fn validate_transition(
    policy: &dyn TransitionPolicy,
    current: &str,
    target: &str,
) -> Result<OrderStatus, TransitionError> {
    let target_raw = target.trim();
    if target_raw.is_empty() {
        return Err(TransitionError::NoStatusSelected);
    }
    let target = OrderStatus::parse(target_raw)
        .ok_or_else(|| TransitionError::UnknownStatus(target_raw.to_string()))?;

    let current_status = OrderStatus::parse(current);
    if current_status == Some(target) {
        return Err(TransitionError::Unchanged(target));
    }
    if !policy.next_statuses(current_status).contains(&target) {
        return Err(TransitionError::NotAllowed {
            from: current.to_string(),
            to: target,
        });
    }
    Ok(target)
}
