//! Error types shared by the planner core.

use crate::models::OrderOutcome;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Longitude outside [-180, 180] or latitude outside [-90, 90].
    #[error("invalid coordinate ({longitude}, {latitude})")]
    InvalidCoordinate { longitude: f64, latitude: f64 },

    #[error("invalid zone '{name}': {reason}")]
    InvalidZone { name: String, reason: String },

    /// Attempted outcome change outside the order lifecycle.
    #[error("order {order_no}: cannot move from {from:?} to {to:?}")]
    InvalidStateTransition {
        order_no: String,
        from: Option<OrderOutcome>,
        to: OrderOutcome,
    },
}
