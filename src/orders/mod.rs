//! Order lifecycle
//!
//! - [`status`] - the order status state machine
//! - [`settlement`] - scan / confirm-settlement / cancel protocol

pub mod settlement;
pub mod status;

pub use settlement::{
    ScanOutcome, SettleOutcome, authorize_actor, cancel_order, confirm_settlement, scan_order,
};
pub use status::OrderStatus;
