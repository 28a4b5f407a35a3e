//! Due-date notifications for Bitacora.
//!
//! Notifications are derived alerts about tasks approaching or past their
//! due date. The on-demand path emits one message per qualifying task; the
//! scheduled path sweeps every user and emits one aggregate message per
//! category. Both shapes are part of the product contract.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Generation and dismissal services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
