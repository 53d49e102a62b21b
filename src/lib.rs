//! Loisir
//!
//! Loisir prices leisure-activity bookings: conditional pricing rules folded in
//! priority order over a base price, weekly and fixed-window promotions, and a
//! fully explained breakdown ready for display and payment.

pub mod accumulator;
pub mod discovery;
pub mod fixtures;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod repository;
pub mod rules;
pub mod schedule;
pub mod supersession;
pub mod uuids;
