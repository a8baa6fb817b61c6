//! State management.
//!
//! [`Store`] is a generic observable state cell; [`CounterStore`] builds the
//! counter widget on top of it.

mod counter;
mod store;

pub use counter::{parse_persisted, CounterStore};
pub use store::{Store, SubscriptionId};
