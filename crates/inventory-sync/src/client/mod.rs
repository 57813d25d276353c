//! Remote inventory client abstraction.
//!
//! - [`InventoryClient`]: the backend contract
//! - [`RetryingClient`] and [`RetryPolicy`]: transparent, bounded retry of
//!   throttled calls

mod retry;
mod traits;

pub use retry::{RetryPolicy, RetryingClient};
pub use traits::InventoryClient;
