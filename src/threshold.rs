use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::domain::UserId;
use crate::error::InvalidInput;

/// Threshold used when neither configuration nor the user picked one.
pub const DEFAULT_PRICE_THRESHOLD: f64 = 300.0;

/// Per-user price ceilings with a shared default.
///
/// Users without an explicit entry see the default injected at construction.
/// Entries are independent, so concurrent commands from different users only
/// contend on the lock, never on each other's values.
#[derive(Debug)]
pub struct ThresholdStore {
    default: f64,
    overrides: RwLock<HashMap<UserId, f64>>,
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_THRESHOLD)
    }
}

impl ThresholdStore {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_threshold(&self) -> f64 {
        self.default
    }

    pub fn get(&self, user: UserId) -> f64 {
        self.overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .copied()
            .unwrap_or(self.default)
    }

    /// Stores a new ceiling for `user`. Zero, negative and non-finite amounts
    /// are rejected and leave the previous value in place.
    pub fn set(&self, user: UserId, amount: f64) -> Result<f64, InvalidInput> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(InvalidInput::Threshold(amount.to_string()));
        }
        self.overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, amount);
        debug!("Threshold for user {} set to {:.2}", user, amount);
        Ok(amount)
    }
}
