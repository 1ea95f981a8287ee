//! Tax snapshot provider contract.
//!
//! The ledger core treats tax lookup as an external, side-effect-free
//! service: given a tax rate id and an as-of date it returns a fractional
//! rate. Unavailability is a retryable external failure; the scheduler
//! records it and moves on.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tally_shared::types::TaxRateId;

/// Errors from the tax snapshot provider.
#[derive(Debug, Error)]
pub enum TaxError {
    /// No rate is registered for the requested id.
    #[error("Unknown tax rate: {0}")]
    UnknownRate(TaxRateId),

    /// The provider could not be reached; retryable.
    #[error("Tax provider unavailable: {0}")]
    Unavailable(String),
}

/// External tax rate lookup, consumed behind this trait.
///
/// Implementations must be pure lookups: the rate returned for a given
/// (id, as-of) pair is frozen into generated lines and never recomputed.
#[async_trait]
pub trait TaxRateProvider: Send + Sync {
    /// The fractional rate (e.g. `0.10` for 10%) effective at `as_of`.
    async fn rate_for(&self, tax_rate_id: TaxRateId, as_of: NaiveDate) -> Result<Decimal, TaxError>;
}

/// In-memory provider backed by a fixed rate table.
///
/// Default wiring for the server and the test double for the scheduler.
#[derive(Debug, Clone, Default)]
pub struct StaticTaxRates {
    rates: HashMap<TaxRateId, Decimal>,
}

impl StaticTaxRates {
    /// Creates a provider from (id, rate) pairs.
    #[must_use]
    pub fn new(rates: impl IntoIterator<Item = (TaxRateId, Decimal)>) -> Self {
        Self {
            rates: rates.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TaxRateProvider for StaticTaxRates {
    async fn rate_for(
        &self,
        tax_rate_id: TaxRateId,
        _as_of: NaiveDate,
    ) -> Result<Decimal, TaxError> {
        self.rates
            .get(&tax_rate_id)
            .copied()
            .ok_or(TaxError::UnknownRate(tax_rate_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    #[tokio::test]
    async fn test_static_rates_resolve() {
        let id = TaxRateId::new();
        let provider = StaticTaxRates::new([(id, dec!(0.11))]);
        assert_eq!(provider.rate_for(id, date()).await.unwrap(), dec!(0.11));
    }

    #[tokio::test]
    async fn test_unknown_rate_is_an_error() {
        let provider = StaticTaxRates::default();
        let result = provider.rate_for(TaxRateId::new(), date()).await;
        assert!(matches!(result, Err(TaxError::UnknownRate(_))));
    }
}
