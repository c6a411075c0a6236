use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::currency::{pivot_pair, PIVOT_CURRENCY};
use crate::models::quote::Quote;

/// Converts stock prices between currencies using a USD-pivoted snapshot.
///
/// Snapshot rates are "units of X per 1 USD", so a price in `base` becomes
/// USD by dividing by `USD{base}` and reaches `target` by multiplying with
/// `USD{target}`:
/// - SEK → USD: `price / USDSEK`
/// - SEK → NOK: `price / USDSEK * USDNOK`
///
/// Currency codes are compared exactly; callers normalize them first.
/// All arithmetic stays in `Decimal`.
pub struct CurrencyService;

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Express a unit `price` quoted in `base` in the `target` currency.
    ///
    /// Same currency is a no-op and needs no snapshot. Otherwise a missing
    /// snapshot is `RatesUnavailable` and a missing pair is `MissingRate`;
    /// neither ever defaults to a rate of 1.
    pub fn convert_price(
        &self,
        price: Decimal,
        base: &str,
        target: &str,
        rates: Option<&Quote>,
    ) -> Result<Decimal, CoreError> {
        if base == target {
            return Ok(price);
        }

        let rates = rates.ok_or(CoreError::RatesUnavailable)?;

        let rate_to_usd = if base == PIVOT_CURRENCY {
            Decimal::ONE
        } else {
            Self::lookup(rates, base)?
        };
        let in_usd = price.checked_div(rate_to_usd).ok_or_else(|| {
            CoreError::ValuationOverflow(format!("{price} {base} / {rate_to_usd}"))
        })?;

        if target == PIVOT_CURRENCY {
            return Ok(in_usd);
        }

        let target_rate = Self::lookup(rates, target)?;
        in_usd.checked_mul(target_rate).ok_or_else(|| {
            CoreError::ValuationOverflow(format!("{in_usd} USD * {target_rate} {target}"))
        })
    }

    /// Value of `shares` units priced at `price` in `base`, expressed in `target`.
    pub fn convert_holding(
        &self,
        price: Decimal,
        shares: u32,
        base: &str,
        target: &str,
        rates: Option<&Quote>,
    ) -> Result<Decimal, CoreError> {
        let unit = self.convert_price(price, base, target, rates)?;
        unit.checked_mul(Decimal::from(shares))
            .ok_or_else(|| CoreError::ValuationOverflow(format!("{unit} {target} * {shares} shares")))
    }

    /// Rate for `currency` per USD. Must be present and strictly positive.
    fn lookup(rates: &Quote, currency: &str) -> Result<Decimal, CoreError> {
        let pair = pivot_pair(currency);
        let rate = rates
            .rate(&pair)
            .ok_or_else(|| CoreError::MissingRate(pair.clone()))?;
        if rate <= Decimal::ZERO {
            return Err(CoreError::InvalidRate {
                pair,
                rate: rate.to_string(),
            });
        }
        Ok(rate)
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
