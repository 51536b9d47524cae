/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use crate::util::date::Date;
use anyhow::{bail, Error};
use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One declared rate: how many units of `currency` one unit of the book's
/// base currency buys on `date`.
#[derive(Clone, Debug, Deserialize)]
pub struct RateRecord {
	pub currency: String,
	pub date: Date,
	pub rate: Decimal,
}

#[derive(Debug, Default)]
pub struct ExchangeRates {
	/// currency -> observations, most recent first once finalized
	resolved_rates: BTreeMap<String, Vec<(Date, Decimal)>>,

	is_finalized: bool,
}

impl ExchangeRates {
	pub fn new() -> Self {
		Default::default()
	}

	/// Adds a rate expressed against the base currency.
	pub fn add_rate(
		&mut self,
		date: Date,
		currency: &str,
		rate: Decimal,
	) -> Result<(), Error> {
		if rate <= Decimal::ZERO {
			bail!("Rate for {} on {} must be positive", currency, date)
		}

		let observations =
			self.resolved_rates.entry(currency.to_string()).or_default();

		if observations.iter().any(|(d, _)| *d == date) {
			bail!("Cannot declare multiple rates on same date")
		}

		observations.push((date, rate));
		self.is_finalized = false;

		Ok(())
	}

	/// Sorts observations for lookups, most recent first.
	pub fn finalize(&mut self) {
		for rates in self.resolved_rates.values_mut() {
			rates.sort_by(|(a, _), (b, _)| b.cmp(a));
		}
		self.is_finalized = true;
	}

	pub fn from_records(records: &[RateRecord]) -> Result<Self, Error> {
		let mut rates = Self::new();
		for r in records {
			rates.add_rate(r.date, &r.currency, r.rate)?;
		}
		rates.finalize();
		Ok(rates)
	}

	/// Retrieves the most recent rate, if any, at or before the given date
	pub fn get_rate_as_of(&self, currency: &str, as_of: &Date) -> Option<Decimal> {
		let rates = self.resolved_rates.get(currency)?;
		if self.is_finalized {
			return rates.iter().find(|(d, _)| d <= as_of).map(|(_, r)| *r);
		}
		rates
			.iter()
			.filter(|(d, _)| d <= as_of)
			.max_by(|(a, _), (b, _)| a.cmp(b))
			.map(|(_, r)| *r)
	}

	/// Rate of a currency as of a date, defaulting to parity when the
	/// currency has never been quoted; the base currency usually isn't.
	pub fn rate_or_parity(&self, currency: &str, as_of: &Date) -> Decimal {
		self.get_rate_as_of(currency, as_of).unwrap_or_else(|| {
			debug!("no rate for {} as of {}, using 1.0", currency, as_of);
			Decimal::ONE
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn d(s: &str) -> Date {
		Date::from_str(s).unwrap()
	}

	#[test]
	fn test_declare_valid_rate() {
		let mut exchange_rates = ExchangeRates::new();
		assert!(exchange_rates.add_rate(d("2024-1-1"), "EUR", Decimal::new(11, 1)).is_ok());
		assert!(exchange_rates.add_rate(d("2024-11-2"), "EUR", Decimal::new(12, 1)).is_ok());
	}

	#[test]
	fn test_declare_non_positive_rate() {
		let mut exchange_rates = ExchangeRates::new();
		assert!(exchange_rates.add_rate(d("2024-11-01"), "EUR", Decimal::ZERO).is_err());
		assert!(exchange_rates
			.add_rate(d("2024-11-01"), "EUR", Decimal::NEGATIVE_ONE)
			.is_err());
	}

	#[test]
	fn test_declare_twice_same_date() {
		let mut exchange_rates = ExchangeRates::new();
		exchange_rates.add_rate(d("2024-11-01"), "EUR", Decimal::new(11, 1)).unwrap();
		assert!(exchange_rates.add_rate(d("2024-11-01"), "EUR", Decimal::new(12, 1)).is_err());
	}

	#[test]
	fn test_rate_as_of_uses_latest_prior_observation() {
		let rates = ExchangeRates::from_records(&[
			RateRecord {
				currency: "EUR".to_string(),
				date: d("2017-01-01"),
				rate: Decimal::TWO,
			},
			RateRecord {
				currency: "EUR".to_string(),
				date: d("2017-12-01"),
				rate: Decimal::from(3),
			},
		])
		.unwrap();

		assert_eq!(rates.get_rate_as_of("EUR", &d("2016-12-31")), None);
		assert_eq!(rates.get_rate_as_of("EUR", &d("2017-06-30")), Some(Decimal::TWO));
		assert_eq!(rates.get_rate_as_of("EUR", &d("2017-12-31")), Some(Decimal::from(3)));
		assert_eq!(rates.rate_or_parity("USD", &d("2017-12-31")), Decimal::ONE);
	}
}
