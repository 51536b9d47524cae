/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
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
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

/// A legal entity keeping its own books in a single currency.
#[derive(Clone, Debug, Deserialize)]
pub struct Company {
	pub id: u32,
	pub name: String,
	pub currency: String,

	/// Day and month on which the company's fiscal year closes
	#[serde(default = "Company::default_last_day")]
	pub fiscalyear_last_day: u8,
	#[serde(default = "Company::default_last_month")]
	pub fiscalyear_last_month: u8,

	/// Explicitly declared fiscal years; these win over the computed ones
	#[serde(default)]
	pub fiscal_years: Vec<FiscalYear>,
}

/// A named fiscal year, e.g. "FY 2017-2018", for companies whose fiscal years
/// do not follow a fixed closing date.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FiscalYear {
	pub name: String,
	pub date_from: Date,
	pub date_to: Date,
}

/// Boundaries of the fiscal year containing some date, plus the declared
/// record it came from, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct FiscalYearDates<'a> {
	pub date_from: Date,
	pub date_to: Date,
	pub record: Option<&'a FiscalYear>,
}

impl Company {
	fn default_last_day() -> u8 {
		31
	}

	fn default_last_month() -> u8 {
		12
	}

	pub fn validate(&self) -> Result<(), Error> {
		if !(1..=12).contains(&self.fiscalyear_last_month) {
			bail!(
				"Company {}: fiscal year closing month must be 1-12",
				self.name
			)
		}
		if self.fiscalyear_last_day < 1 || self.fiscalyear_last_day > 31 {
			bail!(
				"Company {}: fiscal year closing day must be 1-31",
				self.name
			)
		}
		for fy in &self.fiscal_years {
			if fy.date_from > fy.date_to {
				bail!("Fiscal year {} ends before it starts", fy.name)
			}
		}
		Ok(())
	}

	/// Returns the dates of the fiscal year containing the provided date.
	/// A declared fiscal year covering the date is used as-is; otherwise the
	/// year is derived from the closing day and month.
	pub fn compute_fiscalyear_dates(&self, date: &Date) -> FiscalYearDates {
		if let Some(record) = self
			.fiscal_years
			.iter()
			.find(|fy| fy.date_from <= *date && *date <= fy.date_to)
		{
			return FiscalYearDates {
				date_from: record.date_from,
				date_to: record.date_to,
				record: Some(record),
			};
		}

		let (date_from, date_to) =
			date.fiscal_year(self.fiscalyear_last_day, self.fiscalyear_last_month);

		FiscalYearDates {
			date_from,
			date_to,
			record: None,
		}
	}
}

/// A currency and the number of decimals its amounts are kept to.
#[derive(Clone, Debug, Deserialize)]
pub struct Currency {
	pub code: String,
	#[serde(default = "Currency::default_decimal_places")]
	pub decimal_places: u32,
	#[serde(default)]
	pub symbol: Option<String>,
	#[serde(default)]
	pub position: SymbolPosition,
}

/// Side of the amount the currency symbol is printed on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
	Before,
	#[default]
	After,
}

impl Currency {
	fn default_decimal_places() -> u32 {
		2
	}

	/// True when the amount rounds to zero at this currency's precision
	pub fn is_zero(&self, amount: Decimal) -> bool {
		self.round(amount).is_zero()
	}

	/// Half away from zero, at the currency's precision
	pub fn round(&self, amount: Decimal) -> Decimal {
		amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
	}
}
