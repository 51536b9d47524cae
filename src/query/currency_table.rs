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
use crate::gl::context::RequestContext;
use crate::options::Options;
use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Conversion of one company's amounts into the reference currency
#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyRow {
	pub company_id: u32,
	pub rate: Decimal,
	pub precision: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurrencyTable {
	rows: Vec<CurrencyRow>,
}

impl CurrencyTable {
	/// Converts an amount booked by a company. Companies missing from the
	/// table are taken at parity.
	pub fn convert(&self, company_id: u32, amount: Decimal) -> Decimal {
		let row = match self.rows.iter().find(|r| r.company_id == company_id) {
			Some(row) => row,
			None => return amount,
		};
		match amount.checked_mul(row.rate) {
			Some(converted) => converted
				.round_dp_with_strategy(row.precision, RoundingStrategy::MidpointAwayFromZero),
			None => {
				warn!("{} at rate {} overflows, kept unconverted", amount, row.rate);
				amount
			},
		}
	}
}

/// Rates bringing every company of the report into the currency of the
/// current company, as of the end of the reported period.
pub fn build_currency_table(options: &Options, ctx: &RequestContext) -> CurrencyTable {
	let reference = ctx.currency();

	if options.multi_company.is_none() {
		return CurrencyTable {
			rows: vec![CurrencyRow {
				company_id: ctx.company.id,
				rate: Decimal::ONE,
				precision: reference.decimal_places,
			}],
		};
	}

	let as_of = options
		.date
		.as_ref()
		.and_then(|d| d.date_to)
		.unwrap_or(ctx.today);

	let mut company_ids: Vec<u32> = options
		.selected_company_ids()
		.into_iter()
		.filter(|id| *id != ctx.company.id)
		.collect();
	company_ids.push(ctx.company.id);

	let rates = &ctx.book.exchange_rates;
	let reference_rate = rates.rate_or_parity(&reference.code, &as_of);

	let mut rows = vec![];
	for id in company_ids {
		let company = match ctx.book.company(id) {
			Some(c) => c,
			None => {
				warn!("company {} is not in the book, skipping its rate", id);
				continue;
			},
		};
		let rate = reference_rate
			.checked_div(rates.rate_or_parity(&company.currency, &as_of))
			.unwrap_or(Decimal::ONE);
		debug!("{} to {} as of {}: {}", company.currency, reference.code, as_of, rate);
		rows.push(CurrencyRow {
			company_id: id,
			rate,
			precision: reference.decimal_places,
		});
	}

	CurrencyTable { rows }
}

/// A rate as a SQL numeric literal, always with a fractional part
fn sql_number(rate: Decimal) -> String {
	let mut rate = rate.normalize();
	if rate.scale() == 0 {
		rate.rescale(1);
	}
	rate.to_string()
}

impl fmt::Display for CurrencyTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let values: Vec<String> = self
			.rows
			.iter()
			.map(|r| format!("({}, {}, {})", r.company_id, sql_number(r.rate), r.precision))
			.collect();
		write!(
			f,
			"(VALUES {}) AS currency_table(company_id, rate, precision)",
			values.join(", ")
		)
	}
}
