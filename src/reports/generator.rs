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
use crate::query::currency_table::build_currency_table;
use crate::query::domain::build_domain;
use crate::reports::format::{format_move_line_name, format_value};
use crate::reports::line::{Cell, ReportLine};
use anyhow::Error;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const TOTAL_LINE_ID: &str = "grouped_accounts_total";

/// Debit and credit of one account over one period, in the reference
/// currency
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AccountTotals {
	pub debit: Decimal,
	pub credit: Decimal,
}

impl AccountTotals {
	pub fn balance(&self) -> Decimal {
		self.debit - self.credit
	}
}

/// What each period contributes to an account line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnSet {
	/// Debit, credit and balance
	DebitCreditBalance,
	/// Balance only
	Balance,
}

impl ColumnSet {
	pub fn width(&self) -> usize {
		match self {
			ColumnSet::DebitCreditBalance => 3,
			ColumnSet::Balance => 1,
		}
	}

	fn cells(&self, totals: &AccountTotals, ctx: &RequestContext) -> Vec<Cell> {
		let currency = ctx.currency();
		let cell = |value: Decimal, blank_if_zero: bool| {
			Cell::number(
				format_value(value, &currency, blank_if_zero, ctx.no_format),
				value,
				"number",
			)
		};
		match self {
			ColumnSet::DebitCreditBalance => vec![
				cell(totals.debit, true),
				cell(totals.credit, true),
				cell(totals.balance(), false),
			],
			ColumnSet::Balance => vec![cell(totals.balance(), false)],
		}
	}
}

/// Totals per account of the move lines selected by the options, converted
/// into the currency of the current company.
pub fn period_totals(
	options: &Options,
	ctx: &RequestContext,
) -> Result<BTreeMap<u32, AccountTotals>, Error> {
	let domain = build_domain(options, ctx);
	let currency_table = build_currency_table(options, ctx);
	debug!("domain: {}", domain);

	let mut totals: BTreeMap<u32, AccountTotals> = BTreeMap::new();
	for line in domain.filter(ctx.book)? {
		let entry = totals.entry(line.account_id).or_default();
		entry.debit += currency_table.convert(line.company_id, line.debit);
		entry.credit += currency_table.convert(line.company_id, line.credit);
	}
	Ok(totals)
}

/// One line per account with activity in any of the periods, ordered by
/// account code, followed by the total line.
pub fn account_lines(
	options: &Options,
	ctx: &RequestContext,
	column_set: ColumnSet,
) -> Result<Vec<ReportLine>, Error> {
	let periods = options.periods_list();
	let mut per_period = vec![];
	for period_options in &periods {
		per_period.push(period_totals(period_options, ctx)?);
	}

	let mut accounts: Vec<_> = per_period
		.iter()
		.flat_map(|totals| totals.keys().copied())
		.filter_map(|id| ctx.book.account(id))
		.collect();
	accounts.sort_by(|a, b| a.code.cmp(&b.code).then(a.id.cmp(&b.id)));
	accounts.dedup_by_key(|a| a.id);

	let mut lines = vec![];
	let mut grand_totals = vec![AccountTotals::default(); per_period.len()];
	for account in accounts {
		let mut columns = vec![];
		for (i, totals) in per_period.iter().enumerate() {
			let amounts = totals.get(&account.id).copied().unwrap_or_default();
			grand_totals[i].debit += amounts.debit;
			grand_totals[i].credit += amounts.credit;
			columns.extend(column_set.cells(&amounts, ctx));
		}

		lines.push(ReportLine {
			id: format!("account_{}", account.id),
			name: account.display_name(),
			columns,
			level: 1,
			account_id: Some(account.id),
			caret_options: Some("account.account".to_string()),
			unfoldable: true,
			colspan: 1,
			..Default::default()
		});
	}

	lines.push(ReportLine {
		id: TOTAL_LINE_ID.to_string(),
		name: "Total".to_string(),
		columns: grand_totals
			.iter()
			.flat_map(|totals| column_set.cells(totals, ctx))
			.collect(),
		level: 1,
		class: "total".to_string(),
		colspan: 1,
		..Default::default()
	});

	Ok(lines)
}

/// Inserts the journal items of every unfolded account line right after
/// it. Items belong to the first period; the columns of compared periods
/// stay blank.
pub fn unfold_move_lines(
	lines: Vec<ReportLine>,
	options: &Options,
	ctx: &RequestContext,
	column_set: ColumnSet,
) -> Result<Vec<ReportLine>, Error> {
	let unfold_all = options.unfold_all == Some(true);
	let wanted = |line: &ReportLine| {
		line.account_id.is_some()
			&& line.unfoldable
			&& (unfold_all || options.unfolded_lines.contains(&line.id))
	};
	if !lines.iter().any(wanted) {
		return Ok(lines);
	}

	let domain = build_domain(options, ctx);
	let currency_table = build_currency_table(options, ctx);
	let move_lines = domain.filter(ctx.book)?;
	let blank_periods = options.periods_list().len().saturating_sub(1) * column_set.width();

	let mut out = Vec::with_capacity(lines.len());
	for mut line in lines {
		if !wanted(&line) {
			out.push(line);
			continue;
		}
		line.unfolded = true;
		let account_id = line.account_id;
		let parent_id = line.id.clone();
		let level = line.level + 1;
		out.push(line);

		for aml in move_lines.iter().filter(|l| Some(l.account_id) == account_id) {
			let totals = AccountTotals {
				debit: currency_table.convert(aml.company_id, aml.debit),
				credit: currency_table.convert(aml.company_id, aml.credit),
			};
			let mut columns = column_set.cells(&totals, ctx);
			columns.extend((0..blank_periods).map(|_| Cell::text("")));

			out.push(ReportLine {
				id: format!("aml_{}", aml.id),
				name: format_move_line_name(
					aml.name.as_deref(),
					aml.move_ref.as_deref(),
					&aml.move_name,
					ctx.no_format,
				),
				columns,
				level,
				parent_id: Some(parent_id.clone()),
				caret_options: Some("account.move".to_string()),
				class: "o_account_reports_domain_line".to_string(),
				title_hover: Some(aml.date.to_string()),
				colspan: 1,
				..Default::default()
			});
		}
	}
	Ok(out)
}
