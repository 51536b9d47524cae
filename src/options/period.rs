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
use crate::util::date::Date;
use log::debug;
use serde::{Deserialize, Serialize};

/// One comparable window of time, with the label shown above its columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Period {
	pub date_from: Option<Date>,
	pub date_to: Option<Date>,
	pub string: String,
	pub period_type: PeriodType,
	pub mode: DateMode,

	/// The keyword this period was requested with, for the primary period
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filter: Option<DateFilter>,

	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub undetermined: bool,

	/// Range reports normally carry balance-sheet accounts over from before
	/// `date_from`; a strict range does not
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub strict_range: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
	Fiscalyear,
	Year,
	Quarter,
	Month,
	Today,
	Custom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
	#[default]
	Range,
	Single,
}

/// The keywords a user picks a period with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
	Today,
	ThisMonth,
	ThisQuarter,
	#[serde(alias = "fiscalyear")]
	ThisYear,
	LastMonth,
	LastQuarter,
	LastYear,
	Custom,
}

/// What a filter keyword resolves today's date to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterSpan {
	Today,
	Month,
	Quarter,
	Year,
	Custom,
}

impl DateFilter {
	pub fn span(&self) -> FilterSpan {
		match self {
			DateFilter::Today => FilterSpan::Today,
			DateFilter::ThisMonth | DateFilter::LastMonth => FilterSpan::Month,
			DateFilter::ThisQuarter | DateFilter::LastQuarter => {
				FilterSpan::Quarter
			},
			DateFilter::ThisYear | DateFilter::LastYear => FilterSpan::Year,
			DateFilter::Custom => FilterSpan::Custom,
		}
	}

	/// True for the filters that step one period back from today's
	pub fn is_last(&self) -> bool {
		matches!(
			self,
			DateFilter::LastMonth | DateFilter::LastQuarter | DateFilter::LastYear
		)
	}
}

impl Period {
	/// A period for which no boundary is known
	pub fn undetermined(mode: DateMode) -> Self {
		Self {
			date_from: None,
			date_to: None,
			string: "Undetermined period".to_string(),
			period_type: PeriodType::Custom,
			mode,
			filter: None,
			undetermined: true,
			strict_range: false,
		}
	}
}

/// Builds the descriptor of the period between the given dates. When the
/// type is not known, it is recognized from the dates themselves: fiscal
/// year, month, quarter, calendar year, month-to-date, and otherwise custom.
pub fn compute_period(
	ctx: &RequestContext,
	date_from: Option<Date>,
	date_to: Option<Date>,
	mode: DateMode,
	period_type: Option<PeriodType>,
) -> Period {
	let anchor = match date_to.or(date_from) {
		Some(d) => d,
		None => return Period::undetermined(mode),
	};

	let matches = |bounds: (Date, Date)| {
		(Some(bounds.0), Some(bounds.1)) == (date_from, date_to)
	};

	let mut string = None;
	let period_type = match period_type {
		None | Some(PeriodType::Custom) => {
			let fy = ctx.company.compute_fiscalyear_dates(&anchor);
			if matches((fy.date_from, fy.date_to)) {
				string = fy.record.map(|r| r.name.clone());
				PeriodType::Fiscalyear
			} else if matches(anchor.month_bounds()) {
				PeriodType::Month
			} else if matches(anchor.quarter_bounds()) {
				PeriodType::Quarter
			} else if matches(anchor.year_bounds()) {
				PeriodType::Year
			} else if matches((anchor.month_bounds().0, ctx.today)) {
				PeriodType::Today
			} else {
				PeriodType::Custom
			}
		},
		Some(PeriodType::Fiscalyear) => {
			string = ctx
				.company
				.compute_fiscalyear_dates(&anchor)
				.record
				.map(|r| r.name.clone());
			PeriodType::Fiscalyear
		},
		Some(other) => other,
	};

	let string = string.unwrap_or_else(|| {
		label(ctx, date_from, date_to, mode, period_type)
	});

	Period {
		date_from,
		date_to,
		string,
		period_type,
		mode,
		filter: None,
		undetermined: false,
		strict_range: false,
	}
}

fn label(
	ctx: &RequestContext,
	date_from: Option<Date>,
	date_to: Option<Date>,
	mode: DateMode,
	period_type: PeriodType,
) -> String {
	let long = |d: Option<Date>| {
		d.map(|d| d.format(&ctx.formats.long)).unwrap_or_default()
	};

	let to = match date_to {
		Some(to) => to,
		None => return format!("From {}", long(date_from)),
	};

	let company = ctx.company;
	let is_fy = period_type == PeriodType::Fiscalyear;
	let range = (date_from, Some(to));
	let wrap = |b: (Date, Date)| (Some(b.0), Some(b.1));

	if mode == DateMode::Single {
		format!("As of {}", long(date_to))
	} else if period_type == PeriodType::Year
		|| (is_fy && range == wrap(to.year_bounds()))
	{
		to.year().to_string()
	} else if is_fy
		&& range
			== wrap(to.fiscal_year(
				company.fiscalyear_last_day,
				company.fiscalyear_last_month,
			)) {
		format!("{} - {}", to.year() - 1, to.year())
	} else if period_type == PeriodType::Month {
		to.format(&ctx.formats.month)
	} else if period_type == PeriodType::Quarter {
		format!("Q{}\u{00A0}{}", to.quarter(), to.year())
	} else {
		format!("From {}\nto  {}", long(date_from), long(date_to))
	}
}

/// The period of the same type that ends the day before this one starts.
pub fn shift_to_previous_period(ctx: &RequestContext, period: &Period) -> Period {
	let date_from = match period.date_from {
		Some(d) => d,
		None => {
			debug!("cannot shift a period without a start date");
			return Period::undetermined(period.mode);
		},
	};
	let date_to = date_from.pred();
	let mode = period.mode;

	match period.period_type {
		PeriodType::Fiscalyear => {
			// left untyped so a declared fiscal year can be recognized
			let fy = ctx.company.compute_fiscalyear_dates(&date_to);
			compute_period(ctx, Some(fy.date_from), Some(fy.date_to), mode, None)
		},
		PeriodType::Month | PeriodType::Today | PeriodType::Custom => {
			let (from, to) = date_to.month_bounds();
			compute_period(ctx, Some(from), Some(to), mode, Some(PeriodType::Month))
		},
		PeriodType::Quarter => {
			let (from, to) = date_to.quarter_bounds();
			compute_period(
				ctx,
				Some(from),
				Some(to),
				mode,
				Some(PeriodType::Quarter),
			)
		},
		PeriodType::Year => {
			let (from, to) = date_to.year_bounds();
			compute_period(ctx, Some(from), Some(to), mode, Some(PeriodType::Year))
		},
	}
}

/// The same period one calendar year earlier.
pub fn shift_to_previous_year(ctx: &RequestContext, period: &Period) -> Period {
	let (date_from, date_to) = match (period.date_from, period.date_to) {
		(Some(from), Some(to)) => (from.sub_years(1), to.sub_years(1)),
		_ => return Period::undetermined(period.mode),
	};

	let (date_from, date_to) = if period.period_type == PeriodType::Month {
		date_to.month_bounds()
	} else {
		(date_from, date_to)
	};

	compute_period(
		ctx,
		Some(date_from),
		Some(date_to),
		period.mode,
		Some(period.period_type),
	)
}
