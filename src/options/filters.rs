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
use crate::error::ReportError;
use crate::gl::book::Book;
use crate::gl::context::{Group, RequestContext};
use crate::options::period::{
	compute_period, shift_to_previous_period, shift_to_previous_year,
	DateFilter, DateMode, FilterSpan, PeriodType,
};
use crate::options::{
	CompanyOption, ComparisonKind, ComparisonOption, JournalOption, Options,
};
use crate::util::date::Date;
use anyhow::Error;
use std::collections::HashMap;
use std::fmt;

// --------------
// -- REGISTRY --
// --------------

/// Every filter a report can declare. The company picker is not among them:
/// it is always present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKey {
	Date,
	Comparison,
	Journals,
	Analytic,
	Partner,
	AllEntries,
	UnfoldAll,
	Hierarchy,
	SelectedColumn,
}

/// A scalar filter value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterValue {
	Bool(bool),
	Int(i32),
}

/// Default of the date filter
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DateDecl {
	pub mode: DateMode,
	/// `today` in single mode and `this_year` in range mode when unset
	pub filter: Option<DateFilter>,
	pub date_from: Option<Date>,
	pub date_to: Option<Date>,
	pub strict_range: bool,
}

/// Default of the comparison filter
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonDecl {
	pub filter: ComparisonKind,
	pub number_period: u32,
	pub date_from: Option<Date>,
	pub date_to: Option<Date>,
}

impl Default for ComparisonDecl {
	fn default() -> Self {
		Self {
			filter: ComparisonKind::NoComparison,
			number_period: 1,
			date_from: None,
			date_to: None,
		}
	}
}

#[derive(Clone)]
pub enum FilterDefault {
	/// Declared but switched off; the filter is left out of the options
	Unset,
	Bool(bool),
	Int(i32),
	/// Computed from the request when the options are built
	Dynamic(fn(&RequestContext) -> FilterValue),
	Date(DateDecl),
	Comparison(ComparisonDecl),
}

impl fmt::Debug for FilterDefault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FilterDefault::Unset => write!(f, "Unset"),
			FilterDefault::Bool(b) => write!(f, "Bool({})", b),
			FilterDefault::Int(i) => write!(f, "Int({})", i),
			FilterDefault::Dynamic(_) => write!(f, "Dynamic"),
			FilterDefault::Date(d) => write!(f, "Date({:?})", d),
			FilterDefault::Comparison(c) => write!(f, "Comparison({:?})", c),
		}
	}
}

impl FilterDefault {
	pub fn is_unset(&self) -> bool {
		matches!(self, FilterDefault::Unset)
	}

	/// The value of a scalar default; None for structured defaults
	pub fn scalar(&self, ctx: &RequestContext) -> Option<FilterValue> {
		match self {
			FilterDefault::Bool(b) => Some(FilterValue::Bool(*b)),
			FilterDefault::Int(i) => Some(FilterValue::Int(*i)),
			FilterDefault::Dynamic(f) => Some(f(ctx)),
			_ => None,
		}
	}

	fn is_truthy(&self, ctx: &RequestContext) -> bool {
		match self.scalar(ctx) {
			Some(FilterValue::Bool(b)) => b,
			Some(FilterValue::Int(i)) => i != 0,
			None => !self.is_unset(),
		}
	}
}

/// One filter of a report definition, with its default.
#[derive(Clone, Debug)]
pub struct FilterDecl {
	pub key: FilterKey,
	pub default: FilterDefault,
}

impl FilterDecl {
	pub fn new(key: FilterKey, default: FilterDefault) -> Self {
		Self { key, default }
	}
}

pub type Initializer = fn(
	&mut Options,
	Option<&Options>,
	&FilterDecl,
	&RequestContext,
) -> Result<(), Error>;

/// The initializer owning a filter, if any. Filters without one take their
/// value from the previous options or from their declared default.
pub fn initializer(key: FilterKey) -> Option<Initializer> {
	match key {
		FilterKey::Date => Some(init_date),
		FilterKey::Comparison => Some(init_comparison),
		FilterKey::Journals => Some(init_journals),
		FilterKey::Analytic => Some(init_analytic),
		FilterKey::Partner => Some(init_partner),
		FilterKey::SelectedColumn => Some(init_selected_column),
		FilterKey::AllEntries | FilterKey::UnfoldAll | FilterKey::Hierarchy => {
			None
		},
	}
}

impl FilterKey {
	/// Reads a scalar filter from options
	pub fn read(&self, options: &Options) -> Option<FilterValue> {
		match self {
			FilterKey::AllEntries => options.all_entries.map(FilterValue::Bool),
			FilterKey::UnfoldAll => options.unfold_all.map(FilterValue::Bool),
			FilterKey::Hierarchy => options.hierarchy.map(FilterValue::Bool),
			FilterKey::SelectedColumn => {
				options.selected_column.map(FilterValue::Int)
			},
			_ => None,
		}
	}

	/// Writes a scalar filter into options
	pub fn write(
		&self,
		options: &mut Options,
		value: FilterValue,
	) -> Result<(), Error> {
		match (self, value) {
			(FilterKey::AllEntries, FilterValue::Bool(b)) => {
				options.all_entries = Some(b)
			},
			(FilterKey::UnfoldAll, FilterValue::Bool(b)) => {
				options.unfold_all = Some(b)
			},
			(FilterKey::Hierarchy, FilterValue::Bool(b)) => {
				options.hierarchy = Some(b)
			},
			(FilterKey::SelectedColumn, FilterValue::Int(i)) => {
				options.selected_column = Some(i)
			},
			(key, value) => {
				return Err(ReportError::Configuration(format!(
					"filter {:?} cannot hold {:?}",
					key, value
				))
				.into())
			},
		}
		Ok(())
	}
}

// ------------------
// -- INITIALIZERS --
// ------------------

/// Lists the user's companies when there is more than one to choose from.
pub fn init_multi_company(options: &mut Options, ctx: &RequestContext) {
	let companies = ctx.user_companies();
	if companies.len() > 1 {
		options.multi_company = Some(
			companies
				.iter()
				.map(|c| CompanyOption {
					id: c.id,
					name: c.name.clone(),
					selected: ctx.allowed_company_ids.contains(&c.id),
				})
				.collect(),
		);
	}
}

pub fn init_date(
	options: &mut Options,
	previous: Option<&Options>,
	decl: &FilterDecl,
	ctx: &RequestContext,
) -> Result<(), Error> {
	let default = match &decl.default {
		FilterDefault::Date(d) => d.clone(),
		other => {
			return Err(ReportError::Configuration(format!(
				"date filter cannot default to {:?}",
				other
			))
			.into())
		},
	};

	let mode = default.mode;
	let mut filter = default.filter.unwrap_or(match mode {
		DateMode::Single => DateFilter::Today,
		DateMode::Range => DateFilter::ThisYear,
	});
	let mut date_from = default.date_from;
	let mut date_to = default.date_to;

	if let Some(prev) = previous.and_then(|p| p.date.as_ref()) {
		match prev.filter {
			Some(DateFilter::Today) if mode == DateMode::Range => {},
			Some(prev_filter) => {
				filter = prev_filter;
				if prev_filter == DateFilter::Custom {
					if prev.date_from.is_some() && mode == DateMode::Range {
						date_from = prev.date_from;
					}
					if prev.date_to.is_some() {
						date_to = prev.date_to;
					}
				}
			},
			None => {},
		}
	}

	let today = ctx.today;
	let mut period_type = None;
	match filter.span() {
		FilterSpan::Today => {
			let fy = ctx.company.compute_fiscalyear_dates(&today);
			date_from = Some(fy.date_from);
			date_to = Some(today);
			period_type = Some(PeriodType::Today);
		},
		FilterSpan::Month => {
			let (from, to) = today.month_bounds();
			date_from = Some(from);
			date_to = Some(to);
			period_type = Some(PeriodType::Month);
		},
		FilterSpan::Quarter => {
			let (from, to) = today.quarter_bounds();
			date_from = Some(from);
			date_to = Some(to);
			period_type = Some(PeriodType::Quarter);
		},
		FilterSpan::Year => {
			let fy = ctx.company.compute_fiscalyear_dates(&today);
			date_from = Some(fy.date_from);
			date_to = Some(fy.date_to);
		},
		FilterSpan::Custom => {
			if date_from.is_none() {
				date_from = date_to.map(|d| d.month_bounds().0);
			}
		},
	}

	let mut period = compute_period(ctx, date_from, date_to, mode, period_type);
	if filter.is_last() {
		period = shift_to_previous_period(ctx, &period);
	}
	period.filter = Some(filter);
	period.strict_range = default.strict_range;
	options.date = Some(period);

	Ok(())
}

pub fn init_comparison(
	options: &mut Options,
	previous: Option<&Options>,
	decl: &FilterDecl,
	ctx: &RequestContext,
) -> Result<(), Error> {
	let date = options.date.clone().ok_or_else(|| {
		ReportError::Configuration(
			"comparison requires the date filter to be initialized first"
				.to_string(),
		)
	})?;

	let default = match &decl.default {
		FilterDefault::Comparison(c) => c.clone(),
		other => {
			return Err(ReportError::Configuration(format!(
				"comparison filter cannot default to {:?}",
				other
			))
			.into())
		},
	};

	let mut filter = default.filter;
	let mut number_period = default.number_period.max(1);
	let mut date_from = default.date_from;
	let mut date_to = default.date_to;

	if let Some(prev) = previous.and_then(|p| p.comparison.as_ref()) {
		filter = prev.filter;
		if filter == ComparisonKind::Custom {
			if prev.date_from.is_some() {
				date_from = prev.date_from;
			}
			if prev.date_to.is_some() {
				date_to = prev.date_to;
			}
		}
		if prev.number_period > 1 {
			number_period = prev.number_period;
		}
	}

	if filter == ComparisonKind::Custom {
		let bounded = match date.mode {
			DateMode::Single => date_to.is_some(),
			DateMode::Range => date_from.is_some() || date_to.is_some(),
		};
		if !bounded {
			return Err(ReportError::Configuration(
				"a custom comparison needs its own dates".to_string(),
			)
			.into());
		}
	}

	let mut comparison =
		ComparisonOption::new(filter, number_period, date_from, date_to);

	let count = match filter {
		ComparisonKind::NoComparison => 0,
		ComparisonKind::Custom => 1,
		_ => number_period,
	};

	let mut last = date;
	for _ in 0..count {
		let period = match filter {
			ComparisonKind::PreviousPeriod => shift_to_previous_period(ctx, &last),
			ComparisonKind::SameLastYear => shift_to_previous_year(ctx, &last),
			_ => compute_period(ctx, date_from, date_to, last.mode, None),
		};
		comparison.periods.push(period.clone());
		last = period;
	}

	comparison.flatten_first_period();
	options.comparison = Some(comparison);

	Ok(())
}

pub fn init_journals(
	options: &mut Options,
	previous: Option<&Options>,
	_decl: &FilterDecl,
	ctx: &RequestContext,
) -> Result<(), Error> {
	let selection: HashMap<u32, bool> = previous
		.and_then(|p| p.journals.as_ref())
		.into_iter()
		.flatten()
		.filter_map(|j| match j {
			JournalOption::Journal { id, selected, .. } => Some((*id, *selected)),
			_ => None,
		})
		.collect();

	let company_ids = ctx.journal_company_ids();
	let journals = ctx.book.journals_of(&company_ids);

	let mut entries = vec![];
	let mut default_ids: Vec<u32> = vec![];
	let mut header_shown = false;

	for group in ctx.book.journal_groups_of(&company_ids) {
		let ids = group.member_ids(&journals);
		if ids.is_empty() {
			continue;
		}
		if !header_shown {
			header_shown = true;
			entries.push(JournalOption::Divider {
				name: "Journal Groups".to_string(),
			});
			default_ids = ids.clone();
		}
		entries.push(JournalOption::Group {
			name: group.name.clone(),
			ids,
		});
	}

	let mut previous_company = None;
	for journal in journals {
		if previous_company != Some(journal.company_id) {
			let name = ctx
				.book
				.company(journal.company_id)
				.map(|c| c.name.clone())
				.unwrap_or_default();
			entries.push(JournalOption::Divider { name });
			previous_company = Some(journal.company_id);
		}
		entries.push(JournalOption::Journal {
			id: journal.id,
			name: journal.name.clone(),
			code: journal.code.clone(),
			journal_type: journal.journal_type,
			selected: selection
				.get(&journal.id)
				.copied()
				.unwrap_or_else(|| default_ids.contains(&journal.id)),
		});
	}

	options.journals = Some(entries);
	Ok(())
}

pub fn init_analytic(
	options: &mut Options,
	previous: Option<&Options>,
	decl: &FilterDecl,
	ctx: &RequestContext,
) -> Result<(), Error> {
	if !decl.default.is_truthy(ctx) {
		return Ok(());
	}
	options.analytic = Some(true);

	if ctx.has_group(Group::AnalyticAccounting) {
		let ids = previous
			.and_then(|p| p.analytic_accounts.clone())
			.unwrap_or_default();
		options.selected_analytic_account_names =
			Some(Book::tag_names(&ctx.book.analytic_accounts, &ids));
		options.analytic_accounts = Some(ids);
	}
	if ctx.has_group(Group::AnalyticTags) {
		let ids = previous
			.and_then(|p| p.analytic_tags.clone())
			.unwrap_or_default();
		options.selected_analytic_tag_names =
			Some(Book::tag_names(&ctx.book.analytic_tags, &ids));
		options.analytic_tags = Some(ids);
	}

	Ok(())
}

pub fn init_partner(
	options: &mut Options,
	previous: Option<&Options>,
	decl: &FilterDecl,
	ctx: &RequestContext,
) -> Result<(), Error> {
	if !decl.default.is_truthy(ctx) {
		return Ok(());
	}

	let partner_ids = previous
		.and_then(|p| p.partner_ids.clone())
		.unwrap_or_default();
	let categories = previous
		.and_then(|p| p.partner_categories.clone())
		.unwrap_or_default();

	options.partner = Some(true);
	options.selected_partner_ids = Some(
		partner_ids
			.iter()
			.filter_map(|id| ctx.book.partner(*id))
			.map(|p| p.name.clone())
			.collect(),
	);
	options.selected_partner_categories =
		Some(Book::tag_names(&ctx.book.partner_categories, &categories));
	options.partner_ids = Some(partner_ids);
	options.partner_categories = Some(categories);

	Ok(())
}

pub fn init_selected_column(
	options: &mut Options,
	previous: Option<&Options>,
	decl: &FilterDecl,
	ctx: &RequestContext,
) -> Result<(), Error> {
	let column = match previous.and_then(|p| p.selected_column) {
		Some(column) if column != 0 => column,
		_ => match decl.default.scalar(ctx) {
			Some(FilterValue::Int(column)) => column,
			other => {
				return Err(ReportError::Configuration(format!(
					"column order cannot default to {:?}",
					other
				))
				.into())
			},
		},
	};
	options.selected_column = Some(column);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::book::tests::sample_book;
	use crate::gl::journal::JournalType;

	fn d(s: &str) -> Date {
		Date::from_str(s).unwrap()
	}

	fn date_decl(mode: DateMode, filter: Option<DateFilter>) -> FilterDecl {
		FilterDecl::new(
			FilterKey::Date,
			FilterDefault::Date(DateDecl {
				mode,
				filter,
				..Default::default()
			}),
		)
	}

	#[test]
	fn test_today_in_single_mode() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		init_date(&mut options, None, &date_decl(DateMode::Single, None), &ctx)
			.unwrap();

		let date = options.date.unwrap();
		assert_eq!(date.date_from, Some(d("2017-01-01")));
		assert_eq!(date.date_to, Some(d("2017-12-31")));
		assert_eq!(date.period_type, PeriodType::Today);
		assert_eq!(date.string, "As of Dec 31, 2017");
		assert_eq!(date.filter, Some(DateFilter::Today));
	}

	#[test]
	fn test_last_month() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-15")).unwrap();
		let mut options = Options::default();
		let decl = date_decl(DateMode::Range, Some(DateFilter::LastMonth));
		init_date(&mut options, None, &decl, &ctx).unwrap();

		let date = options.date.unwrap();
		assert_eq!(date.date_from, Some(d("2017-11-01")));
		assert_eq!(date.date_to, Some(d("2017-11-30")));
		assert_eq!(date.filter, Some(DateFilter::LastMonth));
	}

	#[test]
	fn test_previous_today_ignored_in_range_mode() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-15")).unwrap();
		let mut previous = Options::default();
		init_date(&mut previous, None, &date_decl(DateMode::Single, None), &ctx)
			.unwrap();

		let mut options = Options::default();
		let decl = date_decl(DateMode::Range, None);
		init_date(&mut options, Some(&previous), &decl, &ctx).unwrap();
		assert_eq!(options.date.unwrap().filter, Some(DateFilter::ThisYear));
	}

	#[test]
	fn test_custom_dates_follow_previous() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-15")).unwrap();
		let mut previous = Options::default();
		previous.date = Some(compute_period(
			&ctx,
			Some(d("2017-03-05")),
			Some(d("2017-04-10")),
			DateMode::Range,
			None,
		));
		previous.date.as_mut().unwrap().filter = Some(DateFilter::Custom);

		let mut options = Options::default();
		init_date(&mut options, Some(&previous), &date_decl(DateMode::Range, None), &ctx)
			.unwrap();
		let date = options.date.unwrap();
		assert_eq!(date.date_from, Some(d("2017-03-05")));
		assert_eq!(date.date_to, Some(d("2017-04-10")));

		// single mode keeps only the end date and starts at its month
		let mut options = Options::default();
		init_date(
			&mut options,
			Some(&previous),
			&date_decl(DateMode::Single, None),
			&ctx,
		)
		.unwrap();
		let date = options.date.unwrap();
		assert_eq!(date.date_from, Some(d("2017-04-01")));
		assert_eq!(date.string, "As of Apr 10, 2017");
	}

	#[test]
	fn test_comparison_requires_date() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let decl = FilterDecl::new(
			FilterKey::Comparison,
			FilterDefault::Comparison(Default::default()),
		);
		let err = init_comparison(&mut Options::default(), None, &decl, &ctx)
			.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ReportError>(),
			Some(ReportError::Configuration(_))
		));
	}

	#[test]
	fn test_previous_period_comparison() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		let decl = date_decl(DateMode::Range, Some(DateFilter::ThisMonth));
		init_date(&mut options, None, &decl, &ctx).unwrap();

		let decl = FilterDecl::new(
			FilterKey::Comparison,
			FilterDefault::Comparison(ComparisonDecl {
				filter: ComparisonKind::PreviousPeriod,
				number_period: 2,
				..Default::default()
			}),
		);
		init_comparison(&mut options, None, &decl, &ctx).unwrap();

		let comparison = options.comparison.unwrap();
		let labels: Vec<&str> =
			comparison.periods.iter().map(|p| p.string.as_str()).collect();
		assert_eq!(labels, vec!["Nov 2017", "Oct 2017"]);
		assert_eq!(comparison.date_from, Some(d("2017-11-01")));
		assert_eq!(comparison.string.as_deref(), Some("Nov 2017"));
	}

	#[test]
	fn test_shift_chain_matches_comparison() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-08-20")).unwrap();
		for filter in [
			DateFilter::ThisMonth,
			DateFilter::ThisQuarter,
			DateFilter::ThisYear,
			DateFilter::LastMonth,
			DateFilter::Today,
		] {
			let mut options = Options::default();
			init_date(
				&mut options,
				None,
				&date_decl(DateMode::Range, Some(filter)),
				&ctx,
			)
			.unwrap();

			let decl = FilterDecl::new(
				FilterKey::Comparison,
				FilterDefault::Comparison(ComparisonDecl {
					filter: ComparisonKind::PreviousPeriod,
					number_period: 4,
					..Default::default()
				}),
			);
			init_comparison(&mut options, None, &decl, &ctx).unwrap();

			let mut shifted = options.date.clone().unwrap();
			for period in &options.comparison.as_ref().unwrap().periods {
				shifted = shift_to_previous_period(&ctx, &shifted);
				assert_eq!(&shifted, period);
			}
		}
	}

	#[test]
	fn test_custom_comparison_runs_once() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		init_date(&mut options, None, &date_decl(DateMode::Range, None), &ctx)
			.unwrap();

		let decl = FilterDecl::new(
			FilterKey::Comparison,
			FilterDefault::Comparison(ComparisonDecl {
				filter: ComparisonKind::Custom,
				number_period: 3,
				date_from: Some(d("2016-01-01")),
				date_to: Some(d("2016-06-30")),
			}),
		);
		init_comparison(&mut options, None, &decl, &ctx).unwrap();
		let comparison = options.comparison.unwrap();
		assert_eq!(comparison.periods.len(), 1);
		assert_eq!(comparison.periods[0].date_to, Some(d("2016-06-30")));
	}

	#[test]
	fn test_custom_comparison_without_dates_is_rejected() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		init_date(&mut options, None, &date_decl(DateMode::Range, None), &ctx)
			.unwrap();

		let decl = FilterDecl::new(
			FilterKey::Comparison,
			FilterDefault::Comparison(Default::default()),
		);
		let previous = Options {
			comparison: Some(ComparisonOption::new(ComparisonKind::Custom, 1, None, None)),
			..Default::default()
		};
		let err = init_comparison(&mut options, Some(&previous), &decl, &ctx)
			.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ReportError>(),
			Some(ReportError::Configuration(_))
		));

		// one bound is enough for a range
		let previous = Options {
			comparison: Some(ComparisonOption::new(
				ComparisonKind::Custom,
				1,
				None,
				Some(d("2016-12-31")),
			)),
			..Default::default()
		};
		init_comparison(&mut options, Some(&previous), &decl, &ctx).unwrap();
		let periods = &options.comparison.as_ref().unwrap().periods;
		assert_eq!(periods[0].date_to, Some(d("2016-12-31")));
	}

	#[test]
	fn test_journals_layout_and_default_selection() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		let decl = FilterDecl::new(FilterKey::Journals, FilterDefault::Bool(true));
		init_journals(&mut options, None, &decl, &ctx).unwrap();

		let journals = options.journals.clone().unwrap();
		assert_eq!(
			journals[0],
			JournalOption::Divider {
				name: "Journal Groups".to_string()
			}
		);
		assert_eq!(
			journals[1],
			JournalOption::Group {
				name: "Operations".to_string(),
				ids: vec![2, 1, 4],
			}
		);
		assert_eq!(
			journals[3],
			JournalOption::Divider {
				name: "Acme US".to_string()
			}
		);
		assert_eq!(
			journals[4],
			JournalOption::Journal {
				id: 2,
				name: "Bank".to_string(),
				code: "BNK".to_string(),
				journal_type: JournalType::Bank,
				selected: true,
			}
		);
		// Miscellaneous is left out of the first group
		assert_eq!(options.selected_journal_ids(), Some(vec![2, 1, 4]));
	}

	#[test]
	fn test_journal_selection_kept_from_previous() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let decl = FilterDecl::new(FilterKey::Journals, FilterDefault::Bool(true));
		let mut previous = Options::default();
		init_journals(&mut previous, None, &decl, &ctx).unwrap();
		for j in previous.journals.as_mut().unwrap() {
			if let JournalOption::Journal { id, selected, .. } = j {
				*selected = *id == 3;
			}
		}

		let mut options = Options::default();
		init_journals(&mut options, Some(&previous), &decl, &ctx).unwrap();
		assert_eq!(options.selected_journal_ids(), Some(vec![3]));
	}

	#[test]
	fn test_analytic_depends_on_groups() {
		let book = sample_book();
		let decl = FilterDecl::new(FilterKey::Analytic, FilterDefault::Bool(true));
		let mut previous = Options::default();
		previous.analytic_accounts = Some(vec![1]);

		let admin = RequestContext::new(&book, Some(1), None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		init_analytic(&mut options, Some(&previous), &decl, &admin).unwrap();
		assert_eq!(options.analytic, Some(true));
		assert_eq!(
			options.selected_analytic_account_names,
			Some(vec!["Project A".to_string()])
		);
		assert_eq!(options.analytic_tags, Some(vec![]));

		let clerk = RequestContext::new(&book, Some(2), None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		init_analytic(&mut options, Some(&previous), &decl, &clerk).unwrap();
		assert_eq!(options.analytic, Some(true));
		assert_eq!(options.analytic_accounts, None);
	}

	#[test]
	fn test_partner_names() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let decl = FilterDecl::new(FilterKey::Partner, FilterDefault::Bool(true));
		let mut previous = Options::default();
		previous.partner_ids = Some(vec![2]);
		previous.partner_categories = Some(vec![1]);

		let mut options = Options::default();
		init_partner(&mut options, Some(&previous), &decl, &ctx).unwrap();
		assert_eq!(
			options.selected_partner_ids,
			Some(vec!["Deco Addict".to_string()])
		);
		assert_eq!(
			options.selected_partner_categories,
			Some(vec!["Wholesale".to_string()])
		);
	}

	#[test]
	fn test_multi_company_lists_only_for_several_companies() {
		let book = sample_book();
		let admin = RequestContext::new(&book, Some(1), None, d("2017-12-31"))
			.unwrap()
			.allow_companies(&[1, 2]);
		let mut options = Options::default();
		init_multi_company(&mut options, &admin);
		assert_eq!(options.selected_company_ids(), vec![1, 2]);

		let clerk = RequestContext::new(&book, Some(2), None, d("2017-12-31")).unwrap();
		let mut options = Options::default();
		init_multi_company(&mut options, &clerk);
		assert!(options.multi_company.is_none());
	}

	#[test]
	fn test_scalar_filters_reject_wrong_type() {
		let mut options = Options::default();
		assert!(FilterKey::Hierarchy
			.write(&mut options, FilterValue::Int(1))
			.is_err());
		FilterKey::Hierarchy
			.write(&mut options, FilterValue::Bool(true))
			.unwrap();
		assert_eq!(
			FilterKey::Hierarchy.read(&options),
			Some(FilterValue::Bool(true))
		);
	}
}
