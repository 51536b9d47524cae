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
use crate::gl::book::Book;
use crate::gl::context::RequestContext;
use crate::gl::entry::{DisplayType, MoveLine, MoveState};
use crate::options::period::DateMode;
use crate::options::Options;
use crate::util::date::Date;
use anyhow::{bail, Error};
use std::fmt;

/// A filter over move lines in prefix notation: terms are implicitly
/// combined with AND, and `|` combines the two expressions following it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Domain(Vec<DomainItem>);

#[derive(Clone, Debug, PartialEq)]
pub enum DomainItem {
	Or,
	Term(Term),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Term {
	pub field: Field,
	pub operator: Operator,
	pub value: Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
	Id,
	DisplayType,
	MoveState,
	CompanyId,
	JournalId,
	Date,
	AccountIncludeInitialBalance,
	AnalyticAccountId,
	AnalyticTagIds,
	PartnerId,
	PartnerCategoryId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
	Eq,
	Ne,
	In,
	NotIn,
	Le,
	Ge,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Id(u32),
	Ids(Vec<u32>),
	Date(Date),
	Bool(bool),
	State(MoveState),
	DisplayTypes(Vec<DisplayType>),
}

/// What a field holds on one particular move line
enum Actual {
	Ids(Vec<u32>),
	Date(Date),
	Bool(bool),
	State(MoveState),
	DisplayType(Option<DisplayType>),
}

impl Term {
	pub fn new(field: Field, operator: Operator, value: Value) -> Self {
		Self {
			field,
			operator,
			value,
		}
	}

	fn actual(&self, line: &MoveLine, book: &Book) -> Actual {
		match self.field {
			Field::Id => Actual::Ids(vec![line.id]),
			Field::DisplayType => Actual::DisplayType(line.display_type),
			Field::MoveState => Actual::State(line.state),
			Field::CompanyId => Actual::Ids(vec![line.company_id]),
			Field::JournalId => Actual::Ids(vec![line.journal_id]),
			Field::Date => Actual::Date(line.date),
			Field::AccountIncludeInitialBalance => Actual::Bool(
				book.account(line.account_id)
					.map(|a| a.include_initial_balance)
					.unwrap_or(false),
			),
			Field::AnalyticAccountId => {
				Actual::Ids(line.analytic_account_id.into_iter().collect())
			},
			Field::AnalyticTagIds => Actual::Ids(line.analytic_tag_ids.clone()),
			Field::PartnerId => Actual::Ids(line.partner_id.into_iter().collect()),
			Field::PartnerCategoryId => Actual::Ids(
				line.partner_id
					.and_then(|id| book.partner(id))
					.map(|p| p.category_ids.clone())
					.unwrap_or_default(),
			),
		}
	}

	pub fn matches(&self, line: &MoveLine, book: &Book) -> Result<bool, Error> {
		let actual = self.actual(line, book);
		let result = match (self.operator, &actual, &self.value) {
			(Operator::In, Actual::Ids(have), Value::Ids(want)) => {
				have.iter().any(|id| want.contains(id))
			},
			(Operator::NotIn, Actual::Ids(have), Value::Ids(want)) => {
				!have.iter().any(|id| want.contains(id))
			},
			(Operator::Eq, Actual::Ids(have), Value::Id(want)) => {
				have.contains(want)
			},
			(Operator::Ne, Actual::Ids(have), Value::Id(want)) => {
				!have.contains(want)
			},
			(Operator::Le, Actual::Date(have), Value::Date(want)) => have <= want,
			(Operator::Ge, Actual::Date(have), Value::Date(want)) => have >= want,
			(Operator::Eq, Actual::Bool(have), Value::Bool(want)) => have == want,
			(Operator::Eq, Actual::State(have), Value::State(want)) => have == want,
			(Operator::Ne, Actual::State(have), Value::State(want)) => have != want,
			(Operator::NotIn, Actual::DisplayType(have), Value::DisplayTypes(want)) => {
				have.map_or(true, |t| !want.contains(&t))
			},
			(Operator::In, Actual::DisplayType(have), Value::DisplayTypes(want)) => {
				have.map_or(false, |t| want.contains(&t))
			},
			_ => bail!("Cannot evaluate {}", self),
		};
		Ok(result)
	}
}

impl Domain {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn push(&mut self, term: Term) {
		self.0.push(DomainItem::Term(term));
	}

	pub fn push_or(&mut self) {
		self.0.push(DomainItem::Or);
	}

	pub fn extend(&mut self, other: Domain) {
		self.0.extend(other.0);
	}

	/// True when the line passes every expression of the domain
	pub fn matches(&self, line: &MoveLine, book: &Book) -> Result<bool, Error> {
		let mut position = 0;
		let mut result = true;
		while position < self.0.len() {
			let (value, next) = self.eval_at(position, line, book)?;
			result &= value;
			position = next;
		}
		Ok(result)
	}

	/// Evaluates the expression starting at `position`; returns its value
	/// and the position right after it.
	fn eval_at(
		&self,
		position: usize,
		line: &MoveLine,
		book: &Book,
	) -> Result<(bool, usize), Error> {
		match self.0.get(position) {
			Some(DomainItem::Term(term)) => Ok((term.matches(line, book)?, position + 1)),
			Some(DomainItem::Or) => {
				let (left, next) = self.eval_at(position + 1, line, book)?;
				let (right, next) = self.eval_at(next, line, book)?;
				Ok((left || right, next))
			},
			None => bail!("'|' is missing an operand"),
		}
	}

	/// Move lines of the book that pass the domain, in book order
	pub fn filter<'a>(&self, book: &'a Book) -> Result<Vec<&'a MoveLine>, Error> {
		let mut lines = vec![];
		for line in &book.move_lines {
			if self.matches(line, book)? {
				lines.push(line);
			}
		}
		Ok(lines)
	}
}

// ------------------
// -- CONSTRUCTION --
// ------------------

/// Translates options into the domain selecting the move lines a report is
/// made of.
pub fn build_domain(options: &Options, ctx: &RequestContext) -> Domain {
	let mut domain = Domain::new();
	domain.extend(document_type_domain());
	domain.extend(companies_domain(options, ctx));
	domain.extend(journals_domain(options));
	domain.extend(date_domain(options));
	domain.extend(analytic_domain(options));
	domain.extend(partner_domain(options));
	domain.extend(all_entries_domain(options));
	domain
}

fn document_type_domain() -> Domain {
	let mut domain = Domain::new();
	domain.push(Term::new(
		Field::DisplayType,
		Operator::NotIn,
		Value::DisplayTypes(vec![DisplayType::LineSection, DisplayType::LineNote]),
	));
	domain.push(Term::new(
		Field::MoveState,
		Operator::Ne,
		Value::State(MoveState::Cancel),
	));
	domain
}

fn companies_domain(options: &Options, ctx: &RequestContext) -> Domain {
	let mut domain = Domain::new();
	if options.multi_company.is_some() {
		domain.push(Term::new(
			Field::CompanyId,
			Operator::In,
			Value::Ids(options.report_company_ids(ctx)),
		));
	} else {
		domain.push(Term::new(
			Field::CompanyId,
			Operator::Eq,
			Value::Id(ctx.company.id),
		));
	}
	domain
}

/// An empty selection matches nothing; it never lifts the restriction.
fn journals_domain(options: &Options) -> Domain {
	let mut domain = Domain::new();
	if let Some(ids) = options.selected_journal_ids() {
		domain.push(Term::new(Field::JournalId, Operator::In, Value::Ids(ids)));
	}
	domain
}

fn date_domain(options: &Options) -> Domain {
	let mut domain = Domain::new();
	let date = match &options.date {
		Some(date) => date,
		None => return domain,
	};
	// an undetermined period has no move line in it
	if date.undetermined || (date.date_from.is_none() && date.date_to.is_none()) {
		domain.push(Term::new(Field::Id, Operator::In, Value::Ids(vec![])));
		return domain;
	}

	if let Some(date_to) = date.date_to {
		domain.push(Term::new(Field::Date, Operator::Le, Value::Date(date_to)));
	}

	if date.mode == DateMode::Range {
		if let Some(date_from) = date.date_from {
			let from = Term::new(Field::Date, Operator::Ge, Value::Date(date_from));
			if date.strict_range {
				domain.push(from);
			} else {
				domain.push_or();
				domain.push(from);
				domain.push(Term::new(
					Field::AccountIncludeInitialBalance,
					Operator::Eq,
					Value::Bool(true),
				));
			}
		}
	}
	domain
}

fn analytic_domain(options: &Options) -> Domain {
	let mut domain = Domain::new();
	if let Some(ids) = options.analytic_accounts.as_ref().filter(|i| !i.is_empty()) {
		domain.push(Term::new(
			Field::AnalyticAccountId,
			Operator::In,
			Value::Ids(ids.clone()),
		));
	}
	if let Some(ids) = options.analytic_tags.as_ref().filter(|i| !i.is_empty()) {
		domain.push(Term::new(
			Field::AnalyticTagIds,
			Operator::In,
			Value::Ids(ids.clone()),
		));
	}
	domain
}

fn partner_domain(options: &Options) -> Domain {
	let mut domain = Domain::new();
	if let Some(ids) = options.partner_ids.as_ref().filter(|i| !i.is_empty()) {
		domain.push(Term::new(Field::PartnerId, Operator::In, Value::Ids(ids.clone())));
	}
	if let Some(ids) = options.partner_categories.as_ref().filter(|i| !i.is_empty()) {
		domain.push(Term::new(
			Field::PartnerCategoryId,
			Operator::In,
			Value::Ids(ids.clone()),
		));
	}
	domain
}

fn all_entries_domain(options: &Options) -> Domain {
	let mut domain = Domain::new();
	if options.all_entries == Some(false) {
		domain.push(Term::new(
			Field::MoveState,
			Operator::Eq,
			Value::State(MoveState::Posted),
		));
	} else {
		domain.push(Term::new(
			Field::MoveState,
			Operator::Ne,
			Value::State(MoveState::Cancel),
		));
	}
	domain
}

// -------------
// -- DISPLAY --
// -------------

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Field::Id => "id",
			Field::DisplayType => "display_type",
			Field::MoveState => "move_id.state",
			Field::CompanyId => "company_id",
			Field::JournalId => "journal_id",
			Field::Date => "date",
			Field::AccountIncludeInitialBalance => {
				"account_id.include_initial_balance"
			},
			Field::AnalyticAccountId => "analytic_account_id",
			Field::AnalyticTagIds => "analytic_tag_ids",
			Field::PartnerId => "partner_id",
			Field::PartnerCategoryId => "partner_id.category_id",
		};
		write!(f, "{}", s)
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Operator::Eq => "=",
			Operator::Ne => "!=",
			Operator::In => "in",
			Operator::NotIn => "not in",
			Operator::Le => "<=",
			Operator::Ge => ">=",
		};
		write!(f, "{}", s)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let join = |items: Vec<String>| items.join(", ");
		match self {
			Value::Id(id) => write!(f, "{}", id),
			Value::Ids(ids) => {
				write!(f, "[{}]", join(ids.iter().map(|i| i.to_string()).collect()))
			},
			Value::Date(d) => write!(f, "'{}'", d),
			Value::Bool(true) => write!(f, "True"),
			Value::Bool(false) => write!(f, "False"),
			Value::State(s) => write!(f, "'{}'", s),
			Value::DisplayTypes(types) => write!(
				f,
				"({})",
				join(types.iter().map(|t| format!("'{}'", t)).collect())
			),
		}
	}
}

impl fmt::Display for Term {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "('{}', '{}', {})", self.field, self.operator, self.value)
	}
}

impl fmt::Display for Domain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let items: Vec<String> = self
			.0
			.iter()
			.map(|item| match item {
				DomainItem::Or => "'|'".to_string(),
				DomainItem::Term(term) => term.to_string(),
			})
			.collect();
		write!(f, "[{}]", items.join(", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::book::tests::sample_book;
	use crate::options::period::{compute_period, Period};
	use crate::options::JournalOption;

	fn d(s: &str) -> Date {
		Date::from_str(s).unwrap()
	}

	fn range(ctx: &RequestContext, from: &str, to: &str) -> Period {
		compute_period(ctx, Some(d(from)), Some(d(to)), DateMode::Range, None)
	}

	fn ids(lines: Vec<&MoveLine>) -> Vec<u32> {
		lines.iter().map(|l| l.id).collect()
	}

	#[test]
	fn test_fixed_order_and_display() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, Some(2), None, d("2017-12-31")).unwrap();
		let options = Options {
			date: Some(range(&ctx, "2017-12-01", "2017-12-31")),
			all_entries: Some(false),
			..Default::default()
		};
		assert_eq!(
			build_domain(&options, &ctx).to_string(),
			"[('display_type', 'not in', ('line_section', 'line_note')), \
			 ('move_id.state', '!=', 'cancel'), ('company_id', '=', 1), \
			 ('date', '<=', '2017-12-31'), '|', ('date', '>=', '2017-12-01'), \
			 ('account_id.include_initial_balance', '=', True), \
			 ('move_id.state', '=', 'posted')]"
		);
	}

	#[test]
	fn test_empty_journal_selection_matches_nothing() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let options = Options {
			journals: Some(vec![JournalOption::Journal {
				id: 1,
				name: "Sales".to_string(),
				code: "INV".to_string(),
				journal_type: crate::gl::journal::JournalType::Sale,
				selected: false,
			}]),
			..Default::default()
		};
		let domain = build_domain(&options, &ctx);
		assert!(domain.to_string().contains("('journal_id', 'in', [])"));
		assert!(domain.filter(&book).unwrap().is_empty());

		// without the journal filter, nothing is restricted
		let domain = build_domain(&Options::default(), &ctx);
		assert!(!domain.to_string().contains("journal_id"));
		assert!(!domain.filter(&book).unwrap().is_empty());
	}

	#[test]
	fn test_undetermined_period_matches_nothing() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, Some(1), None, d("2017-12-31")).unwrap();
		let options = Options {
			date: Some(Period::undetermined(DateMode::Range)),
			all_entries: Some(true),
			..Default::default()
		};
		let domain = build_domain(&options, &ctx);
		assert!(domain.to_string().contains("('id', 'in', [])"));
		assert!(domain.filter(&book).unwrap().is_empty());
	}

	#[test]
	fn test_initial_balance_accounts_cross_the_start_date() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, Some(2), None, d("2017-12-31")).unwrap();
		let mut options = Options {
			date: Some(range(&ctx, "2017-12-01", "2017-12-31")),
			all_entries: Some(true),
			..Default::default()
		};
		// bank lines (include_initial_balance) from earlier dates are kept
		assert_eq!(
			ids(build_domain(&options, &ctx).filter(&book).unwrap()),
			vec![1, 4, 5, 6, 7, 8]
		);

		options.date.as_mut().unwrap().strict_range = true;
		assert_eq!(
			ids(build_domain(&options, &ctx).filter(&book).unwrap()),
			vec![5, 6, 7, 8]
		);

		options.all_entries = Some(false);
		assert_eq!(
			ids(build_domain(&options, &ctx).filter(&book).unwrap()),
			vec![5, 6]
		);
	}

	#[test]
	fn test_partner_and_analytic_filters() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let options = Options {
			partner_categories: Some(vec![1]),
			..Default::default()
		};
		assert_eq!(ids(build_domain(&options, &ctx).filter(&book).unwrap()), vec![3, 4]);

		let options = Options {
			analytic_tags: Some(vec![1]),
			partner_ids: Some(vec![]),
			..Default::default()
		};
		assert_eq!(ids(build_domain(&options, &ctx).filter(&book).unwrap()), vec![5]);
	}

	#[test]
	fn test_multi_company_domain() {
		let book = sample_book();
		let ctx = RequestContext::new(&book, None, None, d("2017-12-31")).unwrap();
		let options = Options {
			multi_company: Some(vec![
				crate::options::CompanyOption {
					id: 1,
					name: "Acme US".to_string(),
					selected: false,
				},
				crate::options::CompanyOption {
					id: 2,
					name: "Acme EU".to_string(),
					selected: false,
				},
			]),
			..Default::default()
		};
		// nothing ticked means every listed company
		assert!(build_domain(&options, &ctx)
			.to_string()
			.contains("('company_id', 'in', [1, 2])"));
	}

	#[test]
	fn test_dangling_or_is_an_error() {
		let book = sample_book();
		let mut domain = Domain::new();
		domain.push_or();
		domain.push(Term::new(Field::CompanyId, Operator::Eq, Value::Id(1)));
		assert!(domain.matches(&book.move_lines[0], &book).is_err());
	}

	#[test]
	fn test_mismatched_term_is_an_error() {
		let book = sample_book();
		let term = Term::new(Field::Date, Operator::In, Value::Bool(true));
		assert!(term.matches(&book.move_lines[0], &book).is_err());
	}
}
