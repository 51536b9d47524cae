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
use crate::gl::context::{Group, RequestContext};
use crate::gl::entry::MoveState;
use crate::options::filters::{
	init_comparison, init_date, init_multi_company, initializer, FilterDecl,
	FilterDefault, FilterKey, FilterValue,
};
use crate::options::{JournalOption, Options};
use anyhow::Error;
use log::{debug, warn};
use std::collections::{BTreeSet, HashSet};

/// Checks a list of filter declarations once, when a report is defined.
pub fn validate_filters(filters: &[FilterDecl]) -> Result<(), Error> {
	let mut seen = HashSet::new();
	for (position, decl) in filters.iter().enumerate() {
		if !seen.insert(decl.key) {
			return Err(ReportError::Configuration(format!(
				"filter {:?} is declared twice",
				decl.key
			))
			.into());
		}

		let fits = match (&decl.key, &decl.default) {
			(_, FilterDefault::Unset) => true,
			(FilterKey::Date, FilterDefault::Date(_)) => true,
			(FilterKey::Comparison, FilterDefault::Comparison(_)) => true,
			(FilterKey::SelectedColumn, FilterDefault::Int(_)) => true,
			(
				FilterKey::Journals
				| FilterKey::Analytic
				| FilterKey::Partner
				| FilterKey::AllEntries
				| FilterKey::UnfoldAll
				| FilterKey::Hierarchy,
				FilterDefault::Bool(_),
			) => true,
			(
				FilterKey::SelectedColumn
				| FilterKey::Journals
				| FilterKey::Analytic
				| FilterKey::Partner
				| FilterKey::AllEntries
				| FilterKey::UnfoldAll
				| FilterKey::Hierarchy,
				FilterDefault::Dynamic(_),
			) => true,
			_ => false,
		};
		if !fits {
			return Err(ReportError::Configuration(format!(
				"filter {:?} cannot default to {:?}",
				decl.key, decl.default
			))
			.into());
		}

		if decl.key == FilterKey::Comparison {
			let date_before = filters[..position]
				.iter()
				.any(|d| d.key == FilterKey::Date && !d.default.is_unset());
			if !date_before {
				return Err(ReportError::Configuration(
					"the comparison filter must be declared after the date filter"
						.to_string(),
				)
				.into());
			}
		}
	}
	Ok(())
}

/// Builds the options of a report from its filter declarations, carrying
/// forward what the caller selected in the previous options.
pub fn build_options(
	filters: &[FilterDecl],
	ctx: &RequestContext,
	previous: Option<&Options>,
) -> Result<Options, Error> {
	let mut options = Options {
		unfolded_lines: previous
			.map(|p| p.unfolded_lines.clone())
			.unwrap_or_default(),
		..Default::default()
	};

	// always present, whatever the declarations say
	init_multi_company(&mut options, ctx);

	let declared = |key: FilterKey| {
		filters
			.iter()
			.find(|d| d.key == key && !d.default.is_unset())
	};

	if let Some(decl) = declared(FilterKey::Date) {
		init_date(&mut options, previous, decl, ctx)?;
	}
	if let Some(decl) = declared(FilterKey::Comparison) {
		init_comparison(&mut options, previous, decl, ctx)?;
	}

	for decl in filters {
		if matches!(decl.key, FilterKey::Date | FilterKey::Comparison)
			|| decl.default.is_unset()
		{
			continue;
		}

		if let Some(init) = initializer(decl.key) {
			init(&mut options, previous, decl, ctx)?;
			continue;
		}

		let value = match previous.and_then(|p| decl.key.read(p)) {
			Some(value) => value,
			None => match decl.default.scalar(ctx) {
				Some(value) => value,
				None => continue,
			},
		};
		decl.key.write(&mut options, value)?;
	}

	complete_options(&mut options, ctx);
	debug!("built options: {:?}", options);

	Ok(options)
}

/// Adds what can only be known once every filter is set: whether draft
/// entries exist in the period, and the name of the journal group matching
/// the journal selection.
fn complete_options(options: &mut Options, ctx: &RequestContext) {
	if let (Some(date), Some(_)) = (&options.date, options.all_entries) {
		let date_to = date.date_to.unwrap_or(ctx.today);
		let unposted = ctx.book.move_lines.iter().any(|l| {
			l.state == MoveState::Draft
				&& l.date <= date_to
				&& ctx.allowed_company_ids.contains(&l.company_id)
		});
		options.unposted_in_period = Some(unposted);
	}

	if let Some(selected) = options.selected_journal_ids() {
		let selected: BTreeSet<u32> = selected.into_iter().collect();
		if selected.is_empty() {
			return;
		}

		let company_ids = if ctx.user.company_ids.is_empty() {
			vec![ctx.company.id]
		} else {
			ctx.user.company_ids.clone()
		};
		let journals = ctx.book.journals_of(&company_ids);

		options.name_journal_group = ctx
			.book
			.journal_groups_of(&[ctx.company.id])
			.into_iter()
			.find(|g| {
				let members: BTreeSet<u32> =
					g.member_ids(&journals).into_iter().collect();
				members == selected
			})
			.map(|g| g.name.clone());
	}
}

/// Drops whatever the options claim that the user may not see. Options come
/// back from the caller, so they are never trusted as they are.
pub fn check_report_security(options: &mut Options, ctx: &RequestContext) {
	if let Some(companies) = options.multi_company.take() {
		if ctx.has_group(Group::MultiCompany) {
			let allowed: Vec<_> = companies
				.into_iter()
				.filter(|c| ctx.user.company_ids.contains(&c.id))
				.collect();
			options.multi_company = Some(allowed);
		} else {
			warn!(
				"user {} may not report on several companies; ignoring selection",
				ctx.user.name
			);
		}
	}

	if let Some(journals) = &mut options.journals {
		let company_ids = ctx.journal_company_ids();
		journals.retain(|j| match j {
			JournalOption::Journal { id, .. } => ctx
				.book
				.journal(*id)
				.is_some_and(|journal| company_ids.contains(&journal.company_id)),
			_ => true,
		});
	}
}

/// Forces a scalar filter, the way a user ticking a box in the filter bar
/// would before asking for the report again.
pub fn override_filter(
	options: &mut Options,
	key: FilterKey,
	value: FilterValue,
) -> Result<(), Error> {
	key.write(options, value)
}
