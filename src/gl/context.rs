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
use crate::gl::company::{Company, Currency};
use crate::util::date::Date;
use anyhow::Error;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct User {
	pub id: u32,
	pub name: String,
	/// Companies this user may report on
	pub company_ids: Vec<u32>,
	#[serde(default)]
	pub groups: Vec<Group>,
}

/// Access groups that change what a report offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
	MultiCompany,
	AnalyticAccounting,
	AnalyticTags,
}

/// strftime patterns used for period labels
#[derive(Clone, Debug, PartialEq)]
pub struct DateFormats {
	/// Full date, e.g. "Dec 31, 2017"
	pub long: String,
	/// Month and year, e.g. "Dec 2017"
	pub month: String,
}

impl Default for DateFormats {
	fn default() -> Self {
		Self {
			long: "%b %-d, %Y".to_string(),
			month: "%b %Y".to_string(),
		}
	}
}

/// Everything a report needs to know about who is asking, and when. Passed
/// explicitly to every step of the pipeline; nothing here is global.
#[derive(Clone, Debug)]
pub struct RequestContext<'a> {
	pub book: &'a Book,
	pub user: &'a User,

	/// The company the request is made from; its currency is the reference
	/// currency of every report
	pub company: &'a Company,

	/// Companies the user has switched on for this request
	pub allowed_company_ids: Vec<u32>,

	pub today: Date,
	pub print_mode: bool,

	/// Amounts are left unformatted, e.g. for spreadsheet export
	pub no_format: bool,
	pub formats: DateFormats,
}

impl<'a> RequestContext<'a> {
	/// Resolves the acting user and company. Without a user, the first user
	/// of the book acts; without a company, the user's first company.
	pub fn new(
		book: &'a Book,
		user_id: Option<u32>,
		company_id: Option<u32>,
		today: Date,
	) -> Result<Self, Error> {
		let user = match user_id {
			Some(id) => book.user(id),
			None => book.users.first(),
		}
		.ok_or_else(|| {
			ReportError::Configuration(format!(
				"unknown user {}",
				user_id.map(|i| i.to_string()).unwrap_or_default()
			))
		})?;

		let company_id = company_id
			.or_else(|| user.company_ids.first().copied())
			.ok_or_else(|| {
				ReportError::Configuration(format!(
					"user {} has no company",
					user.name
				))
			})?;

		if !user.company_ids.contains(&company_id) {
			return Err(ReportError::Configuration(format!(
				"user {} may not access company {}",
				user.name, company_id
			))
			.into());
		}

		let company = book.company(company_id).ok_or_else(|| {
			ReportError::Configuration(format!("unknown company {}", company_id))
		})?;

		Ok(Self {
			book,
			user,
			company,
			allowed_company_ids: vec![company.id],
			today,
			print_mode: false,
			no_format: false,
			formats: Default::default(),
		})
	}

	/// Switches on additional companies, silently keeping only those the
	/// user may access. The current company always stays allowed.
	pub fn allow_companies(mut self, ids: &[u32]) -> Self {
		let mut allowed: Vec<u32> = ids
			.iter()
			.copied()
			.filter(|id| self.user.company_ids.contains(id))
			.collect();
		if !allowed.contains(&self.company.id) {
			allowed.insert(0, self.company.id);
		}
		allowed.dedup();
		self.allowed_company_ids = allowed;
		self
	}

	pub fn with_print_mode(&self) -> Self {
		Self {
			print_mode: true,
			..self.clone()
		}
	}

	pub fn with_no_format(&self) -> Self {
		Self {
			no_format: true,
			..self.clone()
		}
	}

	pub fn has_group(&self, group: Group) -> bool {
		self.user.groups.contains(&group)
	}

	/// Companies of the user, in book order
	pub fn user_companies(&self) -> Vec<&'a Company> {
		self.book
			.companies
			.iter()
			.filter(|c| self.user.company_ids.contains(&c.id))
			.collect()
	}

	/// Companies whose journals the user may pick from
	pub fn journal_company_ids(&self) -> Vec<u32> {
		if self.user.company_ids.is_empty() {
			vec![self.company.id]
		} else {
			self.user.company_ids.clone()
		}
	}

	/// The reference currency of the report
	pub fn currency(&self) -> Currency {
		self.book.currency_or_default(&self.company.currency)
	}
}
