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
use crate::gl::account::{Account, AccountGroup};
use crate::gl::company::{Company, Currency, SymbolPosition};
use crate::gl::context::User;
use crate::gl::entry::MoveLine;
use crate::gl::exchange_rates::{ExchangeRates, RateRecord};
use crate::gl::journal::{Journal, JournalGroup};
use crate::gl::partner::{Partner, Tag};
use anyhow::{bail, Error};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashSet;

/// All records a report can read. Loaded once per invocation and never
/// mutated afterwards.
#[derive(Debug, Deserialize)]
pub struct Book {
	pub companies: Vec<Company>,
	#[serde(default)]
	pub currencies: Vec<Currency>,
	#[serde(default, rename = "rates")]
	rate_records: Vec<RateRecord>,
	#[serde(skip)]
	pub exchange_rates: ExchangeRates,
	pub users: Vec<User>,

	#[serde(default)]
	pub journals: Vec<Journal>,
	#[serde(default)]
	pub journal_groups: Vec<JournalGroup>,
	#[serde(default)]
	pub accounts: Vec<Account>,
	#[serde(default)]
	pub account_groups: Vec<AccountGroup>,
	#[serde(default)]
	pub partners: Vec<Partner>,
	#[serde(default)]
	pub partner_categories: Vec<Tag>,
	#[serde(default)]
	pub analytic_accounts: Vec<Tag>,
	#[serde(default)]
	pub analytic_tags: Vec<Tag>,
	#[serde(default)]
	pub move_lines: Vec<MoveLine>,
}

impl Book {
	pub fn from_json(content: &str) -> Result<Self, Error> {
		let mut book: Book = serde_json::from_str(content)?;
		book.finalize()?;
		Ok(book)
	}

	/// Builds the rate index and checks that every reference resolves.
	fn finalize(&mut self) -> Result<(), Error> {
		if self.companies.is_empty() {
			bail!("Book declares no companies")
		}
		if self.users.is_empty() {
			bail!("Book declares no users")
		}

		let mut seen = HashSet::new();
		for company in &self.companies {
			company.validate()?;
			if !seen.insert(company.id) {
				bail!("Duplicate company id {}", company.id)
			}
			if self.currency(&company.currency).is_none() {
				warn!(
					"Currency {} of company {} is not declared; assuming 2 decimals",
					company.currency, company.name
				);
			}
		}

		for user in &self.users {
			for id in &user.company_ids {
				if self.company(*id).is_none() {
					bail!("User {} refers to unknown company {}", user.name, id)
				}
			}
		}

		for journal in &self.journals {
			if self.company(journal.company_id).is_none() {
				bail!(
					"Journal {} refers to unknown company {}",
					journal.code,
					journal.company_id
				)
			}
		}

		for group in &self.account_groups {
			if let Some(parent) = group.parent_id {
				if self.account_group(parent).is_none() {
					bail!(
						"Account group {} refers to unknown parent {}",
						group.name,
						parent
					)
				}
			}
		}

		for account in &self.accounts {
			if let Some(group) = account.group_id {
				if self.account_group(group).is_none() {
					bail!(
						"Account {} refers to unknown group {}",
						account.code,
						group
					)
				}
			}
		}

		for line in &self.move_lines {
			if self.account(line.account_id).is_none() {
				bail!(
					"Move line {} refers to unknown account {}",
					line.id,
					line.account_id
				)
			}
			if self.journal(line.journal_id).is_none() {
				bail!(
					"Move line {} refers to unknown journal {}",
					line.id,
					line.journal_id
				)
			}
			if self.company(line.company_id).is_none() {
				bail!(
					"Move line {} refers to unknown company {}",
					line.id,
					line.company_id
				)
			}
		}

		self.exchange_rates = ExchangeRates::from_records(&self.rate_records)?;

		debug!(
			"loaded book: {} companies, {} accounts, {} move lines",
			self.companies.len(),
			self.accounts.len(),
			self.move_lines.len()
		);

		Ok(())
	}

	// -------------
	// -- LOOKUPS --
	// -------------

	pub fn company(&self, id: u32) -> Option<&Company> {
		self.companies.iter().find(|c| c.id == id)
	}

	pub fn currency(&self, code: &str) -> Option<&Currency> {
		self.currencies.iter().find(|c| c.code == code)
	}

	/// The declared currency, or a two-decimal stand-in when undeclared
	pub fn currency_or_default(&self, code: &str) -> Currency {
		self.currency(code).cloned().unwrap_or_else(|| Currency {
			code: code.to_string(),
			decimal_places: 2,
			symbol: None,
			position: SymbolPosition::After,
		})
	}

	pub fn user(&self, id: u32) -> Option<&User> {
		self.users.iter().find(|u| u.id == id)
	}

	pub fn journal(&self, id: u32) -> Option<&Journal> {
		self.journals.iter().find(|j| j.id == id)
	}

	pub fn account(&self, id: u32) -> Option<&Account> {
		self.accounts.iter().find(|a| a.id == id)
	}

	pub fn account_group(&self, id: u32) -> Option<&AccountGroup> {
		self.account_groups.iter().find(|g| g.id == id)
	}

	pub fn partner(&self, id: u32) -> Option<&Partner> {
		self.partners.iter().find(|p| p.id == id)
	}

	/// Journals of the given companies, ordered by company then name
	pub fn journals_of(&self, company_ids: &[u32]) -> Vec<&Journal> {
		let mut journals: Vec<&Journal> = self
			.journals
			.iter()
			.filter(|j| company_ids.contains(&j.company_id))
			.collect();
		journals.sort_by(|a, b| {
			a.company_id.cmp(&b.company_id).then_with(|| a.name.cmp(&b.name))
		});
		journals
	}

	/// Journal groups visible from the given companies, by sequence then id
	pub fn journal_groups_of(&self, company_ids: &[u32]) -> Vec<&JournalGroup> {
		let mut groups: Vec<&JournalGroup> = self
			.journal_groups
			.iter()
			.filter(|g| g.company_id.map_or(true, |c| company_ids.contains(&c)))
			.collect();
		groups.sort_by_key(|g| (g.sequence, g.id));
		groups
	}

	/// The chain of groups from the account's direct group up to the root.
	/// Stops early on a cycle rather than looping.
	pub fn group_chain(&self, account: &Account) -> Vec<&AccountGroup> {
		let mut chain = vec![];
		let mut next = account.group_id;
		while let Some(id) = next {
			match self.account_group(id) {
				Some(group) if !chain.iter().any(|g: &&AccountGroup| g.id == id) => {
					chain.push(group);
					next = group.parent_id;
				},
				_ => break,
			}
		}
		chain
	}

	/// Names of the records with the given ids, in the order of the ids
	pub fn tag_names(tags: &[Tag], ids: &[u32]) -> Vec<String> {
		ids.iter()
			.filter_map(|id| tags.iter().find(|t| t.id == *id))
			.map(|t| t.name.clone())
			.collect()
	}
}
