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
pub mod assembler;
pub mod filters;
pub mod period;

use crate::gl::context::RequestContext;
use crate::gl::journal::JournalType;
use crate::options::period::{DateMode, Period, PeriodType};
use crate::util::date::Date;
use serde::{Deserialize, Serialize};

/// The state of every filter of a report. A missing key means the filter
/// does not apply to the report at all. Options travel back and forth
/// through the caller, which hands them back as the previous options on the
/// next request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
	#[serde(default)]
	pub unfolded_lines: Vec<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub multi_company: Option<Vec<CompanyOption>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub date: Option<Period>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comparison: Option<ComparisonOption>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub journals: Option<Vec<JournalOption>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name_journal_group: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub analytic: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub analytic_accounts: Option<Vec<u32>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub analytic_tags: Option<Vec<u32>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected_analytic_account_names: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected_analytic_tag_names: Option<Vec<String>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_ids: Option<Vec<u32>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partner_categories: Option<Vec<u32>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected_partner_ids: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected_partner_categories: Option<Vec<String>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub all_entries: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unfold_all: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hierarchy: Option<bool>,

	/// 1-based index of the header column to sort by; negative for
	/// ascending order
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected_column: Option<i32>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unposted_in_period: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyOption {
	pub id: u32,
	pub name: String,
	pub selected: bool,
}

/// An entry of the journal picker: section dividers, journal groups and
/// journals proper. Only journals carry a selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalOption {
	Divider {
		name: String,
	},
	Group {
		name: String,
		ids: Vec<u32>,
	},
	Journal {
		id: u32,
		name: String,
		code: String,
		#[serde(rename = "type")]
		journal_type: JournalType,
		selected: bool,
	},
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
	#[default]
	NoComparison,
	PreviousPeriod,
	SameLastYear,
	Custom,
}

/// The comparison filter. The fields of the first compared period are
/// repeated at the top level, so a single comparison reads like a period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOption {
	pub filter: ComparisonKind,
	pub number_period: u32,
	#[serde(default)]
	pub date_from: Option<Date>,
	#[serde(default)]
	pub date_to: Option<Date>,
	#[serde(default)]
	pub periods: Vec<Period>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub string: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub period_type: Option<PeriodType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mode: Option<DateMode>,
}

impl ComparisonOption {
	pub fn new(
		filter: ComparisonKind,
		number_period: u32,
		date_from: Option<Date>,
		date_to: Option<Date>,
	) -> Self {
		Self {
			filter,
			number_period,
			date_from,
			date_to,
			periods: vec![],
			string: None,
			period_type: None,
			mode: None,
		}
	}

	/// Copies the first compared period onto the comparison itself
	pub fn flatten_first_period(&mut self) {
		if let Some(first) = self.periods.first() {
			self.date_from = first.date_from;
			self.date_to = first.date_to;
			self.string = Some(first.string.clone());
			self.period_type = Some(first.period_type);
			self.mode = Some(first.mode);
		}
	}
}

impl Options {
	/// Ids of the companies ticked in the company picker
	pub fn selected_company_ids(&self) -> Vec<u32> {
		self.multi_company
			.iter()
			.flatten()
			.filter(|c| c.selected)
			.map(|c| c.id)
			.collect()
	}

	/// Companies the report covers: the ticked ones, every listed one when
	/// none is ticked, or the current company without a company picker.
	pub fn report_company_ids(&self, ctx: &RequestContext) -> Vec<u32> {
		match &self.multi_company {
			Some(companies) if !companies.is_empty() => {
				let selected = self.selected_company_ids();
				if selected.is_empty() {
					companies.iter().map(|c| c.id).collect()
				} else {
					selected
				}
			},
			_ => vec![ctx.company.id],
		}
	}

	/// Ids of the selected journals, or None when journals don't apply
	pub fn selected_journal_ids(&self) -> Option<Vec<u32>> {
		self.journals.as_ref().map(|journals| {
			journals
				.iter()
				.filter_map(|j| match j {
					JournalOption::Journal { id, selected: true, .. } => Some(*id),
					_ => None,
				})
				.collect()
		})
	}

	/// One set of options per period shown: the requested period first,
	/// then each compared period in turn.
	pub fn periods_list(&self) -> Vec<Options> {
		let mut list = vec![];
		if self.date.is_some() {
			list.push(self.clone());
		}
		if let Some(comparison) = &self.comparison {
			for period in &comparison.periods {
				let mut options = self.clone();
				options.date = Some(period.clone());
				list.push(options);
			}
		}
		list
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_absent_filters_are_not_serialized() {
		let options = Options::default();
		let json = serde_json::to_string(&options).unwrap();
		assert_eq!(json, r#"{"unfolded_lines":[]}"#);
	}

	#[test]
	fn test_journal_options_are_tagged() {
		let json = r#"[
			{"kind": "divider", "name": "Journal Groups"},
			{"kind": "group", "name": "Operations", "ids": [1, 2]},
			{"kind": "journal", "id": 1, "name": "Sales", "code": "INV",
				"type": "sale", "selected": true},
			{"kind": "journal", "id": 2, "name": "Bank", "code": "BNK",
				"type": "bank", "selected": false}
		]"#;
		let journals: Vec<JournalOption> = serde_json::from_str(json).unwrap();
		let options = Options {
			journals: Some(journals),
			..Default::default()
		};
		assert_eq!(options.selected_journal_ids(), Some(vec![1]));
		assert_eq!(Options::default().selected_journal_ids(), None);
	}

	#[test]
	fn test_selected_companies() {
		let options = Options {
			multi_company: Some(vec![
				CompanyOption {
					id: 1,
					name: "A".to_string(),
					selected: false,
				},
				CompanyOption {
					id: 2,
					name: "B".to_string(),
					selected: true,
				},
			]),
			..Default::default()
		};
		assert_eq!(options.selected_company_ids(), vec![2]);
	}
}
