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
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct Journal {
	pub id: u32,
	pub name: String,
	pub code: String,
	#[serde(rename = "type")]
	pub journal_type: JournalType,
	pub company_id: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalType {
	Sale,
	Purchase,
	Cash,
	Bank,
	General,
}

/// A named set of journals, defined by the journals it leaves out.
#[derive(Clone, Debug, Deserialize)]
pub struct JournalGroup {
	pub id: u32,
	pub name: String,
	#[serde(default = "JournalGroup::default_sequence")]
	pub sequence: u32,
	#[serde(default)]
	pub excluded_journal_ids: Vec<u32>,
	#[serde(default)]
	pub company_id: Option<u32>,
}

impl JournalGroup {
	fn default_sequence() -> u32 {
		10
	}

	/// Ids of the given journals that this group keeps.
	pub fn member_ids(&self, journals: &[&Journal]) -> Vec<u32> {
		journals
			.iter()
			.filter(|j| !self.excluded_journal_ids.contains(&j.id))
			.map(|j| j.id)
			.collect()
	}
}
