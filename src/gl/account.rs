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
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Account {
	pub id: u32,
	pub code: String,
	pub name: String,
	#[serde(default)]
	pub group_id: Option<u32>,

	/// Balance-sheet style accounts carry their balance over from the
	/// beginning of time instead of restarting every period
	#[serde(default)]
	pub include_initial_balance: bool,
}

/// A node of the chart-of-accounts tree, e.g. "60 Purchases".
#[derive(Clone, Debug, Deserialize)]
pub struct AccountGroup {
	pub id: u32,
	#[serde(default)]
	pub code_prefix: Option<String>,
	pub name: String,
	#[serde(default)]
	pub parent_id: Option<u32>,
}

impl Account {
	/// "601000 Purchases of goods"
	pub fn display_name(&self) -> String {
		format!("{} {}", self.code, self.name)
	}
}

impl AccountGroup {
	/// Label used for this group on a hierarchy line, e.g. "60 Purchases"
	pub fn label(&self) -> String {
		format!(
			"{} {}",
			self.code_prefix.as_deref().unwrap_or_default(),
			self.name
		)
	}
}
