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
use crate::util::date::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One journal item: a debit or credit on one account, as part of a move.
/// Move-level data (name, reference, state) is denormalized onto each line.
#[derive(Clone, Debug, Deserialize)]
pub struct MoveLine {
	pub id: u32,
	#[serde(default = "MoveLine::default_move_name")]
	pub move_name: String,
	#[serde(default)]
	pub move_ref: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub state: MoveState,
	#[serde(default)]
	pub display_type: Option<DisplayType>,

	pub date: Date,
	pub company_id: u32,
	pub journal_id: u32,
	pub account_id: u32,
	#[serde(default)]
	pub partner_id: Option<u32>,
	#[serde(default)]
	pub analytic_account_id: Option<u32>,
	#[serde(default)]
	pub analytic_tag_ids: Vec<u32>,

	#[serde(default)]
	pub debit: Decimal,
	#[serde(default)]
	pub credit: Decimal,
}

#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
	Draft,
	#[default]
	Posted,
	Cancel,
}

/// Lines of an invoice that hold layout rather than amounts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
	LineSection,
	LineNote,
}

impl MoveLine {
	fn default_move_name() -> String {
		"/".to_string()
	}
}

impl fmt::Display for MoveState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			MoveState::Draft => "draft",
			MoveState::Posted => "posted",
			MoveState::Cancel => "cancel",
		};
		write!(f, "{}", s)
	}
}

impl fmt::Display for DisplayType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			DisplayType::LineSection => "line_section",
			DisplayType::LineNote => "line_note",
		};
		write!(f, "{}", s)
	}
}
