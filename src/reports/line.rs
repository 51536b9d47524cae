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
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a report. Lines form a forest through `parent_id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub columns: Vec<Cell>,
	#[serde(default)]
	pub level: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
	#[serde(default)]
	pub unfoldable: bool,
	#[serde(default)]
	pub unfolded: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub account_id: Option<u32>,
	#[serde(default)]
	pub class: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub style: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title_hover: Option<String>,

	/// Number of leading header columns the name spans
	#[serde(default = "default_colspan")]
	pub colspan: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub caret_options: Option<String>,

	/// Footnote number, only set when printing
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub footnote: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
	pub name: String,
	pub no_format: CellValue,
	#[serde(default)]
	pub class: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub style: Option<String>,
}

/// The raw value behind a displayed cell
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
	Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
	Text(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeader {
	pub name: String,
	#[serde(default)]
	pub class: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub style: Option<String>,
	#[serde(default = "default_colspan")]
	pub colspan: usize,
}

/// Labels spanning several header columns, used by the spreadsheet export
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SuperColumns {
	pub columns: Vec<String>,
	/// Number of header cells each label is merged over
	pub merge: usize,
	/// Column the first label starts at
	pub x_offset: usize,
}

fn default_colspan() -> usize {
	1
}

impl ReportLine {
	pub fn has_class(&self, class: &str) -> bool {
		self.class.split_whitespace().any(|c| c == class)
	}

	pub fn is_total(&self) -> bool {
		self.class.contains("total")
	}
}

impl Cell {
	pub fn number(name: String, value: Decimal, class: &str) -> Self {
		Self {
			name,
			no_format: CellValue::Number(value),
			class: class.to_string(),
			style: None,
		}
	}

	pub fn text(name: &str) -> Self {
		Self {
			name: name.to_string(),
			no_format: CellValue::Text(name.to_string()),
			class: String::new(),
			style: None,
		}
	}
}

impl CellValue {
	/// Sort key of the value; text sorts as zero
	pub fn as_decimal(&self) -> Decimal {
		match self {
			CellValue::Number(n) => *n,
			CellValue::Text(_) => Decimal::ZERO,
		}
	}
}

impl ColumnHeader {
	pub fn new(name: &str, class: &str) -> Self {
		Self {
			name: name.to_string(),
			class: class.to_string(),
			style: None,
			colspan: 1,
		}
	}

	pub fn is_sortable(&self) -> bool {
		self.class.contains("sortable")
	}
}
