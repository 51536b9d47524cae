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
use crate::reports::line::{ColumnHeader, ReportLine, SuperColumns};
use std::fmt::Write;

/// Fixed-width text table. Widths are measured in characters, so currency
/// symbols and non-breaking spaces line up.
pub struct Table {
	column_count: usize,
	rows: Vec<Row>,
	right_align: Vec<bool>,
}

pub enum Row {
	Header(Vec<String>),
	Data(Vec<String>),
	Separator,
	/// Rules under the given columns only
	PartialSeparator(Vec<bool>),
	/// Labels centered over runs of columns: (first column, column count, label)
	Banner(Vec<(usize, usize, String)>),
}

impl Table {
	pub fn new(column_count: usize) -> Self {
		Self {
			column_count,
			rows: Vec::new(),
			right_align: vec![false; column_count],
		}
	}

	pub fn add_header(&mut self, row: Vec<String>) {
		self.rows.push(Row::Header(self.pad(row)));
	}

	pub fn add_row(&mut self, row: Vec<String>) {
		self.rows.push(Row::Data(self.pad(row)));
	}

	pub fn add_banner(&mut self, spans: Vec<(usize, usize, String)>) {
		self.rows.push(Row::Banner(spans));
	}

	pub fn add_separator(&mut self) {
		self.rows.push(Row::Separator);
	}

	pub fn add_partial_separator(&mut self, indices: &[usize]) {
		let mut cols = vec![false; self.column_count];
		for i in indices.iter().filter(|i| **i < self.column_count) {
			cols[*i] = true;
		}
		self.rows.push(Row::PartialSeparator(cols));
	}

	pub fn right_align(&mut self, cols: &[usize]) {
		for col in cols.iter().filter(|c| **c < self.column_count) {
			self.right_align[*col] = true;
		}
	}

	/// Short rows get blank cells; long rows are cut to the column count
	fn pad(&self, mut row: Vec<String>) -> Vec<String> {
		row.resize(self.column_count, String::new());
		row
	}

	pub fn render(&self) -> String {
		let mut max_widths = vec![0; self.column_count];
		for row in &self.rows {
			if let Row::Data(cells) | Row::Header(cells) = row {
				for (i, value) in cells.iter().enumerate() {
					max_widths[i] = max_widths[i].max(value.chars().count());
				}
			}
		}

		let mut out = String::new();
		for row in &self.rows {
			let line = match row {
				Row::Header(cells) => self.header_row(&max_widths, cells),
				Row::Banner(spans) => self.banner_row(&max_widths, spans),
				Row::Data(cells) => self.data_row(&max_widths, cells),
				Row::Separator => {
					let total: usize = max_widths.iter().sum::<usize>()
						+ 3 * self.column_count.saturating_sub(1);
					"-".repeat(total)
				},
				Row::PartialSeparator(cols) => cols
					.iter()
					.enumerate()
					.map(|(i, draw)| {
						let c = if *draw { "-" } else { " " };
						c.repeat(max_widths[i])
					})
					.collect::<Vec<_>>()
					.join("   "),
			};
			let _ = writeln!(out, "{}", line.trim_end());
		}
		out
	}

	fn data_row(&self, max_widths: &[usize], cells: &[String]) -> String {
		cells
			.iter()
			.enumerate()
			.map(|(i, value)| {
				if self.right_align[i] {
					format!("{:>width$}", value, width = max_widths[i])
				} else {
					format!("{:<width$}", value, width = max_widths[i])
				}
			})
			.collect::<Vec<_>>()
			.join("   ")
	}

	fn header_row(&self, max_widths: &[usize], cells: &[String]) -> String {
		cells
			.iter()
			.enumerate()
			.map(|(i, value)| Table::center_align(value, max_widths[i]))
			.collect::<Vec<_>>()
			.join(" | ")
	}

	fn banner_row(&self, max_widths: &[usize], spans: &[(usize, usize, String)]) -> String {
		let mut parts = vec![];
		let mut col = 0;
		for (start, count, label) in spans {
			while col < *start && col < self.column_count {
				parts.push(" ".repeat(max_widths[col]));
				col += 1;
			}
			let end = (start + count).min(self.column_count);
			if end <= col {
				continue;
			}
			let width = max_widths[col..end].iter().sum::<usize>() + 3 * (end - col - 1);
			parts.push(Table::center_align(label, width));
			col = end;
		}
		while col < self.column_count {
			parts.push(" ".repeat(max_widths[col]));
			col += 1;
		}
		parts.join(" | ")
	}

	fn center_align(value: &str, width: usize) -> String {
		let len = value.chars().count();
		if len >= width {
			return value.to_string();
		}
		let total_padding = width - len;
		let left_padding = total_padding / 2;
		let right_padding = total_padding - left_padding;

		format!(
			"{}{}{}",
			" ".repeat(left_padding),
			value,
			" ".repeat(right_padding)
		)
	}
}

/// Plain-text rendering of a report: names indented by level, amounts right
/// aligned, a rule above each total.
pub fn render_text(
	title: &str,
	headers: &[Vec<ColumnHeader>],
	super_columns: &SuperColumns,
	lines: &[ReportLine],
) -> String {
	let column_count = headers
		.iter()
		.map(|row| row.iter().map(|c| c.colspan.max(1)).sum::<usize>())
		.chain(lines.iter().map(|l| l.colspan.max(1) + l.columns.len()))
		.max()
		.unwrap_or(1);

	let mut table = Table::new(column_count);
	table.right_align(&(1..column_count).collect::<Vec<_>>());

	if !super_columns.columns.is_empty() {
		let merge = super_columns.merge.max(1);
		let spans = super_columns
			.columns
			.iter()
			.enumerate()
			.map(|(i, label)| {
				(super_columns.x_offset + i * merge, merge, label.replace('\n', " "))
			})
			.collect();
		table.add_banner(spans);
	}
	for header in headers {
		let mut row = vec![];
		for column in header {
			row.push(column.name.clone());
			row.extend(vec![String::new(); column.colspan.saturating_sub(1)]);
		}
		table.add_header(row);
	}
	table.add_separator();

	for line in lines {
		if line.is_total() {
			let amounts: Vec<usize> = (line.colspan.max(1)..column_count).collect();
			table.add_partial_separator(&amounts);
		}
		let indent = "  ".repeat(line.level.saturating_sub(1) as usize);
		let mut row = vec![format!("{}{}", indent, line.name)];
		row.extend(vec![String::new(); line.colspan.saturating_sub(1)]);
		row.extend(line.columns.iter().map(|c| c.name.clone()));
		table.add_row(row);
	}

	format!("{}\n\n{}", title, table.render())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reports::line::Cell;
	use rust_decimal::Decimal;

	#[test]
	fn test_table_alignment() {
		let mut table = Table::new(2);
		table.right_align(&[1]);
		table.add_header(vec!["Name".to_string(), "Amount".to_string()]);
		table.add_separator();
		table.add_row(vec!["Bank".to_string(), "$\u{a0}1.00".to_string()]);
		table.add_row(vec!["Sales".to_string(), "$\u{a0}10.00".to_string()]);
		table.add_partial_separator(&[1]);
		let expected = [
			"Name  | Amount",
			"---------------",
			"Bank     $\u{a0}1.00",
			"Sales   $\u{a0}10.00",
			"        -------",
		];
		assert_eq!(table.render(), format!("{}\n", expected.join("\n")));
	}

	#[test]
	fn test_banner_spans_columns() {
		let mut table = Table::new(4);
		table.add_banner(vec![(1, 3, "2017".to_string())]);
		table.add_header(
			["", "Debit", "Credit", "Balance"].iter().map(|s| s.to_string()).collect(),
		);
		// 5 + 6 + 7 wide plus two joints of 3, so 2017 sits 10 columns in
		let expected = format!(" | {}2017", " ".repeat(10));
		assert_eq!(table.render().lines().next(), Some(expected.as_str()));
	}

	#[test]
	fn test_render_text() {
		let headers = vec![vec![
			ColumnHeader::new("", ""),
			ColumnHeader::new("Balance", "number"),
		]];
		let lines = vec![
			ReportLine {
				id: "a".to_string(),
				name: "Bank".to_string(),
				columns: vec![Cell::number("10.00".to_string(), Decimal::TEN, "number")],
				level: 2,
				colspan: 1,
				..Default::default()
			},
			ReportLine {
				id: "t".to_string(),
				name: "Total".to_string(),
				columns: vec![Cell::number("10.00".to_string(), Decimal::TEN, "number")],
				level: 1,
				class: "total".to_string(),
				colspan: 1,
				..Default::default()
			},
		];
		let text = render_text("Trial Balance", &headers, &SuperColumns::default(), &lines);
		let expected = [
			"Trial Balance",
			"",
			"       | Balance",
			"----------------",
			"  Bank     10.00",
			"         -------",
			"Total      10.00",
		];
		assert_eq!(text, format!("{}\n", expected.join("\n")));
	}
}
