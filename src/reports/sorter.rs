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
use crate::options::Options;
use crate::reports::line::{ColumnHeader, ReportLine};
use log::warn;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Header column index and direction of the column to sort by
fn selection(options: &Options) -> Option<(usize, Decimal)> {
	let selected = options.selected_column.filter(|c| *c != 0)?;
	let index = (selected.unsigned_abs() as usize).checked_sub(1)?;
	let sign = if selected > 0 { Decimal::NEGATIVE_ONE } else { Decimal::ONE };
	Some((index, sign))
}

/// Flags the sorted header column with the direction of the sort
pub fn mark_sorted_header(headers: &mut [ColumnHeader], options: &Options) {
	if let Some((index, _)) = selection(options) {
		if let Some(header) = headers.get_mut(index) {
			if header.is_sortable() {
				let prefix = if options.selected_column.unwrap_or(0) > 0 {
					"up "
				} else {
					"down "
				};
				header.class = format!("{}{}", prefix, header.class);
			}
		}
	}
}

/// Orders sibling lines by the selected column, keeping every line right
/// after its parent. Total rows stay last among their siblings. Nothing
/// moves unless the selected column is sortable. Every line comes out
/// exactly once, even when parent links loop.
pub fn sort_lines(
	lines: Vec<ReportLine>,
	options: &Options,
	headers: &[ColumnHeader],
) -> Vec<ReportLine> {
	let (index, sign) = match selection(options) {
		Some(s) => s,
		None => return lines,
	};
	match headers.get(index) {
		Some(h) if h.is_sortable() => {},
		_ => return lines,
	}

	let known: HashSet<&str> = lines.iter().map(|l| l.id.as_str()).collect();
	let mut roots = vec![];
	let mut children: HashMap<String, Vec<usize>> = HashMap::new();
	for (i, line) in lines.iter().enumerate() {
		match &line.parent_id {
			Some(parent) if known.contains(parent.as_str()) => {
				children.entry(parent.clone()).or_default().push(i)
			},
			_ => roots.push(i),
		}
	}

	let key = |line: &ReportLine| -> (bool, Decimal) {
		// the leading header columns are spanned by the line name
		let value = index
			.checked_sub(line.colspan)
			.and_then(|cell| line.columns.get(cell))
			.map(|c| c.no_format.as_decimal())
			.unwrap_or_default();
		(line.is_total(), sign * value)
	};
	let compare = |a: &usize, b: &usize| -> Ordering { key(&lines[*a]).cmp(&key(&lines[*b])) };

	let mut visited = vec![false; lines.len()];
	let mut order = vec![];
	let mut pending = roots;
	while !pending.is_empty() {
		pending.sort_by(compare);
		let mut stack: Vec<usize> = pending.into_iter().rev().collect();
		while let Some(i) = stack.pop() {
			if std::mem::replace(&mut visited[i], true) {
				continue;
			}
			order.push(i);
			if let Some(kids) = children.get(&lines[i].id) {
				let mut sorted: Vec<usize> =
					kids.iter().copied().filter(|k| !visited[*k]).collect();
				sorted.sort_by(compare);
				stack.extend(sorted.into_iter().rev());
			}
		}
		// parents forming a cycle are never reached from a root
		pending = (0..lines.len()).filter(|i| !visited[*i]).collect();
		if !pending.is_empty() {
			warn!("{} lines have cyclic parents, kept at the top level", pending.len());
		}
	}

	let mut slots: Vec<Option<ReportLine>> = lines.into_iter().map(Some).collect();
	order.into_iter().filter_map(|i| slots[i].take()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reports::line::Cell;

	fn line(id: &str, parent: Option<&str>, value: i64) -> ReportLine {
		ReportLine {
			id: id.to_string(),
			name: id.to_string(),
			columns: vec![
				Cell::text(""),
				Cell::number(value.to_string(), Decimal::from(value), "number"),
			],
			parent_id: parent.map(|p| p.to_string()),
			colspan: 1,
			..Default::default()
		}
	}

	fn headers() -> Vec<ColumnHeader> {
		vec![
			ColumnHeader::new("", ""),
			ColumnHeader::new("Debit", "number"),
			ColumnHeader::new("Balance", "number sortable"),
		]
	}

	fn options(selected: i32) -> Options {
		Options {
			selected_column: Some(selected),
			..Default::default()
		}
	}

	fn ids(lines: &[ReportLine]) -> Vec<&str> {
		lines.iter().map(|l| l.id.as_str()).collect()
	}

	fn sample() -> Vec<ReportLine> {
		let mut total = line("total", None, 1000);
		total.class = "total".to_string();
		vec![
			line("a", None, 10),
			line("a1", Some("a"), 1),
			line("a2", Some("a"), 5),
			total,
			line("b", None, 30),
			line("c", None, -5),
		]
	}

	#[test]
	fn test_descending_with_children_and_total_last() {
		let sorted = sort_lines(sample(), &options(3), &headers());
		assert_eq!(ids(&sorted), vec!["b", "a", "a2", "a1", "c", "total"]);
	}

	#[test]
	fn test_ascending() {
		let sorted = sort_lines(sample(), &options(-3), &headers());
		assert_eq!(ids(&sorted), vec!["c", "a", "a1", "a2", "b", "total"]);
	}

	#[test]
	fn test_unsortable_column_is_a_no_op() {
		let sorted = sort_lines(sample(), &options(2), &headers());
		assert_eq!(ids(&sorted), vec!["a", "a1", "a2", "total", "b", "c"]);
		let sorted = sort_lines(sample(), &options(0), &headers());
		assert_eq!(ids(&sorted), vec!["a", "a1", "a2", "total", "b", "c"]);
	}

	#[test]
	fn test_stable_for_ties() {
		let lines = vec![line("x", None, 1), line("y", None, 1), line("z", None, 1)];
		let sorted = sort_lines(lines, &options(3), &headers());
		assert_eq!(ids(&sorted), vec!["x", "y", "z"]);
	}

	#[test]
	fn test_cyclic_parents_are_kept() {
		let lines = vec![
			line("a", Some("b"), 10),
			line("b", Some("a"), 30),
			line("c", None, 1),
		];
		let sorted = sort_lines(lines, &options(3), &headers());
		assert_eq!(ids(&sorted), vec!["c", "b", "a"]);
	}

	#[test]
	fn test_duplicate_ids_are_kept_once_each() {
		let lines = vec![
			line("x", None, 5),
			line("y", Some("x"), 1),
			line("x", Some("x"), 3),
		];
		let sorted = sort_lines(lines, &options(3), &headers());
		assert_eq!(ids(&sorted), vec!["x", "x", "y"]);
	}

	#[test]
	fn test_header_marker() {
		let mut h = headers();
		mark_sorted_header(&mut h, &options(3));
		assert_eq!(h[2].class, "up number sortable");

		let mut h = headers();
		mark_sorted_header(&mut h, &options(-3));
		assert_eq!(h[2].class, "down number sortable");

		let mut h = headers();
		mark_sorted_header(&mut h, &options(2));
		assert_eq!(h[1].class, "number");
	}
}
