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
use crate::gl::account::Account;
use crate::gl::book::Book;
use crate::gl::context::RequestContext;
use crate::options::Options;
use crate::reports::format::format_value;
use crate::reports::line::{Cell, CellValue, ReportLine};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Sort priority of real groups; they come before the catch-all
pub const MOST_SORT_PRIO: u8 = 0;
pub const LEAST_SORT_PRIO: u8 = 99;

const NO_GROUP: &str = "(No Group)";
const MAX_HEADER_NAME_LEN: usize = 60;

/// A step of a hierarchy path: sort priority, then the code shown
pub type Code = (u8, String);

/// Path of codes from the most general group down to the account's own,
/// e.g. `6 Expenses`, `60 Purchases`. Accounts outside any group fall back
/// to their code prefixes (`601234` gives `6`, `60`, `601`).
pub fn account_codes(book: &Book, account: &Account) -> Vec<Code> {
	let mut codes = vec![];
	if account.group_id.is_some() {
		for group in book.group_chain(account) {
			codes.push((MOST_SORT_PRIO, group.label()));
		}
	} else {
		let mut code: String = account.code.chars().take(3).collect();
		while !code.is_empty() {
			codes.push((MOST_SORT_PRIO, code.clone()));
			code.pop();
		}
	}
	codes.reverse();
	codes
}

struct Node {
	code: String,
	/// Level of the lines held here, and of the headers of its children
	/// plus one
	depth: u32,
	children: BTreeMap<Code, usize>,
	lines: Vec<ReportLine>,
}

/// Arena of nodes keyed by code path; node 0 is the root.
struct Hierarchy {
	nodes: Vec<Node>,
	root_parent: Option<String>,
	initialized: bool,
}

impl Hierarchy {
	fn new() -> Self {
		Self {
			nodes: vec![Node {
				code: String::new(),
				depth: 0,
				children: BTreeMap::new(),
				lines: vec![],
			}],
			root_parent: None,
			initialized: false,
		}
	}

	fn is_empty(&self) -> bool {
		self.nodes[0].children.is_empty()
	}

	fn child(&mut self, parent: usize, key: &Code) -> usize {
		if let Some(idx) = self.nodes[parent].children.get(key) {
			return *idx;
		}
		let idx = self.nodes.len();
		let depth = self.nodes[parent].depth + 1;
		self.nodes.push(Node {
			code: key.1.clone(),
			depth,
			children: BTreeMap::new(),
			lines: vec![],
		});
		self.nodes[parent].children.insert(key.clone(), idx);
		idx
	}

	/// Files a line under its code path. The first line added fixes the
	/// depth and the parent of the top-level headers.
	fn add(&mut self, mut line: ReportLine, path: &[Code], depth: u32, parent: Option<String>) {
		if !self.initialized {
			self.nodes[0].depth = depth;
			self.root_parent = parent;
			self.initialized = true;
		}

		let mut current = 0;
		for key in path {
			current = self.child(current, key);
		}
		let node = &mut self.nodes[current];
		line.level = node.depth;
		line.parent_id = Some(format!("hierarchy_{}", node.code));
		node.lines.push(line);
	}

	/// Grafts another hierarchy onto this one. The other's root settings
	/// win; nodes with the same path are combined.
	fn merge(&mut self, mut other: Hierarchy) {
		if !other.initialized {
			return;
		}
		self.nodes[0].depth = other.nodes[0].depth;
		self.root_parent = other.root_parent.take();
		self.initialized = true;
		self.graft(0, &mut other, 0);
	}

	fn graft(&mut self, target: usize, other: &mut Hierarchy, source: usize) {
		let lines = std::mem::take(&mut other.nodes[source].lines);
		self.nodes[target].lines.extend(lines);

		let children: Vec<(Code, usize)> = other.nodes[source]
			.children
			.iter()
			.map(|(k, v)| (k.clone(), *v))
			.collect();
		for (key, child) in children {
			let existing = self.nodes[target].children.get(&key).copied();
			let idx = match existing {
				Some(idx) => idx,
				None => {
					let idx = self.nodes.len();
					self.nodes.push(Node {
						code: key.1.clone(),
						depth: other.nodes[child].depth,
						children: BTreeMap::new(),
						lines: vec![],
					});
					self.nodes[target].children.insert(key, idx);
					idx
				},
			};
			self.graft(idx, other, child);
		}
	}

	/// Lines of the subtree at `idx`, headers included, along with the
	/// column totals of everything below it.
	fn emit(
		&mut self,
		idx: usize,
		options: &Options,
		ctx: &RequestContext,
	) -> (Vec<CellValue>, Vec<ReportLine>) {
		let mut lines = vec![];
		let mut rows: Vec<Vec<CellValue>> = vec![];

		for line in std::mem::take(&mut self.nodes[idx].lines) {
			rows.push(line.columns.iter().map(|c| c.no_format.clone()).collect());
			lines.push(line);
		}

		let parent_id = if idx == 0 {
			self.root_parent.clone()
		} else {
			Some(format!("hierarchy_{}", self.nodes[idx].code))
		};
		let level = self.nodes[idx].depth;
		let unfold_all = ctx.print_mode && options.unfolded_lines.is_empty();
		let currency = ctx.currency();

		let children: Vec<(Code, usize)> = self.nodes[idx]
			.children
			.iter()
			.map(|(k, v)| (k.clone(), *v))
			.collect();
		for ((priority, code), child) in children {
			let (sums, sub_lines) = self.emit(child, options, ctx);
			let id = format!("hierarchy_{}", code);

			let name = if code.chars().count() < MAX_HEADER_NAME_LEN {
				code.clone()
			} else {
				let cut: String = code.chars().take(MAX_HEADER_NAME_LEN).collect();
				format!("{}...", cut)
			};

			let columns = sums
				.iter()
				.map(|value| match value {
					CellValue::Number(n) => Cell::number(
						format_value(*n, &currency, false, ctx.no_format),
						*n,
						"number",
					),
					CellValue::Text(s) => Cell::text(s),
				})
				.collect();

			lines.push(ReportLine {
				unfolded: unfold_all || options.unfolded_lines.contains(&id),
				id,
				name,
				title_hover: Some(code),
				unfoldable: true,
				level,
				parent_id: parent_id.clone(),
				columns,
				style: (priority == LEAST_SORT_PRIO).then(|| "font-style:italic;".to_string()),
				colspan: 1,
				..Default::default()
			});
			lines.extend(sub_lines);
			rows.push(sums);
		}

		(merge_columns(&rows), lines)
	}
}

/// Column-wise totals. A column holding any text totals to `n/a`, or to
/// empty text when every value in it is empty text.
fn merge_columns(rows: &[Vec<CellValue>]) -> Vec<CellValue> {
	let width = rows.iter().map(|r| r.len()).min().unwrap_or(0);
	(0..width)
		.map(|i| {
			let column: Vec<&CellValue> = rows.iter().map(|r| &r[i]).collect();
			if column.iter().any(|v| matches!(v, CellValue::Text(_))) {
				let all_blank = column
					.iter()
					.all(|v| matches!(v, CellValue::Text(s) if s.is_empty()));
				if all_blank {
					CellValue::Text(String::new())
				} else {
					CellValue::Text("n/a".to_string())
				}
			} else {
				CellValue::Number(column.iter().map(|v| v.as_decimal()).sum())
			}
		})
		.collect()
}

fn is_grouped_by_account(line: &ReportLine) -> bool {
	line.caret_options.as_deref() == Some("account.account") || line.account_id.is_some()
}

/// Regroups account lines under headers built from the chart of accounts.
/// Every run of consecutive account lines becomes its own hierarchy; other
/// lines stay where they are and close the run.
pub fn build_hierarchy(
	lines: Vec<ReportLine>,
	options: &Options,
	ctx: &RequestContext,
) -> Vec<ReportLine> {
	let book = ctx.book;
	let mut new_lines = vec![];
	let mut grouped = Hierarchy::new();
	let mut no_group_lines: Vec<(ReportLine, Option<&Account>)> = vec![];

	for line in lines.into_iter().map(Some).chain(std::iter::once(None)) {
		let line = match line {
			Some(l) if is_grouped_by_account(&l) => l,
			closing => {
				let depth = closing.as_ref().map(|l| l.level).filter(|l| *l > 0).unwrap_or(1);
				let root_parent = closing.as_ref().and_then(|l| l.parent_id.clone());

				// Prefix codes only make sense when no account of this run
				// belongs to a group.
				let mut no_group = Hierarchy::new();
				for (ng_line, account) in no_group_lines.drain(..) {
					let prefix_codes = match account {
						Some(a) if grouped.is_empty() => account_codes(book, a),
						_ => vec![],
					};
					let path = if prefix_codes.is_empty() {
						vec![(LEAST_SORT_PRIO, NO_GROUP.to_string())]
					} else {
						prefix_codes
					};
					no_group.add(ng_line, &path, depth, root_parent.clone());
				}
				grouped.merge(no_group);

				if !grouped.is_empty() {
					let mut finished = std::mem::replace(&mut grouped, Hierarchy::new());
					new_lines.extend(finished.emit(0, options, ctx).1);
				}

				if let Some(l) = closing {
					new_lines.push(l);
				}
				continue;
			},
		};

		let account = line.account_id.and_then(|id| book.account(id));
		let codes = match account {
			Some(a) if a.group_id.is_some() => account_codes(book, a),
			_ => vec![],
		};
		if codes.is_empty() {
			no_group_lines.push((line, account));
			continue;
		}

		let depth = line.level + 1;
		let parent = line.parent_id.clone();
		grouped.add(line, &codes, depth, parent);
	}

	new_lines
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::book::tests::sample_book;
	use crate::util::date::Date;

	fn dec(s: &str) -> Decimal {
		s.parse().unwrap()
	}

	fn account_line(book: &Book, account_id: u32, amount: &str) -> ReportLine {
		let amount = dec(amount);
		let account = book.account(account_id).unwrap();
		ReportLine {
			id: format!("account_{}", account_id),
			name: account.display_name(),
			columns: vec![Cell::number(amount.to_string(), amount, "number")],
			level: 1,
			account_id: Some(account_id),
			caret_options: Some("account.account".to_string()),
			colspan: 1,
			..Default::default()
		}
	}

	fn total_line(amount: &str) -> ReportLine {
		let amount = dec(amount);
		ReportLine {
			id: "grouped_accounts_total".to_string(),
			name: "Total".to_string(),
			columns: vec![Cell::number(amount.to_string(), amount, "number")],
			level: 1,
			class: "total".to_string(),
			colspan: 1,
			..Default::default()
		}
	}

	fn ctx(book: &Book) -> RequestContext {
		RequestContext::new(book, None, None, Date::from_str("2017-12-31").unwrap()).unwrap()
	}

	fn ids(lines: &[ReportLine]) -> Vec<&str> {
		lines.iter().map(|l| l.id.as_str()).collect()
	}

	#[test]
	fn test_account_codes() {
		let book = sample_book();
		let grouped = account_codes(&book, book.account(1).unwrap());
		assert_eq!(
			grouped,
			vec![
				(MOST_SORT_PRIO, "6 Expenses".to_string()),
				(MOST_SORT_PRIO, "60 Purchases".to_string())
			]
		);

		let account = Account {
			id: 9,
			code: "601234".to_string(),
			name: "Loose".to_string(),
			group_id: None,
			include_initial_balance: false,
		};
		let codes: Vec<String> =
			account_codes(&book, &account).into_iter().map(|c| c.1).collect();
		assert_eq!(codes, vec!["6", "60", "601"]);
	}

	#[test]
	fn test_groups_and_no_group_bucket() {
		let book = sample_book();
		let ctx = ctx(&book);
		let lines = vec![
			account_line(&book, 4, "1155"),
			account_line(&book, 1, "250"),
			account_line(&book, 2, "75.5"),
			account_line(&book, 3, "-1480"),
			total_line("0.5"),
		];
		let result = build_hierarchy(lines, &Options::default(), &ctx);
		assert_eq!(
			ids(&result),
			vec![
				"hierarchy_6 Expenses",
				"hierarchy_60 Purchases",
				"account_1",
				"account_2",
				"hierarchy_7 Income",
				"account_3",
				"hierarchy_(No Group)",
				"account_4",
				"grouped_accounts_total",
			]
		);

		let by_id = |id: &str| result.iter().find(|l| l.id == id).unwrap();

		// the closing total line sets the top-level depth
		assert_eq!(by_id("hierarchy_6 Expenses").level, 1);
		assert_eq!(by_id("hierarchy_6 Expenses").parent_id, None);
		assert_eq!(by_id("hierarchy_60 Purchases").level, 3);
		assert_eq!(
			by_id("hierarchy_60 Purchases").parent_id.as_deref(),
			Some("hierarchy_6 Expenses")
		);
		assert_eq!(by_id("account_1").level, 4);
		assert_eq!(by_id("account_1").parent_id.as_deref(), Some("hierarchy_60 Purchases"));
		assert_eq!(by_id("account_4").level, 2);
		assert_eq!(
			by_id("hierarchy_(No Group)").style.as_deref(),
			Some("font-style:italic;")
		);
		assert!(by_id("hierarchy_7 Income").style.is_none());
	}

	#[test]
	fn test_header_totals_equal_leaf_sums() {
		let book = sample_book();
		let ctx = ctx(&book);
		let lines = vec![
			account_line(&book, 1, "250"),
			account_line(&book, 2, "75.5"),
			account_line(&book, 3, "-1480"),
		];
		let result = build_hierarchy(lines, &Options::default(), &ctx);
		let total = |id: &str| {
			result.iter().find(|l| l.id == id).unwrap().columns[0].no_format.as_decimal()
		};
		assert_eq!(total("hierarchy_6 Expenses"), dec("325.5"));
		assert_eq!(total("hierarchy_60 Purchases"), dec("325.5"));
		assert_eq!(total("hierarchy_7 Income"), dec("-1480"));
	}

	#[test]
	fn test_prefix_codes_without_any_group() {
		let book = sample_book();
		let ctx = ctx(&book);
		let result =
			build_hierarchy(vec![account_line(&book, 4, "10")], &Options::default(), &ctx);
		assert_eq!(
			ids(&result),
			vec!["hierarchy_5", "hierarchy_51", "hierarchy_512", "account_4"]
		);
		assert_eq!(result[0].level, 1);
		assert_eq!(result[3].level, 4);
	}

	#[test]
	fn test_text_columns_merge() {
		let rows = vec![
			vec![CellValue::Text(String::new()), CellValue::Text(String::new())],
			vec![CellValue::Text(String::new()), CellValue::Number(Decimal::from(3))],
		];
		assert_eq!(
			merge_columns(&rows),
			vec![CellValue::Text(String::new()), CellValue::Text("n/a".to_string())]
		);
	}

	#[test]
	fn test_unfolded_headers() {
		let book = sample_book();
		let ctx = ctx(&book);
		let lines = || vec![account_line(&book, 3, "1")];

		let options = Options {
			unfolded_lines: vec!["hierarchy_7 Income".to_string()],
			..Default::default()
		};
		assert!(build_hierarchy(lines(), &options, &ctx)[0].unfolded);
		assert!(!build_hierarchy(lines(), &Options::default(), &ctx)[0].unfolded);
		assert!(build_hierarchy(lines(), &Options::default(), &ctx.with_print_mode())[0].unfolded);
	}

	#[test]
	fn test_long_names_are_cut() {
		let long = "x".repeat(70);
		let mut hierarchy = Hierarchy::new();
		let book = sample_book();
		let ctx = ctx(&book);
		hierarchy.add(
			account_line(&book, 1, "1"),
			&[(MOST_SORT_PRIO, long.clone())],
			2,
			None,
		);
		let lines = hierarchy.emit(0, &Options::default(), &ctx).1;
		assert_eq!(lines[0].name, format!("{}...", "x".repeat(60)));
		assert_eq!(lines[0].title_hover.as_deref(), Some(long.as_str()));
	}
}
