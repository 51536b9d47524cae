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
use crate::gl::manager::Footnote;
use crate::reports::line::{ColumnHeader, ReportLine, SuperColumns};
use crate::reports::report::Button;
use std::collections::HashMap;

const MAIN_TEMPLATE: &str = include_str!("templates/main.html");
const LINE_TEMPLATE: &str = include_str!("templates/line.html");
const FOOTNOTES_TEMPLATE: &str = include_str!("templates/footnotes.html");

pub const FOOTNOTES_PLACEHOLDER: &str = r#"<div class="js_account_report_footnotes"></div>"#;

/// Substitutions that make the screen rendering fit for paper
const PRINT_REPLACEMENTS: [(&str, &str); 4] = [
	("o_account_reports_no_print", ""),
	("table-responsive", ""),
	("<a", "<span"),
	("</a>", "</span>"),
];

/// Everything the main template shows
pub struct HtmlReport<'a> {
	pub name: &'a str,
	pub summary: Option<&'a str>,
	pub company_name: &'a str,
	pub date_label: Option<&'a str>,
	pub headers: &'a [Vec<ColumnHeader>],
	pub super_columns: &'a SuperColumns,
	pub lines: &'a [ReportLine],
	/// Left out when printing
	pub buttons: &'a [Button],
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberedFootnote {
	pub id: u32,
	pub number: u32,
	pub text: String,
}

pub fn escape(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}

/// Replaces every `__KEY__` placeholder of a template
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
	let mut out = template.to_string();
	for (key, value) in values {
		out = out.replace(&format!("__{}__", key), value);
	}
	out
}

pub fn render_html(report: &HtmlReport) -> String {
	let header = render_header(report.headers, report.super_columns);
	let lines: String = report.lines.iter().map(render_line).collect();
	let buttons = render_buttons(report.buttons);

	fill(
		MAIN_TEMPLATE,
		&[
			("REPORT_NAME", &escape(report.name)),
			("COMPANY_NAME", &escape(report.company_name)),
			("DATE", &escape(report.date_label.unwrap_or_default())),
			("SUMMARY", &escape(report.summary.unwrap_or_default())),
			("BUTTONS", &buttons),
			("HEADER", &header),
			("LINES", &lines),
		],
	)
}

fn render_buttons(buttons: &[Button]) -> String {
	if buttons.is_empty() {
		return String::new();
	}
	let inner: String = buttons
		.iter()
		.map(|b| {
			format!(
				r#"<button type="button" class="btn btn-secondary" data-action="{}">{}</button>"#,
				b.action,
				escape(b.name)
			)
		})
		.collect();
	format!(
		r#"<div class="o_account_reports_buttons o_account_reports_no_print">{}</div>"#,
		inner
	)
}

fn render_header(headers: &[Vec<ColumnHeader>], super_columns: &SuperColumns) -> String {
	let mut out = String::new();

	if !super_columns.columns.is_empty() {
		out.push_str("\t\t\t\t<tr class=\"o_account_report_super_columns\">");
		if super_columns.x_offset > 0 {
			out.push_str(&format!(r#"<th colspan="{}"></th>"#, super_columns.x_offset));
		}
		for label in &super_columns.columns {
			out.push_str(&format!(
				r#"<th class="o_account_report_column_header text-center" colspan="{}">{}</th>"#,
				super_columns.merge.max(1),
				escape(label)
			));
		}
		out.push_str("</tr>\n");
	}

	for row in headers {
		out.push_str("\t\t\t\t<tr>");
		for column in row {
			let style = column
				.style
				.as_ref()
				.map(|s| format!(r#" style="{}""#, escape(s)))
				.unwrap_or_default();
			out.push_str(&format!(
				r#"<th class="o_account_report_column_header {}" colspan="{}"{}>{}</th>"#,
				escape(&column.class),
				column.colspan,
				style,
				escape(&column.name)
			));
		}
		out.push_str("</tr>\n");
	}
	out
}

fn render_line(line: &ReportLine) -> String {
	let mut class = line.class.clone();
	if line.unfoldable {
		class.push_str(if line.unfolded {
			" o_js_account_report_unfolded"
		} else {
			" o_js_account_report_folded"
		});
	}

	let name = match (&line.caret_options, line.account_id) {
		(Some(model), Some(id)) => format!(
			r#"<a class="o_account_reports_caret" data-model="{}" data-id="{}">{}</a>"#,
			escape(model),
			id,
			escape(&line.name)
		),
		_ => format!(
			r#"<span class="o_account_report_line_name">{}</span>"#,
			escape(&line.name)
		),
	};

	let footnote = line
		.footnote
		.as_ref()
		.map(|n| {
			format!(
				r##"<sup class="o_account_reports_footnote_sup"><a href="#footnote{0}">{0}</a></sup>"##,
				escape(n)
			)
		})
		.unwrap_or_default();

	let cells: String = line
		.columns
		.iter()
		.map(|cell| {
			let style = cell
				.style
				.as_ref()
				.map(|s| format!(r#" style="{}""#, escape(s)))
				.unwrap_or_default();
			format!(
				"\t\t\t\t\t<td class=\"o_account_report_line {}\"{}><span class=\"o_account_report_column_value\">{}</span></td>\n",
				escape(&cell.class),
				style,
				escape(&cell.name)
			)
		})
		.collect();

	let style = line
		.style
		.as_ref()
		.map(|s| format!(r#" style="{}""#, escape(s)))
		.unwrap_or_default();
	let title = line
		.title_hover
		.as_ref()
		.map(|t| format!(r#" title="{}""#, escape(t)))
		.unwrap_or_default();
	let level = line.level.to_string();
	let colspan = line.colspan.to_string();

	fill(
		LINE_TEMPLATE,
		&[
			("CLASS", &escape(class.trim())),
			("ID", &escape(&line.id)),
			("PARENT_ID", &escape(line.parent_id.as_deref().unwrap_or_default())),
			("STYLE", &style),
			("LEVEL", &level),
			("COLSPAN", &colspan),
			("TITLE", &title),
			("NAME", &name),
			("FOOTNOTE", &footnote),
			("CELLS", cells.trim_end_matches('\n')),
		],
	)
}

/// Numbers the footnotes in the order their lines appear and marks those
/// lines. A line carrying several footnotes shows the last one.
pub fn number_footnotes(
	lines: &mut [ReportLine],
	footnotes: &[Footnote],
) -> Vec<NumberedFootnote> {
	let by_line: HashMap<&str, &Footnote> =
		footnotes.iter().map(|f| (f.line.as_str(), f)).collect();

	let mut numbered = vec![];
	for line in lines.iter_mut() {
		if let Some(footnote) = by_line.get(line.id.as_str()) {
			let number = numbered.len() as u32 + 1;
			line.footnote = Some(number.to_string());
			numbered.push(NumberedFootnote {
				id: footnote.id,
				number,
				text: footnote.text.clone(),
			});
		}
	}
	numbered
}

pub fn render_footnotes(footnotes: &[NumberedFootnote]) -> String {
	let items: Vec<String> = footnotes
		.iter()
		.map(|f| {
			format!(
				r#"<p class="footnote" id="footnote{0}" data-id="{1}"><span class="text">{0}. {2}</span></p>"#,
				f.number,
				f.id,
				escape(&f.text)
			)
		})
		.collect();
	fill(FOOTNOTES_TEMPLATE, &[("FOOTNOTES", &items.join("\n"))])
}

/// Turns screen HTML into its printable form, footnotes included
pub fn apply_print_mode(html: &str, footnotes: &[NumberedFootnote]) -> String {
	let mut out = html.to_string();
	for (from, to) in PRINT_REPLACEMENTS {
		out = out.replace(from, to);
	}
	out.replace(FOOTNOTES_PLACEHOLDER, &render_footnotes(footnotes))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reports::line::Cell;
	use rust_decimal::Decimal;

	fn lines() -> Vec<ReportLine> {
		vec![
			ReportLine {
				id: "account_1".to_string(),
				name: "601000 Purchases & co".to_string(),
				columns: vec![Cell::number("$\u{a0}250.00".to_string(), Decimal::from(250), "number")],
				level: 1,
				account_id: Some(1),
				caret_options: Some("account.account".to_string()),
				colspan: 1,
				..Default::default()
			},
			ReportLine {
				id: "total".to_string(),
				name: "Total".to_string(),
				columns: vec![Cell::number("$\u{a0}250.00".to_string(), Decimal::from(250), "number")],
				level: 1,
				class: "total".to_string(),
				colspan: 1,
				..Default::default()
			},
		]
	}

	fn footnote(id: u32, line: &str, text: &str) -> Footnote {
		Footnote {
			id,
			text: text.to_string(),
			line: line.to_string(),
		}
	}

	#[test]
	fn test_fill_and_escape() {
		assert_eq!(fill("<b>__A__</b>__A__", &[("A", "x")]), "<b>x</b>x");
		assert_eq!(escape(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
	}

	#[test]
	fn test_render_html() {
		let lines = lines();
		let headers = vec![vec![
			ColumnHeader::new("", ""),
			ColumnHeader::new("Balance", "up number sortable"),
		]];
		let html = render_html(&HtmlReport {
			name: "Trial Balance",
			summary: Some("Year end"),
			company_name: "Acme US",
			date_label: Some("2017"),
			headers: &headers,
			super_columns: &SuperColumns::default(),
			lines: &lines,
			buttons: &[],
		});
		assert!(html.contains("<h2>Trial Balance</h2>"));
		assert!(html.contains("Year end"));
		assert!(html.contains(r#"class="o_account_report_column_header up number sortable""#));
		assert!(html.contains("601000 Purchases &amp; co</a>"));
		assert!(html.contains(r#"data-id="total""#));
		assert!(html.contains(FOOTNOTES_PLACEHOLDER));
		assert!(!html.contains("__"));
	}

	#[test]
	fn test_footnotes_numbered_by_line_order() {
		let mut lines = lines();
		let footnotes = vec![
			footnote(7, "total", "Checked"),
			footnote(8, "account_1", "First try"),
			footnote(9, "account_1", "Second try"),
			footnote(10, "gone", "Orphan"),
		];
		let numbered = number_footnotes(&mut lines, &footnotes);
		assert_eq!(
			numbered,
			vec![
				NumberedFootnote {
					id: 9,
					number: 1,
					text: "Second try".to_string()
				},
				NumberedFootnote {
					id: 7,
					number: 2,
					text: "Checked".to_string()
				},
			]
		);
		assert_eq!(lines[0].footnote.as_deref(), Some("1"));
		assert_eq!(lines[1].footnote.as_deref(), Some("2"));
	}

	#[test]
	fn test_print_mode() {
		let mut lines = lines();
		let numbered = number_footnotes(&mut lines, &[footnote(1, "total", "Audited")]);
		let html = render_html(&HtmlReport {
			name: "Trial Balance",
			summary: None,
			company_name: "Acme US",
			date_label: None,
			headers: &[],
			super_columns: &SuperColumns::default(),
			lines: &lines,
			buttons: &[],
		});
		let printed = apply_print_mode(&html, &numbered);
		assert!(!printed.contains("o_account_reports_no_print"));
		assert!(!printed.contains("table-responsive"));
		assert!(!printed.contains("<a "));
		assert!(!printed.contains("</a>"));
		assert!(printed.contains(r#"<span class="o_account_reports_caret""#));
		assert!(printed.contains(r#"<p class="footnote" id="footnote1" data-id="1"><span class="text">1. Audited</span></p>"#));
		assert!(!printed.contains(FOOTNOTES_PLACEHOLDER));
	}
}
