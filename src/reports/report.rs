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
use crate::error::ReportError;
use crate::gl::context::RequestContext;
use crate::gl::manager::ReportManager;
use crate::options::assembler::{build_options, check_report_security, validate_filters};
use crate::options::filters::{
	ComparisonDecl, DateDecl, FilterDecl, FilterDefault, FilterKey, FilterValue,
};
use crate::options::period::{DateFilter, DateMode};
use crate::options::Options;
use crate::reports::export::{export_filename, write_csv, ExportFile, ExportFormat};
use crate::reports::generator::{account_lines, unfold_move_lines, ColumnSet};
use crate::reports::hierarchy::build_hierarchy;
use crate::reports::html::{apply_print_mode, number_footnotes, render_html, HtmlReport};
use crate::reports::line::{ColumnHeader, ReportLine, SuperColumns};
use crate::reports::pdf::{build_job, is_landscape, PageContext, PdfSettings};
use crate::reports::sorter::{mark_sorted_header, sort_lines};
use crate::reports::table::render_text;
use crate::reports::xlsx::{write_report, XlsxSheet};
use anyhow::Error;
use clap::ValueEnum;
use log::{debug, info};

/// An action offered above the report on screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
	pub name: &'static str,
	pub sequence: u32,
	pub action: &'static str,
	pub file_export_type: Option<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
	/// Debit, credit and balance per account over a range of dates
	TrialBalance,
	/// Balance per account at a single date
	BalanceAsOf,
}

impl ReportKind {
	pub fn name(&self) -> &'static str {
		match self {
			ReportKind::TrialBalance => "Trial Balance",
			ReportKind::BalanceAsOf => "Account Balances",
		}
	}

	/// Key the summary and footnotes of the report are stored under
	pub fn manager_key(&self) -> &'static str {
		match self {
			ReportKind::TrialBalance => "trial_balance",
			ReportKind::BalanceAsOf => "balance_as_of",
		}
	}

	fn column_set(&self) -> ColumnSet {
		match self {
			ReportKind::TrialBalance => ColumnSet::DebitCreditBalance,
			ReportKind::BalanceAsOf => ColumnSet::Balance,
		}
	}

	fn filters(&self) -> Vec<FilterDecl> {
		let unfold_all = FilterDecl::new(
			FilterKey::UnfoldAll,
			FilterDefault::Dynamic(unfold_when_printing),
		);
		match self {
			ReportKind::TrialBalance => vec![
				FilterDecl::new(
					FilterKey::Date,
					FilterDefault::Date(DateDecl {
						mode: DateMode::Range,
						filter: Some(DateFilter::ThisYear),
						..Default::default()
					}),
				),
				FilterDecl::new(
					FilterKey::Comparison,
					FilterDefault::Comparison(ComparisonDecl::default()),
				),
				FilterDecl::new(FilterKey::Journals, FilterDefault::Bool(true)),
				FilterDecl::new(FilterKey::Analytic, FilterDefault::Bool(true)),
				FilterDecl::new(FilterKey::Partner, FilterDefault::Bool(true)),
				FilterDecl::new(FilterKey::AllEntries, FilterDefault::Bool(false)),
				FilterDecl::new(FilterKey::Hierarchy, FilterDefault::Bool(false)),
				unfold_all,
				FilterDecl::new(FilterKey::SelectedColumn, FilterDefault::Int(0)),
			],
			ReportKind::BalanceAsOf => vec![
				FilterDecl::new(
					FilterKey::Date,
					FilterDefault::Date(DateDecl {
						mode: DateMode::Single,
						filter: Some(DateFilter::Today),
						..Default::default()
					}),
				),
				FilterDecl::new(
					FilterKey::Comparison,
					FilterDefault::Comparison(ComparisonDecl::default()),
				),
				FilterDecl::new(FilterKey::Journals, FilterDefault::Bool(true)),
				// balances are per account, whatever the analytic or partner
				FilterDecl::new(FilterKey::Analytic, FilterDefault::Unset),
				FilterDecl::new(FilterKey::Partner, FilterDefault::Unset),
				FilterDecl::new(FilterKey::AllEntries, FilterDefault::Bool(false)),
				FilterDecl::new(FilterKey::Hierarchy, FilterDefault::Bool(true)),
				unfold_all,
				FilterDecl::new(FilterKey::SelectedColumn, FilterDefault::Int(0)),
			],
		}
	}
}

fn unfold_when_printing(ctx: &RequestContext) -> FilterValue {
	FilterValue::Bool(ctx.print_mode)
}

/// A report definition: its filters, checked once, and everything needed
/// to turn options into lines and lines into documents.
pub struct Report {
	pub kind: ReportKind,
	pub name: String,
	filters: Vec<FilterDecl>,
}

impl Report {
	pub fn new(kind: ReportKind) -> Result<Self, Error> {
		let filters = kind.filters();
		validate_filters(&filters)?;
		Ok(Self {
			kind,
			name: kind.name().to_string(),
			filters,
		})
	}

	pub fn buttons(&self) -> Vec<Button> {
		let mut buttons = vec![
			Button {
				name: "Save",
				sequence: 10,
				action: "open_report_export_wizard",
				file_export_type: None,
			},
			Button {
				name: "Print Preview",
				sequence: 1,
				action: "print_pdf",
				file_export_type: Some("PDF"),
			},
			Button {
				name: "Export (XLSX)",
				sequence: 2,
				action: "print_xlsx",
				file_export_type: Some("XLSX"),
			},
		];
		buttons.sort_by_key(|b| b.sequence);
		buttons
	}

	pub fn get_options(
		&self,
		ctx: &RequestContext,
		previous: Option<&Options>,
	) -> Result<Options, Error> {
		build_options(&self.filters, ctx, previous)
	}

	/// The column header rows; only the last one is sortable
	pub fn get_header(&self, options: &Options) -> Vec<Vec<ColumnHeader>> {
		let mut row = vec![ColumnHeader::new("", "")];
		for period in options.periods_list() {
			match self.kind.column_set() {
				ColumnSet::DebitCreditBalance => {
					row.push(ColumnHeader::new("Debit", "number"));
					row.push(ColumnHeader::new("Credit", "number"));
					row.push(ColumnHeader::new("Balance", "number sortable"));
				},
				ColumnSet::Balance => {
					let label = period.date.map(|d| d.string).unwrap_or_default();
					row.push(ColumnHeader::new(&label, "number sortable"));
				},
			}
		}
		mark_sorted_header(&mut row, options);
		vec![row]
	}

	/// Period labels spanning the columns of each period
	pub fn get_super_columns(&self, options: &Options) -> SuperColumns {
		match self.kind.column_set() {
			ColumnSet::Balance => SuperColumns::default(),
			column_set => SuperColumns {
				columns: options
					.periods_list()
					.into_iter()
					.map(|o| o.date.map(|d| d.string).unwrap_or_default())
					.collect(),
				merge: column_set.width(),
				x_offset: 1,
			},
		}
	}

	pub fn get_lines(&self, options: &Options, ctx: &RequestContext) -> Result<Vec<ReportLine>, Error> {
		let options = &self.secured(options, ctx);
		let column_set = self.kind.column_set();
		let mut lines = account_lines(options, ctx, column_set)?;
		if options.hierarchy == Some(true) {
			lines = build_hierarchy(lines, options, ctx);
		}
		lines = unfold_move_lines(lines, options, ctx, column_set)?;

		if options.selected_column.unwrap_or(0) != 0 {
			let headers = self.get_header(options);
			if let Some(last) = headers.last() {
				lines = sort_lines(lines, options, last);
			}
		}
		debug!("{}: {} lines", self.name, lines.len());
		Ok(lines)
	}

	/// Options handed back by a caller are filtered down to what the user
	/// may see before anything is rendered from them.
	pub fn secured(&self, options: &Options, ctx: &RequestContext) -> Options {
		let mut options = options.clone();
		check_report_security(&mut options, ctx);
		options
	}

	/// The report as a web page. In print mode, footnotes are numbered and
	/// listed at the bottom and interactive markup is removed.
	pub fn get_html(
		&self,
		options: &Options,
		ctx: &RequestContext,
		manager: Option<&ReportManager>,
	) -> Result<String, Error> {
		let options = self.secured(options, ctx);
		let mut lines = self.get_lines(&options, ctx)?;
		let headers = self.get_header(&options);
		let super_columns = self.get_super_columns(&options);

		let footnotes = match manager {
			Some(m) if ctx.print_mode => number_footnotes(&mut lines, &m.footnotes),
			_ => vec![],
		};
		let buttons = if ctx.print_mode { vec![] } else { self.buttons() };
		let date_label = options.date.as_ref().map(|d| d.string.as_str());

		let html = render_html(&HtmlReport {
			name: &self.name,
			summary: manager.and_then(|m| m.summary.as_deref()),
			company_name: &ctx.company.name,
			date_label,
			headers: &headers,
			super_columns: &super_columns,
			lines: &lines,
			buttons: &buttons,
		});

		if ctx.print_mode {
			return Ok(apply_print_mode(&html, &footnotes));
		}
		Ok(html)
	}

	pub fn get_print_html(
		&self,
		options: &Options,
		ctx: &RequestContext,
		manager: Option<&ReportManager>,
	) -> Result<String, Error> {
		self.get_html(options, &ctx.with_print_mode(), manager)
	}

	pub fn get_pdf(
		&self,
		options: &Options,
		ctx: &RequestContext,
		manager: Option<&ReportManager>,
		settings: &PdfSettings,
	) -> Result<Vec<u8>, Error> {
		let body = self.get_print_html(options, ctx, manager)?;
		let headers = self.get_header(&self.secured(options, ctx));
		let landscape = is_landscape(headers.last().map_or(0, |row| row.len()));

		let page = PageContext {
			company_name: &ctx.company.name,
			user_name: &ctx.user.name,
			today: ctx.today.format(&ctx.formats.long),
			base_url: &settings.base_url,
		};
		let job = build_job(&body, &self.name, &page, settings.minimal_layout, landscape);
		info!("printing {} ({})", self.name, if landscape { "landscape" } else { "portrait" });
		settings.engine.render(&job)
	}

	pub fn get_xlsx(&self, options: &Options, ctx: &RequestContext) -> Result<Vec<u8>, Error> {
		let ctx = ctx.with_no_format().with_print_mode();
		let options = self.secured(options, &ctx);
		let lines = self.get_lines(&options, &ctx)?;

		let mut sheet = XlsxSheet::new(&self.name)?;
		write_report(
			&mut sheet,
			&self.get_header(&options),
			&self.get_super_columns(&options),
			&lines,
		)?;
		sheet.finish()
	}

	pub fn get_txt(&self, options: &Options, ctx: &RequestContext) -> Result<String, Error> {
		let ctx = ctx.with_print_mode();
		let options = self.secured(options, &ctx);
		let lines = self.get_lines(&options, &ctx)?;
		Ok(render_text(
			&self.name,
			&self.get_header(&options),
			&self.get_super_columns(&options),
			&lines,
		))
	}

	pub fn get_csv(&self, options: &Options, ctx: &RequestContext) -> Result<Vec<u8>, Error> {
		let ctx = ctx.with_no_format().with_print_mode();
		let options = self.secured(options, &ctx);
		let lines = self.get_lines(&options, &ctx)?;
		write_csv(&self.get_header(&options), &lines)
	}

	/// Renders the report in a downloadable format
	pub fn export(
		&self,
		format: ExportFormat,
		options: &Options,
		ctx: &RequestContext,
		manager: Option<&ReportManager>,
		pdf: &PdfSettings,
	) -> Result<ExportFile, Error> {
		let content = match format {
			ExportFormat::Xlsx => self.get_xlsx(options, ctx)?,
			ExportFormat::Pdf => self.get_pdf(options, ctx, manager, pdf)?,
			ExportFormat::Txt => self.get_txt(options, ctx)?.into_bytes(),
			ExportFormat::Csv => self.get_csv(options, ctx)?,
			ExportFormat::Xml | ExportFormat::Xaf | ExportFormat::Zip => {
				return Err(ReportError::Rendering(format!(
					"{} does not provide a {} export",
					self.name,
					format.extension()
				))
				.into())
			},
		};
		Ok(ExportFile {
			filename: export_filename(&self.name, format),
			mime_type: format.mime_type(),
			content,
		})
	}
}
