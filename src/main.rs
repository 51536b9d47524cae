/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
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
use crate::gl::context::RequestContext;
use crate::options::assembler::override_filter;
use crate::options::filters::{FilterKey, FilterValue};
use crate::options::period::DateFilter;
use crate::options::{ComparisonKind, JournalOption, Options};
use crate::parsing::filesystem::Filesystem;
use crate::query::currency_table::build_currency_table;
use crate::query::domain::build_domain;
use crate::reports::export::ExportFormat;
use crate::reports::report::{Report, ReportKind};
use crate::util::date::Date;
use anyhow::{bail, Error};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;

mod config;
mod error;
mod gl;
mod options;
mod parsing;
mod query;
mod reports;
mod util;

#[derive(Parser)]
#[command(
	name = "finrep",
	version = "0.1",
	about = "Accounting reports with period comparison and account hierarchies"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	/// Line id for the footnote command, text for the summary command, id
	/// of the manager to fold in for the merge command
	#[arg(required = false)]
	term: Option<String>,

	// -----------
	// -- FLAGS --
	// -----------
	/// Specifies the book (JSON) to report on
	#[arg(short)]
	file: String,

	/// The report to produce
	#[arg(short, long, value_enum, default_value_t = ReportKind::TrialBalance)]
	report: ReportKind,

	/// Options returned by a previous run (JSON)
	#[arg(long)]
	options: Option<String>,

	/// Pretend today is this date (YYYY-MM-DD)
	#[arg(long)]
	today: Option<String>,

	/// Id of the user running the report
	#[arg(short, long)]
	user: Option<u32>,

	/// Id of the company the report is made from
	#[arg(long)]
	company: Option<u32>,

	/// Additional companies to switch on, comma separated
	#[arg(long, value_delimiter = ',')]
	companies: Vec<u32>,

	/// Custom config file location (default: ~/.config/finrep/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Custom report manager store location
	#[arg(long)]
	store: Option<String>,

	/// Write the result to this file instead of stdout
	#[arg(short, long)]
	output: Option<String>,

	// ----------------------
	// -- FILTER OVERRIDES --
	// ----------------------
	/// Date filter, e.g. this_month, last_quarter, custom
	#[arg(long, value_parser = parse_date_filter)]
	date_filter: Option<DateFilter>,

	/// Start of a custom period (YYYY-MM-DD)
	#[arg(long)]
	date_from: Option<String>,

	/// End of a custom period, or the date of a single-date report
	#[arg(long)]
	date_to: Option<String>,

	/// Comparison: no_comparison, previous_period, same_last_year, custom
	#[arg(long, value_parser = parse_comparison)]
	comparison: Option<ComparisonKind>,

	/// Start of a custom comparison period (YYYY-MM-DD)
	#[arg(long)]
	comparison_from: Option<String>,

	/// End of a custom comparison period (YYYY-MM-DD)
	#[arg(long)]
	comparison_to: Option<String>,

	/// Number of periods to compare with
	#[arg(long)]
	periods: Option<u32>,

	/// Journals to report on, comma separated ids
	#[arg(long, value_delimiter = ',')]
	journals: Vec<u32>,

	/// Include draft entries
	#[arg(long)]
	all_entries: Option<bool>,

	/// Regroup accounts by account group
	#[arg(long)]
	hierarchy: Option<bool>,

	/// Unfold every line
	#[arg(long)]
	unfold_all: Option<bool>,

	/// Line to unfold; may be repeated
	#[arg(long)]
	unfold: Vec<String>,

	/// Header column to sort by (1-based); negative sorts ascending
	#[arg(long, allow_hyphen_values = true)]
	sort: Option<i32>,

	/// Footnote text, for the footnote command
	#[arg(long)]
	text: Option<String>,

	/// Id of a footnote to remove, for the footnote command
	#[arg(long)]
	remove: Option<u32>,
}

impl Cli {
	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if self.command == Directive::Footnote && self.remove.is_none() {
			if self.term.is_none() {
				bail!("No line specified");
			}
			if self.text.is_none() {
				bail!("No footnote text specified");
			}
		}
		if self.command == Directive::Summary && self.term.is_none() {
			bail!("No summary specified");
		}
		if self.command == Directive::Merge {
			match self.term.as_deref().map(str::parse::<u32>) {
				Some(Ok(_)) => {},
				Some(Err(_)) => bail!("Report manager ids are numbers"),
				None => bail!("No report manager specified"),
			}
		}
		if let Some(n) = self.periods {
			if n == 0 {
				bail!("At least one period is needed to compare with");
			}
		}

		Ok(())
	}

	fn has_overrides(&self) -> bool {
		self.date_filter.is_some()
			|| self.date_from.is_some()
			|| self.date_to.is_some()
			|| self.comparison.is_some()
			|| self.comparison_from.is_some()
			|| self.comparison_to.is_some()
			|| self.periods.is_some()
			|| !self.journals.is_empty()
			|| self.all_entries.is_some()
			|| self.hierarchy.is_some()
			|| self.unfold_all.is_some()
			|| !self.unfold.is_empty()
			|| self.sort.is_some()
	}
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Directive {
	Options,       // the options, as JSON
	Domain,        // the move line filter the options make
	CurrencyTable, // rates into the current company's currency
	Lines,         // report lines, as JSON

	Html,  // screen rendering
	Print, // printable HTML
	Pdf,
	Xlsx,
	Txt,
	Csv,

	Footnote, // attach a note to a line, or remove one
	Summary,  // set the summary shown above the report
	Managers, // stored summaries and footnotes, as JSON
	Merge,    // fold another manager into this report's
}

fn parse_date_filter(s: &str) -> Result<DateFilter, String> {
	serde_json::from_value(serde_json::Value::String(s.replace('-', "_")))
		.map_err(|_| format!("unknown date filter: {}", s))
}

fn parse_comparison(s: &str) -> Result<ComparisonKind, String> {
	serde_json::from_value(serde_json::Value::String(s.replace('-', "_")))
		.map_err(|_| format!("unknown comparison: {}", s))
}

fn main() -> Result<(), Error> {
	env_logger::init();

	let args = Cli::parse();
	args.validate()?;

	let fs = Filesystem::new();
	let config = fs.get_config(args.config.as_ref())?;
	let book = fs.read_book(&args.file)?;

	let today = match &args.today {
		Some(t) => Date::from_str(t)?,
		None => Date::today(),
	};
	let mut ctx = RequestContext::new(
		&book,
		args.user.or(config.default_user()),
		args.company.or(config.default_company()),
		today,
	)?
	.allow_companies(&args.companies);
	ctx.formats = config.date_formats();

	let report = Report::new(args.report)?;
	let previous = match &args.options {
		Some(path) => Some(fs.read_options(path)?),
		None => None,
	};
	let mut options = report.get_options(&ctx, previous.as_ref())?;
	if args.has_overrides() {
		apply_overrides(&mut options, &args)?;
		options = report.get_options(&ctx, Some(&options))?;
	}
	let options = report.secured(&options, &ctx);

	let store_path = fs.store_path(args.store.as_ref(), &config)?;
	let output = args.output.as_deref();

	match args.command {
		Directive::Options => {
			let json = serde_json::to_string_pretty(&options)?;
			fs.write_output(output, format!("{}\n", json).as_bytes())?;
		},
		Directive::Domain => {
			let domain = build_domain(&options, &ctx);
			fs.write_output(output, format!("{}\n", domain).as_bytes())?;
		},
		Directive::CurrencyTable => {
			let table = build_currency_table(&options, &ctx);
			fs.write_output(output, format!("{}\n", table).as_bytes())?;
		},
		Directive::Lines => {
			let lines = report.get_lines(&options, &ctx)?;
			let json = serde_json::to_string_pretty(&lines)?;
			fs.write_output(output, format!("{}\n", json).as_bytes())?;
		},
		Directive::Html | Directive::Print => {
			let mut store = fs.read_store(&store_path)?;
			let manager = store
				.get_or_create(report.kind.manager_key(), &options.report_company_ids(&ctx))
				.clone();
			let html = if args.command == Directive::Print {
				report.get_print_html(&options, &ctx, Some(&manager))?
			} else {
				report.get_html(&options, &ctx, Some(&manager))?
			};
			fs.write_output(output, html.as_bytes())?;
			fs.write_store(&store_path, &store)?;
		},
		Directive::Pdf | Directive::Xlsx => {
			let format = if args.command == Directive::Pdf {
				ExportFormat::Pdf
			} else {
				ExportFormat::Xlsx
			};
			let mut store = fs.read_store(&store_path)?;
			let manager = store
				.get_or_create(report.kind.manager_key(), &options.report_company_ids(&ctx))
				.clone();
			let file = report.export(
				format,
				&options,
				&ctx,
				Some(&manager),
				&config.pdf_settings(),
			)?;

			// binary documents never go to stdout
			let path = output.map(PathBuf::from).unwrap_or_else(|| PathBuf::from(&file.filename));
			fs.write_output(Some(&path.display().to_string()), &file.content)?;
			println!("{} ({})", path.display(), file.mime_type);
			fs.write_store(&store_path, &store)?;
		},
		Directive::Txt => {
			let text = report.get_txt(&options, &ctx)?;
			fs.write_output(output, text.as_bytes())?;
		},
		Directive::Csv => {
			let csv = report.get_csv(&options, &ctx)?;
			fs.write_output(output, &csv)?;
		},
		Directive::Footnote => {
			let mut store = fs.read_store(&store_path)?;
			let manager_id = store
				.get_or_create(report.kind.manager_key(), &options.report_company_ids(&ctx))
				.id;
			match args.remove {
				Some(footnote_id) => {
					store.remove_footnote(manager_id, footnote_id)?;
					println!("Removed footnote {}", footnote_id);
				},
				None => {
					let line = args.term.as_deref().unwrap_or_default();
					let text = args.text.as_deref().unwrap_or_default();
					let id = store.add_footnote(manager_id, line, text)?;
					println!("Added footnote {} to {}", id, line);
				},
			}
			fs.write_store(&store_path, &store)?;
		},
		Directive::Summary => {
			let mut store = fs.read_store(&store_path)?;
			let manager_id = store
				.get_or_create(report.kind.manager_key(), &options.report_company_ids(&ctx))
				.id;
			store.set_summary(manager_id, args.term.as_deref().unwrap_or_default())?;
			fs.write_store(&store_path, &store)?;
			info!("summary of {} updated", report.name);
		},
		Directive::Managers => {
			let store = fs.read_store(&store_path)?;
			let json = serde_json::to_string_pretty(store.managers())?;
			fs.write_output(output, format!("{}\n", json).as_bytes())?;
		},
		Directive::Merge => {
			let source_id: u32 = args.term.as_deref().unwrap_or_default().parse()?;
			let mut store = fs.read_store(&store_path)?;
			let target_id = store
				.get_or_create(report.kind.manager_key(), &options.report_company_ids(&ctx))
				.id;
			store.merge(target_id, source_id)?;
			fs.write_store(&store_path, &store)?;
			println!("Merged report manager {} into {}", source_id, target_id);
		},
	}

	Ok(())
}

/// Applies the filter flags the way a user would change the filter bar;
/// the options are then rebuilt from the result.
fn apply_overrides(options: &mut Options, args: &Cli) -> Result<(), Error> {
	if let Some(date) = options.date.as_mut() {
		if let Some(filter) = args.date_filter {
			date.filter = Some(filter);
		}
		if args.date_from.is_some() || args.date_to.is_some() {
			date.filter = Some(DateFilter::Custom);
			if let Some(from) = &args.date_from {
				date.date_from = Some(Date::from_str(from)?);
			}
			if let Some(to) = &args.date_to {
				date.date_to = Some(Date::from_str(to)?);
			}
		}
	} else if args.date_filter.is_some() || args.date_from.is_some() || args.date_to.is_some() {
		bail!("{} has no date filter", args.report.name());
	}

	match options.comparison.as_mut() {
		Some(comparison) => {
			if let Some(kind) = args.comparison {
				comparison.filter = kind;
			}
			if let Some(n) = args.periods {
				comparison.number_period = n;
			}
			if args.comparison_from.is_some() || args.comparison_to.is_some() {
				comparison.filter = ComparisonKind::Custom;
				if let Some(from) = &args.comparison_from {
					comparison.date_from = Some(Date::from_str(from)?);
				}
				if let Some(to) = &args.comparison_to {
					comparison.date_to = Some(Date::from_str(to)?);
				}
			}
		},
		None if args.comparison.is_some()
			|| args.comparison_from.is_some()
			|| args.comparison_to.is_some()
			|| args.periods.is_some() =>
		{
			bail!("{} has no comparison filter", args.report.name());
		},
		None => {},
	}

	if !args.journals.is_empty() {
		for journal in options.journals.iter_mut().flatten() {
			if let JournalOption::Journal { id, selected, .. } = journal {
				*selected = args.journals.contains(id);
			}
		}
	}

	for (key, value) in [
		(FilterKey::AllEntries, args.all_entries),
		(FilterKey::Hierarchy, args.hierarchy),
		(FilterKey::UnfoldAll, args.unfold_all),
	] {
		if let Some(b) = value {
			override_filter(options, key, FilterValue::Bool(b))?;
		}
	}
	if let Some(column) = args.sort {
		override_filter(options, FilterKey::SelectedColumn, FilterValue::Int(column))?;
	}
	options.unfolded_lines.extend(args.unfold.iter().cloned());

	Ok(())
}
