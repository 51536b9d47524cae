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
use crate::reports::html::{escape, fill};
use anyhow::{bail, Error};
use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const PRINT_TEMPLATE: &str = include_str!("templates/print.html");
const EXTERNAL_LAYOUT: &str = include_str!("templates/external_layout.html");
const INTERNAL_LAYOUT: &str = include_str!("templates/internal_layout.html");
const MINIMAL_LAYOUT: &str = include_str!("templates/minimal_layout.html");

const BODY_TAG: &str = r#"<body class="o_account_reports_body_print">"#;

/// Header rows with more cells than this are printed in landscape
const PORTRAIT_MAX_COLUMNS: usize = 5;

/// Program turning HTML into PDF
#[derive(Clone, Debug, PartialEq)]
pub enum PdfEngine {
	Wkhtmltopdf { command: String },
}

impl Default for PdfEngine {
	fn default() -> Self {
		PdfEngine::Wkhtmltopdf {
			command: "wkhtmltopdf".to_string(),
		}
	}
}

/// How reports are printed
#[derive(Clone, Debug, PartialEq)]
pub struct PdfSettings {
	pub engine: PdfEngine,
	/// Page numbers only, no company header
	pub minimal_layout: bool,
	pub base_url: String,
}

impl Default for PdfSettings {
	fn default() -> Self {
		Self {
			engine: PdfEngine::default(),
			minimal_layout: false,
			base_url: "http://localhost".to_string(),
		}
	}
}

/// Who and what a page header or footer shows
pub struct PageContext<'a> {
	pub company_name: &'a str,
	pub user_name: &'a str,
	pub today: String,
	pub base_url: &'a str,
}

/// A document ready for conversion
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PdfJob {
	pub body: String,
	pub header: String,
	pub footer: String,
	pub landscape: bool,
	pub margin_top: Option<u32>,
	pub header_spacing: Option<u32>,
}

pub fn is_landscape(last_header_row_len: usize) -> bool {
	last_header_row_len > PORTRAIT_MAX_COLUMNS
}

/// The printable page around the report body
pub fn print_document(body_html: &str, title: &str, base_url: &str) -> String {
	let page = fill(
		PRINT_TEMPLATE,
		&[("BASE_URL", &escape(base_url)), ("TITLE", &escape(title))],
	);
	page.replacen(BODY_TAG, &format!("{}{}", BODY_TAG, body_html), 1)
}

/// Wraps a header or footer fragment into a standalone page that fills in
/// page numbers
pub fn minimal_layout(body: &str) -> String {
	fill(MINIMAL_LAYOUT, &[("BODY", body)])
}

/// Builds the job for a print-mode report body. The minimal layout only
/// has a footer with page numbers; the external layout is split into its
/// header and footer parts.
pub fn build_job(
	body_html: &str,
	title: &str,
	page: &PageContext,
	minimal: bool,
	landscape: bool,
) -> PdfJob {
	let body = print_document(body_html, title, page.base_url);

	if minimal {
		let footer = fill(
			INTERNAL_LAYOUT,
			&[
				("TODAY", &escape(&page.today)),
				("COMPANY_NAME", &escape(page.company_name)),
			],
		);
		return PdfJob {
			body,
			header: String::new(),
			footer: minimal_layout(&footer),
			landscape,
			margin_top: Some(10),
			header_spacing: Some(10),
		};
	}

	let layout = fill(
		EXTERNAL_LAYOUT,
		&[
			("COMPANY_NAME", &escape(page.company_name)),
			("USER_NAME", &escape(page.user_name)),
		],
	);
	let (header, footer) = split_layout(&layout);
	PdfJob {
		body,
		header,
		footer,
		landscape,
		margin_top: None,
		header_spacing: None,
	}
}

/// Header and footer of a layout, taken from its `header` and `footer`
/// class divs. A layout without a header div is used whole as the header;
/// one that cannot be parsed is used whole with no footer.
pub fn split_layout(layout: &str) -> (String, String) {
	let parsed = class_divs(layout, "header")
		.and_then(|headers| Ok((headers, class_divs(layout, "footer")?)));

	match parsed {
		Ok((headers, footers)) => {
			let header = headers
				.last()
				.map(|h| minimal_layout(h))
				.unwrap_or_else(|| layout.to_string());
			let footer = footers.last().map(|f| minimal_layout(f)).unwrap_or_default();
			(header, footer)
		},
		Err(e) => {
			debug!("layout not split: {}", e);
			(layout.to_string(), String::new())
		},
	}
}

/// Every div carrying the given class, markup included
fn class_divs(html: &str, class: &str) -> Result<Vec<String>, Error> {
	let open = Regex::new(r#"<div\b[^>]*\bclass\s*=\s*"([^"]*)"[^>]*>"#)?;
	let tag = Regex::new(r"<div\b|</div\s*>")?;

	let mut found = vec![];
	for caps in open.captures_iter(html) {
		let (whole, classes) = match (caps.get(0), caps.get(1)) {
			(Some(w), Some(c)) => (w, c),
			_ => continue,
		};
		if !classes.as_str().split_whitespace().any(|c| c == class) {
			continue;
		}

		let start = whole.start();
		let mut depth = 0;
		let mut end = None;
		for t in tag.find_iter(&html[start..]) {
			if t.as_str().starts_with("</") {
				depth -= 1;
				if depth == 0 {
					end = Some(start + t.end());
					break;
				}
			} else {
				depth += 1;
			}
		}

		match end {
			Some(end) => found.push(html[start..end].to_string()),
			None => bail!("unclosed <div class=\"{}\">", classes.as_str()),
		}
	}
	Ok(found)
}

fn rendering(message: String) -> Error {
	ReportError::Rendering(message).into()
}

impl PdfEngine {
	pub fn render(&self, job: &PdfJob) -> Result<Vec<u8>, Error> {
		match self {
			PdfEngine::Wkhtmltopdf { command } => run_wkhtmltopdf(command, job),
		}
	}
}

/// Writes the pages of a job into `dir` and returns the engine arguments,
/// along with where the PDF will be written.
fn job_args(job: &PdfJob, dir: &Path) -> Result<(Vec<String>, PathBuf), Error> {
	let mut args: Vec<String> = vec![
		"--quiet".into(),
		"--encoding".into(),
		"utf-8".into(),
		"--page-size".into(),
		"A4".into(),
		"--orientation".into(),
		(if job.landscape { "Landscape" } else { "Portrait" }).into(),
	];
	if let Some(margin) = job.margin_top {
		args.extend(["--margin-top".into(), margin.to_string()]);
	}
	if let Some(spacing) = job.header_spacing {
		args.extend(["--header-spacing".into(), spacing.to_string()]);
	}

	let write = |name: &str, content: &str| -> Result<PathBuf, Error> {
		let path = dir.join(name);
		fs::write(&path, content)
			.map_err(|e| rendering(format!("could not write {}: {}", path.display(), e)))?;
		Ok(path)
	};

	for (flag, name, content) in [
		("--header-html", "header.html", &job.header),
		("--footer-html", "footer.html", &job.footer),
	] {
		if content.is_empty() {
			continue;
		}
		let path = write(name, content.as_str())?;
		args.push(flag.into());
		args.push(path.display().to_string());
	}

	let body = write("body.html", job.body.as_str())?;
	let output = dir.join("report.pdf");
	args.push(body.display().to_string());
	args.push(output.display().to_string());

	Ok((args, output))
}

fn run_wkhtmltopdf(command: &str, job: &PdfJob) -> Result<Vec<u8>, Error> {
	// removed with everything in it once the PDF is read
	let dir = tempfile::Builder::new()
		.prefix("finrep-")
		.tempdir()
		.map_err(|e| rendering(format!("could not create a work directory: {}", e)))?;
	let (args, output) = job_args(job, dir.path())?;

	debug!("running {} {}", command, args.join(" "));
	let result = Command::new(command)
		.args(&args)
		.output()
		.map_err(|e| rendering(format!("could not run {}: {}", command, e)))?;

	if !result.status.success() {
		return Err(rendering(format!(
			"{} failed ({}): {}",
			command,
			result.status,
			String::from_utf8_lossy(&result.stderr).trim()
		)));
	}

	fs::read(&output)
		.map_err(|e| rendering(format!("no PDF produced by {}: {}", command, e)))
}
