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
use crate::reports::line::{ColumnHeader, ReportLine};
use anyhow::Error;
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
	Xlsx,
	Pdf,
	Xml,
	Xaf,
	Txt,
	Csv,
	Zip,
}

impl ExportFormat {
	pub fn extension(&self) -> &'static str {
		match self {
			ExportFormat::Xlsx => "xlsx",
			ExportFormat::Pdf => "pdf",
			ExportFormat::Xml => "xml",
			ExportFormat::Xaf => "xaf",
			ExportFormat::Txt => "txt",
			ExportFormat::Csv => "csv",
			ExportFormat::Zip => "zip",
		}
	}

	pub fn mime_type(&self) -> &'static str {
		match self {
			ExportFormat::Xlsx => "application/vnd.ms-excel",
			ExportFormat::Pdf => "application/pdf",
			ExportFormat::Xml | ExportFormat::Xaf => "application/vnd.sun.xml.writer",
			ExportFormat::Txt => "text/plain",
			ExportFormat::Csv => "text/csv",
			ExportFormat::Zip => "application/zip",
		}
	}
}

/// A rendered report, ready to be written out
#[derive(Debug)]
pub struct ExportFile {
	pub filename: String,
	pub mime_type: &'static str,
	pub content: Vec<u8>,
}

pub fn export_filename(report_name: &str, format: ExportFormat) -> String {
	format!(
		"{}.{}",
		report_name.to_lowercase().replace(' ', "_"),
		format.extension()
	)
}

/// One record per header row and per line. Names spanning several columns
/// are followed by blank fields so amounts stay under their header.
pub fn write_csv(headers: &[Vec<ColumnHeader>], lines: &[ReportLine]) -> Result<Vec<u8>, Error> {
	let mut writer = csv::WriterBuilder::new()
		.flexible(true)
		.from_writer(vec![]);

	for row in headers {
		let mut record = vec![];
		for column in row {
			record.push(column.name.clone());
			record.extend(vec![String::new(); column.colspan.saturating_sub(1)]);
		}
		writer.write_record(&record)?;
	}

	for line in lines {
		let mut record = vec![line.name.clone()];
		record.extend(vec![String::new(); line.colspan.saturating_sub(1)]);
		record.extend(line.columns.iter().map(|c| c.name.clone()));
		writer.write_record(&record)?;
	}

	Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reports::line::Cell;
	use rust_decimal::Decimal;

	#[test]
	fn test_filename_and_mime() {
		assert_eq!(
			export_filename("Trial Balance", ExportFormat::Xlsx),
			"trial_balance.xlsx"
		);
		assert_eq!(ExportFormat::Xlsx.mime_type(), "application/vnd.ms-excel");
		assert_eq!(ExportFormat::Xaf.mime_type(), "application/vnd.sun.xml.writer");
		assert_eq!(ExportFormat::Zip.mime_type(), "application/zip");
	}

	#[test]
	fn test_csv_keeps_amounts_under_headers() {
		let headers = vec![vec![
			ColumnHeader {
				colspan: 2,
				..ColumnHeader::new("", "")
			},
			ColumnHeader::new("Balance", "number"),
		]];
		let lines = vec![ReportLine {
			id: "account_3".to_string(),
			name: "400000 Sales, domestic".to_string(),
			columns: vec![Cell::number("-1000".to_string(), Decimal::from(-1000), "number")],
			colspan: 2,
			..Default::default()
		}];
		let csv = String::from_utf8(write_csv(&headers, &lines).unwrap()).unwrap();
		assert_eq!(csv, ",,Balance\n\"400000 Sales, domestic\",,-1000\n");
	}
}
