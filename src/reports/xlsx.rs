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
use crate::reports::line::{Cell, CellValue, ColumnHeader, ReportLine, SuperColumns};
use crate::util::date::Date;
use anyhow::Error;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{
	Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
	XlsxError,
};

const MAX_SHEET_NAME_LEN: usize = 31;
const FIRST_COLUMN_WIDTH: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XlsxStyle {
	Default,
	DefaultCol1,
	DateDefault,
	DateDefaultCol1,
	Title,
	SuperCol,
	Level0,
	Level1,
	Level2,
	Level2Col1,
	Level2Col1Total,
	Level3,
	Level3Col1,
	Level3Col1Total,
}

/// The few spreadsheet operations a report export needs
pub trait SheetWriter {
	fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), Error>;
	fn write_text(&mut self, row: u32, col: u16, text: &str, style: XlsxStyle) -> Result<(), Error>;
	fn write_number(&mut self, row: u32, col: u16, value: f64, style: XlsxStyle) -> Result<(), Error>;
	fn write_date(&mut self, row: u32, col: u16, date: Date, style: XlsxStyle) -> Result<(), Error>;
	fn merge_range(
		&mut self,
		row: u32,
		first_col: u16,
		last_col: u16,
		text: &str,
		style: XlsxStyle,
	) -> Result<(), Error>;
}

/// Label as shown in a spreadsheet cell, without HTML line breaks or
/// entities
fn plain(label: &str) -> String {
	label.replace("<br/>", " ").replace("&nbsp;", " ")
}

/// Row and first-column styles of a line
fn line_styles(line: &ReportLine) -> (XlsxStyle, XlsxStyle) {
	let total = line.has_class("total");
	if line.caret_options.is_some() {
		return (XlsxStyle::Level3, XlsxStyle::Level3Col1);
	}
	match line.level {
		0 => (XlsxStyle::Level0, XlsxStyle::Level0),
		1 => (XlsxStyle::Level1, XlsxStyle::Level1),
		2 if total => (XlsxStyle::Level2, XlsxStyle::Level2Col1Total),
		2 => (XlsxStyle::Level2, XlsxStyle::Level2Col1),
		3 if total => (XlsxStyle::Level3, XlsxStyle::Level3Col1Total),
		3 => (XlsxStyle::Level3, XlsxStyle::Level3Col1),
		_ => (XlsxStyle::Default, XlsxStyle::DefaultCol1),
	}
}

/// A date when the class marks the value as one and it parses
fn as_date(class: &str, name: &str) -> Option<Date> {
	if !class.contains("date") || name.is_empty() {
		return None;
	}
	Date::from_str(name).ok()
}

fn write_cell<W: SheetWriter>(
	sheet: &mut W,
	row: u32,
	col: u16,
	cell: &Cell,
	style: XlsxStyle,
) -> Result<(), Error> {
	if let Some(date) = as_date(&cell.class, &cell.name) {
		return sheet.write_date(row, col, date, XlsxStyle::DateDefault);
	}
	match &cell.no_format {
		CellValue::Number(n) if !cell.name.is_empty() => {
			sheet.write_number(row, col, n.to_f64().unwrap_or_default(), style)
		},
		_ => sheet.write_text(row, col, &cell.name, style),
	}
}

/// Lays a report out on a sheet: optional super-columns row, header rows,
/// then one row per line.
pub fn write_report<W: SheetWriter>(
	sheet: &mut W,
	headers: &[Vec<ColumnHeader>],
	super_columns: &SuperColumns,
	lines: &[ReportLine],
) -> Result<(), Error> {
	sheet.set_column_width(0, FIRST_COLUMN_WIDTH)?;

	let mut y_offset: u32 = if super_columns.columns.is_empty() { 0 } else { 1 };
	sheet.write_text(y_offset, 0, "", XlsxStyle::Title)?;

	let mut x = super_columns.x_offset as u16;
	for label in &super_columns.columns {
		let label = plain(label);
		let merge = super_columns.merge as u16;
		if merge > 1 {
			sheet.merge_range(0, x, x + merge - 1, &label, XlsxStyle::SuperCol)?;
			x += merge;
		} else {
			sheet.write_text(0, x, &label, XlsxStyle::SuperCol)?;
			x += 1;
		}
	}

	for row in headers {
		let mut x: u16 = 0;
		for column in row {
			let label = plain(&column.name);
			let colspan = column.colspan.max(1) as u16;
			if colspan == 1 {
				sheet.write_text(y_offset, x, &label, XlsxStyle::Title)?;
			} else {
				sheet.merge_range(y_offset, x, x + colspan - 1, &label, XlsxStyle::Title)?;
			}
			x += colspan;
		}
		y_offset += 1;
	}

	for (y, line) in lines.iter().enumerate() {
		if line.level == 0 && line.caret_options.is_none() {
			y_offset += 1;
		}
		let (style, col1_style) = line_styles(line);
		let row = y as u32 + y_offset;

		match as_date(&line.class, &line.name) {
			Some(date) => sheet.write_date(row, 0, date, XlsxStyle::DateDefaultCol1)?,
			None => sheet.write_text(row, 0, &line.name, col1_style)?,
		}

		let offset = line.colspan.max(1) as u16 - 1;
		for (x, cell) in line.columns.iter().enumerate() {
			write_cell(sheet, row, x as u16 + 1 + offset, cell, style)?;
		}
	}

	Ok(())
}

fn style_format(style: XlsxStyle) -> Format {
	let base = Format::new().set_font_name("Arial");
	let grey = |f: Format| f.set_font_color(Color::RGB(0x666666));
	match style {
		XlsxStyle::Default => grey(base.set_font_size(12)),
		XlsxStyle::DefaultCol1 => grey(base.set_font_size(12)).set_indent(2),
		XlsxStyle::DateDefault => grey(base.set_font_size(12)).set_num_format("yyyy-mm-dd"),
		XlsxStyle::DateDefaultCol1 => grey(base.set_font_size(12))
			.set_indent(2)
			.set_num_format("yyyy-mm-dd"),
		XlsxStyle::Title => base.set_bold().set_border_bottom(FormatBorder::Medium),
		XlsxStyle::SuperCol => base.set_bold().set_align(FormatAlign::Center),
		XlsxStyle::Level0 => grey(base.set_bold().set_font_size(13))
			.set_border_bottom(FormatBorder::Double),
		XlsxStyle::Level1 => grey(base.set_bold().set_font_size(13))
			.set_border_bottom(FormatBorder::Thin),
		XlsxStyle::Level2 | XlsxStyle::Level2Col1Total => {
			grey(base.set_bold().set_font_size(12))
		},
		XlsxStyle::Level2Col1 => grey(base.set_bold().set_font_size(12)).set_indent(1),
		XlsxStyle::Level3 => grey(base.set_font_size(12)),
		XlsxStyle::Level3Col1 => grey(base.set_font_size(12)).set_indent(2),
		XlsxStyle::Level3Col1Total => grey(base.set_bold().set_font_size(12)).set_indent(1),
	}
}

fn rendering(e: XlsxError) -> Error {
	ReportError::Rendering(format!("spreadsheet: {}", e)).into()
}

/// A single-sheet workbook written with rust_xlsxwriter
pub struct XlsxSheet {
	worksheet: Worksheet,
}

impl XlsxSheet {
	pub fn new(report_name: &str) -> Result<Self, Error> {
		let name: String = report_name.chars().take(MAX_SHEET_NAME_LEN).collect();
		let mut worksheet = Worksheet::new();
		worksheet.set_name(&name).map_err(rendering)?;
		Ok(Self { worksheet })
	}

	pub fn finish(self) -> Result<Vec<u8>, Error> {
		let mut workbook = Workbook::new();
		workbook.push_worksheet(self.worksheet);
		workbook.save_to_buffer().map_err(rendering)
	}
}

impl SheetWriter for XlsxSheet {
	fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), Error> {
		self.worksheet.set_column_width(col, width).map_err(rendering)?;
		Ok(())
	}

	fn write_text(&mut self, row: u32, col: u16, text: &str, style: XlsxStyle) -> Result<(), Error> {
		self.worksheet
			.write_string_with_format(row, col, text, &style_format(style))
			.map_err(rendering)?;
		Ok(())
	}

	fn write_number(&mut self, row: u32, col: u16, value: f64, style: XlsxStyle) -> Result<(), Error> {
		self.worksheet
			.write_number_with_format(row, col, value, &style_format(style))
			.map_err(rendering)?;
		Ok(())
	}

	fn write_date(&mut self, row: u32, col: u16, date: Date, style: XlsxStyle) -> Result<(), Error> {
		let datetime = ExcelDateTime::from_ymd(date.year() as u16, date.month(), date.day())
			.map_err(rendering)?;
		self.worksheet
			.write_datetime_with_format(row, col, &datetime, &style_format(style))
			.map_err(rendering)?;
		Ok(())
	}

	fn merge_range(
		&mut self,
		row: u32,
		first_col: u16,
		last_col: u16,
		text: &str,
		style: XlsxStyle,
	) -> Result<(), Error> {
		self.worksheet
			.merge_range(row, first_col, row, last_col, text, &style_format(style))
			.map_err(rendering)?;
		Ok(())
	}
}
