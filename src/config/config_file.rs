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
use crate::gl::context::DateFormats;
use crate::reports::pdf::{PdfEngine, PdfSettings};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	pub display: Option<Display>,
	pub pdf: Option<Pdf>,
	pub storage: Option<Storage>,
	pub defaults: Option<Defaults>,
}

/// strftime patterns for period labels
#[derive(Debug, Default, Deserialize)]
pub struct Display {
	pub long_date: Option<String>,
	pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pdf {
	/// wkhtmltopdf binary, looked up in PATH unless absolute
	pub command: Option<String>,
	pub minimal_layout: Option<bool>,
	pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Storage {
	/// Where summaries and footnotes are kept
	pub store: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Defaults {
	pub user: Option<u32>,
	pub company: Option<u32>,
}

impl Config {
	pub fn date_formats(&self) -> DateFormats {
		let mut formats = DateFormats::default();
		if let Some(display) = &self.display {
			if let Some(long) = &display.long_date {
				formats.long = long.clone();
			}
			if let Some(month) = &display.month {
				formats.month = month.clone();
			}
		}
		formats
	}

	pub fn pdf_settings(&self) -> PdfSettings {
		let mut settings = PdfSettings::default();
		if let Some(pdf) = &self.pdf {
			if let Some(command) = &pdf.command {
				settings.engine = PdfEngine::Wkhtmltopdf {
					command: command.clone(),
				};
			}
			settings.minimal_layout = pdf.minimal_layout.unwrap_or_default();
			if let Some(url) = &pdf.base_url {
				settings.base_url = url.clone();
			}
		}
		settings
	}

	pub fn store_path(&self) -> Option<&str> {
		self.storage.as_ref().and_then(|s| s.store.as_deref())
	}

	pub fn default_user(&self) -> Option<u32> {
		self.defaults.as_ref().and_then(|d| d.user)
	}

	pub fn default_company(&self) -> Option<u32> {
		self.defaults.as_ref().and_then(|d| d.company)
	}
}
