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

use anyhow::{bail, Error};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct Date {
	year: u32,
	month: u8,
	day: u8,
}

impl Date {
	/// Constructor to parse a string in the "YYYY-mm-dd" format
	pub fn from_str(date_str: &str) -> Result<Date, Error> {
		let parts: Vec<&str> = date_str.trim().split('-').collect();
		if parts.len() != 3 {
			bail!("Date format must be YYYY-MM-DD: {}", date_str);
		}

		let year = parts[0].parse::<u32>()?;
		let month = parts[1].parse::<u8>()?;
		let day = parts[2].parse::<u8>()?;

		Date::new(year, month, day)
	}

	pub fn new(year: u32, month: u8, day: u8) -> Result<Date, Error> {
		if !Date::is_valid_date(year, month, day) {
			bail!("Invalid date: {:04}-{:02}-{:02}", year, month, day);
		}

		Ok(Date { year, month, day })
	}

	/// The current date on the local clock
	pub fn today() -> Date {
		Date::from_naive(Local::now().date_naive())
	}

	pub fn from_naive(date: NaiveDate) -> Date {
		Date {
			year: date.year().max(1) as u32,
			month: date.month() as u8,
			day: date.day() as u8,
		}
	}

	pub fn to_naive(self) -> NaiveDate {
		NaiveDate::from_ymd_opt(
			self.year as i32,
			self.month as u32,
			self.day as u32,
		)
		.unwrap_or_default()
	}

	pub fn year(&self) -> u32 {
		self.year
	}

	pub fn month(&self) -> u8 {
		self.month
	}

	pub fn day(&self) -> u8 {
		self.day
	}

	/// Renders the date with a strftime pattern, e.g. "%b %-d, %Y"
	/// An unusable pattern falls back to YYYY-MM-DD.
	pub fn format(&self, pattern: &str) -> String {
		let mut out = String::new();
		match write!(out, "{}", self.to_naive().format(pattern)) {
			Ok(()) => out,
			Err(_) => self.to_string(),
		}
	}

	// ----------------
	// -- ARITHMETIC --
	// ----------------

	/// The day before this one
	pub fn pred(&self) -> Date {
		if self.day > 1 {
			Date {
				day: self.day - 1,
				..*self
			}
		} else if self.month > 1 {
			let month = self.month - 1;
			Date {
				year: self.year,
				month,
				day: Date::days_in_month(self.year, month),
			}
		} else {
			Date {
				year: self.year - 1,
				month: 12,
				day: 31,
			}
		}
	}

	/// The day after this one
	pub fn succ(&self) -> Date {
		if self.day < Date::days_in_month(self.year, self.month) {
			Date {
				day: self.day + 1,
				..*self
			}
		} else if self.month < 12 {
			Date {
				year: self.year,
				month: self.month + 1,
				day: 1,
			}
		} else {
			Date {
				year: self.year + 1,
				month: 1,
				day: 1,
			}
		}
	}

	/// Moves the date back by whole calendar years. The 29th of February
	/// lands on the 28th when the target year is not a leap year.
	pub fn sub_years(&self, years: u32) -> Date {
		let year = self.year.saturating_sub(years).max(1);
		Date {
			year,
			month: self.month,
			day: self.day.min(Date::days_in_month(year, self.month)),
		}
	}

	// ----------------
	// -- BOUNDARIES --
	// ----------------

	/// First and last day of the calendar month holding this date
	pub fn month_bounds(&self) -> (Date, Date) {
		(
			Date {
				day: 1,
				..*self
			},
			Date {
				day: Date::days_in_month(self.year, self.month),
				..*self
			},
		)
	}

	/// Quarter number, 1 through 4
	pub fn quarter(&self) -> u8 {
		(self.month - 1) / 3 + 1
	}

	/// First and last day of the calendar quarter holding this date
	pub fn quarter_bounds(&self) -> (Date, Date) {
		let first_month = (self.quarter() - 1) * 3 + 1;
		let last_month = first_month + 2;
		(
			Date {
				year: self.year,
				month: first_month,
				day: 1,
			},
			Date {
				year: self.year,
				month: last_month,
				day: Date::days_in_month(self.year, last_month),
			},
		)
	}

	/// First and last day of the calendar year holding this date
	pub fn year_bounds(&self) -> (Date, Date) {
		self.fiscal_year(31, 12)
	}

	/// First and last day of the fiscal year holding this date, for a fiscal
	/// year closing on the given day and month.
	pub fn fiscal_year(&self, last_day: u8, last_month: u8) -> (Date, Date) {
		let end = Date::fiscal_year_end(self.year, last_day, last_month);
		if *self <= end {
			let previous_end =
				Date::fiscal_year_end(self.year - 1, last_day, last_month);
			(previous_end.succ(), end)
		} else {
			(
				end.succ(),
				Date::fiscal_year_end(self.year + 1, last_day, last_month),
			)
		}
	}

	fn fiscal_year_end(year: u32, last_day: u8, last_month: u8) -> Date {
		let max_day = Date::days_in_month(year, last_month);
		let mut day = last_day.min(max_day);

		// a fiscal year closing on the 28th of February closes on the 29th
		// in leap years
		if last_month == 2 && day == 28 {
			day = max_day;
		}

		Date {
			year,
			month: last_month,
			day,
		}
	}

	fn is_leap_year(year: u32) -> bool {
		(year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
	}

	pub fn days_in_month(year: u32, month: u8) -> u8 {
		match month {
			1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
			4 | 6 | 9 | 11 => 30,
			2 => {
				if Date::is_leap_year(year) {
					29
				} else {
					28
				}
			},
			_ => 0, // Invalid month
		}
	}

	fn is_valid_date(year: u32, month: u8, day: u8) -> bool {
		if year == 0 || !(1..=12).contains(&month) {
			return false;
		}
		if day < 1 || day > Date::days_in_month(year, month) {
			return false;
		}
		true
	}
}

impl PartialOrd for Date {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Date {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.year, self.month, self.day).cmp(&(
			other.year,
			other.month,
			other.day,
		))
	}
}

impl fmt::Display for Date {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
	}
}

impl Serialize for Date {
	fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
		s.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Date {
	fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(d)?;
		Date::from_str(&raw).map_err(serde::de::Error::custom)
	}
}
