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
use crate::gl::company::{Currency, SymbolPosition};
use rust_decimal::Decimal;

const NBSP: char = '\u{00A0}';
const MAX_NAME_LEN: usize = 35;

/// Monetary display of an amount, e.g. `$ 1,234.50`. Zero never prints with
/// a minus sign; with `blank_if_zero` it doesn't print at all. In no-format
/// mode the amount is rounded to the currency and printed without trailing
/// zeros.
pub fn format_value(
	amount: Decimal,
	currency: &Currency,
	blank_if_zero: bool,
	no_format: bool,
) -> String {
	let mut amount = currency.round(amount);
	if amount.is_zero() {
		if blank_if_zero {
			return String::new();
		}
		amount = Decimal::ZERO;
	}

	if no_format {
		return amount.normalize().to_string();
	}

	let digits = with_thousands_separators(amount, currency.decimal_places);
	let symbol = currency.symbol.as_deref().unwrap_or(&currency.code);
	match currency.position {
		SymbolPosition::Before => format!("{}{}{}", symbol, NBSP, digits),
		SymbolPosition::After => format!("{}{}{}", digits, NBSP, symbol),
	}
}

/// Expects an amount already rounded to `decimals`
fn with_thousands_separators(amount: Decimal, decimals: u32) -> String {
	let mut fixed = amount.abs();
	fixed.rescale(decimals);
	let fixed = fixed.to_string();
	let (int_part, fraction) = match fixed.split_once('.') {
		Some((i, f)) => (i.to_string(), Some(f)),
		None => (fixed.clone(), None),
	};

	let mut int_str = int_part;
	let mut i = int_str.len() as isize - 3;
	while i > 0 {
		int_str.insert(i as usize, ',');
		i -= 3;
	}

	let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
	match fraction {
		Some(f) => format!("{}{}.{}", sign, int_str, f),
		None => format!("{}{}", sign, int_str),
	}
}

/// Label of a journal item: move name, reference and line label joined with
/// dashes. Placeholder names (`/`) are skipped.
pub fn format_move_line_name(
	line_name: Option<&str>,
	move_ref: Option<&str>,
	move_name: &str,
	no_format: bool,
) -> String {
	let mut parts: Vec<&str> = vec![];
	if move_name != "/" {
		parts.push(move_name);
	}
	if let Some(r) = move_ref.filter(|r| !r.is_empty() && *r != "/") {
		parts.push(r);
	}
	if let Some(n) = line_name.filter(|n| !n.is_empty() && *n != "/") {
		parts.push(n);
	}

	let name = parts.join("-");
	if !no_format && name.chars().count() > MAX_NAME_LEN {
		let cut: String = name.chars().take(MAX_NAME_LEN - 3).collect();
		return format!("{}...", cut);
	}
	name
}

#[cfg(test)]
mod tests {
	use super::*;

	fn usd() -> Currency {
		Currency {
			code: "USD".to_string(),
			decimal_places: 2,
			symbol: Some("$".to_string()),
			position: SymbolPosition::Before,
		}
	}

	fn eur() -> Currency {
		Currency {
			code: "EUR".to_string(),
			decimal_places: 2,
			symbol: Some("€".to_string()),
			position: SymbolPosition::After,
		}
	}

	fn amount(s: &str) -> Decimal {
		s.parse().unwrap()
	}

	#[test]
	fn test_thousands_and_symbol() {
		assert_eq!(format_value(amount("1234567.891"), &usd(), false, false), "$\u{a0}1,234,567.89");
		assert_eq!(format_value(amount("-950"), &eur(), false, false), "-950.00\u{a0}€");
		assert_eq!(format_value(amount("100"), &usd(), false, false), "$\u{a0}100.00");
		assert_eq!(format_value(amount("999.995"), &usd(), false, false), "$\u{a0}1,000.00");
	}

	#[test]
	fn test_zero() {
		assert_eq!(format_value(amount("-0.001"), &usd(), false, false), "$\u{a0}0.00");
		assert_eq!(format_value(Decimal::ZERO, &usd(), true, false), "");
		assert_eq!(format_value(amount("-0.004"), &usd(), false, true), "0");
	}

	#[test]
	fn test_no_format_is_rounded_to_the_currency() {
		assert_eq!(format_value(amount("1234.5"), &usd(), false, true), "1234.5");
		assert_eq!(format_value(amount("1400.00"), &usd(), false, true), "1400");
		assert_eq!(format_value(amount("250.3049"), &usd(), false, true), "250.3");
		// 0.1 + 0.2 stays exact
		assert_eq!(
			format_value(amount("250") + amount("0.1") + amount("0.2"), &usd(), false, true),
			"250.3"
		);
	}

	#[test]
	fn test_move_line_name() {
		assert_eq!(
			format_move_line_name(Some("Office chairs"), Some("PO42"), "INV/2017/0001", false),
			"INV/2017/0001-PO42-Office chairs"
		);
		assert_eq!(format_move_line_name(Some("/"), None, "/", false), "");
		assert_eq!(
			format_move_line_name(Some("Office chairs"), Some("/"), "INV/2017/0001", false),
			"INV/2017/0001-Office chairs"
		);
		assert_eq!(
			format_move_line_name(
				Some("A rather long description of the goods"),
				None,
				"INV/2017/0001",
				false
			),
			"INV/2017/0001-A rather long desc..."
		);
		assert_eq!(
			format_move_line_name(
				Some("A rather long description of the goods"),
				None,
				"INV/2017/0001",
				true
			)
			.len(),
			52
		);
	}
}
