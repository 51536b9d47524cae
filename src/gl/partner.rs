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
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Partner {
	pub id: u32,
	pub name: String,
	#[serde(default)]
	pub category_ids: Vec<u32>,
}

/// A simple named record; partner categories, analytic accounts and
/// analytic tags all look like this.
#[derive(Clone, Debug, Deserialize)]
pub struct Tag {
	pub id: u32,
	pub name: String,
}
