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
use thiserror::Error;

/// Failures a caller may want to tell apart. Everything else travels as a
/// plain `anyhow::Error`; these can be recovered with `downcast_ref`.
///
/// Options that reference companies or journals the user may not see are
/// not an error: they are filtered down before every render.
#[derive(Debug, Error)]
pub enum ReportError {
	/// A filter or report definition cannot be resolved to a value
	#[error("configuration error: {0}")]
	Configuration(String),

	/// An output back-end failed to produce the document
	#[error("rendering error: {0}")]
	Rendering(String),

	/// Records that cannot be combined were asked to be combined
	#[error("{0}")]
	Structural(String),
}
