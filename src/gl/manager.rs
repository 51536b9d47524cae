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
use anyhow::{anyhow, Error};
use log::info;
use serde::{Deserialize, Serialize};

/// Holds the summary and footnotes of one report, optionally scoped to one
/// company.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ReportManager {
	pub id: u32,
	pub report_name: String,
	pub company_id: Option<u32>,
	#[serde(default)]
	pub summary: Option<String>,
	#[serde(default)]
	pub footnotes: Vec<Footnote>,
}

/// A free-text note attached to the report line whose id equals `line`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Footnote {
	pub id: u32,
	pub text: String,
	pub line: String,
}

/// Every manager known to this installation, persisted as one JSON file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ManagerStore {
	#[serde(default)]
	managers: Vec<ReportManager>,
	#[serde(default)]
	next_manager_id: u32,
	#[serde(default)]
	next_footnote_id: u32,
}

impl ManagerStore {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn from_json(content: &str) -> Result<Self, Error> {
		if content.trim().is_empty() {
			return Ok(Self::new());
		}
		Ok(serde_json::from_str(content)?)
	}

	pub fn to_json(&self) -> Result<String, Error> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	pub fn managers(&self) -> &[ReportManager] {
		&self.managers
	}

	/// Finds the manager of a report, creating it on first access. The
	/// lookup is scoped to a company only when exactly one is selected.
	pub fn get_or_create(
		&mut self,
		report_name: &str,
		selected_companies: &[u32],
	) -> &mut ReportManager {
		let scope = match selected_companies {
			[only] => Some(*only),
			_ => None,
		};

		let position = self.managers.iter().position(|m| {
			m.report_name == report_name
				&& scope.map_or(true, |c| m.company_id == Some(c))
		});

		let index = match position {
			Some(index) => index,
			None => {
				self.next_manager_id += 1;
				info!(
					"creating report manager {} for {}",
					self.next_manager_id, report_name
				);
				self.managers.push(ReportManager {
					id: self.next_manager_id,
					report_name: report_name.to_string(),
					company_id: selected_companies.first().copied(),
					summary: None,
					footnotes: vec![],
				});
				self.managers.len() - 1
			},
		};

		&mut self.managers[index]
	}

	pub fn get(&self, manager_id: u32) -> Option<&ReportManager> {
		self.managers.iter().find(|m| m.id == manager_id)
	}

	fn get_mut(&mut self, manager_id: u32) -> Result<&mut ReportManager, Error> {
		self.managers
			.iter_mut()
			.find(|m| m.id == manager_id)
			.ok_or_else(|| anyhow!("No report manager with id {}", manager_id))
	}

	pub fn set_summary(
		&mut self,
		manager_id: u32,
		summary: &str,
	) -> Result<(), Error> {
		let manager = self.get_mut(manager_id)?;
		manager.summary = if summary.is_empty() {
			None
		} else {
			Some(summary.to_string())
		};
		Ok(())
	}

	/// Attaches a note to a line and returns the id of the new footnote
	pub fn add_footnote(
		&mut self,
		manager_id: u32,
		line: &str,
		text: &str,
	) -> Result<u32, Error> {
		let id = self.next_footnote_id + 1;
		let manager = self.get_mut(manager_id)?;
		manager.footnotes.push(Footnote {
			id,
			text: text.to_string(),
			line: line.to_string(),
		});
		self.next_footnote_id = id;
		Ok(id)
	}

	pub fn remove_footnote(
		&mut self,
		manager_id: u32,
		footnote_id: u32,
	) -> Result<(), Error> {
		let manager = self.get_mut(manager_id)?;
		let before = manager.footnotes.len();
		manager.footnotes.retain(|f| f.id != footnote_id);
		if manager.footnotes.len() == before {
			return Err(anyhow!(
				"No footnote {} on report manager {}",
				footnote_id,
				manager_id
			));
		}
		Ok(())
	}

	/// Moves the footnotes of `source` onto `target` and drops `source`.
	/// Both must belong to the same report.
	pub fn merge(&mut self, target_id: u32, source_id: u32) -> Result<(), Error> {
		if target_id == source_id {
			return Ok(());
		}

		let source = self
			.get(source_id)
			.ok_or_else(|| anyhow!("No report manager with id {}", source_id))?
			.clone();
		let target = self.get_mut(target_id)?;

		if target.report_name != source.report_name {
			return Err(ReportError::Structural(format!(
				"Cannot merge report managers of different reports ({} and {})",
				target.report_name, source.report_name
			))
			.into());
		}

		target.footnotes.extend(source.footnotes);
		if target.summary.is_none() {
			target.summary = source.summary;
		}
		self.managers.retain(|m| m.id != source_id);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_get_or_create_is_lazy_and_stable() {
		let mut store = ManagerStore::new();
		let first = store.get_or_create("trial_balance", &[1]).id;
		let again = store.get_or_create("trial_balance", &[1]).id;
		assert_eq!(first, again);
		assert_eq!(store.managers().len(), 1);
		assert_eq!(store.managers()[0].company_id, Some(1));
	}

	#[test]
	fn test_company_scoping() {
		let mut store = ManagerStore::new();
		let a = store.get_or_create("trial_balance", &[1]).id;
		let b = store.get_or_create("trial_balance", &[2]).id;
		assert_ne!(a, b);

		// Several companies selected: any manager of the report will do
		let c = store.get_or_create("trial_balance", &[1, 2]).id;
		assert_eq!(c, a);
	}

	#[test]
	fn test_unscoped_manager_has_no_company() {
		let mut store = ManagerStore::new();
		assert_eq!(store.get_or_create("balance", &[]).company_id, None);
	}

	#[test]
	fn test_footnotes() {
		let mut store = ManagerStore::new();
		let id = store.get_or_create("trial_balance", &[]).id;
		let f1 = store.add_footnote(id, "account_1", "Checked").unwrap();
		let f2 = store.add_footnote(id, "account_3", "Pending").unwrap();
		assert_ne!(f1, f2);

		store.remove_footnote(id, f1).unwrap();
		assert!(store.remove_footnote(id, f1).is_err());

		let notes = &store.get(id).unwrap().footnotes;
		assert_eq!(notes.len(), 1);
		assert_eq!(notes[0].line, "account_3");
	}

	#[test]
	fn test_summary() {
		let mut store = ManagerStore::new();
		let id = store.get_or_create("trial_balance", &[]).id;
		store.set_summary(id, "Year end").unwrap();
		assert_eq!(store.get(id).unwrap().summary.as_deref(), Some("Year end"));
		store.set_summary(id, "").unwrap();
		assert_eq!(store.get(id).unwrap().summary, None);
	}

	#[test]
	fn test_merge_requires_same_report() {
		let mut store = ManagerStore::new();
		let a = store.get_or_create("trial_balance", &[1]).id;
		let b = store.get_or_create("trial_balance", &[2]).id;
		let c = store.get_or_create("balance", &[1]).id;
		store.add_footnote(b, "account_1", "From b").unwrap();

		let err = store.merge(a, c).unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ReportError>(),
			Some(ReportError::Structural(_))
		));

		store.merge(a, b).unwrap();
		assert_eq!(store.get(a).unwrap().footnotes.len(), 1);
		assert!(store.get(b).is_none());
	}

	#[test]
	fn test_store_round_trips_through_json() {
		let mut store = ManagerStore::new();
		let id = store.get_or_create("trial_balance", &[1]).id;
		store.add_footnote(id, "account_1", "Checked").unwrap();
		let json = store.to_json().unwrap();

		let mut loaded = ManagerStore::from_json(&json).unwrap();
		assert_eq!(loaded.managers(), store.managers());
		let next = loaded.add_footnote(id, "account_2", "Next").unwrap();
		assert_eq!(next, 2);
		assert!(ManagerStore::from_json("").unwrap().managers().is_empty());
	}
}
