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
use crate::config::config_file::Config;
use crate::gl::book::Book;
use crate::gl::manager::ManagerStore;
use crate::options::Options;
use anyhow::{anyhow, Error};
use dirs::home_dir;
use log::{debug, info};
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".config/finrep";
const STORE_FILE: &str = "managers.json";

pub struct Filesystem {
	config_dir: Option<PathBuf>,
}

impl Filesystem {
	pub fn new() -> Self {
		Self {
			config_dir: home_dir().map(|h| h.join(CONFIG_DIR)),
		}
	}

	fn read(&self, file_path: &Path) -> Result<String, Error> {
		fs::read_to_string(file_path)
			.map_err(|e| anyhow!("could not read {}: {}", file_path.display(), e))
	}

	pub fn read_book(&self, file_path: &str) -> Result<Book, Error> {
		let content = self.read(Path::new(file_path))?;
		Book::from_json(&content).map_err(|e| anyhow!("{}: {}", file_path, e))
	}

	pub fn read_options(&self, file_path: &str) -> Result<Options, Error> {
		let content = self.read(Path::new(file_path))?;
		serde_json::from_str(&content)
			.map_err(|e| anyhow!("failed to parse options in {}: {}", file_path, e))
	}

	/// Resolves where the report managers live: the given path, then the
	/// config, then next to the config file.
	pub fn store_path(
		&self,
		custom_store_path: Option<&String>,
		config: &Config,
	) -> Result<PathBuf, Error> {
		if let Some(p) = custom_store_path.map(|s| s.as_str()).or(config.store_path()) {
			return Ok(PathBuf::from(p));
		}
		self.config_dir
			.as_ref()
			.map(|d| d.join(STORE_FILE))
			.ok_or_else(|| anyhow!("Unable to determine home directory"))
	}

	/// A store that doesn't exist yet is empty
	pub fn read_store(&self, path: &Path) -> Result<ManagerStore, Error> {
		if !path.exists() {
			debug!("no manager store at {}", path.display());
			return Ok(ManagerStore::new());
		}
		let content = self.read(path)?;
		ManagerStore::from_json(&content)
			.map_err(|e| anyhow!("failed to parse manager store {}: {}", path.display(), e))
	}

	pub fn write_store(&self, path: &Path, store: &ManagerStore) -> Result<(), Error> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}
		fs::write(path, store.to_json()?)
			.map_err(|e| anyhow!("could not write {}: {}", path.display(), e))
	}

	/// Writes to the given file, or to stdout without one
	pub fn write_output(&self, file_path: Option<&str>, content: &[u8]) -> Result<(), Error> {
		match file_path {
			Some(p) => {
				fs::write(p, content).map_err(|e| anyhow!("could not write {}: {}", p, e))?;
				info!("wrote {} bytes to {}", content.len(), p);
			},
			None => std::io::stdout().write_all(content)?,
		}
		Ok(())
	}

	/// Fetches the config from the given path, or default path if none.
	pub fn get_config(&self, custom_config_path: Option<&String>) -> Result<Config, Error> {
		let config_path = match &custom_config_path {
			None => self
				.config_dir
				.as_ref()
				.map(|d| d.join("config.toml"))
				.ok_or_else(|| anyhow!("Unable to determine home directory"))?,
			Some(p) => PathBuf::from(p),
		};

		// create empty config file if it doesn't exist
		if !config_path.exists() && custom_config_path.is_none() {
			if let Some(parent) = config_path.parent() {
				fs::create_dir_all(parent)?;
			}
			File::create(config_path.clone())?;
		}

		let content = self.read(&config_path)?;
		let config: Config = toml::from_str(&content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))?;

		Ok(config)
	}
}
