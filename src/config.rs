use std::{
	net::{IpAddr, Ipv4Addr},
	path::PathBuf,
	sync::Arc,
};

use tracing::level_filters::LevelFilter;

use crate::store::{FileStorage, MemoryStorage, Storage, UserConflict};

/// Value of `DATABASE_PATH` that keeps the store in memory.
pub const MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, thiserror::Error)]
#[error("{name} must be {expected}, got {value:?}")]
pub struct Error {
	name: &'static str,
	expected: &'static str,
	value: String,
}

/// Where the store keeps its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
	File(PathBuf),
	Memory,
}

/// Runtime configuration, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub host: IpAddr,
	pub port: u16,
	pub database: Database,
	/// Indent the database file.
	pub pretty: bool,
	pub user_conflict: UserConflict,
	/// Export traces and metrics over OTLP.
	pub otel: bool,
	pub log_level: LevelFilter,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let database = match lookup("DATABASE_PATH") {
			Some(path) if path == MEMORY_DATABASE => Database::Memory,
			Some(path) => Database::File(path.into()),
			None => Database::File("db.json".into()),
		};

		Ok(Self {
			host: parse(&lookup, "HOST", "an ip address", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
			port: parse(&lookup, "PORT", "a port number", 3000)?,
			database,
			pretty: parse_bool(&lookup, "DATABASE_PRETTY", true)?,
			user_conflict: parse(
				&lookup,
				"USER_CONFLICT",
				"`overwrite` or `reject`",
				UserConflict::default(),
			)?,
			otel: parse_bool(&lookup, "OTEL_ENABLED", false)?,
			log_level: parse(&lookup, "LOG_LEVEL", "a log level", LevelFilter::INFO)?,
		})
	}

	/// Builds the storage backend selected by `DATABASE_PATH`.
	pub fn storage(&self) -> Arc<dyn Storage> {
		match &self.database {
			Database::File(path) => Arc::new(FileStorage::new(path).pretty(self.pretty)),
			Database::Memory => Arc::new(MemoryStorage::new()),
		}
	}
}

fn parse<T: std::str::FromStr>(
	lookup: impl Fn(&str) -> Option<String>,
	name: &'static str,
	expected: &'static str,
	default: T,
) -> Result<T, Error> {
	let Some(value) = lookup(name) else {
		return Ok(default);
	};

	value.trim().parse().map_err(|_| Error {
		name,
		expected,
		value,
	})
}

fn parse_bool(
	lookup: impl Fn(&str) -> Option<String>,
	name: &'static str,
	default: bool,
) -> Result<bool, Error> {
	let Some(value) = lookup(name) else {
		return Ok(default);
	};

	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(Error {
			name,
			expected: "a boolean",
			value,
		}),
	}
}
