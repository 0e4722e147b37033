// Paddock
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Configuration of the service, read from the environment.

use log::info;
use paddock_core::db::postgres::{PostgresDb, PostgresOptions};
use paddock_core::db::{Db, DbResult, sqlite};
use paddock_core::env::{get_optional_var, get_required_var};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Prefix of the environment variables that configure the database.
const DATABASE_PREFIX: &str = "DATABASE";

/// Prefix of the environment variables that configure the HTTP server.
const SERVER_PREFIX: &str = "DRIVERS";

/// Default port to listen on.
const DEFAULT_PORT: u16 = 8000;

/// Database to connect to.
#[derive(Debug)]
pub enum DbConfig {
    /// SQLite database given by its connection string.
    Sqlite(String),

    /// PostgreSQL database.
    Postgres(PostgresOptions),
}

impl DbConfig {
    /// Opens a connection pool to the configured database.
    pub async fn connect(self) -> DbResult<Arc<dyn Db + Send + Sync>> {
        match self {
            DbConfig::Sqlite(url) => {
                info!("Using SQLite database");
                Ok(Arc::new(sqlite::connect(&url).await?))
            }
            DbConfig::Postgres(opts) => {
                info!("Using PostgreSQL database");
                Ok(Arc::new(PostgresDb::connect(opts)?))
            }
        }
    }
}

/// Configuration of the service.
#[derive(Debug)]
pub struct Config {
    /// Address and port to listen on.
    pub bind_addr: SocketAddr,

    /// Database to connect to.
    pub db: DbConfig,
}

impl Config {
    /// Initializes the configuration from environment variables.
    ///
    /// `DATABASE_URL` is required.  URLs with the `sqlite:` scheme select SQLite and any other URL
    /// is handed to PostgreSQL, which also honors `DATABASE_MIN_CONNECTIONS`,
    /// `DATABASE_MAX_CONNECTIONS` and `DATABASE_MAX_RETRIES`.  The server listens on
    /// `DRIVERS_ADDRESS` and `DRIVERS_PORT`.
    pub fn from_env() -> Result<Config, String> {
        let address = get_optional_var::<IpAddr>(SERVER_PREFIX, "ADDRESS")?
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port = get_optional_var::<u16>(SERVER_PREFIX, "PORT")?.unwrap_or(DEFAULT_PORT);

        let url = get_required_var::<String>(DATABASE_PREFIX, "URL")?;
        let db = if url.starts_with("sqlite:") {
            DbConfig::Sqlite(url)
        } else {
            DbConfig::Postgres(PostgresOptions::from_env(DATABASE_PREFIX)?)
        };

        Ok(Config { bind_addr: SocketAddr::new(address, port), db })
    }
}
