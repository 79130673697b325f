// APE
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


//! Entry point to the service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use ape::db::init_schema;
use ape::driver::ServiceOptions;
use ape::serve;
use ape_core::db::Db;
use ape_core::db::postgres::{PostgresDb, PostgresOptions};
use ape_core::env::get_optional_var;
use std::error::Error;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Default port to listen on when `APE_PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

/// Prepares the schema in `db` and serves the application on `port` until it fails.
async fn run(
    port: u16,
    db: Arc<dyn Db + Send + Sync>,
    opts: ServiceOptions,
) -> Result<(), Box<dyn Error>> {
    init_schema(&mut db.ex().await?).await?;
    serve((Ipv4Addr::LOCALHOST, port), db, opts).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let port = get_optional_var::<u16>("APE", "PORT")?.unwrap_or(DEFAULT_PORT);
    let opts = ServiceOptions::from_env("APE")?;
    let db_opts = PostgresOptions::from_env("PGSQL_PROD")?;

    let db: Arc<dyn Db + Send + Sync> = Arc::new(PostgresDb::connect(db_opts)?);
    let result = run(port, db.clone(), opts).await;
    db.close().await;
    result
}
