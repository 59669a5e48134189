#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the port risk dashboard.
//!
//! Configuration comes from `nabeeh.toml` and `NABEEH_*` environment
//! variables; see [`nabeeh_dashboard::config`].

use nabeeh_dashboard::DashboardConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = DashboardConfig::load()?;
    log::debug!("Loaded configuration: {config:?}");

    nabeeh_dashboard::interactive::run(config).await?;

    Ok(())
}
