use anyhow::Context;

use crate::config::Config;
use crate::server::run_server;
use crate::store::Store;

pub(crate) fn cmd_serve(store: Store, config: &Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run_server(store, config))
}
