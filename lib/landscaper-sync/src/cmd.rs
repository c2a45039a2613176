pub mod pull;
pub mod push;
pub mod sync;

use structurizr_client::Client;
use tracing::info;

use crate::settings::Settings;
use crate::store::WorkspaceStore;
use crate::SyncResult;

/// Connects to the configured structurizr instance and pulls every workspace it hosts.
pub(crate) fn pull_store(settings: &Settings) -> SyncResult<WorkspaceStore<Client>> {
    let url = settings.structurizr_url();
    let api_key = Some(settings.api_key().to_string()).filter(|k| !k.is_empty());

    info!(url, "pulling workspaces");
    let mut store = WorkspaceStore::new(Client::new(url, api_key)?);
    store.pull()?;
    Ok(store)
}
