use tabled::{Table, Tabled};

use crate::cmd::pull_store;
use crate::compiler::JsonExportCompiler;
use crate::settings::Settings;
use crate::store::PushSummary;
use crate::SyncResult;

#[derive(Tabled)]
struct PushOutcome {
    workspace: String,
    outcome: &'static str,
}

pub fn invoke(settings: &Settings) -> SyncResult<Option<String>> {
    let mut store = pull_store(settings)?;
    let summary = store.push(settings.workspaces_dir(), &JsonExportCompiler)?;
    Ok(Some(describe(&summary)))
}

pub(crate) fn describe(summary: &PushSummary) -> String {
    let groups = [
        (&summary.uploaded, "uploaded"),
        (&summary.up_to_date, "up to date"),
        (&summary.missing, "missing locally"),
        (&summary.rejected, "rejected"),
    ];

    let rows = groups.into_iter().flat_map(|(names, outcome)| {
        names.iter().map(move |name| PushOutcome {
            workspace: name.clone(),
            outcome,
        })
    });

    Table::new(rows).to_string()
}
