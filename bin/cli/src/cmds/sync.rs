use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Build catalog workspaces and the landscape from the Backstage catalog")]
pub struct SyncCommand {
    #[arg(
        long,
        env = "LANDSCAPER_CATALOG",
        help = "URL of the catalog entities API, or path to a JSON snapshot of it"
    )]
    pub catalog: Option<String>,

    #[arg(long, help = "Directory with custom workspace descriptor templates")]
    pub templates: Option<PathBuf>,

    #[arg(long, help = "Push newer compiled workspaces once the sync is done")]
    pub push: bool,
}
