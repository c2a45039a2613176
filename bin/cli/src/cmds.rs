use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use landscaper_sync::settings::Overrides;

use crate::cmds::pull::PullCommand;
use crate::cmds::push::PushCommand;
use crate::cmds::sync::SyncCommand;

pub mod pull;
pub mod push;
pub mod sync;

#[derive(Debug, Parser)]
#[command(name = "landscaper", about = "Keeps structurizr workspaces in step with the Backstage catalog")]
pub struct Opt {
    #[arg(
        long,
        help = "Prints a verbose output during the program execution",
        global = true
    )]
    pub debug: bool,

    #[arg(
        long,
        short,
        help = "Settings file. Defaults to landscaper.toml in the current directory.",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    #[arg(
        long,
        env = "STRUCTURIZR_URL",
        help = "Base URL of the structurizr instance",
        global = true
    )]
    pub url: Option<String>,

    #[arg(
        long = "key",
        env = "STRUCTURIZR_API_KEY",
        hide_env_values = true,
        help = "Admin API key of the structurizr instance",
        global = true
    )]
    pub api_key: Option<String>,

    #[arg(
        long,
        short,
        help = "Directory holding one directory per workspace",
        global = true
    )]
    pub workspaces: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Pull(PullCommand),
    Push(PushCommand),
    Sync(SyncCommand),
}

impl Opt {
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            url: self.connection.url.clone(),
            api_key: self.connection.api_key.clone(),
            workspaces: self.connection.workspaces.clone(),
            ..Default::default()
        };

        if let Command::Sync(cmd) = &self.cmd {
            overrides.catalog = cmd.catalog.clone();
            overrides.templates = cmd.templates.clone();
        }

        overrides
    }
}
