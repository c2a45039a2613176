use std::env;

use clap::Parser;
use landscaper_sync::cmd::{pull, push, sync};
use landscaper_sync::settings::Settings;
use landscaper_sync::SyncResult;
use tracing::error;

use crate::cmds::{Command, Opt};

mod cmds;

fn settings(opt: &Opt) -> SyncResult<Settings> {
    let cwd = env::current_dir()?;
    let settings = Settings::load(opt.config.as_deref(), &cwd)?;
    Ok(settings.with_overrides(opt.overrides()))
}

fn main() {
    let opt = Opt::parse();

    let tracing_level = if opt.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .init();

    let result = settings(&opt).and_then(|settings| match &opt.cmd {
        Command::Pull(_) => pull::invoke(&settings),
        Command::Push(_) => push::invoke(&settings),
        Command::Sync(cmd) => sync::invoke(&settings, cmd.push),
    });

    match result {
        Ok(output) => {
            if let Some(output) = output {
                println!("{output}");
            }
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
}
