use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Pull every hosted workspace and create its local directory")]
pub struct PullCommand;
