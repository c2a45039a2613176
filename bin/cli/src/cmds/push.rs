use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Upload compiled workspaces that are newer than their hosted copy")]
pub struct PushCommand;
