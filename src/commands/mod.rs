mod common;
mod completions;
mod config;
mod find;
mod help;
mod init;
mod objects;
mod status;
mod targets;

use anyhow::Result;

use crate::cli::{CliArgs, CommandKind};

pub fn dispatch(args: &CliArgs) -> Result<()> {
    match &args.command {
        CommandKind::Help { all, command } => help::run(*all, command.as_deref()),
        CommandKind::Find(cmd) => find::run(args, cmd),
        CommandKind::Objects(cmd) => objects::run(args, cmd),
        CommandKind::Targets(cmd) => targets::run(args, cmd),
        CommandKind::Status(cmd) => status::run(args, cmd),
        CommandKind::Init(cmd) => init::run(args, cmd),
        CommandKind::Config(_) => config::run(args),
        CommandKind::Completions(cmd) => completions::run(args, cmd),
    }
}
