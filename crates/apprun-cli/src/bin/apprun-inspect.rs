//! apprun-inspect - show how the launcher resolves an invocation

use anyhow::Result;
use clap::Parser;

use apprun_cli::cmd;
use apprun_cli::cmd::plan::PlanRequest;
use apprun_cli::{InspectCli, InspectCommand};

fn main() -> Result<()> {
    apprun_cli::logging::init();

    let cli = InspectCli::parse();
    let root = cli.install_root()?;

    match cli.command {
        InspectCommand::Plan {
            invoked_as,
            policy,
            extra_paths,
            args,
        } => cmd::plan::plan(
            &root,
            PlanRequest {
                invoked_as,
                args,
                policy,
                extra_paths,
            },
            cli.json,
        ),
        InspectCommand::Check => cmd::check::check(&root, cli.json),
        InspectCommand::Manifest => cmd::manifest::manifest(&root, cli.json),
    }
}
