//! `sprinter dep` command - Dependencies between work items

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, success};
use crate::cli::session::Session;
use crate::cli::GlobalOpts;
use crate::core::identity::DependencyId;
use crate::core::work_item::DependencyType;

#[derive(Subcommand, Debug)]
pub enum DepCommands {
    /// Make SUCCESSOR depend on PREDECESSOR
    Add(AddArgs),

    /// Remove a dependency by id
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Item that must happen first, e.g. APP-3
    pub predecessor: String,

    /// Item that waits on the predecessor, e.g. APP-7
    pub successor: String,

    /// Dependency type (fs, ss, ff, sf)
    #[arg(long = "type", short = 't', default_value = "finish-to-start")]
    pub dependency_type: DependencyType,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub id: DependencyId,
}

pub fn run(cmd: DepCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let actor = session.actor()?;

    match cmd {
        DepCommands::Add(args) => {
            let pred = session.item(&actor, &args.predecessor)?;
            let succ = session.item(&actor, &args.successor)?;
            let dep = session
                .tracker
                .add_dependency(actor.id, pred.id, succ.id, args.dependency_type)?;
            if !print_structured(&dep, global.format)? {
                success(
                    global.quiet,
                    format!(
                        "Linked {} -> {} ({}, #{})",
                        style(pred.key()).cyan(),
                        style(succ.key()).cyan(),
                        dep.dependency_type,
                        dep.id
                    ),
                );
            }
        }
        DepCommands::Remove(args) => {
            session.tracker.remove_dependency(actor.id, args.id)?;
            success(global.quiet, format!("Removed dependency #{}", args.id));
        }
    }

    Ok(())
}
