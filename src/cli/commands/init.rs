//! `sprinter init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Write;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::tracker::Tracker;
use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Create the first administrator with this username
    #[arg(long, value_name = "USERNAME")]
    pub admin: Option<String>,

    /// Display name for the administrator
    #[arg(long, requires = "admin")]
    pub name: Option<String>,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
    }

    let workspace = match Workspace::init(&path) {
        Ok(ws) => ws,
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} sprinter workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let config = Config::load(Some(&workspace));
    let mut tracker = Tracker::open(&config.database_path(&workspace), config.busy_timeout())?;

    if !global.quiet {
        println!(
            "{} Initialized sprinter workspace at {}",
            style("✓").green(),
            style(workspace.root().display()).cyan()
        );
    }

    if let Some(username) = &args.admin {
        let display = args.name.as_deref().unwrap_or("");
        let admin = tracker.bootstrap_admin(username, display)?;

        // Make the administrator the workspace's default acting user
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(workspace.config_path())
            .into_diagnostic()?;
        writeln!(file, "\nuser: {}", admin.username).into_diagnostic()?;

        if !global.quiet {
            println!(
                "{} Created administrator {}",
                style("✓").green(),
                style(&admin.username).cyan()
            );
        }
    }

    if !global.quiet {
        println!();
        println!("Next steps:");
        println!(
            "  {} Create your first project",
            style("sprinter project new \"My Project\"").yellow()
        );
        println!(
            "  {} Add a teammate",
            style("sprinter user add <username>").yellow()
        );
    }

    Ok(())
}
