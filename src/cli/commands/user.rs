//! `sprinter user` command - User administration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_datetime_local, print_structured, success};
use crate::cli::session::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::SystemRole;

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user (administrators only)
    Add(AddArgs),

    /// List all users
    List,

    /// Deactivate a user (administrators only)
    Deactivate(DeactivateArgs),

    /// Show the acting user
    Whoami,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Login name (no whitespace)
    pub username: String,

    /// Display name (default: the username)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// System role
    #[arg(long, default_value = "user")]
    pub role: SystemRole,
}

#[derive(clap::Args, Debug)]
pub struct DeactivateArgs {
    pub username: String,
}

const USER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("username", "USERNAME", 20),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("role", "ROLE", 8),
    ColumnDef::new("active", "ACTIVE", 8),
];

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    match cmd {
        UserCommands::Add(args) => {
            let display = args.name.as_deref().unwrap_or("");
            // The first user of an empty tracker becomes its administrator
            let user = if session.tracker.users()?.is_empty() {
                session.tracker.bootstrap_admin(&args.username, display)?
            } else {
                let actor = session.actor()?;
                session
                    .tracker
                    .create_user(actor.id, &args.username, display, args.role)?
            };
            if !print_structured(&user, global.format)? {
                success(
                    global.quiet,
                    format!("Created {} {}", user.system_role, style(&user.username).cyan()),
                );
            }
        }
        UserCommands::List => {
            let users = session.tracker.users()?;
            if print_structured(&users, global.format)? {
                return Ok(());
            }
            let rows = users.iter().map(|u| {
                TableRow::new(&u.username)
                    .cell("username", CellValue::Key(u.username.clone()))
                    .cell("name", CellValue::Text(u.display_name.clone()))
                    .cell("role", CellValue::Text(u.system_role.to_string()))
                    .cell(
                        "active",
                        CellValue::Text(if u.active { "yes" } else { "no" }.to_string()),
                    )
            });
            TableFormatter::new(USER_COLUMNS, "user")
                .quiet(global.quiet)
                .output(rows, global.format);
        }
        UserCommands::Deactivate(args) => {
            let actor = session.actor()?;
            let target = session.user(&args.username)?;
            let user = session.tracker.deactivate_user(actor.id, target.id)?;
            success(
                global.quiet,
                format!("Deactivated {}", style(&user.username).cyan()),
            );
        }
        UserCommands::Whoami => {
            let user = session.actor()?;
            if print_structured(&user, global.format)? {
                return Ok(());
            }
            println!("{} ({})", style(&user.username).cyan().bold(), user.display_name);
            println!("  role:    {}", user.system_role);
            println!("  active:  {}", if user.active { "yes" } else { "no" });
            println!("  since:   {}", format_datetime_local(&user.created_at));
        }
    }

    Ok(())
}
