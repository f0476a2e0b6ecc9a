//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    comment::CommentCommands, dep::DepCommands, init::InitArgs, item::ItemCommands,
    label::LabelCommands, member::MemberCommands, project::ProjectCommands,
    report::ReportCommands, sprint::SprintCommands, user::UserCommands,
};

#[derive(Parser)]
#[command(name = "sprinter")]
#[command(author, version, about = "Project, sprint and work item tracker")]
#[command(long_about = "A Unix-style tracker for hierarchical projects, sprints and work items, backed by a local SQLite database.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Act as this user (default: SPRINTER_USER, then config `user`)
    #[arg(long = "as", value_name = "USERNAME", global = true)]
    pub actor: Option<String>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .sprinter/)
    #[arg(long, id = "workspace_root", global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sprinter workspace
    Init(InitArgs),

    /// User administration
    #[command(subcommand)]
    User(UserCommands),

    /// Projects and subprojects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Project membership
    #[command(subcommand)]
    Member(MemberCommands),

    /// Sprint lifecycle
    #[command(subcommand)]
    Sprint(SprintCommands),

    /// Work items
    #[command(subcommand)]
    Item(ItemCommands),

    /// Dependencies between work items
    #[command(subcommand)]
    Dep(DepCommands),

    /// Comments on work items
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Labels for work items
    #[command(subcommand)]
    Label(LabelCommands),

    /// Progress reports
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (aligned tables for lists)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just keys, one per line
    Id,
}
