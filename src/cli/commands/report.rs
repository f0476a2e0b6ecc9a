//! `sprinter report` command - Progress reports in markdown

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_date, print_structured, success, truncate_str};
use crate::cli::session::Session;
use crate::cli::GlobalOpts;
use crate::core::identity::SprintId;
use crate::core::report::SprintProgress;
use crate::core::work_item::WorkItemStatus;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Status breakdown and completion of a project
    Project(ProjectArgs),

    /// Progress of a single sprint
    Sprint(SprintArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProjectArgs {
    /// Project key
    pub key: String,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SprintArgs {
    /// Sprint id
    pub sprint: SprintId,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct ProjectReport {
    key: String,
    name: String,
    completion_percent: u8,
    status_counts: Vec<(WorkItemStatus, i64)>,
    active_sprint: Option<SprintSummary>,
}

#[derive(Serialize)]
struct SprintSummary {
    id: SprintId,
    name: String,
    progress: SprintProgress,
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Project(args) => run_project(args, global),
        ReportCommands::Sprint(args) => run_sprint(args, global),
    }
}

fn run_project(args: ProjectArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let actor = session.actor()?;
    let project = session.project(&actor, &args.key)?;

    let counts = session.tracker.project_status_counts(actor.id, project.id)?;
    let completion = session
        .tracker
        .project_completion_percent(actor.id, project.id)?;
    let active = match session.tracker.active_sprint(actor.id, project.id)? {
        Some(sprint) => {
            let progress = session.tracker.sprint_progress(actor.id, sprint.id)?;
            Some(SprintSummary {
                id: sprint.id,
                name: sprint.name,
                progress,
            })
        }
        None => None,
    };

    let report = ProjectReport {
        key: project.key.clone(),
        name: project.name.clone(),
        completion_percent: completion,
        status_counts: counts,
        active_sprint: active,
    };
    if print_structured(&report, global.format)? {
        return Ok(());
    }

    let mut output = String::new();
    output.push_str(&format!("# {} {}\n\n", report.key, report.name));

    output.push_str("## Status\n\n");
    let mut statuses = Builder::default();
    statuses.push_record(["Status", "Items"]);
    let mut total: i64 = 0;
    for (status, count) in &report.status_counts {
        total += count;
        statuses.push_record([status.to_string(), count.to_string()]);
    }
    statuses.push_record(["Total".to_string(), total.to_string()]);
    output.push_str(&statuses.build().with(Style::markdown()).to_string());
    output.push_str(&format!("\n\nCompletion: {}%\n", report.completion_percent));

    if let Some(active) = &report.active_sprint {
        output.push_str(&format!("\n## Active Sprint: {} (#{})\n\n", active.name, active.id));
        output.push_str(&progress_table(&active.progress));
        output.push('\n');
    }

    write_output(&output, args.output, global.quiet)
}

fn run_sprint(args: SprintArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let actor = session.actor()?;

    let sprint = session.tracker.find_sprint(actor.id, args.sprint)?;
    let items = session.tracker.sprint_items(actor.id, sprint.id)?;
    let progress = SprintProgress::from_items(&items);

    if print_structured(
        &SprintSummary {
            id: sprint.id,
            name: sprint.name.clone(),
            progress: progress.clone(),
        },
        global.format,
    )? {
        return Ok(());
    }

    let mut output = String::new();
    output.push_str(&format!("# Sprint {} (#{})\n\n", sprint.name, sprint.id));
    output.push_str(&format!(
        "Status: {}, {} .. {}\n\n",
        sprint.status,
        format_date(sprint.start_date),
        format_date(sprint.end_date)
    ));
    if let Some(goal) = &sprint.goal {
        output.push_str(&format!("Goal: {}\n\n", goal));
    }

    output.push_str("## Summary\n\n");
    output.push_str(&progress_table(&progress));
    output.push('\n');

    let open: Vec<_> = items.iter().filter(|i| !i.status.is_terminal()).collect();
    if !open.is_empty() {
        output.push_str("\n## Open Items\n\n");
        let mut table = Builder::default();
        table.push_record(["Key", "Title", "Status", "Points"]);
        for item in open {
            table.push_record([
                item.key().to_string(),
                truncate_str(&item.title, 40),
                item.status.to_string(),
                item.story_points
                    .map_or_else(|| "-".to_string(), |p| p.to_string()),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    write_output(&output, args.output, global.quiet)
}

fn progress_table(progress: &SprintProgress) -> String {
    let mut summary = Builder::default();
    summary.push_record(["Metric", "Value"]);
    summary.push_record(["Items", &progress.total.to_string()]);
    summary.push_record(["Completed", &progress.completed.to_string()]);
    summary.push_record(["Story Points", &progress.story_points.to_string()]);
    summary.push_record([
        "Completed Points",
        &progress.completed_story_points.to_string(),
    ]);
    summary.push_record(["Progress", &format!("{}%", progress.percent)]);
    summary.build().with(Style::markdown()).to_string()
}

fn write_output(content: &str, output_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            success(quiet, format!("Report written to {}", path.display()));
        }
        None => print!("{}", content),
    }
    Ok(())
}
