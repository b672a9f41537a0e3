//! `sitedesk status` command - Workspace status dashboard

use console::style;
use miette::Result;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{self, CliContext};
use crate::core::RecordId;
use crate::entities::{RfiStatus, SubmittalStatus, TaskStatus};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show recent activity per project
    #[arg(long)]
    pub detailed: bool,
}

#[derive(serde::Serialize, Default)]
struct ProjectMetrics {
    name: String,
    stage: String,
    open_tasks: usize,
    open_rfis: usize,
    pending_submittals: usize,
    documents: usize,
    contacts: usize,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let projects = ctx.store.projects();

    let metrics: Vec<ProjectMetrics> = projects
        .iter()
        .map(|p| collect_metrics(&ctx, &p.id, &p.name, &p.stage.to_string()))
        .collect();

    match global.format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "workspace": ctx.workspace.root().display().to_string(),
                "storage": ctx.config.storage().to_string(),
                "user": ctx.user(),
                "projects": metrics,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&status).unwrap_or_default()
            );
        }
        _ => {
            let width = 78;
            println!("{}", style("Sitedesk Workspace").bold().underlined());
            println!("{}", "═".repeat(width));
            println!("Root:    {}", ctx.workspace.root().display());
            println!("Storage: {}", ctx.config.storage());
            println!("User:    {}", ctx.user());
            println!();

            if metrics.is_empty() {
                println!("No projects yet. Create one with 'sitedesk project new'.");
                return Ok(());
            }

            println!(
                "{:<26} {:<18} {:>6} {:>6} {:>6} {:>6} {:>8}",
                style("PROJECT").bold(),
                style("STAGE").bold(),
                style("TASKS").bold(),
                style("RFIS").bold(),
                style("SUBS").bold(),
                style("DOCS").bold(),
                style("PEOPLE").bold()
            );
            println!("{}", "-".repeat(width));
            for m in &metrics {
                println!(
                    "{:<26} {:<18} {:>6} {:>6} {:>6} {:>6} {:>8}",
                    helpers::truncate_str(&m.name, 25),
                    helpers::truncate_str(&m.stage, 17),
                    m.open_tasks,
                    m.open_rfis,
                    m.pending_submittals,
                    m.documents,
                    m.contacts
                );
            }
            println!("{}", "═".repeat(width));
            println!(
                "Counts are open tasks, open RFIs, and submittals awaiting review."
            );

            if args.detailed {
                for project in projects {
                    let recent = ctx.store.project_activity(&project.id);
                    if recent.is_empty() {
                        continue;
                    }
                    println!("\n{}", style(&project.name).bold());
                    for entry in recent.iter().take(5) {
                        println!(
                            "  {}  {}",
                            style(helpers::fmt_timestamp(&entry.created_at)).dim(),
                            entry.details
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn collect_metrics(ctx: &CliContext, id: &RecordId, name: &str, stage: &str) -> ProjectMetrics {
    let open_tasks = ctx
        .store
        .project_tasks(id)
        .iter()
        .filter(|t| t.status != TaskStatus::Closed)
        .count();
    let open_rfis = ctx
        .store
        .project_rfis(id)
        .iter()
        .filter(|r| r.status == RfiStatus::Open)
        .count();
    let pending_submittals = ctx
        .store
        .project_submittals(id)
        .iter()
        .filter(|s| {
            matches!(
                s.status,
                SubmittalStatus::Open | SubmittalStatus::ReviseResubmit
            )
        })
        .count();
    ProjectMetrics {
        name: name.to_string(),
        stage: stage.to_string(),
        open_tasks,
        open_rfis,
        pending_submittals,
        documents: ctx.store.project_documents(id).len(),
        contacts: ctx.store.project_dir_users(id).len(),
    }
}
