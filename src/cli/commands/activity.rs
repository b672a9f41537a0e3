//! `sitedesk activity` command - The activity feed

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::entities::{ActivityEntry, ActivityKind};

#[derive(clap::Args)]
pub struct ActivityArgs {
    /// Maximum number of entries to show
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,

    /// Filter by record family: project, task, rfi, submittal
    #[arg(long)]
    pub kind: Option<String>,

    /// Show the feed across every project, not just the active one
    #[arg(long)]
    pub all_projects: bool,
}

pub fn run(args: ActivityArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let kind = args
        .kind
        .as_deref()
        .map(str::parse::<ActivityKind>)
        .transpose()
        .map_err(|e: String| miette!(e))?;

    let entries: Vec<&ActivityEntry> = if args.all_projects {
        ctx.store.activity().iter().collect()
    } else {
        let project_id = helpers::active_project(&ctx, global)?;
        ctx.store.project_activity(&project_id)
    };
    let entries: Vec<&ActivityEntry> = entries
        .into_iter()
        .filter(|e| kind.map_or(true, |k| e.kind == k))
        .take(args.limit)
        .collect();

    if entries.is_empty() {
        println!("No activity yet.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            for entry in &entries {
                let tag = match entry.kind {
                    ActivityKind::Project => style("project").magenta(),
                    ActivityKind::Task => style("task").cyan(),
                    ActivityKind::Rfi => style("rfi").yellow(),
                    ActivityKind::Submittal => style("submittal").blue(),
                };
                let actor = if entry.user_id.is_empty() {
                    String::new()
                } else {
                    format!("  ({})", entry.user_id)
                };
                println!(
                    "{}  {:<9} {}{}",
                    style(helpers::fmt_timestamp(&entry.created_at)).dim(),
                    tag,
                    entry.details,
                    style(actor).dim()
                );
            }
        }
        OutputFormat::Csv => {
            println!("id,project_id,type,action,details,user_id,created_at");
            for entry in &entries {
                println!(
                    "{},{},{},{},{},{},{}",
                    entry.id,
                    entry.project_id,
                    entry.kind,
                    entry.action,
                    helpers::escape_csv(&entry.details),
                    helpers::escape_csv(&entry.user_id),
                    entry.created_at.to_rfc3339()
                );
            }
        }
        OutputFormat::Id => {
            for entry in &entries {
                println!("{}", entry.id);
            }
        }
        _ => helpers::print_records(&entries, global.format)?,
    }
    Ok(())
}
