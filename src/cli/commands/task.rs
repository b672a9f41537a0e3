//! `sitedesk task` commands - Numbered work items

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::core::{RecordId, Store};
use crate::entities::{TaskCategory, TaskDraft, TaskPatch, TaskStatus};

#[derive(clap::Subcommand)]
pub enum TaskCommands {
    /// List tasks of the active project
    List(ListArgs),
    /// Create a task (next free number is assigned)
    New(NewArgs),
    /// Show a task record
    Show(ShowArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Close a task
    Close(CloseArgs),
    /// Delete a task (its number is never reused)
    Delete(DeleteArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Open,
    InProgress,
    Closed,
    All,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, value_enum, default_value = "all")]
    pub status: StatusFilter,

    /// Filter by category
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(clap::Args)]
pub struct NewArgs {
    /// Task title
    pub title: String,

    /// Status: open, in progress, closed
    #[arg(long, default_value = "open")]
    pub status: String,

    /// Category: administrative, closeout, contract, design,
    /// miscellaneous, construction
    #[arg(long, default_value = "miscellaneous")]
    pub category: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Contacts to notify (id, email, or full name; repeatable)
    #[arg(long = "notify")]
    pub distribution: Vec<String>,

    /// Attach a local file (repeatable)
    #[arg(long = "attach", value_name = "FILE")]
    pub attachments: Vec<std::path::PathBuf>,

    /// Explicit task number (default: next free number)
    #[arg(long)]
    pub number: Option<u32>,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Task number or id
    pub reference: String,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Task number or id
    pub reference: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Status
    #[arg(long)]
    pub status: Option<String>,

    /// Category
    #[arg(long)]
    pub category: Option<String>,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Replace the notify list with these contacts (repeatable)
    #[arg(long = "notify")]
    pub distribution: Vec<String>,
}

#[derive(clap::Args)]
pub struct CloseArgs {
    /// Task number or id
    pub reference: String,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Task number or id
    pub reference: String,
}

pub fn run(cmd: TaskCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TaskCommands::List(args) => run_list(args, global),
        TaskCommands::New(args) => run_new(args, global),
        TaskCommands::Show(args) => run_show(args, global),
        TaskCommands::Edit(args) => run_edit(args, global),
        TaskCommands::Close(args) => run_close(args, global),
        TaskCommands::Delete(args) => run_delete(args, global),
    }
}

fn matches_filter(status: TaskStatus, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Open => status == TaskStatus::Open,
        StatusFilter::InProgress => status == TaskStatus::InProgress,
        StatusFilter::Closed => status == TaskStatus::Closed,
    }
}

fn resolve_distribution(
    store: &Store,
    project_id: &RecordId,
    references: &[String],
) -> Result<Vec<RecordId>> {
    references
        .iter()
        .map(|reference| helpers::resolve_contact(store, project_id, reference))
        .collect()
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let category = args
        .category
        .as_deref()
        .map(str::parse::<TaskCategory>)
        .transpose()
        .map_err(|e: String| miette!(e))?;

    let mut tasks = ctx.store.project_tasks(&project_id);
    tasks.retain(|t| matches_filter(t.status, args.status));
    if let Some(category) = category {
        tasks.retain(|t| t.category == category);
    }
    tasks.sort_by_key(|t| t.task_number);

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:>5}  {:<40} {:<13} {:<16} {:<12}",
                style("#").bold(),
                style("TITLE").bold(),
                style("STATUS").bold(),
                style("CATEGORY").bold(),
                style("CREATED").bold()
            );
            println!("{}", "-".repeat(92));
            for task in &tasks {
                let status = match task.status {
                    TaskStatus::Open => style(task.status.to_string()).yellow(),
                    TaskStatus::InProgress => style(task.status.to_string()).cyan(),
                    TaskStatus::Closed => style(task.status.to_string()).green(),
                };
                println!(
                    "{:>5}  {:<40} {:<13} {:<16} {:<12}",
                    task.task_number,
                    helpers::truncate_str(&task.title, 39),
                    status,
                    task.category.to_string(),
                    task.created_at.format("%Y-%m-%d")
                );
            }
            println!("\n{} task(s)", tasks.len());
        }
        OutputFormat::Csv => {
            println!("number,title,status,category,created_at");
            for task in &tasks {
                println!(
                    "{},{},{},{},{}",
                    task.task_number,
                    helpers::escape_csv(&task.title),
                    helpers::escape_csv(&task.status.to_string()),
                    task.category,
                    task.created_at.to_rfc3339()
                );
            }
        }
        OutputFormat::Id => {
            for task in &tasks {
                println!("{}", task.id);
            }
        }
        _ => helpers::print_records(&tasks, global.format)?,
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;

    let status: TaskStatus = args.status.parse().map_err(|e: String| miette!(e))?;
    let category: TaskCategory = args.category.parse().map_err(|e: String| miette!(e))?;
    let distribution_list = resolve_distribution(&ctx.store, &project_id, &args.distribution)?;
    let attachments = helpers::stage_attachments(&ctx, &args.attachments)?;

    let draft = TaskDraft {
        number: args.number,
        title: args.title,
        status,
        category,
        description: args.description.unwrap_or_default(),
        distribution_list,
        attachments,
    };
    let task = ctx
        .store
        .add_task(&project_id, draft, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Created task {} {}",
        style("✓").green(),
        style(format!("#{}", task.task_number)).cyan(),
        task.title
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_task(&ctx.store, &project_id, &args.reference)?;
    let task = ctx.store.task(&id).map_err(|e| miette!("{}", e))?;
    helpers::print_record(task, &task.id, global.format)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_task(&ctx.store, &project_id, &args.reference)?;

    let status = args
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()
        .map_err(|e: String| miette!(e))?;
    let category = args
        .category
        .as_deref()
        .map(str::parse::<TaskCategory>)
        .transpose()
        .map_err(|e: String| miette!(e))?;
    let distribution_list = if args.distribution.is_empty() {
        None
    } else {
        Some(resolve_distribution(
            &ctx.store,
            &project_id,
            &args.distribution,
        )?)
    };

    let patch = TaskPatch {
        title: args.title,
        status,
        category,
        description: args.description,
        distribution_list,
        attachments: None,
    };
    let task = ctx
        .store
        .update_task(&id, patch, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated task {}",
        style("✓").green(),
        style(format!("#{}", task.task_number)).cyan()
    );
    Ok(())
}

fn run_close(args: CloseArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_task(&ctx.store, &project_id, &args.reference)?;

    let patch = TaskPatch {
        status: Some(TaskStatus::Closed),
        ..Default::default()
    };
    let task = ctx
        .store
        .update_task(&id, patch, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Closed task {}",
        style("✓").green(),
        style(format!("#{}", task.task_number)).cyan()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_task(&ctx.store, &project_id, &args.reference)?;
    let task = ctx.store.task(&id).map_err(|e| miette!("{}", e))?;
    let label = format!("#{} {}", task.task_number, task.title);

    if !helpers::confirm(&format!("Delete task {}?", label), global.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    ctx.store.delete_task(&id).map_err(|e| miette!("{}", e))?;
    println!("{} Deleted task {}", style("✓").green(), style(label).cyan());
    Ok(())
}
