//! `sitedesk submittal` commands - Submittals under review

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::entities::{SubmittalDraft, SubmittalPatch, SubmittalStatus};

#[derive(clap::Subcommand)]
pub enum SubmittalCommands {
    /// List submittals of the active project
    List(ListArgs),
    /// Create a submittal (next free number is assigned)
    New(NewArgs),
    /// Show a submittal record
    Show(ShowArgs),
    /// Edit submittal fields
    Edit(EditArgs),
    /// Delete a submittal (its number is never reused)
    Delete(DeleteArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Draft,
    Open,
    Approved,
    Rejected,
    ReviseResubmit,
    Closed,
    All,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, value_enum, default_value = "all")]
    pub status: StatusFilter,
}

#[derive(clap::Args)]
pub struct NewArgs {
    /// Submittal title
    pub title: String,

    /// Status: draft, open, approved, rejected, revise and resubmit, closed
    #[arg(long, default_value = "draft")]
    pub status: String,

    /// Submittal type, e.g. shop drawing or product data
    #[arg(long = "type")]
    pub submittal_type: Option<String>,

    /// Specification section reference, e.g. 09 91 23
    #[arg(long)]
    pub spec_section: Option<String>,

    /// Review due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// Assigned reviewer (contact id, email, or full name)
    #[arg(long)]
    pub assign: Option<String>,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Explicit submittal number (default: next free number)
    #[arg(long)]
    pub number: Option<u32>,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Submittal number or id
    pub reference: String,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Submittal number or id
    pub reference: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Status
    #[arg(long)]
    pub status: Option<String>,

    /// Submittal type
    #[arg(long = "type")]
    pub submittal_type: Option<String>,

    /// Specification section reference
    #[arg(long)]
    pub spec_section: Option<String>,

    /// Review due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// Assigned reviewer (contact id, email, or full name)
    #[arg(long)]
    pub assign: Option<String>,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Submittal number or id
    pub reference: String,
}

pub fn run(cmd: SubmittalCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SubmittalCommands::List(args) => run_list(args, global),
        SubmittalCommands::New(args) => run_new(args, global),
        SubmittalCommands::Show(args) => run_show(args, global),
        SubmittalCommands::Edit(args) => run_edit(args, global),
        SubmittalCommands::Delete(args) => run_delete(args, global),
    }
}

fn matches_filter(status: SubmittalStatus, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Draft => status == SubmittalStatus::Draft,
        StatusFilter::Open => status == SubmittalStatus::Open,
        StatusFilter::Approved => status == SubmittalStatus::Approved,
        StatusFilter::Rejected => status == SubmittalStatus::Rejected,
        StatusFilter::ReviseResubmit => status == SubmittalStatus::ReviseResubmit,
        StatusFilter::Closed => status == SubmittalStatus::Closed,
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;

    let mut submittals = ctx.store.project_submittals(&project_id);
    submittals.retain(|s| matches_filter(s.status, args.status));
    submittals.sort_by_key(|s| s.submittal_number);

    if submittals.is_empty() {
        println!("No submittals found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:>5}  {:<36} {:<22} {:<12} {:<12}",
                style("#").bold(),
                style("TITLE").bold(),
                style("STATUS").bold(),
                style("SECTION").bold(),
                style("DUE").bold()
            );
            println!("{}", "-".repeat(92));
            for submittal in &submittals {
                let status = match submittal.status {
                    SubmittalStatus::Approved => style(submittal.status.to_string()).green(),
                    SubmittalStatus::Rejected => style(submittal.status.to_string()).red(),
                    SubmittalStatus::ReviseResubmit => {
                        style(submittal.status.to_string()).yellow()
                    }
                    SubmittalStatus::Open => style(submittal.status.to_string()).cyan(),
                    _ => style(submittal.status.to_string()).dim(),
                };
                println!(
                    "{:>5}  {:<36} {:<22} {:<12} {:<12}",
                    submittal.submittal_number,
                    helpers::truncate_str(&submittal.title, 35),
                    status,
                    submittal.spec_section,
                    helpers::fmt_date(submittal.due_date)
                );
            }
            println!("\n{} submittal(s)", submittals.len());
        }
        OutputFormat::Csv => {
            println!("number,title,status,type,spec_section,due_date");
            for submittal in &submittals {
                println!(
                    "{},{},{},{},{},{}",
                    submittal.submittal_number,
                    helpers::escape_csv(&submittal.title),
                    helpers::escape_csv(&submittal.status.to_string()),
                    helpers::escape_csv(&submittal.submittal_type),
                    helpers::escape_csv(&submittal.spec_section),
                    submittal
                        .due_date
                        .map(|d| d.to_string())
                        .unwrap_or_default()
                );
            }
        }
        OutputFormat::Id => {
            for submittal in &submittals {
                println!("{}", submittal.id);
            }
        }
        _ => helpers::print_records(&submittals, global.format)?,
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;

    let status: SubmittalStatus = args.status.parse().map_err(|e: String| miette!(e))?;
    let assignee = args
        .assign
        .as_deref()
        .map(|r| helpers::resolve_contact(&ctx.store, &project_id, r))
        .transpose()?;

    let draft = SubmittalDraft {
        number: args.number,
        title: args.title,
        status,
        submittal_type: args.submittal_type.unwrap_or_default(),
        spec_section: args.spec_section.unwrap_or_default(),
        due_date: args.due.as_deref().map(helpers::parse_date).transpose()?,
        assignee,
        description: args.description.unwrap_or_default(),
    };
    let submittal = ctx
        .store
        .add_submittal(&project_id, draft, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Created submittal {} {}",
        style("✓").green(),
        style(format!("#{}", submittal.submittal_number)).cyan(),
        submittal.title
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_submittal(&ctx.store, &project_id, &args.reference)?;
    let submittal = ctx.store.submittal(&id).map_err(|e| miette!("{}", e))?;

    if global.format != OutputFormat::Auto {
        return helpers::print_record(submittal, &submittal.id, global.format);
    }

    println!(
        "{} {}  [{}]",
        style(format!("Submittal #{}", submittal.submittal_number)).bold(),
        style(&submittal.title).bold(),
        submittal.status
    );
    println!(
        "Type: {}   Section: {}   Due: {}",
        if submittal.submittal_type.is_empty() {
            "-"
        } else {
            submittal.submittal_type.as_str()
        },
        if submittal.spec_section.is_empty() {
            "-"
        } else {
            submittal.spec_section.as_str()
        },
        helpers::fmt_date(submittal.due_date)
    );
    println!(
        "Reviewer: {}",
        helpers::contact_label(&ctx.store, submittal.assignee.as_ref())
    );
    if !submittal.description.is_empty() {
        println!("\n{}", style("Description").bold());
        for line in submittal.description.lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_submittal(&ctx.store, &project_id, &args.reference)?;

    let status = args
        .status
        .as_deref()
        .map(str::parse::<SubmittalStatus>)
        .transpose()
        .map_err(|e: String| miette!(e))?;
    let assignee = args
        .assign
        .as_deref()
        .map(|r| helpers::resolve_contact(&ctx.store, &project_id, r))
        .transpose()?;

    let patch = SubmittalPatch {
        title: args.title,
        status,
        submittal_type: args.submittal_type,
        spec_section: args.spec_section,
        due_date: args.due.as_deref().map(helpers::parse_date).transpose()?,
        assignee,
        description: args.description,
    };
    let submittal = ctx
        .store
        .update_submittal(&id, patch, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated submittal {}",
        style("✓").green(),
        style(format!("#{}", submittal.submittal_number)).cyan()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_submittal(&ctx.store, &project_id, &args.reference)?;
    let submittal = ctx.store.submittal(&id).map_err(|e| miette!("{}", e))?;
    let label = format!("#{} {}", submittal.submittal_number, submittal.title);

    if !helpers::confirm(&format!("Delete submittal {}?", label), global.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    ctx.store
        .delete_submittal(&id)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Deleted submittal {}",
        style("✓").green(),
        style(label).cyan()
    );
    Ok(())
}
