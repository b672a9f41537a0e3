//! `sitedesk rfi` commands - Requests for Information

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::core::{RecordId, Store};
use crate::entities::{RfiDraft, RfiPatch, RfiStatus};

#[derive(clap::Subcommand)]
pub enum RfiCommands {
    /// List RFIs of the active project
    List(ListArgs),
    /// Create an RFI (next free number is assigned)
    New(NewArgs),
    /// Show an RFI with its response thread
    Show(ShowArgs),
    /// Append a response to an RFI's thread
    Respond(RespondArgs),
    /// Edit RFI fields
    Edit(EditArgs),
    /// Close an RFI
    Close(CloseArgs),
    /// Delete an RFI (its number is never reused)
    Delete(DeleteArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Draft,
    Open,
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
    /// Subject line (at most 200 characters)
    pub subject: String,

    /// Question body
    #[arg(short, long)]
    pub question: Option<String>,

    /// Status: draft, open, closed
    #[arg(long, default_value = "draft")]
    pub status: String,

    /// Response due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// RFI manager (contact id, email, or full name)
    #[arg(long)]
    pub manager: Option<String>,

    /// Contact the question came from
    #[arg(long)]
    pub from: Option<String>,

    /// Contacts assigned to answer (repeatable)
    #[arg(long = "assign")]
    pub assignees: Vec<String>,

    /// Contacts to notify (repeatable)
    #[arg(long = "notify")]
    pub distribution: Vec<String>,

    /// Responsible contractor (company id or name)
    #[arg(long)]
    pub contractor: Option<String>,

    /// Related specification section (number or id)
    #[arg(long)]
    pub spec: Option<String>,

    /// Drawing number
    #[arg(long)]
    pub drawing: Option<String>,

    /// Attach a local file (repeatable)
    #[arg(long = "attach", value_name = "FILE")]
    pub attachments: Vec<std::path::PathBuf>,

    /// Explicit RFI number (default: next free number)
    #[arg(long)]
    pub number: Option<u32>,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// RFI number or id
    pub reference: String,
}

#[derive(clap::Args)]
pub struct RespondArgs {
    /// RFI number or id
    pub reference: String,

    /// Response text
    pub text: String,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// RFI number or id
    pub reference: String,

    /// New subject (at most 200 characters)
    #[arg(long)]
    pub subject: Option<String>,

    /// Question body
    #[arg(short, long)]
    pub question: Option<String>,

    /// Status
    #[arg(long)]
    pub status: Option<String>,

    /// Response due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// RFI manager (contact id, email, or full name)
    #[arg(long)]
    pub manager: Option<String>,

    /// Contact the question came from
    #[arg(long)]
    pub from: Option<String>,

    /// Replace the assignees with these contacts (repeatable)
    #[arg(long = "assign")]
    pub assignees: Vec<String>,

    /// Replace the notify list with these contacts (repeatable)
    #[arg(long = "notify")]
    pub distribution: Vec<String>,

    /// Responsible contractor (company id or name)
    #[arg(long)]
    pub contractor: Option<String>,

    /// Related specification section (number or id)
    #[arg(long)]
    pub spec: Option<String>,

    /// Drawing number
    #[arg(long)]
    pub drawing: Option<String>,
}

#[derive(clap::Args)]
pub struct CloseArgs {
    /// RFI number or id
    pub reference: String,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// RFI number or id
    pub reference: String,
}

pub fn run(cmd: RfiCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RfiCommands::List(args) => run_list(args, global),
        RfiCommands::New(args) => run_new(args, global),
        RfiCommands::Show(args) => run_show(args, global),
        RfiCommands::Respond(args) => run_respond(args, global),
        RfiCommands::Edit(args) => run_edit(args, global),
        RfiCommands::Close(args) => run_close(args, global),
        RfiCommands::Delete(args) => run_delete(args, global),
    }
}

fn matches_filter(status: RfiStatus, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Draft => status == RfiStatus::Draft,
        StatusFilter::Open => status == RfiStatus::Open,
        StatusFilter::Closed => status == RfiStatus::Closed,
    }
}

fn resolve_contacts(
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

    let mut rfis = ctx.store.project_rfis(&project_id);
    rfis.retain(|r| matches_filter(r.status, args.status));
    rfis.sort_by_key(|r| r.rfi_number);

    if rfis.is_empty() {
        println!("No RFIs found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:>5}  {:<44} {:<8} {:<12} {:>5}",
                style("#").bold(),
                style("SUBJECT").bold(),
                style("STATUS").bold(),
                style("DUE").bold(),
                style("RESP").bold()
            );
            println!("{}", "-".repeat(82));
            for rfi in &rfis {
                let status = match rfi.status {
                    RfiStatus::Draft => style(rfi.status.to_string()).dim(),
                    RfiStatus::Open => style(rfi.status.to_string()).yellow(),
                    RfiStatus::Closed => style(rfi.status.to_string()).green(),
                };
                println!(
                    "{:>5}  {:<44} {:<8} {:<12} {:>5}",
                    rfi.rfi_number,
                    helpers::truncate_str(&rfi.subject, 43),
                    status,
                    helpers::fmt_date(rfi.due_date),
                    rfi.responses.len()
                );
            }
            println!("\n{} RFI(s)", rfis.len());
        }
        OutputFormat::Csv => {
            println!("number,subject,status,due_date,responses,created_at");
            for rfi in &rfis {
                println!(
                    "{},{},{},{},{},{}",
                    rfi.rfi_number,
                    helpers::escape_csv(&rfi.subject),
                    rfi.status,
                    rfi.due_date.map(|d| d.to_string()).unwrap_or_default(),
                    rfi.responses.len(),
                    rfi.created_at.to_rfc3339()
                );
            }
        }
        OutputFormat::Id => {
            for rfi in &rfis {
                println!("{}", rfi.id);
            }
        }
        _ => helpers::print_records(&rfis, global.format)?,
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;

    let status: RfiStatus = args.status.parse().map_err(|e: String| miette!(e))?;
    let manager = args
        .manager
        .as_deref()
        .map(|r| helpers::resolve_contact(&ctx.store, &project_id, r))
        .transpose()?;
    let received_from = args
        .from
        .as_deref()
        .map(|r| helpers::resolve_contact(&ctx.store, &project_id, r))
        .transpose()?;
    let assignees = resolve_contacts(&ctx.store, &project_id, &args.assignees)?;
    let distribution_list = resolve_contacts(&ctx.store, &project_id, &args.distribution)?;
    let responsible_contractor = args
        .contractor
        .as_deref()
        .map(|r| helpers::resolve_company(&ctx.store, &project_id, r))
        .transpose()?;
    let specification = args
        .spec
        .as_deref()
        .map(|r| helpers::resolve_spec_section(&ctx.store, &project_id, r))
        .transpose()?;
    let attachments = helpers::stage_attachments(&ctx, &args.attachments)?;

    let draft = RfiDraft {
        number: args.number,
        subject: args.subject,
        question: args.question.unwrap_or_default(),
        status,
        due_date: args.due.as_deref().map(helpers::parse_date).transpose()?,
        rfi_manager: manager,
        received_from,
        assignees,
        distribution_list,
        responsible_contractor,
        specification,
        drawing_number: args.drawing.unwrap_or_default(),
        attachments,
    };
    let rfi = ctx
        .store
        .add_rfi(&project_id, draft, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Created RFI {} {}",
        style("✓").green(),
        style(format!("#{}", rfi.rfi_number)).cyan(),
        rfi.subject
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_rfi(&ctx.store, &project_id, &args.reference)?;
    let rfi = ctx.store.rfi(&id).map_err(|e| miette!("{}", e))?;

    if global.format != OutputFormat::Auto {
        return helpers::print_record(rfi, &rfi.id, global.format);
    }

    println!(
        "{} {}  [{}]",
        style(format!("RFI #{}", rfi.rfi_number)).bold(),
        style(&rfi.subject).bold(),
        rfi.status
    );
    println!(
        "Due: {}   Manager: {}   From: {}",
        helpers::fmt_date(rfi.due_date),
        helpers::contact_label(&ctx.store, rfi.rfi_manager.as_ref()),
        helpers::contact_label(&ctx.store, rfi.received_from.as_ref())
    );
    println!(
        "Contractor: {}   Spec: {}   Drawing: {}",
        helpers::company_label(&ctx.store, rfi.responsible_contractor.as_ref()),
        helpers::spec_label(&ctx.store, rfi.specification.as_ref()),
        if rfi.drawing_number.is_empty() {
            "-"
        } else {
            rfi.drawing_number.as_str()
        }
    );
    if !rfi.assignees.is_empty() {
        let names: Vec<String> = rfi
            .assignees
            .iter()
            .map(|id| helpers::contact_label(&ctx.store, Some(id)))
            .collect();
        println!("Assignees: {}", names.join(", "));
    }
    if !rfi.question.is_empty() {
        println!("\n{}", style("Question").bold());
        for line in rfi.question.lines() {
            println!("  {}", line);
        }
    }
    if !rfi.attachments.is_empty() {
        println!("\n{}", style("Attachments").bold());
        for attachment in &rfi.attachments {
            println!(
                "  {} ({})",
                attachment.name,
                style(helpers::fmt_size(attachment.size)).dim()
            );
        }
    }
    println!("\n{} ({})", style("Responses").bold(), rfi.responses.len());
    for response in &rfi.responses {
        println!(
            "  [{}] {}",
            style(helpers::fmt_timestamp(&response.created_at)).dim(),
            response.author_id
        );
        for line in response.text.lines() {
            println!("    {}", line);
        }
    }
    Ok(())
}

fn run_respond(args: RespondArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_rfi(&ctx.store, &project_id, &args.reference)?;

    let rfi = ctx
        .store
        .add_rfi_response(&id, &args.text, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Added response to RFI {} ({} total)",
        style("✓").green(),
        style(format!("#{}", rfi.rfi_number)).cyan(),
        rfi.responses.len()
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_rfi(&ctx.store, &project_id, &args.reference)?;

    let status = args
        .status
        .as_deref()
        .map(str::parse::<RfiStatus>)
        .transpose()
        .map_err(|e: String| miette!(e))?;
    let manager = args
        .manager
        .as_deref()
        .map(|r| helpers::resolve_contact(&ctx.store, &project_id, r))
        .transpose()?;
    let received_from = args
        .from
        .as_deref()
        .map(|r| helpers::resolve_contact(&ctx.store, &project_id, r))
        .transpose()?;
    let assignees = if args.assignees.is_empty() {
        None
    } else {
        Some(resolve_contacts(&ctx.store, &project_id, &args.assignees)?)
    };
    let distribution_list = if args.distribution.is_empty() {
        None
    } else {
        Some(resolve_contacts(
            &ctx.store,
            &project_id,
            &args.distribution,
        )?)
    };
    let responsible_contractor = args
        .contractor
        .as_deref()
        .map(|r| helpers::resolve_company(&ctx.store, &project_id, r))
        .transpose()?;
    let specification = args
        .spec
        .as_deref()
        .map(|r| helpers::resolve_spec_section(&ctx.store, &project_id, r))
        .transpose()?;

    let patch = RfiPatch {
        subject: args.subject,
        question: args.question,
        status,
        due_date: args.due.as_deref().map(helpers::parse_date).transpose()?,
        rfi_manager: manager,
        received_from,
        assignees,
        distribution_list,
        responsible_contractor,
        specification,
        drawing_number: args.drawing,
        attachments: None,
    };
    let rfi = ctx
        .store
        .update_rfi(&id, patch, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated RFI {}",
        style("✓").green(),
        style(format!("#{}", rfi.rfi_number)).cyan()
    );
    Ok(())
}

fn run_close(args: CloseArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_rfi(&ctx.store, &project_id, &args.reference)?;

    let patch = RfiPatch {
        status: Some(RfiStatus::Closed),
        ..Default::default()
    };
    let rfi = ctx
        .store
        .update_rfi(&id, patch, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Closed RFI {}",
        style("✓").green(),
        style(format!("#{}", rfi.rfi_number)).cyan()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_rfi(&ctx.store, &project_id, &args.reference)?;
    let rfi = ctx.store.rfi(&id).map_err(|e| miette!("{}", e))?;
    let label = format!("#{} {}", rfi.rfi_number, rfi.subject);

    if !helpers::confirm(&format!("Delete RFI {}?", label), global.yes)? {
        println!("Aborted.");
        return Ok(());
    }
    ctx.store.delete_rfi(&id).map_err(|e| miette!("{}", e))?;
    println!("{} Deleted RFI {}", style("✓").green(), style(label).cyan());
    Ok(())
}
