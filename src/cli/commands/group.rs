//! `sitedesk group` commands - Distribution groups

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::core::{RecordId, Store};
use crate::entities::{DistributionGroupDraft, DistributionGroupPatch};

#[derive(clap::Subcommand)]
pub enum GroupCommands {
    /// List distribution groups of the active project
    List(ListArgs),
    /// Create a group
    Add(AddArgs),
    /// Edit a group's name or membership
    Edit(EditArgs),
    /// Remove a group
    Remove(RemoveArgs),
    /// Show a group's members
    Show(ShowArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Group name
    pub name: String,

    /// Contacts to include (id, email, or full name; repeatable)
    #[arg(long = "member", short = 'm')]
    pub members: Vec<String>,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Group id or name
    pub reference: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// Replace the membership with these contacts (repeatable)
    #[arg(long = "member", short = 'm')]
    pub members: Vec<String>,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Group id or name
    pub reference: String,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Group id or name
    pub reference: String,
}

pub fn run(cmd: GroupCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        GroupCommands::List(args) => run_list(args, global),
        GroupCommands::Add(args) => run_add(args, global),
        GroupCommands::Edit(args) => run_edit(args, global),
        GroupCommands::Remove(args) => run_remove(args, global),
        GroupCommands::Show(args) => run_show(args, global),
    }
}

fn resolve_members(
    store: &Store,
    project_id: &RecordId,
    references: &[String],
) -> Result<Vec<RecordId>> {
    references
        .iter()
        .map(|reference| helpers::resolve_contact(store, project_id, reference))
        .collect()
}

fn run_list(_args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let groups = ctx.store.project_groups(&project_id);

    if groups.is_empty() {
        println!("No groups found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:<30} {:>8}   {:<18}",
                style("NAME").bold(),
                style("MEMBERS").bold(),
                style("CREATED").bold()
            );
            println!("{}", "-".repeat(60));
            for group in &groups {
                println!(
                    "{:<30} {:>8}   {:<18}",
                    helpers::truncate_str(&group.name, 29),
                    group.member_ids.len(),
                    helpers::fmt_timestamp(&group.created_at)
                );
            }
            println!("\n{} group(s)", groups.len());
        }
        OutputFormat::Csv => {
            println!("id,name,members");
            for group in &groups {
                println!(
                    "{},{},{}",
                    group.id,
                    helpers::escape_csv(&group.name),
                    group.member_ids.len()
                );
            }
        }
        OutputFormat::Id => {
            for group in &groups {
                println!("{}", group.id);
            }
        }
        _ => helpers::print_records(&groups, global.format)?,
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let member_ids = resolve_members(&ctx.store, &project_id, &args.members)?;

    let draft = DistributionGroupDraft {
        name: args.name,
        member_ids,
    };
    let group = ctx
        .store
        .add_group(&project_id, draft)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Created group {} with {} member(s)",
        style("✓").green(),
        style(&group.name).cyan(),
        group.member_ids.len()
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_group(&ctx.store, &project_id, &args.reference)?;

    let member_ids = if args.members.is_empty() {
        None
    } else {
        Some(resolve_members(&ctx.store, &project_id, &args.members)?)
    };
    let patch = DistributionGroupPatch {
        name: args.name,
        member_ids,
    };
    let group = ctx
        .store
        .update_group(&id, patch)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated group {}",
        style("✓").green(),
        style(&group.name).cyan()
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_group(&ctx.store, &project_id, &args.reference)?;
    let group = ctx.store.delete_group(&id).map_err(|e| miette!("{}", e))?;
    println!(
        "{} Removed group {}",
        style("✓").green(),
        style(&group.name).cyan()
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_group(&ctx.store, &project_id, &args.reference)?;
    let group = ctx.store.group(&id).map_err(|e| miette!("{}", e))?;

    if global.format != OutputFormat::Auto {
        return helpers::print_record(group, &group.id, global.format);
    }

    println!("{}", style(&group.name).bold());
    if group.member_ids.is_empty() {
        println!("  (no members)");
        return Ok(());
    }
    for member_id in &group.member_ids {
        match ctx.store.dir_user(member_id) {
            Ok(contact) => println!("  {} <{}>", contact.display_name(), contact.email),
            Err(_) => println!("  —"),
        }
    }
    Ok(())
}
