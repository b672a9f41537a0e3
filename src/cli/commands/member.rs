//! `sitedesk member` commands - Project membership and roles

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::entities::member::ADMINISTRATOR;

#[derive(clap::Subcommand)]
pub enum MemberCommands {
    /// List members of the active project
    List(ListArgs),
    /// Add a member, or change the role of an existing one
    Add(AddArgs),
    /// Remove a member
    Remove(RemoveArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Account id of the user to add
    pub user_id: String,

    /// Role on the project
    #[arg(long, default_value = "member")]
    pub role: String,

    /// Shorthand for --role administrator
    #[arg(long, conflicts_with = "role")]
    pub admin: bool,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Account id of the user to remove
    pub user_id: String,
}

pub fn run(cmd: MemberCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MemberCommands::List(args) => run_list(args, global),
        MemberCommands::Add(args) => run_add(args, global),
        MemberCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(_args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let members = ctx.store.project_members(&project_id);

    if members.is_empty() {
        println!("No members found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:<28} {:<18} {:<18}",
                style("USER").bold(),
                style("ROLE").bold(),
                style("SINCE").bold()
            );
            println!("{}", "-".repeat(66));
            for member in &members {
                println!(
                    "{:<28} {:<18} {:<18}",
                    helpers::truncate_str(&member.user_id, 27),
                    member.role,
                    helpers::fmt_timestamp(&member.created_at)
                );
            }
            println!("\n{} member(s)", members.len());
        }
        OutputFormat::Csv => {
            println!("id,user_id,role,created_at");
            for member in &members {
                println!(
                    "{},{},{},{}",
                    member.id,
                    helpers::escape_csv(&member.user_id),
                    helpers::escape_csv(&member.role),
                    member.created_at.to_rfc3339()
                );
            }
        }
        OutputFormat::Id => {
            for member in &members {
                println!("{}", member.id);
            }
        }
        _ => helpers::print_records(&members, global.format)?,
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;

    let role = if args.admin {
        ADMINISTRATOR.to_string()
    } else {
        args.role
    };
    let existing = ctx.store.project_role(&project_id, &args.user_id).is_some();
    let member = ctx
        .store
        .add_member(&project_id, &args.user_id, &role)
        .map_err(|e| miette!("{}", e))?;

    if existing {
        println!(
            "{} Changed role of {} to {}",
            style("✓").green(),
            style(&member.user_id).cyan(),
            member.role
        );
    } else {
        println!(
            "{} Added {} as {}",
            style("✓").green(),
            style(&member.user_id).cyan(),
            member.role
        );
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let member = ctx
        .store
        .remove_member(&project_id, &args.user_id)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Removed {} from the project",
        style("✓").green(),
        style(&member.user_id).cyan()
    );
    Ok(())
}
