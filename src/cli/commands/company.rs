//! `sitedesk company` commands - Directory companies

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::entities::{DirectoryCompanyDraft, DirectoryCompanyPatch};

#[derive(clap::Subcommand)]
pub enum CompanyCommands {
    /// List directory companies of the active project
    List(ListArgs),
    /// Add a company
    Add(AddArgs),
    /// Edit a company
    Edit(EditArgs),
    /// Remove a company
    Remove(RemoveArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Company name
    pub name: String,

    /// Business type, e.g. electrical or plumbing
    #[arg(long = "type")]
    pub company_type: Option<String>,

    /// Primary contact person
    #[arg(long)]
    pub contact: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Company id or name
    pub reference: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// Business type
    #[arg(long = "type")]
    pub company_type: Option<String>,

    /// Primary contact person
    #[arg(long)]
    pub contact: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Company id or name
    pub reference: String,
}

pub fn run(cmd: CompanyCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CompanyCommands::List(args) => run_list(args, global),
        CompanyCommands::Add(args) => run_add(args, global),
        CompanyCommands::Edit(args) => run_edit(args, global),
        CompanyCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(_args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let companies = ctx.store.project_dir_companies(&project_id);

    if companies.is_empty() {
        println!("No companies found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:<28} {:<16} {:<22} {:<16}",
                style("NAME").bold(),
                style("TYPE").bold(),
                style("CONTACT").bold(),
                style("PHONE").bold()
            );
            println!("{}", "-".repeat(84));
            for company in &companies {
                println!(
                    "{:<28} {:<16} {:<22} {:<16}",
                    helpers::truncate_str(&company.name, 27),
                    helpers::truncate_str(&company.company_type, 15),
                    helpers::truncate_str(&company.contact, 21),
                    company.phone
                );
            }
            println!("\n{} company(ies)", companies.len());
        }
        OutputFormat::Csv => {
            println!("id,name,type,contact,email,phone");
            for company in &companies {
                println!(
                    "{},{},{},{},{},{}",
                    company.id,
                    helpers::escape_csv(&company.name),
                    helpers::escape_csv(&company.company_type),
                    helpers::escape_csv(&company.contact),
                    helpers::escape_csv(&company.email),
                    helpers::escape_csv(&company.phone)
                );
            }
        }
        OutputFormat::Id => {
            for company in &companies {
                println!("{}", company.id);
            }
        }
        _ => helpers::print_records(&companies, global.format)?,
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;

    let draft = DirectoryCompanyDraft {
        name: args.name,
        company_type: args.company_type.unwrap_or_default(),
        contact: args.contact.unwrap_or_default(),
        email: args.email.unwrap_or_default(),
        phone: args.phone.unwrap_or_default(),
    };
    let company = ctx
        .store
        .add_dir_company(&project_id, draft)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Added company {}",
        style("✓").green(),
        style(&company.name).cyan()
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_company(&ctx.store, &project_id, &args.reference)?;

    let patch = DirectoryCompanyPatch {
        name: args.name,
        company_type: args.company_type,
        contact: args.contact,
        email: args.email,
        phone: args.phone,
    };
    let company = ctx
        .store
        .update_dir_company(&id, patch)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated company {}",
        style("✓").green(),
        style(&company.name).cyan()
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_company(&ctx.store, &project_id, &args.reference)?;
    let company = ctx
        .store
        .delete_dir_company(&id)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Removed company {}",
        style("✓").green(),
        style(&company.name).cyan()
    );
    Ok(())
}
