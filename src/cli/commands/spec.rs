//! `sitedesk spec` commands - Specification sections

use console::style;
use miette::{miette, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::entities::SpecificationPatch;

#[derive(clap::Subcommand)]
pub enum SpecCommands {
    /// List specification sections in section-number order
    List(ListArgs),
    /// Add a section
    Add(AddArgs),
    /// Edit a section
    Edit(EditArgs),
    /// Remove a section
    Remove(RemoveArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Section number, e.g. "09 91 23"
    pub number: String,

    /// Section title, e.g. "Interior Painting"
    pub title: String,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Section number or id
    pub reference: String,

    /// New section number
    #[arg(long)]
    pub number: Option<String>,

    /// New section title
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Section number or id
    pub reference: String,
}

pub fn run(cmd: SpecCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SpecCommands::List(args) => run_list(args, global),
        SpecCommands::Add(args) => run_add(args, global),
        SpecCommands::Edit(args) => run_edit(args, global),
        SpecCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(_args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let specs = ctx.store.project_specifications(&project_id);

    if specs.is_empty() {
        println!("No specification sections found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:<14} {:<50}",
                style("SECTION").bold(),
                style("TITLE").bold()
            );
            println!("{}", "-".repeat(64));
            for spec in &specs {
                println!(
                    "{:<14} {:<50}",
                    spec.number,
                    helpers::truncate_str(&spec.title, 49)
                );
            }
            println!("\n{} section(s)", specs.len());
        }
        OutputFormat::Csv => {
            println!("id,number,title");
            for spec in &specs {
                println!(
                    "{},{},{}",
                    spec.id,
                    helpers::escape_csv(&spec.number),
                    helpers::escape_csv(&spec.title)
                );
            }
        }
        OutputFormat::Id => {
            for spec in &specs {
                println!("{}", spec.id);
            }
        }
        _ => helpers::print_records(&specs, global.format)?,
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let spec = ctx
        .store
        .add_specification(&project_id, &args.number, &args.title)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Added section {} {}",
        style("✓").green(),
        style(&spec.number).cyan(),
        spec.title
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_spec_section(&ctx.store, &project_id, &args.reference)?;

    let patch = SpecificationPatch {
        number: args.number,
        title: args.title,
    };
    let spec = ctx
        .store
        .update_specification(&id, patch)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated section {} {}",
        style("✓").green(),
        style(&spec.number).cyan(),
        spec.title
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_spec_section(&ctx.store, &project_id, &args.reference)?;
    let spec = ctx
        .store
        .delete_specification(&id)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Removed section {} {}",
        style("✓").green(),
        style(&spec.number).cyan(),
        spec.title
    );
    Ok(())
}
