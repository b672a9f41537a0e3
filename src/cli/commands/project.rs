//! `sitedesk project` commands - Project management

use console::style;
use miette::{miette, IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{self, CliContext};
use crate::core::{RecordId, Store};
use crate::entities::{ProjectDraft, ProjectPatch, ProjectStage};

#[derive(clap::Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List(ListArgs),
    /// Create a new project
    New(NewArgs),
    /// Show a project record
    Show(ShowArgs),
    /// Edit project fields
    Edit(EditArgs),
    /// Delete a project and every record scoped to it
    Delete(DeleteArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Only projects you are a member of
    #[arg(long)]
    pub mine: bool,
}

#[derive(clap::Args)]
pub struct NewArgs {
    /// Project name
    pub name: Option<String>,

    /// Prompt for fields interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Job number
    #[arg(long)]
    pub job_number: Option<String>,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// State
    #[arg(long)]
    pub state: Option<String>,

    /// Zip code
    #[arg(long)]
    pub zip: Option<String>,

    /// County
    #[arg(long)]
    pub county: Option<String>,

    /// Stage: bidding, pre-construction, course of construction,
    /// post-construction, warranty
    #[arg(long, default_value = "bidding")]
    pub stage: String,

    /// Market sector, e.g. healthcare or education
    #[arg(long)]
    pub sector: Option<String>,

    /// Contract value in dollars
    #[arg(long, default_value_t = 0.0)]
    pub value: f64,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Estimated start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Estimated completion date (YYYY-MM-DD)
    #[arg(long)]
    pub completion: Option<String>,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Project id or name (default: the active project)
    pub reference: Option<String>,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Project id or name (default: the active project)
    pub reference: Option<String>,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// Job number
    #[arg(long)]
    pub job_number: Option<String>,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// State
    #[arg(long)]
    pub state: Option<String>,

    /// Zip code
    #[arg(long)]
    pub zip: Option<String>,

    /// County
    #[arg(long)]
    pub county: Option<String>,

    /// Stage
    #[arg(long)]
    pub stage: Option<String>,

    /// Market sector
    #[arg(long)]
    pub sector: Option<String>,

    /// Contract value in dollars
    #[arg(long)]
    pub value: Option<f64>,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Estimated start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Actual start date (YYYY-MM-DD)
    #[arg(long)]
    pub actual_start: Option<String>,

    /// Estimated completion date (YYYY-MM-DD)
    #[arg(long)]
    pub completion: Option<String>,

    /// Projected finish date (YYYY-MM-DD)
    #[arg(long)]
    pub projected_finish: Option<String>,

    /// Warranty start date (YYYY-MM-DD)
    #[arg(long)]
    pub warranty_start: Option<String>,

    /// Warranty end date (YYYY-MM-DD)
    #[arg(long)]
    pub warranty_end: Option<String>,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Project id or name (default: the active project)
    pub reference: Option<String>,
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List(args) => run_list(args, global),
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::Edit(args) => run_edit(args, global),
        ProjectCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let projects = if args.mine {
        ctx.store.user_projects(&user)
    } else {
        ctx.store.projects().iter().collect()
    };

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:<16} {:<28} {:<24} {:<16} {:>12}",
                style("ID").bold(),
                style("NAME").bold(),
                style("STAGE").bold(),
                style("CITY").bold(),
                style("VALUE").bold()
            );
            println!("{}", "-".repeat(100));
            for project in &projects {
                println!(
                    "{:<16} {:<28} {:<24} {:<16} {:>12}",
                    helpers::short_id(&project.id),
                    helpers::truncate_str(&project.name, 27),
                    project.stage.to_string(),
                    helpers::truncate_str(&project.city, 15),
                    helpers::fmt_money(project.contract_value)
                );
            }
            println!("\n{} project(s)", projects.len());
        }
        OutputFormat::Csv => {
            println!("id,name,job_number,stage,city,state,value");
            for project in &projects {
                println!(
                    "{},{},{},{},{},{},{}",
                    project.id,
                    helpers::escape_csv(&project.name),
                    helpers::escape_csv(&project.job_number),
                    helpers::escape_csv(&project.stage.to_string()),
                    helpers::escape_csv(&project.city),
                    helpers::escape_csv(&project.state),
                    project.contract_value
                );
            }
        }
        OutputFormat::Id => {
            for project in &projects {
                println!("{}", project.id);
            }
        }
        _ => helpers::print_records(&projects, global.format)?,
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();

    let name: String;
    let stage: String;
    if args.interactive || args.name.is_none() {
        use dialoguer::{Input, Select};

        name = Input::new()
            .with_prompt("Project name")
            .interact_text()
            .into_diagnostic()?;

        let stage_options = [
            "bidding",
            "pre-construction",
            "course of construction",
            "post-construction",
            "warranty",
        ];
        let stage_idx = Select::new()
            .with_prompt("Stage")
            .items(&stage_options)
            .default(0)
            .interact()
            .into_diagnostic()?;
        stage = stage_options[stage_idx].to_string();
    } else {
        name = args
            .name
            .ok_or_else(|| miette!("Project name is required"))?;
        stage = args.stage;
    }

    let stage: ProjectStage = stage.parse().map_err(|e: String| miette!(e))?;
    let start = args.start.as_deref().map(helpers::parse_date).transpose()?;
    let completion = args
        .completion
        .as_deref()
        .map(helpers::parse_date)
        .transpose()?;

    let draft = ProjectDraft {
        name,
        job_number: args.job_number.unwrap_or_default(),
        address: args.address.unwrap_or_default(),
        city: args.city.unwrap_or_default(),
        state: args.state.unwrap_or_default(),
        zip: args.zip.unwrap_or_default(),
        county: args.county.unwrap_or_default(),
        stage,
        sector: args.sector.unwrap_or_default(),
        contract_value: args.value,
        description: args.description.unwrap_or_default(),
        start_date: start,
        completion_date: completion,
    };

    let project = ctx
        .store
        .add_project(draft, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Created project {} ({})",
        style("✓").green(),
        style(&project.name).cyan(),
        project.id
    );
    println!("  You were added as its administrator.");
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let id = match &args.reference {
        Some(reference) => helpers::resolve_project(&ctx.store, reference)?,
        None => helpers::active_project(&ctx, global)?,
    };
    let project = ctx.store.project(&id).map_err(|e| miette!("{}", e))?;
    helpers::print_record(project, &project.id, global.format)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let user = ctx.user();
    let id = match &args.reference {
        Some(reference) => helpers::resolve_project(&ctx.store, reference)?,
        None => helpers::active_project(&ctx, global)?,
    };

    let stage = args
        .stage
        .as_deref()
        .map(str::parse::<ProjectStage>)
        .transpose()
        .map_err(|e: String| miette!(e))?;

    let patch = ProjectPatch {
        name: args.name,
        job_number: args.job_number,
        address: args.address,
        city: args.city,
        state: args.state,
        zip: args.zip,
        county: args.county,
        stage,
        sector: args.sector,
        contract_value: args.value,
        description: args.description,
        start_date: args.start.as_deref().map(helpers::parse_date).transpose()?,
        actual_start_date: args
            .actual_start
            .as_deref()
            .map(helpers::parse_date)
            .transpose()?,
        completion_date: args
            .completion
            .as_deref()
            .map(helpers::parse_date)
            .transpose()?,
        projected_finish_date: args
            .projected_finish
            .as_deref()
            .map(helpers::parse_date)
            .transpose()?,
        warranty_start_date: args
            .warranty_start
            .as_deref()
            .map(helpers::parse_date)
            .transpose()?,
        warranty_end_date: args
            .warranty_end
            .as_deref()
            .map(helpers::parse_date)
            .transpose()?,
    };
    if patch.is_empty() {
        return Err(miette!("Nothing to update; pass at least one field flag"));
    }

    let project = ctx
        .store
        .update_project(&id, patch, &user)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated project {}",
        style("✓").green(),
        style(&project.name).cyan()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let id = match &args.reference {
        Some(reference) => helpers::resolve_project(&ctx.store, reference)?,
        None => helpers::active_project(&ctx, global)?,
    };
    let project = ctx.store.project(&id).map_err(|e| miette!("{}", e))?;
    let name = project.name.clone();
    let scoped = scoped_count(&ctx, &id);

    println!(
        "{} This removes the project and {} record(s) scoped to it.",
        style("Warning:").yellow().bold(),
        scoped
    );
    if !helpers::confirm(&format!("Delete project \"{}\"?", name), global.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    ctx.store.delete_project(&id).map_err(|e| miette!("{}", e))?;
    println!(
        "{} Deleted project {} and {} scoped record(s)",
        style("✓").green(),
        style(&name).cyan(),
        scoped
    );
    Ok(())
}

fn scoped_count(ctx: &CliContext, id: &RecordId) -> usize {
    let store: &Store = &ctx.store;
    store.project_members(id).len()
        + store.project_dir_users(id).len()
        + store.project_dir_companies(id).len()
        + store.project_groups(id).len()
        + store.project_documents(id).len()
        + store.project_tasks(id).len()
        + store.project_rfis(id).len()
        + store.project_submittals(id).len()
        + store.project_specifications(id).len()
        + store.project_activity(id).len()
}
