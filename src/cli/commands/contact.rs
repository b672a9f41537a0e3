//! `sitedesk contact` commands - Directory contacts

use console::style;
use miette::{miette, IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::entities::{DirectoryUserDraft, DirectoryUserPatch, Permission};

#[derive(clap::Subcommand)]
pub enum ContactCommands {
    /// List directory contacts of the active project
    List(ListArgs),
    /// Add a contact
    Add(AddArgs),
    /// Edit a contact
    Edit(EditArgs),
    /// Remove a contact
    Remove(RemoveArgs),
    /// Import contacts from a CSV file
    Import(ImportArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Email address
    pub email: String,

    /// First name
    #[arg(long)]
    pub first: Option<String>,

    /// Last name
    #[arg(long)]
    pub last: Option<String>,

    /// Permission level: architect/engineer, owner/client, subcontractor,
    /// company employee
    #[arg(long, default_value = "company employee")]
    pub permission: String,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Contact id, email, or full name
    pub reference: String,

    /// First name
    #[arg(long)]
    pub first: Option<String>,

    /// Last name
    #[arg(long)]
    pub last: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Permission level
    #[arg(long)]
    pub permission: Option<String>,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Contact id, email, or full name
    pub reference: String,
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// CSV file with first_name, last_name, email, permission columns
    pub file: PathBuf,

    /// Skip rows that fail instead of aborting
    #[arg(long)]
    pub skip_errors: bool,
}

pub fn run(cmd: ContactCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ContactCommands::List(args) => run_list(args, global),
        ContactCommands::Add(args) => run_add(args, global),
        ContactCommands::Edit(args) => run_edit(args, global),
        ContactCommands::Remove(args) => run_remove(args, global),
        ContactCommands::Import(args) => run_import(args, global),
    }
}

fn run_list(_args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let contacts = ctx.store.project_dir_users(&project_id);

    if contacts.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:<26} {:<30} {:<22}",
                style("NAME").bold(),
                style("EMAIL").bold(),
                style("PERMISSION").bold()
            );
            println!("{}", "-".repeat(80));
            for contact in &contacts {
                println!(
                    "{:<26} {:<30} {:<22}",
                    helpers::truncate_str(&contact.display_name(), 25),
                    helpers::truncate_str(&contact.email, 29),
                    contact.permission.to_string()
                );
            }
            println!("\n{} contact(s)", contacts.len());
        }
        OutputFormat::Csv => {
            println!("id,first_name,last_name,email,permission");
            for contact in &contacts {
                println!(
                    "{},{},{},{},{}",
                    contact.id,
                    helpers::escape_csv(&contact.first_name),
                    helpers::escape_csv(&contact.last_name),
                    helpers::escape_csv(&contact.email),
                    helpers::escape_csv(&contact.permission.to_string())
                );
            }
        }
        OutputFormat::Id => {
            for contact in &contacts {
                println!("{}", contact.id);
            }
        }
        _ => helpers::print_records(&contacts, global.format)?,
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let permission: Permission = args.permission.parse().map_err(|e: String| miette!(e))?;

    let draft = DirectoryUserDraft {
        first_name: args.first.unwrap_or_default(),
        last_name: args.last.unwrap_or_default(),
        email: args.email,
        permission,
    };
    let contact = ctx
        .store
        .add_dir_user(&project_id, draft)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Added contact {} ({})",
        style("✓").green(),
        style(contact.display_name()).cyan(),
        contact.email
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_contact(&ctx.store, &project_id, &args.reference)?;

    let permission = args
        .permission
        .as_deref()
        .map(str::parse::<Permission>)
        .transpose()
        .map_err(|e: String| miette!(e))?;
    let patch = DirectoryUserPatch {
        first_name: args.first,
        last_name: args.last,
        email: args.email,
        permission,
    };
    let contact = ctx
        .store
        .update_dir_user(&id, patch)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Updated contact {}",
        style("✓").green(),
        style(contact.display_name()).cyan()
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_contact(&ctx.store, &project_id, &args.reference)?;
    let contact = ctx
        .store
        .delete_dir_user(&id)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Removed contact {}",
        style("✓").green(),
        style(contact.display_name()).cyan()
    );
    Ok(())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;

    let file = File::open(&args.file).into_diagnostic()?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let first_col = col("first_name");
    let last_col = col("last_name");
    let email_col = col("email")
        .ok_or_else(|| miette!("CSV file has no 'email' column (found: {:?})", headers))?;
    let permission_col = col("permission");

    let mut created = 0usize;
    let mut skipped = 0usize;
    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                if args.skip_errors {
                    skipped += 1;
                    continue;
                }
                return Err(miette!("Import aborted at row {}", row_num));
            }
        };

        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        let email = field(Some(email_col));
        if email.is_empty() {
            eprintln!("{} Row {}: missing email", style("✗").red(), row_num);
            if args.skip_errors {
                skipped += 1;
                continue;
            }
            return Err(miette!("Import aborted at row {}", row_num));
        }

        let permission = match field(permission_col).as_str() {
            "" => Permission::default(),
            raw => match raw.parse::<Permission>() {
                Ok(permission) => permission,
                Err(e) => {
                    eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                    if args.skip_errors {
                        skipped += 1;
                        continue;
                    }
                    return Err(miette!("Import aborted at row {}", row_num));
                }
            },
        };

        let draft = DirectoryUserDraft {
            first_name: field(first_col),
            last_name: field(last_col),
            email,
            permission,
        };
        ctx.store
            .add_dir_user(&project_id, draft)
            .map_err(|e| miette!("{}", e))?;
        created += 1;
    }

    println!(
        "{} Imported {} contact(s){}",
        style("✓").green(),
        created,
        if skipped > 0 {
            format!(", skipped {} row(s)", skipped)
        } else {
            String::new()
        }
    );
    Ok(())
}
