//! `sitedesk doc` commands - Project document tree

use console::style;
use miette::{miette, IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers;
use crate::core::{RecordId, Store};

#[derive(clap::Subcommand)]
pub enum DocCommands {
    /// List one folder level (default: the project root)
    List(ListArgs),
    /// Render the whole document tree
    Tree(TreeArgs),
    /// Create a folder
    Mkdir(MkdirArgs),
    /// Upload a file into the tree
    Add(AddArgs),
    /// Rename a folder or file
    Rename(RenameArgs),
    /// Move a node to another folder or to the root
    Move(MoveArgs),
    /// Deep-copy a node, " (copy)" appended to the clone's name
    Copy(CopyArgs),
    /// Delete a node and everything beneath it
    Delete(DeleteArgs),
    /// Show the folder path leading to a node
    Path(PathArgs),
    /// Export a file's content out of the workspace
    Export(ExportArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Folder id or path (default: the project root)
    pub folder: Option<String>,
}

#[derive(clap::Args)]
pub struct TreeArgs {}

#[derive(clap::Args)]
pub struct MkdirArgs {
    /// Folder name
    pub name: String,

    /// Containing folder id or path (default: the project root)
    #[arg(long = "in")]
    pub parent: Option<String>,
}

#[derive(clap::Args)]
pub struct AddArgs {
    /// File to upload
    pub file: PathBuf,

    /// Containing folder id or path (default: the project root)
    #[arg(long = "in")]
    pub parent: Option<String>,

    /// Display name (default: the file name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(clap::Args)]
pub struct RenameArgs {
    /// Document id or path
    pub reference: String,

    /// New name
    pub name: String,
}

#[derive(clap::Args)]
pub struct MoveArgs {
    /// Document id or path
    pub reference: String,

    /// Destination folder id or path
    #[arg(long)]
    pub to: Option<String>,

    /// Move to the project root
    #[arg(long, conflicts_with = "to")]
    pub root: bool,
}

#[derive(clap::Args)]
pub struct CopyArgs {
    /// Document id or path
    pub reference: String,

    /// Destination folder id or path
    #[arg(long)]
    pub to: Option<String>,

    /// Copy to the project root
    #[arg(long, conflicts_with = "to")]
    pub root: bool,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Document id or path
    pub reference: String,
}

#[derive(clap::Args)]
pub struct PathArgs {
    /// Document id or path
    pub reference: String,
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Document id or path
    pub reference: String,

    /// Destination path (default: the file's name in the current directory)
    pub dest: Option<PathBuf>,
}

pub fn run(cmd: DocCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DocCommands::List(args) => run_list(args, global),
        DocCommands::Tree(args) => run_tree(args, global),
        DocCommands::Mkdir(args) => run_mkdir(args, global),
        DocCommands::Add(args) => run_add(args, global),
        DocCommands::Rename(args) => run_rename(args, global),
        DocCommands::Move(args) => run_move(args, global),
        DocCommands::Copy(args) => run_copy(args, global),
        DocCommands::Delete(args) => run_delete(args, global),
        DocCommands::Path(args) => run_path(args, global),
        DocCommands::Export(args) => run_export(args, global),
    }
}

/// Resolve an optional destination folder reference, `None` for the root
fn resolve_parent(
    store: &Store,
    project_id: &RecordId,
    reference: Option<&String>,
) -> Result<Option<RecordId>> {
    match reference {
        Some(reference) => Ok(Some(helpers::resolve_document(
            store, project_id, reference,
        )?)),
        None => Ok(None),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let parent = resolve_parent(&ctx.store, &project_id, args.folder.as_ref())?;
    let docs = ctx.store.documents_in(&project_id, parent.as_ref());

    if docs.is_empty() {
        println!("No documents found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Auto => {
            println!(
                "{:<16} {:<34} {:<8} {:>10}   {:<16}",
                style("ID").bold(),
                style("NAME").bold(),
                style("TYPE").bold(),
                style("SIZE").bold(),
                style("CREATED").bold()
            );
            println!("{}", "-".repeat(90));
            for doc in &docs {
                let size = doc
                    .file_data
                    .as_ref()
                    .map(|f| helpers::fmt_size(f.size))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<16} {:<34} {:<8} {:>10}   {:<16}",
                    helpers::short_id(&doc.id),
                    helpers::truncate_str(&doc.name, 33),
                    doc.kind.to_string(),
                    size,
                    helpers::fmt_timestamp(&doc.created_at)
                );
            }
            println!("\n{} node(s)", docs.len());
        }
        OutputFormat::Csv => {
            println!("id,name,type,size,created_at");
            for doc in &docs {
                let size = doc
                    .file_data
                    .as_ref()
                    .map(|f| f.size.to_string())
                    .unwrap_or_default();
                println!(
                    "{},{},{},{},{}",
                    doc.id,
                    helpers::escape_csv(&doc.name),
                    doc.kind,
                    size,
                    doc.created_at.to_rfc3339()
                );
            }
        }
        OutputFormat::Id => {
            for doc in &docs {
                println!("{}", doc.id);
            }
        }
        _ => helpers::print_records(&docs, global.format)?,
    }
    Ok(())
}

fn run_tree(_args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let project = ctx.store.project(&project_id).map_err(|e| miette!("{}", e))?;

    if ctx.store.project_documents(&project_id).is_empty() {
        println!("No documents found.");
        return Ok(());
    }
    println!("{}", style(&project.name).bold());
    render_level(&ctx.store, &project_id, None, "");
    Ok(())
}

fn render_level(store: &Store, project_id: &RecordId, parent: Option<&RecordId>, prefix: &str) {
    let level = store.documents_in(project_id, parent);
    let count = level.len();
    for (i, doc) in level.iter().enumerate() {
        let last = i + 1 == count;
        let branch = if last { "└── " } else { "├── " };
        if doc.is_folder() {
            println!("{}{}{}", prefix, branch, style(&doc.name).blue().bold());
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_level(store, project_id, Some(&doc.id), &child_prefix);
        } else {
            let size = doc
                .file_data
                .as_ref()
                .map(|f| helpers::fmt_size(f.size))
                .unwrap_or_default();
            println!("{}{}{} {}", prefix, branch, doc.name, style(size).dim());
        }
    }
}

fn run_mkdir(args: MkdirArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let parent = resolve_parent(&ctx.store, &project_id, args.parent.as_ref())?;

    let folder = ctx
        .store
        .add_folder(&project_id, parent.as_ref(), &args.name)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Created folder {} ({})",
        style("✓").green(),
        style(&folder.name).cyan(),
        folder.id
    );
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let parent = resolve_parent(&ctx.store, &project_id, args.parent.as_ref())?;

    let file_store = ctx.workspace.file_store().into_diagnostic()?;
    let mut payload = file_store.put(&args.file).into_diagnostic()?;
    if let Some(name) = args.name {
        payload.name = name;
    }

    let size = payload.size;
    let doc = ctx
        .store
        .add_file(&project_id, parent.as_ref(), payload)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Added file {} ({}, {})",
        style("✓").green(),
        style(&doc.name).cyan(),
        helpers::fmt_size(size),
        doc.id
    );
    Ok(())
}

fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_document(&ctx.store, &project_id, &args.reference)?;

    let doc = ctx
        .store
        .rename_document(&id, &args.name)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Renamed to {}",
        style("✓").green(),
        style(&doc.name).cyan()
    );
    Ok(())
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_document(&ctx.store, &project_id, &args.reference)?;

    if args.to.is_none() && !args.root {
        return Err(miette!("Pass --to <folder> or --root"));
    }
    let dest = resolve_parent(&ctx.store, &project_id, args.to.as_ref())?;

    let doc = ctx
        .store
        .move_document(&id, dest.as_ref())
        .map_err(|e| miette!("{}", e))?;
    let dest_label = match dest {
        Some(parent_id) => ctx
            .store
            .document(&parent_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|_| parent_id.to_string()),
        None => "the project root".to_string(),
    };
    println!(
        "{} Moved {} to {}",
        style("✓").green(),
        style(&doc.name).cyan(),
        dest_label
    );
    Ok(())
}

fn run_copy(args: CopyArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_document(&ctx.store, &project_id, &args.reference)?;

    let dest = if args.root {
        None
    } else {
        resolve_parent(&ctx.store, &project_id, args.to.as_ref())?
    };

    let clones = ctx
        .store
        .copy_document(&id, dest.as_ref())
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Copied {} node(s) as {}",
        style("✓").green(),
        clones.len(),
        style(&clones[0].name).cyan()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_document(&ctx.store, &project_id, &args.reference)?;
    let doc = ctx.store.document(&id).map_err(|e| miette!("{}", e))?;
    let name = doc.name.clone();

    let prompt = if doc.is_folder() {
        format!("Delete folder \"{}\" and everything beneath it?", name)
    } else {
        format!("Delete file \"{}\"?", name)
    };
    if !helpers::confirm(&prompt, global.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = ctx
        .store
        .delete_document(&id)
        .map_err(|e| miette!("{}", e))?;
    println!(
        "{} Deleted {} ({} node(s))",
        style("✓").green(),
        style(&name).cyan(),
        removed.len()
    );
    Ok(())
}

fn run_path(args: PathArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_document(&ctx.store, &project_id, &args.reference)?;

    let chain = ctx.store.breadcrumb(&id);
    let names: Vec<&str> = chain.iter().map(|d| d.name.as_str()).collect();
    println!("{}", names.join(" / "));
    Ok(())
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = helpers::open_store(global)?;
    let project_id = helpers::active_project(&ctx, global)?;
    let id = helpers::resolve_document(&ctx.store, &project_id, &args.reference)?;
    let doc = ctx.store.document(&id).map_err(|e| miette!("{}", e))?;

    let payload = doc
        .file_data
        .as_ref()
        .ok_or_else(|| miette!("'{}' is a folder, not a file", doc.name))?;
    let dest = args.dest.unwrap_or_else(|| PathBuf::from(&payload.name));

    let file_store = ctx.workspace.file_store().into_diagnostic()?;
    file_store
        .export(&payload.digest, &dest)
        .into_diagnostic()?;
    println!(
        "{} Exported {} to {}",
        style("✓").green(),
        style(&doc.name).cyan(),
        dest.display()
    );
    Ok(())
}
