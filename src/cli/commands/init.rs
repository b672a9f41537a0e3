//! `sitedesk init` command - Initialize a new workspace

use console::style;
use miette::{miette, IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::core::{Storage, Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Storage backend: local or sqlite
    #[arg(long, default_value = "local")]
    pub storage: String,
}

pub fn run(args: InitArgs, _global: &GlobalOpts) -> Result<()> {
    let storage: Storage = args.storage.parse().map_err(|e: String| miette!(e))?;

    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    match Workspace::init(&path, storage) {
        Ok(workspace) => {
            println!(
                "{} Initialized sitedesk workspace in {}",
                style("✓").green(),
                style(workspace.sitedesk_dir().display()).cyan()
            );
            println!("  Storage backend: {}", storage);
            println!();
            println!("Next steps:");
            println!("  sitedesk project new \"My Project\"    create your first project");
            println!("  sitedesk status                      workspace dashboard");
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(existing)) => {
            println!(
                "{} Workspace already exists at {}",
                style("!").yellow(),
                existing.display()
            );
            Ok(())
        }
        Err(e) => Err(e).into_diagnostic(),
    }
}
