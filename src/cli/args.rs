//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    activity::ActivityArgs,
    company::CompanyCommands,
    completions::CompletionsArgs,
    contact::ContactCommands,
    doc::DocCommands,
    group::GroupCommands,
    init::InitArgs,
    member::MemberCommands,
    project::ProjectCommands,
    rfi::RfiCommands,
    spec::SpecCommands,
    status::StatusArgs,
    submittal::SubmittalCommands,
    task::TaskCommands,
};

#[derive(Parser)]
#[command(name = "sitedesk")]
#[command(author, version, about = "Construction project records from the command line")]
#[command(
    long_about = "Manage construction projects, RFIs, submittals, tasks, documents, and \
directory contacts in a local workspace backed by JSON blobs or SQLite."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Project id or name (default: workspace default_project)
    #[arg(long, short = 'p', global = true, env = "SITEDESK_PROJECT")]
    pub project: Option<String>,

    /// Workspace directory (default: auto-detect by finding .sitedesk/)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sitedesk workspace
    Init(InitArgs),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Project membership and roles
    #[command(subcommand)]
    Member(MemberCommands),

    /// Directory contacts (people)
    #[command(subcommand)]
    Contact(ContactCommands),

    /// Directory companies
    #[command(subcommand)]
    Company(CompanyCommands),

    /// Distribution groups
    #[command(subcommand)]
    Group(GroupCommands),

    /// Project document tree (folders and files)
    #[command(subcommand)]
    Doc(DocCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Request for Information management
    #[command(subcommand)]
    Rfi(RfiCommands),

    /// Submittal management
    #[command(subcommand)]
    Submittal(SubmittalCommands),

    /// Specification sections
    #[command(subcommand)]
    Spec(SpecCommands),

    /// Show the activity feed
    Activity(ActivityArgs),

    /// Show a workspace status dashboard
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, yaml for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Just IDs, one per line
    Id,
}
