use clap::Parser;
use miette::Result;
use sitedesk::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => sitedesk::cli::commands::init::run(args, &global),
        Commands::Project(cmd) => sitedesk::cli::commands::project::run(cmd, &global),
        Commands::Member(cmd) => sitedesk::cli::commands::member::run(cmd, &global),
        Commands::Contact(cmd) => sitedesk::cli::commands::contact::run(cmd, &global),
        Commands::Company(cmd) => sitedesk::cli::commands::company::run(cmd, &global),
        Commands::Group(cmd) => sitedesk::cli::commands::group::run(cmd, &global),
        Commands::Doc(cmd) => sitedesk::cli::commands::doc::run(cmd, &global),
        Commands::Task(cmd) => sitedesk::cli::commands::task::run(cmd, &global),
        Commands::Rfi(cmd) => sitedesk::cli::commands::rfi::run(cmd, &global),
        Commands::Submittal(cmd) => sitedesk::cli::commands::submittal::run(cmd, &global),
        Commands::Spec(cmd) => sitedesk::cli::commands::spec::run(cmd, &global),
        Commands::Activity(args) => sitedesk::cli::commands::activity::run(args, &global),
        Commands::Status(args) => sitedesk::cli::commands::status::run(args, &global),
        Commands::Completions(args) => sitedesk::cli::commands::completions::run(args),
    }
}
