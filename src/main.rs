use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use sprinter::cli::session::locate_workspace;
use sprinter::cli::{Cli, Commands, GlobalOpts};
use sprinter::core::Config;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` exits quietly
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
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => sprinter::cli::commands::init::run(args, &global),
        Commands::User(cmd) => sprinter::cli::commands::user::run(cmd, &global),
        Commands::Project(cmd) => sprinter::cli::commands::project::run(cmd, &global),
        Commands::Member(cmd) => sprinter::cli::commands::member::run(cmd, &global),
        Commands::Sprint(cmd) => sprinter::cli::commands::sprint::run(cmd, &global),
        Commands::Item(cmd) => sprinter::cli::commands::item::run(cmd, &global),
        Commands::Dep(cmd) => sprinter::cli::commands::dep::run(cmd, &global),
        Commands::Comment(cmd) => sprinter::cli::commands::comment::run(cmd, &global),
        Commands::Label(cmd) => sprinter::cli::commands::label::run(cmd, &global),
        Commands::Report(cmd) => sprinter::cli::commands::report::run(cmd, &global),
    }
}

/// SPRINTER_LOG wins, then `-v`, then the configured level
fn init_logging(global: &GlobalOpts) {
    let fallback = if global.verbose {
        "debug".to_string()
    } else {
        let workspace = locate_workspace(global).ok();
        Config::load(workspace.as_ref()).log_level().to_string()
    };
    let filter = EnvFilter::try_from_env("SPRINTER_LOG")
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
