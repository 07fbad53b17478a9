mod commands;

#[derive(clap::Parser)]
#[command(
    name = "flipbook",
    version,
    about = "Read page-image documents as a flippable book",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print help as markdown
    Docs,

    /// View a document in the terminal
    View(commands::view::ViewArgs),

    /// List documents in the library
    List(commands::list::ListArgs),

    /// Register a document in the library
    Add(commands::add::AddArgs),

    /// Generate CLI completions
    Complete(commands::complete::CompleteArgs),
}

pub fn app() -> miette::Result<()> {
    let argv = <Cli as clap::Parser>::parse();

    match argv.command {
        Commands::Docs => {
            clap_markdown::print_help_markdown::<Cli>();
            Ok(())
        }

        Commands::View(args) => commands::view::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Add(args) => commands::add::execute(args),
        Commands::Complete(args) => commands::complete::execute(args),
    }
}
