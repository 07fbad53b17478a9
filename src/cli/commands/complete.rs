use {
    clap::{Args, CommandFactory},
    clap_complete::Shell,
};

#[derive(Args)]
pub struct CompleteArgs {
    shell: Shell,
}

pub fn execute(args: CompleteArgs) -> miette::Result<()> {
    let mut app = crate::cli::Cli::command();
    let bin_name = app.get_name().to_string();
    clap_complete::generate(args.shell, &mut app, bin_name, &mut std::io::stdout());

    Ok(())
}
