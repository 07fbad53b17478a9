use {
    clap::Args,
    flipbook::library::Library,
    miette::{Context, IntoDiagnostic},
    std::{fs, path::PathBuf},
};

#[derive(Args)]
pub struct AddArgs {
    /// Document title
    title: String,

    /// Image directory or .cbz file to register
    file: PathBuf,

    /// Replace an existing document without asking
    #[arg(long)]
    force: bool,

    /// Library root directory override
    #[arg(long)]
    library: Option<PathBuf>,
}

pub fn execute(args: AddArgs) -> miette::Result<()> {
    let library = Library::resolve(args.library).into_diagnostic()?;
    fs::create_dir_all(library.root())
        .into_diagnostic()
        .with_context(|| format!("Failed to create library: {}", library.root().display()))?;

    let id = flipbook::library::slug(&args.title);
    if !args.force && library.contains(&id) {
        let replace = inquire::Confirm::new(&format!("Replace existing document \"{id}\"?"))
            .with_default(false)
            .prompt()
            .into_diagnostic()?;
        if !replace {
            println!("Left \"{id}\" untouched.");
            return Ok(());
        }
    }

    let id = library
        .register(&args.title, &args.file)
        .with_context(|| format!("Failed to register {}", args.file.display()))?;

    println!("Registered \"{}\" as [{}]", args.title, id);
    println!("View it with: flipbook view {id}");

    Ok(())
}
