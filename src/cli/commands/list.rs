use {
    clap::Args,
    flipbook::library::Library,
    miette::{Context, IntoDiagnostic},
    std::path::PathBuf,
};

#[derive(Args)]
pub struct ListArgs {
    /// Library root directory override
    #[arg(long)]
    library: Option<PathBuf>,
}

pub fn execute(args: ListArgs) -> miette::Result<()> {
    let library = Library::resolve(args.library).into_diagnostic()?;
    let documents = library
        .list()
        .with_context(|| format!("Failed to read library: {}", library.root().display()))?;

    println!("--- flipbook library");
    println!("--- Root: {}", library.root().display());
    println!("--- Documents: {}", documents.len());

    if documents.is_empty() {
        println!();
        println!("  (no documents -- register one with `flipbook add`)");
        return Ok(());
    }

    println!();
    for (i, doc) in documents.iter().enumerate() {
        let prefix = if i == documents.len() - 1 {
            "└"
        } else {
            "├"
        };
        println!(
            "  {} {:<30} {:>4} pages  [{}]",
            prefix, doc.title, doc.page_count, doc.id
        );
    }
    println!("---");
    println!("View one with: flipbook view <id>");

    Ok(())
}
