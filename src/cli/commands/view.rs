use {
    clap::Args,
    flipbook::{
        config::{ScalingFilter, Settings},
        library::{self, Document, Library},
        spread::LayoutMode,
    },
    miette::{Context, IntoDiagnostic},
    ratatui_image::picker::Picker,
    std::path::PathBuf,
};

mod compose;
mod fullscreen;
mod tui;

#[derive(Args)]
pub struct ViewArgs {
    /// Library document id, image directory, or .cbz file
    document: String,

    /// Override the displayed title
    #[arg(long)]
    title: Option<String>,

    /// Autoplay interval in milliseconds
    #[arg(long)]
    interval: Option<u64>,

    /// Start in single-page layout
    #[arg(long, conflicts_with = "double")]
    single: bool,

    /// Start in double-page layout
    #[arg(long)]
    double: bool,

    /// Scaling filter for page images
    #[arg(long, value_enum)]
    filter: Option<ScalingFilter>,

    /// Decode every page up front (uses more memory, smoother flips)
    #[arg(long)]
    prerender: bool,

    /// Library root directory override
    #[arg(long)]
    library: Option<PathBuf>,
}

pub fn execute(args: ViewArgs) -> miette::Result<()> {
    let mut settings = Settings::load();
    if let Some(ms) = args.interval {
        if ms == 0 {
            return Err(flipbook::FlipbookError::InvalidInterval(ms).into());
        }
        settings.autoplay_interval_ms = ms;
    }
    if let Some(filter) = args.filter {
        settings.scaling_filter = filter;
    }
    let settings = settings.sanitized();

    let mut document = open_document(&args)?;
    if let Some(title) = args.title {
        document.set_title(title);
    }

    let forced_mode = if args.single {
        Some(LayoutMode::Single)
    } else if args.double {
        Some(LayoutMode::Double)
    } else {
        None
    };

    let picker = Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((12, 24)));

    let mut app = tui::TuiApp::new(document, &settings, forced_mode, args.prerender, picker);
    app.run()
}

fn open_document(args: &ViewArgs) -> miette::Result<Document> {
    let path = PathBuf::from(&args.document);
    if path.exists() {
        return library::open_path(&path)
            .with_context(|| format!("Failed to open document: {}", path.display()));
    }

    let library = Library::resolve(args.library.clone()).into_diagnostic()?;
    library
        .open(&args.document)
        .with_context(|| format!("Failed to open document: {}", args.document))
}
