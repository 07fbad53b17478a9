//! Document sources. A document is an ordered sequence of page
//! images: either a directory of image files (natural-sort order,
//! optional `document.toml` manifest for the title) or a `.cbz`
//! archive. The [`Library`] maps stable identifiers to documents;
//! an unknown or empty identifier yields an empty page sequence, not
//! an error — the viewer renders a placeholder for it.

use {
    indicatif::{ProgressBar, ProgressStyle},
    rayon::iter::{IntoParallelRefIterator, ParallelIterator},
    serde::{Deserialize, Serialize},
    std::{
        fmt, fs,
        io::Read,
        path::{Path, PathBuf},
        sync::Arc,
    },
    zip::ZipArchive,
};

use crate::error::{FlipbookError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff", "tif"];
const MANIFEST_NAME: &str = "document.toml";
const CBZ_PAGES_NAME: &str = "pages.cbz";

/// An opaque reference to one page's encoded raster image. Owned by
/// the document source; the viewer only reads it.
#[derive(Clone)]
pub struct PageImage {
    ordinal: usize,
    bytes: Arc<Vec<u8>>,
}

impl PageImage {
    pub fn new(ordinal: usize, bytes: Vec<u8>) -> Self {
        Self {
            ordinal,
            bytes: Arc::new(bytes),
        }
    }

    /// 1-based position in the document.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PageImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageImage")
            .field("ordinal", &self.ordinal)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    title: String,
    pages: Vec<PageImage>,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, pages: Vec<PageImage>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            pages,
        }
    }

    pub fn empty(id: &str) -> Self {
        Self::new(id, id, Vec::new())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Manifest {
    title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub page_count: usize,
}

/// A directory of registered documents.
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_root() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("flipbook").join("library"))
    }

    /// Uses `root` when given, otherwise the per-user default.
    pub fn resolve(root: Option<PathBuf>) -> Result<Self> {
        root.or_else(Self::default_root)
            .map(Self::new)
            .ok_or_else(|| FlipbookError::Other("Could not determine data directory".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, id: &str) -> bool {
        self.root.join(id).is_dir() || self.root.join(format!("{id}.cbz")).is_file()
    }

    pub fn list(&self) -> Result<Vec<DocumentSummary>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if path.is_dir() {
                let title = read_manifest_title(&path).unwrap_or_else(|| name.to_string());
                summaries.push(DocumentSummary {
                    id: name.to_string(),
                    title,
                    page_count: count_dir_pages(&path)?,
                });
            } else if has_extension(&path, "cbz") {
                let id = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(name)
                    .to_string();
                summaries.push(DocumentSummary {
                    title: id.clone(),
                    page_count: count_cbz_pages(&path)?,
                    id,
                });
            }
        }

        summaries.sort_by(|a, b| alphanumeric_sort::compare_str(&a.id, &b.id));
        Ok(summaries)
    }

    /// Opens a document by identifier. Unknown identifiers yield an
    /// empty document, which the viewer renders as a placeholder.
    pub fn open(&self, id: &str) -> Result<Document> {
        let dir = self.root.join(id);
        if dir.is_dir() {
            return document_from_dir(id, &dir);
        }

        let cbz = self.root.join(format!("{id}.cbz"));
        if cbz.is_file() {
            return Ok(Document::new(id, id, load_cbz_pages(&cbz)?));
        }

        log::warn!("unknown document id {id:?}");
        Ok(Document::empty(id))
    }

    /// Registers `source` (an image directory or a `.cbz` file) under
    /// a slug of `title`, replacing any previous document with that
    /// slug. Returns the new identifier.
    pub fn register(&self, title: &str, source: &Path) -> Result<String> {
        let id = slug(title);
        if id.is_empty() {
            return Err(FlipbookError::Other(format!(
                "Title {title:?} produces an empty identifier"
            )));
        }

        let dest = self.root.join(&id);
        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }
        let stale_cbz = self.root.join(format!("{id}.cbz"));
        if stale_cbz.is_file() {
            fs::remove_file(&stale_cbz)?;
        }
        fs::create_dir_all(&dest)?;

        if source.is_dir() {
            for path in collect_image_files(source)? {
                if let Some(name) = path.file_name() {
                    fs::copy(&path, dest.join(name))?;
                }
            }
        } else if source.is_file() && has_extension(source, "cbz") {
            fs::copy(source, dest.join(CBZ_PAGES_NAME))?;
        } else {
            fs::remove_dir_all(&dest).ok();
            return Err(FlipbookError::NotADocument(source.display().to_string()));
        }

        let manifest = Manifest {
            title: Some(title.to_string()),
        };
        let serialized = toml::to_string_pretty(&manifest)
            .map_err(|e| FlipbookError::Other(e.to_string()))?;
        fs::write(dest.join(MANIFEST_NAME), serialized)?;

        log::info!("registered document {id:?} from {}", source.display());
        Ok(id)
    }
}

/// Opens a document directly from a filesystem path. A path that does
/// not exist behaves like an unknown identifier: empty document.
pub fn open_path(path: &Path) -> Result<Document> {
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();

    if path.is_dir() {
        document_from_dir(&id, path)
    } else if path.is_file() && has_extension(path, "cbz") {
        Ok(Document::new(&id, &id, load_cbz_pages(path)?))
    } else if !path.exists() {
        log::warn!("no such document path {}", path.display());
        Ok(Document::empty(&id))
    } else {
        Err(FlipbookError::NotADocument(path.display().to_string()))
    }
}

fn document_from_dir(id: &str, dir: &Path) -> Result<Document> {
    let title = read_manifest_title(dir).unwrap_or_else(|| id.to_string());

    let cbz = dir.join(CBZ_PAGES_NAME);
    let pages = if cbz.is_file() {
        load_cbz_pages(&cbz)?
    } else {
        load_dir_pages(dir)?
    };

    Ok(Document::new(id, title, pages))
}

fn read_manifest_title(dir: &Path) -> Option<String> {
    let contents = fs::read_to_string(dir.join(MANIFEST_NAME)).ok()?;
    let manifest: Manifest = toml::from_str(&contents).ok()?;
    manifest.title
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn collect_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image_path(p))
        .collect();
    alphanumeric_sort::sort_path_slice(&mut paths);
    Ok(paths)
}

fn count_dir_pages(dir: &Path) -> Result<usize> {
    let cbz = dir.join(CBZ_PAGES_NAME);
    if cbz.is_file() {
        return count_cbz_pages(&cbz);
    }
    Ok(collect_image_files(dir)?.len())
}

fn page_progress(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{wide_bar:.cyan/blue}] {pos}/{len}")
            .map_err(|e| FlipbookError::Other(e.to_string()))?
            .progress_chars("#>-"),
    );
    pb.set_message("Loading pages");
    Ok(pb)
}

fn load_dir_pages(dir: &Path) -> Result<Vec<PageImage>> {
    let paths = collect_image_files(dir)?;
    let pb = page_progress(paths.len())?;

    let contents: std::io::Result<Vec<Vec<u8>>> = paths
        .par_iter()
        .map(|path| {
            let bytes = fs::read(path);
            pb.inc(1);
            bytes
        })
        .collect();
    pb.finish_and_clear();

    Ok(contents?
        .into_iter()
        .enumerate()
        .map(|(i, bytes)| PageImage::new(i + 1, bytes))
        .collect())
}

fn image_entries(archive: &mut ZipArchive<fs::File>) -> Result<Vec<(usize, String)>> {
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file.name().to_string();

        if file.is_dir()
            || name.starts_with('.')
            || name.starts_with("__MACOSX")
            || name.contains("/.")
        {
            continue;
        }
        if is_image_path(Path::new(&name)) {
            entries.push((i, name));
        }
    }
    entries.sort_by(|a, b| alphanumeric_sort::compare_str(&a.1, &b.1));
    Ok(entries)
}

fn load_cbz_pages(path: &Path) -> Result<Vec<PageImage>> {
    let file = fs::File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let entries = image_entries(&mut archive)?;
    let pb = page_progress(entries.len())?;

    let mut pages = Vec::with_capacity(entries.len());
    for (ordinal, (index, _)) in entries.iter().enumerate() {
        let mut file = archive.by_index(*index)?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        pages.push(PageImage::new(ordinal + 1, bytes));
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(pages)
}

fn count_cbz_pages(path: &Path) -> Result<usize> {
    let file = fs::File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    Ok(image_entries(&mut archive)?.len())
}

/// Derives a stable identifier from a document title.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert, std::io::Write, tempfile::TempDir};

    fn write_pages(dir: &Path, names: &[&str]) {
        for (i, name) in names.iter().enumerate() {
            fs::write(dir.join(name), vec![i as u8]).unwrap();
        }
    }

    #[test]
    fn test_slug() {
        assert!(slug("Udbhav 2025/01") == "udbhav-2025-01");
        assert!(slug("  Plain  ") == "plain");
        assert!(slug("!!!") == "");
    }

    #[test]
    fn test_dir_pages_natural_order() {
        let tmp = TempDir::new().unwrap();
        write_pages(tmp.path(), &["page10.png", "page2.png", "page1.png"]);

        let doc = open_path(tmp.path()).unwrap();
        assert!(doc.page_count() == 3);
        // Natural order: 1, 2, 10 — byte payloads follow the writes above.
        assert!(doc.pages()[0].bytes() == [2]);
        assert!(doc.pages()[1].bytes() == [1]);
        assert!(doc.pages()[2].bytes() == [0]);
        assert!(doc.pages()[0].ordinal() == 1);
        assert!(doc.pages()[2].ordinal() == 3);
    }

    #[test]
    fn test_non_image_files_ignored() {
        let tmp = TempDir::new().unwrap();
        write_pages(tmp.path(), &["a.png", "b.jpg"]);
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let doc = open_path(tmp.path()).unwrap();
        assert!(doc.page_count() == 2);
    }

    #[test]
    fn test_missing_path_yields_empty_document() {
        let doc = open_path(Path::new("/nonexistent/flipbook-test-doc")).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_unknown_library_id_yields_empty_document() {
        let tmp = TempDir::new().unwrap();
        let library = Library::new(tmp.path());
        let doc = library.open("no-such-doc").unwrap();
        assert!(doc.is_empty());
        assert!(doc.id() == "no-such-doc");
    }

    #[test]
    fn test_manifest_title() {
        let tmp = TempDir::new().unwrap();
        write_pages(tmp.path(), &["1.png"]);
        fs::write(tmp.path().join(MANIFEST_NAME), "title = \"My Book\"\n").unwrap();

        let doc = open_path(tmp.path()).unwrap();
        assert!(doc.title() == "My Book");
    }

    #[test]
    fn test_cbz_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let cbz_path = tmp.path().join("book.cbz");
        {
            let file = fs::File::create(&cbz_path).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            // Entries intentionally out of order; extraction must
            // follow natural name order.
            for (name, byte) in [("p2.png", 2u8), ("p10.png", 10), ("p1.png", 1)] {
                writer.start_file(name, options).unwrap();
                writer.write_all(&[byte]).unwrap();
            }
            writer.start_file("__MACOSX/junk.png", options).unwrap();
            writer.finish().unwrap();
        }

        let doc = open_path(&cbz_path).unwrap();
        assert!(doc.page_count() == 3);
        assert!(doc.pages()[0].bytes() == [1]);
        assert!(doc.pages()[1].bytes() == [2]);
        assert!(doc.pages()[2].bytes() == [10]);
        assert!(doc.id() == "book");
    }

    #[test]
    fn test_register_and_reopen() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        fs::create_dir(&source).unwrap();
        write_pages(&source, &["1.png", "2.png"]);

        let library = Library::new(tmp.path().join("library"));
        fs::create_dir_all(library.root()).unwrap();

        let id = library.register("My Upload", &source).unwrap();
        assert!(id == "my-upload");
        assert!(library.contains(&id));

        let doc = library.open(&id).unwrap();
        assert!(doc.title() == "My Upload");
        assert!(doc.page_count() == 2);

        let listed = library.list().unwrap();
        assert!(listed.len() == 1);
        assert!(listed[0].page_count == 2);
    }

    #[test]
    fn test_register_rejects_non_document() {
        let tmp = TempDir::new().unwrap();
        let bogus = tmp.path().join("file.txt");
        fs::write(&bogus, b"not a book").unwrap();

        let library = Library::new(tmp.path().join("library"));
        fs::create_dir_all(library.root()).unwrap();
        assert!(library.register("Nope", &bogus).is_err());
    }
}
