use {
    flipbook::{
        config::ScalingFilter,
        flip::FlipFrame,
        library::PageImage,
        spread::Spread,
    },
    image::{DynamicImage, Rgba, RgbaImage, imageops, imageops::FilterType},
    indicatif::{ProgressBar, ProgressStyle},
    rayon::iter::{IntoParallelRefIterator, ParallelIterator},
    std::{collections::HashMap, io::Cursor, sync::Arc},
};

const PAGE_COLOR: Rgba<u8> = Rgba([250, 247, 240, 255]);

/// Renders spreads (and flip-animation frames between them) into a
/// single book image at the current geometry. Decoded pages are cached
/// by ordinal so a resize or flip only pays for resampling.
pub struct SpreadComposer {
    filter: FilterType,
    decoded: HashMap<usize, Arc<DynamicImage>>,
}

impl SpreadComposer {
    pub fn new(filter: ScalingFilter) -> Self {
        Self {
            filter: filter.into(),
            decoded: HashMap::new(),
        }
    }

    /// Decodes every page up front, in parallel. Optional: without it
    /// pages decode lazily on first display.
    pub fn prerender(&mut self, pages: &[PageImage]) {
        let pb = ProgressBar::new(pages.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{wide_bar:.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Decoding pages");

        let results: Vec<(usize, Option<DynamicImage>)> = pages
            .par_iter()
            .map(|page| {
                let decoded = decode_bytes(page.bytes());
                pb.inc(1);
                (page.ordinal(), decoded)
            })
            .collect();
        pb.finish_and_clear();

        for (ordinal, decoded) in results {
            if let Some(img) = decoded {
                self.decoded.insert(ordinal, Arc::new(img));
            }
        }
    }

    fn decode(&mut self, page: &PageImage) -> Option<Arc<DynamicImage>> {
        if let Some(img) = self.decoded.get(&page.ordinal()) {
            return Some(img.clone());
        }
        match decode_bytes(page.bytes()) {
            Some(img) => {
                let img = Arc::new(img);
                self.decoded.insert(page.ordinal(), img.clone());
                Some(img)
            }
            None => {
                log::warn!("failed to decode page {}", page.ordinal());
                None
            }
        }
    }

    /// Composes the frame the flip engine says to show.
    pub fn compose_frame(
        &mut self,
        spreads: &[Spread],
        frame: FlipFrame,
        width: u32,
        height: u32,
    ) -> Option<RgbaImage> {
        let width = width.max(2);
        let height = height.max(2);
        match frame {
            FlipFrame::Resting { spread } => {
                Some(self.compose_spread(spreads.get(spread)?, width, height))
            }
            FlipFrame::Turning { from, to, progress } => {
                let outgoing = self.compose_spread(spreads.get(from)?, width, height);
                let incoming = self.compose_spread(spreads.get(to)?, width, height);
                Some(slide(outgoing, &incoming, progress, to > from))
            }
        }
    }

    fn compose_spread(&mut self, spread: &Spread, width: u32, height: u32) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(width, height, PAGE_COLOR);

        match spread.right() {
            None => {
                if let Some(img) = self.decode(spread.left()) {
                    blit_contained(&mut canvas, &img, 0, width, height, self.filter);
                }
            }
            Some(right) => {
                let half = width / 2;
                if let Some(img) = self.decode(spread.left()) {
                    blit_contained(&mut canvas, &img, 0, half, height, self.filter);
                }
                if let Some(img) = self.decode(right) {
                    blit_contained(&mut canvas, &img, i64::from(half), width - half, height, self.filter);
                }
            }
        }

        canvas
    }
}

fn decode_bytes(bytes: &[u8]) -> Option<DynamicImage> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()
}

/// Scale-to-contain: the page keeps its aspect ratio and is centered
/// in its slot.
pub(super) fn fit_dimensions(src: (u32, u32), slot: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (src.0.max(1) as f32, src.1.max(1) as f32);
    let (slot_w, slot_h) = (slot.0 as f32, slot.1 as f32);
    let ratio = (slot_w / src_w).min(slot_h / src_h);
    (
        ((src_w * ratio) as u32).max(1),
        ((src_h * ratio) as u32).max(1),
    )
}

fn blit_contained(
    canvas: &mut RgbaImage,
    img: &DynamicImage,
    slot_x: i64,
    slot_w: u32,
    slot_h: u32,
    filter: FilterType,
) {
    let (w, h) = fit_dimensions((img.width(), img.height()), (slot_w, slot_h));
    let scaled = imageops::resize(&img.to_rgba8(), w, h, filter);
    let x = slot_x + i64::from((slot_w - w) / 2);
    let y = i64::from((slot_h - h) / 2);
    imageops::overlay(canvas, &scaled, x, y);
}

/// The incoming spread slides over the outgoing one: from the right
/// when flipping forward, from the left when flipping back.
fn slide(mut outgoing: RgbaImage, incoming: &RgbaImage, progress: f32, forward: bool) -> RgbaImage {
    let width = outgoing.width();
    let progress = progress.clamp(0.0, 1.0);
    let offset = (f64::from(width) * f64::from(1.0 - progress)) as i64;
    let x = if forward { offset } else { -offset };
    imageops::overlay(&mut outgoing, incoming, x, 0);
    outgoing
}
