//! Spread partitioning: grouping an ordered page sequence into the
//! one- or two-page units the book flips through.

use crate::library::PageImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    Single,
    #[default]
    Double,
}

impl LayoutMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Single => Self::Double,
            Self::Double => Self::Single,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Double => "Double",
        }
    }
}

/// One flip unit: a left page and, in double layout, possibly a right
/// page. The final spread of an odd-length document has no right page.
#[derive(Debug, Clone)]
pub struct Spread {
    left: PageImage,
    right: Option<PageImage>,
}

impl Spread {
    pub const fn left(&self) -> &PageImage {
        &self.left
    }

    pub const fn right(&self) -> Option<&PageImage> {
        self.right.as_ref()
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageImage> {
        std::iter::once(&self.left).chain(self.right.as_ref())
    }

    pub const fn len(&self) -> usize {
        if self.right.is_some() { 2 } else { 1 }
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Partitions `images` into spreads. Pure: identical inputs always
/// yield identical output. Callers recompute wholesale on any image
/// or mode change rather than patching spreads in place.
pub fn compute_spreads(images: &[PageImage], mode: LayoutMode) -> Vec<Spread> {
    match mode {
        LayoutMode::Single => images
            .iter()
            .map(|img| Spread {
                left: img.clone(),
                right: None,
            })
            .collect(),
        LayoutMode::Double => images
            .chunks(2)
            .map(|pair| Spread {
                left: pair[0].clone(),
                right: pair.get(1).cloned(),
            })
            .collect(),
    }
}

/// Human-readable page numbers for the spread at `spread_index`.
pub fn page_label(spread_index: usize, mode: LayoutMode, page_count: usize) -> String {
    match mode {
        LayoutMode::Single => format!("Page {} of {}", spread_index + 1, page_count),
        LayoutMode::Double => {
            let left = 2 * spread_index + 1;
            let right = left + 1;
            if right <= page_count {
                format!("Pages {} - {} of {}", left, right, page_count)
            } else {
                format!("Pages {} of {}", left, page_count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert};

    fn pages(n: usize) -> Vec<PageImage> {
        (1..=n).map(|i| PageImage::new(i, Vec::new())).collect()
    }

    fn ordinals(spreads: &[Spread]) -> Vec<usize> {
        spreads
            .iter()
            .flat_map(Spread::pages)
            .map(PageImage::ordinal)
            .collect()
    }

    #[test]
    fn test_single_mode_one_page_per_spread() {
        let input = pages(9);
        let spreads = compute_spreads(&input, LayoutMode::Single);
        assert!(spreads.len() == 9);
        assert!(spreads.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_double_mode_pairs_in_order() {
        let input = pages(10);
        let spreads = compute_spreads(&input, LayoutMode::Double);
        assert!(spreads.len() == 5);
        assert!(spreads[2].left().ordinal() == 5);
        assert!(spreads[2].right().map(PageImage::ordinal) == Some(6));
    }

    #[test]
    fn test_double_mode_odd_count_short_final_spread() {
        let input = pages(9);
        let spreads = compute_spreads(&input, LayoutMode::Double);
        assert!(spreads.len() == 5);
        assert!(spreads[4].len() == 1);
        assert!(spreads[4].left().ordinal() == 9);
    }

    #[test]
    fn test_round_trip_law_both_modes() {
        for n in [0usize, 1, 2, 3, 9, 10, 31] {
            let input = pages(n);
            let expected: Vec<usize> = (1..=n).collect();
            for mode in [LayoutMode::Single, LayoutMode::Double] {
                let spreads = compute_spreads(&input, mode);
                assert!(ordinals(&spreads) == expected);
            }
        }
    }

    #[test]
    fn test_spread_counts() {
        for n in [1usize, 2, 7, 8, 100] {
            let input = pages(n);
            assert!(compute_spreads(&input, LayoutMode::Single).len() == n);
            assert!(compute_spreads(&input, LayoutMode::Double).len() == n.div_ceil(2));
        }
    }

    #[test]
    fn test_empty_input_yields_no_spreads() {
        let input = pages(0);
        assert!(compute_spreads(&input, LayoutMode::Single).is_empty());
        assert!(compute_spreads(&input, LayoutMode::Double).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let input = pages(7);
        let a = ordinals(&compute_spreads(&input, LayoutMode::Double));
        let b = ordinals(&compute_spreads(&input, LayoutMode::Double));
        assert!(a == b);
    }

    #[test]
    fn test_double_label_full_spread() {
        assert!(page_label(2, LayoutMode::Double, 10) == "Pages 5 - 6 of 10");
    }

    #[test]
    fn test_double_label_short_final_spread() {
        assert!(page_label(4, LayoutMode::Double, 9) == "Pages 9 of 9");
    }

    #[test]
    fn test_single_label() {
        assert!(page_label(0, LayoutMode::Single, 9) == "Page 1 of 9");
    }
}
