//! Card and deck list pipelines: search, facet filters, sorting, paging.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{history_delta, Card, Color, ColorIdentity, Deck, DeckType, PAIRS, TRIOS};

/// Cards shown per page of the card list.
pub const DEFAULT_PAGE_SIZE: u32 = 40;

/// Smallest history movement reported as a trend.
pub const TREND_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    #[default]
    GihWr,
    Alsa,
    Trend,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(SortKey::Name),
            "gih_wr" | "wr" | "gih" => Some(SortKey::GihWr),
            "alsa" => Some(SortKey::Alsa),
            "trend" => Some(SortKey::Trend),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub dir: SortDir,
}

/// Card list filter. Empty facets match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardFilter {
    /// Case-insensitive name substring
    #[serde(default)]
    pub search: String,

    /// Any-of rarity filter
    #[serde(default)]
    pub rarities: Vec<crate::models::Rarity>,

    /// Any-of color filter: W/U/B/R/G, M (multicolor), C (colorless)
    #[serde(default)]
    pub colors: Vec<char>,
}

impl CardFilter {
    pub fn matches_search(&self, card: &Card) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || card.name.to_lowercase().contains(&needle)
    }

    pub fn matches_rarity(&self, card: &Card) -> bool {
        self.rarities.is_empty() || self.rarities.contains(&card.rarity)
    }

    pub fn matches_colors(&self, card: &Card) -> bool {
        if self.colors.is_empty() {
            return true;
        }
        color_filter_matches(&self.colors, &card.colors)
    }

    /// Rarity and color facets, ignoring the search term.
    pub fn matches_facets(&self, card: &Card) -> bool {
        self.matches_rarity(card) && self.matches_colors(card)
    }

    pub fn matches(&self, card: &Card) -> bool {
        self.matches_search(card) && self.matches_facets(card)
    }
}

fn color_filter_matches(filters: &[char], colors: &ColorIdentity) -> bool {
    filters.iter().any(|f| match f.to_ascii_uppercase() {
        'M' => colors.is_multicolor(),
        'C' => colors.is_colorless(),
        c => Color::from_char(c).is_some_and(|color| colors.contains(color)),
    })
}

// Missing values sort after present ones in either direction.
fn cmp_nulls_last(a: Option<f64>, b: Option<f64>, dir: SortDir) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match dir {
            SortDir::Asc => a.total_cmp(&b),
            SortDir::Desc => b.total_cmp(&a),
        },
    }
}

fn cmp_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Compare two cards under a sort configuration.
///
/// Cards without history trend as 0.
pub fn compare_cards(a: &Card, b: &Card, sort: SortConfig) -> Ordering {
    match sort.key {
        SortKey::Name => match sort.dir {
            SortDir::Asc => cmp_names(&a.name, &b.name),
            SortDir::Desc => cmp_names(&b.name, &a.name),
        },
        SortKey::Trend => {
            let ta = a.trend().unwrap_or(0.0);
            let tb = b.trend().unwrap_or(0.0);
            match sort.dir {
                SortDir::Asc => ta.total_cmp(&tb),
                SortDir::Desc => tb.total_cmp(&ta),
            }
        }
        SortKey::GihWr => cmp_nulls_last(a.gih_wr, b.gih_wr, sort.dir),
        SortKey::Alsa => cmp_nulls_last(a.alsa, b.alsa, sort.dir),
    }
}

/// Filter then stably sort a card list.
pub fn filter_cards<'a>(cards: &'a [Card], filter: &CardFilter, sort: SortConfig) -> Vec<&'a Card> {
    let mut result: Vec<&Card> = cards.iter().filter(|c| filter.matches(c)).collect();
    result.sort_by(|a, b| compare_cards(a, b, sort));
    result
}

/// Decks of one type, sorted by win rate.
///
/// Two- and three-color types render the full pair or trio grid: missing
/// archetypes are filled with placeholders.
pub fn filter_decks(decks: &[Deck], deck_type: DeckType) -> Vec<Deck> {
    let catalogue = match deck_type {
        DeckType::TwoColors | DeckType::TwoColorsSplash => &PAIRS[..],
        DeckType::ThreeColors => &TRIOS[..],
        _ => {
            let mut result: Vec<Deck> = decks
                .iter()
                .filter(|d| d.deck_type == deck_type)
                .cloned()
                .collect();
            sort_by_win_rate(&mut result);
            return result;
        }
    };

    let splash = deck_type == DeckType::TwoColorsSplash;
    let mut result: Vec<Deck> = catalogue
        .iter()
        .map(|template| {
            let target = ColorIdentity::from_code(template.code, splash);
            decks
                .iter()
                .find(|d| d.deck_type == deck_type && d.colors.same_colors(&target))
                .cloned()
                .unwrap_or_else(|| Deck::placeholder(template.name, target))
        })
        .collect();
    sort_by_win_rate(&mut result);
    result
}

fn sort_by_win_rate(decks: &mut [Deck]) {
    decks.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
}

/// Pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 500),
        }
    }

    /// Page number, treating 0 as the first page.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size, at least one item.
    pub fn page_size(&self) -> u32 {
        self.page_size.max(1)
    }

    pub fn offset(&self) -> usize {
        (self.page() as usize - 1) * self.page_size() as usize
    }

    /// The slice of `items` on this page; empty past the end.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.page_size() as usize).min(items.len());
        &items[start..end]
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(pagination: &Pagination, total_items: usize) -> Self {
        let page = pagination.page();
        let page_size = pagination.page_size();
        let total_pages = total_items.div_ceil(page_size as usize);
        Self {
            page,
            page_size,
            total_items,
            total_pages,
            has_next: (page as usize) < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One page of items with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Clone> Page<T> {
    pub fn of(items: &[T], pagination: &Pagination) -> Self {
        Self {
            items: pagination.window(items).to_vec(),
            meta: PageMeta::new(pagination, items.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

/// History movement; `direction` is only set past the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub delta: f64,
    pub direction: Option<TrendDirection>,
}

pub fn trend(history: &[f64]) -> Option<Trend> {
    let delta = history_delta(history)?;
    let direction = if delta.abs() < TREND_THRESHOLD {
        None
    } else if delta > 0.0 {
        Some(TrendDirection::Up)
    } else {
        Some(TrendDirection::Down)
    };
    Some(Trend { delta, direction })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{card, deck};
    use crate::models::Rarity;
    use pretty_assertions::assert_eq;

    fn cards() -> Vec<Card> {
        let mut with_history = card("Opt", Rarity::Common, "U", Some(54.0), Some(6.0));
        with_history.win_rate_history = vec![52.0, 54.0];
        vec![
            card("Shock", Rarity::Common, "R", Some(56.0), Some(3.0)),
            card("Shivan Dragon", Rarity::Rare, "R", Some(62.0), None),
            with_history,
            card("Izzet Charm", Rarity::Uncommon, "UR", None, Some(2.5)),
            card("Ornithopter", Rarity::Common, "", Some(50.0), Some(9.0)),
        ]
    }

    fn names(cards: &[&Card]) -> Vec<String> {
        cards.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_default_sort_is_win_rate_desc_nulls_last() {
        let cards = cards();
        let result = filter_cards(&cards, &CardFilter::default(), SortConfig::default());
        assert_eq!(
            names(&result),
            vec!["Shivan Dragon", "Shock", "Opt", "Ornithopter", "Izzet Charm"]
        );
    }

    #[test]
    fn test_alsa_ascending_nulls_last() {
        let cards = cards();
        let sort = SortConfig {
            key: SortKey::Alsa,
            dir: SortDir::Asc,
        };
        let result = filter_cards(&cards, &CardFilter::default(), sort);
        assert_eq!(
            names(&result),
            vec!["Izzet Charm", "Shock", "Opt", "Ornithopter", "Shivan Dragon"]
        );
    }

    #[test]
    fn test_sort_by_name_and_trend() {
        let cards = cards();
        let by_name = filter_cards(
            &cards,
            &CardFilter::default(),
            SortConfig {
                key: SortKey::Name,
                dir: SortDir::Asc,
            },
        );
        assert_eq!(by_name[0].name, "Izzet Charm");

        let by_trend = filter_cards(
            &cards,
            &CardFilter::default(),
            SortConfig {
                key: SortKey::Trend,
                dir: SortDir::Desc,
            },
        );
        assert_eq!(by_trend[0].name, "Opt");
    }

    #[test]
    fn test_filters_compose() {
        let cards = cards();
        let filter = CardFilter {
            search: "SH".to_string(),
            rarities: vec![Rarity::Common],
            colors: vec!['R'],
        };
        let result = filter_cards(&cards, &filter, SortConfig::default());
        assert_eq!(names(&result), vec!["Shock"]);
    }

    #[test]
    fn test_color_filter_semantics() {
        let cards = cards();
        let run = |colors: Vec<char>| {
            let filter = CardFilter {
                colors,
                ..Default::default()
            };
            let mut n = names(&filter_cards(&cards, &filter, SortConfig::default()));
            n.sort();
            n
        };

        // Mono filters match any card containing the color
        assert_eq!(run(vec!['U']), vec!["Izzet Charm", "Opt"]);
        assert_eq!(run(vec!['M']), vec!["Izzet Charm"]);
        assert_eq!(run(vec!['C']), vec!["Ornithopter"]);
        assert_eq!(run(vec!['C', 'M']), vec!["Izzet Charm", "Ornithopter"]);
    }

    #[test]
    fn test_filter_decks_fills_pair_grid() {
        let decks = vec![
            deck("Azorius (WU)", "UW", 58.0, 900),
            deck("Dimir (UB)", "UB", 54.0, 100),
            deck("Azorius Splash", "WU + Splash", 56.0, 50),
        ];

        let result = filter_decks(&decks, DeckType::TwoColors);
        assert_eq!(result.len(), 10);
        assert_eq!(result[0].name, "Azorius (WU)");
        assert_eq!(result[1].name, "Dimir (UB)");
        assert_eq!(result.iter().filter(|d| d.is_placeholder()).count(), 8);

        let splash = filter_decks(&decks, DeckType::TwoColorsSplash);
        assert_eq!(splash.len(), 10);
        assert_eq!(splash[0].name, "Azorius Splash");
        let placeholder = splash.iter().find(|d| d.is_placeholder()).unwrap();
        assert!(placeholder.colors.is_splash());
        assert!(placeholder.colors.to_string().ends_with(" + Splash"));
    }

    #[test]
    fn test_filter_decks_trio_grid_and_other_types() {
        let decks = vec![deck("Jund", "BRG", 57.0, 300), deck("Mono W", "W", 52.0, 40)];
        let trios = filter_decks(&decks, DeckType::ThreeColors);
        assert_eq!(trios.len(), 10);
        assert_eq!(trios[0].name, "Jund");

        let mono = filter_decks(&decks, DeckType::MonoColor);
        assert_eq!(mono.len(), 1);
        assert!(filter_decks(&decks, DeckType::Other).is_empty());
    }

    #[test]
    fn test_pagination_window() {
        let items: Vec<u32> = (0..95).collect();
        let first = Pagination::default();
        assert_eq!(first.window(&items).len(), 40);

        let last = Pagination::new(Some(3), None);
        assert_eq!(last.window(&items), &items[80..95]);

        let past_end = Pagination::new(Some(9), None);
        assert!(past_end.window(&items).is_empty());

        let meta = PageMeta::new(&last, items.len());
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_page_of() {
        let items = vec!["a", "b", "c"];
        let page = Page::of(&items, &Pagination::new(Some(1), Some(2)));
        assert_eq!(page.items, vec!["a", "b"]);
        assert!(page.meta.has_next);
    }

    #[test]
    fn test_pagination_tolerates_zero_page_and_size() {
        let items = vec!["a", "b", "c"];

        let zero_page: Pagination = serde_json::from_str(r#"{"page":0,"page_size":2}"#).unwrap();
        let page = Page::of(&items, &zero_page);
        assert_eq!(page.items, vec!["a", "b"]);
        assert_eq!(page.meta.page, 1);
        assert!(!page.meta.has_prev);

        let zero_size = Pagination { page: 1, page_size: 0 };
        let page = Page::of(&items, &zero_size);
        assert_eq!(page.items, vec!["a"]);
        assert_eq!(page.meta.page_size, 1);
        assert_eq!(page.meta.total_pages, 3);

        let both = Pagination { page: 0, page_size: 0 };
        assert_eq!(both.offset(), 0);
        assert_eq!(both.window(&items), &items[..1]);
    }

    #[test]
    fn test_trend_threshold() {
        assert_eq!(trend(&[55.0]), None);
        assert_eq!(trend(&[55.0, 55.05]).unwrap().direction, None);
        assert_eq!(trend(&[55.0, 56.0]).unwrap().direction, Some(TrendDirection::Up));
        assert_eq!(trend(&[55.0, 54.0]).unwrap().direction, Some(TrendDirection::Down));
    }
}
