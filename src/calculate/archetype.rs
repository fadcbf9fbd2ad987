//! Archetype highlights and card cross-performance.
//!
//! Highlights pick standout cards inside one archetype: its best commons and
//! uncommons, "hidden gems" that overperform their global numbers there,
//! and "traps" that underperform despite being taken early.

use serde::{Deserialize, Serialize};

use super::ranking::grade;
use crate::models::{
    extract_colors, ArchetypeCard, ContextCard, Deck, DeckSet, DeckType, FormatMode, Grade,
    Rarity, DEFAULT_BASELINE,
};

/// Size of each highlight list.
pub const HIGHLIGHT_SIZE: usize = 5;

/// ALSA splitting late picks (gems) from early picks (traps) in draft.
pub const LATE_PICK_ALSA: f64 = 4.0;

/// Minimum games in hand for a cross-performance entry.
pub fn min_cross_games(mode: FormatMode) -> u64 {
    match mode {
        FormatMode::Draft => 500,
        FormatMode::Sealed => 10,
    }
}

/// Every ordering of a base color code; contexts are stored in whichever
/// order the upstream export used. Empty or 4+ colors yield nothing.
pub fn context_permutations(colors: &str) -> Vec<String> {
    let base: Vec<char> = extract_colors(Some(colors)).chars().collect();
    match base.as_slice() {
        [a] => vec![a.to_string()],
        [a, b] => vec![format!("{a}{b}"), format!("{b}{a}")],
        [a, b, c] => vec![
            format!("{a}{b}{c}"),
            format!("{a}{c}{b}"),
            format!("{b}{a}{c}"),
            format!("{b}{c}{a}"),
            format!("{c}{a}{b}"),
            format!("{c}{b}{a}"),
        ],
        _ => Vec::new(),
    }
}

// Zero is treated as missing, as in the source data.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// A gem with its archetype-over-global score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gem {
    #[serde(flatten)]
    pub card: ArchetypeCard,
    /// Archetype WR minus global WR
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeHighlights {
    pub deck: String,
    pub top_commons: Vec<ArchetypeCard>,
    pub top_uncommons: Vec<ArchetypeCard>,
    pub gems: Vec<Gem>,
    pub traps: Vec<ArchetypeCard>,
    /// Best common, else best uncommon
    pub best_card: Option<ArchetypeCard>,
}

fn top_of_rarity(cards: &[ArchetypeCard], rarity: Rarity) -> Vec<ArchetypeCard> {
    let mut picked: Vec<&ArchetypeCard> = cards
        .iter()
        .filter(|c| c.card.rarity == rarity && present(c.card.gih_wr).is_some())
        .collect();
    picked.sort_by(|a, b| {
        b.card
            .gih_wr
            .unwrap_or(0.0)
            .total_cmp(&a.card.gih_wr.unwrap_or(0.0))
    });
    picked.into_iter().take(HIGHLIGHT_SIZE).cloned().collect()
}

/// Win rate at the top-quartile boundary; 100 without data.
pub fn top_quartile_threshold(cards: &[ArchetypeCard]) -> f64 {
    let mut rates: Vec<f64> = cards.iter().filter_map(|c| c.card.gih_wr).collect();
    if rates.is_empty() {
        return 100.0;
    }
    rates.sort_by(|a, b| b.total_cmp(a));
    rates[rates.len() / 4]
}

/// Compute highlights for `deck` from its archetype-scoped cards.
pub fn highlights(
    deck: &Deck,
    cards: &[ArchetypeCard],
    baseline: f64,
    mode: FormatMode,
) -> ArchetypeHighlights {
    let sealed = mode == FormatMode::Sealed;
    let top_commons = top_of_rarity(cards, Rarity::Common);
    let top_uncommons = top_of_rarity(cards, Rarity::Uncommon);
    let listed = |name: &str| {
        top_commons
            .iter()
            .chain(&top_uncommons)
            .any(|c| c.card.name == name)
    };

    let mut gems: Vec<Gem> = cards
        .iter()
        .filter_map(|c| {
            let wr = present(c.card.gih_wr)?;
            let global = present(c.global_wr)?;
            let late_pick = sealed || present(c.card.alsa).is_some_and(|a| a > LATE_PICK_ALSA);
            let beats_deck = if sealed { wr > deck.win_rate } else { wr > deck.win_rate - 1.0 };
            let keep = wr >= baseline
                && late_pick
                && wr > global + 1.0
                && beats_deck
                && !listed(&c.card.name);
            keep.then(|| Gem {
                card: c.clone(),
                score: wr - global,
            })
        })
        .collect();
    gems.sort_by(|a, b| b.score.total_cmp(&a.score));
    gems.truncate(HIGHLIGHT_SIZE);

    let threshold = top_quartile_threshold(cards);
    let mut traps: Vec<ArchetypeCard> = cards
        .iter()
        .filter(|c| {
            let (Some(wr), Some(global)) = (present(c.card.gih_wr), present(c.global_wr)) else {
                return false;
            };
            let early_pick = sealed || present(c.card.alsa).is_some_and(|a| a <= LATE_PICK_ALSA);
            let trails_deck = if sealed { wr < deck.win_rate } else { wr < deck.win_rate + 0.5 };
            c.card.colors.is_within(&deck.colors)
                && wr < threshold
                && wr <= baseline + 4.0
                && early_pick
                && wr < global - 1.0
                && trails_deck
        })
        .cloned()
        .collect();
    traps.sort_by(|a, b| {
        a.card
            .gih_wr
            .unwrap_or(0.0)
            .total_cmp(&b.card.gih_wr.unwrap_or(0.0))
    });
    traps.truncate(HIGHLIGHT_SIZE);

    let best_card = top_commons.first().or(top_uncommons.first()).cloned();

    ArchetypeHighlights {
        deck: deck.name.clone(),
        top_commons,
        top_uncommons,
        gems,
        traps,
        best_card,
    }
}

/// How one card performs inside one archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossPerformance {
    pub deck_name: String,
    pub deck_colors: String,
    pub deck_wr: f64,
    pub card_wr: f64,
    /// The card's global win rate (baseline default when unknown)
    pub avg_card_wr: f64,
    pub grade: Option<Grade>,
}

/// Per-archetype results of one card across two- and three-color decks.
///
/// `observations` are the card's rows under every filter context; the
/// global row is skipped. Entries under the sample minimum are dropped, and
/// each archetype appears once.
pub fn cross_performance(
    observations: &[ContextCard],
    decks: &DeckSet,
    global_wr: Option<f64>,
    mode: FormatMode,
) -> Vec<CrossPerformance> {
    let avg_card_wr = present(global_wr).unwrap_or(DEFAULT_BASELINE);
    let min_games = min_cross_games(mode);
    let mut out: Vec<CrossPerformance> = Vec::new();

    for obs in observations.iter().filter(|o| !o.is_global()) {
        let Some(card_wr) = present(obs.card.gih_wr) else {
            continue;
        };
        if obs.card.games_in_hand.unwrap_or(0) < min_games {
            continue;
        }

        let entry = match decks.find_by_colors(&obs.context) {
            Some(deck) => {
                if !matches!(deck.deck_type, DeckType::TwoColors | DeckType::ThreeColors) {
                    continue;
                }
                CrossPerformance {
                    deck_name: deck.name.clone(),
                    deck_colors: obs.context.clone(),
                    deck_wr: deck.win_rate,
                    card_wr,
                    avg_card_wr,
                    grade: grade(Some(card_wr), Some(deck.win_rate)),
                }
            }
            None => {
                if !matches!(obs.context.len(), 2 | 3) {
                    continue;
                }
                CrossPerformance {
                    deck_name: format!("{} Deck", obs.context),
                    deck_colors: obs.context.clone(),
                    deck_wr: DEFAULT_BASELINE,
                    card_wr,
                    avg_card_wr,
                    grade: grade(Some(card_wr), Some(DEFAULT_BASELINE)),
                }
            }
        };

        if !out.iter().any(|e| e.deck_name == entry.deck_name) {
            out.push(entry);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{card, deck};
    use crate::models::Card;

    fn arch(
        name: &str,
        rarity: Rarity,
        colors: &str,
        wr: f64,
        alsa: f64,
        global: f64,
    ) -> ArchetypeCard {
        ArchetypeCard {
            card: card(name, rarity, colors, Some(wr), Some(alsa)),
            global_wr: Some(global),
            global_alsa: Some(alsa),
        }
    }

    #[test]
    fn test_context_permutations() {
        assert_eq!(context_permutations("WU + Splash"), vec!["WU", "UW"]);
        assert_eq!(context_permutations("G"), vec!["G"]);
        let trio = context_permutations("BRG");
        assert_eq!(trio.len(), 6);
        assert!(trio.contains(&"GRB".to_string()));
        assert!(context_permutations("WUBR").is_empty());
        assert!(context_permutations("").is_empty());
    }

    #[test]
    fn test_top_commons_and_uncommons() {
        let cards: Vec<ArchetypeCard> = (0..7)
            .map(|i| arch(&format!("C{i}"), Rarity::Common, "W", 50.0 + i as f64, 5.0, 55.0))
            .chain(std::iter::once(arch("U0", Rarity::Uncommon, "U", 58.0, 3.0, 57.0)))
            .collect();
        let deck = deck("Azorius (WU)", "WU", 56.0, 1000);
        let h = highlights(&deck, &cards, 55.0, FormatMode::Draft);

        assert_eq!(h.top_commons.len(), 5);
        assert_eq!(h.top_commons[0].card.name, "C6");
        assert_eq!(h.top_uncommons.len(), 1);
        assert_eq!(h.best_card.unwrap().card.name, "C6");
    }

    #[test]
    fn test_gems_draft_rules() {
        let deck = deck("Azorius (WU)", "WU", 56.0, 1000);
        let cards = vec![
            // Qualifies: late, above global + 1, above deck - 1
            arch("Gem", Rarity::Rare, "W", 58.0, 6.0, 55.0),
            // Picked early
            arch("Early", Rarity::Rare, "W", 60.0, 2.0, 55.0),
            // Barely above global
            arch("Flat", Rarity::Rare, "W", 56.0, 6.0, 55.5),
            // Below baseline
            arch("Weak", Rarity::Rare, "W", 54.0, 6.0, 50.0),
            // Bigger gap, ranks first
            arch("Big", Rarity::Mythic, "U", 61.0, 5.0, 54.0),
        ];

        let h = highlights(&deck, &cards, 55.0, FormatMode::Draft);
        let names: Vec<_> = h.gems.iter().map(|g| g.card.card.name.as_str()).collect();
        assert_eq!(names, vec!["Big", "Gem"]);
        assert_eq!(h.gems[0].score, 7.0);
    }

    #[test]
    fn test_gems_exclude_listed_commons() {
        let deck = deck("Azorius (WU)", "WU", 56.0, 1000);
        let cards = vec![arch("Common Gem", Rarity::Common, "W", 58.0, 6.0, 55.0)];
        let h = highlights(&deck, &cards, 55.0, FormatMode::Draft);
        assert!(h.gems.is_empty());
        assert_eq!(h.top_commons.len(), 1);
    }

    #[test]
    fn test_sealed_gems_ignore_pick_order() {
        let deck = deck("Azorius (WU)", "WU", 56.0, 1000);
        let cards = vec![arch("Gem", Rarity::Rare, "W", 58.0, 1.0, 55.0)];
        let h = highlights(&deck, &cards, 55.0, FormatMode::Sealed);
        assert_eq!(h.gems.len(), 1);
    }

    #[test]
    fn test_traps() {
        let deck = deck("Azorius (WU)", "WU", 55.0, 1000);
        let mut cards: Vec<ArchetypeCard> = (0..4)
            .map(|i| arch(&format!("Filler{i}"), Rarity::Rare, "G", 60.0 + i as f64, 5.0, 60.0))
            .collect();
        cards.extend([
            // Early pick, under global - 1, in colors
            arch("Trap", Rarity::Rare, "W", 52.0, 2.0, 56.0),
            arch("Worse Trap", Rarity::Rare, "U", 51.0, 3.0, 55.0),
            // Off-color
            arch("Splashy", Rarity::Rare, "B", 50.0, 2.0, 56.0),
            // Late pick
            arch("Late", Rarity::Rare, "W", 50.0, 6.0, 56.0),
            // Colorless counts as in colors
            arch("Rock", Rarity::Rare, "", 53.0, 4.0, 56.0),
        ]);

        let h = highlights(&deck, &cards, 55.0, FormatMode::Draft);
        let names: Vec<_> = h.traps.iter().map(|c| c.card.name.as_str()).collect();
        assert_eq!(names, vec!["Worse Trap", "Trap", "Rock"]);
    }

    #[test]
    fn test_top_quartile_threshold() {
        assert_eq!(top_quartile_threshold(&[]), 100.0);
        let cards: Vec<ArchetypeCard> = (0..8)
            .map(|i| arch(&format!("C{i}"), Rarity::Common, "W", 50.0 + i as f64, 5.0, 55.0))
            .collect();
        // Sorted desc: 57, 56, 55, ... index 2
        assert_eq!(top_quartile_threshold(&cards), 55.0);
    }

    fn observation(context: &str, wr: Option<f64>, games: u64) -> ContextCard {
        let mut c: Card = card("Shock", Rarity::Common, "R", wr, Some(3.0));
        c.games_in_hand = Some(games);
        ContextCard {
            context: context.to_string(),
            card: c,
        }
    }

    #[test]
    fn test_cross_performance() {
        let decks = DeckSet::new(
            vec![
                deck("Boros (RW)", "WR", 57.0, 3000),
                deck("Izzet (UR)", "UR", 53.0, 2000),
                deck("Mono Red", "R", 50.0, 100),
            ],
            55.0,
        );
        let obs = vec![
            observation("Global", Some(56.0), 20000),
            observation("RW", Some(60.0), 1500),
            observation("WR", Some(59.0), 1500),
            observation("UR", Some(52.0), 400),
            observation("R", Some(55.0), 900),
            observation("BRG", Some(54.0), 600),
            observation("BR", None, 900),
        ];

        let perf = cross_performance(&obs, &decks, Some(56.0), FormatMode::Draft);
        assert_eq!(perf.len(), 2);

        assert_eq!(perf[0].deck_name, "Boros (RW)");
        assert_eq!(perf[0].card_wr, 60.0);
        assert_eq!(perf[0].grade, Some(Grade::A));
        assert_eq!(perf[0].avg_card_wr, 56.0);

        assert_eq!(perf[1].deck_name, "BRG Deck");
        assert_eq!(perf[1].deck_wr, DEFAULT_BASELINE);
    }

    #[test]
    fn test_cross_performance_sealed_minimum() {
        let decks = DeckSet::new(vec![deck("Izzet (UR)", "UR", 53.0, 200)], 55.0);
        let obs = vec![observation("UR", Some(52.0), 12)];

        assert_eq!(cross_performance(&obs, &decks, None, FormatMode::Sealed).len(), 1);
        assert!(cross_performance(&obs, &decks, None, FormatMode::Draft).is_empty());
    }
}
