//! Dashboard view-model.
//!
//! Bundles every derived view of one set and format. Each view sits behind
//! its own [`Memo`], so changing a card filter only recomputes the card list
//! and the scatter plot, never the balance score or power profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculate::balance::balance_score;
use crate::calculate::blueprint::{blueprint, Blueprint};
use crate::calculate::meta::{bucket_shares, pair_shares, BucketShare, PairShare};
use crate::calculate::pipeline::{
    filter_cards, filter_decks, CardFilter, Page, Pagination, SortConfig,
};
use crate::calculate::power::power_profile;
use crate::calculate::projector::ScatterPlot;
use crate::memo::Memo;
use crate::models::{
    BalanceScore, Card, Deck, DeckSet, DeckType, Format, FormatMode, PowerProfile, StatsMode,
};

/// Loaded data for one set and format. Cards are the global context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatData {
    pub set_code: String,
    pub format: Format,
    pub cards: Vec<Card>,
    pub decks: DeckSet,
}

impl FormatData {
    pub fn mode(&self) -> FormatMode {
        self.format.mode()
    }

    pub fn baseline(&self) -> f64 {
        self.decks.baseline
    }
}

/// User selections applied on top of the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub filter: CardFilter,
    pub sort: SortConfig,
    pub pagination: Pagination,
    pub deck_type: DeckType,
    pub stats_mode: StatsMode,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: CardFilter::default(),
            sort: SortConfig::default(),
            pagination: Pagination::default(),
            deck_type: DeckType::TwoColors,
            stats_mode: StatsMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaBreakdown {
    pub buckets: Vec<BucketShare>,
    pub pairs: Vec<PairShare>,
}

/// Every view of a format, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub set_code: String,
    pub format: Format,
    pub mode: FormatMode,
    pub baseline: f64,
    pub total_games: u64,
    pub generated_at: DateTime<Utc>,
    pub cards: Page<Card>,
    pub decks: Vec<Deck>,
    pub meta: MetaBreakdown,
    pub blueprint: Blueprint,
    pub balance: BalanceScore,
    pub power: PowerProfile,
    pub scatter: ScatterPlot,
}

/// Aggregate cache counters across all views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoized view builders.
#[derive(Debug, Default)]
pub struct Dashboard {
    card_list: Memo<Vec<Card>>,
    deck_list: Memo<Vec<Deck>>,
    meta: Memo<MetaBreakdown>,
    blueprint: Memo<Blueprint>,
    balance: Memo<BalanceScore>,
    power: Memo<PowerProfile>,
    scatter: Memo<ScatterPlot>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filtered, sorted card list (all pages).
    pub fn card_list(
        &mut self,
        data: &FormatData,
        filter: &CardFilter,
        sort: SortConfig,
    ) -> &[Card] {
        self.card_list
            .get_or_compute(&(&data.cards, filter, sort), || {
                filter_cards(&data.cards, filter, sort)
                    .into_iter()
                    .cloned()
                    .collect()
            })
    }

    pub fn deck_list(&mut self, decks: &DeckSet, deck_type: DeckType) -> &[Deck] {
        self.deck_list
            .get_or_compute(&(&decks.decks, deck_type), || filter_decks(&decks.decks, deck_type))
    }

    pub fn meta(&mut self, decks: &DeckSet) -> &MetaBreakdown {
        self.meta.get_or_compute(decks, || MetaBreakdown {
            buckets: bucket_shares(&decks.decks, decks.total_games),
            pairs: pair_shares(&decks.decks),
        })
    }

    pub fn blueprint(&mut self, data: &FormatData, stats_mode: StatsMode) -> &Blueprint {
        self.blueprint
            .get_or_compute(&(&data.cards, data.baseline(), stats_mode), || {
                blueprint(&data.cards, data.baseline(), stats_mode)
            })
    }

    pub fn balance(&mut self, data: &FormatData) -> &BalanceScore {
        self.balance
            .get_or_compute(&(&data.decks, &data.cards), || {
                balance_score(&data.decks, &data.cards)
            })
    }

    pub fn power(&mut self, data: &FormatData) -> &PowerProfile {
        self.power
            .get_or_compute(&(&data.cards, data.baseline()), || {
                power_profile(&data.cards, data.baseline())
            })
    }

    pub fn scatter(&mut self, data: &FormatData, filter: &CardFilter) -> &ScatterPlot {
        let mode = data.mode();
        self.scatter
            .get_or_compute(&(&data.cards, mode, data.baseline(), filter), || {
                ScatterPlot::build(&data.cards, mode, data.baseline(), filter)
            })
    }

    /// Assemble every view.
    pub fn render(&mut self, data: &FormatData, view: &ViewState) -> DashboardView {
        let cards = Page::of(self.card_list(data, &view.filter, view.sort), &view.pagination);
        let decks = self.deck_list(&data.decks, view.deck_type).to_vec();
        let meta = self.meta(&data.decks).clone();
        let blueprint = self.blueprint(data, view.stats_mode).clone();
        let balance = self.balance(data).clone();
        let power = self.power(data).clone();
        let scatter = self.scatter(data, &view.filter).clone();

        let stats = self.cache_stats();
        debug!(
            "Rendered {}/{} (cache hits {}, misses {})",
            data.set_code, data.format, stats.hits, stats.misses
        );

        DashboardView {
            set_code: data.set_code.clone(),
            format: data.format.clone(),
            mode: data.mode(),
            baseline: data.baseline(),
            total_games: data.decks.total_games,
            generated_at: Utc::now(),
            cards,
            decks,
            meta,
            blueprint,
            balance,
            power,
            scatter,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        let pairs = [
            (self.card_list.hits(), self.card_list.misses()),
            (self.deck_list.hits(), self.deck_list.misses()),
            (self.meta.hits(), self.meta.misses()),
            (self.blueprint.hits(), self.blueprint.misses()),
            (self.balance.hits(), self.balance.misses()),
            (self.power.hits(), self.power.misses()),
            (self.scatter.hits(), self.scatter.misses()),
        ];
        CacheStats {
            hits: pairs.iter().map(|(h, _)| h).sum(),
            misses: pairs.iter().map(|(_, m)| m).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::pipeline::{SortDir, SortKey};
    use crate::models::fixtures::{card, deck};
    use crate::models::Rarity;
    use pretty_assertions::assert_eq;

    fn data() -> FormatData {
        FormatData {
            set_code: "TLA".to_string(),
            format: Format::PremierDraft,
            cards: vec![
                card("Bolt", Rarity::Common, "R", Some(58.0), Some(2.5)),
                card("Opt", Rarity::Common, "U", Some(54.0), Some(6.0)),
                card("Dragon", Rarity::Mythic, "R", Some(63.0), Some(1.2)),
                card("Wall", Rarity::Uncommon, "W", None, Some(8.0)),
            ],
            decks: DeckSet::new(
                vec![
                    deck("Izzet (UR)", "UR", 57.0, 4000),
                    deck("Azorius (WU)", "WU", 54.0, 3000),
                ],
                55.0,
            ),
        }
    }

    #[test]
    fn test_render_assembles_views() {
        let mut dashboard = Dashboard::new();
        let view = dashboard.render(&data(), &ViewState::default());

        assert_eq!(view.baseline, 55.0);
        assert_eq!(view.total_games, 7000);
        assert_eq!(view.cards.meta.total_items, 4);
        assert_eq!(view.cards.items[0].name, "Dragon");
        // Full pair grid with placeholders
        assert_eq!(view.decks.len(), 10);
        assert_eq!(view.decks[0].name, "Izzet (UR)");
        assert_eq!(view.meta.pairs.len(), 10);
        assert_eq!(view.meta.pairs[0].code, "UR");
        assert_eq!(view.scatter.points.len(), 3);
    }

    #[test]
    fn test_recomputes_only_affected_views() {
        let data = data();
        let mut dashboard = Dashboard::new();
        let mut view = ViewState::default();

        dashboard.render(&data, &view);
        assert_eq!(dashboard.cache_stats(), CacheStats { hits: 0, misses: 7 });

        dashboard.render(&data, &view);
        assert_eq!(dashboard.cache_stats(), CacheStats { hits: 7, misses: 7 });

        // Search touches only the card list and the scatter plot
        view.filter.search = "bo".to_string();
        let rendered = dashboard.render(&data, &view);
        assert_eq!(dashboard.cache_stats(), CacheStats { hits: 12, misses: 9 });
        assert_eq!(rendered.cards.items.len(), 1);
        assert_eq!(rendered.scatter.match_count, 1);
    }

    #[test]
    fn test_render_with_stored_zero_pagination() {
        let mut stored = serde_json::to_value(ViewState::default()).unwrap();
        stored["pagination"] = serde_json::json!({ "page": 0, "page_size": 0 });
        let view: ViewState = serde_json::from_value(stored).unwrap();

        let rendered = Dashboard::new().render(&data(), &view);
        assert_eq!(rendered.cards.items.len(), 1);
        assert_eq!(rendered.cards.items[0].name, "Dragon");
        assert_eq!(rendered.cards.meta.page, 1);
        assert_eq!(rendered.cards.meta.total_pages, 4);
    }

    #[test]
    fn test_sort_and_pagination() {
        let data = data();
        let mut dashboard = Dashboard::new();
        let view = ViewState {
            sort: SortConfig {
                key: SortKey::Name,
                dir: SortDir::Asc,
            },
            pagination: Pagination::new(Some(2), Some(3)),
            ..ViewState::default()
        };

        let rendered = dashboard.render(&data, &view);
        assert_eq!(rendered.cards.meta.total_pages, 2);
        assert_eq!(rendered.cards.items.len(), 1);
        assert_eq!(rendered.cards.items[0].name, "Wall");
    }
}
