use crate::calculators::{round_half_up_2dp, score_confidence, StakeTier};
use crate::entities::Surebet;
use crate::message::cache::StaticPartCache;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;

/// Per-bookmaker deep-link template (`{teams}` / `{tournament}` placeholders)
/// and the regional-subpath substitutions applied to it afterward (spec
/// §4.6: "URL adjustment follows a per-bookmaker table ... replacing
/// regional subpaths. Unknown bookmakers are passed through unchanged").
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    templates: HashMap<String, String>,
    adjustments: HashMap<String, Vec<(String, String)>>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, bookmaker_id: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(bookmaker_id.into(), template.into());
        self
    }

    pub fn with_adjustment(
        mut self,
        bookmaker_id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.adjustments
            .entry(bookmaker_id.into())
            .or_default()
            .push((from.into(), to.into()));
        self
    }

    fn link_for(&self, bookmaker_id: &str, teams: &str, tournament: &str) -> Option<String> {
        let template = self.templates.get(bookmaker_id)?;
        let mut url = template
            .replace("{teams}", teams)
            .replace("{tournament}", tournament);
        if let Some(rules) = self.adjustments.get(bookmaker_id) {
            for (from, to) in rules {
                url = url.replace(from.as_str(), to.as_str());
            }
        }
        Some(url)
    }
}

/// Composes the chat-ready message body, splitting static parts (cached,
/// keyed by team/event/bookmaker) from dynamic parts (never cached) (spec
/// §4.6, component C8).
pub struct MessageBuilder {
    static_cache: StaticPartCache,
    links: LinkTable,
}

impl MessageBuilder {
    pub fn new(ttl: Duration, max_entries: usize, links: LinkTable) -> Self {
        Self {
            static_cache: StaticPartCache::new(ttl, max_entries),
            links,
        }
    }

    fn static_key(surebet: &Surebet) -> String {
        format!(
            "{}\u{2225}{}\u{2225}{}\u{2225}{}",
            surebet.soft_prong.team_home,
            surebet.soft_prong.team_away,
            surebet.soft_prong.event_time.as_datetime().timestamp(),
            surebet.soft_prong.bookmaker_id,
        )
    }

    fn render_static(&self, surebet: &Surebet) -> String {
        let key = Self::static_key(surebet);
        if let Some(cached) = self.static_cache.get(&key) {
            return cached;
        }
        let soft = &surebet.soft_prong;
        let teams = format!("{} vs {}", soft.team_home, soft.team_away);
        let mut body = format!(
            "{}\n{}\n{}",
            teams,
            soft.tournament,
            soft.event_time.as_datetime().to_rfc3339(),
        );
        if let Some(link) = self.links.link_for(&soft.bookmaker_id, &teams, &soft.tournament) {
            body.push('\n');
            body.push_str(&link);
        }
        self.static_cache.insert(key, body.clone());
        body
    }

    fn render_dynamic(surebet: &Surebet, tier: StakeTier, min_odds_raw: f64) -> String {
        let hours_to_event =
            (surebet.soft_prong.event_time.as_datetime() - Utc::now()).num_seconds() as f64 / 3600.0;
        let confidence = score_confidence(
            surebet.profit.percent(),
            surebet.soft_prong.odds.value(),
            min_odds_raw,
            hours_to_event,
        );
        format!(
            "{} soft odds {:.2} (min {:.2}) \u{00b7} confidence {:.0}%",
            tier.indicator(),
            surebet.soft_prong.odds.value(),
            round_half_up_2dp(min_odds_raw),
            confidence * 100.0,
        )
    }

    /// Builds the final body: dynamic parts first, then the cached static
    /// block (spec §4.6: "composes dynamic then static in a fixed layout").
    pub fn build(&self, surebet: &Surebet, tier: StakeTier, min_odds_raw: f64) -> String {
        format!(
            "{}\n{}",
            Self::render_dynamic(surebet, tier, min_odds_raw),
            self.render_static(surebet),
        )
    }
}
