//! Extraction orchestrator.
//!
//! One pass = navigate, read labels from a fixed list of selectors, drain
//! captured payloads, optionally ask the AI fallback, then merge everything
//! into the catalog and flush if anything changed. Passes never overlap, so
//! the classifier and catalog need no locking.

pub mod report;
pub mod source;

pub use report::{CycleReport, PassReport};
pub use source::{ElementHandle, PageSource, PayloadKind, RawPayload};

use crate::ai::{AiFixture, BudgetedAi};
use crate::catalog::{FixtureCatalog, PassDeduper};
use crate::classify::ClassifierState;
use crate::config::ScraperConfig;
use crate::delta::{looks_like_delta, ParseContext};
use crate::error::{Result, ScrapeError};
use crate::feed::{looks_like_json, parse_feed};
use crate::labels::{clean_team_name, extract_match_time, is_candidate_label, parse_label};
use crate::league_config::{is_soccer_only_url, sport_from_url, UNKNOWN_LEAGUE};
use crate::models::fixture::same_side;
use crate::models::{Fixture, OddsMap, Sport, StructuredFixture};
use crate::sink::FixtureSink;
use crate::utils::retry::retry_with_backoff;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Queried in order on every page.
pub const DOM_SELECTORS: &[&str] = &[
    ".gl-MarketGroup",
    ".cpm-ParticipantOdds",
    ".ovm-ParticipantStackedCentered",
    "[aria-label*=\"@\"]",
    "[aria-label*=\" v \"]",
];

async fn timed<T>(
    limit: Duration,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::Timeout {
            operation: operation.to_string(),
            secs: limit.as_secs(),
        }),
    }
}

struct StopCondition {
    shutdown: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl StopCondition {
    fn never() -> Self {
        let (_tx, shutdown) = watch::channel(false);
        Self {
            shutdown,
            deadline: None,
        }
    }

    fn reached(&self) -> bool {
        *self.shutdown.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

pub struct Engine {
    config: ScraperConfig,
    page: Box<dyn PageSource>,
    sink: Box<dyn FixtureSink>,
    ai: BudgetedAi,
    classifier: ClassifierState,
    catalog: FixtureCatalog,
    /// One delta tree per payload source URL.
    feeds: FxHashMap<String, ParseContext>,
}

impl Engine {
    pub fn new(
        config: ScraperConfig,
        page: Box<dyn PageSource>,
        sink: Box<dyn FixtureSink>,
        ai: BudgetedAi,
    ) -> Self {
        Self {
            config,
            page,
            sink,
            ai,
            classifier: ClassifierState::new(),
            catalog: FixtureCatalog::new(),
            feeds: FxHashMap::default(),
        }
    }

    /// Start from a previously persisted catalog.
    pub fn with_catalog(mut self, catalog: FixtureCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &FixtureCatalog {
        &self.catalog
    }

    pub fn classifier(&self) -> &ClassifierState {
        &self.classifier
    }

    pub fn ai(&self) -> &BudgetedAi {
        &self.ai
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Classify a cleaned team pair and build the catalog candidate.
    fn resolve(
        &mut self,
        home: &str,
        away: &str,
        text: &str,
        url: &str,
        match_time: &str,
    ) -> Option<Fixture> {
        if same_side(home, away) {
            return None;
        }
        let c = self.classifier.classify_fixture(home, away, text, url);
        if is_soccer_only_url(url) && c.sport != Sport::Soccer {
            debug!("Dropping {} vs {} ({}) from soccer-only view", home, away, c.sport);
            return None;
        }

        let fixture = Fixture::new(home, away, c.league, c.sport, match_time).with_source(url);
        if !fixture.has_valid_sides() {
            return None;
        }
        self.classifier.learn(fixture.sport, home, away, &fixture.league);
        Some(fixture)
    }

    fn resolve_label(&mut self, label: &str, url: &str) -> Option<(Fixture, OddsMap)> {
        let parsed = parse_label(label)?;
        let home = clean_team_name(&parsed.home_team)?;
        let away = clean_team_name(&parsed.away_team)?;
        let fixture = self.resolve(&home, &away, label, url, &extract_match_time(label))?;
        Some((fixture, parsed.odds))
    }

    fn resolve_structured(
        &mut self,
        candidate: StructuredFixture,
        url: &str,
    ) -> Option<(Fixture, OddsMap)> {
        let context = match candidate.league_name.as_deref() {
            Some(league) => format!("{} {} v {}", league, candidate.home, candidate.away),
            None => format!("{} v {}", candidate.home, candidate.away),
        };
        let match_time = candidate.match_time.as_deref().unwrap_or("");
        let fixture = self.resolve(&candidate.home, &candidate.away, &context, url, match_time)?;
        Some((fixture, candidate.odds))
    }

    /// Route one captured payload and feed its fixtures into the pass.
    fn collect_payload(&mut self, payload: &RawPayload, dedup: &mut PassDeduper) -> usize {
        let body = payload.body.trim();
        let candidates = if body.is_empty() || body.starts_with('<') {
            return 0;
        } else if looks_like_json(body) {
            parse_feed(body)
        } else if looks_like_delta(body) {
            let ctx = self.feeds.entry(payload.source_url.clone()).or_default();
            let summary = ctx.ingest(body);
            if summary.guessed > 0 {
                warn!(
                    "{} fixture update(s) from {} attached to a guessed league",
                    summary.guessed, payload.source_url
                );
            }
            debug!(
                "Delta payload from {}: {} records, {} applied, {} dropped",
                payload.source_url, summary.records, summary.applied, summary.dropped
            );
            ctx.fixtures()
        } else {
            debug!("Ignoring unrecognised payload from {}", payload.source_url);
            return 0;
        };

        let mut added = 0;
        for candidate in candidates {
            if let Some((fixture, odds)) = self.resolve_structured(candidate, &payload.source_url) {
                dedup.add(fixture, &odds);
                added += 1;
            }
        }
        added
    }

    /// Ask the AI fallback for one more fixture when the pass came up short.
    /// Returns true only if a budgeted call was made.
    async fn collect_ai(&mut self, url: &str, dedup: &mut PassDeduper) -> bool {
        if dedup.len() >= self.config.ai_min_fixtures || !self.ai.is_available() {
            return false;
        }
        let limit = self.config.page_timeout;
        let html = match timed(limit, "page content", self.page.page_html()).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not read page HTML for AI fallback: {}", e);
                return false;
            }
        };

        let calls_before = self.ai.calls_made();
        let record = self.ai.extract(&html).await;
        let called = self.ai.calls_made() > calls_before;
        let Some(ai) = AiFixture::from_record(record) else {
            return called;
        };
        let league = ai.league.unwrap_or_else(|| UNKNOWN_LEAGUE.to_string());
        let mut fixture =
            Fixture::new(ai.home_team, ai.away_team, league, sport_from_url(url), "").with_source(url);
        if ai.is_live {
            fixture.mark_live(ai.current_score, ai.time_remaining);
        }
        if fixture.has_valid_sides() {
            info!("AI extracted odds for: {}", fixture.teams_display());
            dedup.add(fixture, &ai.odds);
        }
        called
    }

    /// Upsert the pass results into the catalog, then flush if dirty.
    async fn commit(&mut self, dedup: PassDeduper, report: &mut PassReport) {
        report.resolved = dedup.len();
        for mut fixture in dedup.into_fixtures() {
            let id = fixture.match_id.clone();
            let odds = std::mem::take(&mut fixture.odds);
            let is_new = self.catalog.get(&id).is_none();
            if self.catalog.upsert(fixture, &odds) {
                report.changed += 1;
                if is_new {
                    report.inserted += 1;
                }
            }
            if let Some(stored) = self.catalog.get(&id) {
                report.touched.push(stored.clone());
            }
        }
        report.persisted = self.flush().await;
    }

    /// Write the catalog if any upsert changed it. A failed write leaves the
    /// catalog dirty so the next flush retries with everything accumulated.
    pub async fn flush(&mut self) -> bool {
        if !self.catalog.is_dirty() {
            return false;
        }
        let snapshot = self.catalog.snapshot();
        match self.sink.persist(&snapshot).await {
            Ok(()) => {
                self.catalog.mark_clean();
                info!("Saved {} fixtures", snapshot.len());
                true
            }
            Err(e) => {
                error!("Failed to persist catalog: {}", e);
                false
            }
        }
    }

    // ========================================================================
    // Passes
    // ========================================================================

    async fn navigate_with_retry(&self, url: &str) -> Result<()> {
        let page = self.page.as_ref();
        let limit = self.config.page_timeout;
        retry_with_backoff("navigate", &self.config.navigation_retry, move || {
            timed(limit, "page load", page.navigate(url))
        })
        .await?;
        info!("Navigated to {}", url);
        Ok(())
    }

    /// Full DOM pass over one page. Collaborator failures end the pass with
    /// zero fixtures and are recorded in the report, never returned.
    pub async fn run_dom_pass(&mut self, url: &str) -> PassReport {
        let started = Instant::now();
        let mut report = PassReport::new(url);

        if let Err(e) = self.navigate_with_retry(url).await {
            warn!("Navigation to {} failed: {}", url, e);
            report.error = Some(e.to_string());
            report.elapsed = started.elapsed();
            return report;
        }

        let limit = self.config.page_timeout;
        let mut dedup = PassDeduper::new();
        let mut seen_labels: FxHashSet<String> = FxHashSet::default();

        for selector in DOM_SELECTORS {
            let elements = match timed(limit, "selector wait", self.page.get_page_elements(selector)).await {
                Ok(elements) => elements,
                Err(e) => {
                    warn!("Error with selector {}: {}", selector, e);
                    continue;
                }
            };
            if !elements.is_empty() {
                debug!("Found {} elements with selector: {}", elements.len(), selector);
            }

            for element in &elements {
                let Some(label) = element.label() else {
                    continue;
                };
                if !is_candidate_label(label) || !seen_labels.insert(label.to_string()) {
                    continue;
                }
                report.labels_seen += 1;
                match self.resolve_label(label, url) {
                    Some((fixture, odds)) => {
                        dedup.add(fixture, &odds);
                    }
                    None => report.labels_rejected += 1,
                }
            }
        }

        match timed(limit, "response capture", self.page.drain_payloads()).await {
            Ok(payloads) => {
                for payload in &payloads {
                    report.payloads += 1;
                    self.collect_payload(payload, &mut dedup);
                }
            }
            Err(e) => warn!("Could not read captured responses for {}: {}", url, e),
        }

        report.ai_used = self.collect_ai(url, &mut dedup).await;
        self.commit(dedup, &mut report).await;
        report.elapsed = started.elapsed();

        info!(
            "[pass {}] {}: {} fixtures from {} labels ({} new, {} changed){}",
            report.pass_id,
            url,
            report.resolved,
            report.labels_seen,
            report.inserted,
            report.changed,
            if report.ai_used { ", AI fallback used" } else { "" }
        );
        report
    }

    /// Parse and merge one payload outside a DOM pass (e.g. a pushed frame).
    pub async fn ingest_payload(&mut self, payload: &RawPayload) -> PassReport {
        let started = Instant::now();
        let mut report = PassReport::new(&payload.source_url);
        let mut dedup = PassDeduper::new();
        report.payloads = 1;
        self.collect_payload(payload, &mut dedup);
        self.commit(dedup, &mut report).await;
        report.elapsed = started.elapsed();
        report
    }

    // ========================================================================
    // Cycles
    // ========================================================================

    fn pace_delay(&self) -> Duration {
        let min = self.config.pace_min.as_millis() as u64;
        let max = self.config.pace_max.as_millis() as u64;
        if max <= min {
            return self.config.pace_min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    async fn run_cycle(&mut self, cycle: u64, stop: &StopCondition) -> CycleReport {
        let mut report = CycleReport {
            cycle,
            ..Default::default()
        };
        for (i, url) in self.config.target_urls().iter().enumerate() {
            if stop.reached() {
                info!("Stop requested, ending cycle {} early", cycle);
                break;
            }
            if i > 0 {
                tokio::time::sleep(self.pace_delay()).await;
            }
            let pass = self.run_dom_pass(url).await;
            report.absorb(&pass);
        }
        report.catalog_size = self.catalog.len();
        report.ai_calls_used = self.ai.calls_made();
        report.ai_calls_remaining = self.ai.remaining_calls();
        self.log_stats(&report);
        report
    }

    /// Visit every target URL once.
    pub async fn run_once(&mut self) -> CycleReport {
        self.run_cycle(1, &StopCondition::never()).await
    }

    /// Repeat cycles every refresh interval until shutdown is signalled or the
    /// run budget is spent. The current page always finishes first. Returns
    /// the number of cycles started.
    pub async fn run_continuous(&mut self, shutdown: watch::Receiver<bool>) -> u64 {
        let deadline = self.config.run_budget.map(|budget| Instant::now() + budget);
        let mut stop = StopCondition { shutdown, deadline };
        let mut cycle = 0;

        info!(
            "Starting continuous scraping (refresh every {}s)",
            self.config.refresh_interval.as_secs()
        );
        while !stop.reached() {
            cycle += 1;
            let started = Instant::now();
            self.run_cycle(cycle, &stop).await;

            let mut wait = self.config.refresh_interval;
            if let Some(deadline) = deadline {
                wait = wait.min(deadline.saturating_duration_since(Instant::now()));
            }
            info!(
                "Cycle {} completed in {:.1}s, waiting {}s",
                cycle,
                started.elapsed().as_secs_f64(),
                wait.as_secs()
            );
            if stop.reached() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = stop.shutdown.changed() => {
                    if changed.is_err() {
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        self.flush().await;
        info!("Stopped after {} cycle(s), {} fixtures in catalog", cycle, self.catalog.len());
        cycle
    }

    fn log_stats(&self, report: &CycleReport) {
        let stats = self.classifier.stats();
        info!(
            "Cycle {}: {} pages ({} failed), {} fixtures resolved, {} changed, catalog {}",
            report.cycle,
            report.pages,
            report.failed_pages,
            report.resolved,
            report.changed,
            report.catalog_size
        );
        info!(
            "AI calls used: {}, remaining: {}",
            report.ai_calls_used, report.ai_calls_remaining
        );
        info!("  - Discovered Sports: {:?}", stats.discovered_sports);
        info!("  - Discovered Leagues: {:?}", stats.discovered_leagues);
        info!("  - Teams by Sport: {:?}", stats.team_counts_by_sport);
        info!("  - Teams by League: {:?}", stats.team_counts_by_league);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiExtractor;
    use crate::models::OddsValue;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CountingAi {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl AiExtractor for CountingAi {
        async fn ai_extract(&self, _html: &str) -> Result<OddsMap> {
            *self.calls.lock().unwrap() += 1;
            Ok(OddsMap::new())
        }
    }

    struct NullSink;

    #[async_trait]
    impl FixtureSink for NullSink {
        async fn persist(&self, _fixtures: &[Fixture]) -> Result<()> {
            Ok(())
        }
    }

    struct StaticPage {
        labels: Vec<&'static str>,
        navigations: Mutex<u32>,
        fail_navigation: bool,
    }

    #[async_trait]
    impl PageSource for StaticPage {
        async fn navigate(&self, _url: &str) -> Result<()> {
            *self.navigations.lock().unwrap() += 1;
            if self.fail_navigation {
                return Err(ScrapeError::Navigation("net::ERR_CONNECTION_RESET".into()));
            }
            Ok(())
        }

        async fn get_page_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
            if selector != ".cpm-ParticipantOdds" {
                return Ok(Vec::new());
            }
            Ok(self.labels.iter().map(|l| ElementHandle::with_label(*l)).collect())
        }

        async fn page_html(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn drain_payloads(&self) -> Result<Vec<RawPayload>> {
            Ok(Vec::new())
        }
    }

    fn engine(labels: Vec<&'static str>, fail_navigation: bool) -> Engine {
        let mut config = ScraperConfig::default();
        config.navigation_retry.base_backoff = Duration::from_millis(1);
        config.navigation_retry.max_backoff = Duration::from_millis(2);
        let page = StaticPage {
            labels,
            navigations: Mutex::new(0),
            fail_navigation,
        };
        Engine::new(config, Box::new(page), Box::new(NullSink), BudgetedAi::disabled())
    }

    #[tokio::test]
    async fn test_dom_pass_resolves_labels() {
        let mut engine = engine(
            vec![
                "Arizona Cardinals v Seattle Seahawks Spread Seattle Seahawks +7.5 @ -115",
                "Arizona Cardinals v Seattle Seahawks Moneyline Arizona Cardinals @ +120",
                "no separator here",
                "Total Over 5 @ -110",
            ],
            false,
        );
        let report = engine.run_dom_pass("https://www.bet365.com/#/AS/B12").await;

        assert!(!report.failed());
        assert_eq!(report.resolved, 1);
        assert_eq!(report.labels_seen, 3);
        assert_eq!(report.inserted, 1);
        assert!(report.persisted);

        let fixture = &report.touched[0];
        assert_eq!(fixture.league, "NFL");
        assert_eq!(fixture.sport, Sport::AmericanFootball);
        assert_eq!(fixture.odds["spread_away"], OddsValue::text("+7.5"));
        assert_eq!(fixture.odds["moneyline_home"], OddsValue::text("+120"));
    }

    #[tokio::test]
    async fn test_price_after_at_never_becomes_a_team() {
        let mut engine = engine(
            vec!["Lakers v Celtics Winner Lakers @ 1.5", "Arsenal v Chelsea Draw @ +250"],
            false,
        );
        let report = engine.run_dom_pass("https://www.bet365.com/#/AS/B1").await;

        assert_eq!(report.labels_seen, 2);
        assert_eq!(report.labels_rejected, 2);
        assert_eq!(report.resolved, 0);
        assert!(engine.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_pair_is_not_learned() {
        let mut engine = engine(Vec::new(), false);
        let url = "https://www.bet365.com/#/AS/B1";

        assert!(engine.resolve("Arsenal", "+1.5", "Arsenal v +1.5", url, "").is_none());
        assert_eq!(engine.classifier().learned_league("Arsenal"), None);

        assert!(engine.resolve("Arsenal", "Chelsea", "Arsenal v Chelsea", url, "").is_some());
        assert_eq!(engine.classifier().learned_league("Arsenal"), Some("Premier League"));
    }

    #[tokio::test]
    async fn test_empty_html_does_not_count_as_ai_use() {
        let mut engine = engine(Vec::new(), false);
        engine.ai = BudgetedAi::new(
            Some(Box::new(CountingAi {
                calls: Mutex::new(0),
            })),
            5,
        );
        let report = engine.run_dom_pass("https://www.bet365.com/#/AS/B1").await;

        assert!(!report.ai_used);
        assert_eq!(engine.ai().calls_made(), 0);
        assert_eq!(engine.ai().remaining_calls(), 5);
    }

    #[tokio::test]
    async fn test_navigation_failure_yields_empty_pass() {
        let mut engine = engine(vec!["DET Lions v BAL Ravens"], true);
        let report = engine.run_dom_pass("https://www.bet365.com/#/AS/B12").await;

        assert!(report.failed());
        assert_eq!(report.resolved, 0);
        assert!(engine.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_soccer_only_view_drops_other_sports() {
        let mut engine = engine(vec!["DET Lions v BAL Ravens", "Arsenal v Chelsea"], false);
        let report = engine.run_dom_pass("https://www.bet365.com/#/AS/B13").await;

        assert_eq!(report.resolved, 1);
        assert_eq!(report.touched[0].home_team, "Arsenal");
        assert_eq!(report.touched[0].sport, Sport::Soccer);
    }

    #[tokio::test]
    async fn test_delta_payload_ingest() {
        let mut engine = engine(Vec::new(), false);
        let payload = RawPayload::frame(
            "wss://premws.example/zap",
            "I|CL;ID=1;NA=NFL|FI;FI=101;NA=DET Lions v BAL Ravens|MA;ID=11;NA=Money Line|PA;ID=1;NA=DET Lions;OD=10/11",
        );
        let report = engine.ingest_payload(&payload).await;
        assert_eq!(report.inserted, 1);
        assert_eq!(report.touched[0].odds["money_line:det_lions"], OddsValue::Number(1.91));

        let update = RawPayload::frame("wss://premws.example/zap", "U|PA1;OD=1/1");
        let report = engine.ingest_payload(&update).await;
        assert_eq!(report.changed, 1);
        assert_eq!(report.touched[0].odds["money_line:det_lions"], OddsValue::Number(2.0));

        let html = RawPayload::response("https://www.bet365.com/", "<html><body/></html>");
        assert_eq!(engine.ingest_payload(&html).await.resolved, 0);
    }
}
