//! Engine Integration Tests
//!
//! Drives full passes through in-memory page, AI and sink collaborators.

use async_trait::async_trait;
use odds_rust_core::ai::{parse_response, AiExtractor, BudgetedAi};
use odds_rust_core::engine::{ElementHandle, Engine, PageSource, RawPayload};
use odds_rust_core::error::{Result, ScrapeError};
use odds_rust_core::models::{Fixture, OddsMap, OddsValue, Sport};
use odds_rust_core::sink::FixtureSink;
use odds_rust_core::ScraperConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

const FOOTBALL_URL: &str = "https://www.bet365.com/#/AS/B12";
const SOCCER_URL: &str = "https://www.bet365.com/#/AS/B1";

#[derive(Default)]
struct PageState {
    current: String,
    labels: HashMap<String, Vec<String>>,
    payloads: HashMap<String, Vec<RawPayload>>,
    failing: HashMap<String, u32>,
}

#[derive(Clone, Default)]
struct MemoryPage {
    state: Arc<Mutex<PageState>>,
}

impl MemoryPage {
    fn set_labels(&self, url: &str, labels: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .labels
            .insert(url.to_string(), labels.iter().map(|l| l.to_string()).collect());
    }

    fn push_payload(&self, url: &str, payload: RawPayload) {
        self.state
            .lock()
            .unwrap()
            .payloads
            .entry(url.to_string())
            .or_default()
            .push(payload);
    }

    fn fail_navigations(&self, url: &str, times: u32) {
        self.state.lock().unwrap().failing.insert(url.to_string(), times);
    }
}

#[async_trait]
impl PageSource for MemoryPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(remaining) = state.failing.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ScrapeError::Navigation(format!("timeout loading {}", url)));
            }
        }
        state.current = url.to_string();
        Ok(())
    }

    async fn get_page_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        if selector != ".cpm-ParticipantOdds" {
            return Ok(Vec::new());
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .labels
            .get(&state.current)
            .map(|labels| labels.iter().map(ElementHandle::with_label).collect())
            .unwrap_or_default())
    }

    async fn page_html(&self) -> Result<String> {
        Ok("<html><body><div class=\"gl-MarketGroup\"></div></body></html>".to_string())
    }

    async fn drain_payloads(&self) -> Result<Vec<RawPayload>> {
        let mut state = self.state.lock().unwrap();
        let current = state.current.clone();
        Ok(state.payloads.remove(&current).unwrap_or_default())
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    writes: Arc<Mutex<Vec<Vec<Fixture>>>>,
    failures_left: Arc<AtomicU32>,
}

impl RecordingSink {
    fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn last_write(&self) -> Vec<Fixture> {
        self.writes.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl FixtureSink for RecordingSink {
    async fn persist(&self, fixtures: &[Fixture]) -> Result<()> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(ScrapeError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only disk",
            )));
        }
        self.writes.lock().unwrap().push(fixtures.to_vec());
        Ok(())
    }
}

struct CannedAi {
    calls: Arc<AtomicU32>,
    response: &'static str,
}

#[async_trait]
impl AiExtractor for CannedAi {
    async fn ai_extract(&self, _html: &str) -> Result<OddsMap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(parse_response(self.response))
    }
}

fn test_config() -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.page_timeout = Duration::from_secs(5);
    config.navigation_retry.base_backoff = Duration::from_millis(1);
    config.navigation_retry.max_backoff = Duration::from_millis(2);
    config.pace_min = Duration::ZERO;
    config.pace_max = Duration::ZERO;
    config
}

fn engine_with(page: &MemoryPage, sink: &RecordingSink, ai: BudgetedAi) -> Engine {
    Engine::new(test_config(), Box::new(page.clone()), Box::new(sink.clone()), ai)
}

fn text(v: &str) -> OddsValue {
    OddsValue::text(v)
}

#[tokio::test]
async fn test_spread_and_total_labels_merge_into_one_fixture() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    page.set_labels(
        FOOTBALL_URL,
        &[
            "Arizona Cardinals v Seattle Seahawks Spread Seattle Seahawks +7.5 @ -115",
            "Arizona Cardinals @ Seattle Seahawks Total Home Over 44.5 @ -110",
        ],
    );
    let mut engine = engine_with(&page, &sink, BudgetedAi::disabled());

    let report = engine.run_dom_pass(FOOTBALL_URL).await;
    assert_eq!(report.resolved, 1);
    assert_eq!(engine.catalog().len(), 1);

    let fixture = &report.touched[0];
    assert_eq!(fixture.home_team, "Arizona Cardinals");
    assert_eq!(fixture.away_team, "Seattle Seahawks");
    assert_eq!(fixture.sport, Sport::AmericanFootball);
    assert_eq!(fixture.league, "NFL");
    assert_eq!(fixture.odds["spread_away"], text("+7.5"));
    assert_eq!(fixture.odds["spread_away_odds"], text("-115"));
    assert_eq!(fixture.odds["spread_home"], text("-7.5"));
    assert_eq!(fixture.odds["total_over"], text("44.5"));
    assert_eq!(fixture.odds["total_over_odds"], text("-110"));
}

#[tokio::test]
async fn test_nba_pair_overrides_football_context() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    page.set_labels(
        FOOTBALL_URL,
        &["PHX Suns v CLE Cavaliers Moneyline PHX Suns @ -200"],
    );
    let mut engine = engine_with(&page, &sink, BudgetedAi::disabled());

    let report = engine.run_dom_pass(FOOTBALL_URL).await;
    assert_eq!(report.resolved, 1);
    let fixture = &report.touched[0];
    assert_eq!(fixture.league, "NBA");
    assert_eq!(fixture.sport, Sport::Basketball);
    assert_eq!(engine.classifier().learned_league("PHX Suns"), Some("NBA"));
}

#[tokio::test]
async fn test_persists_only_when_catalog_changes() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    page.set_labels(
        FOOTBALL_URL,
        &["Arizona Cardinals v Seattle Seahawks Spread Seattle Seahawks +7.5 @ -115"],
    );
    let mut engine = engine_with(&page, &sink, BudgetedAi::disabled());

    assert!(engine.run_dom_pass(FOOTBALL_URL).await.persisted);
    let second = engine.run_dom_pass(FOOTBALL_URL).await;
    assert_eq!(second.changed, 0);
    assert!(!second.persisted);
    assert_eq!(sink.write_count(), 1);

    page.set_labels(
        FOOTBALL_URL,
        &["Arizona Cardinals v Seattle Seahawks Spread Seattle Seahawks +7.5 @ -120"],
    );
    let third = engine.run_dom_pass(FOOTBALL_URL).await;
    assert_eq!(third.changed, 1);
    assert_eq!(sink.write_count(), 2);
    assert_eq!(sink.last_write()[0].odds["spread_away_odds"], text("-120"));
}

#[tokio::test]
async fn test_failed_write_is_retried_on_next_flush() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    sink.failures_left.store(1, Ordering::SeqCst);
    page.set_labels(FOOTBALL_URL, &["DET Lions v BAL Ravens"]);
    let mut engine = engine_with(&page, &sink, BudgetedAi::disabled());

    let first = engine.run_dom_pass(FOOTBALL_URL).await;
    assert_eq!(first.inserted, 1);
    assert!(!first.persisted);
    assert!(engine.catalog().is_dirty());

    let second = engine.run_dom_pass(FOOTBALL_URL).await;
    assert_eq!(second.changed, 0);
    assert!(second.persisted);
    assert_eq!(sink.last_write().len(), 1);
}

#[tokio::test]
async fn test_ai_fallback_respects_process_budget() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    let calls = Arc::new(AtomicU32::new(0));
    let ai = BudgetedAi::new(
        Some(Box::new(CannedAi {
            calls: calls.clone(),
            response: r#"{"home_team": "Arsenal", "away_team": "Chelsea", "league": "Premier League",
                          "moneyline_home": "-150", "is_live": false}"#,
        })),
        2,
    );
    let mut engine = engine_with(&page, &sink, ai);

    let first = engine.run_dom_pass(SOCCER_URL).await;
    assert!(first.ai_used);
    assert_eq!(first.inserted, 1);
    let fixture = &first.touched[0];
    assert_eq!(fixture.sport, Sport::Soccer);
    assert_eq!(fixture.league, "Premier League");
    assert_eq!(fixture.odds["moneyline_home"], text("-150"));
    assert!(!fixture.odds.contains_key("home_team"));

    assert!(engine.run_dom_pass(SOCCER_URL).await.ai_used);
    let third = engine.run_dom_pass(SOCCER_URL).await;
    assert!(!third.ai_used);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.ai().remaining_calls(), 0);
}

#[tokio::test]
async fn test_ai_skipped_when_enough_fixtures() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    page.set_labels(
        SOCCER_URL,
        &["Arsenal v Chelsea", "Liverpool v Everton", "Barcelona v Sevilla"],
    );
    let calls = Arc::new(AtomicU32::new(0));
    let ai = BudgetedAi::new(
        Some(Box::new(CannedAi {
            calls: calls.clone(),
            response: "{}",
        })),
        10,
    );
    let mut engine = engine_with(&page, &sink, ai);

    let report = engine.run_dom_pass(SOCCER_URL).await;
    assert_eq!(report.resolved, 3);
    assert!(!report.ai_used);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_captured_payloads_join_the_pass() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    page.push_payload(
        SOCCER_URL,
        RawPayload::response(
            "https://www.bet365.com/SportsBook.API/web?lid=1",
            r#"{"data": [{"name": "Premier League", "events": [
                {"id": 7, "name": "Arsenal v Chelsea", "markets": [
                    {"name": "Full Time Result", "outcomes": [{"name": "Arsenal", "odds": "2.1"}]}
                ]}
            ]}]}"#,
        ),
    );
    page.push_payload(
        SOCCER_URL,
        RawPayload::frame(
            "wss://premws-pt1.365lpodds.com/zap/",
            "I|CL;ID=1;NA=Premier League|FI;FI=9;NA=Liverpool v Everton|MA;ID=1;NA=Match Odds|PA;ID=1;NA=Liverpool;OD=4/5",
        ),
    );
    page.set_labels(SOCCER_URL, &["Arsenal v Chelsea Moneyline Chelsea @ +240"]);
    let mut engine = engine_with(&page, &sink, BudgetedAi::disabled());

    let report = engine.run_dom_pass(SOCCER_URL).await;
    assert_eq!(report.payloads, 2);
    assert_eq!(report.resolved, 2);

    let arsenal = report
        .touched
        .iter()
        .find(|f| f.home_team == "Arsenal")
        .unwrap();
    assert_eq!(arsenal.odds["moneyline_away"], text("+240"));
    assert_eq!(arsenal.odds["full_time_result:arsenal"], OddsValue::Number(2.1));

    let liverpool = report
        .touched
        .iter()
        .find(|f| f.home_team == "Liverpool")
        .unwrap();
    assert_eq!(liverpool.league, "Premier League");
    assert_eq!(liverpool.odds["match_odds:liverpool"], OddsValue::Number(1.8));
}

#[tokio::test]
async fn test_navigation_retries_then_succeeds() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    page.fail_navigations(FOOTBALL_URL, 2);
    page.set_labels(FOOTBALL_URL, &["DET Lions v BAL Ravens"]);
    let mut engine = engine_with(&page, &sink, BudgetedAi::disabled());

    let report = engine.run_dom_pass(FOOTBALL_URL).await;
    assert!(!report.failed());
    assert_eq!(report.resolved, 1);

    page.fail_navigations(FOOTBALL_URL, 5);
    let report = engine.run_dom_pass(FOOTBALL_URL).await;
    assert!(report.failed());
    assert_eq!(report.resolved, 0);
    assert_eq!(engine.catalog().len(), 1);
}

#[tokio::test]
async fn test_continuous_mode_stops_at_run_budget() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    page.set_labels("https://www.bet365.com/#/AS/B12", &["DET Lions v BAL Ravens"]);

    let mut config = test_config();
    config.sport_codes = vec!["B12".to_string()];
    config.include_inplay = false;
    config.refresh_interval = Duration::from_secs(5);
    config.run_budget = Some(Duration::from_millis(100));
    let mut engine = Engine::new(
        config,
        Box::new(page.clone()),
        Box::new(sink.clone()),
        BudgetedAi::disabled(),
    );

    let (_tx, rx) = watch::channel(false);
    let cycles = engine.run_continuous(rx).await;
    assert_eq!(cycles, 1);
    assert_eq!(sink.write_count(), 1);
}

#[tokio::test]
async fn test_continuous_mode_honours_shutdown() {
    let page = MemoryPage::default();
    let sink = RecordingSink::default();
    let mut engine = engine_with(&page, &sink, BudgetedAi::disabled());

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    assert_eq!(engine.run_continuous(rx).await, 0);
}
