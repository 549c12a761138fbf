//! Match id listing and bounded-concurrency match detail fan-out.
//!
//! Workers pull ids from a shared channel and each returns its own list of
//! results; the lists are concatenated after the join, so result order
//! follows completion order per worker and is not deterministic. A fatal
//! error stops every worker before its next id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::unbounded;
use indicatif::ProgressBar;

use crate::analysis::summary::{extract_summary, MatchSummary};
use crate::api::models::MatchDto;
use crate::api::RiotApiClient;
use crate::error::ApiError;
use crate::identity::AccountId;
use crate::region::Platform;

pub struct MatchFetcher<'a> {
    client: &'a RiotApiClient,
    concurrency: usize,
    progress: Option<ProgressBar>,
}

impl<'a> MatchFetcher<'a> {
    pub fn new(client: &'a RiotApiClient, concurrency: usize) -> Self {
        MatchFetcher {
            client,
            concurrency: concurrency.max(1),
            progress: None,
        }
    }

    /// Ticks `progress` once per completed detail request.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn list_recent_match_ids(
        &self,
        account: &AccountId,
        platform: Platform,
        count: usize,
    ) -> Result<Vec<String>, ApiError> {
        self.client.get_match_ids(account.as_str(), platform, count)
    }

    pub fn fetch_match_detail(
        &self,
        match_id: &str,
        platform: Platform,
    ) -> Result<MatchDto, ApiError> {
        self.client.get_match(match_id, platform)
    }

    /// Fetches every id and keeps the summaries that could be extracted.
    /// Failed requests are logged and skipped; an unauthorized key stops the
    /// batch and is returned.
    pub fn fetch_summaries(
        &self,
        match_ids: &[String],
        account: &AccountId,
        platform: Platform,
    ) -> Result<Vec<MatchSummary>, ApiError> {
        self.run_pool(match_ids, |match_id| self.summarize(match_id, account, platform))
    }

    pub fn recent_summaries(
        &self,
        account: &AccountId,
        platform: Platform,
        count: usize,
    ) -> Result<Vec<MatchSummary>, ApiError> {
        let match_ids = self.list_recent_match_ids(account, platform, count)?;
        tracing::debug!(requested = count, listed = match_ids.len(), "match ids listed");
        self.fetch_summaries(&match_ids, account, platform)
    }

    /// Samples up to `sample_size` matches played on `champion_id` out of the
    /// last `sample_size * pool_multiplier` matches.
    ///
    /// Candidates are dispatched in waves of `concurrency` ids and every
    /// request of a dispatched wave completes. Dispatch stops after the wave
    /// that reaches `sample_size`; which qualifying matches are kept depends
    /// on completion order.
    pub fn fetch_champion_matches(
        &self,
        account: &AccountId,
        platform: Platform,
        champion_id: i64,
        sample_size: usize,
        pool_multiplier: usize,
    ) -> Result<Vec<MatchSummary>, ApiError> {
        if sample_size == 0 {
            return Ok(Vec::new());
        }

        let pool_size = sample_size.saturating_mul(pool_multiplier.max(1));
        let candidates = self.list_recent_match_ids(account, platform, pool_size)?;

        let mut found: Vec<MatchSummary> = Vec::new();
        for wave in candidates.chunks(self.concurrency) {
            let qualifying = self.run_pool(wave, |match_id| {
                self.summarize(match_id, account, platform)
                    .map(|summary| summary.filter(|s| s.champion_id == champion_id))
            })?;
            found.extend(qualifying);

            if found.len() >= sample_size {
                break;
            }
        }

        found.truncate(sample_size);
        tracing::debug!(champion_id, found = found.len(), "champion sample collected");
        Ok(found)
    }

    /// `Ok(None)` for a skipped match; `Err` only for failures that must stop
    /// the run.
    fn summarize(
        &self,
        match_id: &str,
        account: &AccountId,
        platform: Platform,
    ) -> Result<Option<MatchSummary>, ApiError> {
        let result = self.fetch_match_detail(match_id, platform);

        if let Some(pb) = &self.progress {
            pb.inc(1);
        }

        match result {
            Ok(detail) => {
                let summary = extract_summary(&detail, account);
                if summary.is_none() {
                    tracing::debug!(match_id, "player not in match, dropping");
                }
                Ok(summary)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(match_id, error = %e, "skipping match");
                Ok(None)
            }
        }
    }

    fn run_pool<R, F>(&self, match_ids: &[String], work: F) -> Result<Vec<R>, ApiError>
    where
        R: Send,
        F: Fn(&str) -> Result<Option<R>, ApiError> + Sync,
    {
        if match_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (tx, rx) = unbounded::<&str>();
        for match_id in match_ids {
            let _ = tx.send(match_id.as_str());
        }
        drop(tx);

        let workers = self.concurrency.min(match_ids.len());
        let halted = AtomicBool::new(false);
        tracing::debug!(jobs = match_ids.len(), workers, "match pool started");

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let rx = rx.clone();
                    let work = &work;
                    let halted = &halted;
                    scope.spawn(move || -> Result<Vec<R>, ApiError> {
                        let mut partial = Vec::new();
                        for match_id in rx.iter() {
                            if halted.load(Ordering::Relaxed) {
                                break;
                            }
                            match work(match_id) {
                                Ok(Some(result)) => partial.push(result),
                                Ok(None) => {}
                                Err(e) => {
                                    halted.store(true, Ordering::Relaxed);
                                    return Err(e);
                                }
                            }
                        }
                        Ok(partial)
                    })
                })
                .collect();

            let mut results = Vec::new();
            let mut failure = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(partial)) => results.extend(partial),
                    Ok(Err(e)) => {
                        failure.get_or_insert(e);
                    }
                    Err(_) => tracing::error!("match worker panicked, its results are lost"),
                }
            }

            match failure {
                Some(e) => {
                    tracing::error!(error = %e, "match pool halted");
                    Err(e)
                }
                None => Ok(results),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpResponse, MockTransport, Transport};
    use std::num::NonZeroU32;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    fn match_body(id: &str, puuid: &str, champion_id: i64, win: bool) -> String {
        format!(
            r#"{{"metadata": {{"matchId": "{id}"}},
                "info": {{"gameDuration": 1500, "gameEndTimestamp": 1,
                          "participants": [{{"puuid": "{puuid}", "championId": {champion_id},
                                             "win": {win}, "kills": 3, "deaths": 2, "assists": 4}}]}}}}"#
        )
    }

    fn client(transport: MockTransport) -> RiotApiClient {
        RiotApiClient::new(
            Box::new(transport),
            Some("TEST_KEY".into()),
            NonZeroU32::new(1000).unwrap(),
        )
    }

    #[test]
    fn failed_matches_are_skipped_not_fatal() {
        let client = client(
            MockTransport::new()
                .with_json("/ids?", r#"["NA1_1","NA1_2","NA1_3","NA1_4"]"#)
                .with_json("/matches/NA1_1", match_body("NA1_1", "me", 7, true))
                .with_status("/matches/NA1_2", 500)
                .with_json("/matches/NA1_3", "{broken")
                .with_json("/matches/NA1_4", match_body("NA1_4", "someone-else", 7, true)),
        );
        let fetcher = MatchFetcher::new(&client, 2);

        let summaries = fetcher
            .recent_summaries(&AccountId("me".into()), Platform::NA1, 4)
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].match_id, "NA1_1");
    }

    #[test]
    fn every_listed_match_is_requested_once() {
        let ids: Vec<String> = (0..12).map(|i| format!("NA1_{}", 100 + i)).collect();
        let mut transport = MockTransport::new();
        for id in &ids {
            transport = transport.with_json(&format!("/matches/{}", id), match_body(id, "me", 1, true));
        }
        let client = client(transport);
        let fetcher = MatchFetcher::new(&client, 5);

        let mut summaries = fetcher
            .fetch_summaries(&ids, &AccountId("me".into()), Platform::NA1)
            .unwrap();
        summaries.sort_by(|a, b| a.match_id.cmp(&b.match_id));

        let fetched: Vec<String> = summaries.into_iter().map(|s| s.match_id).collect();
        assert_eq!(fetched, ids);
    }

    #[test]
    fn listing_failure_is_propagated() {
        let client = client(MockTransport::new().with_status("/ids?", 503));
        let fetcher = MatchFetcher::new(&client, 5);

        assert_eq!(
            fetcher
                .recent_summaries(&AccountId("me".into()), Platform::NA1, 5)
                .unwrap_err(),
            ApiError::Transient("HTTP 503".into())
        );
    }

    #[test]
    fn champion_sample_requests_tenfold_pool_and_filters() {
        let ids: Vec<String> = (0..6).map(|i| format!("NA1_{}", i)).collect();
        let mut transport = MockTransport::new().with_json(
            "/ids?start=0&count=20",
            serde_json::to_string(&ids).unwrap(),
        );
        for (i, id) in ids.iter().enumerate() {
            let champion = if i % 2 == 0 { 7 } else { 11 };
            transport =
                transport.with_json(&format!("/matches/{}", id), match_body(id, "me", champion, true));
        }
        let client = client(transport);
        let fetcher = MatchFetcher::new(&client, 2);

        let sample = fetcher
            .fetch_champion_matches(&AccountId("me".into()), Platform::NA1, 7, 2, 10)
            .unwrap();

        assert_eq!(sample.len(), 2);
        assert!(sample.iter().all(|s| s.champion_id == 7));
    }

    #[test]
    fn champion_sample_stops_dispatching_after_quota() {
        let ids: Vec<String> = (0..8).map(|i| format!("NA1_{}", i)).collect();
        let mut transport =
            MockTransport::new().with_json("/ids?", serde_json::to_string(&ids).unwrap());
        for id in &ids {
            transport = transport.with_json(&format!("/matches/{}", id), match_body(id, "me", 7, true));
        }
        let transport = Arc::new(transport);
        let client = RiotApiClient::new(
            Box::new(transport.clone()),
            Some("TEST_KEY".into()),
            NonZeroU32::new(1000).unwrap(),
        );
        let fetcher = MatchFetcher::new(&client, 2);

        let sample = fetcher
            .fetch_champion_matches(&AccountId("me".into()), Platform::NA1, 7, 2, 10)
            .unwrap();

        // The first wave of two already fills the sample.
        assert_eq!(sample.len(), 2);
        assert_eq!(transport.request_count("/matches/NA1_"), 2);
    }

    #[test]
    fn zero_sample_size_makes_no_requests() {
        let client = client(MockTransport::new());
        let fetcher = MatchFetcher::new(&client, 5);
        let sample = fetcher
            .fetch_champion_matches(&AccountId("me".into()), Platform::NA1, 7, 0, 10)
            .unwrap();
        assert!(sample.is_empty());
    }

    #[test]
    fn unauthorized_detail_stops_the_batch() {
        let client = client(
            MockTransport::new()
                .with_json("/ids?", r#"["NA1_1","NA1_2"]"#)
                .with_status("/matches/NA1_", 401),
        );
        let fetcher = MatchFetcher::new(&client, 2);
        let me = AccountId("me".into());

        assert_eq!(
            fetcher.recent_summaries(&me, Platform::NA1, 2).unwrap_err(),
            ApiError::Unauthorized
        );
        assert_eq!(
            fetcher
                .fetch_champion_matches(&me, Platform::NA1, 7, 2, 10)
                .unwrap_err(),
            ApiError::Unauthorized
        );
    }

    #[test]
    fn unauthorized_detail_halts_remaining_ids() {
        let ids: Vec<String> = (0..20).map(|i| format!("NA1_{}", i)).collect();
        let transport = Arc::new(MockTransport::new().with_status("/matches/NA1_", 401));
        let client = RiotApiClient::new(
            Box::new(transport.clone()),
            Some("TEST_KEY".into()),
            NonZeroU32::new(1000).unwrap(),
        );
        let fetcher = MatchFetcher::new(&client, 1);

        let result = fetcher.fetch_summaries(&ids, &AccountId("me".into()), Platform::NA1);

        assert_eq!(result.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(transport.request_count("/matches/NA1_"), 1);
    }

    /// Answers every match request after a short delay and records the
    /// highest number of requests seen in flight at once.
    #[derive(Default)]
    struct SlowTransport {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Transport for SlowTransport {
        fn get(&self, url: &str, _token: Option<&str>) -> Result<HttpResponse, String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let id = url.rsplit('/').next().unwrap_or_default();
            Ok(HttpResponse::new(200, match_body(id, "me", 7, true)))
        }
    }

    #[test]
    fn pool_never_exceeds_concurrency() {
        let ids: Vec<String> = (0..40).map(|i| format!("NA1_{}", i)).collect();
        let transport = Arc::new(SlowTransport::default());
        let client = RiotApiClient::new(
            Box::new(transport.clone()),
            Some("TEST_KEY".into()),
            NonZeroU32::new(1000).unwrap(),
        );
        let fetcher = MatchFetcher::new(&client, 5);

        let summaries = fetcher
            .fetch_summaries(&ids, &AccountId("me".into()), Platform::NA1)
            .unwrap();

        assert_eq!(summaries.len(), 40);
        let peak = transport.peak.load(Ordering::SeqCst);
        assert!((1..=5).contains(&peak), "peak in-flight was {}", peak);
    }
}
