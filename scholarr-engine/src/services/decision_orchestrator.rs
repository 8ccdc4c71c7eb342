//! Per-release evaluation pipeline
//!
//! Turns raw releases into decisions: parse the title, bind it to catalog
//! identity, score custom formats, then run the specification chain. A
//! batch is evaluated concurrently but yields decisions in input order,
//! and a fault in one release never aborts the rest of the batch.

use anyhow::Result;
use futures::StreamExt;
use scholarr_common::config::EngineConfig;
use scholarr_common::models::{Quality, QualityModel, ReleaseInfo, ReleaseSource};
use sqlx::SqlitePool;
use tracing::{debug, error, trace};

use crate::db::{authors, works};
use crate::services::custom_formats::{FormatScorer, TermMatchingScorer};
use crate::services::identity_resolver::IdentityResolver;
use crate::services::specifications;
use crate::services::upgradable::UpgradeService;
use crate::services::{doi, title_parser};
use crate::types::{
    CandidateMatch, CustomFormat, Decision, ParsedReleaseInfo, Rejection, RejectionKind,
    SearchCriteria, SpecDecision, Specification, SpecificationPriority,
};

pub struct DecisionOrchestrator {
    pool: SqlitePool,
    config: EngineConfig,
    resolver: IdentityResolver,
    specifications: Vec<Box<dyn Specification>>,
    scorer: Box<dyn FormatScorer>,
}

impl DecisionOrchestrator {
    pub fn new(
        pool: SqlitePool,
        config: EngineConfig,
        specifications: Vec<Box<dyn Specification>>,
        scorer: Box<dyn FormatScorer>,
    ) -> Self {
        let resolver = IdentityResolver::new(pool.clone(), &config);
        Self {
            pool,
            config,
            resolver,
            specifications,
            scorer,
        }
    }

    /// Orchestrator with the built-in specification chain and the term
    /// matching format scorer
    pub fn with_built_in(
        pool: SqlitePool,
        config: EngineConfig,
        formats: Vec<CustomFormat>,
    ) -> Self {
        let upgrade = UpgradeService::new(config.prefer_propers_and_repacks);
        Self::new(
            pool,
            config,
            specifications::built_in(upgrade),
            Box::new(TermMatchingScorer::new(formats)),
        )
    }

    /// Evaluate releases from a passive feed scan
    pub async fn evaluate_rss(&self, releases: Vec<ReleaseInfo>) -> Vec<Decision> {
        self.evaluate_batch(releases, None, false).await
    }

    /// Evaluate releases pushed directly by an indexer
    pub async fn evaluate_push(&self, releases: Vec<ReleaseInfo>) -> Vec<Decision> {
        self.evaluate_batch(releases, None, true).await
    }

    /// Evaluate releases returned by an active search
    pub async fn evaluate_search(
        &self,
        releases: Vec<ReleaseInfo>,
        criteria: &SearchCriteria,
    ) -> Vec<Decision> {
        self.evaluate_batch(releases, Some(criteria), false).await
    }

    async fn evaluate_batch(
        &self,
        releases: Vec<ReleaseInfo>,
        criteria: Option<&SearchCriteria>,
        pushed: bool,
    ) -> Vec<Decision> {
        let source = source_for(criteria, pushed);

        futures::stream::iter(releases)
            .map(|release| async move {
                match self.evaluate_one(&release, criteria).await {
                    Ok(decision) => decision.map(|mut decision| {
                        decision.candidate.source = source;
                        trace!(
                            release = %release.title,
                            accepted = decision.accepted(),
                            "Release evaluated"
                        );
                        decision
                    }),
                    Err(err) => {
                        error!(release = %release.title, error = %err, "Couldn't evaluate release");
                        let candidate =
                            CandidateMatch::bare(release, ParsedReleaseInfo::default());
                        Some(Decision::reject(
                            candidate,
                            vec![Rejection::permanent("Unexpected error processing release")],
                        ))
                    }
                }
            })
            .buffered(self.config.evaluation_concurrency)
            .filter_map(|decision| async move { decision })
            .collect()
            .await
    }

    /// Evaluate a single release
    ///
    /// `None` means the release was unparseable and no search context could
    /// rescue it; such releases produce no decision at all.
    async fn evaluate_one(
        &self,
        release: &ReleaseInfo,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Option<Decision>> {
        debug!(release = %release.title, indexer = %release.indexer, "Processing release");

        let release_doi = release
            .doi
            .as_deref()
            .and_then(doi::normalize)
            .or_else(|| doi::extract_from_text(&release.title));
        let doi_matched = match (criteria, release_doi.as_deref()) {
            (Some(criteria), Some(release_doi)) => doi::dois_for_criteria(criteria)
                .iter()
                .any(|target| target == release_doi),
            _ => false,
        };

        let mut parsed = title_parser::parse_title(&release.title);

        if parsed.is_none() {
            parsed = match criteria {
                Some(criteria) => title_parser::parse_with_criteria(
                    &release.title,
                    criteria,
                    self.config.author_match_threshold,
                ),
                None => self.parse_against_catalog(&release.title).await?,
            };
        }

        // Some indexers report author and work as structured fields even
        // when the title itself defeats parsing
        if parsed.is_none() {
            if let (Some(author), Some(work)) = (&release.author, &release.work) {
                debug!(author, work, "Synthesized parse from indexer fields");
                parsed = Some(ParsedReleaseInfo {
                    author_name: Some(author.clone()),
                    work_title: Some(work.clone()),
                    quality: title_parser::parse_quality(&release.title),
                    ..Default::default()
                });
            }
        }

        if let Some(criteria) = criteria {
            let parsed = parsed.get_or_insert_with(|| ParsedReleaseInfo {
                quality: title_parser::parse_quality(&release.title),
                ..Default::default()
            });
            fill_from_context(parsed, release, criteria, doi_matched);
        }

        let Some(parsed) = parsed else {
            debug!(release = %release.title, "Unable to parse release, skipping");
            return Ok(None);
        };

        let author = self
            .resolver
            .resolve_author(&parsed, criteria, doi_matched)
            .await?;
        let Some(author) = author else {
            debug!(release = %release.title, "No catalog author matched");
            return Ok(Some(Decision::reject(
                CandidateMatch::bare(release.clone(), parsed),
                vec![Rejection::permanent("Unknown Author")],
            )));
        };

        let mut resolved_works = self
            .resolver
            .resolve_works(&author, &parsed, criteria, release_doi.as_deref())
            .await?;

        // The DOI is a strong identifier: when it matches the search target
        // the release covers the searched works even if the title named
        // them unrecognizably
        if resolved_works.is_empty() && doi_matched {
            if let Some(criteria) = criteria {
                resolved_works = criteria.works.clone();
            }
        }

        if resolved_works.is_empty() {
            debug!(release = %release.title, author = %author.name, "No catalog works matched");
            let mut candidate = CandidateMatch::bare(release.clone(), parsed);
            candidate.author = Some(author);
            return Ok(Some(Decision::reject(
                candidate,
                vec![Rejection::permanent(
                    "Unable to parse works from release name",
                )],
            )));
        }

        let custom_formats = self.scorer.formats_for(release);
        let custom_format_score = self.scorer.score(&custom_formats);

        let candidate = CandidateMatch {
            parsed,
            author: Some(author),
            works: resolved_works,
            release: release.clone(),
            custom_formats,
            custom_format_score,
            download_allowed: true,
            source: ReleaseSource::Rss,
        };

        let rejections = self.run_chain(&candidate, criteria);
        Ok(Some(Decision {
            candidate,
            rejections,
        }))
    }

    /// Last-resort parse for passive scans: look for a known author's clean
    /// name inside the title, then for one of that author's work titles
    async fn parse_against_catalog(&self, title: &str) -> Result<Option<ParsedReleaseInfo>> {
        let candidates = authors::fuzzy_author_candidates(&self.pool, title).await?;

        // Longest matching name wins so "Iain M. Banks" beats "Iain Banks"
        let Some(author) = candidates
            .into_iter()
            .max_by_key(|author| author.clean_name.len())
        else {
            return Ok(None);
        };

        let work_title = works::fuzzy_work_candidates(&self.pool, author.id, title)
            .await?
            .into_iter()
            .next()
            .map(|work| work.title);

        debug!(title, author = %author.name, "Catalog-guided parse matched");

        Ok(Some(ParsedReleaseInfo {
            author_name: Some(author.name.clone()),
            work_title,
            quality: title_parser::parse_quality(title),
            ..Default::default()
        }))
    }

    /// Run the specification chain in priority groups
    ///
    /// All rules in a group run and every failure is collected, but a
    /// failing group stops later groups from running at all.
    fn run_chain(
        &self,
        candidate: &CandidateMatch,
        criteria: Option<&SearchCriteria>,
    ) -> Vec<Rejection> {
        let mut priorities: Vec<SpecificationPriority> =
            self.specifications.iter().map(|s| s.priority()).collect();
        priorities.sort();
        priorities.dedup();

        for priority in priorities {
            let rejections: Vec<Rejection> = self
                .specifications
                .iter()
                .filter(|spec| spec.priority() == priority)
                .filter_map(|spec| self.evaluate_spec(spec.as_ref(), candidate, criteria))
                .collect();

            if !rejections.is_empty() {
                return rejections;
            }
        }

        Vec::new()
    }

    fn evaluate_spec(
        &self,
        spec: &dyn Specification,
        candidate: &CandidateMatch,
        criteria: Option<&SearchCriteria>,
    ) -> Option<Rejection> {
        match spec.evaluate(candidate, criteria) {
            Ok(SpecDecision::Accept) => None,
            Ok(SpecDecision::Reject(reason)) => {
                debug!(spec = spec.name(), %reason, "Specification rejected release");
                Some(Rejection::from_spec(
                    spec.name(),
                    reason,
                    spec.rejection_kind(),
                ))
            }
            Err(err) => {
                debug!(spec = spec.name(), error = %err, "Specification failed to evaluate");
                Some(Rejection::from_spec(
                    spec.name(),
                    format!("{}: evaluation failed", spec.name()),
                    RejectionKind::Permanent,
                ))
            }
        }
    }
}

/// Fill parse gaps from indexer fields and, when the DOI matches, from the
/// search target itself
fn fill_from_context(
    parsed: &mut ParsedReleaseInfo,
    release: &ReleaseInfo,
    criteria: &SearchCriteria,
    doi_matched: bool,
) {
    if !parsed.has_author() {
        if let Some(author) = &release.author {
            parsed.author_name = Some(author.clone());
        } else if doi_matched {
            if let Some(target) = &criteria.author {
                debug!(author = %target.name, "Filling author from search target on DOI match");
                parsed.author_name = Some(target.name.clone());
            }
        }
    }

    if parsed.work_title.is_none() {
        if let Some(work) = &release.work {
            parsed.work_title = Some(work.clone());
        } else if doi_matched {
            if let Some(target) = criteria.works.first() {
                parsed.work_title = Some(target.title.clone());
            }
        }
    }

    // Academic releases frequently omit a quality token; PDF is the safe
    // assumption within an active search
    if parsed.quality.quality == Quality::Unknown {
        parsed.quality = QualityModel::new(Quality::Pdf);
    }
}

fn source_for(criteria: Option<&SearchCriteria>, pushed: bool) -> ReleaseSource {
    if pushed {
        return ReleaseSource::ReleasePush;
    }
    match criteria {
        Some(criteria) if criteria.interactive => ReleaseSource::InteractiveSearch,
        Some(criteria) if criteria.user_invoked => ReleaseSource::UserInvokedSearch,
        Some(_) => ReleaseSource::Search,
        None => ReleaseSource::Rss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_pool;
    use crate::types::SpecError;
    use scholarr_common::models::{Author, AuthorKind, Link, Work};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RecordingSpec {
        name: &'static str,
        priority: SpecificationPriority,
        verdict: Result<SpecDecision, ()>,
        calls: Arc<AtomicUsize>,
    }

    impl RecordingSpec {
        fn accepting(calls: Arc<AtomicUsize>) -> Self {
            Self {
                name: "Recording",
                priority: SpecificationPriority::Default,
                verdict: Ok(SpecDecision::Accept),
                calls,
            }
        }

        fn rejecting(reason: &str) -> Self {
            Self {
                name: "Rejecting",
                priority: SpecificationPriority::Default,
                verdict: Ok(SpecDecision::reject(reason)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                name: "Failing",
                priority: SpecificationPriority::Default,
                verdict: Err(()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn disk(calls: Arc<AtomicUsize>) -> Self {
            Self {
                name: "DiskRecording",
                priority: SpecificationPriority::Disk,
                verdict: Ok(SpecDecision::Accept),
                calls,
            }
        }
    }

    impl Specification for RecordingSpec {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> SpecificationPriority {
            self.priority
        }

        fn evaluate(
            &self,
            _candidate: &CandidateMatch,
            _criteria: Option<&SearchCriteria>,
        ) -> Result<SpecDecision, SpecError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.verdict {
                Ok(decision) => Ok(decision.clone()),
                Err(()) => Err(SpecError::Internal("boom".to_string())),
            }
        }
    }

    async fn orchestrator_with(specs: Vec<Box<dyn Specification>>) -> DecisionOrchestrator {
        let pool = init_test_pool().await.unwrap();
        DecisionOrchestrator::new(
            pool,
            EngineConfig::default(),
            specs,
            Box::new(TermMatchingScorer::default()),
        )
    }

    fn searched_pair() -> (Author, Work) {
        let author = Author::with_name("Jane Doe", AuthorKind::Person);
        let mut work = Work::with_title(author.id, "Deep Learning Methods");
        work.links.push(Link {
            name: "doi".to_string(),
            url: "10.1234/matching.doi".to_string(),
        });
        (author, work)
    }

    fn criteria_for(author: &Author, work: &Work) -> SearchCriteria {
        SearchCriteria {
            author: Some(author.clone()),
            works: vec![work.clone()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_parseable_release_reaches_specifications() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator =
            orchestrator_with(vec![Box::new(RecordingSpec::accepting(calls.clone()))]).await;

        let (author, work) = searched_pair();
        let release = ReleaseInfo::with_title("Jane Doe-Deep Learning Methods-EPUB-2020-GROUP");

        let decisions = orchestrator
            .evaluate_search(vec![release], &criteria_for(&author, &work))
            .await;

        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].accepted());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(decisions[0].candidate.source, ReleaseSource::Search);
        assert!(decisions[0].candidate.download_allowed);
    }

    #[tokio::test]
    async fn test_failing_specification_rejects_with_its_name() {
        let orchestrator =
            orchestrator_with(vec![Box::new(RecordingSpec::rejecting("no thanks"))]).await;

        let (author, work) = searched_pair();
        let release = ReleaseInfo::with_title("Jane Doe-Deep Learning Methods-EPUB-2020-GROUP");

        let decisions = orchestrator
            .evaluate_search(vec![release], &criteria_for(&author, &work))
            .await;

        assert!(!decisions[0].accepted());
        assert_eq!(decisions[0].rejections.len(), 1);
        assert_eq!(decisions[0].rejections[0].reason, "no thanks");
        assert_eq!(
            decisions[0].rejections[0].specification.as_deref(),
            Some("Rejecting")
        );
    }

    #[tokio::test]
    async fn test_disk_group_skipped_when_default_group_rejects() {
        let disk_calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = orchestrator_with(vec![
            Box::new(RecordingSpec::rejecting("cheap rule failed")),
            Box::new(RecordingSpec::disk(disk_calls.clone())),
        ])
        .await;

        let (author, work) = searched_pair();
        let release = ReleaseInfo::with_title("Jane Doe-Deep Learning Methods-EPUB-2020-GROUP");

        let decisions = orchestrator
            .evaluate_search(vec![release], &criteria_for(&author, &work))
            .await;

        assert!(!decisions[0].accepted());
        assert_eq!(disk_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_specification_fault_becomes_rejection() {
        let orchestrator = orchestrator_with(vec![Box::new(RecordingSpec::failing())]).await;

        let (author, work) = searched_pair();
        let release = ReleaseInfo::with_title("Jane Doe-Deep Learning Methods-EPUB-2020-GROUP");

        let decisions = orchestrator
            .evaluate_search(vec![release], &criteria_for(&author, &work))
            .await;

        assert!(!decisions[0].accepted());
        assert!(decisions[0].rejections[0].reason.contains("evaluation failed"));
        assert_eq!(
            decisions[0].rejections[0].specification.as_deref(),
            Some("Failing")
        );
    }

    #[tokio::test]
    async fn test_doi_match_rescues_unparseable_title() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator =
            orchestrator_with(vec![Box::new(RecordingSpec::accepting(calls.clone()))]).await;

        let (author, work) = searched_pair();
        let mut release = ReleaseInfo::with_title("paper_2023_final_v2_actually_final");
        release.doi = Some("10.1234/matching.doi".to_string());

        let decisions = orchestrator
            .evaluate_search(vec![release], &criteria_for(&author, &work))
            .await;

        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].accepted());
        let candidate = &decisions[0].candidate;
        assert_eq!(candidate.author.as_ref().unwrap().id, author.id);
        assert_eq!(candidate.works, vec![work]);
        // No quality token in the title, PDF assumed within the search
        assert_eq!(candidate.parsed.quality.quality, Quality::Pdf);
    }

    #[tokio::test]
    async fn test_unmatched_doi_leaves_author_unknown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator =
            orchestrator_with(vec![Box::new(RecordingSpec::accepting(calls.clone()))]).await;

        let (author, work) = searched_pair();
        let mut release = ReleaseInfo::with_title("paper_2023_final_v2_actually_final");
        release.doi = Some("10.9999/different.doi".to_string());

        let decisions = orchestrator
            .evaluate_search(vec![release], &criteria_for(&author, &work))
            .await;

        assert_eq!(decisions.len(), 1);
        assert!(!decisions[0].accepted());
        assert!(decisions[0].rejections[0].reason.contains("Unknown Author"));
        // Terminal rejection, the chain never runs
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_doi_leaves_author_unknown() {
        let orchestrator = orchestrator_with(vec![]).await;

        let (author, work) = searched_pair();
        let release = ReleaseInfo::with_title("paper_2023_final_v2_actually_final");

        let decisions = orchestrator
            .evaluate_search(vec![release], &criteria_for(&author, &work))
            .await;

        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].rejections[0].reason.contains("Unknown Author"));
    }

    #[tokio::test]
    async fn test_unparseable_rss_release_yields_no_decision() {
        let orchestrator = orchestrator_with(vec![]).await;

        let decisions = orchestrator
            .evaluate_rss(vec![ReleaseInfo::with_title("complete gibberish 12345")])
            .await;

        assert!(decisions.is_empty());
    }

    #[tokio::test]
    async fn test_rss_release_resolved_against_catalog() {
        let pool = init_test_pool().await.unwrap();
        let author = Author::with_name("Terry Pratchett", AuthorKind::Person);
        authors::save_author(&pool, &author).await.unwrap();
        let work = Work::with_title(author.id, "Small Gods");
        works::save_work(&pool, &work).await.unwrap();

        let orchestrator = DecisionOrchestrator::with_built_in(
            pool,
            EngineConfig::default(),
            vec![],
        );

        let decisions = orchestrator
            .evaluate_rss(vec![ReleaseInfo::with_title(
                "Terry.Pratchett.Small.Gods.2020.Retail.EPUB",
            )])
            .await;

        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].accepted());
        let candidate = &decisions[0].candidate;
        assert_eq!(candidate.author.as_ref().unwrap().id, author.id);
        assert_eq!(candidate.works[0].id, work.id);
        assert_eq!(candidate.source, ReleaseSource::Rss);
    }

    #[tokio::test]
    async fn test_storage_fault_produces_opaque_rejection() {
        let pool = init_test_pool().await.unwrap();
        let orchestrator = DecisionOrchestrator::new(
            pool.clone(),
            EngineConfig::default(),
            vec![],
            Box::new(TermMatchingScorer::default()),
        );
        pool.close().await;

        let decisions = orchestrator
            .evaluate_rss(vec![ReleaseInfo::with_title(
                "Jane Doe-Deep Learning Methods-EPUB-2020-GROUP",
            )])
            .await;

        assert_eq!(decisions.len(), 1);
        assert!(!decisions[0].accepted());
        assert_eq!(
            decisions[0].rejections[0].reason,
            "Unexpected error processing release"
        );
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let orchestrator = orchestrator_with(vec![]).await;

        let (author, work) = searched_pair();
        let releases = vec![
            ReleaseInfo::with_title("Jane Doe-Deep Learning Methods-EPUB-2020-AAA"),
            ReleaseInfo::with_title("Jane Doe-Deep Learning Methods-PDF-2020-BBB"),
        ];

        let decisions = orchestrator
            .evaluate_search(releases, &criteria_for(&author, &work))
            .await;

        assert_eq!(decisions.len(), 2);
        assert!(decisions[0].candidate.release.title.ends_with("AAA"));
        assert!(decisions[1].candidate.release.title.ends_with("BBB"));
    }

    #[tokio::test]
    async fn test_source_tagging() {
        let orchestrator = orchestrator_with(vec![]).await;
        let (author, work) = searched_pair();

        let mut criteria = criteria_for(&author, &work);
        criteria.interactive = true;
        let release = ReleaseInfo::with_title("Jane Doe-Deep Learning Methods-EPUB-2020-GROUP");

        let decisions = orchestrator
            .evaluate_search(vec![release.clone()], &criteria)
            .await;
        assert_eq!(
            decisions[0].candidate.source,
            ReleaseSource::InteractiveSearch
        );

        let pushed = orchestrator.evaluate_push(vec![release]).await;
        assert_eq!(pushed[0].candidate.source, ReleaseSource::ReleasePush);
    }
}
