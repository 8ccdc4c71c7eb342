//! Catalog identity resolution
//!
//! Binds parsed release text (plus optional search context) to a catalog
//! author and work list. Resolution is a priority chain that short-circuits
//! at the first success; coming up empty is a normal outcome that the
//! orchestrator turns into a terminal rejection, not an error.

use anyhow::Result;
use scholarr_common::clean::{clean_author_name, clean_work_title};
use scholarr_common::config::EngineConfig;
use scholarr_common::models::{Author, Work};
use sqlx::SqlitePool;
use strsim::jaro_winkler;
use tracing::debug;

use crate::db::{authors, works};
use crate::services::doi;
use crate::types::{ParsedReleaseInfo, SearchCriteria};

pub struct IdentityResolver {
    pool: SqlitePool,
    author_match_threshold: f64,
    work_match_threshold: f64,
}

impl IdentityResolver {
    pub fn new(pool: SqlitePool, config: &EngineConfig) -> Self {
        Self {
            pool,
            author_match_threshold: config.author_match_threshold,
            work_match_threshold: config.work_match_threshold,
        }
    }

    /// Resolve the author a release belongs to
    ///
    /// Text-based steps need a parsed author name; when parsing produced
    /// none, only a DOI match against the search target can justify
    /// adopting the criteria's author.
    pub async fn resolve_author(
        &self,
        parsed: &ParsedReleaseInfo,
        criteria: Option<&SearchCriteria>,
        doi_matched: bool,
    ) -> Result<Option<Author>> {
        let target = criteria.and_then(|c| c.author.as_ref());

        if parsed.has_author() {
            let name = parsed.author_name.as_deref().unwrap_or_default();
            let clean = clean_author_name(name);

            // Closed-world search: an explicit target author with target
            // works is trusted outright
            if let (Some(target), Some(c)) = (target, criteria) {
                if !c.works.is_empty() {
                    return Ok(Some(target.clone()));
                }
                if clean == target.clean_name {
                    return Ok(Some(target.clone()));
                }
            }

            if let Some(author) = authors::find_author_by_clean_name(&self.pool, &clean).await? {
                return Ok(Some(author));
            }

            if let Some(author) =
                authors::find_author_by_name_inexact(&self.pool, name, self.author_match_threshold)
                    .await?
            {
                debug!(name, resolved = %author.name, "Fuzzy author match");
                return Ok(Some(author));
            }
        }

        // DOI equality beats a failed text parse
        if doi_matched {
            if let Some(target) = target {
                debug!(author = %target.name, "Adopting search author on DOI match");
                return Ok(Some(target.clone()));
            }
        }

        Ok(None)
    }

    /// Resolve the specific work(s) a release covers, given its author
    pub async fn resolve_works(
        &self,
        author: &Author,
        parsed: &ParsedReleaseInfo,
        criteria: Option<&SearchCriteria>,
        release_doi: Option<&str>,
    ) -> Result<Vec<Work>> {
        // Discography requests bypass single-title matching entirely
        if parsed.discography {
            return works::works_between_dates(
                &self.pool,
                author.id,
                parsed.discography_start,
                parsed.discography_end,
            )
            .await;
        }

        let target_works = criteria.map(|c| c.works.as_slice()).unwrap_or_default();

        if let Some(title) = parsed.work_title.as_deref() {
            let clean = clean_work_title(title);

            if let Some(work) = target_works.iter().find(|w| w.clean_title == clean) {
                return Ok(vec![work.clone()]);
            }

            // Only the single best fuzzy target match counts; returning the
            // whole target list for an unmatched specific title would
            // mis-attribute content
            let best_target = target_works
                .iter()
                .map(|w| (jaro_winkler(&clean, &w.clean_title), w))
                .filter(|(score, _)| *score >= self.work_match_threshold)
                .max_by(|(a, _), (b, _)| a.total_cmp(b));
            if let Some((score, work)) = best_target {
                debug!(title, work = %work.title, score, "Fuzzy work match against search target");
                return Ok(vec![work.clone()]);
            }

            if let Some(work) =
                works::find_work_by_clean_title(&self.pool, author.id, &clean).await?
            {
                return Ok(vec![work]);
            }

            if let Some(work) = works::find_work_by_title_inexact(
                &self.pool,
                author.id,
                title,
                self.work_match_threshold,
            )
            .await?
            {
                return Ok(vec![work]);
            }

            return Ok(Vec::new());
        }

        // No parsed title: a DOI match is the only safe way to pick a work
        if let Some(release_doi) = release_doi.and_then(doi::normalize) {
            if let Some(work) = target_works
                .iter()
                .find(|w| w.doi_link().and_then(doi::normalize).as_deref() == Some(&release_doi))
            {
                return Ok(vec![work.clone()]);
            }

            if let Some(work) = works::find_work_by_doi(&self.pool, &release_doi).await? {
                return Ok(vec![work]);
            }
        }

        Ok(Vec::new())
    }
}
