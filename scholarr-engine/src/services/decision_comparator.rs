//! Ranking of accepted decisions
//!
//! A chained first-nonzero comparison over release properties; `Greater`
//! means the left decision is the better grab. Every tier compares a pure
//! key of each candidate on its own, which makes the chain a strict weak
//! ordering; protocol-specific signals (torrent swarm health, usenet
//! freshness) read as the neutral key for the other protocol. Missing
//! context (no author, no profile, unknown age) sorts below known values
//! instead of panicking.

use std::cmp::Ordering;

use scholarr_common::models::{DelayProfile, DownloadProtocol, QualityIndex, Revision};

use crate::types::{CandidateMatch, Decision};

pub struct DecisionComparator {
    prefer_propers_and_repacks: bool,
    delay_profiles: Vec<DelayProfile>,
}

impl DecisionComparator {
    pub fn new(prefer_propers_and_repacks: bool, delay_profiles: Vec<DelayProfile>) -> Self {
        Self {
            prefer_propers_and_repacks,
            delay_profiles,
        }
    }

    /// Compare two decisions; `Greater` means `a` ranks better
    pub fn compare(&self, a: &Decision, b: &Decision) -> Ordering {
        let x = &a.candidate;
        let y = &b.candidate;

        self.compare_quality(x, y)
            .then_with(|| x.custom_format_score.cmp(&y.custom_format_score))
            .then_with(|| self.compare_protocol(x, y))
            .then_with(|| compare_indexer_priority(x, y))
            .then_with(|| compare_swarm(x, y))
            .then_with(|| compare_work_count(x, y))
            .then_with(|| compare_age(x, y))
            .then_with(|| compare_size(x, y))
    }

    /// Sort a batch so the best grab comes first
    pub fn sort_best_first(&self, decisions: &mut [Decision]) {
        decisions.sort_by(|a, b| self.compare(b, a));
    }

    fn compare_quality(&self, x: &CandidateMatch, y: &CandidateMatch) -> Ordering {
        let index = quality_index(x).cmp(&quality_index(y));
        if !self.prefer_propers_and_repacks {
            return index;
        }

        index.then_with(|| quality_revision(x).cmp(&quality_revision(y)))
    }

    fn compare_protocol(&self, x: &CandidateMatch, y: &CandidateMatch) -> Ordering {
        self.is_preferred_protocol(x)
            .cmp(&self.is_preferred_protocol(y))
    }

    fn is_preferred_protocol(&self, candidate: &CandidateMatch) -> bool {
        let Some(author) = candidate.author.as_ref() else {
            return false;
        };

        match DelayProfile::best_for_tags(&self.delay_profiles, &author.tags) {
            Some(profile) => candidate.release.protocol == profile.preferred_protocol,
            None => false,
        }
    }
}

fn quality_index(candidate: &CandidateMatch) -> QualityIndex {
    match candidate.author.as_ref() {
        Some(author) => author
            .quality_profile
            .index_of(candidate.parsed.quality.quality),
        None => QualityIndex(None),
    }
}

fn quality_revision(candidate: &CandidateMatch) -> Revision {
    candidate.parsed.quality.revision
}

// Lower configured priority values are preferred
fn compare_indexer_priority(x: &CandidateMatch, y: &CandidateMatch) -> Ordering {
    x.release
        .indexer_priority
        .cmp(&y.release.indexer_priority)
        .reverse()
}

// Swarm health applies to torrents; other protocols carry the neutral key
fn compare_swarm(x: &CandidateMatch, y: &CandidateMatch) -> Ordering {
    swarm_magnitude(x, x.release.seeders)
        .cmp(&swarm_magnitude(y, y.release.seeders))
        .then_with(|| swarm_magnitude(x, x.release.peers).cmp(&swarm_magnitude(y, y.release.peers)))
}

// Order-of-magnitude buckets so small count differences don't dominate
fn swarm_magnitude(candidate: &CandidateMatch, count: Option<u32>) -> i64 {
    if candidate.release.protocol != DownloadProtocol::Torrent {
        return 0;
    }
    match count {
        Some(n) if n > 0 => (n as f64).log10().round() as i64,
        _ => 0,
    }
}

// Discography releases first, then the release covering more works
fn compare_work_count(x: &CandidateMatch, y: &CandidateMatch) -> Ordering {
    x.parsed
        .discography
        .cmp(&y.parsed.discography)
        .then_with(|| x.works.len().cmp(&y.works.len()))
}

// Freshness applies to usenet; other protocols and week-old posts carry
// the neutral key
fn compare_age(x: &CandidateMatch, y: &CandidateMatch) -> Ordering {
    age_bucket(x).cmp(&age_bucket(y))
}

fn age_bucket(candidate: &CandidateMatch) -> i64 {
    if candidate.release.protocol != DownloadProtocol::Usenet {
        return 0;
    }
    let Some(hours) = candidate.release.age_hours() else {
        return 0;
    };

    if hours < 1 {
        1000
    } else if hours <= 24 {
        100
    } else if hours <= 7 * 24 {
        10
    } else {
        0
    }
}

fn compare_size(x: &CandidateMatch, y: &CandidateMatch) -> Ordering {
    size_bucket(x.release.size).cmp(&size_bucket(y.release.size))
}

// Rounded to the nearest 200 MB so small differences don't dominate
fn size_bucket(size: i64) -> i64 {
    const BUCKET: f64 = 200.0 * 1024.0 * 1024.0;
    (size as f64 / BUCKET).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParsedReleaseInfo;
    use chrono::{Duration, Utc};
    use scholarr_common::models::{Author, AuthorKind, Quality, QualityModel, ReleaseInfo, Work};
    use uuid::Uuid;

    fn decision(quality: Quality) -> Decision {
        let mut candidate = CandidateMatch::bare(
            ReleaseInfo::with_title("test"),
            ParsedReleaseInfo {
                quality: QualityModel::new(quality),
                ..Default::default()
            },
        );
        candidate.author = Some(Author::with_name("Jane Doe", AuthorKind::Person));
        Decision::accept(candidate)
    }

    fn comparator() -> DecisionComparator {
        DecisionComparator::new(true, vec![])
    }

    #[test]
    fn test_higher_quality_wins() {
        let epub = decision(Quality::Epub);
        let pdf = decision(Quality::Pdf);
        assert_eq!(comparator().compare(&epub, &pdf), Ordering::Greater);
        assert_eq!(comparator().compare(&pdf, &epub), Ordering::Less);
    }

    #[test]
    fn test_proper_breaks_quality_tie_only_when_preferred() {
        let mut proper = decision(Quality::Epub);
        proper.candidate.parsed.quality = QualityModel::with_revision(Quality::Epub, 2);
        let plain = decision(Quality::Epub);

        assert_eq!(comparator().compare(&proper, &plain), Ordering::Greater);

        let indifferent = DecisionComparator::new(false, vec![]);
        // Falls through to indexer priority, equal here
        assert_eq!(indifferent.compare(&proper, &plain), Ordering::Equal);
    }

    #[test]
    fn test_format_score_breaks_quality_tie() {
        let mut scored = decision(Quality::Epub);
        scored.candidate.custom_format_score = 10;
        let plain = decision(Quality::Epub);

        assert_eq!(comparator().compare(&scored, &plain), Ordering::Greater);
    }

    #[test]
    fn test_preferred_protocol_via_delay_profile() {
        let comparator = DecisionComparator::new(
            true,
            vec![DelayProfile {
                tags: vec![],
                preferred_protocol: DownloadProtocol::Torrent,
                order: 1,
            }],
        );

        let mut torrent = decision(Quality::Epub);
        torrent.candidate.release.protocol = DownloadProtocol::Torrent;
        let usenet = decision(Quality::Epub);

        assert_eq!(comparator.compare(&torrent, &usenet), Ordering::Greater);
    }

    #[test]
    fn test_lower_indexer_priority_value_wins() {
        let mut high = decision(Quality::Epub);
        high.candidate.release.indexer_priority = 1;
        let mut low = decision(Quality::Epub);
        low.candidate.release.indexer_priority = 50;

        assert_eq!(comparator().compare(&high, &low), Ordering::Greater);
    }

    #[test]
    fn test_torrent_seeders_compared_in_magnitudes() {
        let torrent = |seeders: u32| {
            let mut d = decision(Quality::Epub);
            d.candidate.release.protocol = DownloadProtocol::Torrent;
            d.candidate.release.seeders = Some(seeders);
            d
        };

        // 8 vs 80: one order of magnitude apart
        assert_eq!(comparator().compare(&torrent(80), &torrent(8)), Ordering::Greater);
        // 80 vs 110 round to the same magnitude
        assert_eq!(comparator().compare(&torrent(80), &torrent(110)), Ordering::Equal);
    }

    #[test]
    fn test_usenet_age_buckets() {
        let aged = |hours: i64| {
            let mut d = decision(Quality::Epub);
            d.candidate.release.publish_date = Some(Utc::now() - Duration::hours(hours));
            d
        };

        assert_eq!(comparator().compare(&aged(2), &aged(48)), Ordering::Greater);
        // Same bucket: falls through to size, equal here
        assert_eq!(comparator().compare(&aged(3), &aged(20)), Ordering::Equal);
    }

    #[test]
    fn test_discography_and_work_count() {
        let mut disco = decision(Quality::Epub);
        disco.candidate.parsed.discography = true;
        let single = decision(Quality::Epub);

        assert_eq!(comparator().compare(&disco, &single), Ordering::Greater);
    }

    #[test]
    fn test_sort_best_first() {
        let best = decision(Quality::Flac);
        let middle = decision(Quality::Epub);
        let worst = decision(Quality::Pdf);

        let mut decisions = vec![middle, worst, best];
        comparator().sort_best_first(&mut decisions);

        let qualities: Vec<Quality> = decisions
            .iter()
            .map(|d| d.candidate.parsed.quality.quality)
            .collect();
        assert_eq!(qualities, vec![Quality::Flac, Quality::Epub, Quality::Pdf]);
    }

    // Deterministic xorshift so a failing sample set reproduces
    fn next(state: &mut u64) -> u64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        *state
    }

    fn random_decision(state: &mut u64) -> Decision {
        let qualities = [Quality::Pdf, Quality::Epub, Quality::Flac];
        let mut d = decision(qualities[(next(state) % 3) as usize]);
        let c = &mut d.candidate;

        c.custom_format_score = (next(state) % 3) as i64 - 1;
        c.release.protocol = if next(state) % 2 == 0 {
            DownloadProtocol::Usenet
        } else {
            DownloadProtocol::Torrent
        };
        c.release.indexer_priority = ((next(state) % 3) * 25) as i64;
        c.release.seeders = Some((next(state) % 500) as u32);
        c.release.peers = Some((next(state) % 500) as u32);
        c.release.publish_date = Some(Utc::now() - Duration::hours((next(state) % 400) as i64));
        c.release.size = ((next(state) % 8) as i64) * 150 * 1024 * 1024;
        c.parsed.discography = next(state) % 2 == 0;
        for _ in 0..(next(state) % 3) {
            c.works.push(Work::with_title(Uuid::new_v4(), "Sample"));
        }

        d
    }

    #[test]
    fn test_compare_is_a_strict_weak_ordering() {
        let comparator = comparator();
        let mut state = 0x2545F4914F6CDD1D_u64;
        let samples: Vec<Decision> = (0..24).map(|_| random_decision(&mut state)).collect();

        for a in &samples {
            assert_eq!(comparator.compare(a, a), Ordering::Equal);
        }

        for a in &samples {
            for b in &samples {
                assert_eq!(
                    comparator.compare(a, b),
                    comparator.compare(b, a).reverse()
                );
            }
        }

        for a in &samples {
            for b in &samples {
                for c in &samples {
                    let ab = comparator.compare(a, b);
                    let bc = comparator.compare(b, c);
                    let ac = comparator.compare(a, c);

                    if ab == Ordering::Equal && bc == Ordering::Equal {
                        assert_eq!(ac, Ordering::Equal);
                    }
                    if ab != Ordering::Less
                        && bc != Ordering::Less
                        && (ab == Ordering::Greater || bc == Ordering::Greater)
                    {
                        assert_eq!(ac, Ordering::Greater);
                    }
                }
            }
        }
    }
}
