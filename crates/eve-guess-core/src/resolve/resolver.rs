//! The cascading name resolution pipeline.
//!
//! Stages, in order, each against the candidate names of the current pass:
//! 1. numeric id lookup
//! 2. shortcut expansion (rewrites the query, never answers by itself)
//! 3. every query word is a word of the name
//! 4. name starts with the query
//! 5. name ends with the query
//! 6. name contains the query
//! 7. best fuzzy match from the bucket's index
//!
//! The first stage that still has candidates after the published filter wins,
//! and among those the shortest name is picked. If nothing matched, a second
//! pass runs against punctuation-stripped names.

use crate::cache::{CacheBucket, Catalog};
use crate::models::{AsEntity, Category, Entity};
use crate::resolve::filter::PublishedFilter;
use crate::resolve::normalize::char_len;
use crate::resolve::shortcuts::expand_shortcut;
use crate::{GuessError, Result};
use std::sync::Arc;
use tracing::debug;

/// Passes after the first one, each against normalized names.
const MAX_NORMALIZATION_RETRIES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Names as ESI spells them.
    Original,
    /// Names with quotes and commas stripped, lowercased.
    Normalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AllWords,
    Prefix,
    Suffix,
    Substring,
    Fuzzy,
}

impl Pass {
    fn for_depth(depth: usize) -> Self {
        if depth == 0 {
            Pass::Original
        } else {
            Pass::Normalized
        }
    }

    /// The retry pass only re-runs the literal string stages.
    fn stages(self) -> &'static [Stage] {
        match self {
            Pass::Original => &[
                Stage::AllWords,
                Stage::Prefix,
                Stage::Suffix,
                Stage::Substring,
                Stage::Fuzzy,
            ],
            Pass::Normalized => &[Stage::Prefix, Stage::Suffix, Stage::Substring],
        }
    }

    /// Lowercase name the literal stages compare against.
    fn match_name<'a>(self, bucket: &'a CacheBucket, position: usize) -> &'a str {
        match self {
            Pass::Original => bucket.lower_name(position),
            Pass::Normalized => bucket.normalized_name(position),
        }
    }

    /// Name whose length decides between candidates.
    fn ranking_name<'a>(self, bucket: &'a CacheBucket, position: usize) -> &'a str {
        match self {
            Pass::Original => &bucket.entities()[position].name,
            Pass::Normalized => bucket.normalized_name(position),
        }
    }
}

/// The query after shortcut expansion, in the forms the stages need.
struct PreparedQuery {
    text: String,
    lower: String,
}

impl PreparedQuery {
    fn new(raw: &str) -> Self {
        let text = expand_shortcut(raw).unwrap_or_else(|| raw.to_string());
        let lower = text.to_lowercase();
        Self { text, lower }
    }

    fn words(&self) -> impl Iterator<Item = &str> {
        self.lower.split_whitespace()
    }
}

struct Candidate<'a> {
    position: usize,
    entity: &'a Entity,
    name_len: usize,
}

impl AsEntity for Candidate<'_> {
    fn entity(&self) -> &Entity {
        self.entity
    }
}

/// Resolves free-text queries against the published catalog.
pub struct Resolver {
    catalog: Arc<Catalog>,
    filter: PublishedFilter,
}

impl Resolver {
    pub fn new(catalog: Arc<Catalog>, filter: PublishedFilter) -> Self {
        Self { catalog, filter }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Reject queries no catalog name could ever match.
    pub fn validate(&self, query: &str) -> Result<()> {
        if query.is_empty() {
            return Err(GuessError::invalid_query("Query must not be empty"));
        }

        let longest = self.catalog.longest_known_name_length();
        let length = char_len(query);
        if length > longest {
            return Err(GuessError::invalid_query(format!(
                "Query too long ({} > {} characters)",
                length, longest
            )));
        }
        Ok(())
    }

    /// Best catalog entity for `query`, or `None`.
    pub async fn resolve(&self, category: Category, query: &str) -> Result<Option<Entity>> {
        self.validate(query)?;

        // One bucket generation for the whole call.
        let bucket = self
            .catalog
            .bucket(category)
            .ok_or(GuessError::CatalogNotLoaded(category))?;

        if let Some(answer) = bucket.memoized(query) {
            debug!(
                "(Cache): {} -> {:?}",
                query,
                answer.as_ref().map(|e| e.name.as_str())
            );
            return Ok(answer);
        }

        let answer = self.guess(&bucket, query).await;
        bucket.memoize(query, answer.clone());
        debug!(
            "(Guess): {} -> {:?}",
            query,
            answer.as_ref().map(|e| e.name.as_str())
        );

        Ok(answer)
    }

    async fn guess(&self, bucket: &CacheBucket, raw: &str) -> Option<Entity> {
        if let Some(entity) = self.lookup_id(bucket, raw).await {
            return Some(entity.clone());
        }

        let query = PreparedQuery::new(raw);
        for depth in 0..=MAX_NORMALIZATION_RETRIES {
            let pass = Pass::for_depth(depth);
            if let Some(position) = self.run_pass(bucket, pass, &query).await {
                return Some(bucket.entities()[position].clone());
            }
        }

        None
    }

    async fn lookup_id<'a>(&self, bucket: &'a CacheBucket, raw: &str) -> Option<&'a Entity> {
        let id = raw.trim().parse::<i64>().ok()?;
        let entity = bucket.get_by_id(id)?;
        self.filter.is_published(entity).await.then_some(entity)
    }

    async fn run_pass(
        &self,
        bucket: &CacheBucket,
        pass: Pass,
        query: &PreparedQuery,
    ) -> Option<usize> {
        for &stage in pass.stages() {
            let positions = Self::stage_matches(bucket, pass, stage, query);
            if positions.is_empty() {
                continue;
            }

            let candidates: Vec<Candidate<'_>> = positions
                .into_iter()
                .map(|position| Candidate {
                    position,
                    entity: &bucket.entities()[position],
                    name_len: char_len(pass.ranking_name(bucket, position)),
                })
                .collect();
            let found = candidates.len();

            let survivors = self.filter.filter(candidates).await;
            debug!(
                "{:?}/{:?}: {} candidate(s), {} published",
                pass,
                stage,
                found,
                survivors.len()
            );

            // min_by_key keeps the first of equally short names.
            if let Some(best) = survivors.iter().min_by_key(|c| c.name_len) {
                return Some(best.position);
            }
        }
        None
    }

    fn stage_matches(
        bucket: &CacheBucket,
        pass: Pass,
        stage: Stage,
        query: &PreparedQuery,
    ) -> Vec<usize> {
        let positions = 0..bucket.len();
        let needle = query.lower.as_str();

        match stage {
            Stage::AllWords => {
                let words: Vec<&str> = query.words().collect();
                if words.is_empty() {
                    return Vec::new();
                }
                positions
                    .filter(|&p| {
                        let name_words: Vec<&str> =
                            bucket.normalized_name(p).split_whitespace().collect();
                        words.iter().all(|w| name_words.contains(w))
                    })
                    .collect()
            }
            Stage::Prefix => positions
                .filter(|&p| pass.match_name(bucket, p).starts_with(needle))
                .collect(),
            Stage::Suffix => positions
                .filter(|&p| pass.match_name(bucket, p).ends_with(needle))
                .collect(),
            Stage::Substring => positions
                .filter(|&p| pass.match_name(bucket, p).contains(needle))
                .collect(),
            Stage::Fuzzy => bucket
                .index()
                .search(&query.text)
                .into_iter()
                .take(1)
                .collect(),
        }
    }
}
