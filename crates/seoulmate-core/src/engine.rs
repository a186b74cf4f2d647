//! Recommendation Engine
//!
//! ## Pipeline
//!
//! 1. Understand: normalize, classify intent, extract entities, expand
//! 2. Weight: intent and confidence pick alpha, boost and filter hints
//! 3. Retrieve: semantic and lexical channels run concurrently
//! 4. Fuse: per-request min-max normalization, linear weighting, merge by id
//! 5. Adjust: popularity boost, then filters (before truncation)
//! 6. Rerank: top-M by a relevance model under a deadline
//! 7. Truncate to `top_n` and notify observers
//!
//! `recommend` never fails. Every problem on the way becomes a
//! [`DegradationReason`] on the returned [`Recommendation`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogItem, InMemoryCatalog};
use crate::config::{ConfigError, EngineConfig};
use crate::observer::{RecommendationEvent, RecommendationObserver};
use crate::query::{normalize, EntityExtractor, Intent, Query, QueryAnalysis, QueryExpander};
use crate::recommendation::{DegradationReason, RankedItem, RecommendRequest, Recommendation};
use crate::search::{
    apply_popularity_boost, compare_candidates, fuse, sort_candidates, Bm25Index, CachedHits,
    Candidate, FuzzyTitleMatcher, LexicalIndex, LexicalOutcome, LexicalRetriever, QueryCache,
    RelevanceModel, Reranker, RerankerError, RetrieverError, SemanticIndex, SemanticRetriever,
    TermOverlapModel, TitleMatcher,
};
use crate::weighting::WeightingPolicy;

// ============================================================================
// BUILDER
// ============================================================================

/// Assembles an engine from configuration and collaborators
pub struct EngineBuilder {
    config: EngineConfig,
    catalog: Arc<dyn Catalog>,
    semantic: Option<Arc<dyn SemanticIndex>>,
    lexical: Option<Arc<dyn LexicalIndex>>,
    titles: Option<Arc<dyn TitleMatcher>>,
    relevance: Option<Arc<dyn RelevanceModel>>,
    known_titles: Vec<String>,
    observers: Vec<Arc<dyn RecommendationObserver>>,
}

impl EngineBuilder {
    /// Start from a configuration and a catalog
    pub fn new(config: EngineConfig, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            config,
            catalog,
            semantic: None,
            lexical: None,
            titles: None,
            relevance: None,
            known_titles: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Dense nearest-neighbour index for the semantic channel
    pub fn semantic_index(mut self, index: Arc<dyn SemanticIndex>) -> Self {
        self.semantic = Some(index);
        self
    }

    /// Inverted-index ranker for the lexical channel
    pub fn lexical_index(mut self, index: Arc<dyn LexicalIndex>) -> Self {
        self.lexical = Some(index);
        self
    }

    /// Approximate title matcher for fuzzy fallback and reference lookup
    pub fn title_matcher(mut self, matcher: Arc<dyn TitleMatcher>) -> Self {
        self.titles = Some(matcher);
        self
    }

    /// Relevance model for the rerank stage
    pub fn relevance_model(mut self, model: Arc<dyn RelevanceModel>) -> Self {
        self.relevance = Some(model);
        self
    }

    /// Catalog titles recognized as SPECIFIC_TITLE queries
    pub fn known_titles(mut self, titles: impl IntoIterator<Item = String>) -> Self {
        self.known_titles.extend(titles);
        self
    }

    /// Register an observer
    pub fn observer(mut self, observer: Arc<dyn RecommendationObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Validate configuration and compile lexicons
    pub fn build(self) -> Result<RecommendationEngine, ConfigError> {
        let mut config = self.config;
        config.weighting = config.weighting.merged_with_defaults();
        config.validate()?;

        let mut titles = std::mem::take(&mut config.lexicon.titles);
        titles.extend(self.known_titles);
        titles.sort_by_key(|t| normalize(t));
        titles.dedup_by_key(|t| normalize(t));
        titles.retain(|t| !normalize(t).is_empty());
        config.lexicon.titles = titles;

        let extractor = EntityExtractor::new(&config.lexicon)?;
        let cache: Arc<QueryCache<CachedHits>> =
            Arc::new(QueryCache::new(config.cache.capacity, config.cache.shards));

        let semantic = self
            .semantic
            .map(|index| Arc::new(SemanticRetriever::new(index, Arc::clone(&cache))));
        let lexical = self.lexical.map(|index| {
            Arc::new(LexicalRetriever::new(
                index,
                self.titles.clone(),
                Arc::clone(&self.catalog),
                config.fuzzy,
            ))
        });
        let reranker = self
            .relevance
            .map(|model| Reranker::new(model, config.retrieval.reranker()));

        tracing::debug!(
            semantic = semantic.is_some(),
            lexical = lexical.is_some(),
            rerank = reranker.is_some(),
            titles = config.lexicon.titles.len(),
            "Recommendation engine built"
        );

        Ok(RecommendationEngine {
            expander: QueryExpander::new(config.expansion.clone()),
            policy: WeightingPolicy::new(config.weighting.clone()),
            extractor,
            catalog: self.catalog,
            semantic,
            lexical,
            titles: self.titles,
            reranker,
            observers: self.observers,
            config: Arc::new(config),
        })
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Hybrid retrieval and ranking engine
///
/// Immutable after construction and safe to share across concurrent
/// requests; the semantic result cache is the only internal mutable state.
pub struct RecommendationEngine {
    config: Arc<EngineConfig>,
    extractor: EntityExtractor,
    expander: QueryExpander,
    policy: WeightingPolicy,
    catalog: Arc<dyn Catalog>,
    semantic: Option<Arc<SemanticRetriever>>,
    lexical: Option<Arc<LexicalRetriever>>,
    titles: Option<Arc<dyn TitleMatcher>>,
    reranker: Option<Reranker>,
    observers: Vec<Arc<dyn RecommendationObserver>>,
}

/// Fused candidate joined with its catalog record
struct Ranked {
    candidate: Candidate,
    item: Arc<CatalogItem>,
}

impl RecommendationEngine {
    /// Start building an engine
    pub fn builder(config: EngineConfig, catalog: Arc<dyn Catalog>) -> EngineBuilder {
        EngineBuilder::new(config, catalog)
    }

    /// Engine over an in-memory catalog with the built-in collaborators
    pub fn from_catalog(config: EngineConfig, catalog: Arc<InMemoryCatalog>) -> Result<Self, ConfigError> {
        Self::builder_from_catalog(config, catalog).build()
    }

    /// Builder preloaded with the built-in collaborators for an in-memory catalog
    ///
    /// Lexical search uses BM25 with fuzzy title fallback and reranking uses
    /// term overlap. With the `embeddings` feature a dense index and a
    /// cross-encoder are loaded as well; without it the semantic channel is
    /// reported unavailable and results rank on the lexical channel alone.
    pub fn builder_from_catalog(
        config: EngineConfig,
        catalog: Arc<InMemoryCatalog>,
    ) -> EngineBuilder {
        let items: Vec<&CatalogItem> = catalog.items().map(|item| item.as_ref()).collect();
        let titles = FuzzyTitleMatcher::build(items.iter().copied());
        let known: Vec<String> = items.iter().map(|item| item.title.clone()).collect();

        let mut builder = EngineBuilder::new(config, Arc::clone(&catalog) as Arc<dyn Catalog>)
            .title_matcher(Arc::new(titles))
            .relevance_model(Arc::new(TermOverlapModel))
            .known_titles(known);

        match Bm25Index::build(items.iter().copied()) {
            Ok(bm25) => builder = builder.lexical_index(Arc::new(bm25)),
            Err(e) => tracing::warn!(error = %e, "Keyword index unavailable"),
        }

        #[cfg(feature = "embeddings")]
        {
            match crate::search::DenseIndex::build(items.iter().copied()) {
                Ok(dense) => builder = builder.semantic_index(Arc::new(dense)),
                Err(e) => tracing::warn!(error = %e, "Dense index unavailable"),
            }
            match crate::search::CrossEncoderModel::try_new() {
                Ok(model) => builder = builder.relevance_model(Arc::new(model)),
                Err(e) => tracing::warn!(error = %e, "Cross-encoder unavailable, using term overlap"),
            }
        }

        builder
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Weighting policy
    pub fn policy(&self) -> &WeightingPolicy {
        &self.policy
    }

    /// Classify a query and extract its entities
    pub fn analyze(&self, raw: &str) -> QueryAnalysis {
        self.extractor.analyze(raw)
    }

    /// Normalize, analyze and expand a query
    pub fn understand(&self, raw: &str) -> Query {
        let normalized = normalize(raw);
        let analysis = self.extractor.analyze(raw);
        let expanded = self.expander.expand(&normalized, &analysis.entities);
        Query {
            raw: raw.to_string(),
            normalized,
            expanded,
            analysis,
        }
    }

    /// Rank catalog items for a request
    pub async fn recommend(&self, request: RecommendRequest) -> Recommendation {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("recommend", request_id = %request_id);
        self.run(request, request_id).instrument(span).await
    }

    async fn run(&self, request: RecommendRequest, request_id: String) -> Recommendation {
        let started = Instant::now();
        let settings = &self.config.retrieval;

        let query = self.understand(&request.query);
        let intent = query.analysis.intent;
        let profile = self.policy.profile(&query.analysis);
        let strategy = self.policy.strategy(intent);

        let alpha = request
            .weight_override
            .filter(|a| a.is_finite())
            .map(|a| a.clamp(0.0, 1.0))
            .unwrap_or(profile.alpha);
        let filters = request.filters.merge_hints(&profile.auto_filters);
        let top_n = request.top_n.unwrap_or(settings.default_top_n).min(settings.max_top_n);

        tracing::debug!(
            intent = %intent,
            confidence = query.analysis.confidence,
            alpha,
            expanded = %query.expanded,
            "Query understood"
        );

        let mut result = Recommendation {
            request_id,
            query: request.query.clone(),
            expanded_query: query.expanded.clone(),
            intent,
            confidence: query.analysis.confidence,
            alpha,
            effective_alpha: alpha,
            entities: query.analysis.entities.clone(),
            applied_filters: filters,
            items: Vec::new(),
            degradations: Vec::new(),
            reranked: false,
        };

        if query.is_degenerate() {
            Self::degrade(&mut result, DegradationReason::EmptyQuery);
            return self.finish(result, started);
        }
        if top_n == 0 {
            return self.finish(result, started);
        }

        // "like Goblin": search around the reference, never return it
        let reference = match (intent, query.analysis.entities.reference.as_deref()) {
            (Intent::SimilarTo, Some(reference)) => self.resolve_reference(reference),
            _ => None,
        };
        let semantic_text = match &reference {
            Some(item) if !item.description.trim().is_empty() => {
                format!("{} {}", query.expanded, item.description)
            }
            _ => query.expanded.clone(),
        };

        let semantic_k = settings.semantic_k.max(top_n);
        let lexical_k = settings.lexical_k.max(top_n);
        let (semantic, lexical) = tokio::join!(
            self.semantic_channel(query.normalized.clone(), semantic_text, semantic_k),
            self.lexical_channel(query.normalized.clone(), lexical_k),
        );

        let semantic_hits = match semantic {
            Ok(hits) if hits.is_empty() => {
                Self::degrade(&mut result, DegradationReason::SemanticEmpty);
                Vec::new()
            }
            Ok(hits) => hits.as_ref().clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Semantic channel failed");
                Self::degrade(&mut result, DegradationReason::SemanticUnavailable);
                Vec::new()
            }
        };
        let mut lexical_malformed = 0;
        let lexical_hits = match lexical {
            Ok(outcome) => {
                lexical_malformed = outcome.malformed;
                if outcome.fuzzy_fallback {
                    Self::degrade(&mut result, DegradationReason::FuzzyFallback);
                }
                if outcome.hits.is_empty() {
                    Self::degrade(&mut result, DegradationReason::LexicalEmpty);
                }
                outcome.hits
            }
            Err(e) => {
                tracing::warn!(error = %e, "Lexical channel failed");
                Self::degrade(&mut result, DegradationReason::LexicalUnavailable);
                Vec::new()
            }
        };

        // A lone surviving channel carries the full weight
        result.effective_alpha = match (semantic_hits.is_empty(), lexical_hits.is_empty()) {
            (false, true) => 1.0,
            (true, false) => 0.0,
            _ => alpha,
        };

        tracing::debug!(
            semantic_hits = semantic_hits.len(),
            lexical_hits = lexical_hits.len(),
            effective_alpha = result.effective_alpha,
            "Channels retrieved"
        );

        let fusion = fuse(&semantic_hits, &lexical_hits, result.effective_alpha);
        let mut malformed = fusion.malformed + lexical_malformed;
        let reference_id = reference.as_ref().map(|item| item.id.as_str());

        let mut ranked: Vec<Ranked> = Vec::with_capacity(fusion.candidates.len());
        for mut candidate in fusion.candidates {
            if Some(candidate.id.as_str()) == reference_id {
                continue;
            }
            match self.catalog.get_item(&candidate.id) {
                Some(item) => {
                    candidate.popularity = if item.popularity.is_finite() { item.popularity } else { 0.0 };
                    ranked.push(Ranked { candidate, item });
                }
                None => malformed += 1,
            }
        }
        if malformed > 0 {
            tracing::debug!(malformed, "Skipped malformed candidates");
            Self::degrade(&mut result, DegradationReason::MalformedCandidate);
        }

        let mut candidates: Vec<Candidate> = ranked.iter().map(|r| r.candidate.clone()).collect();
        apply_popularity_boost(&mut candidates, strategy.popularity_boost);
        let items: HashMap<String, Arc<CatalogItem>> = ranked
            .into_iter()
            .map(|r| (r.candidate.id, r.item))
            .collect();

        let before = candidates.len();
        candidates.retain(|c| items.get(&c.id).is_some_and(|item| result.applied_filters.matches(item)));
        if before > 0 && candidates.is_empty() {
            Self::degrade(&mut result, DegradationReason::FilterEmptyResult);
        }

        sort_candidates(&mut candidates);

        let rerank_wanted = request
            .rerank
            .unwrap_or(settings.enable_rerank && strategy.use_reranker);
        if rerank_wanted && candidates.len() > 1 {
            if let Some(reranker) = &self.reranker {
                let reranked = self
                    .rerank_top(reranker, &query, &mut candidates, &items, &mut result)
                    .await;
                result.reranked = reranked;
            }
        }

        candidates.truncate(top_n);
        result.items = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                items
                    .get(&candidate.id)
                    .map(|item| RankedItem::new(index + 1, candidate, item))
            })
            .collect();

        self.finish(result, started)
    }

    /// Reorder the top block by relevance score; fused order on any failure
    async fn rerank_top(
        &self,
        reranker: &Reranker,
        query: &Query,
        candidates: &mut [Candidate],
        items: &HashMap<String, Arc<CatalogItem>>,
        result: &mut Recommendation,
    ) -> bool {
        let depth = reranker.depth().min(candidates.len());
        if depth == 0 {
            return false;
        }

        let documents: Vec<String> = candidates[..depth]
            .iter()
            .map(|c| items.get(&c.id).map(|item| item.search_text()).unwrap_or_default())
            .collect();

        match reranker.score(&query.normalized, documents).await {
            Ok(scores) => {
                for (candidate, score) in candidates[..depth].iter_mut().zip(scores) {
                    candidate.rerank_score = Some(score);
                }
                candidates[..depth].sort_by(compare_candidates);
                tracing::debug!(depth, "Top candidates reranked");
                true
            }
            Err(RerankerError::Timeout(after)) => {
                tracing::warn!(?after, "Rerank timed out, keeping fused order");
                Self::degrade(result, DegradationReason::RerankTimeout);
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rerank failed, keeping fused order");
                Self::degrade(result, DegradationReason::RerankFailed);
                false
            }
        }
    }

    /// Look up the catalog item a "like X" query refers to
    fn resolve_reference(&self, reference: &str) -> Option<Arc<CatalogItem>> {
        let titles = self.titles.as_ref()?;
        let wanted = normalize(reference);
        let matches: Vec<(Arc<CatalogItem>, f32)> = titles
            .fuzzy_title_match(reference, self.config.fuzzy.threshold)
            .into_iter()
            .filter_map(|(id, ratio)| self.catalog.get_item(&id).map(|item| (item, ratio)))
            .collect();

        // An exact title beats a window match on a longer title
        let exact = matches.iter().position(|(item, _)| normalize(&item.title) == wanted);
        let (item, ratio) = matches.into_iter().nth(exact.unwrap_or(0))?;
        tracing::debug!(reference, id = %item.id, ratio, "Resolved similarity reference");
        Some(item)
    }

    async fn semantic_channel(
        &self,
        normalized: String,
        text: String,
        k: usize,
    ) -> Result<CachedHits, RetrieverError> {
        let Some(retriever) = self.semantic.clone() else {
            return Err(RetrieverError::Unavailable("no semantic index configured".to_string()));
        };
        tokio::task::spawn_blocking(move || retriever.search(&normalized, &text, k))
            .await
            .map_err(|e| RetrieverError::Failed(format!("semantic task: {e}")))?
    }

    async fn lexical_channel(&self, text: String, k: usize) -> Result<LexicalOutcome, RetrieverError> {
        let Some(retriever) = self.lexical.clone() else {
            return Err(RetrieverError::Unavailable("no lexical index configured".to_string()));
        };
        tokio::task::spawn_blocking(move || retriever.search(&text, k))
            .await
            .map_err(|e| RetrieverError::Failed(format!("lexical task: {e}")))?
    }

    fn degrade(result: &mut Recommendation, reason: DegradationReason) {
        if !result.degradations.contains(&reason) {
            tracing::warn!(reason = reason.code(), "Recommendation degraded");
            result.degradations.push(reason);
        }
    }

    fn finish(&self, result: Recommendation, started: Instant) -> Recommendation {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            results = result.items.len(),
            reranked = result.reranked,
            elapsed_ms,
            "Recommendation ranked"
        );

        if !self.observers.is_empty() {
            let event = RecommendationEvent {
                request_id: result.request_id.clone(),
                timestamp: Utc::now(),
                query: result.query.clone(),
                intent: result.intent,
                alpha: result.effective_alpha,
                item_ids: result.items.iter().map(|item| item.id.clone()).collect(),
                filters: result.applied_filters.clone(),
                degradations: result.degradations.clone(),
                elapsed_ms,
            };
            self.notify_observers(event);
        }

        result
    }

    /// Hand the event to every observer off the request path
    ///
    /// One detached blocking task per observer. Errors and panics are logged.
    fn notify_observers(&self, event: RecommendationEvent) {
        let event = Arc::new(event);
        for observer in &self.observers {
            let observer = Arc::clone(observer);
            let event = Arc::clone(&event);
            let request_id = event.request_id.clone();
            let task = tokio::task::spawn_blocking(move || observer.on_recommendation(&event));
            tokio::spawn(async move {
                match task.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!(request_id = %request_id, error = %e, "Observer failed"),
                    Err(e) => tracing::warn!(request_id = %request_id, error = %e, "Observer task aborted"),
                }
            });
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
