//! Language registry and embedding discovery.
//!
//! The manager maps MIME types to languages and caches, behind one lock,
//! everything derived from the set of registered languages: embedding
//! answers per token id and discovered language paths per root language.
//! Registering or removing a language clears both caches in the same
//! critical section.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use weft_lexer_core::TokenId;

use crate::{EmbeddingQuery, Language, LanguageId, LanguageIds, LanguagePath};

/// A resolved embedding: the target language and the parent-text skips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageEmbedding {
    pub language: Arc<Language>,
    pub start_skip: u32,
    pub end_skip: u32,
    pub join_sections: bool,
}

#[derive(Default)]
struct Registry {
    /// Bumped on every invalidation; a cache fill computed against an older
    /// generation is dropped.
    generation: u64,
    languages: FxHashMap<Box<str>, Arc<Language>>,
    embeddings: FxHashMap<(LanguageId, TokenId), Option<LanguageEmbedding>>,
    paths: FxHashMap<LanguageId, Arc<[LanguagePath]>>,
}

impl Registry {
    fn invalidate(&mut self) {
        self.generation += 1;
        self.embeddings.clear();
        self.paths.clear();
    }
}

/// Process-wide language registry.
#[derive(Default)]
pub struct LanguageManager {
    registry: RwLock<Registry>,
}

impl LanguageManager {
    pub fn new() -> Self {
        LanguageManager::default()
    }

    /// The shared manager.
    pub fn global() -> Arc<LanguageManager> {
        static GLOBAL: OnceLock<Arc<LanguageManager>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(LanguageManager::new())))
    }

    /// Register `language`, replacing any language with the same MIME type.
    pub fn register(&self, language: Arc<Language>) -> Option<Arc<Language>> {
        let mut registry = self.registry.write();
        let replaced = registry
            .languages
            .insert(language.mime_type().into(), Arc::clone(&language));
        registry.invalidate();
        tracing::debug!(
            mime_type = language.mime_type(),
            id = ?language.id(),
            replaced = replaced.is_some(),
            generation = registry.generation,
            "language registered"
        );
        replaced
    }

    pub fn unregister(&self, mime_type: &str) -> Option<Arc<Language>> {
        let mut registry = self.registry.write();
        let removed = registry.languages.remove(mime_type);
        if removed.is_some() {
            registry.invalidate();
            tracing::debug!(mime_type, generation = registry.generation, "language removed");
        }
        removed
    }

    /// Drop every cached embedding answer and language path.
    pub fn invalidate(&self) {
        let mut registry = self.registry.write();
        registry.invalidate();
        tracing::debug!(generation = registry.generation, "language caches invalidated");
    }

    pub fn find_language(&self, mime_type: &str) -> Option<Arc<Language>> {
        self.registry.read().languages.get(mime_type).cloned()
    }

    /// Registered languages sorted by MIME type.
    pub fn languages(&self) -> Vec<Arc<Language>> {
        let mut languages: Vec<_> = self.registry.read().languages.values().cloned().collect();
        languages.sort_by(|a, b| a.mime_type().cmp(b.mime_type()));
        languages
    }

    /// Embedded language of a `language` token with id `id` and text `text`.
    ///
    /// Answers are cached per token id unless the hierarchy reports that the
    /// answer depends on the text. An embedding naming an unregistered MIME
    /// type resolves to `None`.
    pub fn find_embedding(
        &self,
        language: &Language,
        id: TokenId,
        text: &str,
    ) -> Option<LanguageEmbedding> {
        let hierarchy = language.hierarchy();
        let by_text = hierarchy.embedding_depends_on_text(id);
        let key = (language.id(), id);
        let generation = {
            let registry = self.registry.read();
            if !by_text {
                if let Some(cached) = registry.embeddings.get(&key) {
                    return cached.clone();
                }
            }
            registry.generation
        };

        let query = EmbeddingQuery {
            id,
            text: if by_text { text } else { "" },
        };
        let resolved = hierarchy.embedding(&query).and_then(|spec| {
            let target = self.find_language(&spec.mime_type);
            if target.is_none() {
                tracing::debug!(
                    from = language.mime_type(),
                    to = %spec.mime_type,
                    "embedded language not registered"
                );
            }
            target.map(|language| LanguageEmbedding {
                language,
                start_skip: spec.start_skip,
                end_skip: spec.end_skip,
                join_sections: spec.join_sections,
            })
        });

        if !by_text {
            let mut registry = self.registry.write();
            if registry.generation == generation {
                registry.embeddings.insert(key, resolved.clone());
            }
        }
        resolved
    }

    /// Every path reachable from `language` by embedding, cached until the
    /// next invalidation.
    pub fn language_paths(&self, language: &Arc<Language>) -> Arc<[LanguagePath]> {
        let generation = {
            let registry = self.registry.read();
            if let Some(paths) = registry.paths.get(&language.id()) {
                return Arc::clone(paths);
            }
            registry.generation
        };
        let paths: Arc<[LanguagePath]> =
            find_language_paths(self, &LanguagePath::root(Arc::clone(language))).into();
        let mut registry = self.registry.write();
        if registry.generation == generation {
            registry.paths.insert(language.id(), Arc::clone(&paths));
        }
        paths
    }
}

/// Discover all language paths reachable from `start` by embedding.
///
/// Every token id of every visited language is queried with empty text. Each
/// language is explored once, so self-embedding and embedding cycles
/// terminate. `start` itself is not part of the result.
#[tracing::instrument(level = "debug", skip_all, fields(start = %start))]
pub fn find_language_paths(manager: &LanguageManager, start: &LanguagePath) -> Vec<LanguagePath> {
    let mut search = PathSearch {
        manager,
        explored: LanguageIds::empty(),
        seen: FxHashSet::default(),
        found: Vec::new(),
    };
    search.explore(start);
    tracing::debug!(found = search.found.len(), "language paths discovered");
    search.found
}

struct PathSearch<'a> {
    manager: &'a LanguageManager,
    explored: LanguageIds,
    seen: FxHashSet<LanguagePath>,
    found: Vec<LanguagePath>,
}

impl PathSearch<'_> {
    fn explore(&mut self, path: &LanguagePath) {
        let language = Arc::clone(path.inner_language());
        if self.explored.contains(language.id()) {
            return;
        }
        self.explored = self.explored.with(language.id());
        for id in language.token_ids().ids() {
            let Some(embedding) = self.manager.find_embedding(&language, id, "") else {
                continue;
            };
            let embedded = path.embedded(&embedding.language);
            if self.seen.insert(embedded.clone()) {
                tracing::trace!(path = %embedded, "language path found");
                self.found.push(embedded.clone());
                self.explore(&embedded);
            }
        }
    }
}
