//! Chains of languages from the document root to an embedded token stream.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::Language;

/// Immutable, non-empty chain of languages; index 0 is the root.
#[derive(Clone)]
pub struct LanguagePath(Arc<[Arc<Language>]>);

impl LanguagePath {
    /// Path holding only `language`.
    pub fn root(language: Arc<Language>) -> Self {
        LanguagePath(Arc::from([language]))
    }

    /// This path extended by `language`.
    #[must_use]
    pub fn embedded(&self, language: &Arc<Language>) -> Self {
        let mut languages = self.0.to_vec();
        languages.push(Arc::clone(language));
        LanguagePath(languages.into())
    }

    /// Number of languages, at least one.
    #[inline]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn language(&self, index: usize) -> &Arc<Language> {
        &self.0[index]
    }

    #[inline]
    pub fn top_language(&self) -> &Arc<Language> {
        &self.0[0]
    }

    /// The most deeply embedded language.
    #[inline]
    pub fn inner_language(&self) -> &Arc<Language> {
        &self.0[self.0.len() - 1]
    }

    /// The path without its inner language; `None` for a root path.
    pub fn parent(&self) -> Option<LanguagePath> {
        (self.0.len() > 1).then(|| LanguagePath(self.0[..self.0.len() - 1].into()))
    }

    pub fn languages(&self) -> &[Arc<Language>] {
        &self.0
    }

    /// Whether `self` starts with all languages of `prefix`.
    pub fn starts_with(&self, prefix: &LanguagePath) -> bool {
        prefix.size() <= self.size() && self.0.iter().zip(prefix.0.iter()).all(|(a, b)| a == b)
    }

    /// MIME types joined with `/`, e.g. `text/x-markup/text/x-script`.
    pub fn mime_path(&self) -> String {
        let mut path = String::new();
        for (i, language) in self.0.iter().enumerate() {
            if i > 0 {
                path.push('/');
            }
            path.push_str(language.mime_type());
        }
        path
    }
}

impl PartialEq for LanguagePath {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for LanguagePath {}

impl Hash for LanguagePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for language in self.0.iter() {
            language.id().hash(state);
        }
    }
}

impl fmt::Display for LanguagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_path())
    }
}

impl fmt::Debug for LanguagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LanguagePath({})", self.mime_path())
    }
}
