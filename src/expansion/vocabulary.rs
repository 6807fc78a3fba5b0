//! Vocabulary filtering for masked-LM expansion.
//!
//! A [`VocabularyFilter`] is computed once from a tokenizer's vocabulary and
//! a stopword list. It marks every token id that must never be returned as
//! an expansion term:
//!
//! - ids that single-token-encode a configured stopword,
//! - subword-continuation pieces (`##ing`),
//! - tokens with characters outside `[A-Za-z_-]`, or with no letter at all
//!   (numbers, punctuation, `[CLS]`-style special tokens).
//!
//! Stopwords that encode to more than one token cannot be mapped to a single
//! id and are skipped.

use std::sync::LazyLock;

use ahash::AHashSet;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::tokenization::TextTokenizer;

/// Default English stopword list (NLTK).
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they",
    "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that",
    "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and",
    "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for", "with",
    "about", "against", "between", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "why", "how", "all", "any", "both",
    "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don", "don't",
    "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't",
    "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn",
    "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't",
    "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

const CONTINUATION_PREFIX: &str = "##";

static ALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_-]*$").expect("static pattern"));
static HAS_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]").expect("static pattern"));

/// Token ids excluded from expansion output, plus the complementary valid ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyFilter {
    excluded: AHashSet<u32>,
    valid_ids: Vec<u32>,
    vocab_size: usize,
}

impl VocabularyFilter {
    /// Build the filter from a stopword list and a tokenizer vocabulary.
    pub fn build<S: AsRef<str>>(stopwords: &[S], tokenizer: &dyn TextTokenizer) -> Result<Self> {
        let mut excluded = AHashSet::new();

        let mut skipped = 0usize;
        for stopword in stopwords {
            let stopword = stopword.as_ref();
            let encoding = tokenizer.encode(stopword, false)?;
            if let [id] = encoding.ids.as_slice() {
                excluded.insert(*id);
            } else {
                skipped += 1;
                debug!(
                    stopword,
                    pieces = encoding.ids.len(),
                    "stopword does not encode to a single token, skipping"
                );
            }
        }
        let stopword_ids = excluded.len();

        for (token, id) in tokenizer.vocabulary() {
            if Self::is_rejected_token(&token) {
                excluded.insert(id);
            }
        }

        let filter = Self::from_excluded(excluded, tokenizer.vocab_size());
        debug!(
            stopwords = stopwords.len(),
            stopword_ids,
            skipped_stopwords = skipped,
            excluded = filter.excluded.len(),
            valid = filter.valid_ids.len(),
            "built vocabulary filter"
        );

        Ok(filter)
    }

    /// A filter that excludes nothing.
    pub fn unfiltered(vocab_size: usize) -> Self {
        Self::from_excluded(AHashSet::new(), vocab_size)
    }

    fn from_excluded(excluded: AHashSet<u32>, vocab_size: usize) -> Self {
        let valid_ids = (0..vocab_size as u32)
            .filter(|id| !excluded.contains(id))
            .collect();

        Self {
            excluded,
            valid_ids,
            vocab_size,
        }
    }

    /// Whether a vocabulary entry can never be an expansion term.
    pub fn is_rejected_token(token: &str) -> bool {
        (token.starts_with(CONTINUATION_PREFIX) && token.len() > 1)
            || !ALLOWED_CHARS.is_match(token)
            || !HAS_LETTER.is_match(token)
    }

    pub fn is_excluded(&self, id: u32) -> bool {
        self.excluded.contains(&id)
    }

    /// Whether `id` lies in the vocabulary and is not excluded.
    pub fn is_valid(&self, id: u32) -> bool {
        (id as usize) < self.vocab_size && !self.excluded.contains(&id)
    }

    pub fn excluded_ids(&self) -> &AHashSet<u32> {
        &self.excluded
    }

    /// Excluded ids in ascending order.
    pub fn sorted_excluded_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.excluded.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Valid ids in ascending order.
    pub fn valid_ids(&self) -> &[u32] {
        &self.valid_ids
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}
