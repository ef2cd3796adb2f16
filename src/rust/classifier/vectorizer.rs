use std::collections::{BTreeMap, HashMap, HashSet};

use lazy_static::lazy_static;
use ndarray::{Array1, Array2};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use crate::config::VectorizerConfig;

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("token pattern is valid");
    static ref ENGLISH_STOP_WORDS: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "amoungst",
    "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere",
    "are", "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "bill", "both", "bottom", "but", "by", "call", "can", "cannot", "cant", "co",
    "computer", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do", "done", "down",
    "due", "during", "each", "eg", "eight", "either", "eleven", "else", "elsewhere", "empty",
    "enough", "etc", "even", "ever", "every", "everyone", "everything", "everywhere", "except",
    "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly",
    "forty", "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
    "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon",
    "hers", "herself", "him", "himself", "his", "how", "however", "hundred", "ie", "if", "in",
    "inc", "indeed", "interest", "into", "is", "it", "its", "itself", "keep", "last", "latter",
    "latterly", "least", "less", "ltd", "made", "many", "may", "me", "meanwhile", "might", "mill",
    "mine", "more", "moreover", "most", "mostly", "move", "much", "must", "my", "myself", "name",
    "namely", "neither", "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone",
    "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only",
    "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since", "sincere",
    "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime", "sometimes",
    "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the", "their", "them",
    "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore", "therein",
    "thereupon", "these", "they", "thick", "thin", "third", "this", "those", "though", "three",
    "through", "throughout", "thru", "thus", "to", "together", "too", "top", "toward", "towards",
    "twelve", "twenty", "two", "un", "under", "until", "up", "upon", "us", "very", "via", "was",
    "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Returns true for words dropped by the English stop-word filter
pub fn is_stop_word(word: &str) -> bool {
    ENGLISH_STOP_WORDS.contains(word)
}

/// Term-frequency / inverse-document-frequency vectorizer over word n-grams.
///
/// The vocabulary is fixed at fit time; terms never seen during fitting get
/// zero weight at transform time. Output rows are L2-normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Array1<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and IDF weights, returning the vectorizer and
    /// the document-term matrix of `documents`.
    pub fn fit_transform<S: AsRef<str>>(
        config: VectorizerConfig,
        documents: &[S],
    ) -> Result<(Self, Array2<f64>), ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::BuildError("Cannot fit on empty documents".into()));
        }

        let analyzed: Vec<Vec<String>> = documents
            .iter()
            .map(|d| analyze(&config, d.as_ref()))
            .collect();

        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            for term in terms {
                *term_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        if term_freq.is_empty() {
            return Err(ClassifierError::BuildError(
                "Empty vocabulary; documents contain only stop words".into(),
            ));
        }

        let mut ranked: Vec<(&str, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(config.max_features);

        // Columns are assigned in alphabetical term order.
        let mut kept: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort_unstable();
        let vocabulary: BTreeMap<String, usize> = kept
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let n_docs = documents.len();
        let mut doc_freq = vec![0usize; vocabulary.len()];
        for terms in &analyzed {
            let unique: HashSet<usize> = terms.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for idx in unique {
                doc_freq[idx] += 1;
            }
        }
        let idf = Array1::from_iter(
            doc_freq
                .iter()
                .map(|&df| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0),
        );

        let vectorizer = Self { config, vocabulary, idf };
        let mut matrix = Array2::zeros((n_docs, vectorizer.vocabulary.len()));
        for (row, terms) in analyzed.iter().enumerate() {
            matrix.row_mut(row).assign(&vectorizer.weigh(terms));
        }
        Ok((vectorizer, matrix))
    }

    /// Maps `text` onto the fitted vocabulary
    pub fn transform(&self, text: &str) -> Array1<f64> {
        self.weigh(&analyze(&self.config, text))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub(crate) fn validate(&self) -> Result<(), ClassifierError> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(ClassifierError::ModelError(format!(
                "IDF length {} does not match vocabulary size {}",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        if let Some((term, _)) = self.vocabulary.iter().find(|(_, &idx)| idx >= self.idf.len()) {
            return Err(ClassifierError::ModelError(format!("Term '{}' has an out of range column", term)));
        }
        Ok(())
    }

    fn weigh(&self, terms: &[String]) -> Array1<f64> {
        let mut vector = Array1::zeros(self.vocabulary.len());
        for term in terms {
            if let Some(&idx) = self.vocabulary.get(term) {
                vector[idx] += 1.0;
            }
        }
        vector *= &self.idf;
        let norm = vector.dot(&vector).sqrt();
        if norm > 0.0 {
            vector /= norm;
        }
        vector
    }
}

/// Splits text into the n-gram terms the vectorizer counts
pub(crate) fn analyze(config: &VectorizerConfig, text: &str) -> Vec<String> {
    let text = if config.lowercase { text.to_lowercase() } else { text.to_string() };
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|t| !config.english_stop_words || !is_stop_word(t))
        .collect();

    let (min_n, max_n) = config.ngram_range;
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_drops_stop_words_before_bigrams() {
        let terms = analyze(&VectorizerConfig::default(), "Uber ride to the Airport");
        assert_eq!(terms, vec!["uber", "ride", "airport", "uber ride", "ride airport"]);
    }

    #[test]
    fn test_standard_english_stop_words() {
        assert_eq!(STOP_WORDS.len(), 318);
        assert_eq!(ENGLISH_STOP_WORDS.len(), 318);
        assert_eq!(analyze(&VectorizerConfig::default(), "electricity bill"), vec!["electricity"]);
        assert_eq!(analyze(&VectorizerConfig::default(), "hospital bill show computer"), vec!["hospital"]);
        for word in ["bill", "show", "computer", "top", "system", "call", "get", "mill"] {
            assert!(is_stop_word(word), "{}", word);
        }
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        let terms = analyze(&VectorizerConfig::default(), "x y tv");
        assert_eq!(terms, vec!["tv"]);
    }

    #[test]
    fn test_unseen_terms_have_zero_weight() {
        let docs = ["pizza delivery", "taxi fare"];
        let (vectorizer, matrix) = TfidfVectorizer::fit_transform(VectorizerConfig::default(), &docs).unwrap();
        assert_eq!(matrix.nrows(), 2);
        assert_eq!(vectorizer.vocabulary_size(), 6);
        assert!(vectorizer.transform("spaceship launch").iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_rows_are_unit_length() {
        let docs = ["water bill", "phone bill", "gym membership"];
        let (vectorizer, matrix) = TfidfVectorizer::fit_transform(VectorizerConfig::default(), &docs).unwrap();
        for row in matrix.rows() {
            assert!((row.dot(&row) - 1.0).abs() < 1e-9);
        }
        let v = vectorizer.transform("water bill");
        assert!((v.dot(&v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let config = VectorizerConfig { max_features: 1, ngram_range: (1, 1), ..VectorizerConfig::default() };
        let docs = ["coffee beans", "coffee mug", "tea"];
        let (vectorizer, _) = TfidfVectorizer::fit_transform(config, &docs).unwrap();
        assert_eq!(vectorizer.vocabulary().keys().collect::<Vec<_>>(), vec!["coffee"]);
    }

    #[test]
    fn test_only_stop_words_fails() {
        let result = TfidfVectorizer::fit_transform(VectorizerConfig::default(), &["the and of"]);
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }
}
