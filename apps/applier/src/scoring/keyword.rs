//! Keyword overlap scoring.
//!
//! Algorithm:
//! 1. Tokenise title + description: lower-case, split on anything that is not
//!    alphanumeric, `+` or `#`, drop stop words and tokens shorter than three
//!    characters (unless they carry `+`/`#`, e.g. `c#`).
//! 2. A keyword is matched when the same token appears in the resume.
//! 3. score = matched / keywords × 100, rounded to two decimals.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::errors::CollaboratorError;
use crate::models::job::JobPosting;
use crate::models::matching::MatchResult;
use crate::resume::ResumeDocument;
use crate::scoring::MatchScorer;

const STOP_WORDS: &[&str] = &[
    "about", "across", "all", "also", "and", "any", "are", "as", "can", "for", "from", "has",
    "have", "our", "including", "into", "its", "more", "not", "of", "on", "or", "other", "such",
    "that", "the", "their", "this", "through", "to", "using", "was", "we", "what", "who", "will",
    "with", "within", "work", "you", "your", "years", "experience", "team", "role", "job",
    "ability", "strong", "plus", "etc", "well", "new", "use", "how", "they", "them", "but",
    "able", "must", "should", "would", "may", "being", "been", "help", "join",
];

pub struct KeywordMatchScorer;

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    async fn score(
        &self,
        job: &JobPosting,
        resume: &ResumeDocument,
    ) -> Result<MatchResult, CollaboratorError> {
        compute_keyword_match(&format!("{}\n{}", job.title, job.description), &resume.text)
    }
}

pub fn compute_keyword_match(
    job_text: &str,
    resume_text: &str,
) -> Result<MatchResult, CollaboratorError> {
    let keywords = extract_keywords(job_text);
    if keywords.is_empty() {
        return Err(CollaboratorError::rejected(
            "posting has no keywords to score against",
        ));
    }

    let resume_tokens: BTreeSet<String> = tokenize(resume_text).collect();
    let (matched, missing): (BTreeSet<String>, BTreeSet<String>) = keywords
        .into_iter()
        .partition(|kw| resume_tokens.contains(kw));

    let total = (matched.len() + missing.len()) as f64;
    let score = (matched.len() as f64 / total * 10_000.0).round() / 100.0;

    Ok(MatchResult::new(score, matched, missing))
}

pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .filter(|t| t.chars().count() >= 3 || t.contains(['+', '#']))
        .collect()
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_drops_stop_words_and_short_tokens() {
        let keywords = extract_keywords("We are hiring a Rust engineer to work on the API, in C# or C++.");
        assert!(keywords.contains("rust"));
        assert!(keywords.contains("engineer"));
        assert!(keywords.contains("api"));
        assert!(keywords.contains("c#"));
        assert!(keywords.contains("c++"));
        assert!(!keywords.contains("the"));
        assert!(!keywords.contains("we"));
        assert!(!keywords.contains("a"));
        assert!(!keywords.contains("in"));
    }

    #[test]
    fn test_full_overlap_scores_100() {
        let result = compute_keyword_match("Rust PostgreSQL", "I write rust against postgresql daily").unwrap();
        assert_eq!(result.score, 100.0);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_partial_overlap_reports_missing() {
        let result = compute_keyword_match("Rust Kafka Kubernetes", "rust and kubernetes").unwrap();
        // 2 of 3
        assert_eq!(result.score, 66.67);
        assert_eq!(result.missing.iter().collect::<Vec<_>>(), vec!["kafka"]);
        assert_eq!(result.matched.len(), 2);
    }

    #[test]
    fn test_match_is_whole_token() {
        // "java" must not match inside "javascript"
        let result = compute_keyword_match("Java", "javascript").unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_no_keywords_is_a_scoring_failure() {
        assert!(compute_keyword_match("the and of", "anything").is_err());
    }

    #[tokio::test]
    async fn test_scorer_uses_title_and_description() {
        let job = JobPosting {
            title: "Rust Engineer".to_string(),
            company: "Acme".to_string(),
            location: None,
            description: String::new(),
            url: "u".to_string(),
            source: Default::default(),
        };
        let resume = ResumeDocument {
            path: "resume.txt".into(),
            text: "rust engineer".to_string(),
        };
        let result = KeywordMatchScorer.score(&job, &resume).await.unwrap();
        assert_eq!(result.score, 100.0);
    }
}
