use crate::accessor::IndexAccessor;
use crate::config::Config;
use crate::error::{FtsError, Result};
use crate::index::DocId;
use crate::tokenizer::parse;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Rows shown by [`render_results`].
pub const DISPLAY_LIMIT: usize = 19;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: DocId,
    pub score: f64,
    pub title: String,
}

/// Ranks documents against `query` with `tf * ln(N / df)` summed over the
/// query's n-grams. Results are ordered by score, then ascending id.
pub fn search<A: IndexAccessor + ?Sized>(config: &Config, index: &A, query: &str) -> Result<Vec<SearchResult>> {
    let parsed = parse(query, config);
    let total = index.total_docs()?;
    if total == 0 {
        return Err(FtsError::Configuration("no documents found; build the index first".into()));
    }
    let n = total as f64;

    let mut scores: BTreeMap<DocId, f64> = BTreeMap::new();
    for word in &parsed {
        for term in &word.ngrams {
            let postings = index.term_frequencies(term)?;
            if postings.is_empty() {
                continue;
            }
            let idf = (n / postings.len() as f64).ln();
            for (id, tf) in postings {
                *scores.entry(id).or_insert(0.0) += tf as f64 * idf;
            }
        }
    }

    let mut results = scores
        .into_iter()
        .map(|(id, score)| Ok(SearchResult { id, score, title: index.load_document(id)? }))
        .collect::<Result<Vec<_>>>()?;
    sort_by_score(&mut results);
    tracing::debug!(query, hits = results.len(), "search complete");
    Ok(results)
}

fn sort_by_score(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
}

/// Tabular listing of the first [`DISPLAY_LIMIT`] results.
pub fn render_results(results: &[SearchResult]) -> String {
    let mut out = String::from("\tSearch result:\n\tTop\tId\tScore\t\tText\n");
    for (rank, r) in results.iter().take(DISPLAY_LIMIT).enumerate() {
        let _ = writeln!(out, "\t{}\t{}\t{:.6}\t{}", rank + 1, r.id, r.score, r.title);
    }
    out
}
