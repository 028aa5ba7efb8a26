use fts_core::persist::IndexPaths;
use fts_core::{
    render_results, search, BinaryIndexAccessor, BinaryIndexWriter, Config, FtsError, Index, IndexAccessor,
    IndexBuilder, IndexWriter, TextIndexAccessor, TextIndexWriter,
};

fn config() -> Config {
    Config::new(vec!["the".into()], 3, 6).unwrap()
}

fn build(docs: &[(u64, &str)]) -> Index {
    let cfg = config();
    let mut b = IndexBuilder::new();
    for (id, title) in docs {
        b.add_document(*id, title, &cfg);
    }
    b.into_index()
}

#[test]
fn identical_documents_tie_at_zero_and_sort_by_id() {
    let index = build(&[(2, "The Matrix"), (1, "The Matrix")]);
    let results = search(&config(), &index, "matrix").unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!((results[0].id, results[1].id), (1, 2));
    assert_eq!(results[0].score, 0.0);
    assert_eq!(results[1].score, 0.0);
    assert_eq!(results[0].title, "The Matrix");
}

#[test]
fn rarer_terms_rank_higher() {
    let index = build(&[(1, "The Matrix"), (2, "The Matrix Reloaded"), (3, "Finding Nemo")]);
    let results = search(&config(), &index, "matrix reloaded").unwrap();
    assert_eq!(results[0].id, 2);
    // matrix n-grams: 4 x 1 x ln(3/2); reloaded n-grams: 4 x 1 x ln(3/1)
    let expected = 4.0 * (1.5f64).ln() + 4.0 * 3f64.ln();
    assert!((results[0].score - expected).abs() < 1e-9);
    assert_eq!(results[1].id, 1);
    assert!(results.iter().all(|r| r.id != 3));
}

#[test]
fn term_frequency_multiplies_score() {
    let index = build(&[(1, "guide guide"), (2, "guide"), (3, "other")]);
    let results = search(&config(), &index, "guide").unwrap();
    let idf = (3.0f64 / 2.0).ln();
    assert_eq!(results[0].id, 1);
    assert!((results[0].score - 2.0 * 3.0 * idf).abs() < 1e-9);
    assert!((results[1].score - 3.0 * idf).abs() < 1e-9);
}

#[test]
fn prefix_ngrams_give_prefix_recall() {
    let index = build(&[(1, "happiness"), (2, "sadness")]);
    let results = search(&config(), &index, "happening").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, 1);
}

#[test]
fn empty_index_is_a_configuration_error() {
    let err = search(&config(), &Index::new(), "matrix").unwrap_err();
    assert!(matches!(err, FtsError::Configuration(_)));
}

#[test]
fn empty_or_unknown_queries_return_nothing() {
    let index = build(&[(1, "The Matrix")]);
    assert!(search(&config(), &index, "the !!").unwrap().is_empty());
    assert!(search(&config(), &index, "zebra").unwrap().is_empty());
}

#[test]
fn repeated_searches_are_identical() {
    let index = build(&[(5, "alpha beta"), (3, "alpha gamma"), (9, "beta gamma"), (1, "alpha")]);
    let first = search(&config(), &index, "alpha beta gamma").unwrap();
    for _ in 0..5 {
        assert_eq!(search(&config(), &index, "alpha beta gamma").unwrap(), first);
    }
}

#[test]
fn binary_and_text_forms_rank_like_memory() {
    let docs = [
        (10, "Harry Potter and the Chamber of Secrets"),
        (20, "Harry Potter and the Prisoner of Azkaban"),
        (30, "The Secret Garden"),
        (40, "Secrets of the Universe"),
    ];
    let index = build(&docs);
    let query = "harry secrets";
    let in_memory = search(&config(), &index, query).unwrap();

    let encoded = BinaryIndexWriter::new().encode(&index);
    let bytes = encoded.to_bytes();
    let binary = search(&config(), &BinaryIndexAccessor::new(&bytes).unwrap(), query).unwrap();
    let id_map = encoded.doc_id_map();
    assert_eq!(binary.len(), in_memory.len());
    for (b, m) in binary.iter().zip(&in_memory) {
        assert_eq!(id_map[&(b.id as u32)], m.id);
        assert!((b.score - m.score).abs() < 1e-12);
        assert_eq!(b.title, m.title);
    }

    let dir = tempfile::tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    TextIndexWriter.write(&paths, &index).unwrap();
    let text = search(&config(), &TextIndexAccessor::new(paths.text()), query).unwrap();
    assert_eq!(text, in_memory);

    let rendered = render_results(&in_memory);
    assert!(rendered.starts_with("\tSearch result:\n"));
}

#[test]
fn corrupt_postings_block_reads_as_unknown_term() {
    let index = build(&[(1, "The Matrix"), (2, "The Matrix Reloaded"), (3, "Finding Nemo")]);
    let encoded = BinaryIndexWriter::new().encode(&index);
    let mut bytes = encoded.to_bytes();
    // doc_count of the "matrix" block now runs past the end of the entries section
    let at = encoded.header.len() + encoded.dictionary.len() + encoded.entry_offsets["matrix"] as usize;
    bytes[at..at + 4].copy_from_slice(&0xFFFF_FF00u32.to_le_bytes());

    let acc = BinaryIndexAccessor::new(&bytes).unwrap();
    assert!(acc.get_doc_by_term("matrix").unwrap().is_empty());
    assert_eq!(acc.get_count_terms_in_doc("matrix", 4).unwrap(), 0);
    assert_eq!(acc.get_doc_by_term("matri").unwrap().len(), 2);

    let results = search(&config(), &acc, "matrix reloaded").unwrap();
    let id_map = encoded.doc_id_map();
    assert_eq!(results.len(), 2);
    assert_eq!(id_map[&(results[0].id as u32)], 2);
    assert_eq!(results[0].title, "The Matrix Reloaded");
    // "matrix" drops out; mat, matr, matri and the reloaded n-grams still count
    let expected = 3.0 * (1.5f64).ln() + 4.0 * 3f64.ln();
    assert!((results[0].score - expected).abs() < 1e-9);
    assert_eq!(id_map[&(results[1].id as u32)], 1);
}
