use wikisearch_core::tokenizer::{tokenize, tokenize_unstemmed, tokenize_words};

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // NFKC keeps the accent, lowercasing still applies
    assert!(words.iter().any(|w| w.starts_with("caf")));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
}

#[test]
fn empty_query_has_no_tokens() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("the and of").is_empty());
    assert!(tokenize_words("  ").is_empty());
}

#[test]
fn numbers_are_kept() {
    assert_eq!(tokenize("1984 novel"), vec!["1984", "novel"]);
    assert_eq!(tokenize_unstemmed("world war 2 1939"), vec!["world", "war", "2", "1939"]);
    assert_eq!(tokenize_unstemmed("Boeing 747s"), vec!["boeing", "747s"]);
}
