use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    // Title and anchor catalogs were built with this pattern, without stop word removal.
    static ref RE_WORD: Regex = Regex::new(r"(?u)[#@\w](?:['\-]?\w){2,24}").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn words(normalized: &str) -> impl Iterator<Item = String> + '_ {
    RE.find_iter(normalized)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !is_stopword(w))
}

/// Query tokens for the ranked endpoints: NFKC, lowercase, stop words removed, stemmed.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>();
    words(&normalized).map(|w| STEMMER.stem(&w).into_owned()).collect()
}

/// Same as [`tokenize`] without stemming; matches the body TF-IDF catalog.
pub fn tokenize_unstemmed(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>();
    words(&normalized).collect()
}

/// Lowercased word matches of 3 to 26 characters, stop words kept.
pub fn tokenize_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE_WORD.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// Distinct tokens in first-seen order.
pub fn distinct(tokens: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens.iter().filter(|t| seen.insert(t.as_str())).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn unstemmed_keeps_inflection() {
        let t = tokenize_unstemmed("The Running dogs");
        assert_eq!(t, vec!["running", "dogs"]);
    }

    #[test]
    fn word_pattern_skips_short_tokens() {
        let t = tokenize_words("An #Rust of the C-lang");
        assert_eq!(t, vec!["#rust", "the", "c-lang"]);
    }

    #[test]
    fn distinct_keeps_first_order() {
        let toks: Vec<String> = ["b", "a", "b", "c", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(distinct(&toks), vec!["b", "a", "c"]);
    }
}
