use stratum_splitters::{TextSplitter, TokenEncoding, TokenSplitter};

#[test]
fn chunks_respect_token_budget() {
    let splitter = TokenSplitter::new(10, 0).unwrap();
    let text = "The quick brown fox jumps over the lazy dog and runs through the field at dawn, \
                then circles back around the barn before finally resting under the old oak tree.";
    let chunks = splitter.split_text(text).unwrap();

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        // Re-encoding a decoded window can shift merges at the cut points,
        // so allow a little slack around the configured budget.
        assert!(
            splitter.count_tokens(chunk) <= 12,
            "chunk over budget: {chunk:?}"
        );
    }
}

#[test]
fn concatenation_reproduces_input_without_overlap() {
    let splitter = TokenSplitter::new(8, 0).unwrap();
    let text = "One two three four five six seven eight nine ten eleven twelve.";
    let chunks = splitter.split_text(text).unwrap();

    assert!(chunks.len() > 1);
    assert_eq!(chunks.concat(), text);
}

#[test]
fn overlapping_windows_share_a_suffix_prefix() {
    let splitter = TokenSplitter::new(6, 2).unwrap();
    let text = "the cat sat on the mat and then ran far away from home that day";
    let chunks = splitter.split_text(text).unwrap();

    assert!(chunks.len() > 1);
    for window in chunks.windows(2) {
        let shared = window[0]
            .split_whitespace()
            .any(|word| window[1].contains(word));
        assert!(
            shared,
            "expected overlap between {:?} and {:?}",
            window[0], window[1]
        );
    }
}

#[test]
fn empty_text_yields_no_chunks() {
    let splitter = TokenSplitter::new(10, 0).unwrap();
    assert!(splitter.split_text("").unwrap().is_empty());
}

#[test]
fn small_text_single_chunk() {
    let splitter = TokenSplitter::new(100, 0).unwrap();
    let chunks = splitter.split_text("hello world").unwrap();
    assert_eq!(chunks, vec!["hello world"]);
}

#[test]
fn overlap_must_be_smaller_than_size() {
    assert!(TokenSplitter::new(5, 5).is_err());
    assert!(TokenSplitter::new(5, 6).is_err());
}

#[test]
fn encodings_resolve_by_name() {
    assert_eq!(
        "cl100k_base".parse::<TokenEncoding>().unwrap(),
        TokenEncoding::Cl100kBase
    );
    assert!("unknown_base".parse::<TokenEncoding>().is_err());
}
