use stratum_splitters::{CharacterSplitter, KeepSeparator, TextSplitter};

#[test]
fn splits_by_double_newline() {
    let splitter = CharacterSplitter::new(50, 0).unwrap();
    let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
    let chunks = splitter.split_text(text).unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], "First paragraph.\n\nSecond paragraph.");
    assert_eq!(chunks[1], "Third paragraph.");
}

#[test]
fn paragraph_pieces_stay_separate_under_tight_size() {
    let splitter = CharacterSplitter::new(20, 5).unwrap();
    let text = "Hello world\n\nHow are you\n\nI am fine";
    let chunks = splitter.split_text(text).unwrap();

    assert_eq!(chunks, vec!["Hello world", "How are you", "I am fine"]);
}

#[test]
fn char_level_merge_with_overlap() {
    let splitter = CharacterSplitter::new(4, 2).unwrap().with_separator("");
    let chunks = splitter.split_text("ABCDEFGHIJ").unwrap();

    assert_eq!(chunks, vec!["ABCD", "CDEF", "EFGH", "GHIJ"]);
    // Every interior adjacent pair shares a 2-character overlap, and no
    // chunk is shorter than half the size except possibly the last.
    for window in chunks.windows(2) {
        let tail = &window[0][window[0].len() - 2..];
        assert!(
            window[1].starts_with(tail),
            "expected `{}` to start with `{tail}`",
            window[1],
        );
    }
    for chunk in &chunks[..chunks.len() - 1] {
        assert!(chunk.len() >= 2);
    }
}

#[test]
fn custom_separator() {
    let splitter = CharacterSplitter::new(20, 0).unwrap().with_separator(", ");
    let text = "apple, banana, cherry, date";
    let chunks = splitter.split_text(text).unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], "apple, banana");
    assert_eq!(chunks[1], "cherry, date");
}

#[test]
fn keep_separator_end_appends_to_preceding_piece() {
    let splitter = CharacterSplitter::new(6, 0)
        .unwrap()
        .with_separator(", ")
        .with_keep_separator(KeepSeparator::End);
    let chunks = splitter.split_text("one, two, three").unwrap();

    assert_eq!(chunks, vec!["one,", "two,", "three"]);
}

#[test]
fn keep_separator_start_prepends_to_following_piece() {
    let splitter = CharacterSplitter::new(6, 0)
        .unwrap()
        .with_separator(", ")
        .with_keep_separator(KeepSeparator::Start);
    let chunks = splitter.split_text("one, two, three").unwrap();

    assert_eq!(chunks, vec!["one", ", two", ", three"]);
}

#[test]
fn regex_separator() {
    let splitter = CharacterSplitter::new(10, 0)
        .unwrap()
        .with_separator(r"\d+")
        .with_separator_regex(true);
    let chunks = splitter.split_text("alpha123beta45gamma").unwrap();

    assert!(chunks.iter().any(|chunk| chunk.contains("alpha")));
    assert!(chunks.iter().any(|chunk| chunk.contains("gamma")));
    assert!(chunks.iter().all(|chunk| !chunk.contains('1')));
}

#[test]
fn separator_not_found_emits_oversized_piece_verbatim() {
    // The piece cannot be divided on this separator, so the size ceiling
    // is locally violated rather than dropping data.
    let splitter = CharacterSplitter::new(10, 0).unwrap().with_separator("|||");
    let chunks = splitter.split_text("hello world this is a test").unwrap();

    assert_eq!(chunks, vec!["hello world this is a test"]);
}

#[test]
fn small_text_returns_single_chunk() {
    let splitter = CharacterSplitter::new(100, 0).unwrap();
    let chunks = splitter.split_text("Small text.").unwrap();

    assert_eq!(chunks, vec!["Small text."]);
}

#[test]
fn empty_text_returns_no_chunks() {
    let splitter = CharacterSplitter::new(100, 0).unwrap();
    assert!(splitter.split_text("").unwrap().is_empty());
}

#[test]
fn overlap_larger_than_size_is_a_config_error() {
    assert!(CharacterSplitter::new(10, 11).is_err());
}

#[test]
fn overlap_larger_than_splits_does_not_panic() {
    let splitter = CharacterSplitter::new(10, 8).unwrap().with_separator(" ");
    let chunks = splitter.split_text("aa bb cc dd ee").unwrap();

    assert!(!chunks.is_empty());
    for word in ["aa", "bb", "cc", "dd", "ee"] {
        assert!(
            chunks.iter().any(|chunk| chunk.contains(word)),
            "word '{word}' missing from chunks: {chunks:?}",
        );
    }
}
