use stratum_splitters::{SentenceSplitter, TextSplitter};

#[test]
fn detects_plain_sentence_boundaries() {
    let splitter = SentenceSplitter::new(100, 0).unwrap();
    let sentences =
        splitter.split_into_sentences("Hello world. How are you? I am fine. Thanks for asking.");

    assert_eq!(
        sentences,
        vec![
            "Hello world.",
            "How are you?",
            "I am fine.",
            "Thanks for asking."
        ]
    );
}

#[test]
fn honorific_titles_do_not_end_sentences() {
    let splitter = SentenceSplitter::new(100, 0).unwrap();
    let sentences = splitter.split_into_sentences("Dr. Smith went home. He slept.");

    assert_eq!(sentences, vec!["Dr. Smith went home.", "He slept."]);
}

#[test]
fn initialisms_do_not_end_sentences() {
    let splitter = SentenceSplitter::new(100, 0).unwrap();
    let sentences = splitter.split_into_sentences("The U.S.A. Is a large country.");

    assert_eq!(sentences, vec!["The U.S.A. Is a large country."]);
}

#[test]
fn meridiem_markers_do_not_end_sentences() {
    let splitter = SentenceSplitter::new(100, 0).unwrap();
    let sentences = splitter.split_into_sentences("We met at 9 a.m. The meeting ran long.");

    assert_eq!(sentences, vec!["We met at 9 a.m. The meeting ran long."]);
}

#[test]
fn bare_numbers_do_not_end_sentences() {
    let splitter = SentenceSplitter::new(100, 0).unwrap();
    let sentences = splitter.split_into_sentences("See item 3. Then read on.");

    assert_eq!(sentences, vec!["See item 3. Then read on."]);
}

#[test]
fn lowercase_continuation_is_not_a_boundary() {
    let splitter = SentenceSplitter::new(100, 0).unwrap();
    let sentences = splitter.split_into_sentences("He said no. but then he agreed.");

    assert_eq!(sentences, vec!["He said no. but then he agreed."]);
}

#[test]
fn groups_sentences_up_to_max_size() {
    let splitter = SentenceSplitter::new(30, 0).unwrap();
    let chunks = splitter
        .split_text("Aaa bbb ccc. Ddd eee fff. Ggg hhh iii.")
        .unwrap();

    assert_eq!(chunks, vec!["Aaa bbb ccc. Ddd eee fff.", "Ggg hhh iii."]);
    for chunk in &chunks {
        assert!(chunk.len() <= 30);
    }
}

#[test]
fn overlap_seeds_next_chunk_with_trailing_sentence() {
    let splitter = SentenceSplitter::new(30, 15).unwrap();
    let chunks = splitter
        .split_text("Aaa bbb ccc. Ddd eee fff. Ggg hhh iii.")
        .unwrap();

    assert_eq!(
        chunks,
        vec!["Aaa bbb ccc. Ddd eee fff.", "Ddd eee fff. Ggg hhh iii."]
    );
}

#[test]
fn oversized_sentence_falls_back_to_words_then_characters() {
    let splitter = SentenceSplitter::new(10, 0).unwrap();
    let chunks = splitter
        .split_text("Supercalifragilistic expialidocious indeed.")
        .unwrap();

    assert!(chunks.len() > 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 10, "chunk too long: {chunk:?}");
    }
    let rejoined = chunks.concat();
    assert!(rejoined.contains("Supercalifragilistic"));
    assert!(rejoined.contains("indeed."));
}

#[test]
fn word_fallback_can_be_disabled() {
    let splitter = SentenceSplitter::new(10, 0).unwrap().with_word_fallback(false);
    let chunks = splitter
        .split_text("Supercalifragilistic expialidocious indeed.")
        .unwrap();

    // The oversized sentence passes through verbatim instead of splitting.
    assert_eq!(chunks, vec!["Supercalifragilistic expialidocious indeed."]);
}

#[test]
fn empty_input_yields_no_chunks() {
    let splitter = SentenceSplitter::new(50, 0).unwrap();
    assert!(splitter.split_text("").unwrap().is_empty());
    assert!(splitter.split_text("   \n  ").unwrap().is_empty());
}

#[test]
fn overlap_larger_than_max_size_is_a_config_error() {
    assert!(SentenceSplitter::new(10, 11).is_err());
}

#[test]
fn target_size_larger_than_max_size_is_a_config_error() {
    assert!(SentenceSplitter::new(100, 0)
        .unwrap()
        .with_target_size(120)
        .is_err());
}
