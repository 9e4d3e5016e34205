use stratum_splitters::{Language, RecursiveCharacterSplitter, TextSplitter};

#[test]
fn splits_paragraphs_first() {
    let splitter = RecursiveCharacterSplitter::new(50, 0).unwrap();
    let text = "Short paragraph.\n\nAnother short paragraph.\n\nThird one.";
    let chunks = splitter.split_text(text).unwrap();

    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 50, "chunk too long: {} chars", chunk.len());
    }
}

#[test]
fn falls_back_to_newlines() {
    let splitter = RecursiveCharacterSplitter::new(30, 0).unwrap();
    let text = "Line one\nLine two\nLine three\nLine four";
    let chunks = splitter.split_text(text).unwrap();

    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 30, "chunk too long: {}", chunk.len());
    }
}

#[test]
fn handles_very_long_words() {
    let splitter = RecursiveCharacterSplitter::new(10, 0).unwrap();
    let chunks = splitter.split_text("abcdefghijklmnopqrstuvwxyz").unwrap();

    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 10);
    }
}

#[test]
fn custom_separators() {
    let splitter = RecursiveCharacterSplitter::new(15, 0)
        .unwrap()
        .with_separators(vec![";".to_string(), ",".to_string(), String::new()]);
    let chunks = splitter.split_text("alpha;beta,gamma;delta").unwrap();

    assert_eq!(chunks, vec!["alpha", ";beta,gamma", ";delta"]);
}

#[test]
fn concatenation_reproduces_input_without_overlap() {
    let splitter = RecursiveCharacterSplitter::new(5, 0)
        .unwrap()
        .with_strip_whitespace(false);
    let text = "aaa\nbbb\nccc";
    let chunks = splitter.split_text(text).unwrap();

    assert!(chunks.len() >= 2);
    assert_eq!(chunks.concat(), text);
}

#[test]
fn small_text_single_chunk() {
    let splitter = RecursiveCharacterSplitter::new(100, 0).unwrap();
    assert_eq!(splitter.split_text("Hello world").unwrap(), vec!["Hello world"]);
}

#[test]
fn python_splits_on_class_and_def() {
    let code = r#"
class MyClass:
    def __init__(self):
        self.x = 1

    def method(self):
        return self.x

def standalone_function():
    return 42

class AnotherClass:
    def another_method(self):
        pass
"#;

    let splitter = RecursiveCharacterSplitter::from_language(Language::Python, 80, 0).unwrap();
    let chunks = splitter.split_text(code).unwrap();

    assert!(
        chunks.len() >= 2,
        "expected at least 2 chunks, got {}",
        chunks.len()
    );
    for chunk in &chunks {
        assert!(
            chunk.len() <= 80,
            "chunk too long: {} chars: {:?}",
            chunk.len(),
            chunk
        );
    }
}

#[test]
fn rust_splits_on_fn_and_struct() {
    let code = r#"
struct Point {
    x: f64,
    y: f64,
}

fn main() {
    let p = Point { x: 3.0, y: 4.0 };
    println!("{}", p.x + p.y);
}
"#;

    let splitter = RecursiveCharacterSplitter::from_language(Language::Rust, 100, 0).unwrap();
    let chunks = splitter.split_text(code).unwrap();

    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 100, "chunk too long: {} chars", chunk.len());
    }
}

#[test]
fn language_separator_tables_all_end_with_empty() {
    let languages = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Rust,
        Language::Go,
        Language::Java,
        Language::Cpp,
        Language::Ruby,
        Language::Markdown,
        Language::Latex,
        Language::Html,
    ];

    for language in &languages {
        let separators = language.separators();
        assert!(
            !separators.is_empty(),
            "language {language:?} has no separators"
        );
        assert_eq!(
            *separators.last().unwrap(),
            "",
            "language {language:?} should end with the empty separator"
        );
    }
}

#[test]
fn unknown_language_name_is_rejected() {
    assert!("cobol".parse::<Language>().is_err());
    assert_eq!("rust".parse::<Language>().unwrap(), Language::Rust);
}
