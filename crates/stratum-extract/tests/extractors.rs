use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use stratum_core::{RelatedNode, StratumError, TextCompletion, TextNode};
use stratum_extract::{
    apply_extractors, Extractor, KeywordExtractor, QuestionsExtractor, ScriptedCompletion,
    SummaryExtractor, TitleExtractor,
};

/// A collaborator that always fails, for exercising best-effort recovery.
struct FailingCompletion;

#[async_trait]
impl TextCompletion for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, StratumError> {
        Err(StratumError::Extraction("provider unavailable".into()))
    }
}

fn chunk_with_source(text: &str, source_id: &str) -> TextNode {
    let mut node = TextNode::new(text);
    node.relationships.source = Some(RelatedNode::new(source_id));
    node
}

#[tokio::test]
async fn title_is_consistent_within_a_source_group() {
    // Two chunks from document A, one from document B. Per group: one
    // candidate call per non-empty node, then one combine call.
    let model = Arc::new(ScriptedCompletion::new(vec![
        "candidate a1",
        "candidate a2",
        "Title A",
        "candidate b",
        "Title B",
    ]));
    let extractor = TitleExtractor::new(model.clone());

    let nodes = vec![
        chunk_with_source("alpha text", "A"),
        chunk_with_source("more alpha", "A"),
        chunk_with_source("beta text", "B"),
    ];
    let fragments = extractor.extract(&nodes).await.unwrap();

    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[0]["documentTitle"], json!("Title A"));
    assert_eq!(fragments[1]["documentTitle"], json!("Title A"));
    assert_eq!(fragments[2]["documentTitle"], json!("Title B"));
    assert_eq!(model.call_count(), 5);
}

#[tokio::test]
async fn title_groups_by_own_id_when_no_source_is_set() {
    let model = Arc::new(ScriptedCompletion::new(vec![
        "candidate one",
        "Title One",
        "candidate two",
        "Title Two",
    ]));
    let extractor = TitleExtractor::new(model);

    let nodes = vec![TextNode::new("first"), TextNode::new("second")];
    let fragments = extractor.extract(&nodes).await.unwrap();

    assert_eq!(fragments[0]["documentTitle"], json!("Title One"));
    assert_eq!(fragments[1]["documentTitle"], json!("Title Two"));
}

#[tokio::test]
async fn empty_nodes_short_circuit_without_calls() {
    let model = Arc::new(ScriptedCompletion::new(Vec::<String>::new()));

    let nodes = vec![TextNode::new(""), TextNode::new("   \n ")];

    let title_fragments = TitleExtractor::new(model.clone())
        .extract(&nodes)
        .await
        .unwrap();
    assert_eq!(title_fragments[0]["documentTitle"], json!(""));
    assert_eq!(title_fragments[1]["documentTitle"], json!(""));

    let summary_fragments = SummaryExtractor::new(model.clone())
        .extract(&nodes)
        .await
        .unwrap();
    assert_eq!(summary_fragments[0]["sectionSummary"], json!(""));

    let keyword_fragments = KeywordExtractor::new(model.clone())
        .extract(&nodes)
        .await
        .unwrap();
    assert_eq!(keyword_fragments[0]["excerptKeywords"], json!(""));

    let question_fragments = QuestionsExtractor::new(model.clone())
        .extract(&nodes)
        .await
        .unwrap();
    assert_eq!(
        question_fragments[0]["questionsThisExcerptCanAnswer"],
        json!("")
    );

    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn completion_failures_recover_to_empty_strings() {
    let nodes = vec![TextNode::new("some content"), TextNode::new("more content")];

    let fragments = SummaryExtractor::new(Arc::new(FailingCompletion))
        .extract(&nodes)
        .await
        .unwrap();

    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0]["sectionSummary"], json!(""));
    assert_eq!(fragments[1]["sectionSummary"], json!(""));
}

#[tokio::test]
async fn summary_neighbors_are_positional() {
    let model = Arc::new(ScriptedCompletion::new(vec![
        "summary one",
        "summary two",
        "summary three",
    ]));
    let extractor = SummaryExtractor::new(model).with_neighbors();

    let nodes = vec![
        TextNode::new("first"),
        TextNode::new("second"),
        TextNode::new("third"),
    ];
    let fragments = extractor.extract(&nodes).await.unwrap();

    assert!(!fragments[0].contains_key("prevSectionSummary"));
    assert_eq!(fragments[0]["nextSectionSummary"], json!("summary two"));
    assert_eq!(fragments[1]["prevSectionSummary"], json!("summary one"));
    assert_eq!(fragments[1]["nextSectionSummary"], json!("summary three"));
    assert_eq!(fragments[2]["prevSectionSummary"], json!("summary two"));
    assert!(!fragments[2].contains_key("nextSectionSummary"));
}

#[tokio::test]
async fn questions_and_keywords_write_their_keys() {
    let model = Arc::new(ScriptedCompletion::new(vec!["1. What is stratum?"]));
    let fragments = QuestionsExtractor::new(model)
        .with_num_questions(1)
        .extract(&[TextNode::new("stratum is a chunker")])
        .await
        .unwrap();
    assert_eq!(
        fragments[0]["questionsThisExcerptCanAnswer"],
        json!("1. What is stratum?")
    );

    let model = Arc::new(ScriptedCompletion::new(vec!["chunking, rag"]));
    let fragments = KeywordExtractor::new(model)
        .with_num_keywords(2)
        .extract(&[TextNode::new("chunking for rag")])
        .await
        .unwrap();
    assert_eq!(fragments[0]["excerptKeywords"], json!("chunking, rag"));
}

#[tokio::test]
async fn apply_extractors_overlays_without_clobbering_existing_keys() {
    let model = Arc::new(ScriptedCompletion::new(vec!["a summary"]));
    let extractors: Vec<Arc<dyn Extractor>> = vec![Arc::new(SummaryExtractor::new(model))];

    let mut nodes = vec![TextNode::new("content").with_metadata_entry("source", json!("a.md"))];
    apply_extractors(&extractors, &mut nodes).await.unwrap();

    assert_eq!(nodes[0].metadata["source"], json!("a.md"));
    assert_eq!(nodes[0].metadata["sectionSummary"], json!("a summary"));
}
