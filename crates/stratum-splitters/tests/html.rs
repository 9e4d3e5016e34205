use serde_json::json;
use stratum_splitters::{HtmlHeaderSplitter, HtmlSectionSplitter};

const PAGE: &str = "\
<html><body>
<p>Preamble text.</p>
<h1>Main Title</h1>
<p>Intro under the title.</p>
<h2>First Topic</h2>
<p>Body of the first topic.</p>
<h2>Second Topic</h2>
<p>Body of the second topic.</p>
</body></html>";

#[test]
fn header_split_tracks_open_header_stack() {
    let splitter = HtmlHeaderSplitter::default_headers();
    let nodes = splitter.split_html(PAGE);

    assert_eq!(nodes.len(), 4);

    assert_eq!(nodes[0].text, "Preamble text.");
    assert!(!nodes[0].metadata.contains_key("Header 1"));

    assert_eq!(nodes[1].text, "Intro under the title.");
    assert_eq!(nodes[1].metadata["Header 1"], json!("Main Title"));
    assert!(!nodes[1].metadata.contains_key("Header 2"));

    assert_eq!(nodes[2].metadata["Header 1"], json!("Main Title"));
    assert_eq!(nodes[2].metadata["Header 2"], json!("First Topic"));

    assert_eq!(nodes[3].metadata["Header 2"], json!("Second Topic"));
}

#[test]
fn header_chunks_carry_xpath_positions() {
    let splitter = HtmlHeaderSplitter::default_headers();
    let nodes = splitter.split_html(PAGE);

    assert_eq!(
        nodes[2].metadata["xpath"],
        json!("/html[1]/body[1]/h2[1]")
    );
    // The second h2 is distinguished by its 1-indexed sibling position.
    assert_eq!(
        nodes[3].metadata["xpath"],
        json!("/html[1]/body[1]/h2[2]")
    );
}

#[test]
fn deeper_header_is_cleared_when_parent_level_repeats() {
    let html = "<html><body>\
        <h1>One</h1><h2>Sub</h2><p>a</p>\
        <h1>Two</h1><p>b</p>\
        </body></html>";
    let nodes = HtmlHeaderSplitter::default_headers().split_html(html);

    let last = nodes.last().unwrap();
    assert_eq!(last.text, "b");
    assert_eq!(last.metadata["Header 1"], json!("Two"));
    assert!(!last.metadata.contains_key("Header 2"));
}

#[test]
fn section_split_merges_nested_subheaders() {
    let html = "<html><body>\
        <h1>Alpha</h1><p>alpha body</p><h3>Nested</h3><p>nested body</p>\
        <h1>Beta</h1><p>beta body</p>\
        </body></html>";
    let splitter = HtmlSectionSplitter::new(vec![("h1".to_string(), "Header 1".to_string())]);
    let nodes = splitter.split_html(html);

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].metadata["Header 1"], json!("Alpha"));
    assert!(nodes[0].text.contains("alpha body"));
    assert!(
        nodes[0].text.contains("Nested") && nodes[0].text.contains("nested body"),
        "sub-header content should merge into the parent section: {:?}",
        nodes[0].text
    );
    assert_eq!(nodes[1].metadata["Header 1"], json!("Beta"));
}

#[test]
fn section_text_starts_with_its_heading() {
    let html = "<html><body><h1>Alpha</h1><p>body</p></body></html>";
    let nodes = HtmlSectionSplitter::default_sections().split_html(html);

    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].text.starts_with("Alpha"));
}

#[test]
fn script_and_style_content_is_ignored() {
    let html = "<html><head><title>T</title></head><body>\
        <style>p { color: red; }</style>\
        <h1>Head</h1><p>visible</p>\
        <script>var x = 1;</script>\
        </body></html>";
    let nodes = HtmlHeaderSplitter::default_headers().split_html(html);

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].text, "visible");
    assert_eq!(nodes[0].metadata["Header 1"], json!("Head"));
}
