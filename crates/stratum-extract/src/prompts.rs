//! Prompt templates rendered for the text-completion collaborator.

pub(crate) const TITLE_CANDIDATE_PROMPT: &str = "Context: {context}\n\n\
Give a title that summarizes all of the unique entities, titles or themes found in the context.\n\n\
Title: ";

pub(crate) const TITLE_COMBINE_PROMPT: &str = "{context}\n\n\
Based on the above candidate titles and contents, what is the comprehensive title for this document?\n\n\
Title: ";

pub(crate) const SUMMARY_PROMPT: &str = "{context}\n\n\
Summarize the key topics and entities of the section.\n\n\
Summary: ";

pub(crate) const QUESTIONS_PROMPT: &str = "{context}\n\n\
Given the contextual information, generate {num_questions} questions this context can provide \
specific answers to which are unlikely to be found elsewhere.\n\n\
Questions: ";

pub(crate) const KEYWORDS_PROMPT: &str = "{context}\n\n\
Give {num_keywords} unique keywords for this document. Format as comma separated.\n\n\
Keywords: ";

pub(crate) fn render(template: &str, context: &str) -> String {
    template.replace("{context}", context)
}
