use crate::models::ScoredPassage;

/// How many passages ground an answer by default.
pub const DEFAULT_TOP_K: usize = 4;

/// Returned when a question arrives before any index has been persisted.
pub const NO_DOCUMENTS_ANSWER: &str =
    "No documents have been processed yet. Please upload a document first.";

/// The phrase the model is instructed to emit when the retrieved context
/// does not contain the answer.
pub const REFUSAL_PHRASE: &str = "I don't have that information";

/// Concatenates retrieved passage texts in ranked order, separated by a
/// blank line.
pub fn format_context(passages: &[ScoredPassage]) -> String {
    passages
        .iter()
        .map(|scored| scored.passage.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the grounding prompt: the model must answer strictly from the
/// supplied context and fall back to the fixed refusal phrase otherwise.
pub fn build_grounding_prompt(question: &str, passages: &[ScoredPassage]) -> String {
    format!(
        "Answer the question based only on the following context.\n\
         If the answer is not in the context, say \"{REFUSAL_PHRASE}\".\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}",
        context = format_context(passages),
    )
}
