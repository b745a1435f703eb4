use cookery_core::types::Document;

const INSTRUCTIONS: &str = "You're a cooking course instructor. Answer the QUESTION based on the CONTEXT from the cooking knowledge database.\n\
Use only the facts from the CONTEXT when answering the QUESTION.";

/// One knowledge-base entry as it appears in the prompt context.
/// Missing fields render as empty values.
pub fn format_entry(doc: &Document) -> String {
    format!(
        "type: {}\nquestion: {}\nanswer: {}",
        doc.text("type"),
        doc.text("question"),
        doc.text("response")
    )
}

/// Compose the final prompt from the user question and ranked search results.
/// Entries keep their rank order and are separated by blank lines.
pub fn build_prompt(question: &str, results: &[Document]) -> String {
    let context: String = results.iter().map(|doc| format_entry(doc) + "\n\n").collect();
    let prompt = format!("{INSTRUCTIONS}\n\nQUESTION: {question}\n\nCONTEXT: \n{context}");
    prompt.trim().to_string()
}
