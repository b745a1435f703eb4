use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::debug;

use cookery_core::Error;
use cookery_rag::RagPipeline;
use cookery_text::Index;

use crate::EMPTY_QUESTION;

fn show_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "🎯 Commands:")?;
    writeln!(out, "  /help            - Show this help message")?;
    writeln!(out, "  /search <query>  - Show retrieved entries without asking the model")?;
    writeln!(out, "  /stats           - Show index statistics")?;
    writeln!(out, "  /quit            - Exit")?;
    writeln!(out, "  <question>       - Ask a cooking question")
}

/// Interactive question loop over stdin.
pub fn run(rag: &RagPipeline<Index>) -> Result<()> {
    let mut out = io::stdout();
    writeln!(out, "🍳 Cookery - let me help you cook up a meal... safely")?;
    writeln!(out, "📊 {} knowledge-base entries loaded", rag.index().len())?;
    show_help(&mut out)?;
    writeln!(out)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(out, "ask> ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        if !respond(rag, &line?, &mut out)? {
            break;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Handle one line of input. Returns `false` once the user asks to leave.
fn respond(rag: &RagPipeline<Index>, input: &str, out: &mut impl Write) -> io::Result<bool> {
    let input = input.trim();
    debug!(input, "Chat input");
    match input {
        "" => writeln!(out, "⚠️  {EMPTY_QUESTION}")?,
        "/help" | "/h" => show_help(out)?,
        "/stats" | "/s" => {
            writeln!(out, "📊 Entries: {}", rag.index().len())?;
            writeln!(out, "🔤 Text fields: {}", rag.index().text_fields().join(", "))?;
            writeln!(out, "🔑 Keyword fields: {}", rag.index().keyword_fields().join(", "))?;
        }
        "/quit" | "/q" | "quit" | "exit" => {
            writeln!(out, "👋 Goodbye!")?;
            return Ok(false);
        }
        _ => {
            if let Some(query) = input.strip_prefix("/search ") {
                match rag.search(query) {
                    Ok(docs) => {
                        for (i, doc) in docs.iter().enumerate() {
                            writeln!(out, "  {}. [{}] {}", i + 1, doc.text("type"), doc.text("question"))?;
                        }
                        if docs.is_empty() { writeln!(out, "  (no matching entries)")?; }
                    }
                    Err(e) => writeln!(out, "❌ Search error: {}", e)?,
                }
            } else {
                match rag.ask(input) {
                    Ok(answer) => writeln!(out, "\n🍽️  {}", answer.answer)?,
                    Err(Error::InvalidArgument(msg)) => writeln!(out, "⚠️  {}", msg)?,
                    Err(e) => writeln!(out, "❌ Error: {}", e)?,
                }
            }
        }
    }
    Ok(true)
}
