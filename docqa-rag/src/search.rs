//! Retrieval and prompt assembly.
//!
//! [`Retriever`] fetches the chunks most similar to a question and renders
//! them into [`RAG_PROMPT`], a Portuguese template that restricts the model
//! to the retrieved context.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::pipeline::RagPipeline;

/// The answer-only-from-context prompt, with slots `{contexto}` and `{pergunta}`.
pub const RAG_PROMPT: &str = r#"
CONTEXTO:
{contexto}

REGRAS:
- Responda somente com base no CONTEXTO.
- Se a informação não estiver explicitamente no CONTEXTO, responda:
  "Não tenho informações necessárias para responder sua pergunta."
- Nunca invente ou use conhecimento externo.
- Nunca produza opiniões ou interpretações além do que está escrito.

EXEMPLOS DE PERGUNTAS FORA DO CONTEXTO:
Pergunta: "Qual é a capital da França?"
Resposta: "Não tenho informações necessárias para responder sua pergunta."

Pergunta: "Quantos clientes temos em 2024?"
Resposta: "Não tenho informações necessárias para responder sua pergunta."

Pergunta: "Você acha isso bom ou ruim?"
Resposta: "Não tenho informações necessárias para responder sua pergunta."

PERGUNTA DO USUÁRIO:
{pergunta}

RESPONDA A "PERGUNTA DO USUÁRIO"
"#;

/// The sentence the model is told to answer with when the context is silent.
pub const REFUSAL: &str = "Não tenho informações necessárias para responder sua pergunta.";

/// A text template with `{name}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse `template`, collecting its slot names in order of first use.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut input_variables: Vec<String> = Vec::new();
        for segment in Segments::new(&template) {
            if let Segment::Slot(name) = segment {
                if !input_variables.iter().any(|v| v == name) {
                    input_variables.push(name.to_string());
                }
            }
        }
        Self { template, input_variables }
    }

    /// The question-answering template, [`RAG_PROMPT`].
    pub fn rag() -> Self {
        Self::new(RAG_PROMPT)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Slot names, in order of first appearance.
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Fill every slot from `values` in a single pass: text substituted into
    /// one slot is never itself scanned for slots.
    ///
    /// # Errors
    ///
    /// [`RagError::InvalidInput`] naming the first slot without a value.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(self.template.len());
        for segment in Segments::new(&self.template) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(name) => {
                    let value = values
                        .iter()
                        .find_map(|(key, value)| (*key == name).then_some(*value))
                        .ok_or_else(|| {
                            RagError::InvalidInput(format!("missing value for prompt slot '{name}'"))
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Fill the `contexto` and `pergunta` slots.
    pub fn format(&self, contexto: &str, pergunta: &str) -> Result<String> {
        self.render(&[("contexto", contexto), ("pergunta", pergunta)])
    }
}

enum Segment<'a> {
    Text(&'a str),
    Slot(&'a str),
}

/// Splits a template into literal text and `{identifier}` slots. Braces that
/// do not enclose an identifier are literal text.
struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Segments<'a> {
    fn new(template: &'a str) -> Self {
        Self { rest: template }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let mut search_from = 0;
        while let Some(offset) = self.rest[search_from..].find('{') {
            let open = search_from + offset;
            let after = &self.rest[open + 1..];
            if let Some(close) = after.find('}') {
                let name = &after[..close];
                let is_slot = !name.is_empty()
                    && name.chars().all(|c| c.is_alphanumeric() || c == '_');
                if is_slot {
                    if open > 0 {
                        let text = &self.rest[..open];
                        self.rest = &self.rest[open..];
                        return Some(Segment::Text(text));
                    }
                    self.rest = &after[close + 1..];
                    return Some(Segment::Slot(name));
                }
            }
            search_from = open + 1;
        }
        let text = self.rest;
        self.rest = "";
        Some(Segment::Text(text))
    }
}

/// How retrieved chunks are written into the `contexto` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextFormat {
    /// Chunk texts only, separated by blank lines.
    #[default]
    Text,
    /// Each chunk preceded by a `[source, página N]` line.
    WithProvenance,
}

impl ContextFormat {
    /// Render `results` in store order. Scores are never included.
    pub fn render(&self, results: &[SearchResult]) -> String {
        let mut out = String::new();
        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            if *self == ContextFormat::WithProvenance {
                let _ = writeln!(out, "[{}]", provenance(result));
            }
            out.push_str(result.chunk.text.trim());
        }
        out
    }
}

fn provenance(result: &SearchResult) -> String {
    let metadata = &result.chunk.metadata;
    let source = metadata.get("source").and_then(|v| v.as_str()).unwrap_or(result.chunk.id.as_str());
    match metadata.get("page_label").and_then(|v| v.as_str()) {
        Some(label) => format!("{source}, página {label}"),
        None => match metadata.get("page").and_then(|v| v.as_u64()) {
            Some(page) => format!("{source}, página {}", page + 1),
            None => source.to_string(),
        },
    }
}

/// Outcome of [`Retriever::search_prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPrompt {
    /// No question was given: the unfilled template.
    Template(PromptTemplate),
    /// The template filled with retrieved context and the question.
    Rendered(String),
}

impl SearchPrompt {
    /// The rendered prompt, if a question was given.
    pub fn rendered(&self) -> Option<&str> {
        match self {
            SearchPrompt::Rendered(prompt) => Some(prompt),
            SearchPrompt::Template(_) => None,
        }
    }
}

/// Turns questions into prompts backed by a [`RagPipeline`].
#[derive(Clone)]
pub struct Retriever {
    pipeline: Arc<RagPipeline>,
    template: PromptTemplate,
    k: usize,
    context_format: ContextFormat,
}

impl Retriever {
    /// Retrieve the pipeline's configured `top_k` chunks
    /// ([`TOP_K`](crate::config::TOP_K) by default)
    /// into [`RAG_PROMPT`].
    pub fn new(pipeline: Arc<RagPipeline>) -> Self {
        let k = pipeline.config().top_k;
        Self { pipeline, template: PromptTemplate::rag(), k, context_format: ContextFormat::default() }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_context_format(mut self, format: ContextFormat) -> Self {
        self.context_format = format;
        self
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// The `k` stored chunks most similar to `question`, in store order.
    /// Embedding and store errors propagate unchanged.
    #[instrument(skip(self), fields(k = self.k))]
    pub async fn database_search(&self, question: &str) -> Result<Vec<SearchResult>> {
        let results = self.pipeline.similarity_search_with_score(question, self.k).await?;
        debug!(returned = results.len(), "retrieved context");
        Ok(results)
    }

    /// Build the prompt for `question`.
    ///
    /// An absent, empty or whitespace-only question returns the unfilled
    /// template without querying the store. A whitespace-only question is
    /// never embedded, even though it is a non-empty string.
    pub async fn search_prompt(&self, question: Option<&str>) -> Result<SearchPrompt> {
        let question = match question {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Ok(SearchPrompt::Template(self.template.clone())),
        };

        let results = self.database_search(question).await?;
        let contexto = self.context_format.render(&results);
        Ok(SearchPrompt::Rendered(self.template.format(&contexto, question)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Chunk, Metadata};
    use serde_json::json;

    fn result(text: &str, metadata: Metadata, score: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk { id: "doc-0".into(), text: text.into(), metadata, embedding: vec![] },
            score,
        }
    }

    #[test]
    fn rag_prompt_has_exactly_two_slots() {
        let template = PromptTemplate::rag();
        assert_eq!(template.input_variables(), ["contexto", "pergunta"]);
    }

    #[test]
    fn rendering_does_not_rescan_substituted_text() {
        let template = PromptTemplate::rag();
        let prompt = template.format("texto com {pergunta} literal", "Qual o faturamento?").unwrap();
        assert!(prompt.contains("texto com {pergunta} literal"));
        assert_eq!(prompt.matches("Qual o faturamento?").count(), 1);
    }

    #[test]
    fn missing_slot_value_is_invalid_input() {
        let template = PromptTemplate::new("{a} and {b}");
        let err = template.render(&[("a", "x")]).unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(msg) if msg.contains("'b'")));
    }

    #[test]
    fn non_identifier_braces_are_literal() {
        let template = PromptTemplate::new("json {} and { x } then {name}");
        assert_eq!(template.input_variables(), ["name"]);
        assert_eq!(template.render(&[("name", "ok")]).unwrap(), "json {} and { x } then ok");
    }

    #[test]
    fn text_context_omits_scores_and_metadata() {
        let results = vec![
            result("primeiro trecho", Metadata::from([("source".into(), json!("a.pdf"))]), 0.91),
            result("segundo trecho", Metadata::new(), 0.42),
        ];
        let context = ContextFormat::Text.render(&results);
        assert_eq!(context, "primeiro trecho\n\nsegundo trecho");
        assert!(!context.contains("0.91"));
    }

    #[test]
    fn provenance_context_names_source_and_page() {
        let metadata = Metadata::from([
            ("source".into(), json!("relatorio.pdf")),
            ("page".into(), json!(2)),
            ("page_label".into(), json!("3")),
        ]);
        let context = ContextFormat::WithProvenance.render(&[result("receita", metadata, 0.8)]);
        assert_eq!(context, "[relatorio.pdf, página 3]\nreceita");
    }
}
