//! The chat session wired to retrieval and a chat model, with in-memory
//! stand-ins for the hosted services.

use std::sync::Arc;

use docqa_cli::console::{ANSWER_HEADER, EXIT_QUESTION, FAREWELL};
use docqa_cli::{ChatSession, RagAnswerer, ReadLine, ScriptedReader};
use docqa_model::{ChatModel, MockChatModel};
use docqa_rag::{
    Document, InMemoryVectorStore, MockEmbeddingProvider, RagConfig, RagPipeline, Retriever,
    chunk_ids,
};

async fn retriever(texts: &[&str]) -> Retriever {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(MockEmbeddingProvider::default()))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .collection("relatorio")
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();
    let docs: Vec<Document> = texts.iter().map(|t| Document::new(*t)).collect();
    pipeline.add_documents(&docs, &chunk_ids(docs.len())).await.unwrap();
    Retriever::new(Arc::new(pipeline))
}

async fn session(
    script: ScriptedReader,
    model: Arc<MockChatModel>,
) -> (ScriptedReader, String, anyhow::Result<()>) {
    let answerer = RagAnswerer::new(
        retriever(&["O faturamento foi de 10 milhões.", "A empresa tem 50 funcionários."]).await,
        model as Arc<dyn ChatModel>,
    );
    let mut session = ChatSession::new(script, answerer, Vec::new());
    let result = session.run().await;
    let (reader, _, out) = session.into_parts();
    (reader, String::from_utf8(out).unwrap(), result)
}

#[tokio::test]
async fn question_is_answered_from_retrieved_context() {
    let model = Arc::new(MockChatModel::new("Foi de 10 milhões."));
    let (_, out, result) =
        session(ScriptedReader::lines(["Qual o faturamento?"]), model.clone()).await;
    result.unwrap();

    let calls = model.invocations();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].temperature, 0.5);
    assert!(calls[0].prompt.contains("PERGUNTA DO USUÁRIO:\nQual o faturamento?"));
    assert!(calls[0].prompt.contains("O faturamento foi de 10 milhões."));
    assert!(calls[0].prompt.contains("A empresa tem 50 funcionários."));

    assert!(out.contains(&format!("{ANSWER_HEADER}\nFoi de 10 milhões.")));
}

#[tokio::test]
async fn declining_to_exit_returns_to_the_prompt() {
    let model = Arc::new(MockChatModel::new("ok"));
    let (reader, out, result) =
        session(ScriptedReader::lines(["sair", "n", "Quantos funcionários?", "sair", "y"]), model.clone())
            .await;
    result.unwrap();
    assert_eq!(reader.remaining(), 0);
    assert_eq!(model.invocations().len(), 1);
    assert_eq!(out.matches(FAREWELL).count(), 1);
}

#[tokio::test]
async fn confirming_exit_stops_before_further_input() {
    let model = Arc::new(MockChatModel::new("ok"));
    let (reader, _, result) =
        session(ScriptedReader::lines(["SAIR", "y", "Qual o faturamento?"]), model.clone()).await;
    result.unwrap();
    assert_eq!(reader.remaining(), 1);
    assert!(model.invocations().is_empty());
}

#[tokio::test]
async fn end_of_input_exits_without_asking() {
    let model = Arc::new(MockChatModel::new("ok"));
    let (reader, out, result) = session(ScriptedReader::new([ReadLine::Eof]), model).await;
    result.unwrap();
    assert_eq!(reader.prompts().len(), 1);
    assert!(!out.contains(EXIT_QUESTION));
    assert!(out.contains(FAREWELL));
}

#[tokio::test]
async fn interrupt_then_yes_exits() {
    let model = Arc::new(MockChatModel::new("ok"));
    let script = [ReadLine::Interrupted, ReadLine::Line("y".into()), ReadLine::Line("ignored".into())];
    let (reader, out, result) = session(ScriptedReader::new(script), model).await;
    result.unwrap();
    assert_eq!(reader.remaining(), 1);
    assert!(out.contains("Interrompido pelo usuário."));
}

#[tokio::test]
async fn model_failure_ends_the_session_with_its_error() {
    let model = Arc::new(MockChatModel::failing());
    let (reader, _, result) =
        session(ScriptedReader::lines(["Qual o faturamento?", "outra"]), model).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("mock failure"), "{err}");
    assert_eq!(reader.remaining(), 1);
}
