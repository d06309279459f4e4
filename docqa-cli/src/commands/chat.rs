use std::io;
use std::sync::Arc;

use docqa_model::GeminiChatModel;
use docqa_rag::{RagConfig, Retriever};
use tracing::info;

use crate::console::{ChatSession, RagAnswerer, RustylineReader};
use crate::settings::ChatSettings;

/// Run the `docqa-chat` session on the terminal until the user leaves.
pub async fn run_chat(settings: &ChatSettings) -> anyhow::Result<()> {
    let pipeline = super::store_pipeline(&settings.store, RagConfig::default()).await?;
    let retriever = Retriever::new(Arc::new(pipeline));
    let model = GeminiChatModel::new(&settings.store.google_api_key, &settings.gemini_model)?;
    info!(model = %settings.gemini_model, k = retriever.k(), "starting chat");

    let answerer = RagAnswerer::new(retriever, Arc::new(model));
    let mut session = ChatSession::new(RustylineReader::new()?, answerer, io::stdout());
    session.run().await
}
