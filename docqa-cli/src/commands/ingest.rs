use docqa_rag::{
    FixedDelay, IngestOptions, IngestReport, PdfLoader, RagConfig, RecursiveCharacterSplitter,
    ingest,
};
use tracing::info;

use crate::settings::IngestSettings;

/// Run the `docqa-ingest` job: PDF pages to chunks to stored embeddings.
pub async fn run_ingest(settings: &IngestSettings) -> anyhow::Result<IngestReport> {
    info!("Ingesting PDF from {}", settings.pdf_path.display());

    let config = RagConfig::default();
    let splitter = RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap);
    let pipeline = super::store_pipeline(settings, config).await?;
    let loader = PdfLoader::new(&settings.pdf_path);
    let options = IngestOptions::default();
    let limiter = FixedDelay::new(options.delay);

    let report = ingest(&loader, &splitter, &pipeline, &options, &limiter).await?;
    info!(pages = report.pages, chunks = report.chunks, batches = report.batches, "ingestion finished");
    Ok(report)
}
