use lonai_core::llm::{Provider, LLM};
use lonai_core::search::TavilyClient;
use lonai_core::{Config, FileStore, Orchestrator, ReportExporter, SearchAgent};
use tracing::debug;

/// The orchestrator wired to the real search and LLM backends.
pub type Researcher = Orchestrator<SearchAgent<TavilyClient, Box<dyn LLM>>>;

/// Builds every component from the loaded configuration.
///
/// No network calls happen here.
pub fn build(config: &Config) -> Researcher {
    let provider = Provider::from_config(config);
    debug!(provider = %provider.kind(), model = %provider.settings().model, "building research agent");

    let llm = provider.build();
    let search = TavilyClient::new(&config.search, config.timeout);

    Orchestrator::new(
        config,
        SearchAgent::new(search, llm),
        Box::new(FileStore::new(config.storage.clone())),
        ReportExporter::new(&config.export),
    )
}
