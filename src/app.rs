use anyhow::Context;
use tracing::info;

use crate::cli::Config;
use crate::lsp::stdio_transport::StdioTransport;
use crate::lsp::LspServer;

pub async fn run(config: Config) -> anyhow::Result<()> {
    info!(log_file = %config.log_file.display(), "starting mini-lsp");

    let mut server = LspServer::new(StdioTransport::stdio());
    server.run().await.context("protocol loop failed")?;

    info!(
        documents = server.dispatcher().documents().len(),
        "mini-lsp stopped"
    );
    Ok(())
}
