mod analysis;
mod app;
mod cli;
mod logging;
mod lsp;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Cli::from_args().into_config();
    logging::init(&config)?;

    app::run(config).await
}
