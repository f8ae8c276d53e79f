use anyhow::Result;
use board::{logging, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env()?;
    log::debug!("{config:?}");

    App::new(config)?.run().await
}
