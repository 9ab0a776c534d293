use anyhow::Result;

mod app;
mod features;
mod logging;
mod shared;


#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = shared::Config::load();
    let mut app = app::App::new(config)?;

    app.run().await?;

    Ok(())
}
