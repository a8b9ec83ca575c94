use app::App;
use bank_server::app;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    App::new().run().await
}
