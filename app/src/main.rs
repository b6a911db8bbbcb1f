#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hello_vault::run().await
}
