#[tokio::main]
async fn main() -> anyhow::Result<()> {
    flashcards_backend::run().await
}
