#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agri_anchor::server::run().await
}
