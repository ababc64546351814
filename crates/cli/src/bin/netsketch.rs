use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    netsketch_cli::main_entry().await
}
