#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = manabi_rust::run().await {
        eprintln!("manabi-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
