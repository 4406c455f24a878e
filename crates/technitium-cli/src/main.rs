//! Binary entrypoint for the technitium CLI.

#[tokio::main]
async fn main() {
    let code = technitium_cli::run().await;
    std::process::exit(code);
}
