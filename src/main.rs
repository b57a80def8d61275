#[tokio::main]
async fn main() {
    if let Err(e) = journee_proches::run().await {
        eprintln!("journee-proches: {}", e);
        std::process::exit(1);
    }
}
