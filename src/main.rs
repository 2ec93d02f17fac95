#[tokio::main]
async fn main() {
    if let Err(e) = careportal_lib::run().await {
        eprintln!("careportal: {e}");
        std::process::exit(1);
    }
}
