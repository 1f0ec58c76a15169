#[tokio::main]
async fn main() {
    feedback_server::start_server().await;
}
