#[tokio::main]
async fn main() {
    venue_booking::run().await;
}
