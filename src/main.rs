#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    sticker_gateway::run().await
}
