use dashboard_service::utils::Config;
use dashboard_service::Application;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::default().expect("Failed to load config");
    log::info!(
        "accepting session handoffs from {} against API {}",
        config.web_app_url(),
        config.api_base_url()
    );

    let app = Application::build(config.listen_addr())
        .await
        .expect("Failed to build app");

    app.run().await.expect("Failed to run app");
}
