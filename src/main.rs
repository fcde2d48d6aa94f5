mod handlers;
mod models;
mod routes;
mod utils;

use axum::serve;
use routes::make_app;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let app = match make_app().await {
        Ok(app) => app,
        Err(err) => panic!("{}", err),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await;
    println!("Listening on http://0.0.0.0:{port}");

    match listener {
        Ok(res) => serve(res, app).await.unwrap(),
        Err(err) => panic!("{}", err),
    }
}
