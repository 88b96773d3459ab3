#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use capacity_planner::{Plan, http_api, load_plan_from_json};

    tracing_subscriber::fmt::init();

    let addr: SocketAddr = std::env::var("CAPACITY_PLANNER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let plan = match std::env::var("CAPACITY_PLANNER_PLAN") {
        Ok(path) => load_plan_from_json(path)?,
        Err(_) => Plan::demo()?,
    };

    http_api::serve(addr, plan).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
