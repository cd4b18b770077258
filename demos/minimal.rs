//! Minimal end-to-end use of the adapter against a running PocketBase.
//!
//! ```bash
//! PB_URL=http://127.0.0.1:8090 PB_ADMIN_EMAIL=root@example.com PB_ADMIN_PASSWORD=secret \
//!     cargo run --example minimal
//! ```

use pbauth_adapter::{
    AdapterConfig, Condition, ConnectionParams, FilterOperator, PocketBaseAdapter, PocketBaseClient, Record, SortBy,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pbauth_adapter=debug")),
        )
        .compact()
        .init();

    let url = std::env::var("PB_URL").unwrap_or_else(|_| "http://127.0.0.1:8090".to_string());
    let mut params = ConnectionParams::new(url);
    if let (Ok(email), Ok(password)) = (std::env::var("PB_ADMIN_EMAIL"), std::env::var("PB_ADMIN_PASSWORD")) {
        params = params.with_admin_credentials(email, password);
    }

    let adapter =
        PocketBaseAdapter::<PocketBaseClient>::new(AdapterConfig::from_params(params).with_debug_logs(true))?;

    let data: Record =
        serde_json::from_value(json!({"email": "demo@example.com", "name": "Demo User", "emailVerified": false}))?;
    let created = adapter.create("user", data).await?;
    println!("created: {created:?}");

    let matching = adapter
        .find_many(
            "user",
            &[Condition::new("email", FilterOperator::EndsWith, "@example.com")],
            Some(10),
            None,
            Some(&SortBy::desc("created")),
        )
        .await;
    println!("found {} users", matching.len());

    let total = adapter.count("user", &[]).await;
    println!("total users: {total}");

    let removed = adapter
        .delete_many("user", &[Condition::eq("email", "demo@example.com")])
        .await;
    println!("removed {removed} demo users");

    Ok(())
}
