use chrono::Local;
use clap::Parser;
use thing_core::{HttpThingClient, Thing, ThingApi};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Create a random Thing on a running server and read it back.
#[derive(Debug, Parser)]
#[command(name = "thing-demo", version)]
struct Args {
    #[arg(long, env = "THING_SERVER_URL", default_value = "http://localhost:8080")]
    server_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let client = HttpThingClient::new(&args.server_url);

    let thing = Thing::new(
        Uuid::new_v4().to_string(),
        rand::random::<f64>(),
        Local::now().date_naive(),
    );

    match client.create(&thing).await? {
        Some(id) => {
            let stored = client.get(id).await?;
            println!("Created {stored:?} with {id:?}");
        }
        None => tracing::warn!(server = %client.base_url(), "server did not create the thing"),
    }
    Ok(())
}
