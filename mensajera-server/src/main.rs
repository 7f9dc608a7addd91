use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mensajera_core::crypto::Encryptor;
use mensajera_core::Database;

mod context;
mod routes;

use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "mensajera")]
#[command(author, version, about = "Mensajera - SMS/WhatsApp outbound dispatch engine")]
struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, default_value = "0.0.0.0:8084")]
    bind_addr: String,

    /// Postgres connection URL.
    #[arg(long, default_value = "postgres://mensajera@localhost:5432/mensajera")]
    db_url: String,

    /// 32-byte key used to encrypt provider tokens at rest. Falls back to
    /// the MENSAJERA_ENCRYPTION_KEY environment variable.
    #[arg(long)]
    encryption_key: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("mensajera=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let key = args
        .encryption_key
        .or_else(|| std::env::var("MENSAJERA_ENCRYPTION_KEY").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("no encryption key: pass --encryption-key or set MENSAJERA_ENCRYPTION_KEY")
        })?;
    let encryptor = Encryptor::new(key.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid encryption key: {e}"))?;

    let db = Database::new(&args.db_url).await?;
    db.migrate().await?;

    let ctx = Arc::new(ServerContext::new(&db, encryptor));
    let app = routes::router(ctx);

    let addr: SocketAddr = args.bind_addr.parse()?;
    info!("mensajera listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
