use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use log::info;
use std::error::Error;
use tokio_postgres_rustls::MakeRustlsConnect;

pub fn tls_connector() -> MakeRustlsConnect {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    MakeRustlsConnect::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    )
}

/// builds a connection pool and checks that a connection can be acquired
pub async fn create_pool(database_url: &str) -> Result<Pool, Box<dyn Error + Send + Sync>> {
    let mut config = Config::new();
    config.url = Some(database_url.to_string());
    config.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let pool = config.create_pool(Some(Runtime::Tokio1), tls_connector())?;
    let _client = pool.get().await?;
    info!("Database connection pool ready");
    Ok(pool)
}
