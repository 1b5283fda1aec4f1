use docuflow::api;
use docuflow::logger::*;
use docuflow::server::*;
use docuflow::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::bootstrap();

    let settings = parse_settings(cli.settings.as_deref())?;
    let filter = cli.log_filter.as_deref().unwrap_or(&settings.log.filter);
    logger.reload(filter)?;

    let address: std::net::SocketAddr = settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&settings).await?);

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server.clone()))
        .recover(api::v1::recover_error);

    info!(%address, "listening");

    match &settings.http.tls {
        Some(tls) => {
            if !fs::metadata(&tls.cert_path)?.is_file() {
                return Err(anyhow::anyhow!(
                    "TLS cert is not a regular file: {:?}",
                    tls.cert_path
                ));
            }
            if !fs::metadata(&tls.key_path)?.is_file() {
                return Err(anyhow::anyhow!(
                    "TLS key is not a regular file: {:?}",
                    tls.key_path
                ));
            }

            warp::serve(api_v1)
                .tls()
                .cert_path(&tls.cert_path)
                .key_path(&tls.key_path)
                .bind_with_graceful_shutdown(address, async {
                    signal::ctrl_c().await.expect("Could not register SIGINT");
                })
                .1
                .await;
        }
        None => {
            warp::serve(api_v1)
                .bind_with_graceful_shutdown(address, async {
                    signal::ctrl_c().await.expect("Could not register SIGINT");
                })
                .1
                .await;
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => tracing::info!("server shutdown successfully"),
        Err(_) => tracing::error!("server shutdown timed out"),
    }

    Ok(())
}
