use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub token_service: Arc<dyn TokenService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    /// Wire pre-built services with no external connections behind them.
    /// `try_new` is the settings-driven path; this one serves tests.
    pub fn from_services(
        auth_service: Arc<dyn AuthService>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Server {
            auth_service,
            token_service,
            pool: None,
        }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.auth.secret.is_empty() {
            // A process-random key would silently log every user out on
            // restart; refuse to start instead.
            return Err(anyhow::anyhow!("auth.secret must be configured"));
        }

        let op_timeout = Duration::from_millis(settings.store.timeout_ms);
        let (revocation_store, otp_store): (Arc<dyn RevocationStore>, Arc<dyn OtpStore>) =
            match settings.store.backend.as_str() {
                "memory" => (
                    Arc::new(MemoryRevocationStore::new()),
                    Arc::new(MemoryOtpStore::new()),
                ),
                "redis" => {
                    let url = settings
                        .store
                        .redis_url
                        .as_deref()
                        .ok_or_else(|| anyhow::anyhow!("store.redis_url is required"))?;
                    let client = redis::Client::open(url)?;
                    let manager = client.get_connection_manager().await?;
                    (
                        Arc::new(RedisRevocationStore::new(manager.clone(), op_timeout)),
                        Arc::new(RedisOtpStore::new(manager, op_timeout)),
                    )
                }
                other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
            };

        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let mut pool = None;
        let directory: Arc<dyn UserDirectory> = match settings.directory.backend.as_str() {
            "memory" => Arc::new(MemoryUserDirectory::new(hasher)),
            "mysql" => {
                let url = settings
                    .directory
                    .mysql_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("directory.mysql_url is required"))?;
                let p = Pool::<MySql>::connect(url).await?;
                pool = Some(p.clone());
                Arc::new(MySqlUserDirectory::new(p, hasher))
            }
            other => return Err(anyhow::anyhow!("Unknown directory backend: {}", other)),
        };

        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
            TokenConfig {
                access_ttl: Duration::from_secs(settings.auth.access_ttl_secs),
                refresh_ttl: Duration::from_secs(settings.auth.refresh_ttl_secs),
                signing_key: settings.auth.secret.clone().into_bytes(),
            },
            revocation_store,
            directory.clone(),
        ));

        let otp_service: Arc<dyn OtpService> = Arc::new(RealOtpService::new(
            otp_store,
            OtpConfig {
                code_length: settings.otp.code_length,
                code_ttl: Duration::from_secs(settings.otp.code_ttl_secs),
                reset_token_ttl: Duration::from_secs(settings.otp.reset_token_ttl_secs),
            },
        ));

        let mailer: Arc<dyn OtpMailer> = match settings.mail.backend.as_str() {
            "log" => Arc::new(LogMailer::new()),
            other => return Err(anyhow::anyhow!("Unknown mail backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            directory,
            token_service.clone(),
            otp_service,
            mailer,
        ));

        info!(
            store = %settings.store.backend,
            directory = %settings.directory.backend,
            "server started"
        );

        Ok(Server {
            auth_service,
            token_service,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
