use std::sync::Arc;

use dotenvy::dotenv;
use migration::MigratorTrait;
use tracing::{error, info, warn};

use service::account::UserService;
use service::auth::AuthError;
use service::catalog::{ArtifactService, WizardService};
use service::crypto::Argon2Hasher;
use service::errors::ServiceError;
use service::idgen::SnowflakeIdWorker;
use service::repo::{SeaOrmCatalogRepository, SeaOrmUserRepository};

fn load_config() -> anyhow::Result<configs::AppConfig> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            // no config.toml: fall back to defaults plus DATABASE_URL
            eprintln!("config file not usable ({e}), falling back to environment");
            configs::AppConfig::from_env()
        }
    }
}

/// Numeric code of a service-layer failure, if that is what stopped us.
fn error_code(err: &anyhow::Error) -> Option<u16> {
    if let Some(e) = err.downcast_ref::<ServiceError>() {
        return Some(e.code());
    }
    err.downcast_ref::<AuthError>().map(AuthError::code)
}

async fn run(cfg: configs::AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrated", "schema up to date");

    let catalog = Arc::new(SeaOrmCatalogRepository::new(db.clone()));
    let users_repo = Arc::new(SeaOrmUserRepository::new(db));
    let hasher = Arc::new(Argon2Hasher::from_config(&cfg.security)?);
    let ids = Arc::new(SnowflakeIdWorker::from_config(&cfg.idgen)?);

    let wizards = WizardService::new(catalog.clone(), catalog.clone());
    let artifacts = ArtifactService::new(catalog, ids);
    let users = UserService::new(users_repo, hasher);

    if cfg.seed.enabled {
        match service::seed::seed_demo_data(&wizards, &artifacts, &users).await? {
            Some(report) => info!(event = "seeded", ?report, "demo data inserted"),
            None => info!(event = "seed_skipped", "catalog already populated"),
        }
    }

    info!(
        event = "catalog_ready",
        wizards = wizards.find_all().await?.len(),
        artifacts = artifacts.find_all().await?.len(),
        users = users.find_all().await?.len(),
        "catalog ready"
    );
    Ok(())
}

fn main() -> std::process::ExitCode {
    dotenv().ok();

    let cfg = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(cfg.logging.json);

    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "hogwarts", event = "panic", pid, message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "hogwarts", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(service = "hogwarts", event = "start", pid, version, sqlite = cfg.database.is_sqlite(), "starting");
    if cfg.seed.enabled && !cfg.database.is_sqlite() {
        warn!(service = "hogwarts", "demo seeding enabled against a non-sqlite database");
    }

    match rt.block_on(run(cfg)) {
        Ok(()) => {
            info!(service = "hogwarts", event = "stop", pid, "finished");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "hogwarts", event = "run_failed", code = ?error_code(&e), error = %e, "startup failed");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_reads_service_failures() {
        let err = anyhow::Error::from(ServiceError::Conflict("username john already taken".into()));
        assert_eq!(error_code(&err), Some(2003));

        let err = anyhow::Error::from(AuthError::BadCredentials);
        assert_eq!(error_code(&err), Some(1004));

        assert_eq!(error_code(&anyhow::anyhow!("connection refused")), None);
    }
}
