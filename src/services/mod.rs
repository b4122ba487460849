//! Business logic services

pub mod auth;
pub mod catalog;
pub mod reservations;
pub mod schedules;

use sqlx::{Pool, Postgres};

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub reservations: reservations::ReservationsService,
    pub schedules: schedules::SchedulesService,
    pool: Pool<Postgres>,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(repository.clone()),
            pool: repository.pool.clone(),
            schedules: schedules::SchedulesService::new(repository),
        }
    }

    /// Raw pool handle, used by the readiness probe
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}
