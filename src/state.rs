use crate::auth::{AccountService, TokenIssuer, TokenVerifier};
use crate::config::Config;
use crate::store::Stores;
use crate::tasks::TaskService;

/// Shared, immutable application state, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub tasks: TaskService,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(config: &Config, stores: Stores) -> Self {
        Self {
            accounts: AccountService::new(
                stores.users.clone(),
                TokenIssuer::new(&config.jwt_secret),
                config.bcrypt_cost,
            ),
            tasks: TaskService::new(stores.tasks),
            verifier: TokenVerifier::new(&config.jwt_secret, stores.users),
        }
    }
}
