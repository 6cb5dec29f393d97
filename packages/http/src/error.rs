use bundlefs_registry::Error as RegistryError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("response assembly error: {0}")]
    Http(#[from] http::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
