use tracker_client::{Storage, StorageError};

/// `window.localStorage`. Окно ищется на каждый вызов, поэтому значение
/// ничего не держит и его можно передавать куда угодно.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LocalStorage;

fn local_storage() -> Result<web_sys::Storage, StorageError> {
    let window =
        web_sys::window().ok_or_else(|| StorageError::Unavailable("window is not available".into()))?;
    window
        .local_storage()
        .map_err(|_| StorageError::Unavailable("failed to access localStorage".into()))?
        .ok_or_else(|| StorageError::Unavailable("localStorage is not available".into()))
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable(format!("failed to read {key}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Unavailable(format!("failed to save {key}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?
            .remove_item(key)
            .map_err(|_| StorageError::Unavailable(format!("failed to clear {key}")))
    }
}
