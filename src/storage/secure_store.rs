use anyhow::Result;
use keyring::Entry;

const SERVICE_NAME: &str = "com.imgbb.uploader";
const API_KEY_ACCOUNT: &str = "api_key";

pub fn store_api_key(key: &str) -> Result<()> {
    let entry = Entry::new(SERVICE_NAME, API_KEY_ACCOUNT)?;

    // Overwrites any key stored earlier
    entry.set_password(key)?;
    log::info!("Stored imgbb API key in the system keyring");

    Ok(())
}

pub fn get_api_key() -> Result<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, API_KEY_ACCOUNT)?;
    match entry.get_password() {
        Ok(key) if !key.is_empty() => Ok(Some(key)),
        Ok(_) => Ok(None),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => {
            log::error!("Failed to retrieve API key: {}", e);
            Err(e.into())
        }
    }
}

pub fn delete_api_key() -> Result<()> {
    let entry = Entry::new(SERVICE_NAME, API_KEY_ACCOUNT)?;
    match entry.delete_password() {
        Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => {
            log::error!("Failed to delete API key: {}", e);
            Err(e.into())
        }
    }
}
