use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "DocVault";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
/// ~/DocVault/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("DocVault")
}

/// Get the vault root (encrypted document + thumbnail objects live below it)
pub fn vault_dir() -> PathBuf {
    app_data_dir().join("vault")
}

/// Get the scratch directory for intermediate files (converted containers,
/// decrypted temporaries). Contents are disposable.
pub fn scratch_dir() -> PathBuf {
    app_data_dir().join("scratch")
}

/// Get the metadata database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("docvault.db")
}
