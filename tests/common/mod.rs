#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Path to a `.db` file inside `dir`.
pub fn db_path(dir: &Path, name: &str) -> String {
    dir.join(format!("{name}.db")).to_string_lossy().into_owned()
}

pub fn sql_fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("sql")
        .join(name)
}
