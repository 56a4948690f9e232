#![allow(dead_code)]

use chirpy::configuration::{
    ApplicationSettings, JwtSettings, PolkaSettings, Settings, StoreSettings,
};
use chirpy::startup::run;
use chirpy::store::Store;
use std::net::TcpListener;
use tempfile::TempDir;

pub const POLKA_KEY: &str = "test-polka-key";

pub struct TestApp {
    pub address: String,
    pub store_path: std::path::PathBuf,
    // Dropping removes the store file
    _dir: TempDir,
}

fn test_settings(store_path: &str) -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: "./public".to_string(),
        },
        store: StoreSettings {
            path: store_path.to_string(),
            reset_on_startup: true,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 60 * 24 * 60 * 60,
            issuer: "chirpy".to_string(),
        },
        polka: PolkaSettings {
            api_key: POLKA_KEY.to_string(),
        },
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store_path = dir.path().join("database.json");
    let settings = test_settings(store_path.to_str().unwrap());

    let store = Store::open(&store_path, true).expect("Failed to open store");
    let server = run(listener, store, settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store_path,
        _dir: dir,
    }
}
