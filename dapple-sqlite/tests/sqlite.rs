#[cfg(test)]
mod tests {
    use dapple_sqlite::SqliteConnection;
    use dapple_tests::{execute_tests, init_logs};
    use std::path::Path;
    use std::sync::Mutex;
    use tokio::fs;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn sqlite() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/tests.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH).await.expect(
                format!("Failed to remove existing test database file {}", DB_PATH).as_str(),
            );
        }
        let connection = SqliteConnection::new(format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Could not parse the connection string");
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before the connection is opened"
        );
        execute_tests(connection).await;
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after the connection was opened"
        );
    }
}
