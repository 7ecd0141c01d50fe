#[cfg(test)]
mod tests {
    use dapple::{
        ArgumentNullError, CommandDefinition, CommandType, Connection, ConnectionAdapter,
        ConnectionOptions, ConnectionState, DataAccessor, IsolationLevel, RowLabeled,
        RowsAffected, Transaction, Value, params,
    };
    use dapple_tests::{Call, FakeConnection, FakeTransaction, Recorder, init_logs, silent_logs};
    use std::{sync::Arc, time::Duration};

    fn adapter(connection: FakeConnection) -> (ConnectionAdapter<FakeConnection>, Recorder) {
        let recorder = connection.recorder();
        (ConnectionAdapter::new(connection), recorder)
    }

    #[test]
    fn null_connection() {
        let error = ConnectionAdapter::<FakeConnection>::try_new(None)
            .expect_err("Creating an adapter without a connection must fail");
        let error = error
            .downcast_ref::<ArgumentNullError>()
            .expect("Expected an ArgumentNullError");
        assert_eq!(error.parameter, "connection");
        assert!(ConnectionAdapter::try_from(None::<FakeConnection>).is_err());
        assert!(ConnectionAdapter::try_new(Some(FakeConnection::new())).is_ok());
    }

    #[test]
    fn underlying_connection() {
        let (mut adapter, _) = adapter(FakeConnection::new().with_database("TestDatabase"));
        assert_eq!(adapter.underlying_connection().database(), "TestDatabase");
        adapter
            .underlying_connection_mut()
            .set_state(ConnectionState::Open);
        assert_eq!(adapter.state(), ConnectionState::Open);
        let connection = adapter.into_inner();
        assert_eq!(connection.state(), ConnectionState::Open);
    }

    #[test]
    fn connection_string() {
        let (mut adapter, recorder) = adapter(
            FakeConnection::new().with_connection_string("InitialConnectionString"),
        );
        assert_eq!(adapter.connection_string(), "InitialConnectionString");
        adapter.set_connection_string("NewConnectionString".into());
        assert_eq!(adapter.connection_string(), "NewConnectionString");
        assert_eq!(
            recorder.times(&Call::SetConnectionString("NewConnectionString".into())),
            1
        );
    }

    #[test]
    fn properties() {
        let (adapter, recorder) = adapter(
            FakeConnection::new()
                .with_timeout(Duration::from_secs(30))
                .with_database("TestDatabase")
                .with_state(ConnectionState::Open),
        );
        assert_eq!(adapter.connection_timeout(), Duration::from_secs(30));
        assert_eq!(adapter.database(), "TestDatabase");
        assert_eq!(adapter.state(), ConnectionState::Open);
        assert!(recorder.calls().is_empty(), "Getters must not record calls");
    }

    #[test]
    fn begin_transaction() {
        let (mut adapter, recorder) = adapter(FakeConnection::new());
        let transaction = adapter
            .begin_transaction()
            .expect("Could not begin a transaction");
        assert_eq!(transaction.isolation_level(), IsolationLevel::Unspecified);
        assert_eq!(recorder.times(&Call::BeginTransaction(None)), 1);

        let transaction = adapter
            .begin_transaction_with(IsolationLevel::ReadCommitted)
            .expect("Could not begin a transaction");
        assert_eq!(transaction.isolation_level(), IsolationLevel::ReadCommitted);
        assert_eq!(
            recorder.times(&Call::BeginTransaction(Some(IsolationLevel::ReadCommitted))),
            1
        );
        assert_eq!(recorder.times(&Call::BeginTransaction(None)), 1);
        transaction.commit().expect("Could not commit");
        assert_eq!(recorder.times(&Call::Commit), 1);
    }

    #[test]
    fn close() {
        let (mut adapter, recorder) =
            adapter(FakeConnection::new().with_state(ConnectionState::Open));
        adapter.close().expect("Could not close");
        assert_eq!(recorder.times(&Call::Close), 1);
        assert_eq!(adapter.state(), ConnectionState::Closed);
    }

    #[test]
    fn change_database() {
        let (mut adapter, recorder) = adapter(FakeConnection::new());
        adapter
            .change_database("NewDatabase")
            .expect("Could not change the database");
        assert_eq!(recorder.times(&Call::ChangeDatabase("NewDatabase".into())), 1);
        assert_eq!(adapter.database(), "NewDatabase");
    }

    #[test]
    fn create_command() {
        let (mut adapter, recorder) = adapter(FakeConnection::new());
        let command = adapter.create_command();
        assert_eq!(recorder.times(&Call::CreateCommand), 1);
        assert_eq!(command.timeout, Some(ConnectionOptions::DEFAULT_TIMEOUT));
    }

    #[test]
    fn open_when_closed() {
        init_logs();
        let (mut adapter, recorder) =
            adapter(FakeConnection::new().with_state(ConnectionState::Closed));
        adapter.open().expect("Could not open");
        assert_eq!(recorder.times(&Call::Open), 1);
        assert_eq!(adapter.state(), ConnectionState::Open);
    }

    #[test]
    fn open_when_open() {
        init_logs();
        let (mut adapter, recorder) =
            adapter(FakeConnection::new().with_state(ConnectionState::Open));
        adapter.open().expect("Could not open");
        assert_eq!(recorder.times(&Call::Open), 0);
        // Also through the trait
        Connection::open(&mut adapter).expect("Could not open");
        DataAccessor::open(&mut adapter).expect("Could not open");
        assert_eq!(recorder.times(&Call::Open), 0);
    }

    #[test]
    fn open_when_not_open() {
        init_logs();
        for state in [
            ConnectionState::Connecting,
            ConnectionState::Executing,
            ConnectionState::Broken,
        ] {
            let (mut adapter, recorder) = adapter(FakeConnection::new().with_state(state));
            adapter.open().expect("Could not open");
            assert_eq!(recorder.times(&Call::Open), 1, "State {state}");
        }
    }

    #[test]
    fn open_twice() {
        init_logs();
        let (mut adapter, recorder) = adapter(FakeConnection::new());
        adapter.open().expect("Could not open");
        adapter.open().expect("Could not open");
        assert_eq!(recorder.times(&Call::Open), 1);
    }

    #[test]
    fn open_failure() {
        let (mut adapter, recorder) = adapter(FakeConnection::new().failing_open("Unreachable"));
        let error = adapter.open().expect_err("Open must fail");
        assert_eq!(error.to_string(), "Unreachable");
        assert_eq!(recorder.times(&Call::Open), 1);
        assert_eq!(adapter.state(), ConnectionState::Closed);
    }

    #[test]
    fn dispose_when_open() {
        init_logs();
        let (mut adapter, recorder) =
            adapter(FakeConnection::new().with_state(ConnectionState::Open));
        adapter.dispose().expect("Could not dispose");
        assert_eq!(recorder.calls(), [Call::Close, Call::Dispose]);
    }

    #[test]
    fn dispose_when_closed() {
        init_logs();
        let (mut adapter, recorder) =
            adapter(FakeConnection::new().with_state(ConnectionState::Closed));
        adapter.dispose().expect("Could not dispose");
        assert_eq!(recorder.times(&Call::Close), 0);
        assert_eq!(recorder.times(&Call::Dispose), 1);
    }

    #[test]
    fn dispose_close_failure() {
        let (mut adapter, recorder) = adapter(
            FakeConnection::new()
                .with_state(ConnectionState::Open)
                .failing_close("Close failed"),
        );
        silent_logs! {
            let error = adapter.dispose().expect_err("Dispose must report the close error");
            assert_eq!(error.to_string(), "Close failed");
        }
        assert_eq!(recorder.calls(), [Call::Close, Call::Dispose]);
    }

    #[test]
    fn dispose_failure() {
        let (mut adapter, recorder) = adapter(FakeConnection::new().failing_dispose("Leaked"));
        let error = adapter.dispose().expect_err("Dispose must fail");
        assert_eq!(error.to_string(), "Leaked");
        assert_eq!(recorder.times(&Call::Dispose), 1);
    }

    #[test]
    fn borrowed_connection() {
        let mut connection = FakeConnection::new();
        let recorder = connection.recorder();
        {
            let mut adapter = ConnectionAdapter::new(&mut connection);
            adapter.open().expect("Could not open");
            adapter.open().expect("Could not open");
        }
        assert_eq!(connection.state(), ConnectionState::Open);
        assert_eq!(recorder.times(&Call::Open), 1);
    }

    fn users() -> RowLabeled {
        RowLabeled::new(
            Arc::from(vec!["Id".to_string(), "Name".to_string()]),
            vec![Value::from(1), Value::from("Ada")].into_boxed_slice(),
        )
    }

    #[tokio::test]
    async fn query() {
        init_logs();
        let (mut adapter, recorder) = adapter(FakeConnection::new().respond_with([users().into()]));
        let rows: Vec<(i32, String)> = adapter
            .query(
                "SELECT Id, Name FROM Users WHERE Id = @Id",
                params! { "Id" => 1 },
                None,
                Some(Duration::from_secs(5)),
                CommandType::Text,
            )
            .await
            .expect("Could not query");
        assert_eq!(rows, [(1, "Ada".to_string())]);
        assert_eq!(
            recorder.calls(),
            [Call::Run(
                CommandDefinition::new("SELECT Id, Name FROM Users WHERE Id = @Id")
                    .with_parameters(params! { "Id" => 1 })
                    .with_timeout(Some(Duration::from_secs(5)))
            )]
        );
    }

    #[tokio::test]
    async fn query_failure() {
        let (mut adapter, _) = adapter(FakeConnection::new().respond_with_error("Database error"));
        let result = adapter
            .query::<RowLabeled, _>("SELECT * FROM Users", (), None, None, CommandType::Text)
            .await;
        assert_eq!(
            result.expect_err("Query must fail").to_string(),
            "Database error"
        );
    }

    #[tokio::test]
    async fn execute() {
        init_logs();
        let (mut adapter, recorder) = adapter(FakeConnection::new().respond_with([
            RowsAffected {
                rows_affected: 2,
                last_affected_id: None,
            }
            .into(),
            RowsAffected {
                rows_affected: 1,
                last_affected_id: Some(9),
            }
            .into(),
        ]));
        let transaction = FakeTransaction::new(IsolationLevel::Unspecified, recorder.clone());
        let affected = adapter
            .execute(
                "DELETE FROM Users WHERE Id = @Id",
                params! { "Id" => 1 },
                Some(&transaction),
                None,
                CommandType::StoredProcedure,
            )
            .await
            .expect("Could not execute");
        assert_eq!(affected, 3);
        assert_eq!(
            recorder.calls(),
            [Call::Run(
                CommandDefinition::new("DELETE FROM Users WHERE Id = @Id")
                    .with_parameters(params! { "Id" => 1 })
                    .with_command_type(CommandType::StoredProcedure)
            )]
        );
    }

    #[tokio::test]
    async fn completed_transaction() {
        let (mut adapter, recorder) = adapter(FakeConnection::new());
        let transaction = FakeTransaction::completed(recorder.clone());
        let result = adapter
            .execute("DELETE FROM Users", (), Some(&transaction), None, CommandType::Text)
            .await;
        assert!(result.is_err());
        let result = adapter
            .query::<RowLabeled, _>("SELECT * FROM Users", (), Some(&transaction), None, CommandType::Text)
            .await;
        assert!(result.is_err());
        assert!(recorder.calls().is_empty(), "Nothing must reach the connection");
    }

    #[tokio::test]
    async fn foreign_transaction() {
        let (mut adapter, recorder) = adapter(FakeConnection::new());
        let mut other = FakeConnection::new();
        let transaction = other
            .begin_transaction()
            .expect("Could not begin a transaction");
        assert!(transaction.is_active());
        assert!(!adapter.owns_transaction(&transaction));
        let error = adapter
            .execute("DELETE FROM Users", (), Some(&transaction), None, CommandType::Text)
            .await
            .expect_err("A transaction of another connection must be rejected");
        assert!(error.to_string().contains("different connection"));
        let result = adapter
            .query::<RowLabeled, _>("SELECT * FROM Users", (), Some(&transaction), None, CommandType::Text)
            .await;
        assert!(result.is_err());
        assert!(recorder.calls().is_empty(), "Nothing must reach the connection");

        let own = adapter
            .begin_transaction()
            .expect("Could not begin a transaction");
        assert!(adapter.owns_transaction(&own));
        adapter
            .execute("DELETE FROM Users", (), Some(&own), None, CommandType::Text)
            .await
            .expect("Could not execute in the own transaction");
    }
}
