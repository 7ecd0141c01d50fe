#[cfg(test)]
mod tests {
    use dapple::{
        CommandDefinition, CommandType, ConnectionAdapter, ConnectionState, DataCommands,
        OpenScope, ParameterList, RowLabeled, RowsAffected, Value, future::FutureExt, params,
    };
    use dapple_tests::{
        AccessorCall, Call, FakeAccessor, FakeConnection, init_logs, silent_logs,
    };
    use indoc::indoc;
    use std::sync::Arc;

    const SELECT: &str = "SELECT * FROM Table";
    const INSERT: &str = "INSERT INTO Table VALUES (@Value)";

    fn row() -> RowLabeled {
        RowLabeled::new(
            Arc::from(vec!["Value".to_string()]),
            vec![Value::from("Test")].into_boxed_slice(),
        )
    }

    #[tokio::test]
    async fn read() {
        init_logs();
        let accessor = FakeAccessor::new().with_rows([row()]);
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        let result: Vec<(String,)> = commands.read(SELECT, ()).await.expect("Could not read");
        assert_eq!(result, [("Test".to_string(),)]);
        assert_eq!(
            recorder.calls(),
            [
                Call::Open,
                Call::Query(AccessorCall {
                    sql: SELECT.into(),
                    parameters: ParameterList::new(),
                    transaction: false,
                    timeout: None,
                    command_type: CommandType::Text,
                }),
                Call::Close,
            ]
        );
    }

    #[tokio::test]
    async fn read_failure() {
        let accessor = FakeAccessor::new().failing_query("Database error");
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        let error = commands
            .read::<_, RowLabeled>(SELECT, ())
            .await
            .expect_err("Read must fail");
        assert_eq!(error.to_string(), "Database error");
        assert_eq!(recorder.times(&Call::Open), 1);
        assert_eq!(recorder.times(&Call::Close), 1);
    }

    #[tokio::test]
    async fn save() {
        init_logs();
        let accessor = FakeAccessor::new().with_affected(1);
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        let result = commands
            .save(INSERT, params! { "Value" => "Test" })
            .await
            .expect("Could not save");
        assert_eq!(result, 1);
        assert_eq!(
            recorder.calls(),
            [
                Call::Open,
                Call::Execute(AccessorCall {
                    sql: INSERT.into(),
                    parameters: params! { "Value" => "Test" },
                    transaction: false,
                    timeout: None,
                    command_type: CommandType::Text,
                }),
                Call::Close,
            ]
        );
    }

    #[tokio::test]
    async fn save_failure() {
        let accessor = FakeAccessor::new().failing_execute("Database error");
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        let error = commands
            .save(INSERT, params! { "Value" => "Test" })
            .await
            .expect_err("Save must fail");
        assert_eq!(error.to_string(), "Database error");
        assert_eq!(recorder.times(&Call::Open), 1);
        assert_eq!(recorder.times(&Call::Close), 1);
    }

    #[tokio::test]
    async fn open_failure() {
        let accessor = FakeAccessor::new().failing_open("Unreachable");
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        let error = commands
            .save(INSERT, params! { "Value" => "Test" })
            .await
            .expect_err("Save must fail when open fails");
        assert_eq!(error.to_string(), "Unreachable");
        assert_eq!(recorder.calls(), [Call::Open]);
    }

    #[tokio::test]
    async fn close_failure() {
        let accessor = FakeAccessor::new().with_rows([row()]).failing_close("Close failed");
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        let error = commands
            .read::<_, RowLabeled>(SELECT, ())
            .await
            .expect_err("Read must report the close error");
        assert_eq!(error.to_string(), "Close failed");
        assert_eq!(recorder.times(&Call::Close), 1);
    }

    #[tokio::test]
    async fn operation_error_wins() {
        let accessor = FakeAccessor::new()
            .failing_execute("Database error")
            .failing_close("Close failed");
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        silent_logs! {
            let error = commands
                .save(INSERT, ())
                .await
                .expect_err("Save must fail");
            assert_eq!(error.to_string(), "Database error");
        }
        assert_eq!(recorder.times(&Call::Close), 1);
    }

    #[tokio::test]
    async fn repeated_calls() {
        let accessor = FakeAccessor::new().with_rows([row()]).with_affected(1);
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        for _ in 0..3 {
            commands
                .read::<_, RowLabeled>(SELECT, ())
                .await
                .expect("Could not read");
            commands.save(INSERT, ()).await.expect("Could not save");
        }
        assert_eq!(recorder.times(&Call::Open), 6);
        assert_eq!(recorder.times(&Call::Close), 6);
    }

    #[test]
    fn dropped_scope() {
        let mut accessor = FakeAccessor::new();
        let recorder = accessor.recorder();
        silent_logs! {
            let scope = OpenScope::open(&mut accessor).expect("Could not open");
            drop(scope);
        }
        assert_eq!(recorder.calls(), [Call::Open, Call::Close]);

        let scope = OpenScope::open(&mut accessor).expect("Could not open");
        scope.close().expect("Could not close");
        assert_eq!(recorder.times(&Call::Close), 2);
    }

    #[test]
    fn cancelled_read_and_save() {
        let accessor = FakeAccessor::new().pending();
        let recorder = accessor.recorder();
        let mut commands = DataCommands::new(accessor);
        silent_logs! {
            let read = commands.read::<_, RowLabeled>(SELECT, ()).now_or_never();
            assert!(read.is_none(), "The read must still be pending");
        }
        assert_eq!(recorder.times(&Call::Open), 1);
        assert_eq!(recorder.times(&Call::Close), 1);
        silent_logs! {
            let save = commands.save(INSERT, ()).now_or_never();
            assert!(save.is_none(), "The save must still be pending");
        }
        assert_eq!(recorder.times(&Call::Open), 2);
        assert_eq!(recorder.times(&Call::Close), 2);
        assert_eq!(recorder.calls().last(), Some(&Call::Close));
    }

    #[tokio::test]
    async fn over_adapter() {
        init_logs();
        let connection = FakeConnection::new().respond_with([RowsAffected {
            rows_affected: 4,
            last_affected_id: None,
        }
        .into()]);
        let recorder = connection.recorder();
        let mut commands = DataCommands::new(ConnectionAdapter::new(connection));
        let sql = indoc! {"
            UPDATE Table
            SET Value = @Value
            WHERE Value IS NULL
        "};
        let affected = commands
            .save(sql, params! { "Value" => "Test" })
            .await
            .expect("Could not save");
        assert_eq!(affected, 4);
        assert_eq!(
            recorder.calls(),
            [
                Call::Open,
                Call::Run(
                    CommandDefinition::new(sql).with_parameters(params! { "Value" => "Test" })
                ),
                Call::Close,
            ]
        );
        assert_eq!(commands.accessor().state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn over_open_adapter() {
        let connection = FakeConnection::new()
            .with_state(ConnectionState::Open)
            .respond_with([row().into()]);
        let recorder = connection.recorder();
        let mut commands = DataCommands::new(ConnectionAdapter::new(connection));
        let values: Vec<Value> = commands.read(SELECT, ()).await.expect("Could not read");
        assert_eq!(values, [Value::from("Test")]);
        assert_eq!(recorder.times(&Call::Open), 0);
        assert_eq!(recorder.times(&Call::Close), 1);
    }
}
