use dapple_core::{
    CommandType, Connection, ConnectionAdapter, DataAccessor, Executor, IsolationLevel,
    Transaction, params,
};

async fn count<C: Connection + Executor>(adapter: &mut ConnectionAdapter<C>) -> i64 {
    let rows: Vec<(i64,)> = adapter
        .query(
            "SELECT COUNT(*) FROM dapple_ledger",
            (),
            None,
            None,
            CommandType::Text,
        )
        .await
        .expect("Failed to count the ledger entries");
    rows[0].0
}

async fn insert<C: Connection + Executor>(
    adapter: &mut ConnectionAdapter<C>,
    transaction: &C::Transaction,
    entry: &str,
    amount: i64,
) {
    let affected = adapter
        .execute(
            "INSERT INTO dapple_ledger (entry, amount) VALUES (@Entry, @Amount)",
            params! { "Entry" => entry, "Amount" => amount },
            Some(transaction),
            None,
            CommandType::Text,
        )
        .await
        .expect("Failed to insert a ledger entry");
    assert_eq!(affected, 1);
}

pub async fn transaction1<C: Connection + Executor>(adapter: &mut ConnectionAdapter<C>) {
    adapter.open().expect("Failed to open the connection");

    // Setup
    adapter
        .execute(
            "DROP TABLE IF EXISTS dapple_ledger",
            (),
            None,
            None,
            CommandType::Text,
        )
        .await
        .expect("Failed to drop dapple_ledger table");
    adapter
        .execute(
            "CREATE TABLE dapple_ledger (entry TEXT NOT NULL, amount INTEGER NOT NULL)",
            (),
            None,
            None,
            CommandType::Text,
        )
        .await
        .expect("Failed to create dapple_ledger table");

    // Rollback
    let transaction = adapter
        .begin_transaction()
        .expect("Could not begin a transaction");
    assert!(transaction.is_active());
    insert(adapter, &transaction, "coffee", -3).await;
    assert_eq!(count(adapter).await, 1);
    transaction
        .rollback()
        .expect("Failed to rollback the transaction");
    assert_eq!(count(adapter).await, 0);

    // Commit
    let transaction = adapter
        .begin_transaction_with(IsolationLevel::Serializable)
        .expect("Could not begin a serializable transaction");
    assert_eq!(transaction.isolation_level(), IsolationLevel::Serializable);
    insert(adapter, &transaction, "salary", 2500).await;
    insert(adapter, &transaction, "rent", -900).await;
    transaction
        .commit()
        .expect("Failed to commit the transaction");
    assert_eq!(count(adapter).await, 2);

    #[cfg(not(feature = "disable-read-uncommitted"))]
    {
        let transaction = adapter
            .begin_transaction_with(IsolationLevel::ReadUncommitted)
            .expect("Could not begin a read uncommitted transaction");
        insert(adapter, &transaction, "bonus", 300).await;
        transaction
            .commit()
            .expect("Failed to commit the read uncommitted transaction");
        assert_eq!(count(adapter).await, 3);
    }

    // Dropping an unfinished transaction rolls it back
    let before = count(adapter).await;
    {
        let transaction = adapter
            .begin_transaction()
            .expect("Could not begin a transaction");
        insert(adapter, &transaction, "lost", 1).await;
    }
    assert_eq!(count(adapter).await, before);

    let totals: Vec<(i64,)> = adapter
        .query(
            "SELECT SUM(amount) FROM dapple_ledger WHERE amount < @Limit",
            params! { "Limit" => 0 },
            None,
            None,
            CommandType::Text,
        )
        .await
        .expect("Failed to sum the ledger entries");
    assert_eq!(totals, [(-900,)]);

    adapter.close().expect("Failed to close the connection");
}
