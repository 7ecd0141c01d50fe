use dapple_core::{
    Connection, ConnectionAdapter, ConnectionState, DataCommands, Executor, FromRow, Result,
    RowLabeled, params,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::{Date, Month};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
struct Book {
    id: i64,
    title: String,
    price: Decimal,
    published: Date,
    code: Option<Uuid>,
}

impl FromRow for Book {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            price: row.get("price")?,
            published: row.get("published")?,
            code: row.get("code")?,
        })
    }
}

pub async fn read_save<C: Connection + Executor>(adapter: &mut ConnectionAdapter<C>) {
    let mut commands = DataCommands::new(&mut *adapter);

    // Setup
    commands
        .save("DROP TABLE IF EXISTS dapple_books", ())
        .await
        .expect("Failed to drop dapple_books table");
    commands
        .save(
            "CREATE TABLE dapple_books (id INTEGER PRIMARY KEY, title TEXT NOT NULL, price TEXT NOT NULL, published TEXT NOT NULL, code TEXT)",
            (),
        )
        .await
        .expect("Failed to create dapple_books table");

    let books = [
        Book {
            id: 1,
            title: "The Rust Programming Language".into(),
            price: Decimal::from_str("39.95").unwrap(),
            published: Date::from_calendar_date(2018, Month::August, 6).unwrap(),
            code: Some(Uuid::new_v4()),
        },
        Book {
            id: 2,
            title: "Programming Rust".into(),
            price: Decimal::from_str("59.99").unwrap(),
            published: Date::from_calendar_date(2021, Month::July, 13).unwrap(),
            code: None,
        },
        Book {
            id: 3,
            title: "Rust for Rustaceans".into(),
            price: Decimal::from_str("39.99").unwrap(),
            published: Date::from_calendar_date(2021, Month::December, 21).unwrap(),
            code: Some(Uuid::new_v4()),
        },
    ];
    for book in &books {
        let affected = commands
            .save(
                "INSERT INTO dapple_books (id, title, price, published, code) VALUES (@Id, @Title, @Price, @Published, @Code)",
                params! {
                    "Id" => book.id,
                    "Title" => book.title.clone(),
                    "Price" => book.price,
                    "Published" => book.published,
                    "Code" => book.code,
                },
            )
            .await
            .expect("Failed to insert a book");
        assert_eq!(affected, 1);
    }

    // Read
    let stored: Vec<Book> = commands
        .read("SELECT * FROM dapple_books ORDER BY id", ())
        .await
        .expect("Failed to read the books");
    assert_eq!(stored, books);
    let stored: Vec<Book> = commands
        .read(
            "SELECT * FROM dapple_books WHERE id >= @MinId ORDER BY id",
            params! { "MinId" => 2 },
        )
        .await
        .expect("Failed to read the books with a filter");
    assert_eq!(stored, books[1..]);
    let titles: Vec<(String,)> = commands
        .read(
            "SELECT title FROM dapple_books WHERE title LIKE @Pattern ORDER BY id",
            params! { "Pattern" => "%Rust%" },
        )
        .await
        .expect("Failed to read the titles");
    assert_eq!(titles.len(), 3);
    assert_eq!(titles[1].0, "Programming Rust");

    // Update and delete
    let affected = commands
        .save(
            "UPDATE dapple_books SET price = @Price WHERE published < @Before",
            params! {
                "Price" => Decimal::from_str("19.99").unwrap(),
                "Before" => Date::from_calendar_date(2021, Month::January, 1).unwrap(),
            },
        )
        .await
        .expect("Failed to update the books");
    assert_eq!(affected, 1);
    let affected = commands
        .save("DELETE FROM dapple_books WHERE id = @Id", params! { "Id" => 2 })
        .await
        .expect("Failed to delete a book");
    assert_eq!(affected, 1);
    let affected = commands
        .save("DELETE FROM dapple_books WHERE id = @Id", params! { "Id" => 2 })
        .await
        .expect("Failed to delete a missing book");
    assert_eq!(affected, 0);
    let count: Vec<(i64,)> = commands
        .read("SELECT COUNT(*) FROM dapple_books", ())
        .await
        .expect("Failed to count the books");
    assert_eq!(count, [(2,)]);
    let prices: Vec<(i64, Decimal)> = commands
        .read("SELECT id, price FROM dapple_books ORDER BY id", ())
        .await
        .expect("Failed to read the prices");
    assert_eq!(
        prices,
        [
            (1, Decimal::from_str("19.99").unwrap()),
            (3, Decimal::from_str("39.99").unwrap()),
        ]
    );

    // Failures still close the connection
    let result = commands
        .read::<_, RowLabeled>("SELECT * FROM dapple_missing_table", ())
        .await;
    assert!(result.is_err());
    let result = commands
        .save("INSERT INTO dapple_books (id) VALUES (@Id)", params! { "Id" => 4 })
        .await;
    assert!(result.is_err(), "title is NOT NULL, the insert must fail");
    drop(commands);
    assert_eq!(adapter.state(), ConnectionState::Closed);
}
