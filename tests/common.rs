use sqlite_api::{Connection, Error, RowReader, Statement};

/// Sets up logging once per test binary. Use something like `RUST_LOG=sqlite_api=info cargo test`
/// to see the output.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Opens an in-memory database holding the `Users` table, filled with `names` in order.
pub fn users(names: &[&str]) -> Result<Connection, Error> {
    init();
    let conn = Connection::in_memory()?;
    conn.execute("CREATE TABLE Users (Name)", ())?;
    for &name in names {
        conn.execute("insert into Users values (?)", name)?;
    }
    Ok(conn)
}

/// Walks all rows of `stmt` and copies the text in the first column of each.
pub fn first_column(stmt: &mut Statement<'_>) -> Result<Vec<String>, Error> {
    let mut values = Vec::new();
    let mut rows = stmt.rows()?;
    while let Some(row) = rows.row() {
        values.push(row.get_string(0).into_owned());
        rows.advance()?;
    }
    Ok(values)
}
