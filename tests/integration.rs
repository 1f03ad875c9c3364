mod common;

use anyhow::Result;
use tempfile::tempdir;
use test_case::test_case;

use common::{first_column, init, users};

use sqlite_api::{
    handles::Record, AccessMode, ColumnType, Connection, ConnectionOptions, Error, IntoParameter,
    Parameter, RowIterator, RowReader, Statement, U16CString, U16String,
};

#[test_case(Connection::in_memory; "narrow target")]
#[test_case(Connection::in_memory_utf16; "wide target")]
fn hello_world(open: fn() -> Result<Connection, Error>) {
    init();
    let conn = open().unwrap();

    let mut stmt = conn
        .prepare("select ?1 union all select ?2", ("hello", "World"))
        .unwrap();

    assert_eq!(["hello", "World"], first_column(&mut stmt).unwrap().as_slice());
}

#[test]
fn users_in_insertion_order() -> Result<()> {
    let conn = users(&["Joe", "Beth"])?;

    let mut stmt = conn.prepare("select Name from Users", ())?;

    assert_eq!(["Joe", "Beth"], first_column(&mut stmt)?.as_slice());
    Ok(())
}

#[test]
fn open_in_missing_directory() -> Result<()> {
    init();
    let dir = tempdir()?;
    let path = dir.path().join("missing").join("test.db");

    let mut conn = Connection::new();
    let result = conn.connect(path.to_str().unwrap());

    let error = result.unwrap_err();
    assert!(matches!(
        error,
        Error::Connection {
            function: "sqlite3_open_v2",
            ..
        }
    ));
    // SQLITE_CANTOPEN
    assert_eq!(Some(14), error.code().map(|code| code & 0xff));
    assert!(!error.message().unwrap().is_empty());
    assert!(!conn.is_open());
    Ok(())
}

#[test]
fn failed_connect_keeps_previous_session() -> Result<()> {
    let mut conn = users(&["Joe"])?;
    let dir = tempdir()?;
    let path = dir.path().join("missing").join("test.db");

    assert!(conn.connect(path.to_str().unwrap()).is_err());

    assert!(conn.is_open());
    let mut stmt = conn.prepare("select Name from Users", ())?;
    assert_eq!(["Joe"], first_column(&mut stmt)?.as_slice());
    Ok(())
}

#[test]
fn connect_replaces_session() -> Result<()> {
    let mut conn = users(&["Joe"])?;

    conn.connect(sqlite_api::MEMORY)?;

    // A fresh in-memory database does not know the table
    let result = conn.prepare("select Name from Users", ());
    assert!(matches!(result, Err(Error::Statement { .. })));
    Ok(())
}

#[test]
fn interior_nul_in_target() {
    let result = Connection::open("memo\0ry");
    assert!(matches!(result, Err(Error::InteriorNul { position: 4 })));
}

#[test]
fn database_file_round_trip() -> Result<()> {
    init();
    let dir = tempdir()?;
    let path = dir.path().join("users.db");
    let target = path.to_str().unwrap();

    {
        let conn = Connection::open(target)?;
        conn.execute("CREATE TABLE Users (Name)", ())?;
        conn.execute("insert into Users values (?)", "Joe")?;
    }

    let read_only = ConnectionOptions {
        access_mode: AccessMode::ReadOnly,
    };
    let conn = Connection::open_with(target, read_only)?;
    let mut stmt = conn.prepare("select Name from Users", ())?;
    assert_eq!(["Joe"], first_column(&mut stmt)?.as_slice());

    let error = conn
        .execute("insert into Users values (?)", "Beth")
        .unwrap_err();
    assert!(matches!(error, Error::Statement { .. }));
    // SQLITE_READONLY
    assert_eq!(Some(8), error.code().map(|code| code & 0xff));
    Ok(())
}

#[test]
fn read_write_does_not_create_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("absent.db");
    let options = ConnectionOptions {
        access_mode: AccessMode::ReadWrite,
    };

    let result = Connection::open_with(path.to_str().unwrap(), options);

    assert!(matches!(result, Err(Error::Connection { .. })));
    assert!(!path.exists());
    Ok(())
}

#[test]
fn wide_target_on_disk() -> Result<()> {
    init();
    let dir = tempdir()?;
    let path = dir.path().join("wide.db");
    let target = U16String::from_str(path.to_str().unwrap());

    let conn = Connection::open_utf16(&target)?;
    conn.execute("CREATE TABLE Numbers (n INTEGER)", ())?;

    assert!(conn.is_open());
    assert!(path.exists());
    Ok(())
}

#[test]
fn close_is_idempotent() -> Result<()> {
    let mut conn = users(&[])?;

    conn.close()?;
    assert!(!conn.is_open());
    conn.close()?;
    assert!(!conn.is_open());
    Ok(())
}

#[test]
fn transient_binding_outlives_temporary() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;
    let mut stmt = Statement::new();
    stmt.prepare(&conn, "SELECT ?", ())?;

    {
        let temporary = String::from("copied by SQLite");
        stmt.bind(1, temporary.as_str())?;
    }
    // Reuse the memory the temporary occupied.
    let _other = String::from("overwritten bytes");

    assert!(stmt.step()?);
    assert_eq!("copied by SQLite", stmt.get_string(0));
    Ok(())
}

#[test]
fn static_binding() -> Result<()> {
    static GREETING: &str = "hello";
    init();
    let conn = Connection::in_memory()?;
    let mut stmt = conn.prepare("SELECT ?, ?", ())?;

    stmt.bind_static(1, GREETING)?;
    // Owned values are copied even if bound statically.
    stmt.bind_static(2, String::from("World"))?;

    assert!(stmt.step()?);
    assert_eq!("hello", stmt.get_string(0));
    assert_eq!("World", stmt.get_string(1));
    Ok(())
}

#[test_case(0; "empty result set")]
#[test_case(1; "single row")]
#[test_case(3; "multiple rows")]
fn iterator_ends_equal_to_exhausted(num_rows: i32) {
    init();
    let conn = Connection::in_memory().unwrap();
    let mut stmt = conn
        .prepare(
            "WITH RECURSIVE seq(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM seq) \
            SELECT x FROM seq LIMIT ?",
            num_rows,
        )
        .unwrap();

    let mut rows = stmt.rows().unwrap();
    let mut seen = Vec::new();
    while rows != RowIterator::exhausted() {
        seen.push(rows.row().unwrap().get_int(0));
        rows.advance().unwrap();
    }

    assert_eq!((1..=num_rows).collect::<Vec<_>>(), seen);
    assert!(rows.is_exhausted());
    assert!(rows.row().is_none());
    // Advancing past the end is harmless
    rows.advance().unwrap();
    assert!(rows == RowIterator::exhausted());
}

#[test]
fn next_row_walks_result_set() -> Result<()> {
    let conn = users(&["Joe", "Beth"])?;
    let mut stmt = conn.prepare("select Name from Users", ())?;

    let mut names = Vec::new();
    while let Some(row) = stmt.next_row()? {
        names.push(row.get_string(0).into_owned());
    }

    assert_eq!(["Joe", "Beth"], names.as_slice());
    Ok(())
}

#[test]
fn map_rows_into_owned_values() -> Result<()> {
    let conn = users(&["Joe", "Beth"])?;
    let mut stmt = conn.prepare("select Name, length(Name) from Users", ())?;

    let rows = stmt
        .map_rows(|row| (row.get_string(0).into_owned(), row.get_int(1)))
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(vec![("Joe".to_owned(), 3), ("Beth".to_owned(), 4)], rows);
    Ok(())
}

#[test]
#[should_panic(expected = "Executed statement produced a row")]
fn execute_rejects_queries_returning_rows() {
    let conn = Connection::in_memory().unwrap();
    conn.execute("SELECT 1", ()).unwrap();
}

#[test]
fn empty_text_is_not_prepared() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;

    let stmt = conn.prepare("  -- nothing to see here\n", ())?;
    assert!(!stmt.is_prepared());
    conn.execute("   ", ())?;
    Ok(())
}

#[test]
fn syntax_error_is_statement_error() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;

    let error = conn.prepare("SELEKT 1", ()).unwrap_err();

    assert!(matches!(
        error,
        Error::Statement {
            function: "sqlite3_prepare_v2",
            ..
        }
    ));
    // SQLITE_ERROR
    assert_eq!(Some(1), error.code());
    assert!(error.message().unwrap().contains("SELEKT"));
    assert_eq!(Some(1), conn.last_error().map(|record| record.code));
    Ok(())
}

#[test]
fn last_error_is_none_after_success() -> Result<()> {
    let conn = users(&["Joe"])?;
    assert_eq!(None, conn.last_error());
    Ok(())
}

#[test]
fn failed_prepare_keeps_previous_statement() -> Result<()> {
    let conn = users(&["Joe"])?;
    let mut stmt = Statement::new();
    stmt.prepare(&conn, "select Name from Users", ())?;

    assert!(stmt.prepare(&conn, "select Name from Nobody", ()).is_err());

    assert!(stmt.is_prepared());
    assert_eq!(["Joe"], first_column(&mut stmt)?.as_slice());
    Ok(())
}

#[test]
fn constraint_violation_while_stepping() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;
    conn.execute("CREATE TABLE Users (Name UNIQUE)", ())?;
    conn.execute("insert into Users values (?)", "Joe")?;

    let error = conn
        .execute("insert into Users values (?)", "Joe")
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Statement {
            function: "sqlite3_step",
            ..
        }
    ));
    // SQLITE_CONSTRAINT_UNIQUE
    assert_eq!(Some(2067), error.code());
    Ok(())
}

#[test]
fn bind_out_of_range() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;
    let mut stmt = conn.prepare("SELECT ?", ())?;

    let error = stmt.bind(2, 42i32).unwrap_err();

    // SQLITE_RANGE
    assert_eq!(Some(25), error.code());
    Ok(())
}

#[test]
fn reset_and_rebind() -> Result<()> {
    let conn = users(&[])?;
    let mut insert = conn.prepare("insert into Users values (?)", "Joe")?;

    insert.execute()?;
    insert.reset()?;
    insert.bind(1, "Beth")?;
    insert.execute()?;
    insert.reset()?;
    insert.clear_bindings();
    insert.execute()?;

    assert_eq!(3, conn.last_insert_rowid());
    let mut stmt = conn.prepare("select Name from Users where Name is not null", ())?;
    assert_eq!(["Joe", "Beth"], first_column(&mut stmt)?.as_slice());
    Ok(())
}

#[test]
fn execute_batch_and_changes() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;

    conn.execute_batch(
        "CREATE TABLE Users (Name);
        INSERT INTO Users VALUES ('Joe'), ('Beth');
        UPDATE Users SET Name = upper(Name);",
    )?;

    assert_eq!(2, conn.changes());
    let mut stmt = conn.prepare("select Name from Users", ())?;
    assert_eq!(["JOE", "BETH"], first_column(&mut stmt)?.as_slice());
    Ok(())
}

#[test]
fn column_metadata() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;

    let stmt = conn.prepare("SELECT 1 AS one, ?3 AS three", ())?;

    assert_eq!(2, stmt.column_count());
    assert_eq!(Some("one"), stmt.column_name(0).as_deref());
    assert_eq!(Some("three"), stmt.column_name(1).as_deref());
    assert_eq!(None, stmt.column_name(2));
    assert_eq!(3, stmt.parameter_count());
    Ok(())
}

#[test]
fn column_types() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;
    let mut stmt = conn.prepare("SELECT 1, 2.5, 'text', x'00ff', NULL", ())?;

    assert!(stmt.step()?);

    assert_eq!(ColumnType::Integer, stmt.column_type(0));
    assert_eq!(ColumnType::Float, stmt.column_type(1));
    assert_eq!(ColumnType::Text, stmt.column_type(2));
    assert_eq!(ColumnType::Blob, stmt.column_type(3));
    assert_eq!(ColumnType::Null, stmt.column_type(4));
    assert!(stmt.is_null(4));
    assert_eq!(2.5, stmt.get_double(1));
    assert_eq!(&[0x00u8, 0xff][..], stmt.get_blob(3));
    Ok(())
}

#[test]
fn typed_parameters() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;
    let blob: &[u8] = &[1, 2, 3];

    let mut stmt = conn.prepare(
        "SELECT ?, ?, ?, ?, ?",
        (42i32, 1i64 << 40, 0.5f64, blob, None::<&str>),
    )?;
    assert!(stmt.step()?);

    assert_eq!(42, stmt.get_int(0));
    assert_eq!(1i64 << 40, stmt.get_int64(1));
    assert_eq!(0.5, stmt.get_double(2));
    assert_eq!(blob, stmt.get_blob(3));
    assert!(stmt.is_null(4));
    // NULL is reported as empty text
    assert_eq!("", stmt.get_string(4));
    Ok(())
}

#[test]
fn collections_of_parameters() -> Result<()> {
    init();
    let conn = Connection::in_memory()?;

    let mut stmt = conn.prepare("SELECT ?1 + ?2", [1i32, 2])?;
    assert!(stmt.step()?);
    assert_eq!(3, stmt.get_int(0));

    let params = vec![Parameter::Null, "Joe".into_parameter()];
    stmt.prepare(&conn, "SELECT ?2 || coalesce(?1, '!')", params.as_slice())?;
    assert!(stmt.step()?);
    assert_eq!("Joe!", stmt.get_string(0));

    stmt.prepare(&conn, "SELECT ?", ())?;
    stmt.bind_all(vec![String::from("owned")])?;
    assert!(stmt.step()?);
    assert_eq!("owned", stmt.get_string(0));
    Ok(())
}

#[test]
fn wide_text() -> Result<()> {
    init();
    let conn = Connection::in_memory_utf16()?;
    let text = U16String::from_str("Grüße");
    let terminated = U16CString::from_str("Wörld").unwrap();

    let mut stmt = conn.prepare_utf16(
        &U16String::from_str("SELECT ?1, ?2"),
        (&text, terminated.as_ucstr()),
    )?;
    assert!(stmt.step()?);

    assert_eq!(text.as_ustr(), stmt.get_wide_string(0));
    assert_eq!(5, stmt.get_wide_string_length(0));
    assert_eq!(terminated.as_ustr(), stmt.get_wide_string(1));
    // The narrow representation is converted from the wide one
    assert_eq!("Wörld", stmt.get_string(1));
    assert_eq!(6, stmt.get_string_length(1));
    Ok(())
}

#[test]
fn statement_borrowing_connection_may_be_dropped_first() -> Result<()> {
    let mut conn = users(&["Joe"])?;
    {
        let mut stmt = conn.prepare("select Name from Users", ())?;
        assert!(stmt.step()?);
    }
    conn.close()?;
    assert_eq!(None, conn.last_error().map(|Record { code, .. }| code));
    Ok(())
}
