use anyhow::Error;
use log::info;
use sqlite_api::{
    handles::forward_engine_log, AccessMode, Connection, ConnectionOptions, RowReader,
};
use std::{
    borrow::Cow,
    fs::File,
    io::{stdin, stdout, Write},
    path::PathBuf,
};
use structopt::StructOpt;

/// Query an SQLite database and output the result as CSV, or insert CSV into one of its tables.
#[derive(StructOpt)]
struct Cli {
    /// Verbose mode (-v, -vv, -vvv, etc)
    #[structopt(short = "v", long, parse(from_occurrences))]
    verbose: usize,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Query the database and output the result as CSV.
    Query {
        #[structopt(flatten)]
        query_opt: QueryOpt,
    },
    /// Read CSV from standard in and insert it into a table. The header names the columns.
    Insert {
        #[structopt(flatten)]
        insert_opt: InsertOpt,
    },
}

/// Which database to work on and how.
#[derive(StructOpt)]
struct DatabaseOpt {
    /// Path to the database file. It is created if it does not exist yet, unless `--read-only` is
    /// specified.
    #[structopt(long, short = "d")]
    database: String,
    /// Open the database for reading only.
    #[structopt(long)]
    read_only: bool,
}

#[derive(StructOpt)]
struct QueryOpt {
    #[structopt(flatten)]
    database_opt: DatabaseOpt,
    /// Path to the output csv file the returned values are going to be written to. If omitted the
    /// csv is going to be printed to standard out.
    #[structopt(long, short = "o")]
    output: Option<PathBuf>,
    /// Query executed against the database.
    query: String,
    /// For each placeholder question mark (`?`) in the query text one parameter must be passed at
    /// the end of the command line. Parameters are bound as text.
    parameters: Vec<String>,
}

#[derive(StructOpt)]
struct InsertOpt {
    #[structopt(flatten)]
    database_opt: DatabaseOpt,
    /// Name of the table to insert the values into. No precautions against SQL injection are
    /// taken.
    table: String,
}

fn main() -> Result<(), Error> {
    // Parse arguments from command line interface
    let opt = Cli::from_args();

    // Initialize logging.
    stderrlog::new()
        .module(module_path!())
        .module("sqlite_api")
        .quiet(false)
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    // No other thread is using SQLite yet.
    unsafe { forward_engine_log() }?;

    match opt.command {
        Command::Query { query_opt } => query(&query_opt),
        Command::Insert { insert_opt } => insert(&insert_opt),
    }
}

fn open(database_opt: &DatabaseOpt) -> Result<Connection, Error> {
    let access_mode = if database_opt.read_only {
        AccessMode::ReadOnly
    } else {
        AccessMode::Create
    };
    let options = ConnectionOptions { access_mode };
    let connection = Connection::open_with(&database_opt.database, options)?;
    Ok(connection)
}

/// Execute a query and write the result to csv.
fn query(query_opt: &QueryOpt) -> Result<(), Error> {
    let QueryOpt {
        database_opt,
        output,
        query,
        parameters,
    } = query_opt;

    // If an output file has been specified write to it, otherwise use stdout instead.
    let out = stdout();
    let out: Box<dyn Write> = if let Some(path) = output {
        Box::new(File::create(path)?)
    } else {
        Box::new(out.lock())
    };
    let mut writer = csv::Writer::from_writer(out);

    let connection = open(database_opt)?;
    let parameters: Vec<&str> = parameters.iter().map(String::as_str).collect();
    let mut statement = connection.prepare(query, parameters)?;

    if !statement.is_prepared() {
        eprintln!("Query text does not contain any statement. No output has been created.");
        return Ok(());
    }

    let num_cols = statement.column_count();
    if num_cols == 0 {
        statement.execute()?;
        eprintln!(
            "Statement does not return a result set (not even a schema). No output has been \
            created."
        );
        return Ok(());
    }

    let headline: Vec<String> = (0..num_cols)
        .map(|index| {
            statement
                .column_name(index)
                .map(Cow::into_owned)
                .unwrap_or_default()
        })
        .collect();
    writer.write_record(headline)?;

    let mut num_rows = 0;
    let mut rows = statement.rows()?;
    while let Some(row) = rows.row() {
        // NULL is written as an empty field
        writer.write_record((0..num_cols).map(|index| row.get_string_bytes(index)))?;
        num_rows += 1;
        rows.advance()?;
    }
    writer.flush()?;
    info!("Wrote {} rows as csv.", num_rows);

    Ok(())
}

/// Read the content of a csv and insert it into a table. All rows are inserted within a single
/// transaction.
fn insert(insert_opt: &InsertOpt) -> Result<(), Error> {
    let InsertOpt {
        database_opt,
        table,
    } = insert_opt;

    let stdin = stdin();
    let mut reader = csv::Reader::from_reader(stdin.lock());

    let connection = open(database_opt)?;

    let headline = reader.headers()?;
    let column_names: Vec<String> = headline.iter().map(quote_identifier).collect();
    let placeholders = vec!["?"; column_names.len()].join(", ");
    let statement_text = format!(
        "INSERT INTO {} ({}) VALUES ({});",
        quote_identifier(table),
        column_names.join(", "),
        placeholders
    );
    info!("Insert statement Text: {}", statement_text);

    connection.execute("BEGIN", ())?;
    let mut statement = connection.prepare(&statement_text, ())?;

    let mut num_rows = 0;
    for record in reader.records() {
        let record = record?;
        for (index, field) in record.iter().enumerate() {
            // Empty fields are inserted as NULL
            let value = if field.is_empty() { None } else { Some(field) };
            statement.bind(index + 1, value)?;
        }
        statement.execute()?;
        statement.reset()?;
        num_rows += 1;
    }
    connection.execute("COMMIT", ())?;
    info!("Inserted {} rows into {}.", num_rows, table);

    Ok(())
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
