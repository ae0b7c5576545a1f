use anyhow::{Context, Result};
use clap::Parser;
use financial_spreadsheet::{LineRecord, Properties, TIME_ZONE_KEY, TransactionLedgerWriter, import};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Write transactions from a CSV file into a `Transactions` spreadsheet.
///
/// The CSV header must be `due_date,bank,description,code,value,category,tags`; tags are
/// separated by `;`.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// CSV file to read, or `-` for stdin.
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Where to write the `.xlsx` file. An existing file is overwritten.
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// A `.properties` file with application settings such as `app.time_zone`.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// IANA time zone in which due dates start. Overrides `app.time_zone` from --config.
    #[arg(long, env = "APP_TIME_ZONE")]
    time_zone: Option<String>,

    /// The logging verbosity: off, error, warn, info, debug or trace. RUST_LOG takes precedence.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    debug!("{args:?}");
    let config = build_config(args.config.as_deref(), args.time_zone.as_deref())?;
    let records = read_records(&args.input, io::stdin().lock())?;

    let mut ledger = TransactionLedgerWriter::new(config);
    for (i, record) in records.into_iter().enumerate() {
        ledger
            .append_record(record)
            .with_context(|| format!("transaction #{}", i + 1))?;
    }
    ledger.save(&args.output)?;
    Ok(())
}

/// Loads `config` when given, then lets `time_zone` replace its `app.time_zone`.
fn build_config(config: Option<&Path>, time_zone: Option<&str>) -> Result<Properties> {
    let mut props = match config {
        Some(path) => Properties::load(path)
            .with_context(|| format!("unable to load {}", path.display()))?,
        None => Properties::new(),
    };
    if let Some(tz) = time_zone {
        props.set(TIME_ZONE_KEY, tz);
    }
    Ok(props)
}

/// Reads CSV records from `input`, or from `stdin` when `input` is `-`.
fn read_records<R: Read>(input: &Path, stdin: R) -> Result<Vec<LineRecord>> {
    if input.as_os_str() == "-" {
        import::read_lines(stdin)
    } else {
        import::read_lines_from_path(input)
    }
    .with_context(|| format!("unable to read {}", input.display()))
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only this crate (library and binary share the name) logs, at `level`.
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CSV: &str = "due_date,bank,description,code,value,category,tags\n\
                       2024-05-10,NUBANK,Electricity,ENEL-0524,189.90,Utilities,home;monthly\n";

    #[test]
    fn test_time_zone_flag_overrides_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("app.properties");
        fs::write(&path, "app.time_zone=Europe/Lisbon\nname=ledger\n")?;

        let props = build_config(Some(&path), Some("America/Sao_Paulo"))?;
        assert_eq!(props.get(TIME_ZONE_KEY), Some("America/Sao_Paulo"));
        assert_eq!(props.get("name"), Some("ledger"));

        let props = build_config(Some(&path), None)?;
        assert_eq!(props.get(TIME_ZONE_KEY), Some("Europe/Lisbon"));
        Ok(())
    }

    #[test]
    fn test_no_config_file() -> Result<()> {
        assert!(build_config(None, None)?.is_empty());
        let props = build_config(None, Some("UTC"))?;
        assert_eq!(props.get(TIME_ZONE_KEY), Some("UTC"));
        Ok(())
    }

    #[test]
    fn test_missing_config_file_names_path() {
        let err = build_config(Some(Path::new("/no/such/app.properties")), None).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/app.properties"));
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "financial-spreadsheet",
            "-i",
            "in.csv",
            "-o",
            "out.xlsx",
            "-c",
            "app.properties",
            "--time-zone",
            "UTC",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.input, PathBuf::from("in.csv"));
        assert_eq!(args.output, PathBuf::from("out.xlsx"));
        assert_eq!(args.config, Some(PathBuf::from("app.properties")));
        assert_eq!(args.time_zone.as_deref(), Some("UTC"));
        assert_eq!(args.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_output_is_required() {
        assert!(Args::try_parse_from(["financial-spreadsheet", "--input", "in.csv"]).is_err());
    }

    #[test]
    fn test_dash_reads_stdin() -> Result<()> {
        let records = read_records(Path::new("-"), CSV.as_bytes())?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description.as_deref(), Some("Electricity"));
        Ok(())
    }

    #[test]
    fn test_run_writes_workbook() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.xlsx");
        fs::write(&input, CSV)?;

        run(Args {
            input,
            output: output.clone(),
            config: None,
            time_zone: Some("America/Sao_Paulo".into()),
            log_level: LevelFilter::OFF,
        })?;
        let archive = zip::ZipArchive::new(fs::File::open(&output)?)?;
        assert!(archive.file_names().any(|n| n == "xl/worksheets/sheet1.xml"));
        Ok(())
    }

    #[test]
    fn test_run_reports_incomplete_transaction() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.xlsx");
        fs::write(
            &input,
            "due_date,bank,description,code,value\n2024-05-10,,Rent,R-1,1500.00\n",
        )?;

        let err = run(Args {
            input,
            output: output.clone(),
            config: None,
            time_zone: Some("UTC".into()),
            log_level: LevelFilter::OFF,
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("transaction #1"));
        assert!(!output.exists());
        Ok(())
    }
}
