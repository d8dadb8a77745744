use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use srk_convert::{ConvertConfig, ConvertSession};
use srk_core::ExportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "srk-convert",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert DATA-NNN.SRK recordings into CSV/TSV tables",
    long_about = None,
)]
struct Cli {
    /// Входной файл .SRK
    input: PathBuf,
    /// Таблица. По умолчанию: рядом со входом
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Формат таблицы: csv, tsv
    #[arg(short, long, default_value = "csv")]
    format: String,
    /// Записать описание заголовка в JSON
    #[arg(long)]
    header_json: Option<PathBuf>,
    /// Вычитать bias гироскопа из заголовка
    #[arg(long)]
    apply_gyro_bias: bool,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let format: ExportFormat = match cli.format.parse() {
        Ok(f) => f,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let config = ConvertConfig {
        input_path: cli.input,
        output_path: cli.output,
        format,
        header_path: cli.header_json,
        apply_gyro_bias: cli.apply_gyro_bias,
    };

    let session = match ConvertSession::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    match session.run() {
        Ok(report) => info!("✓ Converted: {:?}", report.output_path),
        Err(e) => {
            match e.offset() {
                Some(offset) => error!("Conversion failed at byte {offset}: {e}"),
                None => error!("Conversion failed: {e}"),
            }
            std::process::exit(1);
        }
    }
}
