use std::{
    fs::{self, File},
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};
use srk_core::{write_header_json, ReadStats, SrkReader, TableExporter};
use srk_types::{FileHeader, SrkError};

use crate::{ConvertConfig, ConvertError, ConvertResult};

/// Сессия конвертации одного файла (single-threaded).
pub struct ConvertSession {
    config: ConvertConfig,
}

/// Итог конвертации.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub output_path: PathBuf,
    pub header: FileHeader,
    pub stats: ReadStats,
    /// Строк данных в таблице
    pub rows: u64,
}

impl ConvertSession {
    /// Создаёт сессию, проверяя конфигурацию.
    pub fn new(config: ConvertConfig) -> ConvertResult<Self> {
        let output = config.resolved_output();

        if output == config.input_path {
            return Err(ConvertError::Config(
                "output path would overwrite the input".to_string(),
            ));
        }

        if let Some(h) = &config.header_path {
            if *h == output || *h == config.input_path {
                return Err(ConvertError::Config(
                    "header path clashes with input or output".to_string(),
                ));
            }
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Конвертирует файл целиком.
    ///
    /// Ошибка разбора отвергает файл: частично записанная таблица
    /// удаляется, возвращается [`ConvertError::Rejected`].
    pub fn run(self) -> ConvertResult<ConvertReport> {
        let cfg = &self.config;
        let output_path = cfg.resolved_output();

        let file = File::open(&cfg.input_path)?;
        let mut reader =
            SrkReader::new(file).map_err(|source| rejected(&cfg.input_path, source))?;
        let header = reader.header().clone();

        Self::print_header_info(&header, cfg);

        let out = BufWriter::new(File::create(&output_path)?);
        let mut exporter = TableExporter::new(out, cfg.format)?;
        if cfg.apply_gyro_bias {
            exporter = exporter.with_gyro_bias(header.gyro_bias);
        }

        if let Err(e) = Self::export_records(&cfg.input_path, &mut reader, &mut exporter) {
            drop(exporter);
            if let Err(rm) = fs::remove_file(&output_path) {
                warn!("Failed to remove partial output {output_path:?}: {rm}");
            }
            return Err(e);
        }

        let rows = exporter.rows();
        exporter.finish()?.flush()?;

        if let Some(path) = &cfg.header_path {
            let mut w = BufWriter::new(File::create(path)?);
            write_header_json(&header, &mut w)?;
            w.flush()?;
            info!("Header written: {path:?}");
        }

        let stats = reader.stats().clone();
        Self::log_stats(&stats);
        info!("Table written: {output_path:?} ({rows} rows)");

        Ok(ConvertReport {
            output_path,
            header,
            stats,
            rows,
        })
    }

    fn export_records<R: Read, W: Write>(
        input: &Path,
        reader: &mut SrkReader<R>,
        exporter: &mut TableExporter<W>,
    ) -> ConvertResult<()> {
        while let Some(result) = reader.next_record() {
            let record = result.map_err(|source| rejected(input, source))?;
            exporter.push(&record)?;
        }
        Ok(())
    }

    fn print_header_info(
        h: &FileHeader,
        cfg: &ConvertConfig,
    ) {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("  Input         : {:?}", cfg.input_path);
        info!("  Device        : {} (orientation {})", h.name_str(), h.orientation);
        info!("  Start         : {}", h.start_time);
        info!(
            "  Write sizes   : accel={} gyro={}",
            h.accel_write_size, h.gyro_write_size
        );
        info!("  Long period   : {} cycles", h.long_term_period);
        info!(
            "  Scales        : ±{} g, ±{} °/s",
            h.accel_scale, h.gyro_scale
        );
        info!("  Format        : {}", cfg.format);
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    fn log_stats(stats: &ReadStats) {
        info!(
            "EOF: accel={} gyro={} skipped={} long={} samples={}/{} bytes={}",
            stats.accel_frames,
            stats.gyro_frames,
            stats.gyro_skipped,
            stats.long_term_frames,
            stats.accel_samples,
            stats.gyro_samples,
            stats.bytes_processed,
        );
    }
}

fn rejected(
    path: &Path,
    source: SrkError,
) -> ConvertError {
    ConvertError::Rejected {
        path: path.to_path_buf(),
        source,
    }
}
