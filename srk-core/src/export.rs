//! Табличный экспорт разобранного файла (CSV / TSV) и JSON-описание
//! заголовка.
//!
//! Каждая строка таблицы: либо выборка (колонки `ax..gz`), либо
//! долговременная запись (`date_time`, `temp`, `pressure`). Неиспользуемые
//! колонки остаются пустыми, так что таблица читается как есть табличными
//! инструментами.

use std::io::{self, Write};

use srk_types::{FileHeader, LongTermRecord, TelemetryRecord, Vector3};

use crate::format::TimestampExt;

/// Колонки таблицы в порядке вывода.
pub const TABLE_COLUMNS: [&str; 9] = ["ax", "ay", "az", "gx", "gy", "gz", "date_time", "temp", "pressure"];

/// Формат табличного экспорта.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }

    /// Расширение файла без точки.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" | "tab" => Ok(ExportFormat::Tsv),
            _ => Err(format!("Unknown export format: '{s}'. Use: csv, tsv")),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Пишет записи [`TelemetryRecord`] строками таблицы.
///
/// Секции `ACCL` и `GYRO` одного цикла сводятся построчно по индексу
/// выборки: `i`-я строка содержит `i`-ю выборку акселерометра и `i`-ю
/// выборку гироскопа (если она есть).
pub struct TableExporter<W: Write> {
    writer: csv::Writer<W>,
    pending_accel: Vec<Vector3>,
    pending_gyro: Vec<Vector3>,
    gyro_bias: Option<Vector3>,
    rows: u64,
}

impl<W: Write> TableExporter<W> {
    /// Создаёт экспортёр и сразу пишет строку с названиями колонок.
    pub fn new(
        inner: W,
        format: ExportFormat,
    ) -> io::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(format.delimiter())
            .from_writer(inner);
        writer.write_record(TABLE_COLUMNS)?;

        Ok(Self {
            writer,
            pending_accel: Vec::new(),
            pending_gyro: Vec::new(),
            gyro_bias: None,
            rows: 0,
        })
    }

    /// Вычитать `bias` из физических значений гироскопа.
    pub fn with_gyro_bias(
        mut self,
        bias: Vector3,
    ) -> Self {
        self.gyro_bias = Some(bias);
        self
    }

    pub fn push(
        &mut self,
        record: &TelemetryRecord,
    ) -> io::Result<()> {
        match record {
            TelemetryRecord::Accel(samples) => {
                // Новый цикл: предыдущий сбрасывается
                self.flush_pending()?;
                self.pending_accel.extend_from_slice(samples);
            }
            TelemetryRecord::Gyro(samples) => {
                let bias = self.gyro_bias;
                self.pending_gyro.extend(
                    samples
                        .iter()
                        .map(|s| bias.map_or(*s, |b| s.sub(&b))),
                );
                self.flush_pending()?;
            }
            TelemetryRecord::LongTerm(rec) => {
                self.flush_pending()?;
                self.write_long_term(rec)?;
            }
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        let n = self.pending_accel.len().max(self.pending_gyro.len());

        for i in 0..n {
            let mut row: Vec<String> = Vec::with_capacity(TABLE_COLUMNS.len());
            push_vector(&mut row, self.pending_accel.get(i));
            push_vector(&mut row, self.pending_gyro.get(i));
            row.extend([String::new(), String::new(), String::new()]);

            self.writer.write_record(&row)?;
            self.rows += 1;
        }

        self.pending_accel.clear();
        self.pending_gyro.clear();
        Ok(())
    }

    fn write_long_term(
        &mut self,
        rec: &LongTermRecord,
    ) -> io::Result<()> {
        let date_time = rec
            .time
            .to_naive_datetime()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|| rec.time.to_string());

        let mut row = vec![String::new(); 6];
        row.push(date_time);
        row.push(format!("{:.6}", rec.celsius));
        row.push(rec.millibars.map_or(String::new(), |p| format!("{p:.6}")));

        self.writer.write_record(&row)?;
        self.rows += 1;
        Ok(())
    }

    /// Строк данных записано (без строки с названиями колонок).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Дописывает незавершённый цикл и возвращает нижележащий поток.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_pending()?;
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

fn push_vector(
    row: &mut Vec<String>,
    v: Option<&Vector3>,
) {
    match v {
        Some(v) => {
            row.push(format!("{:.6}", v.x));
            row.push(format!("{:.6}", v.y));
            row.push(format!("{:.6}", v.z));
        }
        None => row.extend([String::new(), String::new(), String::new()]),
    }
}

/// Описание заголовка для side-car файла.
pub fn header_report(header: &FileHeader) -> serde_json::Value {
    let start_time = header
        .start_time
        .to_naive_datetime()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| header.start_time.to_string());

    serde_json::json!({
        "name": header.name_str(),
        "orientation": header.orientation,
        "gyro_bias": header.gyro_bias,
        "accel_scale": header.accel_scale,
        "gyro_scale": header.gyro_scale,
        "accel_write_size": header.accel_write_size,
        "gyro_write_size": header.gyro_write_size,
        "long_term_period": header.long_term_period,
        "start_time": start_time,
    })
}

pub fn write_header_json<W: Write>(
    header: &FileHeader,
    sink: W,
) -> io::Result<()> {
    serde_json::to_writer_pretty(sink, &header_report(header))?;
    Ok(())
}
