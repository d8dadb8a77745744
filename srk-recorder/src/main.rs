use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use clap::Parser;
use log::{error, info, warn};
use srk_recorder::{
    create_sensors, RecorderConfig, RecordingSession, SensorKind, SessionEvent,
};

#[derive(Parser, Debug)]
#[command(
    name = "srk-recorder",
    version = env!("CARGO_PKG_VERSION"),
    about = "Record tag accelerometer/gyroscope/environment data to DATA-NNN.SRK",
    long_about = None,
)]
struct Cli {
    /// Источник показаний: sim, hw
    #[arg(short, long, default_value = "sim")]
    sensors: String,
    /// Каталог для файлов DATA-NNN.SRK
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Образ идентичности устройства (17 байт EEPROM)
    #[arg(long)]
    identity: Option<PathBuf>,
    /// Выборок акселерометра в секции ACCL
    #[arg(long, default_value = "24")]
    accel_write_size: usize,
    /// Выборок гироскопа в секции GYRO
    #[arg(long, default_value = "12")]
    gyro_write_size: usize,
    /// Циклов между секциями LONG (0 - без них)
    #[arg(long, default_value = "3")]
    period: u16,
    /// Полная шкала акселерометра, g
    #[arg(long, default_value = "8.0")]
    accel_scale: f32,
    /// Полная шкала гироскопа, °/с
    #[arg(long, default_value = "250.0")]
    gyro_scale: f32,
    /// Не опрашивать гироскоп (все циклы пишутся с GSKP)
    #[arg(long)]
    no_gyro: bool,
    /// Нет датчика давления
    #[arg(long)]
    no_pressure: bool,
    /// Пауза между опросами датчиков, мс
    #[arg(long, default_value = "10")]
    interval_ms: u64,
    /// Ограничение по циклам. По умолчанию: до Ctrl+C
    #[arg(short = 'n', long)]
    cycles: Option<u64>,
    /// Интервал вывода статистики (секунды)
    #[arg(long, default_value = "5")]
    stats_interval: u64,
    /// Seed симулятора
    #[arg(long, default_value = "24301")]
    seed: u64,
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

    let sensor_kind: SensorKind = match cli.sensors.parse() {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let config = RecorderConfig {
        sensors: sensor_kind,
        output_dir: cli.output_dir.clone(),
        identity_path: cli.identity.clone(),
        accel_write_size: cli.accel_write_size,
        gyro_write_size: cli.gyro_write_size,
        long_term_period: cli.period,
        accel_scale: cli.accel_scale,
        gyro_scale: cli.gyro_scale,
        gyro_enabled: !cli.no_gyro,
        pressure_enabled: !cli.no_pressure,
        sample_interval_ms: cli.interval_ms,
        max_cycles: cli.cycles,
        stats_interval_secs: cli.stats_interval,
        seed: cli.seed,
    };

    let sensors = match create_sensors(&config, chrono::Local::now().naive_local()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open sensors: {e}");
            std::process::exit(1);
        }
    };

    let (tx, rx) = crossbeam_channel::bounded::<SessionEvent>(256);

    let (session, path) = match RecordingSession::open(&config, sensors, tx) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to start session: {e}");
            std::process::exit(1);
        }
    };
    let metrics = session.metrics();

    // Поток статуса: события сессии в лог
    let status_handle = thread::spawn(move || {
        for event in rx {
            match event {
                SessionEvent::WriteFailed { cycle, error } => {
                    warn!("Cycle {cycle} skipped: {error}")
                }
                SessionEvent::SamplesDropped {
                    sensor,
                    count,
                    reason,
                } => warn!("{count} {sensor:?} samples dropped: {reason:?}"),
                SessionEvent::BufferFull { sensor, capacity } => {
                    warn!("{sensor:?} buffer full ({capacity} samples)")
                }
                SessionEvent::CycleWritten { .. } => {}
            }
        }
    });

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_ctrlc = stop_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C: принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received: finishing current sample and closing file...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Sensors       : {}", config.sensors);
    info!(
        "  Write sizes   : accel={} gyro={}",
        config.accel_write_size, config.gyro_write_size
    );
    info!("  Long period   : {} cycles", config.long_term_period);
    info!("  Interval      : {} ms", config.sample_interval_ms);
    info!("  Output        : {:?}", path);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let session_start = Instant::now();
    let result = session.run(&stop_flag);

    // Сессия закрыла Sender, поток статуса дочитывает канал
    if status_handle.join().is_err() {
        warn!("Status thread panicked");
    }

    if let Err(e) = result {
        error!("Recording failed: {e}");
        std::process::exit(1);
    }

    // --- Итоговая статистика ---
    let summary = metrics.summary(&session_start);
    info!("\n{summary}");

    if summary.dropped_samples > 0 {
        warn!(
            "⚠ {} samples dropped ({:.2}% loss)",
            summary.dropped_samples, summary.drop_rate_pct
        );
    }

    if summary.write_errors > 0 {
        warn!(
            "⚠ {} write errors occurred. Check the storage card.",
            summary.write_errors
        );
        std::process::exit(1);
    }

    info!("✓ Recording complete: {:?}", path);
}
