use std::{
    fs::File,
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Sender, TrySendError};
use log::{debug, error, info, warn};
use srk_core::{SampleBuffer, SrkWriter};
use srk_types::{FileHeader, LongTermRecord, RawSample};

use crate::{
    device::{load_identity, SensorSuite},
    metrics::RecorderMetrics,
    storage::allocate_file_name,
    RecorderConfig, RecorderResult,
};

/// Датчик, к которому относится событие.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Accel,
    Gyro,
}

/// Почему выборки не попали в файл.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Гироскоп не набрал полную секцию к концу цикла
    PartialGyro,
    /// Запись цикла не удалась
    WriteFailed,
    /// Сессия остановлена посреди цикла
    Shutdown,
}

/// Статус сессии, отправляемый в канал наблюдателю.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CycleWritten {
        cycle: u64,
        bytes: u64,
        gyro: bool,
        long_term: bool,
    },
    BufferFull {
        sensor: Sensor,
        capacity: usize,
    },
    SamplesDropped {
        sensor: Sensor,
        count: usize,
        reason: DropReason,
    },
    WriteFailed {
        cycle: u64,
        error: String,
    },
}

/// Сессия записи: владеет буферами, писателем и датчиками.
///
/// Однопоточная; снаружи доступны только метрики, канал статуса и флаг
/// остановки.
pub struct RecordingSession<W: Write> {
    writer: SrkWriter<W>,
    sensors: Box<dyn SensorSuite>,
    accel: SampleBuffer,
    gyro: SampleBuffer,
    cycle: u64,
    long_term_period: u16,
    max_cycles: Option<u64>,
    sample_interval: Duration,
    stats_interval: Duration,
    metrics: Arc<RecorderMetrics>,
    events: Sender<SessionEvent>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RecordingSession<File> {
    /// Открывает сессию по конфигурации: проверяет её, читает идентичность,
    /// выбирает имя файла и пишет заголовок.
    ///
    /// При недоступном хранилище файл не создаётся.
    pub fn open(
        config: &RecorderConfig,
        mut sensors: Box<dyn SensorSuite>,
        events: Sender<SessionEvent>,
    ) -> RecorderResult<(Self, PathBuf)> {
        config.validate()?;

        let identity = load_identity(config.identity_path.as_deref())?;
        let path = allocate_file_name(&config.output_dir)?;

        let info = sensors.info();
        let mut header = FileHeader::new(
            &identity,
            config.accel_write_size as u16,
            config.gyro_write_size as u16,
            config.long_term_period,
        );
        header.accel_scale = info.accel_scale;
        header.gyro_scale = info.gyro_scale;
        header.start_time = sensors.read_clock()?;

        let file = File::create(&path)?;
        info!(
            "Output: {:?} ({} @ {})",
            path,
            header.name_str(),
            header.start_time
        );

        let session = Self::new(file, header, sensors, events)?
            .with_max_cycles(config.max_cycles)
            .with_sample_interval(Duration::from_millis(config.sample_interval_ms))
            .with_stats_interval(Duration::from_secs(config.stats_interval_secs));

        Ok((session, path))
    }
}

impl<W: Write> RecordingSession<W> {
    /// Создаёт сессию поверх произвольного потока. Заголовок пишется сразу.
    pub fn new(
        sink: W,
        header: FileHeader,
        sensors: Box<dyn SensorSuite>,
        events: Sender<SessionEvent>,
    ) -> RecorderResult<Self> {
        let accel = SampleBuffer::new(header.accel_write_size as usize);
        let gyro = SampleBuffer::new(header.gyro_write_size as usize);
        let long_term_period = header.long_term_period;
        let metrics = RecorderMetrics::new();

        let writer = SrkWriter::new(sink, header)?;
        metrics
            .bytes_written
            .store(writer.bytes_written(), Ordering::Relaxed);

        Ok(Self {
            writer,
            sensors,
            accel,
            gyro,
            cycle: 0,
            long_term_period,
            max_cycles: None,
            sample_interval: Duration::ZERO,
            stats_interval: Duration::ZERO,
            metrics,
            events,
        })
    }

    pub fn with_max_cycles(
        mut self,
        max_cycles: Option<u64>,
    ) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_sample_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_stats_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Shared-ссылка на метрики.
    pub fn metrics(&self) -> Arc<RecorderMetrics> {
        self.metrics.clone()
    }

    /// Номер текущего (ещё не записанного) цикла.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn header(&self) -> &FileHeader {
        self.writer.header()
    }

    /// Один опрос датчиков. Когда буфер акселерометра заполняется, цикл
    /// пишется в файл.
    ///
    /// Ошибки записи в файл не возвращаются, а уходят в канал статуса;
    /// возвращаются ошибки датчиков и [`SrkError::PartialWrite`], после
    /// которой файл дописывать нельзя.
    ///
    /// [`SrkError::PartialWrite`]: srk_types::SrkError::PartialWrite
    pub fn tick(&mut self) -> RecorderResult<()> {
        let position = self.accel.len();

        if self.accel.full() {
            warn!("Accelerometer buffer full, reading anyway");
        }
        let sample = self.sensors.read_accel()?;
        self.push(Sensor::Accel, sample);

        if self.sensors.gyro_active()
            && gyro_due(position, self.accel.capacity(), self.gyro.capacity())
        {
            if self.gyro.full() {
                warn!("Gyroscope buffer full, reading anyway");
            }
            let sample = self.sensors.read_gyro()?;
            self.push(Sensor::Gyro, sample);
        }

        if self.accel.full() {
            self.flush_cycle()?;
        }

        Ok(())
    }

    fn push(
        &mut self,
        sensor: Sensor,
        sample: RawSample,
    ) {
        let buf = match sensor {
            Sensor::Accel => &mut self.accel,
            Sensor::Gyro => &mut self.gyro,
        };
        let capacity = buf.capacity();

        match buf.push_sample(sample) {
            Ok(()) => {
                self.metrics
                    .samples_recorded
                    .fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                debug!("{sensor:?}: {e}");
                self.metrics
                    .buffer_full_events
                    .fetch_add(1, Ordering::Relaxed);
                self.metrics.dropped_samples.fetch_add(1, Ordering::Relaxed);
                self.emit(SessionEvent::BufferFull { sensor, capacity });
            }
        }
    }

    fn is_long_cycle(
        &self,
        cycle: u64,
    ) -> bool {
        self.long_term_period != 0 && (cycle + 1) % self.long_term_period as u64 == 0
    }

    fn read_long_term(&mut self) -> RecorderResult<LongTermRecord> {
        Ok(LongTermRecord {
            time: self.sensors.read_clock()?,
            celsius: self.sensors.read_celsius()?,
            millibars: self.sensors.read_millibars()?,
        })
    }

    fn flush_cycle(&mut self) -> RecorderResult<()> {
        let cycle = self.cycle;
        self.cycle += 1;

        let long_term = if self.is_long_cycle(cycle) {
            Some(self.read_long_term()?)
        } else {
            None
        };

        let gyro_ready = self.sensors.gyro_active() && self.gyro.full();
        if !gyro_ready && !self.gyro.is_empty() {
            let count = self.gyro.len();
            self.gyro.reset();
            self.report_dropped(Sensor::Gyro, count, DropReason::PartialGyro);
        }

        // Цикл уходит в поток целиком или не уходит вовсе; при ошибке
        // буферы остаются заполненными
        let result = self.writer.write_cycle(
            &mut self.accel,
            gyro_ready.then_some(&mut self.gyro),
            long_term.as_ref(),
        );

        match result {
            Ok(bytes) => {
                let m = &self.metrics;
                m.cycles_written.fetch_add(1, Ordering::Relaxed);
                m.bytes_written.fetch_add(bytes, Ordering::Relaxed);
                if !gyro_ready {
                    m.gyro_skipped.fetch_add(1, Ordering::Relaxed);
                }
                if long_term.is_some() {
                    m.long_term_records.fetch_add(1, Ordering::Relaxed);
                }

                self.emit(SessionEvent::CycleWritten {
                    cycle,
                    bytes,
                    gyro: gyro_ready,
                    long_term: long_term.is_some(),
                });
            }
            Err(e) => {
                self.metrics.write_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Write error in cycle {cycle}: {e}");
                self.emit(SessionEvent::WriteFailed {
                    cycle,
                    error: e.to_string(),
                });

                // Пропускаем цикл и продолжаем с пустыми буферами
                let accel_left = self.accel.len();
                let gyro_left = self.gyro.len();
                self.accel.reset();
                self.gyro.reset();
                self.report_dropped(Sensor::Accel, accel_left, DropReason::WriteFailed);
                self.report_dropped(Sensor::Gyro, gyro_left, DropReason::WriteFailed);

                // Хвост файла несогласован: дальше писать нельзя
                if e.is_fatal_write() {
                    error!("Recording stopped: {e}");
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    fn report_dropped(
        &self,
        sensor: Sensor,
        count: usize,
        reason: DropReason,
    ) {
        if count == 0 {
            return;
        }

        self.metrics
            .dropped_samples
            .fetch_add(count as u64, Ordering::Relaxed);
        warn!("{count} {sensor:?} samples dropped ({reason:?})");
        self.emit(SessionEvent::SamplesDropped {
            sensor,
            count,
            reason,
        });
    }

    fn emit(
        &self,
        event: SessionEvent,
    ) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(ev)) => debug!("Status channel full, event lost: {ev:?}"),
            // Наблюдателя нет
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Крутит опрос до установки `stop_flag` или до `max_cycles`, затем
    /// завершает файл. Блокируется до завершения.
    pub fn run(
        mut self,
        stop_flag: &AtomicBool,
    ) -> RecorderResult<W> {
        let info = self.sensors.info();
        info!(
            "Starting recording: {} (accel ±{} g, gyro ±{} °/s, pressure={})",
            info.name, info.accel_scale, info.gyro_scale, info.has_pressure
        );

        let session_start = Instant::now();
        let mut last_stats = Instant::now();

        loop {
            // Проверяем внешний stop_flag (Ctrl+C)
            if stop_flag.load(Ordering::Relaxed) {
                info!("Stop signal received. Finalizing...");
                break;
            }

            if let Some(max) = self.max_cycles {
                if self.cycle >= max {
                    info!("Cycle limit reached ({max}). Finalizing...");
                    break;
                }
            }

            self.tick()?;

            if !self.sample_interval.is_zero() {
                thread::sleep(self.sample_interval);
            }

            // Периодически выводим статистику
            if !self.stats_interval.is_zero() && last_stats.elapsed() >= self.stats_interval {
                self.log_progress(&session_start);
                last_stats = Instant::now();
            }
        }

        self.finish()
    }

    /// Сообщает о незаписанных выборках и закрывает файл.
    pub fn finish(self) -> RecorderResult<W> {
        self.report_dropped(Sensor::Accel, self.accel.len(), DropReason::Shutdown);
        self.report_dropped(Sensor::Gyro, self.gyro.len(), DropReason::Shutdown);

        let cycles = self.cycle;
        let inner = self.writer.finish()?;

        info!("Session finished after {cycles} cycles");
        Ok(inner)
    }

    fn log_progress(
        &self,
        start: &Instant,
    ) {
        let m = &self.metrics;

        info!(
            "[ {:.0}s ] cycles={} samples={} dropped={} ({:.2}%) errors={}",
            start.elapsed().as_secs_f64(),
            m.cycles_written.load(Ordering::Relaxed),
            m.samples_recorded.load(Ordering::Relaxed),
            m.dropped_samples.load(Ordering::Relaxed),
            m.drop_rate_pct(),
            m.write_errors.load(Ordering::Relaxed),
        );
    }
}

/// Нужно ли опрашивать гироскоп на позиции `position` цикла.
///
/// Равномерно распределяет `gyro_ws` опросов по `accel_ws` тикам, так что к
/// концу цикла буфер гироскопа заполнен ровно.
pub fn gyro_due(
    position: usize,
    accel_ws: usize,
    gyro_ws: usize,
) -> bool {
    if accel_ws == 0 {
        return false;
    }

    (position * gyro_ws) / accel_ws != ((position + 1) * gyro_ws) / accel_ws
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
