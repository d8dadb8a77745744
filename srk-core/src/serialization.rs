use std::io::{BufReader, ErrorKind, Read, Write};

use log::{debug, warn};
use srk_types::{FileHeader, FrameTag, LongTermRecord, SrkError, SrkResult, TelemetryRecord};

use crate::{
    binary::read_up_to,
    buffer::SampleBuffer,
    codec::{accel_to_physical, gyro_to_physical, packed_len, raw16_len, read_raw16_samples, unpack_samples},
    format::{FileHeaderExt, LongTermRecordExt, HEADER_SIZE, LONG_TERM_SIZE, TAG_SIZE},
};

/// Потоковый писатель SRK файлов (сторона устройства).
///
/// Байты только дописываются: заголовок пишется в [`SrkWriter::new`], далее
/// идут циклы записи. Ничего не перезаписывается.
///
/// Каждая операция собирается целиком в памяти и передаётся потоку одним
/// куском. Если поток не принял ни байта, операция отбрасывается и файл
/// заканчивается на последней целой секции. Если поток принял часть
/// байт, писатель возвращает [`SrkError::PartialWrite`] и больше ничего
/// не пишет.
pub struct SrkWriter<W: Write> {
    inner: W,
    header: FileHeader,
    /// Байты текущей операции, ещё не переданные потоку
    pending: Vec<u8>,
    /// (offset, written, expected) неполной записи
    poisoned: Option<(u64, usize, usize)>,
    cycles: u64,
    bytes_written: u64,
}

/// Состояние разбора [`SrkReader`].
///
/// Чтение заголовка происходит в [`SrkReader::new`], поэтому готовый
/// читатель начинает с `AwaitFrame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Ожидается 4-байтовый тег следующей секции
    AwaitFrame,
    /// Тег прочитан, разбирается payload
    Decoding(FrameTag),
    /// Входные данные закончились на границе секции
    EndOfStream,
    /// Была возвращена фатальная ошибка; дальнейший разбор не выполняется
    Failed,
}

/// Потоковый читатель SRK файлов (сторона хоста).
pub struct SrkReader<R: Read> {
    reader: BufReader<R>,
    header: FileHeader,
    state: ParseState,
    offset: u64,
    payload: Vec<u8>,
    stats: ReadStats,
}

/// Статистика, накопленная [`SrkReader`] в процессе чтения.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadStats {
    pub accel_frames: u64,
    pub gyro_frames: u64,
    /// Секций `GSKP`
    pub gyro_skipped: u64,
    pub long_term_frames: u64,
    pub accel_samples: u64,
    pub gyro_samples: u64,
    /// Всего обработано байт, включая заголовок и теги.
    pub bytes_processed: u64,
}

impl<W: Write> SrkWriter<W> {
    /// Создаёт новый писатель, немедленно записывая заголовок в поток.
    pub fn new(
        inner: W,
        header: FileHeader,
    ) -> SrkResult<Self> {
        let mut writer = Self {
            inner,
            header,
            pending: Vec::with_capacity(HEADER_SIZE),
            poisoned: None,
            cycles: 0,
            bytes_written: 0,
        };

        writer.pending.extend_from_slice(&writer.header.to_bytes());
        writer.commit()?;

        Ok(writer)
    }

    fn check_size(
        section: &'static str,
        expected: u16,
        buf: &SampleBuffer,
    ) -> SrkResult<()> {
        if buf.len() != expected as usize {
            return Err(SrkError::WriteSizeMismatch {
                section,
                expected: expected as usize,
                actual: buf.len(),
            });
        }
        Ok(())
    }

    /// Передаёт `pending` потоку.
    ///
    /// Ошибка до первого принятого байта отбрасывает операцию; ошибка после
    /// него блокирует писатель.
    fn commit(&mut self) -> SrkResult<()> {
        if let Some((offset, written, expected)) = self.poisoned {
            self.pending.clear();
            return Err(SrkError::PartialWrite {
                offset,
                written,
                expected,
            });
        }

        let mut written = 0;
        while written < self.pending.len() {
            match self.inner.write(&self.pending[written..]) {
                Ok(0) => return self.abort(written, ErrorKind::WriteZero.into()),
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return self.abort(written, e),
            }
        }

        self.bytes_written += written as u64;
        self.pending.clear();
        Ok(())
    }

    fn abort(
        &mut self,
        written: usize,
        e: std::io::Error,
    ) -> SrkResult<()> {
        let expected = self.pending.len();
        self.pending.clear();

        if written == 0 {
            return Err(SrkError::Io(e));
        }

        let offset = self.bytes_written;
        self.bytes_written += written as u64;
        self.poisoned = Some((offset, written, expected));
        warn!("Partial write at offset {offset}: {written} of {expected} bytes ({e})");

        Err(SrkError::PartialWrite {
            offset,
            written,
            expected,
        })
    }

    fn stage_accel(
        &mut self,
        accel: &SampleBuffer,
    ) -> SrkResult<()> {
        self.pending.extend_from_slice(FrameTag::Accel.as_bytes());
        accel.encode(&mut self.pending)?;
        Ok(())
    }

    fn stage_gyro(
        &mut self,
        gyro: Option<&SampleBuffer>,
    ) -> SrkResult<()> {
        match gyro {
            Some(g) => {
                self.pending.extend_from_slice(FrameTag::Gyro.as_bytes());
                g.encode_raw16(&mut self.pending)?;
            }
            None => self.pending.extend_from_slice(FrameTag::GyroSkip.as_bytes()),
        }
        Ok(())
    }

    fn stage_long_term(
        &mut self,
        record: &LongTermRecord,
    ) {
        self.pending.extend_from_slice(FrameTag::LongTerm.as_bytes());
        self.pending.extend_from_slice(&record.to_bytes());
    }

    /// `ACCL` + упакованные выборки. Буфер сбрасывается после записи.
    ///
    /// Длина буфера обязана совпадать с `accel_write_size` заголовка,
    /// иначе ничего не пишется.
    pub fn write_accel(
        &mut self,
        accel: &mut SampleBuffer,
    ) -> SrkResult<()> {
        Self::check_size("accelerometer", self.header.accel_write_size, accel)?;

        self.stage_accel(accel)?;
        self.commit()?;
        accel.reset();
        Ok(())
    }

    /// `GYRO` + 16-битные выборки. Буфер сбрасывается после записи.
    pub fn write_gyro(
        &mut self,
        gyro: &mut SampleBuffer,
    ) -> SrkResult<()> {
        Self::check_size("gyroscope", self.header.gyro_write_size, gyro)?;

        self.stage_gyro(Some(gyro))?;
        self.commit()?;
        gyro.reset();
        Ok(())
    }

    /// `GSKP`: гироскоп в этом цикле не писался.
    pub fn write_gyro_skip(&mut self) -> SrkResult<()> {
        self.stage_gyro(None)?;
        self.commit()
    }

    /// `LONG` + отметка времени, температура, давление.
    pub fn write_long_term(
        &mut self,
        record: &LongTermRecord,
    ) -> SrkResult<()> {
        self.stage_long_term(record);
        self.commit()
    }

    /// Пишет полный цикл: `ACCL`, затем `GYRO` или `GSKP`, затем `LONG`,
    /// если передана долговременная запись.
    ///
    /// Размеры обоих буферов проверяются до записи первого байта. Цикл
    /// уходит в поток одним куском; буферы сбрасываются только после
    /// успешной записи. Возвращает число байт цикла.
    pub fn write_cycle(
        &mut self,
        accel: &mut SampleBuffer,
        gyro: Option<&mut SampleBuffer>,
        long_term: Option<&LongTermRecord>,
    ) -> SrkResult<u64> {
        Self::check_size("accelerometer", self.header.accel_write_size, accel)?;
        if let Some(g) = gyro.as_deref() {
            Self::check_size("gyroscope", self.header.gyro_write_size, g)?;
        }

        let before = self.bytes_written;

        self.stage_accel(accel)?;
        self.stage_gyro(gyro.as_deref())?;
        if let Some(rec) = long_term {
            self.stage_long_term(rec);
        }
        self.commit()?;

        accel.reset();
        if let Some(g) = gyro {
            g.reset();
        }

        self.cycles += 1;
        debug!(
            "cycle {} written: {} bytes, long={}",
            self.cycles,
            self.bytes_written - before,
            long_term.is_some()
        );

        Ok(self.bytes_written - before)
    }

    /// Сбрасывает нижележащий поток.
    pub fn flush(&mut self) -> SrkResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Завершает запись и возвращает нижележащий поток.
    pub fn finish(mut self) -> SrkResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Количество записанных циклов.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Байт, принятых потоком с начала файла (включая заголовок).
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// `true` после неполной записи.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }
}

impl<R: Read> SrkReader<R> {
    /// Создаёт читатель, читая заголовок из `inner`.
    pub fn new(inner: R) -> SrkResult<Self> {
        let mut reader = BufReader::new(inner);
        let header = FileHeader::read_from(&mut reader)?;

        let stats = ReadStats {
            bytes_processed: HEADER_SIZE as u64,
            ..ReadStats::default()
        };

        Ok(Self {
            reader,
            header,
            state: ParseState::AwaitFrame,
            offset: HEADER_SIZE as u64,
            payload: Vec::new(),
            stats,
        })
    }

    fn fail(
        &mut self,
        e: SrkError,
    ) -> Option<SrkResult<TelemetryRecord>> {
        self.state = ParseState::Failed;
        Some(Err(e))
    }

    /// Читает `len` байт со смещения `self.offset`; меньше: усечение.
    fn read_exact_at_offset(
        &mut self,
        len: usize,
    ) -> SrkResult<()> {
        let start = self.offset;

        self.payload.resize(len, 0);
        let n = read_up_to(&mut self.reader, &mut self.payload)?;
        self.offset += n as u64;
        self.stats.bytes_processed += n as u64;

        if n < len {
            return Err(SrkError::TruncatedStream {
                offset: start,
                needed: len,
                available: n,
            });
        }

        Ok(())
    }

    fn decode_frame(
        &mut self,
        tag: FrameTag,
    ) -> SrkResult<TelemetryRecord> {
        match tag {
            FrameTag::Accel => {
                let count = self.header.accel_write_size as usize;
                self.read_exact_at_offset(packed_len(count))?;

                let scale = self.header.accel_scale;
                let samples = unpack_samples(&self.payload, count)?
                    .iter()
                    .map(|s| accel_to_physical(s, scale))
                    .collect::<Vec<_>>();

                self.stats.accel_frames += 1;
                self.stats.accel_samples += samples.len() as u64;
                Ok(TelemetryRecord::Accel(samples))
            }
            FrameTag::Gyro => {
                let count = self.header.gyro_write_size as usize;
                self.read_exact_at_offset(raw16_len(count))?;

                let scale = self.header.gyro_scale;
                let samples = read_raw16_samples(&self.payload, count)?
                    .iter()
                    .map(|s| gyro_to_physical(s, scale))
                    .collect::<Vec<_>>();

                self.stats.gyro_frames += 1;
                self.stats.gyro_samples += samples.len() as u64;
                Ok(TelemetryRecord::Gyro(samples))
            }
            FrameTag::LongTerm => {
                self.read_exact_at_offset(LONG_TERM_SIZE)?;

                let mut buf = [0u8; LONG_TERM_SIZE];
                buf.copy_from_slice(&self.payload[..LONG_TERM_SIZE]);

                self.stats.long_term_frames += 1;
                Ok(TelemetryRecord::LongTerm(LongTermRecord::from_bytes(&buf)))
            }
            // GSKP не имеет payload и обрабатывается в next_record
            FrameTag::GyroSkip => Err(SrkError::MalformedFrame {
                offset: self.offset - TAG_SIZE as u64,
                tag: *tag.as_bytes(),
            }),
        }
    }

    /// Возвращает следующую запись или `None` в конце потока.
    ///
    /// После первой ошибки читатель переходит в [`ParseState::Failed`] и
    /// больше ничего не возвращает.
    pub fn next_record(&mut self) -> Option<SrkResult<TelemetryRecord>> {
        loop {
            match self.state {
                ParseState::EndOfStream | ParseState::Failed => return None,

                ParseState::AwaitFrame => {
                    let tag_offset = self.offset;
                    let mut tag = [0u8; TAG_SIZE];

                    let n = match read_up_to(&mut self.reader, &mut tag) {
                        Ok(n) => n,
                        Err(e) => return self.fail(SrkError::Io(e)),
                    };
                    self.offset += n as u64;
                    self.stats.bytes_processed += n as u64;

                    if n == 0 {
                        self.state = ParseState::EndOfStream;
                        return None;
                    }

                    if n < TAG_SIZE {
                        return self.fail(SrkError::TruncatedStream {
                            offset: tag_offset,
                            needed: TAG_SIZE,
                            available: n,
                        });
                    }

                    match FrameTag::from_bytes(&tag) {
                        Some(FrameTag::GyroSkip) => {
                            self.stats.gyro_skipped += 1;
                        }
                        Some(t) => self.state = ParseState::Decoding(t),
                        None => {
                            return self.fail(SrkError::MalformedFrame {
                                offset: tag_offset,
                                tag,
                            })
                        }
                    }
                }

                ParseState::Decoding(tag) => {
                    return match self.decode_frame(tag) {
                        Ok(record) => {
                            self.state = ParseState::AwaitFrame;
                            Some(Ok(record))
                        }
                        Err(e) => self.fail(e),
                    };
                }
            }
        }
    }

    /// Прочитанный заголовок файла.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Текущее состояние разбора.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Смещение следующего непрочитанного байта от начала файла.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Накопленная статистика чтения.
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }
}

impl<R: Read> Iterator for SrkReader<R> {
    type Item = SrkResult<TelemetryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Convenience: читает все записи файла, собирая их в вектор.
///
/// Первая же ошибка прерывает чтение: файл отвергается целиком.
pub fn read_all_records<R: Read>(reader: &mut SrkReader<R>) -> SrkResult<Vec<TelemetryRecord>> {
    let mut records = Vec::new();
    while let Some(result) = reader.next_record() {
        records.push(result?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use srk_types::{DeviceIdentity, RawSample, Timestamp, Vector3};

    use super::*;
    use crate::codec::pack_to_vec;

    fn make_header(
        accel_ws: u16,
        gyro_ws: u16,
    ) -> FileHeader {
        let mut h = FileHeader::new(&DeviceIdentity::default(), accel_ws, gyro_ws, 3);
        h.accel_scale = 8.0;
        h.gyro_scale = 250.0;
        h.start_time = Timestamp::from_ymd_hms(2016, 7, 4, 12, 0, 0);
        h
    }

    fn filled(
        capacity: usize,
        seed: i16,
    ) -> SampleBuffer {
        let mut b = SampleBuffer::new(capacity);
        for i in 0..capacity as i16 {
            b.push(seed + i, seed - i, i).unwrap();
        }
        b
    }

    fn long_record() -> LongTermRecord {
        LongTermRecord {
            time: Timestamp::from_ymd_hms(2016, 7, 4, 12, 0, 5),
            celsius: 21.5,
            millibars: Some(1009.0),
        }
    }

    #[test]
    fn test_writer_reader_round_trip() {
        let header = make_header(4, 4);
        let mut writer = SrkWriter::new(Vec::new(), header.clone()).unwrap();

        let mut accel = filled(4, 100);
        let mut gyro = filled(4, -500);
        writer.write_cycle(&mut accel, Some(&mut gyro), None).unwrap();

        let mut accel = filled(4, 7);
        writer
            .write_cycle(&mut accel, None, Some(&long_record()))
            .unwrap();

        assert_eq!(writer.cycles(), 2);
        let raw = writer.finish().unwrap();

        // 44 + (4 + 18) + (4 + 24) + (4 + 18) + 4 + (4 + 21)
        assert_eq!(raw.len(), 44 + 22 + 28 + 22 + 4 + 25);

        let mut reader = SrkReader::new(Cursor::new(raw)).unwrap();
        assert_eq!(reader.header(), &header);

        let records = read_all_records(&mut reader).unwrap();
        let tags: Vec<_> = records.iter().map(|r| r.tag()).collect();
        assert_eq!(
            tags,
            vec![FrameTag::Accel, FrameTag::Gyro, FrameTag::Accel, FrameTag::LongTerm]
        );

        match &records[0] {
            TelemetryRecord::Accel(v) => {
                assert_eq!(v.len(), 4);
                assert_eq!(v[0], accel_to_physical(&RawSample::new(100, 100, 0), 8.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &records[1] {
            TelemetryRecord::Gyro(v) => {
                assert_eq!(v[1], gyro_to_physical(&RawSample::new(-499, -501, 1), 250.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(records[3], TelemetryRecord::LongTerm(long_record()));

        assert_eq!(reader.state(), ParseState::EndOfStream);
        assert_eq!(reader.stats().gyro_skipped, 1);
        assert_eq!(reader.stats().accel_samples, 8);
        assert_eq!(reader.stats().gyro_samples, 4);
        assert_eq!(reader.stats().bytes_processed, reader.offset());
    }

    #[test]
    fn test_write_size_mismatch_writes_nothing() {
        let mut writer = SrkWriter::new(Vec::new(), make_header(4, 4)).unwrap();
        let mut accel = filled(4, 0);
        let mut short_gyro = filled(2, 0);

        let err = writer
            .write_cycle(&mut accel, Some(&mut short_gyro), None)
            .unwrap_err();
        assert!(matches!(
            err,
            SrkError::WriteSizeMismatch {
                section: "gyroscope",
                expected: 4,
                actual: 2
            }
        ));

        // Буферы не тронуты, поток содержит только заголовок
        assert_eq!(accel.len(), 4);
        assert_eq!(writer.bytes_written(), HEADER_SIZE as u64);
        assert_eq!(writer.finish().unwrap().len(), HEADER_SIZE);
    }

    /// Поток с ограниченным числом принимаемых байт; `None` - без ограничения.
    struct LimitedSink {
        data: Vec<u8>,
        budget: Option<usize>,
    }

    impl Write for LimitedSink {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            let n = match self.budget {
                None => buf.len(),
                Some(0) => return Err(std::io::Error::other("no space left")),
                Some(b) => buf.len().min(b),
            };
            self.data.extend_from_slice(&buf[..n]);
            if let Some(b) = self.budget.as_mut() {
                *b -= n;
            }
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_cycle_leaves_no_trace() {
        let sink = LimitedSink {
            data: Vec::new(),
            budget: None,
        };
        let mut writer = SrkWriter::new(sink, make_header(4, 2)).unwrap();

        let mut accel = filled(4, 1);
        writer.write_cycle(&mut accel, None, None).unwrap();
        let committed = writer.bytes_written();

        // Отказ до первого байта: цикл отброшен целиком, буферы не тронуты
        writer.inner.budget = Some(0);
        let mut accel = filled(4, 2);
        let mut gyro = filled(2, 3);
        for _ in 0..1000 {
            let err = writer
                .write_cycle(&mut accel, Some(&mut gyro), Some(&long_record()))
                .unwrap_err();
            assert!(matches!(err, SrkError::Io(_)));
        }
        assert_eq!(accel.len(), 4);
        assert_eq!(gyro.len(), 2);
        assert_eq!(writer.bytes_written(), committed);
        assert_eq!(writer.cycles(), 1);
        assert!(!writer.is_poisoned());

        writer.inner.budget = None;
        writer.write_cycle(&mut accel, Some(&mut gyro), None).unwrap();
        assert!(accel.is_empty());

        let raw = writer.finish().unwrap().data;
        assert_eq!(raw.len() as u64, committed + 4 + 18 + 4 + 12);
        let records = read_all_records(&mut SrkReader::new(Cursor::new(raw)).unwrap()).unwrap();
        let tags: Vec<_> = records.iter().map(|r| r.tag()).collect();
        assert_eq!(tags, vec![FrameTag::Accel, FrameTag::Accel, FrameTag::Gyro]);
    }

    #[test]
    fn test_partial_write_poisons_writer() {
        let sink = LimitedSink {
            data: Vec::new(),
            budget: Some(HEADER_SIZE + 7),
        };
        let mut writer = SrkWriter::new(sink, make_header(4, 2)).unwrap();

        let mut accel = filled(4, 1);
        let err = writer.write_cycle(&mut accel, None, None).unwrap_err();
        assert!(matches!(
            err,
            SrkError::PartialWrite {
                offset: 44,
                written: 7,
                expected: 26
            }
        ));
        assert!(err.is_fatal_write());
        assert!(writer.is_poisoned());
        assert_eq!(accel.len(), 4);

        // Даже когда место появилось, писатель больше ничего не пишет
        writer.inner.budget = None;
        assert!(matches!(
            writer.write_gyro_skip(),
            Err(SrkError::PartialWrite { offset: 44, .. })
        ));
        assert_eq!(writer.finish().unwrap().data.len(), HEADER_SIZE + 7);
    }

    #[test]
    fn test_gskp_then_eof_is_clean_end() {
        let mut raw = make_header(2, 2).to_bytes().to_vec();
        raw.extend_from_slice(b"GSKP");

        let mut reader = SrkReader::new(Cursor::new(raw)).unwrap();
        assert!(reader.next_record().is_none());
        assert_eq!(reader.state(), ParseState::EndOfStream);
        assert_eq!(reader.stats().gyro_frames, 0);
        assert_eq!(reader.stats().gyro_skipped, 1);
    }

    #[test]
    fn test_header_only_file() {
        let raw = make_header(2, 2).to_bytes().to_vec();
        let mut reader = SrkReader::new(Cursor::new(raw)).unwrap();

        assert!(reader.next_record().is_none());
        assert_eq!(reader.state(), ParseState::EndOfStream);
    }

    #[test]
    fn test_accel_truncated_reports_payload_offset() {
        let mut raw = make_header(10, 10).to_bytes().to_vec();
        raw.extend_from_slice(b"ACCL");
        let payload = pack_to_vec(&[RawSample::new(1, 2, 3); 10]);
        raw.extend_from_slice(&payload[..44]);

        let mut reader = SrkReader::new(Cursor::new(raw)).unwrap();
        let err = reader.next_record().unwrap().unwrap_err();

        assert!(matches!(
            err,
            SrkError::TruncatedStream {
                offset: 48,
                needed: 45,
                available: 44
            }
        ));
        assert_eq!(reader.state(), ParseState::Failed);
        assert!(reader.next_record().is_none());
    }

    #[test]
    fn test_unknown_tag() {
        let mut raw = make_header(2, 2).to_bytes().to_vec();
        raw.extend_from_slice(b"GSKP");
        raw.extend_from_slice(b"XXXX");
        raw.extend_from_slice(&[0u8; 64]);

        let mut reader = SrkReader::new(Cursor::new(raw)).unwrap();
        let err = reader.next_record().unwrap().unwrap_err();

        match err {
            SrkError::MalformedFrame { offset, tag } => {
                assert_eq!(offset, 48, "offset of the tag start");
                assert_eq!(&tag, b"XXXX");
            }
            other => panic!("unexpected {other:?}"),
        }
        // Ресинхронизации нет
        assert!(reader.next_record().is_none());
    }

    #[test]
    fn test_partial_tag_is_truncation() {
        let mut raw = make_header(2, 2).to_bytes().to_vec();
        raw.extend_from_slice(b"AC");

        let mut reader = SrkReader::new(Cursor::new(raw)).unwrap();
        let err = reader.next_record().unwrap().unwrap_err();
        assert!(matches!(
            err,
            SrkError::TruncatedStream {
                offset: 44,
                needed: 4,
                available: 2
            }
        ));
    }

    #[test]
    fn test_gyro_truncated() {
        let mut raw = make_header(2, 3).to_bytes().to_vec();
        raw.extend_from_slice(b"GYRO");
        raw.extend_from_slice(&[0u8; 17]);

        let mut reader = SrkReader::new(Cursor::new(raw)).unwrap();
        let err = reader.next_record().unwrap().unwrap_err();
        assert_eq!(err.offset(), Some(48));
        assert!(err.to_string().contains("need 18"));
    }

    #[test]
    fn test_consumer_may_stop_early() {
        let header = make_header(2, 2);
        let mut writer = SrkWriter::new(Vec::new(), header).unwrap();
        for i in 0..3 {
            let mut a = filled(2, i);
            writer.write_cycle(&mut a, None, None).unwrap();
        }
        let raw = writer.finish().unwrap();

        let first: Vec<_> = SrkReader::new(Cursor::new(raw.clone()))
            .unwrap()
            .take(1)
            .collect::<SrkResult<_>>()
            .unwrap();

        // Новый читатель начинает с нуля и видит те же записи
        let all = read_all_records(&mut SrkReader::new(Cursor::new(raw)).unwrap()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(first[0], all[0]);
        assert_eq!(first[0].sample_count(), 2);
        assert_eq!(
            all[2],
            TelemetryRecord::Accel(vec![
                accel_to_physical(&RawSample::new(2, 2, 0), 8.0),
                accel_to_physical(&RawSample::new(3, 1, 1), 8.0),
            ])
        );
    }

    #[test]
    fn test_odd_write_size() {
        let header = make_header(3, 1);
        let mut writer = SrkWriter::new(Vec::new(), header).unwrap();
        let mut a = filled(3, 0);
        let mut g = filled(1, 0);
        writer.write_cycle(&mut a, Some(&mut g), None).unwrap();
        let raw = writer.finish().unwrap();

        // 44 + ACCL + 18 + GYRO + 6
        assert_eq!(raw.len(), 44 + 4 + 18 + 4 + 6);

        let records = read_all_records(&mut SrkReader::new(Cursor::new(raw)).unwrap()).unwrap();
        assert_eq!(records[0].sample_count(), 3);
        assert_eq!(records[1].sample_count(), 1);
        assert_eq!(records[1], TelemetryRecord::Gyro(vec![Vector3::default()]));
    }
}
