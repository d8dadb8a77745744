use std::io::Write;

use srk_types::{RawSample, SrkError, SrkResult};

use crate::codec::{pack_samples, write_raw16_samples};

/// Накопитель трёхосевых выборок фиксированной ёмкости.
///
/// Живёт всю сессию: заполняется через [`SampleBuffer::push`], сливается
/// через [`SampleBuffer::flush`] и переиспользуется без переаллокаций.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<RawSample>,
    capacity: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Добавляет выборку. На заполненном буфере возвращает
    /// [`SrkError::BufferFull`] и ничего не перезаписывает.
    pub fn push(
        &mut self,
        x: i16,
        y: i16,
        z: i16,
    ) -> SrkResult<()> {
        self.push_sample(RawSample::new(x, y, z))
    }

    pub fn push_sample(
        &mut self,
        sample: RawSample,
    ) -> SrkResult<()> {
        if self.full() {
            return Err(SrkError::BufferFull {
                capacity: self.capacity,
            });
        }

        self.samples.push(sample);
        Ok(())
    }

    pub fn full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Содержимое в порядке добавления.
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    /// Пишет содержимое в упакованном 12-битном виде.
    pub fn encode<W: Write>(
        &self,
        sink: &mut W,
    ) -> SrkResult<usize> {
        Ok(pack_samples(&self.samples, sink)?)
    }

    /// Пишет содержимое как 16-битные выборки без упаковки.
    pub fn encode_raw16<W: Write>(
        &self,
        sink: &mut W,
    ) -> SrkResult<usize> {
        Ok(write_raw16_samples(&self.samples, sink)?)
    }

    /// `encode` + `reset`. При ошибке записи содержимое сохраняется.
    pub fn flush<W: Write>(
        &mut self,
        sink: &mut W,
    ) -> SrkResult<usize> {
        let n = self.encode(sink)?;
        self.reset();
        Ok(n)
    }

    /// `encode_raw16` + `reset`.
    pub fn flush_raw16<W: Write>(
        &mut self,
        sink: &mut W,
    ) -> SrkResult<usize> {
        let n = self.encode_raw16(sink)?;
        self.reset();
        Ok(n)
    }

    /// Сбрасывает длину в ноль, ёмкость сохраняется.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
