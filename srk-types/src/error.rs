use thiserror::Error;

/// Результат для операций SRK
pub type SrkResult<T> = std::result::Result<T, SrkError>;

/// Типы ошибок формата SRK.
#[derive(Debug, Error)]
pub enum SrkError {
    /// Буфер выборок заполнен, push отклонён
    #[error("Sample buffer full: capacity {capacity} samples")]
    BufferFull { capacity: usize },

    /// Данных меньше, чем фиксированный размер заголовка
    #[error("Header truncated: need {needed} bytes, found {available}")]
    HeaderTruncated { needed: usize, available: usize },

    /// Поток оборвался внутри объявленной структуры
    #[error("Truncated stream at offset {offset}: need {needed} bytes, found {available}")]
    TruncatedStream {
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// Неизвестный тег секции (ресинхронизация не выполняется)
    #[error("Malformed frame at offset {offset}: unknown tag \"{}\"", .tag.escape_ascii())]
    MalformedFrame { offset: u64, tag: [u8; 4] },

    /// Размер буфера не совпадает с размером записи из заголовка
    #[error("{section} write size mismatch: header declares {expected}, buffer holds {actual}")]
    WriteSizeMismatch {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Образ идентичности устройства короче фиксированного размера
    #[error("Identity image too short: need {needed} bytes, found {available}")]
    IdentityImage { needed: usize, available: usize },

    /// Поток принял только часть секции: хвост файла несогласован,
    /// писатель больше ничего не пишет
    #[error("Partial write at offset {offset}: {written} of {expected} bytes accepted")]
    PartialWrite {
        offset: u64,
        written: usize,
        expected: usize,
    },

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SrkError {
    /// Смещение в байтах от начала файла, на котором остановился разбор.
    ///
    /// Для усечённого заголовка это всегда 0.
    pub fn offset(&self) -> Option<u64> {
        match self {
            SrkError::HeaderTruncated { .. } => Some(0),
            SrkError::TruncatedStream { offset, .. }
            | SrkError::MalformedFrame { offset, .. }
            | SrkError::PartialWrite { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// `true` для ошибок разбора, после которых файл отвергается целиком.
    pub fn is_fatal_decode(&self) -> bool {
        matches!(
            self,
            SrkError::HeaderTruncated { .. }
                | SrkError::TruncatedStream { .. }
                | SrkError::MalformedFrame { .. }
        )
    }

    /// `true`, если писатель оставил в потоке неполную секцию и дальнейшая
    /// запись невозможна.
    pub fn is_fatal_write(&self) -> bool {
        matches!(self, SrkError::PartialWrite { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let e = SrkError::TruncatedStream {
            offset: 48,
            needed: 45,
            available: 44,
        };
        assert_eq!(e.offset(), Some(48));
        assert!(e.is_fatal_decode());

        let e = SrkError::HeaderTruncated {
            needed: 44,
            available: 3,
        };
        assert_eq!(e.offset(), Some(0));

        let e = SrkError::BufferFull { capacity: 24 };
        assert_eq!(e.offset(), None);
        assert!(!e.is_fatal_decode());

        let e = SrkError::PartialWrite {
            offset: 66,
            written: 5,
            expected: 26,
        };
        assert_eq!(e.offset(), Some(66));
        assert!(e.is_fatal_write());
        assert!(!e.is_fatal_decode());
    }

    #[test]
    fn test_malformed_frame_message() {
        let e = SrkError::MalformedFrame {
            offset: 44,
            tag: *b"XX\x01X",
        };
        let msg = e.to_string();
        assert!(msg.contains("offset 44"), "{msg}");
        assert!(msg.contains("XX\\x01X"), "{msg}");
    }
}
