/// Тег секции файла SRK (4 ASCII байта).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTag {
    /// Упакованные 12-битные выборки акселерометра
    Accel,
    /// Сырые 16-битные выборки гироскопа
    Gyro,
    /// Гироскоп в этом цикле не писался (без payload)
    GyroSkip,
    /// Часы + температура + давление
    LongTerm,
}

impl FrameTag {
    pub const ALL: [FrameTag; 4] = [
        FrameTag::Accel,
        FrameTag::Gyro,
        FrameTag::GyroSkip,
        FrameTag::LongTerm,
    ];

    pub fn as_bytes(&self) -> &'static [u8; 4] {
        match self {
            FrameTag::Accel => b"ACCL",
            FrameTag::Gyro => b"GYRO",
            FrameTag::GyroSkip => b"GSKP",
            FrameTag::LongTerm => b"LONG",
        }
    }

    /// `None` для неизвестного тега: решение об ошибке принимает парсер,
    /// которому известно смещение.
    pub fn from_bytes(b: &[u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_bytes() == b)
    }
}

impl std::fmt::Display for FrameTag {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        // Все теги: ASCII
        let b = self.as_bytes();
        write!(f, "{}{}{}{}", b[0] as char, b[1] as char, b[2] as char, b[3] as char)
    }
}
