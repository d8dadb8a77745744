use serde::{Deserialize, Serialize};

/// Показание RTC в том виде, в котором его отдаёт часовой модуль устройства.
///
/// Порядок полей: часть формата файла и не должен меняться.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamp {
    /// Секунды (0-59)
    pub sec: u8,
    /// Минуты (0-59)
    pub min: u8,
    /// Часы (0-23)
    pub hour: u8,
    /// День месяца (1-31)
    pub mday: u8,
    /// Месяц (1-12)
    pub mon: u8,
    /// Полный год, например 2016
    pub year: i32,
    /// День недели
    pub wday: u8,
    /// День года (в формате хранится один байт)
    pub yday: u8,
    /// Флаг летнего времени
    pub isdst: u8,
    /// Короткий год (последние две цифры)
    pub year_s: u8,
}

impl Timestamp {
    /// Отметка без дня недели/года: то, что обычно известно хосту.
    pub fn from_ymd_hms(
        year: i32,
        mon: u8,
        mday: u8,
        hour: u8,
        min: u8,
        sec: u8,
    ) -> Self {
        Self {
            sec,
            min,
            hour,
            mday,
            mon,
            year,
            wday: 0,
            yday: 0,
            isdst: 0,
            year_s: year.rem_euclid(100) as u8,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.mon, self.mday, self.hour, self.min, self.sec
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_year_suffix() {
        let t = Timestamp::from_ymd_hms(2016, 7, 4, 9, 5, 0);
        assert_eq!(t.year_s, 16);
        assert_eq!(t.to_string(), "2016-07-04 09:05:00");
    }
}
