//! Библиотека основного формата SRK
//!
//! Эталонная реализация формата файлов телеметрии носимой метки:
//! упаковка 12-битных выборок акселерометра, заголовок файла, секции
//! `ACCL` / `GYRO` / `GSKP` / `LONG` и потоковый разбор на стороне хоста.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use srk_core::{SampleBuffer, SrkReader, SrkWriter};
//! use srk_types::{DeviceIdentity, FileHeader};
//! use std::fs::File;
//!
//! let header = FileHeader::new(&DeviceIdentity::default(), 2, 2, 0);
//! let mut writer = SrkWriter::new(File::create("DATA-000.SRK")?, header)?;
//!
//! let mut accel = SampleBuffer::new(2);
//! accel.push(0, 0, 1024)?;
//! accel.push(0, 0, 1023)?;
//! writer.write_cycle(&mut accel, None, None)?;
//! writer.finish()?;
//!
//! for record in SrkReader::new(File::open("DATA-000.SRK")?)? {
//!     println!("{:?}", record?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod buffer;
pub mod codec;
pub mod export;
pub mod format;
pub mod serialization;

pub use binary::*;
pub use buffer::*;
pub use codec::*;
pub use export::*;
pub use format::*;
pub use serialization::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
