use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{RecorderError, RecorderResult};

/// Номеров `DATA-NNN.SRK` до перехода на `DATA-MAX.SRK`.
pub const MAX_FILE_INDEX: u16 = 255;

/// Имя файла для номера `n` (`DATA-007.SRK`).
pub fn data_file_name(n: u16) -> String {
    format!("DATA-{n:03}.SRK")
}

/// Выбирает первый свободный `DATA-NNN.SRK` в `dir` (000..254).
///
/// Если все номера заняты, возвращает `DATA-MAX.SRK` (даже если он уже
/// существует). Недоступный каталог - [`RecorderError::StorageUnavailable`].
pub fn allocate_file_name(dir: &Path) -> RecorderResult<PathBuf> {
    let unavailable = |reason: String| RecorderError::StorageUnavailable {
        path: dir.to_path_buf(),
        reason,
    };

    let meta = fs::metadata(dir).map_err(|e| unavailable(e.to_string()))?;

    if !meta.is_dir() {
        return Err(unavailable("not a directory".to_string()));
    }

    if meta.permissions().readonly() {
        return Err(unavailable("read-only".to_string()));
    }

    for n in 0..MAX_FILE_INDEX {
        let candidate = dir.join(data_file_name(n));
        if !candidate.exists() {
            debug!("allocated {candidate:?}");
            return Ok(candidate);
        }
    }

    Ok(dir.join("DATA-MAX.SRK"))
}
