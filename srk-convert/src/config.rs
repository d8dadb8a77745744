use std::path::PathBuf;

use srk_core::ExportFormat;

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Входной `.SRK` файл
    pub input_path: PathBuf,
    /// Таблица; `None` - рядом со входом, с расширением формата
    pub output_path: Option<PathBuf>,
    pub format: ExportFormat,
    /// JSON с описанием заголовка
    pub header_path: Option<PathBuf>,
    /// Вычитать bias гироскопа из заголовка
    pub apply_gyro_bias: bool,
}

impl ConvertConfig {
    fn new() -> Self {
        Self {
            input_path: PathBuf::from("DATA-000.SRK"),
            output_path: None,
            format: ExportFormat::Csv,
            header_path: None,
            apply_gyro_bias: false,
        }
    }

    /// Итоговый путь таблицы.
    pub fn resolved_output(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.input_path.with_extension(self.format.extension()))
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::new()
    }
}
