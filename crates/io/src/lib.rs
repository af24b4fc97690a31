// Sheet storage backends

pub mod csv;
pub mod workbook;

pub use workbook::CsvWorkbook;
