// Raw CSV grid read/write

use std::io::Read;
use std::path::Path;

pub type Grid = Vec<Vec<String>>;

/// Read file and convert to UTF-8 if needed (sheets re-saved from Excel are
/// often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Every record of the file, header included. Rows may differ in width.
pub fn read_grid(path: &Path) -> Result<Grid, String> {
    let content = read_file_as_utf8(path)?;
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// Replace `path` with `grid`. Written to a sibling `.tmp` first, then renamed,
/// so a failed write leaves the previous file intact.
pub fn write_grid(path: &Path, grid: &Grid) -> Result<(), String> {
    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = ::csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&tmp_path)
            .map_err(|e| e.to_string())?;
        for row in grid {
            writer.write_record(row).map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())?;
    }
    std::fs::rename(&tmp_path, path)
        .map_err(|e| format!("failed to rename tmp to output: {}", e))
}
