use std::path::Path;

use console::{Emoji, style};
use mime_guess::{MimeGuess, mime};
use vdrive::vfs::VfsPath;

use crate::error::{Result, VdriveCliError};

static DISC: Emoji<'_, '_> = Emoji("💿 ", "");
static OK: Emoji<'_, '_> = Emoji("✅ ", "[ok] ");
static FAIL: Emoji<'_, '_> = Emoji("❌ ", "[error] ");
static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "[info] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️ ", "[warn] ");

const BANNER_WIDTH: usize = 40;

pub fn print_welcome() {
    let border = "═".repeat(BANNER_WIDTH);
    println!("{}", style(format!("╔{border}╗")).cyan());
    for line in [format!("{DISC}VDRIVE"), "Virtual drives and media library".to_string()] {
        println!("{}", style(format!("║{line:^BANNER_WIDTH$}║")).cyan());
    }
    println!("{}", style(format!("╚{border}╝")).cyan());
    println!();
    println!("Pick an action below. Paths look like C:\\Users\\Docs or D:/Pictures.");
}

pub fn print_success(message: &str) {
    println!("{OK}{}", style(message).green());
}

pub fn print_error(message: &str) {
    eprintln!("{FAIL}{}", style(message).red());
}

pub fn print_info(message: &str) {
    println!("{INFO}{}", style(message).blue());
}

pub fn print_warning(message: &str) {
    println!("{WARN}{}", style(message).yellow());
}

/// Byte count as shown in the library: whole bytes, then one decimal.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b < KB => format!("{b} B"),
        b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{:.1} MB", b as f64 / MB as f64),
    }
}

pub fn print_separator() {
    println!("{}", style("─".repeat(BANNER_WIDTH + 2)).dim());
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", style(title).bold().cyan());
    print_separator();
}

pub fn parse_path(input: &str) -> Result<VfsPath> {
    VfsPath::parse(input).map_err(|e| VdriveCliError::Input(e.to_string()))
}

/// Splits `C:\Docs\a.txt` into the folder path and the file name.
pub fn split_file_path(input: &str) -> Result<(VfsPath, String)> {
    let full = parse_path(input)?;
    match (full.parent(), full.segments().last()) {
        (Some(parent), Some(name)) => Ok((parent, name.clone())),
        _ => Err(VdriveCliError::Input(format!(
            "{input} names a drive, not a file"
        ))),
    }
}

pub fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| VdriveCliError::Input(format!("{} has no file name", path.display())))
}

/// Scripts the library only catalogues as code when their MIME type is not `text/*`.
const SCRIPT_EXTENSIONS: &[&str] = &["js", "py"];

/// MIME type of a local file, from its extension.
pub fn guess_mime(name: &str) -> String {
    let mime = MimeGuess::from_path(name).first_or_octet_stream();
    let is_script = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext.as_str()));

    if is_script && mime.type_() == mime::TEXT {
        format!("application/{}", mime.subtype())
    } else {
        mime.essence_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdrive::session::UploadKind;

    #[test]
    fn test_split_file_path() {
        let (folder, name) = split_file_path(r"C:\Docs\a.txt").unwrap();
        assert_eq!(folder.to_string(), r"C:\Docs");
        assert_eq!(name, "a.txt");
        assert!(split_file_path(r"C:\").is_err());
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("photo.JPG"), "image/jpeg");
        assert_eq!(guess_mime("notes.txt"), "text/plain");
        assert_eq!(guess_mime("data.json"), "application/json");
        assert_eq!(guess_mime("Makefile"), "application/octet-stream");
    }

    #[test]
    fn test_guess_mime_catalogues_scripts_as_code() {
        for (name, language) in [("main.py", "py"), ("app.JS", "js")] {
            let mime = guess_mime(name);
            assert!(!mime.starts_with("text/"), "{name}: {mime}");
            assert_eq!(
                UploadKind::classify(name, &mime),
                Some(UploadKind::Code {
                    language: language.to_string()
                })
            );
        }
        assert_eq!(
            UploadKind::classify("page.html", &guess_mime("page.html")),
            Some(UploadKind::Text)
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3000), "2.9 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
