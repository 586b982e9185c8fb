//! CLI-specific utilities for douyin-dl
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

use std::io::{BufRead, Write};
use std::path::Path;
use douyin_dl::Result;

pub mod menu;
pub mod progress;

pub use menu::Menu;
pub use progress::ProgressManager;

/// Ask whether an existing destination file may be replaced
pub fn confirm_overwrite<R: BufRead, W: Write>(
    file_path: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    writeln!(output, "⚠️  File already exists: {}", file_path.display())?;
    write!(output, "Overwrite? [y/N]: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => {
            writeln!(output, "✅ Overwriting file")?;
            Ok(true)
        }
        _ => {
            writeln!(output, "❌ Download cancelled")?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_confirm_overwrite_answers() {
        let path = Path::new("downloads/video_1.mp4");
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("", false)] {
            let mut output = Vec::new();
            let confirmed =
                confirm_overwrite(path, &mut Cursor::new(answer), &mut output).unwrap();
            assert_eq!(confirmed, expected, "answer {answer:?}");
            assert!(String::from_utf8(output).unwrap().contains("video_1.mp4"));
        }
    }
}
