//! Filename classification for screenshots and screen recordings.
//!
//! A name is organizable when it follows the capture naming scheme used by the
//! system screenshot tool, e.g. `Screenshot 2024-05-01 at 10.30.00.png` or
//! `Screen Recording 2023-06-02 at 9.00.00 AM.mov`. Only the text of the name
//! is inspected; file content and metadata are never read.
//!
//! # Examples
//!
//! ```
//! use screenshot_organizer::classifier::{Category, classify};
//!
//! let shot = classify("Screenshot 2023-01-15 at 10.30.00.png").unwrap();
//! assert_eq!(shot.category, Category::Screenshot);
//! assert_eq!(shot.year, "2023");
//! assert_eq!(shot.month, "01");
//!
//! assert!(classify("notes.txt").is_none());
//! ```

use crate::error::{OrganizerError, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::LazyLock;

static SCREENSHOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Screenshot ([0-9]{4})-([0-9]{2})-([0-9]{2}) at .+\.png$")
        .unwrap_or_else(|e| panic!("screenshot pattern must compile: {e}"))
});

static RECORDING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Screen Recording ([0-9]{4})-([0-9]{2})-([0-9]{2}) at .+\.mov$")
        .unwrap_or_else(|e| panic!("recording pattern must compile: {e}"))
});

/// The kind of capture a file represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Still screenshots (`.png`).
    Screenshot,
    /// Screen recordings (`.mov`).
    ScreenRecording,
}

impl Category {
    /// Returns the subfolder of the organized root this category lives under,
    /// if any. Screenshots sit directly under the root.
    ///
    /// ```
    /// use screenshot_organizer::classifier::Category;
    ///
    /// assert_eq!(Category::Screenshot.subfolder(), None);
    /// assert_eq!(Category::ScreenRecording.subfolder(), Some("recordings"));
    /// ```
    pub fn subfolder(&self) -> Option<&'static str> {
        match self {
            Category::Screenshot => None,
            Category::ScreenRecording => Some("recordings"),
        }
    }

    /// Returns a human-readable description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Screenshot => "screenshot",
            Category::ScreenRecording => "screen recording",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Category::Screenshot => &SCREENSHOT_PATTERN,
            Category::ScreenRecording => &RECORDING_PATTERN,
        }
    }
}

/// Where an organizable file belongs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Four-digit year taken from the name.
    pub year: String,
    /// Two-digit month taken from the name.
    pub month: String,
}

impl Classification {
    /// Returns the destination folder relative to the organized root,
    /// i.e. `YYYY/MM` or `recordings/YYYY/MM`.
    pub fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::new();
        if let Some(subfolder) = self.category.subfolder() {
            dir.push(subfolder);
        }
        dir.push(&self.year);
        dir.push(&self.month);
        dir
    }
}

/// Classifies a filename, treating malformed dates as "not organizable".
pub fn classify(file_name: &str) -> Option<Classification> {
    try_classify(file_name).ok().flatten()
}

/// Classifies a filename.
///
/// Returns `Ok(None)` when the name matches neither capture pattern, and
/// `Err(OrganizerError::InvalidScreenshot)` when it matches a pattern but the
/// captured date is not a real calendar date (e.g. month `13`).
pub fn try_classify(file_name: &str) -> Result<Option<Classification>> {
    for category in [Category::Screenshot, Category::ScreenRecording] {
        let Some(captures) = category.pattern().captures(file_name) else {
            continue;
        };

        let invalid = || OrganizerError::InvalidScreenshot {
            name: file_name.to_string(),
        };
        let year = captures.get(1).ok_or_else(invalid)?.as_str();
        let month = captures.get(2).ok_or_else(invalid)?.as_str();
        let day = captures.get(3).ok_or_else(invalid)?.as_str();

        let parsed = (
            year.parse::<i32>(),
            month.parse::<u32>(),
            day.parse::<u32>(),
        );
        let (Ok(y), Ok(m), Ok(d)) = parsed else {
            return Err(invalid());
        };
        if NaiveDate::from_ymd_opt(y, m, d).is_none() {
            return Err(invalid());
        }

        return Ok(Some(Classification {
            category,
            year: year.to_string(),
            month: month.to_string(),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_screenshot_names_classify_with_year_and_month() {
        for (name, year, month) in [
            ("Screenshot 2023-01-15 at 10.30.00.png", "2023", "01"),
            ("Screenshot 2024-05-01 at noon.png", "2024", "05"),
            ("Screenshot 1999-12-31 at 23.59.59 (2).png", "1999", "12"),
        ] {
            let classification = classify(name).expect(name);
            assert_eq!(classification.category, Category::Screenshot);
            assert_eq!(classification.year, year);
            assert_eq!(classification.month, month);
        }
    }

    #[test]
    fn test_recording_names_classify_as_screen_recording() {
        let classification =
            classify("Screen Recording 2023-06-02 at 9.00.00 AM.mov").expect("recording");
        assert_eq!(
            classification,
            Classification {
                category: Category::ScreenRecording,
                year: "2023".to_string(),
                month: "06".to_string(),
            }
        );
    }

    #[test]
    fn test_non_matching_names_are_not_organizable() {
        for name in [
            "notes.txt",
            "Screenshot 2023-01-15 at 10.30.00.jpg",
            "Screenshot 2023-01-15 at 10.30.00.PNG",
            "screenshot 2023-01-15 at 10.30.00.png",
            "Screenshot 23-01-15 at 10.30.00.png",
            "Screenshot 2023-1-15 at 10.30.00.png",
            "Screenshot 2023-01-15.png",
            "Screenshot 2023-01-15 at .png",
            "My Screenshot 2023-01-15 at 10.30.00.png",
            "Screenshot 2023-01-15 at 10.30.00.png.bak",
            "Screen Recording 2023-06-02 at 9.00.00 AM.png",
            "Screenshot 2023-06-02 at 9.00.00 AM.mov",
            "Screenshot ２０２３-01-15 at 10.30.00.png",
        ] {
            assert_eq!(classify(name), None, "{name} should not classify");
        }
    }

    #[test]
    fn test_impossible_date_is_invalid_screenshot() {
        let result = try_classify("Screenshot 2023-13-40 at 10.30.00.png");
        assert!(matches!(
            result,
            Err(OrganizerError::InvalidScreenshot { .. })
        ));
        assert_eq!(classify("Screenshot 2023-02-30 at 10.30.00.png"), None);
    }

    #[test]
    fn test_unrelated_name_is_ok_none() {
        assert!(matches!(try_classify("IMG_0001.png"), Ok(None)));
    }

    #[test]
    fn test_relative_dir_per_category() {
        let shot = classify("Screenshot 2024-05-01 at noon.png").expect("screenshot");
        assert_eq!(shot.relative_dir(), Path::new("2024").join("05"));

        let recording =
            classify("Screen Recording 2024-05-01 at noon.mov").expect("recording");
        assert_eq!(
            recording.relative_dir(),
            Path::new("recordings").join("2024").join("05")
        );
    }
}
