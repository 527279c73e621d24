//! Binding of the OCR capability to the Tesseract command-line engine.
//!
//! Each request runs `tesseract <image> stdout -l <langs>`, with the optional
//! tessdata and page segmentation settings, and turns the non-blank output
//! lines into fragments.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Instant;

use encoding_rs::UTF_8;
use regex::Regex;

use crate::config::EngineConfig;
use crate::error::{RecognizeError, StartupError};
use crate::model::recognition::{Fragment, Recognition};
use crate::services::Recognizer;

const MIN_MAJOR_VERSION: u32 = 4;
const STDERR_SNIPPET_CHARS: usize = 400;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug)]
pub struct TesseractEngine {
    config: EngineConfig,
}

impl TesseractEngine {
    /// Checks the engine version and installed languages.
    ///
    /// `banner` is what `check_executable` returned, so the executable is known to run.
    pub fn from_banner(config: EngineConfig, banner: &str) -> Result<Self, StartupError> {
        match parse_version(banner) {
            Some(v) if v.major < MIN_MAJOR_VERSION => {
                return Err(StartupError::Incompatible(format!(
                    "tesseract {}.{} found, version {MIN_MAJOR_VERSION}.0 or newer is required",
                    v.major, v.minor
                )));
            }
            Some(v) => tracing::info!(major = v.major, minor = v.minor, "found tesseract"),
            None => {
                tracing::warn!(banner = %first_line(banner), "could not read tesseract version")
            }
        }

        let installed = list_languages(&config)?;
        let missing: Vec<&str> = config
            .languages
            .iter()
            .filter(|l| !installed.iter().any(|i| i == *l))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(StartupError::ModelLoad(format!(
                "language data not installed: {} (available: {})",
                missing.join(", "),
                installed.join(", ")
            )));
        }

        tracing::info!(languages = %config.lang_arg(), psm = ?config.psm, "OCR engine loaded");
        Ok(TesseractEngine { config })
    }

    /// `[--tessdata-dir <dir>] <image> stdout -l <langs> [--psm <n>]`
    fn recognize_command(&self, path: &Path) -> Command {
        let mut cmd = command(&self.config);
        cmd.arg(image_arg(path))
            .arg("stdout")
            .arg("-l")
            .arg(self.config.lang_arg());
        if let Some(psm) = self.config.psm {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd
    }
}

impl Recognizer for TesseractEngine {
    fn recognize(&self, path: &Path) -> Result<Recognition, RecognizeError> {
        let mut cmd = self.recognize_command(path);

        let started = Instant::now();
        let output = cmd.output().map_err(|source| RecognizeError::Spawn {
            command: self.config.command.clone(),
            source,
        })?;
        let elapsed = started.elapsed();

        if !output.status.success() {
            return Err(RecognizeError::Engine {
                status: output.status.to_string(),
                stderr: snippet(&decode(&output.stderr)),
            });
        }

        let stderr = decode(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "tesseract diagnostics");
        }

        Ok(Recognition {
            fragments: fragments_from_output(&decode(&output.stdout)),
            elapsed,
        })
    }
}

/// Runs `<program> --version` and returns its banner.
///
/// A program that cannot be spawned at all is a missing dependency. This runs
/// before any other setting is looked at.
pub fn check_executable(program: &str) -> Result<String, StartupError> {
    let output = base_command(program)
        .arg("--version")
        .output()
        .map_err(|source| StartupError::MissingDependency {
            command: program.to_string(),
            source,
        })?;
    Ok(combined_text(&output))
}

fn base_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

fn command(config: &EngineConfig) -> Command {
    let mut cmd = base_command(&config.command);
    if let Some(dir) = &config.tessdata_dir {
        cmd.arg("--tessdata-dir").arg(dir);
    }
    cmd
}

/// Keeps a relative path such as `-scan.png` from being read as an option.
fn image_arg(path: &Path) -> PathBuf {
    if path.is_relative() && path.as_os_str().to_string_lossy().starts_with('-') {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

fn list_languages(config: &EngineConfig) -> Result<Vec<String>, StartupError> {
    let output = command(config)
        .arg("--list-langs")
        .output()
        .map_err(|e| StartupError::ModelLoad(format!("failed to list languages: {e}")))?;

    if !output.status.success() {
        return Err(StartupError::ModelLoad(format!(
            "`{} --list-langs` exited with {}: {}",
            config.command,
            output.status,
            snippet(&decode(&output.stderr))
        )));
    }

    Ok(parse_languages(&combined_text(&output)))
}

/// Older releases print the banner and language list on stderr.
fn combined_text(output: &Output) -> String {
    let mut text = decode(&output.stdout);
    text.push('\n');
    text.push_str(&decode(&output.stderr));
    text
}

fn decode(bytes: &[u8]) -> String {
    let (text, _, _) = UTF_8.decode(bytes);
    text.into_owned()
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > STDERR_SNIPPET_CHARS {
        let cut: String = trimmed.chars().take(STDERR_SNIPPET_CHARS).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

pub fn parse_version(banner: &str) -> Option<EngineVersion> {
    let re = Regex::new(r"(?mi)^\s*tesseract\s+v?(\d+)\.(\d+)").ok()?;
    let caps = re.captures(banner)?;
    Some(EngineVersion {
        major: caps[1].parse().ok()?,
        minor: caps[2].parse().ok()?,
    })
}

pub fn parse_languages(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !l.starts_with("List of available languages"))
        .filter(|l| !l.contains(char::is_whitespace))
        .map(str::to_string)
        .collect()
}

pub fn fragments_from_output(stdout: &str) -> Vec<Fragment> {
    stdout
        .lines()
        .map(|l| l.trim_matches(|c: char| c.is_whitespace() || c == '\u{0c}'))
        .filter(|l| !l.is_empty())
        .map(Fragment::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("tesseract 5.3.0\n leptonica-1.82.0\n", Some((5, 3)))]
    #[case("tesseract v5.0.0-alpha.20201127\n", Some((5, 0)))]
    #[case("\ntesseract 4.1.1\n", Some((4, 1)))]
    #[case("tesseract 3.05.02\n", Some((3, 5)))]
    #[case("something else entirely", None)]
    fn reads_version_banner(#[case] banner: &str, #[case] expected: Option<(u32, u32)>) {
        let got = parse_version(banner).map(|v| (v.major, v.minor));
        assert_eq!(got, expected);
    }

    #[test]
    fn reads_language_listing() {
        let listing = "List of available languages in \"/usr/share/tessdata/\" (3):\n\
                       chi_sim\neng\nosd\n\n";
        assert_eq!(parse_languages(listing), vec!["chi_sim", "eng", "osd"]);
    }

    #[test]
    fn blank_and_form_feed_lines_are_dropped() {
        let out = "Invoice 42\n\n  Total: 10 EUR  \n\u{0c}";
        let texts: Vec<String> = fragments_from_output(out).into_iter().map(|f| f.text).collect();
        assert_eq!(texts, vec!["Invoice 42", "Total: 10 EUR"]);
    }

    #[test]
    fn empty_output_yields_no_fragments() {
        assert!(fragments_from_output("\n\u{0c}").is_empty());
    }

    #[test]
    fn dash_prefixed_relative_paths_are_anchored() {
        assert_eq!(image_arg(Path::new("-scan.png")), PathBuf::from("./-scan.png"));
        assert_eq!(image_arg(Path::new("scan.png")), PathBuf::from("scan.png"));
        assert_eq!(image_arg(Path::new("/tmp/-scan.png")), PathBuf::from("/tmp/-scan.png"));
    }

    #[test]
    fn tessdata_dir_leads_and_psm_trails_the_recognize_arguments() {
        let engine = TesseractEngine {
            config: EngineConfig {
                command: "tesseract".to_string(),
                languages: vec!["chi_sim".to_string(), "eng".to_string()],
                psm: Some(6),
                tessdata_dir: Some(PathBuf::from("/opt/tessdata")),
            },
        };

        let cmd = engine.recognize_command(Path::new("shot.png"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "--tessdata-dir",
                "/opt/tessdata",
                "shot.png",
                "stdout",
                "-l",
                "chi_sim+eng",
                "--psm",
                "6"
            ]
        );
    }

    #[test]
    fn default_recognize_arguments() {
        let engine = TesseractEngine {
            config: EngineConfig::default(),
        };

        let cmd = engine.recognize_command(Path::new("-shot.png"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let anchored = Path::new(".").join("-shot.png");
        assert_eq!(
            args,
            vec![anchored.to_string_lossy().as_ref(), "stdout", "-l", "eng"]
        );
    }

    #[test]
    fn snippet_truncates_long_stderr() {
        let long = "x".repeat(STDERR_SNIPPET_CHARS + 10);
        let s = snippet(&long);
        assert_eq!(s.len(), STDERR_SNIPPET_CHARS + 3);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn unreachable_program_is_a_missing_dependency() {
        let err = check_executable("ocr-core-test-no-such-binary").unwrap_err();
        assert!(matches!(err, StartupError::MissingDependency { .. }));
        assert_eq!(err.exit_code(), std::process::ExitCode::from(1));
    }

    #[test]
    fn old_banner_is_incompatible() {
        let err = TesseractEngine::from_banner(EngineConfig::default(), "tesseract 3.05.02\n")
            .unwrap_err();
        assert!(matches!(err, StartupError::Incompatible(_)));
    }
}
