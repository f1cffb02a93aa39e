//! Requested output format and the decoder flags it maps to.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vg_core::Error;

/// The caller's desired output format.
///
/// The decoder decides the actual container; this only selects the flag set
/// passed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Audio-only extraction (mp3).
    Audio,
    /// Full video download (mp4 preferred).
    Video,
}

impl MediaFormat {
    /// File extension used when a filename has to be synthesized (the proxy
    /// backend; the local backend always discovers the real extension).
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Audio => "mp3",
            MediaFormat::Video => "mp4",
        }
    }

    /// Decoder arguments for this format, with output directed at
    /// `output_template` and `source_url` last.
    pub fn decoder_args(&self, output_template: &Path, source_url: &str) -> Vec<String> {
        let mut args: Vec<String> = vec!["--no-playlist".into()];
        match self {
            MediaFormat::Audio => {
                args.extend([
                    "--extract-audio".into(),
                    "--audio-format".into(),
                    "mp3".into(),
                ]);
            }
            MediaFormat::Video => {
                args.extend(["--format".into(), "mp4".into()]);
            }
        }
        args.extend([
            "--output".into(),
            output_template.to_string_lossy().into_owned(),
            source_url.into(),
        ]);
        args
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFormat::Audio => write!(f, "audio"),
            MediaFormat::Video => write!(f, "video"),
        }
    }
}

impl FromStr for MediaFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(MediaFormat::Audio),
            "video" => Ok(MediaFormat::Video),
            other => Err(Error::InvalidRequest(format!(
                "unsupported format '{other}' (expected 'audio' or 'video')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_supported_formats() {
        assert_eq!("audio".parse::<MediaFormat>().unwrap(), MediaFormat::Audio);
        assert_eq!("video".parse::<MediaFormat>().unwrap(), MediaFormat::Video);
    }

    #[test]
    fn rejects_unsupported_formats() {
        let err = "flac".parse::<MediaFormat>().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!("".parse::<MediaFormat>().is_err());
        assert!("Audio".parse::<MediaFormat>().is_err());
    }

    #[test]
    fn audio_args_extract_audio() {
        let template = PathBuf::from("/tmp/job/%(title)s.%(ext)s");
        let args = MediaFormat::Audio.decoder_args(&template, "https://youtu.be/abc12345678");
        assert!(args.contains(&"--extract-audio".to_string()));
        assert_eq!(args.last().unwrap(), "https://youtu.be/abc12345678");
        let out_idx = args.iter().position(|a| a == "--output").unwrap();
        assert_eq!(args[out_idx + 1], "/tmp/job/%(title)s.%(ext)s");
    }

    #[test]
    fn video_args_prefer_mp4() {
        let template = PathBuf::from("/tmp/job/%(title)s.%(ext)s");
        let args = MediaFormat::Video.decoder_args(&template, "https://youtu.be/abc12345678");
        let fmt_idx = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(args[fmt_idx + 1], "mp4");
        assert!(!args.contains(&"--extract-audio".to_string()));
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&MediaFormat::Audio).unwrap(),
            "\"audio\""
        );
        let parsed: MediaFormat = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(parsed, MediaFormat::Video);
    }
}
