//! Primitive value codecs: timestamps and attachment mime types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use super::error::DecodeError;

// ============================================================================
// Dates
// ============================================================================

/// Parses a JSON Feed timestamp (`2020-05-29T23:30:03Z`,
/// `2020-05-29T19:30:03-04:00`, fractional seconds allowed).
///
/// The instant is normalized to UTC. Returns `None` for anything that is not
/// RFC 3339; callers decide on the fallback.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Formats an instant the single way this crate writes timestamps: whole
/// seconds, UTC, `Z` suffix.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn serialize_date<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(date))
}

pub(crate) fn serialize_optional_date<S: Serializer>(
    date: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serialize_date(date, serializer),
        None => serializer.serialize_none(),
    }
}

// ============================================================================
// Mime types
// ============================================================================

/// The audio and video formats an attachment may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    AudioWav,
    AudioWebm,
    VideoWebm,
    AudioOgg,
    VideoOgg,
    AudioMp4,
    VideoMp4,
    AudioMpeg,
    AudioFlac,
    AudioAac,
}

impl MimeType {
    pub const ALL: [MimeType; 10] = [
        MimeType::AudioWav,
        MimeType::AudioWebm,
        MimeType::VideoWebm,
        MimeType::AudioOgg,
        MimeType::VideoOgg,
        MimeType::AudioMp4,
        MimeType::VideoMp4,
        MimeType::AudioMpeg,
        MimeType::AudioFlac,
        MimeType::AudioAac,
    ];

    /// Canonical wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            MimeType::AudioWav => "audio/wav",
            MimeType::AudioWebm => "audio/webm",
            MimeType::VideoWebm => "video/webm",
            MimeType::AudioOgg => "audio/ogg",
            MimeType::VideoOgg => "video/ogg",
            MimeType::AudioMp4 => "audio/mp4",
            MimeType::VideoMp4 => "video/mp4",
            MimeType::AudioMpeg => "audio/mpeg",
            MimeType::AudioFlac => "audio/flac",
            MimeType::AudioAac => "audio/aac",
        }
    }

    pub fn is_audio(self) -> bool {
        self.as_str().starts_with("audio/")
    }

    pub fn is_video(self) -> bool {
        !self.is_audio()
    }
}

impl FromStr for MimeType {
    type Err = DecodeError;

    /// Accepts the canonical spellings case-insensitively, ignores media-type
    /// parameters (`audio/ogg; codecs=opus`) and maps a few common aliases.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        let normalized = essence.to_ascii_lowercase();

        let canonical = match normalized.as_str() {
            "audio/mp3" | "audio/mpeg3" | "audio/x-mpeg" => "audio/mpeg",
            "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "audio/wav",
            "audio/x-flac" => "audio/flac",
            "audio/x-aac" => "audio/aac",
            other => other,
        };

        MimeType::ALL
            .into_iter()
            .find(|mime| mime.as_str() == canonical)
            .ok_or_else(|| DecodeError::UnknownMimeType(raw.to_string()))
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MimeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_utc_date() {
        let parsed = parse_date("2020-05-29T23:30:03Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 5, 29, 23, 30, 3).unwrap());
    }

    #[test]
    fn test_parse_offset_date_normalizes_to_utc() {
        let parsed = parse_date("2020-05-29T19:30:03-04:00").unwrap();
        assert_eq!(format_date(&parsed), "2020-05-29T23:30:03Z");
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_date("2020-05-29T23:30:03.250+00:00").unwrap();
        assert_eq!(format_date(&parsed), "2020-05-29T23:30:03Z");
    }

    #[test]
    fn test_malformed_dates_rejected() {
        for raw in [
            "",
            "yesterday",
            "2020-05-29",
            "29/05/2020 23:30",
            "Fri, 29 May 2020 23:30:03 GMT",
            "2020-13-01T00:00:00Z",
        ] {
            assert!(parse_date(raw).is_none(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn test_format_is_stable() {
        let date = Utc.with_ymd_and_hms(2019, 8, 27, 9, 5, 0).unwrap();
        assert_eq!(format_date(&date), "2019-08-27T09:05:00Z");
        assert_eq!(parse_date(&format_date(&date)), Some(date));
    }

    #[test]
    fn test_every_canonical_mime_type_parses() {
        for mime in MimeType::ALL {
            assert_eq!(mime.as_str().parse::<MimeType>().unwrap(), mime);
        }
    }

    #[test]
    fn test_mime_type_normalization() {
        assert_eq!("AUDIO/MPEG".parse::<MimeType>().unwrap(), MimeType::AudioMpeg);
        assert_eq!(" video/mp4 ".parse::<MimeType>().unwrap(), MimeType::VideoMp4);
        assert_eq!(
            "audio/ogg; codecs=opus".parse::<MimeType>().unwrap(),
            MimeType::AudioOgg
        );
        assert_eq!("audio/mp3".parse::<MimeType>().unwrap(), MimeType::AudioMpeg);
        assert_eq!("audio/x-wav".parse::<MimeType>().unwrap(), MimeType::AudioWav);
    }

    #[test]
    fn test_unknown_mime_type_rejected() {
        let err = "application/unknown".parse::<MimeType>().unwrap_err();
        assert!(matches!(err, DecodeError::UnknownMimeType(ref raw) if raw == "application/unknown"));
        assert!("image/png".parse::<MimeType>().is_err());
        assert!("".parse::<MimeType>().is_err());
    }

    #[test]
    fn test_audio_video_split() {
        assert!(MimeType::AudioFlac.is_audio());
        assert!(MimeType::VideoWebm.is_video());
        assert!(!MimeType::VideoOgg.is_audio());
    }
}
