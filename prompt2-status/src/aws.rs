//! AWS SSO login token status.
//!
//! The AWS CLI caches SSO tokens as JSON files under `~/.aws/sso/cache`.
//! The most recently written file is taken to be the active session and
//! its `expiresAt` timestamp decides whether the token is still valid.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use prompt2_core::state::AwsState;

use crate::error::{StatusError, StatusResult};

/// Token cache location relative to the home directory.
pub const SSO_CACHE_DIR: &str = ".aws/sso/cache";

const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_MINUTE: i64 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedToken {
    expires_at: String,
}

/// Token state for the SSO cache under `home`, as of now.
pub fn inspect_sso_cache(home: &Path) -> AwsState {
    inspect_sso_cache_at(home, Utc::now())
}

/// Token state for the SSO cache under `home`, as of `now`.
pub fn inspect_sso_cache_at(home: &Path, now: DateTime<Utc>) -> AwsState {
    let dir = home.join(SSO_CACHE_DIR);
    let newest = match newest_file(&dir) {
        Ok(Some(path)) => path,
        Ok(None) => {
            debug!("No cached SSO token in {:?}", dir);
            return expired();
        }
        Err(err) => {
            warn!("Could not scan {:?}: {}", dir, err);
            return AwsState::default();
        }
    };

    match read_expiry(&newest) {
        Ok(expires_at) => remaining_from(expires_at, now),
        Err(err) => {
            warn!("Could not read SSO token {:?}: {}", newest, err);
            AwsState::default()
        }
    }
}

/// Validity and time left on a token expiring at `expires_at`.
pub fn remaining_from(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> AwsState {
    let seconds = (expires_at - now).num_seconds();
    if seconds <= 0 {
        return expired();
    }
    AwsState {
        token_is_valid: 1,
        token_remaining_hours: clamp(seconds / SECONDS_PER_HOUR),
        token_remaining_minutes: clamp(seconds % SECONDS_PER_HOUR / SECONDS_PER_MINUTE),
    }
}

/// Parse an `expiresAt` value such as `2024-05-01T12:00:00Z`.
pub fn parse_expiry(value: &str) -> StatusResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    // Older CLI versions write a bare UTC suffix
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SUTC")
        .map(|naive| naive.and_utc())
        .map_err(|_| StatusError::InvalidExpiry(value.to_string()))
}

fn expired() -> AwsState {
    AwsState {
        token_is_valid: 0,
        token_remaining_hours: 0,
        token_remaining_minutes: 0,
    }
}

fn clamp(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Most recently modified regular file in `dir`, if any.
fn newest_file(dir: &Path) -> StatusResult<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut newest = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

fn read_expiry(path: &Path) -> StatusResult<DateTime<Utc>> {
    let content = fs::read_to_string(path)?;
    let token: CachedToken = serde_json::from_str(&content)?;
    parse_expiry(&token.expires_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn cache_dir(home: &Path) -> PathBuf {
        let dir = home.join(SSO_CACHE_DIR);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_token(dir: &Path, name: &str, body: &str, age: Duration) {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_remaining_from() {
        let expires = Utc.with_ymd_and_hms(2024, 5, 1, 12, 15, 30).unwrap();
        assert_eq!(
            remaining_from(expires, now()),
            AwsState {
                token_is_valid: 1,
                token_remaining_hours: 2,
                token_remaining_minutes: 45,
            }
        );
        assert_eq!(remaining_from(now(), now()), expired());
        assert_eq!(
            remaining_from(now() - chrono::Duration::hours(1), now()),
            expired()
        );
    }

    #[test]
    fn test_parse_expiry_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_expiry("2024-05-01T12:00:00Z").unwrap(), expected);
        assert_eq!(parse_expiry("2024-05-01T12:00:00UTC").unwrap(), expected);
        assert_eq!(parse_expiry("2024-05-01T14:00:00+02:00").unwrap(), expected);
        assert!(matches!(
            parse_expiry("tomorrow"),
            Err(StatusError::InvalidExpiry(_))
        ));
    }

    #[test]
    fn test_missing_cache_is_expired() {
        let home = TempDir::new().unwrap();
        assert_eq!(inspect_sso_cache_at(home.path(), now()), expired());

        cache_dir(home.path());
        assert_eq!(inspect_sso_cache_at(home.path(), now()), expired());
    }

    #[test]
    fn test_newest_token_wins() {
        let home = TempDir::new().unwrap();
        let dir = cache_dir(home.path());
        write_token(
            &dir,
            "old.json",
            r#"{"expiresAt": "2024-05-01T08:00:00Z"}"#,
            Duration::from_secs(3600),
        );
        write_token(
            &dir,
            "new.json",
            r#"{"startUrl": "https://example.awsapps.com/start", "expiresAt": "2024-05-01T09:35:00Z"}"#,
            Duration::from_secs(0),
        );

        assert_eq!(
            inspect_sso_cache_at(home.path(), now()),
            AwsState {
                token_is_valid: 1,
                token_remaining_hours: 0,
                token_remaining_minutes: 5,
            }
        );
    }

    #[test]
    fn test_unreadable_token_is_unknown() {
        let home = TempDir::new().unwrap();
        let dir = cache_dir(home.path());
        write_token(&dir, "broken.json", "{not json", Duration::from_secs(0));
        assert_eq!(inspect_sso_cache_at(home.path(), now()), AwsState::default());

        write_token(
            &dir,
            "noexpiry.json",
            r#"{"clientId": "abc"}"#,
            Duration::from_secs(0),
        );
        let state = inspect_sso_cache_at(home.path(), now());
        assert_eq!(state.token_is_valid, -1);
    }
}
