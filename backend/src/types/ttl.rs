use chrono::Duration;

/// Longest lifetime a check-in token may be configured with (one day).
pub const MAX_TOKEN_TTL_SECS: i64 = 86_400;

/// Lifetime of a minted token. Always strictly positive and at most
/// [`MAX_TOKEN_TTL_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl(Duration);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTtl {
    #[error("token TTL must be a positive number of seconds, got {0}")]
    NonPositive(i64),
    #[error("token TTL must be at most {max} seconds, got {secs}")]
    TooLong { secs: i64, max: i64 },
}

impl TokenTtl {
    pub fn from_secs(secs: i64) -> Result<Self, InvalidTtl> {
        if secs <= 0 {
            return Err(InvalidTtl::NonPositive(secs));
        }
        if secs > MAX_TOKEN_TTL_SECS {
            return Err(InvalidTtl::TooLong {
                secs,
                max: MAX_TOKEN_TTL_SECS,
            });
        }
        Duration::try_seconds(secs)
            .map(Self)
            .ok_or(InvalidTtl::TooLong {
                secs,
                max: MAX_TOKEN_TTL_SECS,
            })
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs(&self) -> i64 {
        self.0.num_seconds()
    }
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self(Duration::seconds(30))
    }
}
