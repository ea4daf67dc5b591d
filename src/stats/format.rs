use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unsupported display format '{0}': expected %s, %Ns or %-Ns")]
pub struct FormatError(pub String);

/// printf-style column format for a single string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFormat {
    width: usize,
    left_align: bool,
}

impl DisplayFormat {
    pub const fn new(width: usize, left_align: bool) -> Self {
        Self { width, left_align }
    }

    /// Pad `value` to the column width. Values longer than the width are
    /// never truncated.
    pub fn apply(&self, value: &str) -> String {
        if self.left_align {
            format!("{:<width$}", value, width = self.width)
        } else {
            format!("{:>width$}", value, width = self.width)
        }
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::new(20, true)
    }
}

impl FromStr for DisplayFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FormatError(s.to_string());

        let spec = s
            .strip_prefix('%')
            .and_then(|rest| rest.strip_suffix('s'))
            .ok_or_else(err)?;

        let (left_align, digits) = match spec.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, spec),
        };

        let width = if digits.is_empty() {
            0
        } else {
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            digits.parse().map_err(|_| err())?
        };

        Ok(Self::new(width, left_align))
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.left_align, self.width) {
            (_, 0) => write!(f, "%s"),
            (true, w) => write!(f, "%-{}s", w),
            (false, w) => write!(f, "%{}s", w),
        }
    }
}
