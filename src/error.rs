use thiserror::Error;

/// Exit status for a bad invocation. Matches what clap uses on its own, and
/// no `EndgetError` kind shares it.
pub const USAGE_EXIT_CODE: u8 = 2;

/// Everything that can stop an install. Each kind maps to its own exit code so
/// wrapper scripts can tell a missing program from a crashed one.
#[derive(Debug, Error)]
pub enum EndgetError {
    #[error("could not reach the program catalog: {0}")]
    Network(String),

    #[error("catalog response was not a file listing: {0}")]
    Parse(String),

    #[error("program '{0}' not found in the repository")]
    NotFound(String),

    #[error("could not fetch script from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("script for '{program}' failed: {reason}")]
    Execution { program: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EndgetError {
    pub fn exit_code(&self) -> u8 {
        match self {
            EndgetError::Config(_) => 8,
            EndgetError::Network(_) => 3,
            EndgetError::Parse(_) => 4,
            EndgetError::NotFound(_) => 5,
            EndgetError::Fetch { .. } => 6,
            EndgetError::Execution { .. } => 7,
        }
    }
}

pub type Result<T> = std::result::Result<T, EndgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let errors = [
            EndgetError::Config("x".into()),
            EndgetError::Network("x".into()),
            EndgetError::Parse("x".into()),
            EndgetError::NotFound("x".into()),
            EndgetError::Fetch {
                url: "x".into(),
                reason: "x".into(),
            },
            EndgetError::Execution {
                program: "x".into(),
                reason: "x".into(),
            },
        ];
        let mut codes: Vec<u8> = errors.iter().map(EndgetError::exit_code).collect();
        codes.push(USAGE_EXIT_CODE);
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len() + 1);
    }

    #[test]
    fn not_found_message_names_the_program() {
        let err = EndgetError::NotFound("baz".into());
        assert_eq!(err.to_string(), "program 'baz' not found in the repository");
    }
}
