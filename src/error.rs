pub type VfxResult<T> = Result<T, VfxError>;

#[derive(thiserror::Error, Debug)]
pub enum VfxError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("curve error: {0}")]
    Curve(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VfxError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn curve(msg: impl Into<String>) -> Self {
        Self::Curve(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            VfxError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(VfxError::curve("x").to_string().contains("curve error:"));
        assert!(VfxError::store("x").to_string().contains("store error:"));
        assert!(
            VfxError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn io_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = VfxError::Io(base);
        assert!(err.to_string().contains("boom"));
    }
}
