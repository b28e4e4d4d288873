use structwire_core::ProtocolError;

/// Upper bounds on declared lengths accepted while reading. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolLimits {
    pub string_limit: Option<usize>,
    pub container_limit: Option<usize>,
}

impl ProtocolLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Maximum byte length of a string or binary value.
    pub fn with_string_limit(mut self, limit: usize) -> Self {
        self.string_limit = Some(limit);
        self
    }

    /// Maximum element count of a list, set, or map.
    pub fn with_container_limit(mut self, limit: usize) -> Self {
        self.container_limit = Some(limit);
        self
    }

    /// Convert a declared string length, failing when negative or over the limit.
    pub fn check_string(&self, size: i64) -> Result<usize, ProtocolError> {
        check(size, self.string_limit)
    }

    /// Convert a declared element count, failing when negative or over the limit.
    pub fn check_container(&self, size: i64) -> Result<usize, ProtocolError> {
        check(size, self.container_limit)
    }
}

fn check(size: i64, limit: Option<usize>) -> Result<usize, ProtocolError> {
    if size < 0 {
        return Err(ProtocolError::NegativeSize(size));
    }
    let size = usize::try_from(size).map_err(|_| ProtocolError::NegativeSize(size))?;
    match limit {
        Some(limit) if size > limit => Err(ProtocolError::SizeLimit { size, limit }),
        _ => Ok(size),
    }
}

/// Fail when `count` elements of at least `min_size` bytes each cannot fit in `remaining`.
pub(crate) fn ensure_available(
    remaining: usize,
    count: usize,
    min_size: usize,
) -> Result<(), ProtocolError> {
    match count.checked_mul(min_size) {
        Some(needed) if needed <= remaining => Ok(()),
        _ => Err(ProtocolError::UnexpectedEof),
    }
}

/// Container sizes are carried as i32 on the wire.
pub(crate) fn wire_size(size: usize) -> Result<i32, ProtocolError> {
    i32::try_from(size).map_err(|_| ProtocolError::SizeOverflow(size))
}
