/// Caller-owned decode statistics.
///
/// Reflects the most recent decode it was passed to; never reset between
/// calls. Keeping it outside the codec leaves the codec free of shared
/// mutable state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Byte length of the raw serialized input, measured before trimming.
    pub raw_data_size: u64,
}

impl DecodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_data_size(&self) -> u64 {
        self.raw_data_size
    }

    pub fn set_raw_data_size(&mut self, size: usize) {
        self.raw_data_size = size as u64;
    }
}
