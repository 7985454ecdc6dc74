use crate::error::{RenderError, RenderResult};

/// Longest prompt the renderer will ever produce, in bytes.
pub const PROMPT_MAX_LEN: usize = 16384;

/// Printed in place of a prompt that would exceed [`PROMPT_MAX_LEN`].
pub const PROMPT_TOO_LONG: &str = "PROMPT TOO LONG $ ";

/// Growable string with a hard length ceiling checked on every append.
#[derive(Debug, Clone)]
pub struct PromptBuffer {
    buf: String,
    limit: usize,
}

impl PromptBuffer {
    pub fn new() -> Self {
        Self::with_limit(PROMPT_MAX_LEN)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: String::new(),
            limit,
        }
    }

    pub fn push_str(&mut self, s: &str) -> RenderResult<()> {
        if self.buf.len() + s.len() > self.limit {
            return Err(RenderError::PromptTooLong { limit: self.limit });
        }
        self.buf.push_str(s);
        Ok(())
    }

    pub fn push(&mut self, c: char) -> RenderResult<()> {
        let mut tmp = [0u8; 4];
        self.push_str(c.encode_utf8(&mut tmp))
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl Default for PromptBuffer {
    fn default() -> Self {
        Self::new()
    }
}
