use anyhow::{bail, Result};

/// Contiguous BGR pixel matrix, three bytes per pixel, row major, no row
/// padding. The only pixel layout the pipeline works in.
#[derive(Debug, Clone)]
pub struct BgrFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl BgrFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            bail!(
                "BGR buffer size mismatch: {} bytes for {}x{} (expected {})",
                data.len(),
                width,
                height,
                expected
            );
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// One unit of work between ingress and the worker: a converted frame plus
/// the host's microsecond timestamp. Jobs are moved into the queue at
/// ingress and consumed exactly once.
#[derive(Debug)]
pub struct FrameJob {
    pub timestamp_us: i64,
    pub frame: BgrFrame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(BgrFrame::new(4, 4, vec![0; 10]).is_err());
        assert!(BgrFrame::new(4, 4, vec![0; 48]).is_ok());
    }
}
