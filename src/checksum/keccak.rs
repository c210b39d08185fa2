// Keccak sponge for output sizes the sha3 crate does not ship (KECCAK-288)

use super::digest::Hasher;

const STATE_BYTES: usize = 200;

/// Original Keccak (pre-FIPS 202 padding) with capacity `2 * output`
pub struct KeccakSponge {
    state: [u64; 25],
    buffer: [u8; STATE_BYTES],
    buffered: usize,
    rate: usize,
    output: usize,
}

impl KeccakSponge {
    /// Sponge producing `output` bytes; `output` must leave a non-empty rate
    pub fn new(output: usize) -> Self {
        Self {
            state: [0; 25],
            buffer: [0; STATE_BYTES],
            buffered: 0,
            rate: STATE_BYTES - 2 * output,
            output,
        }
    }

    /// KECCAK-288
    pub fn keccak288() -> Self {
        Self::new(36)
    }

    fn absorb_block(&mut self) {
        for (lane, chunk) in self.state.iter_mut().zip(self.buffer[..self.rate].chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *lane ^= u64::from_le_bytes(bytes);
        }
        keccak::f1600(&mut self.state);
        self.buffered = 0;
    }
}

impl Hasher for KeccakSponge {
    fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (self.rate - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered == self.rate {
                self.absorb_block();
            }
        }
    }

    fn finalize(mut self: Box<Self>) -> Vec<u8> {
        let rate = self.rate;
        let buffered = self.buffered;
        self.buffer[buffered..rate].fill(0);
        self.buffer[buffered] ^= 0x01;
        self.buffer[rate - 1] ^= 0x80;
        self.absorb_block();

        let mut out = Vec::with_capacity(self.output);
        for lane in self.state.iter() {
            out.extend_from_slice(&lane.to_le_bytes());
            if out.len() >= self.output {
                break;
            }
        }
        out.truncate(self.output);
        out
    }

    fn output_size(&self) -> usize {
        self.output
    }
}
