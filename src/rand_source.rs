//! The external uniform-bytes collaborator.
//!
//! Primality testing and random-magnitude sampling never reach for a
//! global RNG; callers inject one, so a caller can hand in
//! `rand::rngs::OsRng`, a seeded `StdRng`, or any other
//! `rand_core::RngCore` implementation.

pub trait RandomSource {
    fn next_bytes(&mut self, buf: &mut [u8]);
}

impl<R: rand_core::RngCore> RandomSource for R {
    fn next_bytes(&mut self, buf: &mut [u8]) {
        self.fill_bytes(buf);
    }
}
