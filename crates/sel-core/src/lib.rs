//! Active-learning word selection for morphological segmentation.

pub mod analysis;
pub mod metrics;
pub mod numeric;
pub mod oracle;
pub mod pool;
pub mod representative;
pub mod roundrobin;
pub mod selection;
pub mod settings;
#[cfg(test)]
mod testutil;
