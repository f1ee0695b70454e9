// Prediction assembly and the top-level fetch/cache/fallback policy.

pub mod assemble;
pub mod sample;
pub mod service;

#[cfg(test)]
mod test_support;
