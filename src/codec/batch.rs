//! Parallel record decoding
//!
//! Uses Rayon for work-stealing parallelism with a configurable thread count.

use rayon::prelude::*;

use super::Codec;
use crate::error::Result;
use crate::value::Value;

/// Configuration for parallel decoding
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Maximum number of worker threads (default: Rayon's thread count)
    pub max_parallelism: usize,
    /// Return the first failure instead of collecting per-item results
    pub fail_fast: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_parallelism: rayon::current_num_threads(),
            fail_fast: false,
        }
    }
}

impl ParallelConfig {
    /// Set the worker thread limit
    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism.max(1);
        self
    }

    /// Stop at the first failure
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

impl Codec {
    /// Decode many buffers holding records of the same type
    ///
    /// Results keep the order of `buffers`. With `fail_fast` the first failure
    /// (in buffer order) is returned as the outer error; otherwise each item
    /// carries its own result.
    pub fn decode_accounts_parallel<B>(
        &self,
        name: &str,
        buffers: &[B],
        config: &ParallelConfig,
    ) -> Result<Vec<Result<Value>>>
    where
        B: AsRef<[u8]> + Sync,
    {
        // Fail on unknown names before spinning up workers
        self.registry.account(name)?;

        let decode_one = |buffer: &B| self.decode_account(name, buffer.as_ref()).map(|(v, _)| v);

        if buffers.len() <= 1 {
            let results: Vec<Result<Value>> = buffers.iter().map(decode_one).collect();
            return finish(results, config.fail_fast);
        }

        let run = || buffers.par_iter().map(decode_one).collect::<Vec<_>>();

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_parallelism.clamp(1, buffers.len()))
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build decode pool, using the global pool");
                run()
            }
        };
        tracing::debug!(record = name, count = buffers.len(), "Decoded records in parallel");
        finish(results, config.fail_fast)
    }
}

fn finish(results: Vec<Result<Value>>, fail_fast: bool) -> Result<Vec<Result<Value>>> {
    if fail_fast {
        if let Some(err) = results.iter().find_map(|r| r.as_ref().err()) {
            return Err(err.clone());
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use std::sync::Arc;

    fn codec() -> Codec {
        let registry = Registry::from_json(
            r#"{
            "address": "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS",
            "instructions": [],
            "accounts": [{"name": "Counter"}],
            "types": [{"name": "Counter", "type": {"kind": "struct", "fields": [
                {"name": "count", "type": "u64"}
            ]}}]
        }"#,
        )
        .unwrap();
        Codec::new(Arc::new(registry))
    }

    fn counters(codec: &Codec, n: u64) -> Vec<Vec<u8>> {
        (0..n)
            .map(|i| {
                codec
                    .encode_account("Counter", &Value::structure([("count", Value::U64(i))]))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_parallel_decode_keeps_order() {
        let codec = codec();
        let buffers = counters(&codec, 64);
        let results = codec
            .decode_accounts_parallel("Counter", &buffers, &ParallelConfig::default())
            .unwrap();
        assert_eq!(results.len(), 64);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(
                result.as_ref().unwrap().get("count"),
                Some(&Value::U64(i as u64))
            );
        }
    }

    #[test]
    fn test_collect_all_failures() {
        let codec = codec();
        let mut buffers = counters(&codec, 3);
        buffers[1] = vec![0; 16];
        let results = codec
            .decode_accounts_parallel("Counter", &buffers, &ParallelConfig::default())
            .unwrap();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_fail_fast() {
        let codec = codec();
        let mut buffers = counters(&codec, 3);
        buffers[2] = vec![1, 2];
        let config = ParallelConfig::default()
            .with_max_parallelism(2)
            .with_fail_fast(true);
        assert!(codec
            .decode_accounts_parallel("Counter", &buffers, &config)
            .is_err());
    }

    #[test]
    fn test_empty_input() {
        let codec = codec();
        let buffers: Vec<Vec<u8>> = Vec::new();
        assert!(codec
            .decode_accounts_parallel("Counter", &buffers, &ParallelConfig::default())
            .unwrap()
            .is_empty());
    }
}
