//! Artifact id generation.
//!
//! Ids are 64-bit snowflakes: 41 bits of milliseconds since `EPOCH_MS`,
//! 5 bits datacenter, 5 bits worker, 12 bits per-millisecond sequence.

use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::errors::ServiceError;

pub const EPOCH_MS: i64 = 1_288_834_974_657;

const WORKER_ID_BITS: u32 = 5;
const DATACENTER_ID_BITS: u32 = 5;
const SEQUENCE_BITS: u32 = 12;

const MAX_NODE_ID: u8 = (1 << WORKER_ID_BITS) - 1;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
const DATACENTER_ID_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS + DATACENTER_ID_BITS;

/// Source of unique 64-bit artifact ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Result<i64, ServiceError>;
}

#[derive(Debug, Default)]
struct WorkerState {
    last_timestamp: i64,
    sequence: i64,
}

#[derive(Debug)]
pub struct SnowflakeIdWorker {
    worker_id: i64,
    datacenter_id: i64,
    state: Mutex<WorkerState>,
}

impl SnowflakeIdWorker {
    pub fn new(worker_id: u8, datacenter_id: u8) -> Result<Self, ServiceError> {
        if worker_id > MAX_NODE_ID || datacenter_id > MAX_NODE_ID {
            return Err(ServiceError::IdGeneration(format!(
                "worker_id and datacenter_id must be <= {MAX_NODE_ID}"
            )));
        }
        Ok(Self {
            worker_id: i64::from(worker_id),
            datacenter_id: i64::from(datacenter_id),
            state: Mutex::new(WorkerState::default()),
        })
    }

    pub fn from_config(cfg: &configs::IdGenConfig) -> Result<Self, ServiceError> {
        Self::new(cfg.worker_id, cfg.datacenter_id)
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn compose(&self, timestamp: i64, sequence: i64) -> i64 {
        ((timestamp - EPOCH_MS) << TIMESTAMP_SHIFT)
            | (self.datacenter_id << DATACENTER_ID_SHIFT)
            | (self.worker_id << WORKER_ID_SHIFT)
            | sequence
    }
}

impl IdGenerator for SnowflakeIdWorker {
    fn next_id(&self) -> Result<i64, ServiceError> {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut timestamp = Self::now_ms();

        if timestamp < st.last_timestamp {
            warn!(last = st.last_timestamp, now = timestamp, "clock moved backwards");
            return Err(ServiceError::IdGeneration(format!(
                "clock moved backwards; refusing to generate id for {} ms",
                st.last_timestamp - timestamp
            )));
        }

        if timestamp == st.last_timestamp {
            st.sequence = (st.sequence + 1) & SEQUENCE_MASK;
            if st.sequence == 0 {
                // sequence exhausted for this millisecond
                while timestamp <= st.last_timestamp {
                    std::hint::spin_loop();
                    timestamp = Self::now_ms();
                }
            }
        } else {
            st.sequence = 0;
        }

        st.last_timestamp = timestamp;
        Ok(self.compose(timestamp, st.sequence))
    }
}
