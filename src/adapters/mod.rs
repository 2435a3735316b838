//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                      |
//! |------------|--------------|----------------------------------|
//! | `log_sink` | EventSink    | `log` facade (env_logger on host)|
//! |            | AudioPort    |                                  |
//! | `nvs`      | ConfigPort   | Namespaced key-value store       |
//! |            | StoragePort  |                                  |
//! | `time`     | ClockPort    | Manually advanced clock          |

pub mod log_sink;
pub mod nvs;
pub mod time;
