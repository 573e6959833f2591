//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                    |
//! |-------------|--------------------|--------------------------------|
//! | `device_id` | -                  | eFuse MAC (node id fallback)   |
//! | `hardware`  | SensorPort         | DHT22, gas ADC, PIR            |
//! |             | ActuatorPort       | Cooling relay GPIO             |
//! | `log_sink`  | EventSink          | Serial log output              |
//! | `nvs`       | ConfigPort         | NVS / in-memory store          |
//! | `rtdb`      | StorePort          | Realtime database REST (HTTPS) |
//! | `time`      | Clock              | ESP32 system timer             |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA               |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod rtdb;
pub mod time;
pub mod wifi;
