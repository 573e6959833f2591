//! Task Watchdog Timer (TWDT) driver.
//!
//! The period comes from [`SystemConfig::watchdog_timeout_ms`], which covers
//! one poll period plus the worst case of blocking store requests in a
//! tick. A store that accepts connections and then stalls can slow the loop
//! down but cannot trip the TWDT.
//!
//! The loop calls [`Watchdog::feed`] once per iteration with the current
//! time. Gaps longer than half the period are logged so a slow store shows
//! up in the console long before it would matter.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

use crate::config::SystemConfig;

pub struct Watchdog {
    timeout_ms: u32,
    last_feed_ms: Option<u64>,
    longest_gap_ms: u64,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Subscribe the current task with the period derived from `config`.
    pub fn for_config(config: &SystemConfig) -> Self {
        Self::new(config.watchdog_timeout_ms())
    }

    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        let subscribed = {
            // SAFETY: plain FFI calls on the current task; no pointers retained.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK as i32 {
                    warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }
                let ret = esp_task_wdt_add(core::ptr::null_mut());
                if ret != ESP_OK as i32 {
                    warn!("Watchdog: failed to subscribe ({})", ret);
                }
                ret == ESP_OK as i32
            }
        };

        #[cfg(target_os = "espidf")]
        if subscribed {
            info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
        }
        #[cfg(not(target_os = "espidf"))]
        info!("Watchdog(sim): no-op ({} ms)", timeout_ms);

        Self {
            timeout_ms,
            last_feed_ms: None,
            longest_gap_ms: 0,
            #[cfg(target_os = "espidf")]
            subscribed,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Longest interval seen between two feeds.
    pub fn longest_gap_ms(&self) -> u64 {
        self.longest_gap_ms
    }

    /// Feed the watchdog. Must be called at least once per timeout.
    pub fn feed(&mut self, now_ms: u64) {
        if let Some(last) = self.last_feed_ms {
            let gap = now_ms.saturating_sub(last);
            if gap > self.longest_gap_ms {
                self.longest_gap_ms = gap;
            }
            if gap > u64::from(self.timeout_ms / 2) {
                warn!("Watchdog: {} ms since last feed (timeout {} ms)", gap, self.timeout_ms);
            }
        }
        self.last_feed_ms = Some(now_ms);

        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the current task was subscribed in new().
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
