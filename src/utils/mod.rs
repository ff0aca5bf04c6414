//! Utility functions for bubble-ist

use serde::{Serialize, Deserialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Save object to JSON file
pub fn save_json<T: Serialize>(obj: &T, path: &Path) -> crate::Result<()> {
    let json = serde_json::to_string_pretty(obj)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Load object from JSON file
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> crate::Result<T> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let obj = serde_json::from_str(&contents)?;
    Ok(obj)
}

/// Timing utilities
pub mod timing {
    use std::time::{Duration, Instant};
    use tracing::info;

    /// Logs its lifetime when dropped
    pub struct Timer {
        start: Instant,
        name: String,
    }

    impl Timer {
        /// Start new timer
        pub fn new(name: &str) -> Self {
            Timer {
                start: Instant::now(),
                name: name.to_string(),
            }
        }

        /// Get elapsed time
        pub fn elapsed(&self) -> Duration {
            self.start.elapsed()
        }

        /// Log elapsed time
        pub fn log(&self) {
            info!("{}: {:.6} seconds", self.name, self.elapsed().as_secs_f64());
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            self.log();
        }
    }
}
