use embassy_time::Duration;
use heapless::String;

/// Operator profile the SARA-R4 is expected to run with.
pub const DEFAULT_MNO_PROFILE: i32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) device_key: String<32>,
    pub(crate) mno_profile: i32,
    pub(crate) boot_settle: Duration,
    pub(crate) poll_interval: Duration,
    pub(crate) command_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_key: String::new(),
            mno_profile: DEFAULT_MNO_PROFILE,
            boot_settle: Duration::from_secs(1),
            poll_interval: Duration::from_millis(10),
            command_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Create a config carrying the cloud `device_key`. Keys longer than
    /// 32 bytes are truncated.
    #[must_use]
    pub fn new(device_key: &str) -> Self {
        let mut key = String::new();
        for c in device_key.chars() {
            if key.push(c).is_err() {
                break;
            }
        }

        Self {
            device_key: key,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mno_profile(self, mno_profile: i32) -> Self {
        Self {
            mno_profile,
            ..self
        }
    }

    #[must_use]
    pub fn with_boot_settle(self, boot_settle: Duration) -> Self {
        Self {
            boot_settle,
            ..self
        }
    }

    #[must_use]
    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }

    #[must_use]
    pub fn with_command_timeout(self, command_timeout: Duration) -> Self {
        Self {
            command_timeout,
            ..self
        }
    }

    pub fn device_key(&self) -> &str {
        &self.device_key
    }

    pub fn mno_profile(&self) -> i32 {
        self.mno_profile
    }
}
