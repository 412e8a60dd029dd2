use embassy_time::Timer;

use crate::config::Config;
use crate::error::{Error, SetupError};

/// Board side of the module: power rail and the stored operator profile.
///
/// How these are carried out (GPIO toggling, a vendor SDK call, a second
/// AT channel) is up to the board.
pub trait Board {
    /// Power the module on. `false` if it did not come up.
    fn power_on(&mut self) -> bool;

    /// Currently stored MNO profile. Negative values are error codes.
    fn profile(&mut self) -> i32;

    /// Store a new MNO profile. `false` if refused.
    fn set_profile(&mut self, profile: i32) -> bool;
}

/// Power the module on and make sure it runs the configured MNO profile.
///
/// Any failure is returned as [`Error::Setup`] and should be treated as
/// fatal by the caller.
pub async fn bring_up<B: Board>(board: &mut B, config: &Config) -> Result<(), Error> {
    info!("Powering on the module");
    if !board.power_on() {
        error!("Module did not power on");
        return Err(SetupError::PowerOn.into());
    }

    Timer::after(config.boot_settle).await;

    let current = board.profile();
    if current < 0 {
        error!("Reading the MNO profile failed: {}", current);
        return Err(SetupError::ProfileRead(current).into());
    }

    let desired = config.mno_profile;
    if current == desired {
        debug!("MNO profile already {}", current);
        return Ok(());
    }

    info!("Changing MNO profile {} -> {}", current, desired);
    if !board.set_profile(desired) {
        error!("Writing MNO profile {} failed", desired);
        return Err(SetupError::ProfileWrite(desired).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_time::Duration;
    use std::vec::Vec;

    struct MockBoard {
        powers: bool,
        profile: i32,
        accepts: bool,
        writes: Vec<i32>,
    }

    impl MockBoard {
        fn new(profile: i32) -> Self {
            Self {
                powers: true,
                profile,
                accepts: true,
                writes: Vec::new(),
            }
        }
    }

    impl Board for MockBoard {
        fn power_on(&mut self) -> bool {
            self.powers
        }

        fn profile(&mut self) -> i32 {
            self.profile
        }

        fn set_profile(&mut self, profile: i32) -> bool {
            self.writes.push(profile);
            if self.accepts {
                self.profile = profile;
            }
            self.accepts
        }
    }

    fn config() -> Config {
        Config::new("12345678")
            .with_mno_profile(100)
            .with_boot_settle(Duration::from_millis(1))
    }

    #[test]
    fn keeps_matching_profile() {
        let mut board = MockBoard::new(100);
        assert_eq!(block_on(bring_up(&mut board, &config())), Ok(()));
        assert!(board.writes.is_empty());
    }

    #[test]
    fn writes_differing_profile() {
        let mut board = MockBoard::new(0);
        assert_eq!(block_on(bring_up(&mut board, &config())), Ok(()));
        assert_eq!(board.writes, [100]);
        assert_eq!(board.profile, 100);
    }

    #[test]
    fn power_failure_is_fatal() {
        let mut board = MockBoard::new(100);
        board.powers = false;
        assert_eq!(
            block_on(bring_up(&mut board, &config())),
            Err(Error::Setup(SetupError::PowerOn))
        );
    }

    #[test]
    fn negative_profile_is_a_read_error() {
        let mut board = MockBoard::new(-3);
        assert_eq!(
            block_on(bring_up(&mut board, &config())),
            Err(Error::Setup(SetupError::ProfileRead(-3)))
        );
        assert!(board.writes.is_empty());
    }

    #[test]
    fn refused_write_is_fatal() {
        let mut board = MockBoard::new(0);
        board.accepts = false;
        assert_eq!(
            block_on(bring_up(&mut board, &config())),
            Err(Error::Setup(SetupError::ProfileWrite(100)))
        );
    }
}
