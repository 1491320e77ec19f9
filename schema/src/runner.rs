use std::num::NonZeroU8;
use std::time::Duration;

use futures::Future;

use crate::Scheduler;

/// A `Runner` dispatches zips to fulfill orders using a provided `Scheduler`.
/// It returns a `Response` future, which may be polled to drive its operation
/// until completion of all deliveries.
pub trait Runner<S: Scheduler> {
    type Response: Future<Output = Result<Self::Success, Self::Error>>;
    type Success;
    type Error;

    /// Initialize the `Runner` to fulfill orders using the provided `Scheduler`.
    fn run(&self, scheduler: S) -> Self::Response;
}

/// Allows running in fast-forward or slow-motion instead of real-time
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    #[default]
    RealTime,
    /// Speed up the runner by the provided multiplier (e.g. `2` gives double speed)
    FastForward(NonZeroU8),
    /// Slow down the runner by the provided multiplier (e.g. `2` gives half speed)
    SlowMotion(NonZeroU8),
}

impl Speed {
    pub fn fast_forward(rate: u8) -> Option<Self> {
        NonZeroU8::new(rate).map(Self::FastForward)
    }

    pub fn slow_motion(rate: u8) -> Option<Self> {
        NonZeroU8::new(rate).map(Self::SlowMotion)
    }

    /// Parses `realtime`, `ff:<n>` or `slow:<n>`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().split_once(':') {
            None if s.trim().eq_ignore_ascii_case("realtime") => Some(Self::RealTime),
            Some(("ff", rate)) => rate.parse().ok().and_then(Self::fast_forward),
            Some(("slow", rate)) => rate.parse().ok().and_then(Self::slow_motion),
            _ => None,
        }
    }

    pub fn adjust_duration(&self, duration: Duration) -> Duration {
        match self {
            Self::RealTime => duration,
            Self::FastForward(x) => duration / x.get() as u32,
            Self::SlowMotion(x) => duration * x.get() as u32,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_adjust_duration() {
        let second = Duration::from_secs(1);
        assert_eq!(Speed::RealTime.adjust_duration(second), second);
        assert_eq!(
            Speed::fast_forward(4).expect("speed").adjust_duration(second),
            Duration::from_millis(250)
        );
        assert_eq!(
            Speed::slow_motion(2).expect("speed").adjust_duration(second),
            Duration::from_secs(2)
        );
        assert_eq!(Speed::fast_forward(0), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Speed::parse("realtime"), Some(Speed::RealTime));
        assert_eq!(Speed::parse("ff:200"), Speed::fast_forward(200));
        assert_eq!(Speed::parse("slow:3"), Speed::slow_motion(3));
        assert_eq!(Speed::parse("ff:0"), None);
        assert_eq!(Speed::parse("warp"), None);
    }
}
