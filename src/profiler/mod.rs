//! Call profiling through explicit decorators.
//!
//! A capability trait declares its operations once as a [`CapabilitySet`].
//! [`Profiler::wrap`] puts a delegate inside a [`Profiled`] wrapper, and the
//! trait's `impl` for `Profiled<T>` routes every call through
//! [`Profiled::call`], which times the operations flagged as measured and
//! records them in the shared [`ProfileLedger`].
//!
//! ```ignore
//! const RESOLVE: &str = "resolve(&str)";
//! pub const PAGE_RESOLVER: CapabilitySet =
//!     CapabilitySet::new("PageResolver", &[Operation::measured(RESOLVE)]);
//!
//! impl<T: PageResolver> PageResolver for Profiled<T> {
//!     fn resolve(&self, url: &str) -> Result<Page> {
//!         self.call(RESOLVE, |inner| inner.resolve(url))
//!     }
//! }
//! ```

pub mod ledger;

use std::any::type_name;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::utils::Clock;

pub use ledger::{ProfileKey, ProfileLedger, ProfileStat};

/// One operation of a capability interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub signature: &'static str,
    pub measured: bool,
}

impl Operation {
    /// An operation whose calls are timed.
    pub const fn measured(signature: &'static str) -> Self {
        Self {
            signature,
            measured: true,
        }
    }

    /// An operation forwarded without timing.
    pub const fn passthrough(signature: &'static str) -> Self {
        Self {
            signature,
            measured: false,
        }
    }
}

/// The declared operations of a capability interface.
#[derive(Debug, PartialEq, Eq)]
pub struct CapabilitySet {
    pub name: &'static str,
    pub operations: &'static [Operation],
}

impl CapabilitySet {
    pub const fn new(name: &'static str, operations: &'static [Operation]) -> Self {
        Self { name, operations }
    }

    /// Whether at least one operation is measured.
    pub fn has_measured(&self) -> bool {
        self.operations.iter().any(|op| op.measured)
    }

    /// Whether `signature` is declared and measured.
    pub fn is_measured(&self, signature: &str) -> bool {
        self.operations
            .iter()
            .any(|op| op.measured && op.signature == signature)
    }

    /// Find a capability by interface name.
    pub fn lookup(
        known: &[&'static CapabilitySet],
        name: &str,
    ) -> Option<&'static CapabilitySet> {
        known.iter().copied().find(|c| c.name == name)
    }
}

/// Wraps delegates for timing and owns the session ledger.
#[derive(Clone)]
pub struct Profiler {
    clock: Arc<dyn Clock>,
    ledger: Arc<ProfileLedger>,
}

impl Profiler {
    /// Start a profiling session; the ledger's start time is read from `clock` now.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let ledger = Arc::new(ProfileLedger::new(clock.utc_now()));
        Self { clock, ledger }
    }

    /// Wrap `delegate` behind `capability`.
    ///
    /// Fails with [`AppError::NullArgument`] when no capability is given and
    /// with [`AppError::InvalidArgument`] when it declares no measured
    /// operation.
    pub fn wrap<T>(
        &self,
        capability: Option<&'static CapabilitySet>,
        delegate: T,
    ) -> Result<Profiled<T>> {
        let capability = capability.ok_or(AppError::NullArgument("capability"))?;
        if !capability.has_measured() {
            return Err(AppError::invalid_argument(format!(
                "capability '{}' declares no measured operations",
                capability.name
            )));
        }

        Ok(Profiled {
            delegate,
            type_name: type_name::<T>(),
            capability,
            clock: Arc::clone(&self.clock),
            ledger: Arc::clone(&self.ledger),
        })
    }

    /// The session ledger.
    pub fn ledger(&self) -> &ProfileLedger {
        &self.ledger
    }

    /// Render the session report.
    pub fn report(&self) -> String {
        self.ledger.report()
    }

    /// Write the session report to `writer`.
    pub fn write_report(&self, writer: &mut impl io::Write) -> io::Result<()> {
        self.ledger.write_report(writer)
    }
}

/// A delegate whose measured operations are timed.
pub struct Profiled<T> {
    delegate: T,
    type_name: &'static str,
    capability: &'static CapabilitySet,
    clock: Arc<dyn Clock>,
    ledger: Arc<ProfileLedger>,
}

impl<T> Profiled<T> {
    /// Forward one operation to the delegate.
    ///
    /// Measured operations are timed on every exit path, including unwinding;
    /// the delegate's return value or panic reaches the caller untouched.
    pub fn call<R>(&self, signature: &'static str, f: impl FnOnce(&T) -> R) -> R {
        if !self.capability.is_measured(signature) {
            return f(&self.delegate);
        }

        let _timer = CallTimer {
            key: ProfileKey::new(self.type_name, signature),
            start: self.clock.now(),
            clock: self.clock.as_ref(),
            ledger: &self.ledger,
        };
        f(&self.delegate)
    }

    /// The wrapped delegate.
    pub fn delegate(&self) -> &T {
        &self.delegate
    }

    /// The capability this wrapper was built for.
    pub fn capability(&self) -> &'static CapabilitySet {
        self.capability
    }
}

/// Records elapsed time when dropped.
struct CallTimer<'a> {
    key: ProfileKey,
    start: Instant,
    clock: &'a dyn Clock,
    ledger: &'a ProfileLedger,
}

impl Drop for CallTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.clock.now().saturating_duration_since(self.start);
        self.ledger.record(self.key, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::time::Duration;

    use super::*;
    use crate::utils::ManualClock;

    const ADD: &str = "add(u32, u32)";
    const NAME: &str = "name()";

    static CALCULATOR: CapabilitySet = CapabilitySet::new(
        "Calculator",
        &[Operation::measured(ADD), Operation::passthrough(NAME)],
    );
    static UNMEASURED: CapabilitySet =
        CapabilitySet::new("Unmeasured", &[Operation::passthrough(NAME)]);

    trait Calculator {
        fn add(&self, a: u32, b: u32) -> Result<u32>;
        fn name(&self) -> &'static str;
    }

    /// Takes one simulated second per `add` and rejects overflow.
    struct SlowCalculator {
        clock: Arc<ManualClock>,
    }

    impl Calculator for SlowCalculator {
        fn add(&self, a: u32, b: u32) -> Result<u32> {
            self.clock.advance(Duration::from_secs(1));
            if a == u32::MAX {
                panic!("calculator exploded");
            }
            a.checked_add(b)
                .ok_or_else(|| AppError::validation("overflow"))
        }

        fn name(&self) -> &'static str {
            self.clock.advance(Duration::from_secs(5));
            "slow"
        }
    }

    impl<T: Calculator> Calculator for Profiled<T> {
        fn add(&self, a: u32, b: u32) -> Result<u32> {
            self.call(ADD, |c| c.add(a, b))
        }

        fn name(&self) -> &'static str {
            self.call(NAME, |c| c.name())
        }
    }

    fn setup() -> (Arc<ManualClock>, Profiler, Profiled<SlowCalculator>) {
        let clock = Arc::new(ManualClock::default());
        let profiler = Profiler::new(clock.clone());
        let wrapped = profiler
            .wrap(
                Some(&CALCULATOR),
                SlowCalculator {
                    clock: Arc::clone(&clock),
                },
            )
            .unwrap();
        (clock, profiler, wrapped)
    }

    fn add_key() -> ProfileKey {
        ProfileKey::new(type_name::<SlowCalculator>(), ADD)
    }

    #[test]
    fn test_measured_calls_are_timed() {
        let (_, profiler, calc) = setup();

        assert_eq!(calc.add(2, 3).unwrap(), 5);
        assert_eq!(calc.add(4, 4).unwrap(), 8);

        let stat = profiler.ledger().stat(&add_key()).unwrap();
        assert_eq!(stat.calls, 2);
        assert_eq!(stat.total, Duration::from_secs(2));
    }

    #[test]
    fn test_passthrough_calls_are_not_recorded() {
        let (_, profiler, calc) = setup();

        assert_eq!(calc.name(), "slow");

        assert!(profiler.ledger().entries().is_empty());
    }

    #[test]
    fn test_errors_propagate_unchanged_and_are_timed() {
        let (_, profiler, calc) = setup();

        let err = calc.add(u32::MAX - 1, 2).unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == "overflow"));
        let stat = profiler.ledger().stat(&add_key()).unwrap();
        assert_eq!(stat.calls, 1);
        assert_eq!(stat.total, Duration::from_secs(1));
    }

    #[test]
    fn test_panics_propagate_unchanged_and_are_timed() {
        let (_, profiler, calc) = setup();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| calc.add(u32::MAX, 1)));

        let payload = outcome.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"calculator exploded"));
        let stat = profiler.ledger().stat(&add_key()).unwrap();
        assert_eq!(stat.calls, 1);
        assert_eq!(stat.total, Duration::from_secs(1));
    }

    #[test]
    fn test_wrap_rejects_capability_without_measured_operations() {
        let clock = Arc::new(ManualClock::default());
        let profiler = Profiler::new(clock.clone());

        let result = profiler.wrap(Some(&UNMEASURED), SlowCalculator { clock });

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_wrap_rejects_missing_capability() {
        let clock = Arc::new(ManualClock::default());
        let profiler = Profiler::new(clock.clone());

        let result = profiler.wrap(None, SlowCalculator { clock });

        assert!(matches!(result, Err(AppError::NullArgument("capability"))));
    }

    #[test]
    fn test_lookup_finds_capability_by_name() {
        let known: [&'static CapabilitySet; 2] = [&CALCULATOR, &UNMEASURED];

        assert_eq!(CapabilitySet::lookup(&known, "Calculator"), Some(&CALCULATOR));
        assert_eq!(CapabilitySet::lookup(&known, "Abacus"), None);
    }

    #[test]
    fn test_report_names_concrete_type_and_operation() {
        let (_, profiler, calc) = setup();
        calc.add(1, 1).unwrap();

        let report = profiler.report();

        assert!(report.starts_with("Run at Thu, 1 Jan 1970 00:00:00 GMT\n"));
        assert!(report.contains("SlowCalculator#add(u32, u32) took 0m 1s 0ms"));
    }
}
