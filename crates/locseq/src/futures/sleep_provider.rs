use core::{future::Future, time::Duration};

/// Abstracts over how to sleep for a given [`Duration`] in async contexts.
///
/// The allocator backs off through this trait between contended attempts,
/// which keeps it generic over runtimes like `Tokio` or `Smol`.
pub trait SleepProvider {
    /// The future must be `Send` so allocation futures can move across
    /// threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}

#[cfg(all(test, any(feature = "async-tokio", feature = "async-smol")))]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::{MemoryStore, RetryPolicy, Sequence, SequenceAllocator};

    fn key() -> crate::PartitionKey {
        crate::resolve("Chennai", &chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    async fn sleeps_at_least<P: SleepProvider>(dur: Duration) {
        let start = Instant::now();
        P::sleep_for(dur).await;
        assert!(start.elapsed() >= dur);
    }

    #[cfg(feature = "async-tokio")]
    #[tokio::test]
    async fn tokio_providers_drive_the_allocator() {
        sleeps_at_least::<crate::TokioSleep>(Duration::from_millis(5)).await;
        crate::TokioYield::sleep_for(Duration::from_secs(60)).await;

        let allocator = SequenceAllocator::with_policy(MemoryStore::new(), RetryPolicy::new(1));
        let k = key();
        assert_eq!(
            allocator.allocate_with::<crate::TokioYield>(&k).await.unwrap(),
            Sequence::FIRST
        );
    }

    #[cfg(feature = "async-smol")]
    #[test]
    fn smol_providers_drive_the_allocator() {
        ::smol::block_on(async {
            sleeps_at_least::<crate::SmolSleep>(Duration::from_millis(5)).await;
            crate::SmolYield::sleep_for(Duration::from_secs(60)).await;

            let allocator = SequenceAllocator::new(MemoryStore::new());
            let k = key();
            for expected in 1..=3 {
                let sequence = allocator.allocate_with::<crate::SmolSleep>(&k).await.unwrap();
                assert_eq!(sequence.get(), expected);
            }
            assert_eq!(
                allocator.allocate_with::<crate::SmolYield>(&k).await.unwrap().get(),
                4
            );
        });
    }
}
