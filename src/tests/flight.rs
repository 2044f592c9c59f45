#![allow(non_snake_case)]

//		Packages

use super::*;
use claims::{assert_err_eq, assert_none, assert_ok_eq, assert_some};
use core::{
	sync::atomic::AtomicUsize,
	time::Duration,
};
use futures_util::FutureExt as _;
use tokio::{
	task::yield_now,
	time::sleep,
};



//		Common

//		counted																	
/// Wraps a value in a future, counting invocations of the producer itself
/// rather than of the future.
fn counted<T>(counter: &Arc<AtomicUsize>, delay: Duration, value: T) -> impl FnOnce() -> BoxFuture<'static, T>
where
	T: Send + 'static,
{
	let counter = Arc::clone(counter);
	move || {
		let _previous = counter.fetch_add(1, Ordering::SeqCst);
		async move {
			sleep(delay).await;
			value
		}.boxed()
	}
}

//		explode																	
/// A producer that panics with a fixed message.
async fn explode() -> u32 {
	panic!("boom")
}

//		explode_with															
/// A producer that panics with the given message.
async fn explode_with(message: String) -> u32 {
	panic!("{message}")
}



//		Tests

#[cfg(test)]
mod single_flight {
	use super::*;
	
	//		new																	
	#[test]
	fn new() {
		let gate = SingleFlight::<u32>::new();
		assert!(!gate.has_in_flight(), "Nothing should be in flight");
	}
	
	//		run_or_join															
	#[tokio::test]
	async fn run_or_join__returns_result() {
		let gate   = SingleFlight::new();
		let flight = gate.run_or_join(|| async { 42_u32 });
		assert_ok_eq!(flight.await, 42);
	}
	#[tokio::test(start_paused = true)]
	async fn run_or_join__clears_after_completion() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		assert!(!gate.has_in_flight(), "Nothing should be in flight yet");
		let flight  = gate.run_or_join(counted(&counter, Duration::from_millis(100), 42_u32));
		assert!(gate.has_in_flight(), "The operation should be in flight");
		assert_ok_eq!(flight.await, 42);
		assert!(!gate.has_in_flight(), "The slot should be cleared on completion");
	}
	#[tokio::test(start_paused = true)]
	async fn run_or_join__joins_without_invoking_producer() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		let first   = gate.run_or_join(counted(&counter, Duration::from_millis(100), 42_u32));
		yield_now().await;
		let second  = gate.run_or_join(counted(&counter, Duration::ZERO, 99_u32));
		let third   = gate.run_or_join(counted(&counter, Duration::ZERO, 77_u32));
		assert!(first.is_same(&second), "Second caller should join the first operation");
		assert!(first.is_same(&third),  "Third caller should join the first operation");
		assert_eq!(second.id(), first.id());
		assert_eq!(counter.load(Ordering::SeqCst), 1);
		assert_ok_eq!(second.await, 42);
		assert_ok_eq!(third.await,  42);
		assert_ok_eq!(first.await,  42);
		assert_eq!(counter.load(Ordering::SeqCst), 1);
	}
	#[tokio::test(start_paused = true)]
	async fn run_or_join__concurrent_callers_share_outcome() {
		let gate    = Arc::new(SingleFlight::new());
		let counter = Arc::new(AtomicUsize::new(0));
		let tasks   = (0..5_u32).map(|n| {
			let gate    = Arc::clone(&gate);
			let counter = Arc::clone(&counter);
			spawn(async move {
				gate.run_or_join(counted(&counter, Duration::from_millis(200), n)).await
			})
		}).collect::<Vec<_>>();
		let mut outcomes = Vec::new();
		for task in tasks {
			outcomes.push(task.await.unwrap().unwrap());
		}
		assert_eq!(counter.load(Ordering::SeqCst), 1);
		assert!(outcomes.iter().all(|outcome| *outcome == outcomes[0]), "All callers should see the same outcome");
	}
	#[tokio::test]
	async fn run_or_join__sequential_calls_start_fresh_work() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		let first   = gate.run_or_join(counted(&counter, Duration::ZERO, 1_u32));
		assert_ok_eq!(first.clone().await, 1);
		let second  = gate.run_or_join(counted(&counter, Duration::ZERO, 2_u32));
		assert_ok_eq!(second.clone().await, 2);
		assert!(!first.is_same(&second), "Sequential calls should not share work");
		assert_eq!(first.id(),  0);
		assert_eq!(second.id(), 1);
		assert_eq!(counter.load(Ordering::SeqCst), 2);
	}
	#[tokio::test]
	async fn run_or_join__panic_is_reported_and_slot_cleared() {
		let gate   = SingleFlight::new();
		let flight = gate.run_or_join(explode);
		assert_err_eq!(flight.await, FlightError::Panicked(s!("boom")));
		assert!(!gate.has_in_flight(), "The slot should be cleared after a panic");
		let next   = gate.run_or_join(|| async { 5_u32 });
		assert_ok_eq!(next.await, 5);
	}
	#[tokio::test(start_paused = true)]
	async fn run_or_join__runs_without_being_awaited() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		drop(gate.run_or_join(counted(&counter, Duration::from_millis(50), 3_u32)));
		sleep(Duration::from_millis(100)).await;
		assert!(!gate.has_in_flight(), "The operation should have completed on its own");
	}
	
	//		has_in_flight														
	#[tokio::test(start_paused = true)]
	async fn has_in_flight() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		assert!(!gate.has_in_flight(), "Nothing should be in flight yet");
		let flight  = gate.run_or_join(counted(&counter, Duration::from_millis(100), 42_u32));
		assert!(gate.has_in_flight(), "The operation should be in flight");
		assert!(gate.has_in_flight(), "Checking should not change anything");
		assert_ok_eq!(flight.await, 42);
		assert!(!gate.has_in_flight(), "The operation should have completed");
	}
	
	//		clear																
	#[tokio::test(start_paused = true)]
	async fn clear__forgets_in_flight() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		let flight  = gate.run_or_join(counted(&counter, Duration::from_secs(1), 42_u32));
		assert!(gate.has_in_flight(), "The operation should be in flight");
		gate.clear();
		assert!(!gate.has_in_flight(), "The slot should be empty after clearing");
		assert_ok_eq!(flight.await, 42);
	}
	#[tokio::test(start_paused = true)]
	async fn clear__allows_new_work_without_cancelling() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		let first   = gate.run_or_join(counted(&counter, Duration::from_millis(200), 1_u32));
		gate.clear();
		let second  = gate.run_or_join(counted(&counter, Duration::ZERO, 2_u32));
		assert!(!first.is_same(&second), "Work after clearing should be independent");
		assert_ok_eq!(second.await, 2);
		assert_ok_eq!(first.await,  1);
		assert_eq!(counter.load(Ordering::SeqCst), 2);
	}
	#[tokio::test(start_paused = true)]
	async fn clear__old_completion_keeps_new_slot() {
		let gate    = SingleFlight::new();
		let counter = Arc::new(AtomicUsize::new(0));
		let first   = gate.run_or_join(counted(&counter, Duration::from_millis(100), 1_u32));
		gate.clear();
		let second  = gate.run_or_join(counted(&counter, Duration::from_millis(500), 2_u32));
		assert_ok_eq!(first.await, 1);
		assert!(gate.has_in_flight(), "The newer operation should still be in flight");
		let joined  = gate.run_or_join(counted(&counter, Duration::ZERO, 3_u32));
		assert!(joined.is_same(&second), "Callers should join the newer operation");
		assert_ok_eq!(joined.await, 2);
		assert!(!gate.has_in_flight(), "The slot should be cleared once the newer operation completes");
	}
	#[test]
	fn clear__when_empty() {
		let gate = SingleFlight::<u32>::new();
		gate.clear();
		assert!(!gate.has_in_flight(), "Clearing an empty slot should be harmless");
	}
}

#[cfg(test)]
mod flight {
	use super::*;
	
	//		peek																
	#[tokio::test]
	async fn peek() {
		let gate   = SingleFlight::new();
		let flight = gate.run_or_join(|| async { 7_u32 });
		assert_none!(flight.peek());
		assert_ok_eq!(flight.clone().await, 7);
		let outcome = assert_some!(flight.peek());
		assert_eq!(outcome, &Ok(7));
	}
	
	//		fmt																	
	#[tokio::test]
	async fn debug() {
		let gate   = SingleFlight::new();
		let flight = gate.run_or_join(|| async { 7_u32 });
		assert_eq!(format!("{flight:?}"), "Flight { id: 0, .. }");
		assert_ok_eq!(flight.await, 7);
	}
}

#[cfg(test)]
mod flight_error {
	use super::*;
	
	//		from																
	#[tokio::test]
	async fn from__cancelled() {
		let handle = spawn(sleep(Duration::from_secs(60)));
		handle.abort();
		let err    = handle.await.unwrap_err();
		assert_eq!(FlightError::from(err), FlightError::Cancelled);
	}
	#[tokio::test]
	async fn from__panicked_with_string() {
		let handle = spawn(explode_with(s!("formatted boom")));
		let err    = handle.await.unwrap_err();
		assert_eq!(FlightError::from(err), FlightError::Panicked(s!("formatted boom")));
	}
	
	//		fmt																	
	#[test]
	fn display() {
		assert_eq!(FlightError::Cancelled.to_string(),              "The in-flight operation was cancelled");
		assert_eq!(FlightError::Panicked(s!("boom")).to_string(), "The in-flight operation panicked: boom");
	}
}
