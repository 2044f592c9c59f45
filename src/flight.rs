//! This module provides single-flight deduplication of asynchronous work.
//! 
//! A [`SingleFlight`] holds at most one in-flight operation. Asking it to run
//! something while an operation is already in flight returns a handle to that
//! same operation, without invoking the producer at all. Once the operation
//! completes, successfully or not, the slot is cleared automatically, so that
//! the next call starts fresh work.
//! 
//! Operations are spawned onto the Tokio runtime, and so they run to completion
//! even if nobody is awaiting them. Handles are [`Flight`]s, which can be
//! cloned and awaited any number of times, all resolving to the same outcome.
//! 

//		Modules

#[cfg(test)]
#[path = "tests/flight.rs"]
mod tests;



//		Packages

use core::{
	fmt::{Debug, self},
	pin::Pin,
	sync::atomic::{AtomicU64, Ordering},
	task::{Context, Poll},
};
use futures_util::future::{BoxFuture, FutureExt as _, Shared};
use parking_lot::Mutex;
use rubedo::sugar::s;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::{
	spawn,
	task::JoinError,
};
use tracing::debug;



//		Enums

//		FlightError																
/// Errors that can occur while awaiting an in-flight operation.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum FlightError {
	/// The operation was cancelled by the runtime before it completed, for
	/// instance because the runtime was shut down.
	#[error("The in-flight operation was cancelled")]
	Cancelled,
	
	/// The operation panicked. The panic message is included when it could be
	/// recovered.
	#[error("The in-flight operation panicked: {0}")]
	Panicked(String),
}

//󰭅		From<JoinError>															
impl From<JoinError> for FlightError {
	//		from																
	fn from(err: JoinError) -> Self {
		if !err.is_panic() {
			return Self::Cancelled;
		}
		let payload = err.into_panic();
		let message = payload.downcast_ref::<&str>().map(|msg| (*msg).to_owned())
			.or_else(|| payload.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| s!("unknown panic payload"))
		;
		Self::Panicked(message)
	}
}



//		Structs

//		Flight																	
/// A handle to an in-flight operation.
/// 
/// Awaiting a flight yields the outcome of the operation. Any number of clones
/// can be awaited, and they all resolve to the same outcome. Dropping a flight
/// does not cancel the operation.
/// 
#[derive(Clone)]
#[must_use = "Dropping a flight does not cancel it, but its outcome is lost"]
pub struct Flight<T: Clone> {
	//		Private properties													
	/// The sequence number of the operation within its [`SingleFlight`].
	id:     u64,
	
	/// The shared future that resolves once the spawned task finishes.
	inner:  Shared<BoxFuture<'static, Result<T, FlightError>>>,
}

//󰭅		Flight																	
impl<T> Flight<T>
where
	T: Clone + Send + Sync + 'static,
{
	//		Constructors														
	
	//		spawn																
	/// Spawns an operation and returns a handle to it.
	/// 
	/// # Parameters
	/// 
	/// * `id`   - The sequence number of the operation.
	/// * `work` - The future to run.
	/// 
	fn spawn<Fut>(id: u64, work: Fut) -> Self
	where
		Fut: Future<Output = T> + Send + 'static,
	{
		let handle = spawn(work);
		Self {
			id,
			inner: handle.map(|outcome| outcome.map_err(FlightError::from)).boxed().shared(),
		}
	}
	
	//		Public methods														
	
	//		id																	
	/// The sequence number of the operation.
	/// 
	/// Each [`SingleFlight`] numbers the operations it starts, beginning at
	/// zero. Joined handles share the number of the operation they joined.
	/// 
	#[must_use]
	pub const fn id(&self) -> u64 {
		self.id
	}
	
	//		is_same																
	/// Whether two handles refer to the same operation.
	#[must_use]
	pub fn is_same(&self, other: &Self) -> bool {
		self.inner.ptr_eq(&other.inner)
	}
	
	//		peek																
	/// The outcome of the operation, if it has already been observed.
	/// 
	/// This only returns a value once some handle has been polled to
	/// completion. It never blocks.
	/// 
	#[must_use]
	pub fn peek(&self) -> Option<&Result<T, FlightError>> {
		self.inner.peek()
	}
}

//󰭅		Debug																	
impl<T: Clone> Debug for Flight<T> {
	//		fmt																	
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Flight").field("id", &self.id).finish_non_exhaustive()
	}
}

//󰭅		Future																	
impl<T: Clone> Future for Flight<T> {
	type Output = Result<T, FlightError>;
	
	//		poll																
	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.get_mut().inner.poll_unpin(cx)
	}
}

//		SingleFlight															
/// Ensures that at most one logical operation runs at a time.
/// 
/// There is exactly one slot, i.e. this deduplicates a single logical
/// operation rather than a keyed family of operations.
/// 
pub struct SingleFlight<T: Clone> {
	//		Private properties													
	/// The sequence number to give to the next operation.
	next_id: AtomicU64,
	
	/// The operation currently in flight, if any. The spawned task holds a weak
	/// reference to this, in order to clear it upon completion.
	slot:    Arc<Mutex<Option<Flight<T>>>>,
}

//󰭅		SingleFlight															
impl<T> SingleFlight<T>
where
	T: Clone + Send + Sync + 'static,
{
	//		Constructors														
	
	//		new																	
	/// Creates a new, empty single-flight slot.
	#[must_use]
	pub fn new() -> Self {
		Self {
			next_id: AtomicU64::new(0),
			slot:    Arc::new(Mutex::new(None)),
		}
	}
	
	//		Public methods														
	
	//		run_or_join															
	/// Runs a new operation, or joins the one already in flight.
	/// 
	/// If an operation is in flight, a handle to it is returned and the
	/// producer is not invoked. Otherwise the producer is invoked to create
	/// the work, which is spawned and recorded as in flight until it finishes.
	/// 
	/// The producer is invoked while the slot is held, which makes the decision
	/// to start new work atomic. It must therefore not call back into the same
	/// [`SingleFlight`].
	/// 
	/// # Parameters
	/// 
	/// * `producer` - Creates the work to run. Only invoked when nothing is in
	///                flight.
	/// 
	pub fn run_or_join<F, Fut>(&self, producer: F) -> Flight<T>
	where
		F:   FnOnce() -> Fut,
		Fut: Future<Output = T> + Send + 'static,
	{
		let mut slot = self.slot.lock();
		if let Some(ref existing) = *slot {
			debug!(flight = existing.id, "Joining in-flight operation");
			return existing.clone();
		}
		let id     = self.next_id.fetch_add(1, Ordering::Relaxed);
		let work   = producer();
		let guard  = SlotGuard { slot: Arc::downgrade(&self.slot), id };
		let flight = Flight::spawn(id, async move {
			let _guard = guard;
			work.await
		});
		*slot = Some(flight.clone());
		debug!(flight = id, "Started new operation");
		flight
	}
	
	//		has_in_flight														
	/// Whether an operation is currently in flight.
	#[must_use]
	pub fn has_in_flight(&self) -> bool {
		self.slot.lock().is_some()
	}
	
	//		clear																
	/// Forgets the operation currently in flight, without cancelling it.
	/// 
	/// Anyone already holding a handle still observes its completion. The next
	/// call to [`run_or_join()`](Self::run_or_join()) starts independent work,
	/// even if the forgotten operation is still running, and the forgotten
	/// operation does not clear the slot when it eventually finishes.
	/// 
	pub fn clear(&self) {
		if let Some(flight) = self.slot.lock().take() {
			debug!(flight = flight.id, "Cleared in-flight operation");
		}
	}
}

//󰭅		Debug																	
impl<T: Clone> Debug for SingleFlight<T> {
	//		fmt																	
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SingleFlight")
			.field("in_flight", &self.slot.lock().as_ref().map(|flight| flight.id))
			.finish_non_exhaustive()
	}
}

//󰭅		Default																	
impl<T> Default for SingleFlight<T>
where
	T: Clone + Send + Sync + 'static,
{
	//		default																
	fn default() -> Self {
		Self::new()
	}
}

//		SlotGuard																
/// Clears the slot when the owning operation finishes, however it finishes.
struct SlotGuard<T: Clone> {
	//		Private properties													
	/// The slot to clear.
	slot: Weak<Mutex<Option<Flight<T>>>>,
	
	/// The operation that owns this guard. The slot is only cleared if it
	/// still holds this operation.
	id:   u64,
}

//󰭅		Drop																	
impl<T: Clone> Drop for SlotGuard<T> {
	//		drop																
	fn drop(&mut self) {
		let Some(cell) = self.slot.upgrade() else {
			return;
		};
		let mut current = cell.lock();
		if current.as_ref().is_some_and(|flight| flight.id == self.id) {
			*current = None;
		}
	}
}
