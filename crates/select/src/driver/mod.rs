//! Tokio driver that runs a control's fetch effects.
//!
//! # Purpose
//!
//! * Turns [`Effect`]s drained from a [`ComboSelect`] into spawned fetch tasks.
//! * Feeds completions back into the control on the owner's task.
//!
//! # Mental model
//!
//! * The control stays single-owner and synchronous. Tasks never touch it;
//!   they send a [`Completion`] over an unbounded channel and the owner
//!   applies it with [`SelectDriver::poll_completions`] or
//!   [`SelectDriver::next_completion`].
//! * Every task races its fetch against one shared [`CancellationToken`].
//!   Unmounting cancels the token, so in-flight fetches stop at their next
//!   await point and send nothing.
//!
//! # Invariants
//!
//! * Must not apply any completion after [`SelectDriver::unmount`].
//! * Must start follow-up effects produced by applying a completion.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::bridge::PageTicket;
use crate::control::{ComboSelect, Effect};
use crate::option::SelectOption;
use crate::resolver::ResolveTicket;
use crate::source::{ByIdsSource, FetchError, OptionsSource, PageResponse};

/// Result of one spawned fetch.
#[derive(Debug)]
pub enum Completion {
	Page {
		ticket: PageTicket,
		result: Result<PageResponse, FetchError>,
	},
	Resolved {
		ticket: ResolveTicket,
		result: Result<Vec<SelectOption>, FetchError>,
	},
}

/// Owns a control and runs its fetches against remote sources.
pub struct SelectDriver {
	control: ComboSelect,
	options: Arc<dyn OptionsSource>,
	by_ids: Arc<dyn ByIdsSource>,
	cancel: CancellationToken,
	tx: mpsc::UnboundedSender<Completion>,
	rx: mpsc::UnboundedReceiver<Completion>,
	in_flight: usize,
}

impl SelectDriver {
	pub fn new(control: ComboSelect, options: Arc<dyn OptionsSource>, by_ids: Arc<dyn ByIdsSource>) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			control,
			options,
			by_ids,
			cancel: CancellationToken::new(),
			tx,
			rx,
			in_flight: 0,
		}
	}

	pub fn control(&self) -> &ComboSelect {
		&self.control
	}

	/// Mutable access for forwarding user input. Call [`pump`](Self::pump)
	/// afterwards to start any fetch the input produced.
	pub fn control_mut(&mut self) -> &mut ComboSelect {
		&mut self.control
	}

	/// Number of spawned fetches whose completion has not been applied.
	pub fn in_flight(&self) -> usize {
		self.in_flight
	}

	/// Ticks the control and spawns every queued effect. Returns how many
	/// tasks were started.
	pub fn pump(&mut self, now: Instant) -> usize {
		self.control.tick(now);
		self.spawn_effects()
	}

	/// Applies every completion that has already arrived.
	pub fn poll_completions(&mut self) -> usize {
		let mut applied = 0;
		while let Ok(completion) = self.rx.try_recv() {
			self.apply(completion);
			applied += 1;
		}
		applied
	}

	/// Waits for one completion and applies it.
	///
	/// Returns `false` when nothing is in flight or the driver was cancelled.
	pub async fn next_completion(&mut self) -> bool {
		if self.in_flight == 0 {
			return false;
		}
		let completion = tokio::select! {
			biased;
			_ = self.cancel.cancelled() => return false,
			completion = self.rx.recv() => completion,
		};
		match completion {
			Some(completion) => {
				self.apply(completion);
				true
			}
			None => false,
		}
	}

	/// Runs until no fetch is in flight and no debounced search is pending.
	pub async fn settle(&mut self) {
		loop {
			self.pump(Instant::now());
			if self.next_completion().await {
				continue;
			}
			if self.in_flight > 0 {
				// Cancelled with tasks outstanding.
				return;
			}
			match self.control.next_deadline() {
				Some(deadline) => tokio::time::sleep_until(deadline).await,
				None => return,
			}
		}
	}

	/// Cancels outstanding fetches and drops the control.
	pub fn unmount(self) {
		debug!(in_flight = self.in_flight, "driver.unmount");
		self.cancel.cancel();
	}

	fn apply(&mut self, completion: Completion) {
		self.in_flight = self.in_flight.saturating_sub(1);
		match completion {
			Completion::Page { ticket, result } => {
				let outcome = self.control.apply_page(&ticket, result);
				trace!(generation = ticket.generation, page = ticket.page, ?outcome, "driver.page");
			}
			Completion::Resolved { ticket, result } => {
				let outcome = self.control.apply_resolved(&ticket, result);
				trace!(seq = ticket.seq, ?outcome, "driver.resolved");
			}
		}
		self.spawn_effects();
	}

	fn spawn_effects(&mut self) -> usize {
		let effects = self.control.drain_effects();
		let started = effects.len();
		for effect in effects {
			self.spawn(effect);
		}
		started
	}

	fn spawn(&mut self, effect: Effect) {
		let cancel = self.cancel.clone();
		let tx = self.tx.clone();
		self.in_flight += 1;

		match effect {
			Effect::FetchPage(request) => {
				debug!(generation = request.ticket.generation, page = request.query.page, query = %request.query.text, "driver.fetch_page");
				let source = Arc::clone(&self.options);
				tokio::spawn(async move {
					let result = tokio::select! {
						_ = cancel.cancelled() => return,
						result = source.fetch_page(request.query) => result,
					};
					let _ = tx.send(Completion::Page {
						ticket: request.ticket,
						result,
					});
				});
			}
			Effect::FetchByIds(ticket) => {
				debug!(seq = ticket.seq, count = ticket.ids.len(), "driver.fetch_by_ids");
				let source = Arc::clone(&self.by_ids);
				tokio::spawn(async move {
					let result = tokio::select! {
						_ = cancel.cancelled() => return,
						result = source.fetch_by_ids(&ticket.ids) => result,
					};
					let _ = tx.send(Completion::Resolved { ticket, result });
				});
			}
		}
	}
}

impl Drop for SelectDriver {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

#[cfg(test)]
mod tests;
