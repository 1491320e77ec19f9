use crate::{Flight, Order, OrderError, OrderRequest};

/// A flight scheduler for processing incoming orders
pub trait Scheduler {
    /// Pending orders queued for processing by the scheduler
    type UnfulfilledOrders<'a>: Iterator<Item = &'a Order>
    where
        Self: 'a;
    /// Flights which have been launched by this scheduler
    type LaunchedFlights<'a>: Iterator<Item = &'a Flight>
    where
        Self: 'a;

    /// Returns a list of any orders queued for processing by this scheduler,
    /// but which have not yet been assigned to a flight.
    fn unfulfilled_orders<'a>(&'a self) -> Self::UnfulfilledOrders<'a>;

    /// Queue an order for delivery, rejecting it if it cannot be resolved to a known hospital
    /// and priority. A rejected order is never queued.
    fn queue_order(&mut self, request: OrderRequest) -> Result<(), OrderError>;

    /// Return a list of all flights launched at the given time.
    /// Calling this twice for the same time launches nothing the second time
    /// unless new orders were queued in between.
    fn launch_flights<'a>(&'a mut self, current_time: u64) -> Self::LaunchedFlights<'a>;
}
