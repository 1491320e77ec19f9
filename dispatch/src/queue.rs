use std::{iter, mem, slice};

use schema::{Order, Priority};

/// Pending orders, split by priority and kept in the order they were received
#[derive(Default, Debug)]
pub struct OrderQueue {
    emergency: Vec<Order>,
    resupply: Vec<Order>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, order: Order) {
        match order.priority {
            Priority::Emergency => self.emergency.push(order),
            Priority::Resupply => self.resupply.push(order),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.emergency.is_empty() && self.resupply.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emergency.len() + self.resupply.len()
    }

    pub fn emergencies(&self) -> &[Order] {
        &self.emergency
    }

    pub fn resupplies(&self) -> &[Order] {
        &self.resupply
    }

    /// All pending orders, emergencies first
    pub fn iter(&self) -> iter::Chain<slice::Iter<'_, Order>, slice::Iter<'_, Order>> {
        self.emergency.iter().chain(self.resupply.iter())
    }

    /// Removes and returns the oldest emergency
    pub fn pop_emergency(&mut self) -> Option<Order> {
        (!self.emergency.is_empty()).then(|| self.emergency.remove(0))
    }

    /// Removes the resupply orders at `indices` and returns them in the order given.
    /// Out-of-range or repeated indices are ignored.
    pub fn take_resupplies(&mut self, indices: &[usize]) -> Vec<Order> {
        let mut slots = mem::take(&mut self.resupply)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();

        let taken = indices
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect();

        self.resupply = slots.into_iter().flatten().collect();
        taken
    }
}

#[cfg(test)]
mod test {
    use schema::Hospital;

    use super::*;

    fn order(time: u64, name: &str, priority: &str) -> Order {
        Order::new(time, Hospital::new(name, 0, 1000), priority).expect("order")
    }

    #[test]
    fn test_enqueue_by_priority() {
        let mut queue = OrderQueue::new();
        assert!(queue.is_empty());

        queue.enqueue(order(0, "A", "Resupply"));
        queue.enqueue(order(1, "B", "Emergency"));
        queue.enqueue(order(2, "C", "Resupply"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.emergencies().len(), 1);
        assert_eq!(queue.resupplies().len(), 2);

        let names = queue
            .iter()
            .map(|o| o.hospital.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_pop_emergency_is_fifo() {
        let mut queue = OrderQueue::new();
        queue.enqueue(order(5, "A", "Emergency"));
        queue.enqueue(order(7, "B", "Emergency"));

        assert_eq!(queue.pop_emergency().map(|o| o.received_time), Some(5));
        assert_eq!(queue.pop_emergency().map(|o| o.received_time), Some(7));
        assert_eq!(queue.pop_emergency(), None);
    }

    #[test]
    fn test_take_resupplies_keeps_remainder_in_order() {
        let mut queue = OrderQueue::new();
        for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            queue.enqueue(order(i as u64, name, "Resupply"));
        }

        let taken = queue.take_resupplies(&[3, 0, 3, 9]);
        let taken = taken
            .iter()
            .map(|o| o.hospital.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(taken, vec!["D", "A"]);

        let remaining = queue
            .resupplies()
            .iter()
            .map(|o| o.hospital.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(remaining, vec!["B", "C", "E"]);
    }
}
