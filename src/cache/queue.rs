//! Recency Queue Module
//!
//! Doubly linked list of keys stored in an arena. The head is the least
//! recently used key and the tail the most recently used one.

use crate::error::QueueError;

// == Node Handle ==
/// Stable handle to a node living in a [`Queue`].
///
/// Handles are only valid while the node is linked; a dequeued node's slot is
/// recycled by the next `enqueue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

// == Node ==
/// A list element holding a key and the links to its neighbours.
#[derive(Debug)]
struct Node<T> {
    content: T,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

// == Queue ==
/// Doubly linked queue with O(1) enqueue, dequeue and move-to-tail.
#[derive(Debug)]
pub struct Queue<T> {
    /// Node storage, `None` marks a free slot
    slots: Vec<Option<Node<T>>>,
    /// Indices of free slots available for reuse
    free: Vec<usize>,
    /// Least recently used node
    head: Option<NodeId>,
    /// Most recently used node
    tail: Option<NodeId>,
    /// Number of linked nodes
    len: usize,
}

impl<T> Queue<T> {
    // == Constructor ==
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty queue with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Enqueue ==
    /// Appends `content` at the tail and returns the handle of its node.
    pub fn enqueue(&mut self, content: T) -> NodeId {
        let node = Node {
            content,
            previous: None,
            next: None,
        };

        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };

        self.link_tail(id);
        id
    }

    // == Dequeue ==
    /// Removes the head node and returns its content.
    ///
    /// Fails with [`QueueError::EmptyCollection`] when the queue is empty.
    pub fn dequeue(&mut self) -> Result<T, QueueError> {
        let head = self.head.ok_or(QueueError::EmptyCollection)?;
        self.unlink(head);

        let node = self.slots[head.0]
            .take()
            .ok_or(QueueError::EmptyCollection)?;
        self.free.push(head.0);

        Ok(node.content)
    }

    // == Move To Tail ==
    /// Detaches the node `id` from its position and re-appends it at the tail.
    ///
    /// Does nothing if the node already is the tail or is not linked.
    pub fn move_to_tail(&mut self, id: NodeId) {
        if self.tail == Some(id) || self.node(id).is_none() {
            return;
        }

        self.unlink(id);
        self.link_tail(id);
    }

    // == Accessors ==
    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the queue holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the least recently used node.
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Handle of the most recently used node.
    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    /// Returns the content of the node `id`, if it is linked.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.content)
    }

    /// Iterates over the contents from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }

    // == Link Helpers ==
    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Links a detached node after the current tail.
    fn link_tail(&mut self, id: NodeId) {
        let old_tail = self.tail;

        if let Some(node) = self.node_mut(id) {
            node.previous = old_tail;
            node.next = None;
        }

        match old_tail.and_then(|tail| self.node_mut(tail)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }

        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlinks a node from its neighbours and clears its own links.
    fn unlink(&mut self, id: NodeId) {
        let (previous, next) = match self.node_mut(id) {
            Some(node) => (node.previous.take(), node.next.take()),
            None => return,
        };

        match previous.and_then(|p| self.node_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }

        match next.and_then(|n| self.node_mut(n)) {
            Some(next_node) => next_node.previous = previous,
            None => self.tail = previous,
        }

        self.len -= 1;
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Head-to-tail iterator over a [`Queue`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    queue: &'a Queue<T>,
    cursor: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.content)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with_elements() -> (Queue<u32>, Vec<NodeId>) {
        let mut queue = Queue::new();
        let ids = (1..=4).map(|n| queue.enqueue(n)).collect();
        (queue, ids)
    }

    fn contents(queue: &Queue<u32>) -> Vec<u32> {
        queue.iter().copied().collect()
    }

    fn links(queue: &Queue<u32>, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let node = queue.node(id).unwrap();
        (node.previous, node.next)
    }

    #[test]
    fn test_enqueue_keeps_order() {
        let (queue, ids) = queue_with_elements();

        assert_eq!(contents(&queue), vec![1, 2, 3, 4]);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.head(), Some(ids[0]));
        assert_eq!(queue.tail(), Some(ids[3]));
    }

    #[test]
    fn test_enqueue_single_is_head_and_tail() {
        let mut queue = Queue::new();
        let id = queue.enqueue("only");

        assert_eq!(queue.head(), Some(id));
        assert_eq!(queue.tail(), Some(id));
        assert_eq!(queue.get(id), Some(&"only"));
    }

    #[test]
    fn test_dequeue_empty() {
        let mut queue: Queue<u32> = Queue::new();
        assert_eq!(queue.dequeue(), Err(QueueError::EmptyCollection));
    }

    #[test]
    fn test_dequeue_returns_front() {
        let (mut queue, _) = queue_with_elements();

        assert_eq!(queue.dequeue(), Ok(1));
        assert_eq!(contents(&queue), vec![2, 3, 4]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_dequeue_all() {
        let (mut queue, _) = queue_with_elements();

        for expected in 1..=4 {
            assert_eq!(queue.dequeue(), Ok(expected));
        }

        assert!(queue.is_empty());
        assert_eq!(queue.head(), None);
        assert_eq!(queue.tail(), None);
        assert!(contents(&queue).is_empty());
        assert_eq!(queue.dequeue(), Err(QueueError::EmptyCollection));
    }

    #[test]
    fn test_dequeue_down_to_one_clears_links() {
        let (mut queue, ids) = queue_with_elements();

        for _ in 0..3 {
            queue.dequeue().unwrap();
        }

        assert_eq!(queue.head(), queue.tail());
        assert_eq!(queue.head(), Some(ids[3]));
        assert_eq!(links(&queue, ids[3]), (None, None));
    }

    #[test]
    fn test_dequeued_slot_is_reused() {
        let (mut queue, ids) = queue_with_elements();

        queue.dequeue().unwrap();
        let reused = queue.enqueue(5);

        assert_eq!(reused, ids[0]);
        assert_eq!(contents(&queue), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_move_tail_is_noop() {
        let (mut queue, ids) = queue_with_elements();

        queue.move_to_tail(ids[3]);

        assert_eq!(contents(&queue), vec![1, 2, 3, 4]);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_move_head_to_tail() {
        let (mut queue, ids) = queue_with_elements();

        queue.move_to_tail(ids[0]);

        assert_eq!(contents(&queue), vec![2, 3, 4, 1]);
        assert_eq!(queue.head(), Some(ids[1]));
        assert_eq!(queue.tail(), Some(ids[0]));
        assert_eq!(links(&queue, ids[1]), (None, Some(ids[2])));
        assert_eq!(links(&queue, ids[0]), (Some(ids[3]), None));
    }

    #[test]
    fn test_move_middle_to_tail() {
        let (mut queue, ids) = queue_with_elements();

        queue.move_to_tail(ids[1]);

        assert_eq!(contents(&queue), vec![1, 3, 4, 2]);
        assert_eq!(queue.len(), 4);
        assert_eq!(links(&queue, ids[0]), (None, Some(ids[2])));
        assert_eq!(links(&queue, ids[2]), (Some(ids[0]), Some(ids[3])));
    }

    #[test]
    fn test_move_in_two_element_queue() {
        let mut queue = Queue::new();
        let first = queue.enqueue(1);
        let second = queue.enqueue(2);

        queue.move_to_tail(first);

        assert_eq!(contents(&queue), vec![2, 1]);
        assert_eq!(links(&queue, second), (None, Some(first)));
        assert_eq!(links(&queue, first), (Some(second), None));

        // Dequeue after the reorder still walks the right way
        assert_eq!(queue.dequeue(), Ok(2));
        assert_eq!(links(&queue, first), (None, None));
    }
}
