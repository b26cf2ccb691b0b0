//! # Cola Acotada de Tareas
//! src/workers/queue.rs
//!
//! Buffer circular de capacidad fija protegido por un `Mutex` y dos
//! `Condvar` ("no vacía" y "no llena"). Es un monitor clásico
//! productor/consumidor:
//!
//! - `enqueue` bloquea mientras `count == capacity`
//! - `dequeue` bloquea mientras `count == 0`
//! - orden FIFO estricto, sin prioridades ni cancelación
//!
//! Las dos condiciones solo se usan con el lock propio de la cola.

use serde::Serialize;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Estado interno protegido por el lock
struct Ring<T> {
    /// Slots del buffer circular (`None` = libre)
    slots: Vec<Option<T>>,

    /// Índice del elemento más antiguo
    head: usize,

    /// Elementos presentes (0..=capacity)
    count: usize,

    /// Cola cerrada: no admite más tareas
    closed: bool,

    enqueued_total: u64,
    dequeued_total: u64,
}

impl<T> Ring<T> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    fn push(&mut self, item: T) {
        let tail = (self.head + self.count) % self.capacity();
        self.slots[tail] = Some(item);
        self.count += 1;
        self.enqueued_total += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        self.dequeued_total += 1;
        item
    }
}

/// Cola FIFO acotada y bloqueante
pub struct TaskQueue<T> {
    ring: Mutex<Ring<T>>,

    /// Se señala cuando entra un elemento
    not_empty: Condvar,

    /// Se señala cuando sale un elemento
    not_full: Condvar,
}

impl<T> TaskQueue<T> {
    /// Crea una cola vacía con capacidad fija
    ///
    /// # Panics
    ///
    /// Si `capacity == 0` (la config valida esto antes).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be >= 1");

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            ring: Mutex::new(Ring {
                slots,
                head: 0,
                count: 0,
                closed: false,
                enqueued_total: 0,
                dequeued_total: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    // Ninguna sección crítica hace panic: un lock envenenado conserva un
    // ring consistente.
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Encola una tarea al final
    ///
    /// Bloquea mientras la cola esté llena. Nunca descarta la tarea: si la
    /// cola fue cerrada se devuelve en `Err`.
    pub fn enqueue(&self, item: T) -> Result<(), T> {
        let mut ring = self.lock();

        while ring.is_full() && !ring.closed {
            ring = self
                .not_full
                .wait(ring)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }

        if ring.closed {
            return Err(item);
        }

        ring.push(item);
        drop(ring);

        // Despertar a un consumidor bloqueado
        self.not_empty.notify_one();
        Ok(())
    }

    /// Intenta encolar sin bloquear
    ///
    /// Devuelve la tarea si la cola está llena o cerrada.
    pub fn try_enqueue(&self, item: T) -> Result<(), T> {
        let mut ring = self.lock();
        if ring.closed || ring.is_full() {
            return Err(item);
        }
        ring.push(item);
        drop(ring);

        self.not_empty.notify_one();
        Ok(())
    }

    /// Desencola la tarea más antigua
    ///
    /// Bloquea mientras la cola esté vacía. Solo devuelve `None` cuando la
    /// cola fue cerrada y ya no quedan tareas.
    pub fn dequeue(&self) -> Option<T> {
        let mut ring = self.lock();

        loop {
            if let Some(item) = ring.pop() {
                drop(ring);
                // Despertar a un productor bloqueado
                self.not_full.notify_one();
                return Some(item);
            }

            if ring.closed {
                return None;
            }

            ring = self
                .not_empty
                .wait(ring)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Cierra la cola y despierta a todos los que esperan
    ///
    /// Las tareas pendientes siguen disponibles para `dequeue`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Retorna el tamaño actual de la cola
    pub(crate) fn len(&self) -> usize {
        self.lock().count
    }

    /// Retorna la capacidad máxima
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Obtiene estadísticas de la cola
    pub fn stats(&self) -> QueueStats {
        let ring = self.lock();
        QueueStats {
            len: ring.count,
            capacity: ring.capacity(),
            enqueued_total: ring.enqueued_total,
            dequeued_total: ring.dequeued_total,
        }
    }
}

/// Estadísticas de una cola
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub len: usize,
    pub capacity: usize,
    pub enqueued_total: u64,
    pub dequeued_total: u64,
}

impl QueueStats {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new(4);
        for i in 0..4 {
            queue.enqueue(i).unwrap();
        }
        let out: Vec<_> = (0..4).map(|_| queue.dequeue().unwrap()).collect();
        assert_eq!(out, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_wraparound_keeps_fifo() {
        let queue = TaskQueue::new(3);
        let mut expected = Vec::new();
        let mut got = Vec::new();

        // Suficientes vueltas para recorrer el buffer varias veces
        for i in 0..10 {
            queue.enqueue(i).unwrap();
            expected.push(i);
            if i % 2 == 1 {
                got.push(queue.dequeue().unwrap());
                got.push(queue.dequeue().unwrap());
            }
        }
        while queue.len() > 0 {
            got.push(queue.dequeue().unwrap());
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn test_capacity_bound() {
        let queue = TaskQueue::new(2);
        assert!(queue.try_enqueue(1).is_ok());
        assert!(queue.try_enqueue(2).is_ok());
        assert_eq!(queue.try_enqueue(3), Err(3)); // Cola llena
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.capacity(), 2);
    }

    #[test]
    fn test_try_enqueue_after_close() {
        let queue: TaskQueue<u32> = TaskQueue::new(2);
        queue.close();
        assert_eq!(queue.try_enqueue(7), Err(7));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_enqueue_blocks_until_dequeue() {
        let queue = Arc::new(TaskQueue::new(1));
        queue.enqueue(1).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let producer = {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                queue.enqueue(2).unwrap();
                done.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst), "enqueue on a full queue returned early");
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.dequeue(), Some(1));
        producer.join().unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(queue.dequeue(), Some(2));
    }

    #[test]
    fn test_dequeue_blocks_until_enqueue() {
        let queue = Arc::new(TaskQueue::new(2));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!consumer.is_finished());

        queue.enqueue(7).unwrap();
        assert_eq!(consumer.join().unwrap(), Some(7));
    }

    #[test]
    fn test_close_drains_then_returns_none() {
        let queue = TaskQueue::new(3);
        queue.enqueue("a").unwrap();
        queue.enqueue("b").unwrap();
        queue.close();

        assert_eq!(queue.enqueue("c"), Err("c"));
        assert_eq!(queue.dequeue(), Some("a"));
        assert_eq!(queue.dequeue(), Some("b"));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_closed());
    }

    #[test]
    fn test_close_wakes_blocked_consumers() {
        let queue: Arc<TaskQueue<u32>> = Arc::new(TaskQueue::new(1));
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || queue.dequeue())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        queue.close();
        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), None);
        }
    }

    #[test]
    fn test_close_wakes_blocked_producer() {
        let queue = Arc::new(TaskQueue::new(1));
        queue.enqueue(1).unwrap();
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(2))
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert_eq!(producer.join().unwrap(), Err(2));
    }

    #[test]
    fn test_one_producer_many_consumers_fifo_and_single_delivery() {
        const TOTAL: usize = 2_000;
        let queue = Arc::new(TaskQueue::new(4));
        let taken = Arc::new(Mutex::new(Vec::new()));

        let consumers: Vec<_> = (0..6)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let taken = Arc::clone(&taken);
                thread::spawn(move || {
                    let mut local = Vec::new();
                    while let Some(item) = queue.dequeue() {
                        local.push(item);
                    }
                    taken.lock().unwrap().push(local);
                })
            })
            .collect();

        for i in 0..TOTAL {
            queue.enqueue(i).unwrap();
            assert!(queue.len() <= 4);
        }
        queue.close();
        for consumer in consumers {
            consumer.join().unwrap();
        }

        let per_consumer = taken.lock().unwrap();
        let mut seen = HashSet::new();
        for local in per_consumer.iter() {
            // Cada consumidor recibe sus tareas en orden creciente (FIFO global)
            assert!(local.windows(2).all(|w| w[0] < w[1]));
            for item in local {
                assert!(seen.insert(*item), "task {} delivered twice", item);
            }
        }
        assert_eq!(seen.len(), TOTAL);

        let stats = queue.stats();
        assert_eq!(stats.enqueued_total, TOTAL as u64);
        assert_eq!(stats.dequeued_total, TOTAL as u64);
        assert_eq!(stats.len, 0);
    }

    #[test]
    #[should_panic(expected = "queue capacity must be >= 1")]
    fn test_zero_capacity_panics() {
        let _queue: TaskQueue<u8> = TaskQueue::new(0);
    }
}
