use std::collections::VecDeque;
use std::sync::Mutex;

use saillink_frame::Command;

/// Unbounded FIFO of pending outbound commands.
///
/// Any number of producers may `push`; exactly one consumer (the transmit
/// loop) drains with `pop`. Both operations are non-blocking — a slow
/// transmit loop simply accumulates memory, which is acceptable at
/// control-command cadence, so there is no caller-side backpressure.
#[derive(Default)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<Command>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a command. Never blocks, never fails.
    pub fn push(&self, cmd: Command) {
        self.inner.lock().unwrap().push_back(cmd);
    }

    /// Dequeue the oldest command, if any. Never blocks.
    pub fn pop(&self) -> Option<Command> {
        self.inner.lock().unwrap().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn pops_in_fifo_order() {
        let queue = CommandQueue::new();
        queue.push(Command::SetCourse(90));
        queue.push(Command::StartRoute);
        queue.push(Command::StopRoute);

        assert_eq!(queue.pop(), Some(Command::SetCourse(90)));
        assert_eq!(queue.pop(), Some(Command::StartRoute));
        assert_eq!(queue.pop(), Some(Command::StopRoute));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn empty_queue_pops_none() {
        let queue = CommandQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        const PRODUCERS: u16 = 8;
        const PER_PRODUCER: u16 = 50;

        let queue = Arc::new(CommandQueue::new());
        let mut producers = Vec::new();
        for p in 0..PRODUCERS {
            let queue = Arc::clone(&queue);
            producers.push(thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push(Command::SetCourse(p * PER_PRODUCER + i));
                }
            }));
        }
        for producer in producers {
            producer.join().expect("producer thread should finish");
        }

        assert_eq!(queue.len(), (PRODUCERS * PER_PRODUCER) as usize);
        let mut courses: Vec<u16> = std::iter::from_fn(|| queue.pop())
            .map(|cmd| match cmd {
                Command::SetCourse(course) => course,
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        courses.sort_unstable();
        let expected: Vec<u16> = (0..PRODUCERS * PER_PRODUCER).collect();
        assert_eq!(courses, expected);
    }
}
