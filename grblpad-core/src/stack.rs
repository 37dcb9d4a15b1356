use std::collections::VecDeque;

use crate::Error;

/// Size of GRBL's serial receive buffer as seen by the host
pub const RX_BUFFER_SIZE: usize = 126;

/// Ledger of commands sent to the firmware and not yet acknowledged.
///
/// GRBL acknowledges lines anonymously and in order, so the only way to know how much
/// room is left in its receive buffer is to count the bytes of everything still in flight.
/// `remaining` plus the length of every in-flight command always equals the capacity.
#[derive(Debug, Clone)]
pub struct CommandStack {
    commands: VecDeque<String>,
    remaining: usize,
    capacity: usize,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::with_capacity(RX_BUFFER_SIZE)
    }
}

impl CommandStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: VecDeque::new(),
            remaining: capacity,
            capacity,
        }
    }

    /// Free bytes left in the firmware receive buffer
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> impl ExactSizeIterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    /// Whether `command` fits in the buffer space left
    pub fn can_push(&self, command: &str) -> bool {
        command.len() <= self.remaining
    }

    /// Record `command` as sent.
    ///
    /// A command that doesn't fit is refused and the ledger is left untouched.
    pub fn push(&mut self, command: impl Into<String>) -> Result<(), Error> {
        let command = command.into();
        if !self.can_push(&command) {
            return Err(Error::BufferFull {
                needed: command.len(),
                remaining: self.remaining,
            });
        }
        self.remaining -= command.len();
        tracing::debug!(
            remaining = self.remaining,
            "Pushed `{}` on stack",
            command.trim_end()
        );
        self.commands.push_back(command);
        Ok(())
    }

    /// Retire the oldest in-flight command after the firmware acknowledged it
    pub fn pop(&mut self) -> Result<String, Error> {
        let command = self.commands.pop_front().ok_or(Error::EmptyQueue)?;
        self.remaining += command.len();
        tracing::debug!(
            remaining = self.remaining,
            "Popped `{}` from stack",
            command.trim_end()
        );
        Ok(command)
    }

    /// Forget everything in flight, used when the firmware resets and drops its buffer
    pub fn clear(&mut self) {
        self.commands.clear();
        self.remaining = self.capacity;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn balanced(stack: &CommandStack) -> bool {
        stack.remaining() + stack.in_flight().map(str::len).sum::<usize>() == stack.capacity()
    }

    #[test]
    fn push_pop_accounting() {
        let mut stack = CommandStack::default();
        let jog = "G91 X100.000 Y-100.000\r";
        for _ in 0..5 {
            assert!(stack.can_push(jog));
            stack.push(jog).unwrap();
            assert!(balanced(&stack));
        }
        assert_eq!(stack.remaining(), RX_BUFFER_SIZE - 5 * jog.len());
        assert!(!stack.can_push(jog));

        assert_eq!(stack.pop().unwrap(), jog);
        assert!(balanced(&stack));
        assert!(stack.can_push(jog));
    }

    #[test]
    fn checked_sequence_stays_balanced() {
        let mut stack = CommandStack::with_capacity(40);
        let commands = [
            "G90 X0.000 Y0.000\r",
            "G91 X-100.000 Y0.000\r",
            "G91 X0.000 Y100.000\r",
        ];
        for (i, command) in commands.iter().cycle().take(30).enumerate() {
            if i % 3 == 2 {
                let _ = stack.pop();
            } else if stack.can_push(command) {
                stack.push(*command).unwrap();
            }
            assert!(balanced(&stack));
            assert!(stack.remaining() <= stack.capacity());
        }
    }

    #[test]
    fn over_budget_push_is_refused() {
        let mut stack = CommandStack::with_capacity(25);
        stack.push("G91 X100.000 Y0.000\r").unwrap();
        assert!(matches!(
            stack.push("G91 X0.000 Y100.000\r"),
            Err(Error::BufferFull {
                needed: 20,
                remaining: 5
            })
        ));
        assert_eq!(stack.remaining(), 5);
        assert_eq!(stack.in_flight().len(), 1);
        assert!(balanced(&stack));

        stack.pop().unwrap();
        assert_eq!(stack.remaining(), stack.capacity());
    }

    #[test]
    fn pop_empty() {
        let mut stack = CommandStack::default();
        assert!(matches!(stack.pop(), Err(Error::EmptyQueue)));
        assert_eq!(stack.remaining(), RX_BUFFER_SIZE);
    }

    #[test]
    fn fifo_order() {
        let mut stack = CommandStack::default();
        stack.push("first\r").unwrap();
        stack.push("second\r").unwrap();
        assert_eq!(stack.pop().unwrap(), "first\r");
        assert_eq!(stack.pop().unwrap(), "second\r");
    }

    #[test]
    fn clear_restores_budget() {
        let mut stack = CommandStack::default();
        stack.push("G91 X100.000 Y0.000\r").unwrap();
        stack.clear();
        assert_eq!(stack.remaining(), RX_BUFFER_SIZE);
        assert_eq!(stack.in_flight().len(), 0);
    }
}
