//! Fixed-capacity circular buffer of frames.
//!
//! The loop owns all of its frame storage, allocated once at
//! construction. Every frame handed out borrows that storage and will be
//! overwritten after at most `N` advances; callers wanting persistence
//! must copy. The borrow checker ties each loan to the loop, so a stale
//! reference cannot survive an `advance`.

use crate::capture::Frame;

/// A ring of `N` owned frame slots with an optional pinned-oldest marker.
///
/// `current` is the write slot for the incoming frame. Advancing rotates
/// the ring forward by one; once the index wraps to zero the buffer is
/// considered full and the whole ring is live history.
pub struct FrameLoop {
    frames: Vec<Frame>,
    current: usize,
    buffer_full: bool,
    oldest: Option<usize>,
}

impl FrameLoop {
    /// Creates a loop of `size` zeroed frames.
    pub fn new(size: usize) -> Self {
        assert!(size >= 1, "frame loop needs at least one slot");
        Self {
            frames: vec![Frame::default(); size],
            current: 0,
            buffer_full: false,
            oldest: None,
        }
    }

    fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.frames.len()
    }

    /// Rotates the current slot one forward and returns the new current
    /// frame.
    ///
    /// Overwriting the pinned-oldest slot clears the pin.
    pub fn advance(&mut self) -> &mut Frame {
        self.current = self.next_index(self.current);

        if self.current == 0 {
            self.buffer_full = true;
        }

        if Some(self.current) == self.oldest {
            self.oldest = None;
        }

        &mut self.frames[self.current]
    }

    /// Returns the current frame.
    pub fn current(&self) -> &Frame {
        &self.frames[self.current]
    }

    /// Returns the current frame mutably. This is the write slot for the
    /// next incoming frame.
    pub fn current_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.current]
    }

    /// Returns the frame written immediately before the current one.
    pub fn recent(&self) -> &Frame {
        let size = self.frames.len();
        &self.frames[(self.current + size - 1) % size]
    }

    /// Copies the most recently completed frame into `dst`.
    ///
    /// Use this to export a stable view; the returned copy survives
    /// subsequent advances.
    pub fn copy_recent(&self, dst: &mut Frame) {
        dst.copy_from(self.recent());
    }

    /// Returns the oldest retained frame.
    ///
    /// This is the pinned frame if one is set, otherwise the slot about
    /// to be overwritten next.
    pub fn oldest(&self) -> &Frame {
        match self.oldest {
            Some(index) => &self.frames[index],
            None => &self.frames[self.next_index(self.current)],
        }
    }

    /// Pins the current frame as oldest. `oldest` and `history` will not
    /// reach behind it until the pin is overwritten or replaced.
    pub fn set_as_oldest(&mut self) {
        self.oldest = Some(self.current);
    }

    /// Index of the first history entry.
    fn history_start(&self) -> usize {
        match self.oldest {
            Some(index) => index,
            None if self.buffer_full => self.next_index(self.current),
            None => 0,
        }
    }

    /// Number of frames `history` yields.
    pub fn history_len(&self) -> usize {
        let size = self.frames.len();
        match self.oldest {
            Some(index) => (self.current + size - index) % size + 1,
            None if self.buffer_full => size,
            None => self.current + 1,
        }
    }

    /// Iterates the retained frames in capture order, oldest first and
    /// ending at the current frame.
    ///
    /// Only slots that have actually been written are yielded. The
    /// iterator borrows loop storage and cannot outlive the next
    /// `advance`.
    pub fn history(&self) -> impl Iterator<Item = &Frame> + '_ {
        let (head, tail) = self.history_slices();
        head.iter().chain(tail.iter())
    }

    fn history_slices(&self) -> (&[Frame], &[Frame]) {
        let start = self.history_start();
        if start <= self.current {
            (&self.frames[start..=self.current], &[])
        } else {
            (&self.frames[start..], &self.frames[..=self.current])
        }
    }
}
